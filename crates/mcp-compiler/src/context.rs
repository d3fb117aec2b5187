// crates/mcp-compiler/src/context.rs
// Tool catalog and per-compilation project state

use crate::types::Type;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// MCP server library the generated program targets
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Flavor {
    #[default]
    Tmcp,
    Mcp,
}

/// How the generated server talks to its client
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Transport {
    #[default]
    Stdio,
    Http,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    pub name: String,
    pub ty: Type,
    /// Declared with `?` or with a default value
    pub optional: bool,
    /// Default value expression as written
    pub default_value: Option<String>,
    /// `...name` parameter, spread when calling the tool
    pub rest: bool,
    /// Text of the matching `@param` tag
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub parameters: Vec<ParameterDescriptor>,
    pub return_type: Type,
}

/// State for one compilation run. The scanner only ever appends to `tools`.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub transport: Transport,
    pub flavor: Flavor,
    pub source_file_path: PathBuf,
    pub output_file_path: PathBuf,
    pub tools: Vec<ToolDescriptor>,
}

impl ProjectContext {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: None,
            transport: Transport::default(),
            flavor: Flavor::default(),
            source_file_path: PathBuf::new(),
            output_file_path: PathBuf::new(),
            tools: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_flavor_round_trips_through_strings() {
        assert_eq!(Flavor::from_str("tmcp").unwrap(), Flavor::Tmcp);
        assert_eq!(Flavor::from_str("mcp").unwrap(), Flavor::Mcp);
        assert!(Flavor::from_str("express").is_err());
        assert_eq!(Flavor::Mcp.to_string(), "mcp");
    }

    #[test]
    fn test_transport_defaults_to_stdio() {
        assert_eq!(Transport::default(), Transport::Stdio);
        assert_eq!(Transport::from_str("http").unwrap(), Transport::Http);
        assert_eq!(Transport::Http.to_string(), "http");
    }

    #[test]
    fn test_new_context_is_empty() {
        let ctx = ProjectContext::new("srv", "1.0.0");
        assert!(ctx.tools.is_empty());
        assert_eq!(ctx.flavor, Flavor::Tmcp);
    }
}
