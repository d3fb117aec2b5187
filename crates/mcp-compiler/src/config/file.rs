// crates/mcp-compiler/src/config/file.rs
// Project configuration from mcp-compiler.toml

use crate::context::{Flavor, Transport};
use crate::error::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CONFIG_FILE_NAME: &str = "mcp-compiler.toml";

/// Top-level config structure
#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct CompilerConfig {
    /// Source file used when none is given on the command line
    pub entry: Option<PathBuf>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Where and how the generated file is written
#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct OutputConfig {
    pub dir: Option<PathBuf>,
    pub ext: Option<String>,
}

/// Identity and wiring of the generated server
#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct ServerConfig {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub flavor: Option<Flavor>,
    pub transport: Option<Transport>,
}

impl CompilerConfig {
    /// Load `mcp-compiler.toml` from `cwd`, defaults when missing or malformed
    pub fn load(cwd: &Path) -> Self {
        let path = Self::config_path(cwd);

        match std::fs::read_to_string(&path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(config) => {
                    debug!(path = %path.display(), "Loaded config from file");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to parse config file");
                    Self::default()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    fn config_path(cwd: &Path) -> PathBuf {
        cwd.join(CONFIG_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompilerError;

    #[test]
    fn test_parse_config() {
        let toml = r#"
entry = "src/tools.ts"

[output]
dir = "dist"
ext = ".mts"

[server]
name = "notes"
flavor = "mcp"
transport = "http"
"#;
        let config = CompilerConfig::parse(toml).unwrap();
        assert_eq!(config.entry, Some(PathBuf::from("src/tools.ts")));
        assert_eq!(config.output.dir, Some(PathBuf::from("dist")));
        assert_eq!(config.output.ext.as_deref(), Some(".mts"));
        assert_eq!(config.server.name.as_deref(), Some("notes"));
        assert_eq!(config.server.flavor, Some(Flavor::Mcp));
        assert_eq!(config.server.transport, Some(Transport::Http));
        assert_eq!(config.server.version, None);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = CompilerConfig::parse("").unwrap();
        assert_eq!(config, CompilerConfig::default());
    }

    #[test]
    fn test_unknown_flavor_is_rejected() {
        let err = CompilerConfig::parse("[server]\nflavor = \"express\"\n").unwrap_err();
        assert!(matches!(err, CompilerError::Toml(_)));
        assert!(err.to_string().starts_with("TOML parse error"));
    }

    #[test]
    fn test_load_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(CompilerConfig::load(dir.path()), CompilerConfig::default());

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "not = [valid").unwrap();
        assert_eq!(CompilerConfig::load(dir.path()), CompilerConfig::default());

        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[server]\nversion = \"3.1.0\"\n",
        )
        .unwrap();
        assert_eq!(
            CompilerConfig::load(dir.path()).server.version.as_deref(),
            Some("3.1.0")
        );
    }
}
