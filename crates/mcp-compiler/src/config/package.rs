// crates/mcp-compiler/src/config/package.rs
// Server identity fallbacks read from package.json

use crate::error::Result;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// The few package.json fields the compiler cares about
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub struct PackageJson {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
}

impl PackageJson {
    /// Read `package.json` from `cwd`. Missing or malformed files yield `None`.
    pub fn read(cwd: &Path) -> Option<Self> {
        let path = cwd.join("package.json");
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(_) => {
                debug!(path = %path.display(), "No package.json");
                return None;
            }
        };

        match Self::parse(&contents) {
            Ok(pkg) => Some(pkg),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to parse package.json");
                None
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompilerError;

    #[test]
    fn test_reads_identity_fields() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{"name": "my-tools", "version": "0.4.2", "type": "module", "dependencies": {}}"#,
        )
        .unwrap();
        let pkg = PackageJson::read(dir.path()).unwrap();
        assert_eq!(pkg.name.as_deref(), Some("my-tools"));
        assert_eq!(pkg.version.as_deref(), Some("0.4.2"));
        assert_eq!(pkg.description, None);
    }

    #[test]
    fn test_missing_or_malformed() {
        let dir = tempfile::tempdir().unwrap();
        assert!(PackageJson::read(dir.path()).is_none());
        std::fs::write(dir.path().join("package.json"), "{ nope").unwrap();
        assert!(PackageJson::read(dir.path()).is_none());
    }

    #[test]
    fn test_parse_error_is_json_error() {
        let err = PackageJson::parse("{ nope").unwrap_err();
        assert!(matches!(err, CompilerError::Json(_)));
        assert_eq!(PackageJson::parse("{}").unwrap(), PackageJson::default());
    }
}
