// crates/mcp-compiler/src/format.rs
// Best-effort formatting of the generated file with the project's own formatter

use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Formatter {
    Prettier,
    Biome,
}

impl Formatter {
    /// Package directory under `node_modules` that signals the formatter is installed
    fn package_dir(self) -> &'static [&'static str] {
        match self {
            Formatter::Prettier => &["prettier"],
            Formatter::Biome => &["@biomejs", "biome"],
        }
    }

    fn npx_args(self, file: &str) -> Vec<String> {
        let args: &[&str] = match self {
            Formatter::Prettier => &["prettier", "--write"],
            Formatter::Biome => &["@biomejs/biome", "format", "--write"],
        };
        args.iter()
            .map(|a| a.to_string())
            .chain(std::iter::once(file.to_string()))
            .collect()
    }

    pub fn is_installed(self, cwd: &Path) -> bool {
        let mut dir = cwd.join("node_modules");
        for part in self.package_dir() {
            dir.push(part);
        }
        dir.exists()
    }
}

/// Format `path` with prettier, else biome, whichever is installed under `cwd`.
/// Returns the formatter that succeeded. Failures are logged, never raised.
pub async fn try_format_file(path: &Path, cwd: &Path) -> Option<Formatter> {
    let relative: PathBuf = pathdiff::diff_paths(path, cwd).unwrap_or_else(|| path.to_path_buf());
    let relative = relative.to_string_lossy();

    for formatter in [Formatter::Prettier, Formatter::Biome] {
        if !formatter.is_installed(cwd) {
            continue;
        }
        let output = Command::new("npx")
            .args(formatter.npx_args(&relative))
            .current_dir(cwd)
            .output()
            .await;
        match output {
            Ok(out) if out.status.success() => {
                debug!(formatter = %formatter, path = %relative, "Formatted output");
                return Some(formatter);
            }
            Ok(out) => {
                warn!(
                    formatter = %formatter,
                    stderr = %String::from_utf8_lossy(&out.stderr).trim(),
                    "Formatting failed"
                );
            }
            Err(e) => {
                warn!(formatter = %formatter, error = %e, "Could not run npx");
            }
        }
    }

    None
}
