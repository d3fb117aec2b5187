// crates/mcp-compiler/src/install.rs
// npm installation of the generated program's dependencies

use crate::compiler::{DependencyKind, ProjectDependency};
use crate::error::{CompilerError, Result};
use std::path::Path;
use tokio::process::Command;
use tracing::info;

/// `npm install` arguments for one dependency kind, `None` if there is nothing to install
pub fn npm_install_args(deps: &[ProjectDependency], kind: DependencyKind) -> Option<Vec<String>> {
    let specs: Vec<String> = deps
        .iter()
        .filter(|d| d.kind == kind)
        .map(ProjectDependency::spec)
        .collect();
    if specs.is_empty() {
        return None;
    }

    let flag = match kind {
        DependencyKind::Prod => "-S",
        DependencyKind::Dev => "-D",
    };
    let mut args = vec!["install".to_string(), flag.to_string()];
    args.extend(specs);
    Some(args)
}

/// Install production then development dependencies in `cwd`
pub async fn install_dependencies(deps: &[ProjectDependency], cwd: &Path) -> Result<()> {
    for kind in [DependencyKind::Prod, DependencyKind::Dev] {
        let Some(args) = npm_install_args(deps, kind) else {
            continue;
        };
        info!(kind = %kind, packages = %args[2..].join(", "), "Installing dependencies");

        let status = Command::new("npm")
            .args(&args)
            .current_dir(cwd)
            .status()
            .await?;
        if !status.success() {
            return Err(CompilerError::CommandFailed {
                command: format!("npm {}", args.join(" ")),
                detail: status.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dep(kind: DependencyKind, name: &str) -> ProjectDependency {
        ProjectDependency {
            kind,
            name: name.into(),
            version: "^1.0.0".into(),
        }
    }

    #[test]
    fn test_prod_and_dev_are_split() {
        let deps = vec![
            dep(DependencyKind::Prod, "tmcp"),
            dep(DependencyKind::Dev, "typescript"),
            dep(DependencyKind::Prod, "zod"),
        ];
        assert_eq!(
            npm_install_args(&deps, DependencyKind::Prod).unwrap(),
            vec!["install", "-S", "tmcp@^1.0.0", "zod@^1.0.0"]
        );
        assert_eq!(
            npm_install_args(&deps, DependencyKind::Dev).unwrap(),
            vec!["install", "-D", "typescript@^1.0.0"]
        );
    }

    #[test]
    fn test_nothing_to_install() {
        let deps = vec![dep(DependencyKind::Prod, "zod")];
        assert!(npm_install_args(&deps, DependencyKind::Dev).is_none());
        assert!(npm_install_args(&[], DependencyKind::Prod).is_none());
    }
}
