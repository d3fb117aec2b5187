// crates/mcp-compiler/src/cli/mod.rs
// Command-line entry: argument parsing and the compile command

use anyhow::{Result, bail};
use clap::Parser;
use mcp_compiler::compiler::{CompilerOptions, compile, normalize};
use mcp_compiler::config::{CompilerConfig, PackageJson, apply_fallbacks};
use mcp_compiler::context::{Flavor, Transport};
use mcp_compiler::error::CompilerError;
use mcp_compiler::install::install_dependencies;
use std::path::PathBuf;
use tracing::{error, info};

pub mod prompts;

#[derive(Parser, Debug)]
#[command(name = "mcp-compiler")]
#[command(about = "Generate an MCP server from the @mcpTool functions of a TypeScript file")]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// TypeScript file exporting the tools (falls back to `entry` in mcp-compiler.toml)
    pub file_path: Option<PathBuf>,

    /// Output directory for compiled files
    #[arg(short = 'o', long = "outDir", visible_alias = "out-dir")]
    pub out_dir: Option<PathBuf>,

    /// Output file extension [default: .ts]
    #[arg(short = 'e', long)]
    pub ext: Option<String>,

    /// Current working directory
    #[arg(short = 'c', long, default_value = ".")]
    pub cwd: PathBuf,

    /// Transport method [default: stdio]
    #[arg(short = 't', long, value_enum)]
    pub transport: Option<Transport>,

    /// Project name (defaults to `package.json` name)
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// Project version (defaults to `package.json` version)
    #[arg(short = 'v', long)]
    pub version: Option<String>,

    /// MCP flavor [default: tmcp]
    #[arg(short = 'f', long, value_enum)]
    pub flavor: Option<Flavor>,

    /// Run in interactive mode
    #[arg(short = 'i', long)]
    pub interactive: bool,

    /// Suppress output messages
    #[arg(short = 's', long)]
    pub silent: bool,

    /// Automatically install missing dependencies
    #[arg(long)]
    pub install: bool,
}

impl Cli {
    /// Options exactly as given on the command line
    fn options(&self, cwd: PathBuf) -> CompilerOptions {
        CompilerOptions {
            cwd: Some(cwd),
            out_dir: self.out_dir.clone(),
            out_extension: self.ext.clone(),
            transport: self.transport,
            flavor: self.flavor,
            name: self.name.clone(),
            version: self.version.clone(),
            description: None,
        }
    }
}

/// Resolve settings, compile, and optionally install dependencies
pub async fn run(cli: Cli) -> Result<()> {
    let cwd = normalize(&std::env::current_dir()?.join(&cli.cwd));
    let config = CompilerConfig::load(&cwd);
    let package = PackageJson::read(&cwd);

    let mut options = cli.options(cwd.clone());
    apply_fallbacks(&mut options, &config, package.as_ref());
    let mut entry = cli.file_path.clone().or(config.entry);

    if cli.interactive {
        entry = Some(prompts::ask(entry, &mut options)?);
    }

    let Some(entry) = entry else {
        bail!("No entry file specified. Pass a file path or set `entry` in mcp-compiler.toml.");
    };
    let resolved = cwd.join(&entry);
    if !resolved.is_file() {
        bail!("Entry file does not exist: {}", resolved.display());
    }

    let output = match compile(&entry, &options).await {
        Ok(output) => output,
        Err(CompilerError::UnrepresentableParameterType(diagnostic)) => {
            error!("{}", diagnostic);
            bail!("Compilation failed.");
        }
        Err(e) => return Err(e.into()),
    };
    info!(
        path = %output.output_path.display(),
        tools = %output.tool_names.join(", "),
        "Compilation successful!"
    );

    if cli.install && !output.dependencies.is_empty() {
        install_dependencies(&output.dependencies, &cwd).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_short_flags() {
        let cli = Cli::try_parse_from([
            "mcp-compiler", "src/tools.ts", "-o", "dist", "-e", ".mjs", "-t", "http", "-n",
            "srv", "-v", "2.0.0", "-f", "mcp", "-s",
        ])
        .unwrap();
        assert_eq!(cli.file_path, Some(PathBuf::from("src/tools.ts")));
        assert_eq!(cli.out_dir, Some(PathBuf::from("dist")));
        assert_eq!(cli.ext.as_deref(), Some(".mjs"));
        assert_eq!(cli.transport, Some(Transport::Http));
        assert_eq!(cli.version.as_deref(), Some("2.0.0"));
        assert_eq!(cli.flavor, Some(Flavor::Mcp));
        assert!(cli.silent);
        assert!(!cli.install);
    }

    #[test]
    fn test_long_flags_and_defaults() {
        let cli = Cli::try_parse_from(["mcp-compiler", "a.ts", "--outDir", "out", "--install"]).unwrap();
        assert_eq!(cli.out_dir, Some(PathBuf::from("out")));
        assert_eq!(cli.cwd, PathBuf::from("."));
        assert!(cli.install);
        assert_eq!(cli.flavor, None);
    }

    #[test]
    fn test_rejects_unknown_flavor() {
        assert!(Cli::try_parse_from(["mcp-compiler", "a.ts", "-f", "express"]).is_err());
    }
}
