// crates/mcp-compiler/src/cli/prompts.rs
// Interactive mode: confirm or override every resolved setting

use anyhow::{Result, bail};
use dialoguer::{Input, Select};
use mcp_compiler::compiler::{CompilerOptions, DEFAULT_EXTENSION, DEFAULT_NAME, DEFAULT_VERSION};
use mcp_compiler::context::{Flavor, Transport};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;

/// Ask for each setting, pre-filled with what was resolved so far.
/// Returns the confirmed entry point.
pub fn ask(entry: Option<PathBuf>, options: &mut CompilerOptions) -> Result<PathBuf> {
    if !std::io::stdin().is_terminal() {
        bail!("Interactive mode requires a terminal.");
    }

    let entry = text(
        "Entry point",
        &entry.map(|p| p.display().to_string()).unwrap_or_default(),
    )?;
    if entry.is_empty() {
        bail!("No entry file specified.");
    }
    let entry = PathBuf::from(entry);

    let out_dir = options
        .out_dir
        .clone()
        .unwrap_or_else(|| entry.parent().unwrap_or(Path::new(".")).to_path_buf());
    options.out_dir = Some(PathBuf::from(text(
        "Output directory",
        &out_dir.display().to_string(),
    )?));
    options.out_extension = Some(text(
        "Output file extension",
        options.out_extension.as_deref().unwrap_or(DEFAULT_EXTENSION),
    )?);
    options.transport = Some(select("Transport method", options.transport.unwrap_or_default())?);
    options.name = Some(text(
        "Project name",
        options.name.as_deref().unwrap_or(DEFAULT_NAME),
    )?);
    options.version = Some(text(
        "Project version",
        options.version.as_deref().unwrap_or(DEFAULT_VERSION),
    )?);
    options.flavor = Some(select::<Flavor>("MCP flavor", options.flavor.unwrap_or_default())?);

    Ok(entry)
}

fn text(prompt: &str, initial: &str) -> Result<String> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .with_initial_text(initial)
        .allow_empty(true)
        .interact_text()?;
    Ok(value.trim().to_string())
}

fn select<T>(prompt: &str, current: T) -> Result<T>
where
    T: IntoEnumIterator + PartialEq + Copy + std::fmt::Display,
{
    let choices: Vec<T> = T::iter().collect();
    let labels: Vec<String> = choices.iter().map(|c| c.to_string()).collect();
    let default = choices.iter().position(|c| *c == current).unwrap_or(0);
    let picked = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(default)
        .interact()?;
    Ok(choices[picked])
}
