// crates/mcp-compiler/src/error.rs
// Error types for the MCP compiler

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the compiler library
#[derive(Error, Debug)]
pub enum CompilerError {
    /// A tool parameter's type cannot be expressed as a schema
    #[error("{0}")]
    UnrepresentableParameterType(ParameterDiagnostic),

    #[error("could not read source file: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("unsupported source file: {} (expected .ts, .tsx, .mts or .cts)", .0.display())]
    UnsupportedSource(PathBuf),

    #[error("tree-sitter parsing error in {}", .0.display())]
    Parse(PathBuf),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),

    /// An external tool (npm, npx) exited unsuccessfully
    #[error("`{command}` failed: {detail}")]
    CommandFailed { command: String, detail: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Convenience type alias for Result using CompilerError
pub type Result<T> = std::result::Result<T, CompilerError>;

/// Everything needed to point an operator at the offending parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDiagnostic {
    pub function_name: String,
    pub parameter_name: String,
    pub file: PathBuf,
    /// 1-based
    pub line: usize,
    /// 1-based, in characters
    pub column: usize,
    /// Full text of the line the parameter starts on
    pub line_text: String,
    /// Parameter length in characters
    pub width: usize,
}

impl fmt::Display for ParameterDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = [
            format!("\nError extracting function \"{}\":", self.function_name),
            format!(
                "  File: {}:{}:{}",
                self.file.display(),
                self.line,
                self.column
            ),
            format!("  {}", self.line_text),
            format!(
                "  {}{}",
                " ".repeat(self.column.saturating_sub(1)),
                "~".repeat(self.width)
            ),
            format!(
                "  Parameter \"{}\" has an unsupported type.",
                self.parameter_name
            ),
            "  Only plain objects, primitives, and arrays are allowed.\n".to_string(),
        ];
        f.write_str(&lines.join("\n"))
    }
}
