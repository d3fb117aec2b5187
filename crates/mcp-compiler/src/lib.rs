// crates/mcp-compiler/src/lib.rs
// mcp-compiler - generates MCP servers from annotated TypeScript functions

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod adapter;
pub mod checker;
pub mod classify;
pub mod compiler;
pub mod config;
pub mod context;
pub mod error;
pub mod format;
pub mod install;
pub mod jsdoc;
pub mod scanner;
pub mod synthesize;
pub mod templates;
pub mod types;

pub use compiler::{CompileOutput, CompilerOptions, compile};
pub use error::{CompilerError, Result};
