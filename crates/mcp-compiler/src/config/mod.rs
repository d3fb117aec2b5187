// crates/mcp-compiler/src/config/mod.rs
// Layered configuration: command line, mcp-compiler.toml, package.json

pub mod file;
pub mod package;

pub use file::{CONFIG_FILE_NAME, CompilerConfig};
pub use package::PackageJson;

use crate::compiler::CompilerOptions;

/// Fill every option the command line left unset, config file first, then
/// package.json. Built-in defaults are applied later by the compiler.
pub fn apply_fallbacks(
    options: &mut CompilerOptions,
    config: &CompilerConfig,
    package: Option<&PackageJson>,
) {
    fill(&mut options.out_dir, config.output.dir.as_ref());
    fill(&mut options.out_extension, config.output.ext.as_ref());
    fill(&mut options.flavor, config.server.flavor.as_ref());
    fill(&mut options.transport, config.server.transport.as_ref());
    fill(&mut options.name, config.server.name.as_ref());
    fill(&mut options.version, config.server.version.as_ref());
    fill(&mut options.description, config.server.description.as_ref());

    if let Some(pkg) = package {
        fill(&mut options.name, pkg.name.as_ref());
        fill(&mut options.version, pkg.version.as_ref());
        fill(&mut options.description, pkg.description.as_ref());
    }
}

fn fill<T: Clone>(slot: &mut Option<T>, fallback: Option<&T>) {
    if slot.is_none() {
        *slot = fallback.cloned();
    }
}
