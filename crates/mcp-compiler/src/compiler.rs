// crates/mcp-compiler/src/compiler.rs
// Compilation pipeline: source file in, generated server program out

use crate::checker::{Program, Project, TypeChecker};
use crate::context::{Flavor, ProjectContext, Transport};
use crate::error::{CompilerError, Result};
use crate::format::try_format_file;
use crate::scanner::scan;
use crate::templates;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_NAME: &str = "Generated MCP Server";
pub const DEFAULT_VERSION: &str = "1.0.0";
pub const DEFAULT_EXTENSION: &str = ".ts";

/// Caller-supplied settings. Unset fields fall back to the defaults above.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Base for every relative path, defaults to the process working directory
    pub cwd: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub out_extension: Option<String>,
    pub transport: Option<Transport>,
    pub flavor: Option<Flavor>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DependencyKind {
    Prod,
    Dev,
}

/// An npm package the generated program imports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDependency {
    pub kind: DependencyKind,
    pub name: String,
    pub version: String,
}

impl ProjectDependency {
    fn prod(name: &str, version: &str) -> Self {
        Self {
            kind: DependencyKind::Prod,
            name: name.to_string(),
            version: version.to_string(),
        }
    }

    /// `name@version` as npm expects it
    pub fn spec(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }
}

#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub output_path: PathBuf,
    pub tool_names: Vec<String>,
    pub dependencies: Vec<ProjectDependency>,
}

/// Compile `file_path` (relative to the working directory) into
/// `<out_dir>/<stem>.generated<ext>`.
///
/// Nothing is written when a tool parameter is rejected.
pub async fn compile(file_path: impl AsRef<Path>, options: &CompilerOptions) -> Result<CompileOutput> {
    let cwd = resolve_cwd(options.cwd.as_deref())?;
    let source_path = normalize(&cwd.join(file_path.as_ref()));
    let out_dir = normalize(&cwd.join(options.out_dir.as_deref().unwrap_or(Path::new("."))));
    let output_path = out_dir.join(output_file_name(
        &source_path,
        options.out_extension.as_deref().unwrap_or(DEFAULT_EXTENSION),
    )?);

    let source = tokio::fs::read_to_string(&source_path)
        .await
        .map_err(|_| CompilerError::SourceNotFound(source_path.clone()))?;
    debug!(path = %source_path.display(), bytes = source.len(), "Read source file");

    let mut context = ProjectContext::new(
        options.name.as_deref().unwrap_or(DEFAULT_NAME),
        options.version.as_deref().unwrap_or(DEFAULT_VERSION),
    );
    context.description = options.description.clone();
    context.transport = options.transport.unwrap_or_default();
    context.flavor = options.flavor.unwrap_or_default();
    context.source_file_path = source_path.clone();
    context.output_file_path = output_path.clone();

    let entry = Program::parse(source_path.clone(), source)?;
    let project = Project::load(entry).await;
    let code = generate(&project, &mut context)?;

    tokio::fs::create_dir_all(&out_dir).await?;
    tokio::fs::write(&output_path, code).await?;
    info!(
        path = %output_path.display(),
        tools = context.tools.len(),
        flavor = %context.flavor,
        transport = %context.transport,
        "Wrote generated server"
    );

    try_format_file(&output_path, &cwd).await;

    Ok(CompileOutput {
        output_path,
        tool_names: context.tools.iter().map(|t| t.name.clone()).collect(),
        dependencies: dependencies_for(context.flavor, context.transport),
    })
}

/// Scan the project's entry program and render. Synchronous so no syntax
/// node outlives it.
pub fn generate(project: &Project, context: &mut ProjectContext) -> Result<String> {
    debug!(
        entry = %project.entry().path().display(),
        modules = project.programs().len(),
        "Scanning project"
    );
    let checker = TypeChecker::for_project(project);
    scan(&checker, context)?;
    Ok(templates::render(context))
}

/// npm packages the generated program needs for a flavor and transport
pub fn dependencies_for(flavor: Flavor, transport: Transport) -> Vec<ProjectDependency> {
    let mut deps = Vec::new();
    match flavor {
        Flavor::Tmcp => {
            deps.push(ProjectDependency::prod("tmcp", "^1.15.5"));
            deps.push(ProjectDependency::prod("@tmcp/adapter-zod", "^0.1.6"));
            deps.push(ProjectDependency::prod("zod", "^4.1.12"));
            match transport {
                Transport::Http => {
                    deps.push(ProjectDependency::prod("@tmcp/transport-http", "^0.7.1"));
                    deps.push(ProjectDependency::prod("srvx", "^0.8.9"));
                }
                Transport::Stdio => {
                    deps.push(ProjectDependency::prod("@tmcp/transport-stdio", "^0.3.1"));
                }
            }
        }
        Flavor::Mcp => {
            deps.push(ProjectDependency::prod("@modelcontextprotocol/sdk", "^1.20.2"));
            deps.push(ProjectDependency::prod("zod", "^4.1.12"));
        }
    }
    deps
}

/// `<stem>.generated<ext>`; a bare `js` extension gets its dot
fn output_file_name(source_path: &Path, extension: &str) -> Result<String> {
    let stem = source_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| CompilerError::InvalidInput(format!("not a file: {}", source_path.display())))?;
    let extension = if extension.is_empty() || extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{}", extension)
    };
    Ok(format!("{}.generated{}", stem, extension))
}

fn resolve_cwd(cwd: Option<&Path>) -> Result<PathBuf> {
    let current = std::env::current_dir()?;
    Ok(match cwd {
        Some(dir) => normalize(&current.join(dir)),
        None => current,
    })
}

/// Lexically drop `.` and fold `..` so relative import paths come out clean
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_name() {
        let src = Path::new("/p/src/tools.ts");
        assert_eq!(output_file_name(src, ".ts").unwrap(), "tools.generated.ts");
        assert_eq!(output_file_name(src, ".mjs").unwrap(), "tools.generated.mjs");
        assert_eq!(output_file_name(src, "js").unwrap(), "tools.generated.js");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/a/b/.")), PathBuf::from("/a/b"));
    }

    #[test]
    fn test_tmcp_dependencies_follow_transport() {
        let stdio: Vec<_> = dependencies_for(Flavor::Tmcp, Transport::Stdio)
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(
            stdio,
            vec!["tmcp", "@tmcp/adapter-zod", "zod", "@tmcp/transport-stdio"]
        );

        let http = dependencies_for(Flavor::Tmcp, Transport::Http);
        assert!(http.iter().any(|d| d.name == "@tmcp/transport-http"));
        assert!(http.iter().all(|d| d.name != "@tmcp/transport-stdio"));
    }

    #[test]
    fn test_mcp_dependencies_ignore_transport() {
        let specs: Vec<_> = dependencies_for(Flavor::Mcp, Transport::Http)
            .iter()
            .map(ProjectDependency::spec)
            .collect();
        assert_eq!(specs, vec!["@modelcontextprotocol/sdk@^1.20.2", "zod@^4.1.12"]);
        assert!(
            dependencies_for(Flavor::Mcp, Transport::Stdio)
                .iter()
                .all(|d| d.kind == DependencyKind::Prod)
        );
    }

    #[test]
    fn test_generate_renders_scanned_tools() {
        let mut ctx = ProjectContext::new("srv", "1.0.0");
        ctx.source_file_path = PathBuf::from("/p/tools.ts");
        ctx.output_file_path = PathBuf::from("/p/tools.generated.ts");
        let entry = Program::parse(
            "/p/tools.ts",
            "/** @mcpTool */\nexport function hello(name: string): string { return name; }\n",
        )
        .unwrap();
        let code = generate(&Project::new(entry), &mut ctx).unwrap();
        assert_eq!(ctx.tools.len(), 1);
        assert!(code.contains("import {hello} from './tools.js';"));
        assert!(code.contains("name: z.string()"));
    }
}
