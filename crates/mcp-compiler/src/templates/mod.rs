// crates/mcp-compiler/src/templates/mod.rs
// Server program rendering for each supported MCP library

mod mcp;
mod tmcp;

use crate::adapter::adapt_return;
use crate::context::{Flavor, ProjectContext, ToolDescriptor};
use std::path::{Component, Path};

/// Render the full generated server program for `context`
pub fn render(context: &ProjectContext) -> String {
    match context.flavor {
        Flavor::Tmcp => tmcp::render(context),
        Flavor::Mcp => mcp::render(context),
    }
}

/// Module specifier the generated file uses to import the source file.
///
/// Relative to the output file's directory, always `./`- or `../`-prefixed,
/// with the extension the compiled JS module will carry.
pub fn import_specifier(source: &Path, output: &Path) -> String {
    let output_dir = output.parent().unwrap_or(Path::new(""));
    let relative = pathdiff::diff_paths(source, output_dir).unwrap_or_else(|| source.to_path_buf());

    let js_ext = match relative.extension().and_then(|e| e.to_str()) {
        Some("mts") => "mjs",
        Some("cts") => "cjs",
        _ => "js",
    };
    let relative = relative.with_extension(js_ext);

    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect();
    let joined = parts.join("/");

    if joined.starts_with("../") {
        joined
    } else {
        format!("./{}", joined)
    }
}

/// Names imported from the source file, in tool order
fn tool_imports(context: &ProjectContext) -> String {
    context
        .tools
        .iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `{a, b, rest}` binding pattern for the handler's argument object
fn argument_pattern(tool: &ToolDescriptor) -> String {
    let names: Vec<&str> = tool.parameters.iter().map(|p| p.name.as_str()).collect();
    format!("{{{}}}", names.join(", "))
}

/// Positional call arguments, rest parameters spread
fn call_arguments(tool: &ToolDescriptor) -> String {
    tool.parameters
        .iter()
        .map(|p| {
            if p.rest {
                // optional in the schema, so guard the spread
                format!("...({} ?? [])", p.name)
            } else {
                p.name.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Body shared by every flavor: call the tool, settle it, shape the result
fn handler_body(tool: &ToolDescriptor, indent: &str) -> String {
    format!(
        "{indent}const result = await {name}({args});\n{indent}return {ret};\n",
        indent = indent,
        name = tool.name,
        args = call_arguments(tool),
        ret = adapt_return(&tool.return_type, "result"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ParameterDescriptor;
    use crate::types::{CALL_TOOL_RESULT, Type};

    fn param(name: &str, rest: bool) -> ParameterDescriptor {
        ParameterDescriptor {
            name: name.into(),
            ty: Type::number(),
            optional: rest,
            default_value: None,
            rest,
            description: None,
        }
    }

    #[test]
    fn test_import_specifier_same_directory() {
        assert_eq!(
            import_specifier(Path::new("/p/src/tools.ts"), Path::new("/p/src/tools.generated.ts")),
            "./tools.js"
        );
    }

    #[test]
    fn test_import_specifier_other_directories() {
        assert_eq!(
            import_specifier(Path::new("/p/src/tools.ts"), Path::new("/p/dist/server.ts")),
            "../src/tools.js"
        );
        assert_eq!(
            import_specifier(Path::new("/p/src/tools.mts"), Path::new("/p/out.ts")),
            "./src/tools.mjs"
        );
    }

    #[test]
    fn test_call_arguments_spread_rest() {
        let tool = ToolDescriptor {
            name: "sum".into(),
            description: None,
            parameters: vec![param("first", false), param("others", true)],
            return_type: Type::number(),
        };
        assert_eq!(argument_pattern(&tool), "{first, others}");
        assert_eq!(call_arguments(&tool), "first, ...(others ?? [])");
    }

    #[test]
    fn test_handler_body_uses_return_adapter() {
        let mut tool = ToolDescriptor {
            name: "f".into(),
            description: None,
            parameters: vec![param("a", false)],
            return_type: Type::Opaque(CALL_TOOL_RESULT.into()),
        };
        assert_eq!(
            handler_body(&tool, "  "),
            "  const result = await f(a);\n  return result;\n"
        );

        tool.return_type = Type::number();
        assert!(handler_body(&tool, "").contains("JSON.stringify(result, null, 2)"));
    }
}
