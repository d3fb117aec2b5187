// crates/mcp-compiler/src/scanner.rs
// Discovers exported tool functions and records them in the project context

use crate::checker::{Program, TypeChecker, named_children};
use crate::classify::is_representable;
use crate::context::{ParameterDescriptor, ProjectContext, ToolDescriptor};
use crate::error::{CompilerError, ParameterDiagnostic, Result};
use crate::jsdoc::leading_doc_comment;
use std::collections::HashSet;
use tracing::{debug, trace};
use tree_sitter::Node;

/// JSDoc tag marking a function as a tool
pub const TOOL_TAG: &str = "mcpTool";

/// `function_signature` is an overload declaration without a body
const FUNCTION_KINDS: &[&str] = &[
    "function_declaration",
    "generator_function_declaration",
    "function_signature",
];

/// Append every tagged exported function of the checker's program to
/// `context.tools`, in document order.
///
/// Fails on the first parameter whose type has no schema; nothing from the
/// offending function is recorded. When several overloads of one function are
/// tagged, the first one wins.
pub fn scan(checker: &TypeChecker<'_>, context: &mut ProjectContext) -> Result<()> {
    let program = checker.program();
    let mut stack = vec![program.root()];
    let mut seen = HashSet::new();

    while let Some(node) = stack.pop() {
        if is_exported_function(node)
            && let Some(tool) = extract_tool(checker, node)?
        {
            if seen.insert(tool.name.clone()) {
                debug!(tool = %tool.name, params = tool.parameters.len(), "Found tool");
                context.tools.push(tool);
            } else {
                debug!(tool = %tool.name, "Another overload already registered, skipping");
            }
        }

        // reversed so the leftmost child is visited next
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }

    Ok(())
}

fn is_exported_function(node: Node) -> bool {
    FUNCTION_KINDS.contains(&node.kind())
        && node.child_by_field_name("name").is_some()
        && node.parent().is_some_and(|p| p.kind() == "export_statement")
}

fn extract_tool<'p>(
    checker: &TypeChecker<'p>,
    function: Node<'p>,
) -> Result<Option<ToolDescriptor>> {
    let program = checker.program();
    let (Some(name), Some(export)) = (function.child_by_field_name("name"), function.parent())
    else {
        return Ok(None);
    };
    let function_name = program.text(name);

    let Some(doc) = leading_doc_comment(program, export) else {
        trace!(function = function_name, "No doc comment, skipping");
        return Ok(None);
    };
    if !doc.has_tag(TOOL_TAG) {
        trace!(function = function_name, "Not tagged as a tool, skipping");
        return Ok(None);
    }

    let mut parameters = Vec::new();
    if let Some(list) = function.child_by_field_name("parameters") {
        for param in named_children(list) {
            if !matches!(param.kind(), "required_parameter" | "optional_parameter") {
                continue;
            }
            let Some((param_name, rest)) = parameter_name(program, param) else {
                continue;
            };

            let ty = checker.parameter_type(function, param);
            if !is_representable(&ty) {
                return Err(CompilerError::UnrepresentableParameterType(diagnostic(
                    program,
                    function_name,
                    param_name,
                    param,
                )));
            }

            let default_value = param
                .child_by_field_name("value")
                .map(|v| program.text(v).to_string());
            parameters.push(ParameterDescriptor {
                name: param_name.to_string(),
                ty,
                optional: param.kind() == "optional_parameter" || default_value.is_some(),
                default_value,
                rest,
                description: doc.param_description(param_name).map(str::to_string),
            });
        }
    }

    let Some(signature) = checker.signature(function) else {
        debug!(function = function_name, "Unresolvable signature, skipping");
        return Ok(None);
    };

    Ok(Some(ToolDescriptor {
        name: function_name.to_string(),
        description: doc.description,
        parameters,
        return_type: signature.return_type,
    }))
}

/// Simple name of a parameter and whether it is a rest parameter.
/// Destructuring patterns and `this` have no name.
fn parameter_name<'p>(program: &'p Program, param: Node<'p>) -> Option<(&'p str, bool)> {
    let pattern = param.child_by_field_name("pattern")?;
    match pattern.kind() {
        "identifier" => Some((program.text(pattern), false)),
        "rest_pattern" => named_children(pattern)
            .into_iter()
            .find(|n| n.kind() == "identifier")
            .map(|n| (program.text(n), true)),
        _ => None,
    }
}

fn diagnostic(
    program: &Program,
    function_name: &str,
    parameter_name: &str,
    param: Node,
) -> ParameterDiagnostic {
    let location = program.location(param);
    ParameterDiagnostic {
        function_name: function_name.to_string(),
        parameter_name: parameter_name.to_string(),
        file: program.path().to_path_buf(),
        line: location.line,
        column: location.column,
        line_text: location.line_text,
        width: location.width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::Project;
    use crate::types::{Primitive, Type};

    fn scan_source(src: &str) -> Result<ProjectContext> {
        let program = Program::parse("tools.ts", src)?;
        let checker = TypeChecker::new(&program);
        let mut context = ProjectContext::new("test", "1.0.0");
        scan(&checker, &mut context)?;
        Ok(context)
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // Discovery
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_finds_tagged_exports_in_document_order() {
        let ctx = scan_source(
            r#"
/** @mcpTool */
export function first() {}

/**
 * Second tool
 * @mcpTool
 */
export function second(x: number): number { return x; }
"#,
        )
        .unwrap();
        let names: Vec<_> = ctx.tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(ctx.tools[1].description.as_deref(), Some("Second tool"));
        assert_eq!(ctx.tools[1].return_type, Type::number());
    }

    #[test]
    fn test_skips_untagged_and_unexported() {
        let ctx = scan_source(
            r#"
/** Helper */
export function helper() {}

/** @mcpTool */
function internal() {}

export function bare() {}

/** @mcptool */
export function wrongCase() {}
"#,
        )
        .unwrap();
        assert!(ctx.tools.is_empty());
    }

    #[test]
    fn test_finds_exports_inside_namespaces() {
        let ctx = scan_source(
            "namespace tools {\n  /** @mcpTool */\n  export function inner(a: string) {}\n}\n",
        )
        .unwrap();
        assert_eq!(ctx.tools.len(), 1);
        assert_eq!(ctx.tools[0].name, "inner");
    }

    #[test]
    fn test_scan_is_idempotent() {
        let src = "/** @mcpTool */\nexport function f(a: number, b?: string) {}\n";
        let program = Program::parse("tools.ts", src).unwrap();
        let checker = TypeChecker::new(&program);

        let mut a = ProjectContext::new("a", "1.0.0");
        let mut b = ProjectContext::new("b", "1.0.0");
        scan(&checker, &mut a).unwrap();
        scan(&checker, &mut b).unwrap();
        assert_eq!(a.tools, b.tools);
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // Parameters
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_parameter_descriptors() {
        let ctx = scan_source(
            r#"
/**
 * Adds things
 * @param num - first operand
 * @mcpTool
 */
export function f(num: number, arr: string[], tag: 'a' | 'b', opt?: boolean, scale = 2, ...rest: number[]) {}
"#,
        )
        .unwrap();
        let params = &ctx.tools[0].parameters;
        let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["num", "arr", "tag", "opt", "scale", "rest"]);

        assert_eq!(params[0].description.as_deref(), Some("first operand"));
        assert!(!params[0].optional);
        assert!(params[3].optional);
        assert!(params[4].optional);
        assert_eq!(params[4].default_value.as_deref(), Some("2"));
        assert_eq!(params[4].ty, Type::number());
        assert!(params[5].rest);
        assert_eq!(params[5].ty, Type::array_of(Type::number()));
    }

    #[test]
    fn test_destructured_and_this_parameters_are_excluded() {
        let ctx = scan_source(
            "/** @mcpTool */\nexport function f(this: Window, {a, b}: {a: number, b: number}, [c]: number[], d: string) {}\n",
        )
        .unwrap();
        let names: Vec<_> = ctx.tools[0].parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["d"]);
    }

    #[test]
    fn test_untyped_parameter_is_any() {
        let ctx = scan_source("/** @mcpTool */\nexport function f(x) {}\n").unwrap();
        assert_eq!(
            ctx.tools[0].parameters[0].ty,
            Type::Primitive(Primitive::Any)
        );
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // Rejection
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_class_parameter_fails_with_diagnostic() {
        let src = "class Widget { size = 1; }\n\n/** @mcpTool */\nexport function makeWidget(w: Widget): void {}\n";
        let err = scan_source(src).unwrap_err();
        let CompilerError::UnrepresentableParameterType(diag) = err else {
            panic!("expected unrepresentable parameter, got {:?}", err);
        };
        assert_eq!(diag.function_name, "makeWidget");
        assert_eq!(diag.parameter_name, "w");
        assert_eq!(diag.line, 4);
        assert_eq!(diag.column, 28);
        assert_eq!(diag.width, "w: Widget".len());
        assert_eq!(diag.line_text, "export function makeWidget(w: Widget): void {}");
    }

    #[test]
    fn test_rejection_records_nothing_for_that_function() {
        let src = r#"
/** @mcpTool */
export function ok(a: number) {}

/** @mcpTool */
export function bad(a: number, p: Promise<number>) {}
"#;
        let program = Program::parse("tools.ts", src).unwrap();
        let checker = TypeChecker::new(&program);
        let mut context = ProjectContext::new("t", "1.0.0");
        let err = scan(&checker, &mut context).unwrap_err();
        assert!(err.to_string().contains("Parameter \"p\""));
        let names: Vec<_> = context.tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["ok"]);
    }

    #[test]
    fn test_untagged_class_parameter_is_ignored() {
        let ctx = scan_source("class A {}\nexport function f(a: A) {}\n").unwrap();
        assert!(ctx.tools.is_empty());
    }

    #[test]
    fn test_bigint_literal_parameter_is_rejected() {
        let err = scan_source("/** @mcpTool */\nexport function f(a: 10n) {}\n").unwrap_err();
        assert!(err.to_string().contains("Parameter \"a\" has an unsupported type."));
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // Overloads
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_tagged_overload_signature_is_a_tool() {
        let ctx = scan_source(
            r#"
/**
 * Echo a value
 * @mcpTool
 */
export function echo(a: string): string;
export function echo(a: any) { return a; }
"#,
        )
        .unwrap();
        assert_eq!(ctx.tools.len(), 1);
        let tool = &ctx.tools[0];
        assert_eq!(tool.name, "echo");
        assert_eq!(tool.description.as_deref(), Some("Echo a value"));
        assert_eq!(tool.parameters[0].ty, Type::string());
        assert_eq!(tool.return_type, Type::string());
    }

    #[test]
    fn test_every_overload_tagged_registers_once() {
        let ctx = scan_source(
            r#"
/** @mcpTool */
export function pick(a: string): string;
/** @mcpTool */
export function pick(a: number): number;
/** @mcpTool */
export function pick(a: any) { return a; }
"#,
        )
        .unwrap();
        assert_eq!(ctx.tools.len(), 1);
        assert_eq!(ctx.tools[0].parameters[0].ty, Type::string());
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // Imported parameter types
    // ═══════════════════════════════════════════════════════════════════════════════

    fn scan_project(entry: &str, models: &str) -> Result<ProjectContext> {
        let entry = Program::parse("/app/src/tools.ts", entry)?;
        let models = Program::parse("/app/src/models.ts", models)?;
        let project = Project::with_modules(entry, [models]);
        let checker = TypeChecker::for_project(&project);
        let mut context = ProjectContext::new("test", "1.0.0");
        scan(&checker, &mut context)?;
        Ok(context)
    }

    #[test]
    fn test_imported_interface_parameter_is_accepted() {
        let ctx = scan_project(
            "import type {User} from './models';\n\n/** @mcpTool */\nexport function save(u: User) {}\n",
            "export interface User { name: string; age?: number }\n",
        )
        .unwrap();
        assert_eq!(ctx.tools.len(), 1);
        let Type::Object(user) = &ctx.tools[0].parameters[0].ty else {
            panic!("{:?}", ctx.tools[0].parameters[0].ty);
        };
        assert_eq!(user.name.as_deref(), Some("User"));
        assert_eq!(user.properties.len(), 2);
    }

    #[test]
    fn test_imported_class_parameter_is_rejected() {
        let err = scan_project(
            "import {Widget} from './models.js';\n/** @mcpTool */\nexport function make(w: Widget) {}\n",
            "export class Widget {}\n",
        )
        .unwrap_err();
        let CompilerError::UnrepresentableParameterType(diag) = err else {
            panic!("expected unrepresentable parameter, got {:?}", err);
        };
        assert_eq!(diag.parameter_name, "w");
        assert_eq!(diag.file, std::path::PathBuf::from("/app/src/tools.ts"));
    }
}
