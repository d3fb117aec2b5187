// crates/mcp-compiler/src/synthesize.rs
// Type-to-Zod schema synthesis

use crate::context::{ParameterDescriptor, ToolDescriptor};
use crate::types::{Literal, ObjectType, Primitive, TupleType, Type};

const ANY: &str = "z.any()";

/// Render a Zod schema expression validating values of `ty`.
///
/// Total over every [`Type`]: anything without a dedicated rule becomes
/// `z.any()`. Literal rules run before their primitive counterparts.
pub fn synthesize(ty: &Type) -> String {
    match ty {
        Type::Alias { target, .. } => synthesize(target),
        Type::Literal(Literal::Boolean(value)) => format!("z.literal({})", value),
        Type::Literal(Literal::String(value)) => format!("z.literal({})", quote(value)),
        Type::Literal(Literal::Number(text)) => format!("z.literal({})", text),
        Type::Primitive(Primitive::Boolean) => "z.boolean()".to_string(),
        Type::Union(members) => format!("z.union([{}])", join(members)),
        Type::Tuple(tuple) => synthesize_tuple(tuple),
        Type::Array(element) => format!("z.array({})", synthesize_opt(element.as_deref())),
        Type::Set(args) => format!("z.set({})", synthesize_opt(args.first())),
        Type::Map(args) => match args.as_slice() {
            [key, value] => format!("z.map({}, {})", synthesize(key), synthesize(value)),
            _ => format!("z.map({}, {})", ANY, ANY),
        },
        Type::Object(obj) if !obj.properties.is_empty() => synthesize_object(obj),
        Type::Primitive(Primitive::String) => "z.string()".to_string(),
        Type::Primitive(Primitive::Number) => "z.number()".to_string(),
        Type::Primitive(Primitive::Null) => "z.null()".to_string(),
        Type::Primitive(Primitive::Undefined) => "z.undefined()".to_string(),
        Type::Primitive(Primitive::Unknown) => "z.unknown()".to_string(),
        _ => ANY.to_string(),
    }
}

/// Render the argument object schema of a tool, one key per parameter
pub fn synthesize_tool_schema(tool: &ToolDescriptor) -> String {
    let params = tool
        .parameters
        .iter()
        .map(|param| format!("{}: {}", property_key(&param.name), synthesize_parameter(param)))
        .collect::<Vec<_>>()
        .join(",\n      ");

    format!("z.object({{\n      {}\n    }})", params)
}

/// Schema for one tool argument, optional parameters accept `undefined`
pub fn synthesize_parameter(param: &ParameterDescriptor) -> String {
    let schema = synthesize(&param.ty);
    if param.optional {
        optional(&schema)
    } else {
        schema
    }
}

/// Wrap a schema so `undefined` is accepted as well
pub fn optional(schema: &str) -> String {
    format!("z.optional({})", schema)
}

fn synthesize_opt(ty: Option<&Type>) -> String {
    ty.map(synthesize).unwrap_or_else(|| ANY.to_string())
}

fn join(types: &[Type]) -> String {
    types.iter().map(synthesize).collect::<Vec<_>>().join(", ")
}

fn synthesize_tuple(tuple: &TupleType) -> String {
    let fixed = join(&tuple.elements);
    match tuple.rest.as_deref() {
        Some(rest) => {
            let rest_schema = match rest.resolved() {
                Type::Array(element) => synthesize_opt(element.as_deref()),
                other => synthesize(other),
            };
            format!("z.tuple([{}], {})", fixed, rest_schema)
        }
        None => format!("z.tuple([{}])", fixed),
    }
}

fn synthesize_object(obj: &ObjectType) -> String {
    let props = obj
        .properties
        .iter()
        .map(|prop| {
            let schema = synthesize(&prop.ty);
            let schema = if prop.optional {
                optional(&schema)
            } else {
                schema
            };
            format!("{}: {}", property_key(&prop.name), schema)
        })
        .collect::<Vec<_>>()
        .join(",\n  ");

    format!("z.object({{\n  {}\n}})", props)
}

/// Property names go through untouched unless JS needs them quoted
pub fn property_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        quote(name)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c == '$' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c == '$' || c.is_alphanumeric())
}

/// JS string literal for `value`
pub fn quote(value: &str) -> String {
    // JSON string escaping is valid JS string literal syntax
    serde_json::Value::String(value.to_owned()).to_string()
}
