// crates/mcp-compiler/src/classify.rs
// Decides whether a parameter type can be carried over the wire at all

use crate::types::{Primitive, Type};

/// True when values of `ty` can be validated by a schema and rebuilt from JSON.
///
/// Conservative: class instances, constructors, promises and anything the
/// checker could not model are rejected. Object shapes pass without looking at
/// their properties; the synthesizer handles those.
pub fn is_representable(ty: &Type) -> bool {
    match ty {
        Type::Primitive(
            Primitive::String
            | Primitive::Number
            | Primitive::Boolean
            | Primitive::Null
            | Primitive::Undefined
            | Primitive::Void,
        )
        | Type::Literal(_) => true,
        Type::Array(element) => element.as_deref().is_none_or(is_representable),
        Type::Map(args) | Type::Set(args) => args.iter().all(is_representable),
        Type::Union(members) | Type::Intersection(members) => members.iter().all(is_representable),
        Type::Object(_) | Type::Tuple(_) | Type::Function { constructor: false } => true,
        Type::Class(_) | Type::Function { constructor: true } => false,
        Type::Primitive(Primitive::Any | Primitive::Unknown) => true,
        Type::Alias { target, .. } => is_representable(target),
        Type::Promise(_) | Type::Opaque(_) => false,
    }
}
