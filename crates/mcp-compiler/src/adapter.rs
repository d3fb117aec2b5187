// crates/mcp-compiler/src/adapter.rs
// Decides whether a tool's return value needs wrapping into a tool result

use crate::types::{CALL_TOOL_RESULT, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnShape {
    /// The function already returns a protocol tool result
    Passthrough,
    /// The value must be serialized into a text content result
    Wrap,
}

/// Classify a tool's declared return type
pub fn return_shape(return_type: &Type) -> ReturnShape {
    if is_call_tool_result(return_type.awaited()) {
        ReturnShape::Passthrough
    } else {
        ReturnShape::Wrap
    }
}

/// The type's own symbol or any alias name along the way must be the marker
fn is_call_tool_result(ty: &Type) -> bool {
    match ty {
        Type::Alias { name, target } => name == CALL_TOOL_RESULT || is_call_tool_result(target),
        other => other.symbol_name() == Some(CALL_TOOL_RESULT),
    }
}

/// Expression returning `binding` from a generated tool handler
pub fn adapt_return(return_type: &Type, binding: &str) -> String {
    match return_shape(return_type) {
        ReturnShape::Passthrough => binding.to_string(),
        ReturnShape::Wrap => format!(
            "{{content: [{{type: 'text', text: JSON.stringify({}, null, 2)}}]}}",
            binding
        ),
    }
}
