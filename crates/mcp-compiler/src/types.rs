// crates/mcp-compiler/src/types.rs
// Closed type model shared by the classifier, synthesizer and return adapter

/// Nominal name of the protocol result type a tool may return directly
pub const CALL_TOOL_RESULT: &str = "CallToolResult";

/// One resolved static type
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Primitive(Primitive),
    Literal(Literal),
    Union(Vec<Type>),
    Intersection(Vec<Type>),
    /// `None` when the element type could not be resolved
    Array(Option<Box<Type>>),
    Tuple(TupleType),
    /// Type arguments of a `Map<K, V>` reference, as written
    Map(Vec<Type>),
    /// Type arguments of a `Set<T>` reference, as written
    Set(Vec<Type>),
    Object(ObjectType),
    /// Instance of a declared class
    Class(String),
    /// Function or constructor type
    Function { constructor: bool },
    Promise(Box<Type>),
    /// A named alias; transparent everywhere except nominal identity
    Alias { name: String, target: Box<Type> },
    /// Anything the checker cannot model. Never representable.
    Opaque(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    String,
    Number,
    Boolean,
    Null,
    Undefined,
    Void,
    Any,
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Boolean(bool),
    /// Unescaped string value
    String(String),
    /// Numeric literal exactly as written in source
    Number(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TupleType {
    pub elements: Vec<Type>,
    /// Type following `...` in the tuple, usually an array
    pub rest: Option<Box<Type>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectType {
    /// Interface name for named shapes, `None` for type literals
    pub name: Option<String>,
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub ty: Type,
    pub optional: bool,
}

impl Type {
    pub fn string() -> Self {
        Type::Primitive(Primitive::String)
    }

    pub fn number() -> Self {
        Type::Primitive(Primitive::Number)
    }

    pub fn boolean() -> Self {
        Type::Primitive(Primitive::Boolean)
    }

    pub fn any() -> Self {
        Type::Primitive(Primitive::Any)
    }

    pub fn unknown() -> Self {
        Type::Primitive(Primitive::Unknown)
    }

    pub fn array_of(element: Type) -> Self {
        Type::Array(Some(Box::new(element)))
    }

    /// Strip alias wrappers down to the structural type
    pub fn resolved(&self) -> &Type {
        let mut ty = self;
        while let Type::Alias { target, .. } = ty {
            ty = target;
        }
        ty
    }

    /// The settled form of the type: one level of `Promise` unwrapped
    pub fn awaited(&self) -> &Type {
        match self.resolved() {
            Type::Promise(inner) => inner,
            _ => self,
        }
    }

    /// Nominal identity: the alias name if aliased, otherwise the type's own symbol
    pub fn symbol_name(&self) -> Option<&str> {
        match self {
            Type::Alias { name, .. } | Type::Class(name) | Type::Opaque(name) => Some(name),
            Type::Object(obj) => obj.name.as_deref(),
            Type::Map(_) => Some("Map"),
            Type::Set(_) => Some("Set"),
            Type::Promise(_) => Some("Promise"),
            Type::Array(_) => Some("Array"),
            _ => None,
        }
    }
}
