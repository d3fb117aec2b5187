// crates/mcp-compiler/src/checker/resolve.rs
// Type node and initializer resolution

use super::literal::unquote;
use super::{Declared, TypeChecker, named_children};
use crate::types::{Literal, ObjectType, Primitive, Property, TupleType, Type};
use std::collections::HashMap;
use tree_sitter::Node;

/// Type parameter name to the type it stands for
pub(super) type Bindings = HashMap<String, Type>;

pub(super) struct Resolver<'c, 'p> {
    checker: &'c TypeChecker<'p>,
    /// Module the nodes being resolved belong to
    module: usize,
    /// Named declarations currently being expanded, by module
    in_progress: Vec<(usize, String)>,
}

impl<'c, 'p> Resolver<'c, 'p> {
    /// Resolver for nodes of the entry program
    pub(super) fn new(checker: &'c TypeChecker<'p>) -> Self {
        Self {
            checker,
            module: 0,
            in_progress: Vec::new(),
        }
    }

    fn text(&self, node: Node<'p>) -> &'p str {
        self.checker
            .module(self.module)
            .map_or("", |m| m.program.text(node))
    }

    /// Run `f` over nodes of another module
    fn within<T>(&mut self, module: usize, f: impl FnOnce(&mut Self) -> T) -> T {
        let previous = std::mem::replace(&mut self.module, module);
        let out = f(self);
        self.module = previous;
        out
    }

    pub(super) fn resolve(&mut self, node: Node<'p>, bindings: &Bindings) -> Type {
        match node.kind() {
            "type_annotation" | "parenthesized_type" | "readonly_type" | "default_type"
            | "optional_type" | "rest_type" => self.resolve_first(node, bindings),
            "predefined_type" => predefined(self.text(node)),
            "literal_type" => match named_children(node).first() {
                Some(inner) => self.literal(*inner),
                None => Type::Opaque(self.text(node).to_string()),
            },
            "type_identifier" | "identifier" => {
                self.resolve_named(self.text(node), Vec::new(), bindings)
            }
            "generic_type" => self.generic(node, bindings),
            "nested_type_identifier" => self.qualified(node, Vec::new()),
            "array_type" => Type::Array(
                named_children(node)
                    .first()
                    .map(|element| Box::new(self.resolve(*element, bindings))),
            ),
            "tuple_type" => self.tuple(node, bindings),
            "union_type" => Type::Union(self.flatten(node, bindings)),
            "intersection_type" => Type::Intersection(self.flatten(node, bindings)),
            "object_type" | "interface_body" => Type::Object(ObjectType {
                name: None,
                properties: self.members(node, bindings),
            }),
            "function_type" => Type::Function { constructor: false },
            "constructor_type" => Type::Function { constructor: true },
            _ => Type::Opaque(self.text(node).to_string()),
        }
    }

    fn resolve_first(&mut self, node: Node<'p>, bindings: &Bindings) -> Type {
        match named_children(node).first() {
            Some(inner) => self.resolve(*inner, bindings),
            None => Type::any(),
        }
    }

    /// Literal value node, as found in `literal_type` or an enum initializer
    fn literal(&self, node: Node<'p>) -> Type {
        let text = self.text(node);
        match node.kind() {
            // no JSON form
            "number" | "unary_expression" if self.is_bigint(node) => Type::Opaque(text.to_string()),
            "number" => Type::Literal(Literal::Number(text.to_string())),
            "unary_expression"
                if node
                    .child_by_field_name("argument")
                    .is_some_and(|arg| arg.kind() == "number") =>
            {
                Type::Literal(Literal::Number(text.split_whitespace().collect()))
            }
            "string" => Type::Literal(Literal::String(unquote(text))),
            "true" => Type::Literal(Literal::Boolean(true)),
            "false" => Type::Literal(Literal::Boolean(false)),
            "null" => Type::Primitive(Primitive::Null),
            "undefined" => Type::Primitive(Primitive::Undefined),
            _ => Type::Opaque(text.to_string()),
        }
    }

    /// `10n`, `0xffn` or `-1n`
    fn is_bigint(&self, node: Node<'p>) -> bool {
        let number = match node.kind() {
            "unary_expression" => node.child_by_field_name("argument"),
            _ => Some(node),
        };
        number.is_some_and(|n| n.kind() == "number" && self.text(n).ends_with('n'))
    }

    fn generic(&mut self, node: Node<'p>, bindings: &Bindings) -> Type {
        let Some(name) = node.child_by_field_name("name") else {
            return Type::Opaque(self.text(node).to_string());
        };
        let args = match node.child_by_field_name("type_arguments") {
            Some(list) => named_children(list)
                .into_iter()
                .map(|arg| self.resolve(arg, bindings))
                .collect(),
            None => Vec::new(),
        };
        match name.kind() {
            "type_identifier" | "identifier" => self.resolve_named(self.text(name), args, bindings),
            "nested_type_identifier" => self.qualified(name, args),
            _ => Type::Opaque(self.text(name).to_string()),
        }
    }

    fn resolve_named(&mut self, name: &'p str, args: Vec<Type>, bindings: &Bindings) -> Type {
        if let Some(bound) = bindings.get(name) {
            return bound.clone();
        }
        let checker = self.checker;
        match checker.lookup(self.module, name) {
            Some(declared) => self.declared(declared, args),
            None => builtin(name, args),
        }
    }

    fn declared(&mut self, declared: Declared<'c, 'p>, args: Vec<Type>) -> Type {
        let Declared {
            module,
            name,
            nodes: decls,
        } = declared;
        let key = (module, name.to_string());
        if self.in_progress.contains(&key) {
            return Type::Opaque(name.to_string());
        }
        // class and interface of the same name merge into the class
        if decls
            .iter()
            .any(|d| matches!(d.kind(), "class_declaration" | "abstract_class_declaration"))
        {
            return Type::Class(name.to_string());
        }
        let Some(first) = decls.first().copied() else {
            return Type::Opaque(name.to_string());
        };

        self.in_progress.push(key);
        let ty = self.within(module, |r| match first.kind() {
            "type_alias_declaration" => {
                let bindings = r.bind_type_parameters(first, &args);
                let target = match first.child_by_field_name("value") {
                    Some(value) => r.resolve(value, &bindings),
                    None => Type::Opaque(name.to_string()),
                };
                Type::Alias {
                    name: name.to_string(),
                    target: Box::new(target),
                }
            }
            "interface_declaration" => r.interface(name, decls, &args),
            "enum_declaration" => r.enumeration(name, first),
            _ => Type::Opaque(name.to_string()),
        });
        self.in_progress.pop();
        ty
    }

    fn bind_type_parameters(&mut self, decl: Node<'p>, args: &[Type]) -> Bindings {
        let mut bound = Bindings::new();
        let Some(params) = decl.child_by_field_name("type_parameters") else {
            return bound;
        };
        let params = named_children(params)
            .into_iter()
            .filter(|p| p.kind() == "type_parameter");
        for (i, param) in params.enumerate() {
            let Some(name) = param.child_by_field_name("name") else {
                continue;
            };
            let name = self.text(name).to_string();
            let ty = match (args.get(i), param.child_by_field_name("value")) {
                (Some(arg), _) => arg.clone(),
                (None, Some(default)) => self.resolve(default, &bound),
                (None, None) => Type::Opaque(name.clone()),
            };
            bound.insert(name, ty);
        }
        bound
    }

    /// Merged shape of every declaration of an interface, own members first
    fn interface(&mut self, name: &str, decls: &[Node<'p>], args: &[Type]) -> Type {
        let mut properties = Vec::new();
        let mut bases = Vec::new();

        for decl in decls.iter().filter(|d| d.kind() == "interface_declaration") {
            let bindings = self.bind_type_parameters(*decl, args);
            let children = named_children(*decl);
            let body = decl.child_by_field_name("body").or_else(|| {
                children
                    .iter()
                    .copied()
                    .find(|c| matches!(c.kind(), "interface_body" | "object_type"))
            });
            if let Some(body) = body {
                for property in self.members(body, &bindings) {
                    push_unique(&mut properties, property);
                }
            }
            for clause in children.iter().filter(|c| c.kind() == "extends_type_clause") {
                for base in named_children(*clause) {
                    bases.push(self.resolve(base, &bindings));
                }
            }
        }

        for base in bases {
            if let Type::Object(inherited) = base.resolved() {
                for property in &inherited.properties {
                    push_unique(&mut properties, property.clone());
                }
            }
        }

        Type::Object(ObjectType {
            name: Some(name.to_string()),
            properties,
        })
    }

    fn members(&mut self, body: Node<'p>, bindings: &Bindings) -> Vec<Property> {
        let mut properties = Vec::new();
        for member in named_children(body) {
            let is_method = match member.kind() {
                "property_signature" => false,
                "method_signature" => true,
                // index, call and construct signatures carry no named member
                _ => continue,
            };
            let Some(name) = member
                .child_by_field_name("name")
                .and_then(|n| self.property_name(n))
            else {
                continue;
            };
            let ty = if is_method {
                Type::Function { constructor: false }
            } else {
                match member.child_by_field_name("type") {
                    Some(annotation) => self.resolve(annotation, bindings),
                    None => Type::any(),
                }
            };
            push_unique(
                &mut properties,
                Property {
                    name,
                    ty,
                    optional: has_token(member, "?"),
                },
            );
        }
        properties
    }

    fn property_name(&self, node: Node<'p>) -> Option<String> {
        match node.kind() {
            "property_identifier" | "private_property_identifier" | "identifier" | "number" => {
                Some(self.text(node).to_string())
            }
            "string" => Some(unquote(self.text(node))),
            _ => None,
        }
    }

    fn tuple(&mut self, node: Node<'p>, bindings: &Bindings) -> Type {
        let mut elements = Vec::new();
        let mut rest = None;
        for member in named_children(node) {
            match member.kind() {
                "rest_type" => rest = Some(Box::new(self.resolve(member, bindings))),
                // labelled members: `x: T`, `y?: T`, `...z: T[]`
                "required_parameter" | "optional_parameter" => {
                    let children = named_children(member);
                    let ty = match children.iter().find(|c| c.kind() == "type_annotation") {
                        Some(annotation) => self.resolve(*annotation, bindings),
                        None => Type::any(),
                    };
                    if children.iter().any(|c| c.kind() == "rest_pattern") {
                        rest = Some(Box::new(ty));
                    } else {
                        elements.push(ty);
                    }
                }
                _ => elements.push(self.resolve(member, bindings)),
            }
        }
        Type::Tuple(TupleType { elements, rest })
    }

    /// Members of a union or intersection with nested ones of the same kind spliced in
    fn flatten(&mut self, node: Node<'p>, bindings: &Bindings) -> Vec<Type> {
        let kind = node.kind();
        let mut members = Vec::new();
        for child in named_children(node) {
            if child.kind() == kind {
                members.extend(self.flatten(child, bindings));
                continue;
            }
            let ty = self.resolve(child, bindings);
            let spliced = match (kind, ty.resolved()) {
                ("union_type", Type::Union(inner)) => Some(inner.clone()),
                ("intersection_type", Type::Intersection(inner)) => Some(inner.clone()),
                _ => None,
            };
            match spliced {
                Some(inner) => members.extend(inner),
                None => members.push(ty),
            }
        }
        members
    }

    /// Literal members of an enum in declaration order
    fn enum_members(&self, decl: Node<'p>) -> Vec<(String, Type)> {
        let Some(body) = decl.child_by_field_name("body") else {
            return Vec::new();
        };

        let mut next = Some(0.0_f64);
        let mut members = Vec::new();
        for member in named_children(body) {
            let (name_node, value) = match member.kind() {
                "enum_assignment" => match member.child_by_field_name("name") {
                    Some(name) => (name, member.child_by_field_name("value")),
                    None => continue,
                },
                "property_identifier" | "string" | "number" => (member, None),
                _ => continue,
            };
            let Some(name) = self.property_name(name_node) else {
                continue;
            };

            let ty = match value.map(|v| self.literal(v)) {
                None => match next {
                    Some(n) => {
                        next = Some(n + 1.0);
                        Type::Literal(Literal::Number(format_number(n)))
                    }
                    None => Type::Opaque(name.clone()),
                },
                Some(Type::Literal(Literal::Number(text))) => {
                    next = parse_number(&text).map(|n| n + 1.0);
                    Type::Literal(Literal::Number(text))
                }
                Some(lit @ Type::Literal(Literal::String(_))) => {
                    next = None;
                    lit
                }
                Some(_) => {
                    next = None;
                    Type::Opaque(name.clone())
                }
            };
            members.push((name, ty));
        }
        members
    }

    fn enumeration(&self, name: &str, decl: Node<'p>) -> Type {
        let mut values: Vec<Type> = self.enum_members(decl).into_iter().map(|(_, ty)| ty).collect();
        let target = match values.len() {
            0 => return Type::Opaque(name.to_string()),
            1 => values.remove(0),
            _ => Type::Union(values),
        };
        Type::Alias {
            name: name.to_string(),
            target: Box::new(target),
        }
    }

    /// `ns.Type` through a namespace import, or `Enum.Member`
    fn qualified(&mut self, node: Node<'p>, args: Vec<Type>) -> Type {
        let parts = named_children(node);
        let (Some(scope), Some(member)) = (parts.first(), parts.last()) else {
            return Type::Opaque(self.text(node).to_string());
        };
        let scope = self.text(*scope);
        let member = self.text(*member);
        let checker = self.checker;

        if let Some(target) = checker.namespace(self.module, scope) {
            return match checker.exported(target, member) {
                Some(declared) => self.declared(declared, args),
                None => Type::Opaque(self.text(node).to_string()),
            };
        }

        let enum_decl = checker.lookup(self.module, scope).and_then(|declared| {
            declared
                .nodes
                .iter()
                .find(|d| d.kind() == "enum_declaration")
                .map(|decl| (declared.module, *decl))
        });
        enum_decl
            .and_then(|(module, decl)| {
                self.within(module, |r| r.enum_members(decl))
                    .into_iter()
                    .find(|(name, _)| name == member)
                    .map(|(_, ty)| ty)
            })
            .unwrap_or_else(|| Type::Opaque(self.text(node).to_string()))
    }

    /// Widened type of an initializer expression
    pub(super) fn infer(&mut self, node: Node<'p>, bindings: &Bindings) -> Type {
        match node.kind() {
            "number" if self.is_bigint(node) => Type::Opaque("bigint".to_string()),
            "number" => Type::number(),
            "string" | "template_string" => Type::string(),
            "true" | "false" => Type::boolean(),
            "null" => Type::Primitive(Primitive::Null),
            "undefined" => Type::Primitive(Primitive::Undefined),
            "unary_expression" => {
                let operator = node
                    .child_by_field_name("operator")
                    .map(|op| self.text(op))
                    .unwrap_or("");
                match operator {
                    "!" => Type::boolean(),
                    "typeof" => Type::string(),
                    "-" | "~" if self.is_bigint(node) => Type::Opaque("bigint".to_string()),
                    "-" | "+" | "~" => Type::number(),
                    _ => Type::Opaque(self.text(node).to_string()),
                }
            }
            "parenthesized_expression" | "satisfies_expression" => {
                match named_children(node).first() {
                    Some(inner) => self.infer(*inner, bindings),
                    None => Type::any(),
                }
            }
            "as_expression" => match named_children(node).last() {
                Some(target) => self.resolve(*target, bindings),
                None => Type::any(),
            },
            "array" => {
                let mut elements: Vec<Type> = Vec::new();
                for element in named_children(node) {
                    let ty = match element.kind() {
                        "spread_element" => Type::Opaque(self.text(element).to_string()),
                        _ => self.infer(element, bindings),
                    };
                    if !elements.contains(&ty) {
                        elements.push(ty);
                    }
                }
                match elements.len() {
                    0 => Type::Array(None),
                    1 => Type::array_of(elements.remove(0)),
                    _ => Type::array_of(Type::Union(elements)),
                }
            }
            "object" => {
                let mut properties = Vec::new();
                for entry in named_children(node) {
                    let (name, ty) = match entry.kind() {
                        "pair" => {
                            let (Some(key), Some(value)) = (
                                entry.child_by_field_name("key"),
                                entry.child_by_field_name("value"),
                            ) else {
                                continue;
                            };
                            let Some(name) = self.property_name(key) else {
                                continue;
                            };
                            (name, self.infer(value, bindings))
                        }
                        "shorthand_property_identifier" => {
                            let name = self.text(entry).to_string();
                            (name.clone(), Type::Opaque(name))
                        }
                        "method_definition" => match entry
                            .child_by_field_name("name")
                            .and_then(|n| self.property_name(n))
                        {
                            Some(name) => (name, Type::Function { constructor: false }),
                            None => continue,
                        },
                        _ => continue,
                    };
                    push_unique(
                        &mut properties,
                        Property {
                            name,
                            ty,
                            optional: false,
                        },
                    );
                }
                Type::Object(ObjectType {
                    name: None,
                    properties,
                })
            }
            "new_expression" => self.construct(node, bindings),
            "arrow_function" | "function_expression" | "function" => {
                Type::Function { constructor: false }
            }
            _ => Type::Opaque(self.text(node).to_string()),
        }
    }

    fn construct(&mut self, node: Node<'p>, bindings: &Bindings) -> Type {
        let Some(constructor) = node.child_by_field_name("constructor") else {
            return Type::Opaque(self.text(node).to_string());
        };
        let name = self.text(constructor);
        let args: Vec<Type> = match node.child_by_field_name("type_arguments") {
            Some(list) => named_children(list)
                .into_iter()
                .map(|arg| self.resolve(arg, bindings))
                .collect(),
            None => Vec::new(),
        };
        match name {
            "Map" => Type::Map(args),
            "Set" => Type::Set(args),
            "Array" => Type::Array(args.into_iter().next().map(Box::new)),
            _ => {
                let checker = self.checker;
                let is_class = checker.lookup(self.module, name).is_some_and(|declared| {
                    declared
                        .nodes
                        .iter()
                        .any(|d| matches!(d.kind(), "class_declaration" | "abstract_class_declaration"))
                });
                if is_class {
                    Type::Class(name.to_string())
                } else {
                    Type::Opaque(name.to_string())
                }
            }
        }
    }
}

fn predefined(keyword: &str) -> Type {
    match keyword {
        "string" => Type::string(),
        "number" => Type::number(),
        "boolean" => Type::boolean(),
        "any" => Type::any(),
        "unknown" => Type::unknown(),
        "void" => Type::Primitive(Primitive::Void),
        "null" => Type::Primitive(Primitive::Null),
        "undefined" => Type::Primitive(Primitive::Undefined),
        other => Type::Opaque(other.to_string()),
    }
}

/// Library types known by name alone
fn builtin(name: &str, mut args: Vec<Type>) -> Type {
    match name {
        "Array" | "ReadonlyArray" => Type::Array(args.into_iter().next().map(Box::new)),
        "Map" | "ReadonlyMap" => Type::Map(args),
        "Set" | "ReadonlySet" => Type::Set(args),
        "Promise" | "PromiseLike" => {
            Type::Promise(Box::new(args.into_iter().next().unwrap_or_else(Type::any)))
        }
        "Record" if args.len() == 2 => {
            let value = args.remove(1);
            let properties = literal_keys(&args[0])
                .unwrap_or_default()
                .into_iter()
                .map(|key| Property {
                    name: key,
                    ty: value.clone(),
                    optional: false,
                })
                .collect();
            Type::Object(ObjectType {
                name: None,
                properties,
            })
        }
        "Partial" if args.len() == 1 => with_optional(args.remove(0), true),
        "Required" if args.len() == 1 => with_optional(args.remove(0), false),
        "Readonly" | "NonNullable" if args.len() == 1 => args.remove(0),
        "Pick" | "Omit" if args.len() == 2 => {
            let Some(keys) = literal_keys(&args[1]) else {
                return Type::Opaque(name.to_string());
            };
            let keep = name == "Pick";
            match args[0].resolved() {
                Type::Object(obj) => Type::Object(ObjectType {
                    name: None,
                    properties: obj
                        .properties
                        .iter()
                        .filter(|p| keys.contains(&p.name) == keep)
                        .cloned()
                        .collect(),
                }),
                _ => Type::Opaque(name.to_string()),
            }
        }
        "undefined" => Type::Primitive(Primitive::Undefined),
        _ => Type::Opaque(name.to_string()),
    }
}

/// Mapped `?` modifier over an object; other types are unchanged
fn with_optional(ty: Type, optional: bool) -> Type {
    match ty.resolved() {
        Type::Object(obj) => Type::Object(ObjectType {
            name: None,
            properties: obj
                .properties
                .iter()
                .map(|p| Property {
                    optional,
                    ..p.clone()
                })
                .collect(),
        }),
        _ => ty,
    }
}

/// Property keys named by a literal or union of literals
fn literal_keys(ty: &Type) -> Option<Vec<String>> {
    match ty.resolved() {
        Type::Literal(Literal::String(s)) | Type::Literal(Literal::Number(s)) => {
            Some(vec![s.clone()])
        }
        Type::Union(members) => members.iter().try_fold(Vec::new(), |mut keys, member| {
            keys.extend(literal_keys(member)?);
            Some(keys)
        }),
        _ => None,
    }
}

/// First declaration of a property wins
fn push_unique(properties: &mut Vec<Property>, property: Property) {
    if !properties.iter().any(|p| p.name == property.name) {
        properties.push(property);
    }
}

fn has_token(node: Node, kind: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|c| c.kind() == kind)
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Numeric value of a JS number literal
fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest.trim()),
        None => (false, cleaned.as_str()),
    };
    let radix = match digits.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    let value = match radix {
        Some(radix) => i64::from_str_radix(&digits[2..], radix).ok()? as f64,
        None => digits.parse::<f64>().ok()?,
    };
    Some(if negative { -value } else { value })
}
