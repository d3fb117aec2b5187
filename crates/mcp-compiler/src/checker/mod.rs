// crates/mcp-compiler/src/checker/mod.rs
// Syntactic type checker: builds the closed type model from a tree-sitter tree

pub mod literal;
mod module;
pub mod program;
pub mod project;
mod resolve;

pub use program::{Location, Program, SOURCE_EXTENSIONS};
pub use project::Project;

use crate::types::Type;
use module::{Import, Module};
use resolve::{Bindings, Resolver};
use tree_sitter::Node;

/// Import chains longer than this are treated as unresolvable
const MAX_IMPORT_DEPTH: usize = 32;

/// Read-only view of the types declared in a program and the local modules
/// it imports from.
///
/// Declarations are collected file-wide regardless of nesting. Resolution is
/// eager: every call returns an owned [`Type`] that no longer borrows the tree.
pub struct TypeChecker<'p> {
    /// Entry module first
    modules: Vec<Module<'p>>,
}

/// Resolved call signature of a function declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub return_type: Type,
}

/// A named declaration found through [`TypeChecker::lookup`]
#[derive(Clone, Copy)]
struct Declared<'c, 'p> {
    module: usize,
    /// Name at the declaration site, which differs from an import alias
    name: &'p str,
    nodes: &'c [Node<'p>],
}

impl<'p> TypeChecker<'p> {
    /// Checker over a single program; its imports stay unresolved
    pub fn new(program: &'p Program) -> Self {
        Self {
            modules: vec![Module::new(program, |_| None)],
        }
    }

    /// Checker over a project; the entry program is the one scanned
    pub fn for_project(project: &'p Project) -> Self {
        let modules = project
            .programs()
            .iter()
            .map(|program| Module::new(program, |s| project.resolve(program.path(), s)))
            .collect();
        Self { modules }
    }

    pub fn program(&self) -> &'p Program {
        self.modules[0].program
    }

    fn module(&self, index: usize) -> Option<&Module<'p>> {
        self.modules.get(index)
    }

    /// Declarations `name` refers to inside `module`, following imports
    fn lookup(&self, module: usize, name: &str) -> Option<Declared<'_, 'p>> {
        self.lookup_at(module, name, 0)
    }

    fn lookup_at(&self, module: usize, name: &str, depth: usize) -> Option<Declared<'_, 'p>> {
        if depth > MAX_IMPORT_DEPTH {
            return None;
        }
        let m = self.module(module)?;
        if let Some((key, nodes)) = m.declarations.get_key_value(name) {
            return Some(Declared {
                module,
                name: *key,
                nodes: nodes.as_slice(),
            });
        }
        match m.imports.get(name)? {
            Import::Named { module: target, name } => self.exported_at(*target, name, depth + 1),
            Import::Namespace { .. } => None,
        }
    }

    /// Declaration `module` exports as `name`
    fn exported(&self, module: usize, name: &str) -> Option<Declared<'_, 'p>> {
        self.exported_at(module, name, 0)
    }

    fn exported_at(&self, module: usize, name: &str, depth: usize) -> Option<Declared<'_, 'p>> {
        if depth > MAX_IMPORT_DEPTH {
            return None;
        }
        let m = self.module(module)?;
        if let Some(local) = m.exports.get(name) {
            return self.lookup_at(module, local, depth + 1);
        }
        if let Some((target, original)) = m.reexports.get(name) {
            return self.exported_at(*target, original, depth + 1);
        }
        m.star_exports
            .iter()
            .find_map(|target| self.exported_at(*target, name, depth + 1))
    }

    /// Module bound to `name` by `import * as name` inside `module`
    fn namespace(&self, module: usize, name: &str) -> Option<usize> {
        match self.module(module)?.imports.get(name)? {
            Import::Namespace { module } => Some(*module),
            Import::Named { .. } => None,
        }
    }

    /// Static type of a parameter of `function`: its annotation, else the type
    /// of its default value, else `any`
    pub fn parameter_type(&self, function: Node<'p>, param: Node<'p>) -> Type {
        let bindings = self.generic_bindings(function);
        let mut resolver = Resolver::new(self);
        if let Some(annotation) = param.child_by_field_name("type") {
            return resolver.resolve(annotation, &bindings);
        }
        if let Some(value) = param.child_by_field_name("value") {
            return resolver.infer(value, &bindings);
        }
        Type::any()
    }

    /// Call signature of a function declaration, `None` if it cannot be resolved
    pub fn signature(&self, function: Node<'p>) -> Option<Signature> {
        let params = function.child_by_field_name("parameters")?;
        if params.has_error() {
            return None;
        }

        let bindings = self.generic_bindings(function);
        let return_type = match function.child_by_field_name("return_type") {
            Some(annotation) => Resolver::new(self).resolve(annotation, &bindings),
            None if is_async(function) => Type::Promise(Box::new(Type::any())),
            None => Type::any(),
        };

        Some(Signature { return_type })
    }

    /// A function's own type parameters are unknowable from the declaration
    fn generic_bindings(&self, function: Node<'p>) -> Bindings {
        let mut bindings = Bindings::new();
        if let Some(params) = function.child_by_field_name("type_parameters") {
            for param in named_children(params) {
                if let Some(name) = param.child_by_field_name("name") {
                    let name = self.program().text(name).to_string();
                    bindings.insert(name.clone(), Type::Opaque(name));
                }
            }
        }
        bindings
    }
}

fn is_async(function: Node) -> bool {
    let mut cursor = function.walk();
    function.children(&mut cursor).any(|n| n.kind() == "async")
}

/// Named children without interleaved comments
pub(crate) fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .collect()
}
