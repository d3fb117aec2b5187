// crates/mcp-compiler/src/checker/module.rs
// Per-file declaration table and import/export bindings

use super::literal::unquote;
use super::{Program, named_children};
use std::collections::HashMap;
use tree_sitter::Node;

/// Node kinds that introduce a named type
const DECLARATION_KINDS: &[&str] = &[
    "type_alias_declaration",
    "interface_declaration",
    "class_declaration",
    "abstract_class_declaration",
    "enum_declaration",
];

/// Where an imported name comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Import<'p> {
    /// `import {name} from`, or `import name from` with `name` = `default`
    Named { module: usize, name: &'p str },
    /// `import * as ns from`
    Namespace { module: usize },
}

/// Names one program declares, imports and exports.
///
/// Module indices refer to the owning project's program list. Imports of
/// modules outside the project are not recorded.
pub(super) struct Module<'p> {
    pub program: &'p Program,
    pub declarations: HashMap<&'p str, Vec<Node<'p>>>,
    pub imports: HashMap<&'p str, Import<'p>>,
    /// Exported name to local name
    pub exports: HashMap<&'p str, &'p str>,
    /// `export {a as b} from`: exported name to the name in the source module
    pub reexports: HashMap<&'p str, (usize, &'p str)>,
    /// `export * from`
    pub star_exports: Vec<usize>,
}

impl<'p> Module<'p> {
    /// Index `program`; `resolve` maps a module specifier to a project index
    pub fn new(program: &'p Program, resolve: impl Fn(&str) -> Option<usize>) -> Self {
        let mut module = Self {
            program,
            declarations: HashMap::new(),
            imports: HashMap::new(),
            exports: HashMap::new(),
            reexports: HashMap::new(),
            star_exports: Vec::new(),
        };

        let mut stack = vec![program.root()];
        while let Some(node) = stack.pop() {
            if DECLARATION_KINDS.contains(&node.kind())
                && let Some(name) = node.child_by_field_name("name")
            {
                module
                    .declarations
                    .entry(program.text(name))
                    .or_default()
                    .push(node);
            }
            let mut cursor = node.walk();
            stack.extend(node.children(&mut cursor));
        }

        // stack order scrambles source order; interface merging relies on it
        for nodes in module.declarations.values_mut() {
            nodes.sort_by_key(|n| n.start_byte());
        }

        for statement in named_children(program.root()) {
            let target = module_specifier(program, statement).and_then(|s| resolve(&s));
            match statement.kind() {
                "import_statement" => {
                    if let Some(target) = target {
                        module.import(statement, target);
                    }
                }
                "export_statement" => module.export(statement, target),
                _ => {}
            }
        }

        module
    }

    fn text(&self, node: Node<'p>) -> &'p str {
        self.program.text(node)
    }

    fn import(&mut self, statement: Node<'p>, target: usize) {
        let Some(clause) = named_children(statement)
            .into_iter()
            .find(|c| c.kind() == "import_clause")
        else {
            return;
        };

        for binding in named_children(clause) {
            match binding.kind() {
                "identifier" => {
                    let local = self.text(binding);
                    self.imports.insert(
                        local,
                        Import::Named {
                            module: target,
                            name: "default",
                        },
                    );
                }
                "namespace_import" => {
                    if let Some(local) = named_children(binding)
                        .into_iter()
                        .find(|c| c.kind() == "identifier")
                    {
                        let local = self.text(local);
                        self.imports.insert(local, Import::Namespace { module: target });
                    }
                }
                "named_imports" => {
                    for specifier in named_children(binding) {
                        if let Some((name, local)) = self.specifier_names(specifier) {
                            self.imports.insert(
                                local,
                                Import::Named {
                                    module: target,
                                    name,
                                },
                            );
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn export(&mut self, statement: Node<'p>, target: Option<usize>) {
        let is_default = has_child(statement, "default");

        if let Some(declaration) = statement.child_by_field_name("declaration") {
            if let Some(name) = declaration.child_by_field_name("name") {
                let name = self.text(name);
                self.exports.insert(name, name);
                if is_default {
                    self.exports.insert("default", name);
                }
            }
            return;
        }

        if is_default {
            // `export default Name;`
            if let Some(value) = statement.child_by_field_name("value")
                && value.kind() == "identifier"
            {
                let name = self.text(value);
                self.exports.insert("default", name);
            }
            return;
        }

        let clause = named_children(statement)
            .into_iter()
            .find(|c| c.kind() == "export_clause");
        let has_source = statement.child_by_field_name("source").is_some();
        match (clause, has_source, target) {
            (Some(clause), false, _) => {
                for specifier in named_children(clause) {
                    if let Some((local, exported)) = self.specifier_names(specifier) {
                        self.exports.insert(exported, local);
                    }
                }
            }
            (Some(clause), true, Some(target)) => {
                for specifier in named_children(clause) {
                    if let Some((original, exported)) = self.specifier_names(specifier) {
                        self.reexports.insert(exported, (target, original));
                    }
                }
            }
            // `export * as ns from` binds no type names directly
            (None, true, Some(target)) if !has_child(statement, "namespace_export") => {
                self.star_exports.push(target);
            }
            _ => {}
        }
    }

    /// `(name, alias-or-name)` of an import or export specifier
    fn specifier_names(&self, specifier: Node<'p>) -> Option<(&'p str, &'p str)> {
        if !matches!(specifier.kind(), "import_specifier" | "export_specifier") {
            return None;
        }
        let name = specifier.child_by_field_name("name")?;
        if name.kind() == "string" {
            return None;
        }
        let name = self.text(name);
        let alias = specifier
            .child_by_field_name("alias")
            .map(|a| self.text(a))
            .unwrap_or(name);
        Some((name, alias))
    }
}

/// Source module of an import or re-export statement, unquoted
pub(super) fn module_specifier(program: &Program, statement: Node<'_>) -> Option<String> {
    if !matches!(statement.kind(), "import_statement" | "export_statement") {
        return None;
    }
    let source = statement.child_by_field_name("source")?;
    Some(unquote(program.text(source)))
}

fn has_child(node: Node<'_>, kind: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|c| c.kind() == kind)
}
