// crates/mcp-compiler/src/checker/project.rs
// The entry program plus the local modules it takes types from

use super::module::module_specifier;
use super::{Program, SOURCE_EXTENSIONS, named_children};
use crate::compiler::normalize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Extensions tried, in order, for a specifier without one
const RESOLVE_EXTENSIONS: &[&str] = &["ts", "tsx", "d.ts", "mts", "cts"];

const INDEX_FILES: &[&str] = &["index.ts", "index.tsx", "index.d.ts"];

/// Parsed programs, entry first.
///
/// Only relative specifiers (`./x`, `../x`) are followed; package imports
/// stay unresolved.
pub struct Project {
    programs: Vec<Program>,
}

impl Project {
    /// A project of the entry program alone
    pub fn new(entry: Program) -> Self {
        Self {
            programs: vec![entry],
        }
    }

    /// A project over programs that are already parsed, entry first
    #[cfg(test)]
    pub(crate) fn with_modules(entry: Program, modules: impl IntoIterator<Item = Program>) -> Self {
        let mut project = Self::new(entry);
        project.programs.extend(modules);
        project
    }

    /// Parse `entry` and, transitively, every local module it imports or
    /// re-exports. Unreadable or unparsable modules are skipped.
    pub async fn load(entry: Program) -> Self {
        let mut project = Self::new(entry);
        let mut next = 0;

        while next < project.programs.len() {
            let importer = project.programs[next].path().to_path_buf();
            let specifiers = specifiers(&project.programs[next]);
            next += 1;

            for specifier in specifiers {
                if project.resolve(&importer, &specifier).is_some() {
                    continue;
                }
                let Some((path, source)) = read_module(&importer, &specifier).await else {
                    debug!(importer = %importer.display(), specifier = %specifier, "Module not found");
                    continue;
                };
                match Program::parse(path, source) {
                    Ok(program) => project.programs.push(program),
                    Err(e) => warn!(specifier = %specifier, error = %e, "Failed to parse module"),
                }
            }
        }

        debug!(modules = project.programs.len(), "Loaded project");
        project
    }

    pub fn entry(&self) -> &Program {
        &self.programs[0]
    }

    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    /// Index of the program `specifier` names when imported from `importer`
    pub fn resolve(&self, importer: &Path, specifier: &str) -> Option<usize> {
        candidate_paths(importer, specifier).iter().find_map(|candidate| {
            self.programs
                .iter()
                .position(|p| normalize(p.path()) == *candidate)
        })
    }
}

/// Every module specifier of a program's top-level imports and re-exports
fn specifiers(program: &Program) -> Vec<String> {
    named_children(program.root())
        .into_iter()
        .filter_map(|statement| module_specifier(program, statement))
        .collect()
}

async fn read_module(importer: &Path, specifier: &str) -> Option<(PathBuf, String)> {
    for candidate in candidate_paths(importer, specifier) {
        if let Ok(source) = tokio::fs::read_to_string(&candidate).await {
            return Some((candidate, source));
        }
    }
    None
}

/// Files a relative specifier may name, most specific first
pub fn candidate_paths(importer: &Path, specifier: &str) -> Vec<PathBuf> {
    let relative = specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../");
    if !relative {
        return Vec::new();
    }

    let base = normalize(&importer.parent().unwrap_or(Path::new("")).join(specifier));
    let mut candidates = Vec::new();

    match base.extension().and_then(|e| e.to_str()) {
        Some(ext) if SOURCE_EXTENSIONS.contains(&ext) => candidates.push(base.clone()),
        // emitted-file specifiers name the source by its output extension
        Some("js") => {
            candidates.push(base.with_extension("ts"));
            candidates.push(base.with_extension("tsx"));
            candidates.push(base.with_extension("d.ts"));
        }
        Some("jsx") => candidates.push(base.with_extension("tsx")),
        Some("mjs") => {
            candidates.push(base.with_extension("mts"));
            candidates.push(base.with_extension("d.mts"));
        }
        Some("cjs") => {
            candidates.push(base.with_extension("cts"));
            candidates.push(base.with_extension("d.cts"));
        }
        _ => {}
    }

    for ext in RESOLVE_EXTENSIONS {
        candidates.push(with_suffix(&base, ext));
    }
    for index in INDEX_FILES {
        candidates.push(base.join(index));
    }
    candidates
}

/// `base` with `.ext` appended, keeping any dots already in the file name
fn with_suffix(base: &Path, ext: &str) -> PathBuf {
    let mut path = OsString::from(base.as_os_str());
    path.push(".");
    path.push(ext);
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_candidates_for_bare_specifier() {
        let candidates = candidate_paths(Path::new("/p/src/tools.ts"), "./models");
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("/p/src/models.ts"),
                PathBuf::from("/p/src/models.tsx"),
                PathBuf::from("/p/src/models.d.ts"),
                PathBuf::from("/p/src/models.mts"),
                PathBuf::from("/p/src/models.cts"),
                PathBuf::from("/p/src/models/index.ts"),
                PathBuf::from("/p/src/models/index.tsx"),
                PathBuf::from("/p/src/models/index.d.ts"),
            ]
        );
    }

    #[test]
    fn test_candidates_for_emitted_extension() {
        let candidates = candidate_paths(Path::new("/p/src/tools.ts"), "../lib/user.js");
        assert_eq!(candidates[0], PathBuf::from("/p/lib/user.ts"));
        assert_eq!(candidates[2], PathBuf::from("/p/lib/user.d.ts"));

        let candidates = candidate_paths(Path::new("/p/tools.ts"), "./types.v2");
        assert_eq!(candidates[0], PathBuf::from("/p/types.v2.ts"));
    }

    #[test]
    fn test_package_specifiers_are_not_followed() {
        assert!(candidate_paths(Path::new("/p/tools.ts"), "zod").is_empty());
        assert!(candidate_paths(Path::new("/p/tools.ts"), "@modelcontextprotocol/sdk/types.js").is_empty());
    }

    #[test]
    fn test_resolve_among_parsed_programs() {
        let entry = Program::parse("/p/src/tools.ts", "import {A} from './a';").unwrap();
        let a = Program::parse("/p/src/a.ts", "export type A = string;").unwrap();
        let shapes = Program::parse("/p/shapes/index.ts", "export interface S {}").unwrap();
        let project = Project::with_modules(entry, [a, shapes]);

        let importer = Path::new("/p/src/tools.ts");
        assert_eq!(project.resolve(importer, "./a"), Some(1));
        assert_eq!(project.resolve(importer, "./a.js"), Some(1));
        assert_eq!(project.resolve(importer, "../shapes"), Some(2));
        assert_eq!(project.resolve(importer, "./missing"), None);
    }

    #[tokio::test]
    async fn test_load_follows_imports_transitively() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("shapes")).unwrap();
        std::fs::write(
            dir.path().join("shapes/index.ts"),
            "export * from './point';\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("shapes/point.ts"),
            "export interface Point { x: number }\n",
        )
        .unwrap();

        let entry_path = dir.path().join("tools.ts");
        let entry = Program::parse(
            entry_path.clone(),
            "import {Point} from './shapes';\nimport {x} from './missing';\n",
        )
        .unwrap();
        let project = Project::load(entry).await;

        let paths: Vec<_> = project.programs().iter().map(|p| p.path().to_path_buf()).collect();
        assert_eq!(paths.len(), 3);
        assert_eq!(paths[0], entry_path);
        assert!(paths.contains(&dir.path().join("shapes/index.ts")));
        assert!(paths.contains(&dir.path().join("shapes/point.ts")));
        assert!(project.resolve(&entry_path, "./missing").is_none());
    }
}
