//! Shared typed models passed between the pipeline stages.
//!
//! Every stage builds a fresh value from the previous stage's output; nothing
//! here is mutated once constructed.

use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::errors::FileWriteError;

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Source text assembled from a notebook's eligible code cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceUnit {
    pub text: String,
    pub cells_used: usize,
    pub cells_skipped: usize,
}

impl SourceUnit {
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Function,
    Class,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Function => f.write_str("function"),
            ElementKind::Class => f.write_str("class"),
        }
    }
}

/// Imports seen at module scope, in order of appearance, duplicates kept.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ImportRecord {
    /// Re-emittable statements, e.g. `from os import path, sep`.
    pub statements: Vec<String>,
    /// Flattened `module.symbol` (or bare module) identifiers.
    pub modules: Vec<String>,
}

impl ImportRecord {
    /// The statement log as written into the shared imports file.
    pub fn import_string(&self) -> String {
        self.statements.join("\n").trim().to_string()
    }
}

/// A top-level function or class and its verbatim source span.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CodeElement {
    pub name: String,
    pub kind: ElementKind,
    #[serde(skip_serializing)]
    pub body: String,
    /// 1-based, inclusive.
    pub start_line: usize,
    pub end_line: usize,
    /// Definitions nested in a class body (`method`, `Inner`, `Inner.method`).
    /// Always empty for functions.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
}

/// Everything one extraction pass produced.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ElementCatalog {
    pub imports: ImportRecord,
    pub functions: IndexMap<String, CodeElement>,
    pub classes: IndexMap<String, CodeElement>,
}

impl ElementCatalog {
    /// Function names followed by class names, in source order.
    pub fn names(&self) -> Vec<&str> {
        self.functions
            .keys()
            .chain(self.classes.keys())
            .map(String::as_str)
            .collect()
    }

    /// Resolve a name against both namespaces. A class shadows a function of
    /// the same name.
    pub fn lookup(&self, name: &str) -> Option<&CodeElement> {
        self.classes.get(name).or_else(|| self.functions.get(name))
    }

    /// True when `name` is both a function and a class, so [`lookup`](Self::lookup)
    /// hides the function.
    pub fn is_shadowed(&self, name: &str) -> bool {
        self.classes.contains_key(name) && self.functions.contains_key(name)
    }

    pub fn element_count(&self) -> usize {
        self.functions.len() + self.classes.len()
    }

    /// Function bodies then class bodies, blank-line separated.
    pub fn code_string(&self) -> String {
        let mut code = String::new();
        for element in self.functions.values().chain(self.classes.values()) {
            code.push_str(&element.body);
            code.push_str("\n\n");
        }
        code.trim().to_string()
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// One proposed output file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileGroup {
    pub file_name: String,
    pub description: String,
    pub element_names: Vec<String>,
}

/// The full proposal, in the order the collaborator listed the files.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Grouping {
    pub groups: Vec<FileGroup>,
}

impl Grouping {
    /// Every `content` entry across all groups, duplicates kept.
    pub fn element_names(&self) -> Vec<&str> {
        self.groups
            .iter()
            .flat_map(|g| g.element_names.iter().map(String::as_str))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[derive(Serialize)]
struct GroupEntry<'a> {
    description: &'a str,
    content: &'a [String],
}

/// Serializes back to the collaborator's wire shape so a saved grouping can be
/// replayed.
impl Serialize for Grouping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in &self.groups {
            map.serialize_entry(
                &group.file_name,
                &GroupEntry {
                    description: &group.description,
                    content: &group.element_names,
                },
            )?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Outcome of materializing one group.
#[derive(Debug)]
pub struct WrittenFile {
    pub file_name: String,
    pub result: Result<PathBuf, FileWriteError>,
}

impl WrittenFile {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

impl fmt::Display for WrittenFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Ok(path) => write!(f, "File written successfully to {}", path.display()),
            Err(err) => write!(f, "{err}"),
        }
    }
}

/// What happened to the shared imports file on this run.
#[derive(Debug)]
pub enum ImportsFileStatus {
    Written(PathBuf),
    /// Already present; left untouched.
    Skipped(PathBuf),
    Failed(FileWriteError),
}

#[derive(Debug)]
pub struct MaterializeReport {
    pub imports: ImportsFileStatus,
    pub files: Vec<WrittenFile>,
}

impl MaterializeReport {
    pub fn failures(&self) -> impl Iterator<Item = &WrittenFile> {
        self.files.iter().filter(|f| !f.is_ok())
    }

    pub fn all_ok(&self) -> bool {
        !matches!(self.imports, ImportsFileStatus::Failed(_)) && self.failures().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(name: &str, kind: ElementKind, body: &str) -> CodeElement {
        CodeElement {
            name: name.to_string(),
            kind,
            body: body.to_string(),
            start_line: 1,
            end_line: 1,
            members: Vec::new(),
        }
    }

    #[test]
    fn lookup_prefers_class_over_function() {
        let mut catalog = ElementCatalog::default();
        catalog
            .functions
            .insert("f".into(), element("f", ElementKind::Function, "def f(): pass"));
        catalog
            .classes
            .insert("f".into(), element("f", ElementKind::Class, "class f: pass"));

        assert_eq!(catalog.lookup("f").map(|e| e.kind), Some(ElementKind::Class));
        assert_eq!(catalog.names(), vec!["f", "f"]);
        assert!(catalog.is_shadowed("f"));
    }

    #[test]
    fn distinct_names_are_not_shadowed() {
        let mut catalog = ElementCatalog::default();
        catalog
            .functions
            .insert("f".into(), element("f", ElementKind::Function, "def f(): pass"));
        catalog
            .classes
            .insert("C".into(), element("C", ElementKind::Class, "class C: pass"));

        assert!(!catalog.is_shadowed("f"));
        assert!(!catalog.is_shadowed("C"));
        assert!(!catalog.is_shadowed("missing"));
    }

    #[test]
    fn written_file_displays_outcome() {
        let ok = WrittenFile {
            file_name: "utils.py".into(),
            result: Ok(PathBuf::from("src/utils.py")),
        };
        assert_eq!(ok.to_string(), "File written successfully to src/utils.py");

        let missing = WrittenFile {
            file_name: "utils.py".into(),
            result: Err(FileWriteError::ElementNotFound { name: "ghost".into() }),
        };
        assert_eq!(missing.to_string(), "Error: ghost not found in code elements.");
        assert!(!missing.is_ok());
    }

    #[test]
    fn code_string_orders_functions_before_classes() {
        let mut catalog = ElementCatalog::default();
        catalog
            .classes
            .insert("C".into(), element("C", ElementKind::Class, "class C: pass"));
        catalog
            .functions
            .insert("g".into(), element("g", ElementKind::Function, "def g(): pass"));

        assert_eq!(catalog.code_string(), "def g(): pass\n\nclass C: pass");
    }

    #[test]
    fn grouping_serializes_to_wire_shape() {
        let grouping = Grouping {
            groups: vec![FileGroup {
                file_name: "utils.py".into(),
                description: "d".into(),
                element_names: vec!["a".into(), "B".into()],
            }],
        };
        let json = serde_json::to_value(&grouping).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"utils.py": {"description": "d", "content": ["a", "B"]}})
        );
    }

    #[test]
    fn import_string_joins_statements() {
        let record = ImportRecord {
            statements: vec!["import os".into(), "from a import b, c".into()],
            modules: vec!["os".into(), "a.b".into(), "a.c".into()],
        };
        assert_eq!(record.import_string(), "import os\nfrom a import b, c");
    }
}
