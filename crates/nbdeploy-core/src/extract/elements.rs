//! Top-level function and class extraction.
//!
//! Only module-scope statements are classified. Function bodies are never
//! entered; class bodies are walked to list their members but nothing inside a
//! class is registered on its own.

use indexmap::IndexMap;
use tree_sitter::Node;
use tracing::debug;

use crate::errors::{NbDeployError, NbResult};
use crate::extract::imports::record_import;
use crate::extract::parser::{node_text, parse_python};
use crate::models::{CodeElement, ElementCatalog, ElementKind};

/// Unwrap `decorated_definition` to the function/class it decorates.
fn definition_of<'t>(node: Node<'t>) -> Option<Node<'t>> {
    match node.kind() {
        "decorated_definition" => node.child_by_field_name("definition"),
        "function_definition" | "class_definition" => Some(node),
        _ => None,
    }
}

fn kind_of(definition: &Node<'_>) -> Option<ElementKind> {
    match definition.kind() {
        "function_definition" => Some(ElementKind::Function),
        "class_definition" => Some(ElementKind::Class),
        _ => None,
    }
}

fn definition_name(definition: &Node<'_>, source: &str) -> Option<String> {
    definition
        .child_by_field_name("name")
        .map(|n| node_text(&n, source).to_string())
}

/// Names defined directly in a class body, recursing into nested classes
/// with a dotted prefix. Method bodies are not entered.
fn collect_members(class_def: &Node<'_>, source: &str, prefix: &str, out: &mut Vec<String>) {
    let Some(body) = class_def.child_by_field_name("body") else {
        return;
    };
    let mut cursor = body.walk();
    for statement in body.named_children(&mut cursor) {
        let Some(definition) = definition_of(statement) else {
            continue;
        };
        let Some(name) = definition_name(&definition, source) else {
            continue;
        };
        let qualified = format!("{prefix}{name}");
        out.push(qualified.clone());
        if definition.kind() == "class_definition" {
            collect_members(&definition, source, &format!("{qualified}."), out);
        }
    }
}

fn insert_unique(
    map: &mut IndexMap<String, CodeElement>,
    element: CodeElement,
) -> NbResult<()> {
    if map.contains_key(&element.name) {
        return Err(NbDeployError::DuplicateName {
            kind: element.kind,
            name: element.name,
        });
    }
    map.insert(element.name.clone(), element);
    Ok(())
}

/// Build a [`CodeElement`] for a module-scope definition node. The span of a
/// decorated definition starts at its first decorator.
fn element_from_node(node: Node<'_>, source: &str) -> Option<CodeElement> {
    let definition = definition_of(node)?;
    let kind = kind_of(&definition)?;
    let name = definition_name(&definition, source)?;

    let mut members = Vec::new();
    if kind == ElementKind::Class {
        collect_members(&definition, source, "", &mut members);
    }

    Some(CodeElement {
        name,
        kind,
        body: node_text(&node, source).to_string(),
        start_line: node.start_position().row + 1,
        end_line: node.end_position().row + 1,
        members,
    })
}

/// Extract imports, functions and classes from Python source.
///
/// Fails with a parse error on invalid syntax, and with a duplicate-name error
/// when two top-level functions (or two top-level classes) share a name.
pub fn extract_code_elements(source: &str) -> NbResult<ElementCatalog> {
    let tree = parse_python(source)?;
    let root = tree.root_node();
    let mut catalog = ElementCatalog::default();

    let mut cursor = root.walk();
    for statement in root.named_children(&mut cursor) {
        match statement.kind() {
            "import_statement" | "import_from_statement" | "future_import_statement" => {
                record_import(&statement, source, &mut catalog.imports);
            }
            "function_definition" | "class_definition" | "decorated_definition" => {
                let Some(element) = element_from_node(statement, source) else {
                    continue;
                };
                match element.kind {
                    ElementKind::Function => insert_unique(&mut catalog.functions, element)?,
                    ElementKind::Class => insert_unique(&mut catalog.classes, element)?,
                }
            }
            _ => {}
        }
    }

    debug!(
        functions = catalog.functions.len(),
        classes = catalog.classes.len(),
        import_statements = catalog.imports.statements.len(),
        "Extracted code elements"
    );

    Ok(catalog)
}
