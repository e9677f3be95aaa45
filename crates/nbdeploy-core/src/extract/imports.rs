//! Import statement reconstruction.
//!
//! Each module-scope import becomes one or more re-emittable statements plus
//! the flattened list of symbols it brings in.

use tree_sitter::Node;

use crate::extract::parser::node_text;
use crate::models::ImportRecord;

/// Whitespace inside dotted names (`os . path`) is legal but never wanted in
/// the re-emitted statement.
fn compact(text: &str) -> String {
    text.split_whitespace().collect()
}

/// `(name, alias)` for a `dotted_name` or `aliased_import` node.
fn imported_name(node: &Node<'_>, source: &str) -> (String, Option<String>) {
    if node.kind() == "aliased_import" {
        let name = node
            .child_by_field_name("name")
            .map(|n| compact(node_text(&n, source)))
            .unwrap_or_default();
        let alias = node
            .child_by_field_name("alias")
            .map(|n| node_text(&n, source).to_string());
        (name, alias)
    } else {
        (compact(node_text(node, source)), None)
    }
}

fn render(name: &str, alias: Option<&str>) -> String {
    match alias {
        Some(alias) => format!("{name} as {alias}"),
        None => name.to_string(),
    }
}

fn qualify(module: &str, name: &str) -> String {
    // `from . import x` keeps the dots as the whole prefix.
    if module.ends_with('.') {
        format!("{module}{name}")
    } else {
        format!("{module}.{name}")
    }
}

/// `import a, b as c` → one statement per imported module.
fn record_plain_import(node: &Node<'_>, source: &str, record: &mut ImportRecord) {
    let mut cursor = node.walk();
    for child in node.children_by_field_name("name", &mut cursor) {
        let (name, alias) = imported_name(&child, source);
        if name.is_empty() {
            continue;
        }
        record
            .statements
            .push(format!("import {}", render(&name, alias.as_deref())));
        record.modules.push(name);
    }
}

/// `from m import a, b` → one statement, one symbol per name.
fn record_from_import(node: &Node<'_>, module: &str, source: &str, record: &mut ImportRecord) {
    let mut rendered = Vec::new();

    let mut cursor = node.walk();
    for child in node.children_by_field_name("name", &mut cursor) {
        let (name, alias) = imported_name(&child, source);
        if name.is_empty() {
            continue;
        }
        rendered.push(render(&name, alias.as_deref()));
        record.modules.push(qualify(module, &name));
    }

    let mut cursor = node.walk();
    let has_wildcard = node
        .named_children(&mut cursor)
        .any(|c| c.kind() == "wildcard_import");
    if has_wildcard {
        rendered.push("*".to_string());
        record.modules.push(qualify(module, "*"));
    }

    record
        .statements
        .push(format!("from {module} import {}", rendered.join(", ")));
}

/// Append whatever `node` imports to `record`. Non-import nodes are ignored.
pub fn record_import(node: &Node<'_>, source: &str, record: &mut ImportRecord) {
    match node.kind() {
        "import_statement" => record_plain_import(node, source, record),
        "import_from_statement" => {
            let module = node
                .child_by_field_name("module_name")
                .map(|n| compact(node_text(&n, source)))
                .unwrap_or_default();
            record_from_import(node, &module, source, record);
        }
        "future_import_statement" => record_from_import(node, "__future__", source, record),
        _ => {}
    }
}
