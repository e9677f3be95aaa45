//! Python parsing wrapper used by the extraction pass.
//!
//! Uses the native tree-sitter Python grammar. tree-sitter always produces a
//! tree, so syntax errors are detected by looking for ERROR / MISSING nodes.
//! The grammar also accepts Python 2 `print` and `exec` statements; those are
//! rejected as well.

use tree_sitter::{Node, Parser, Tree};

use crate::errors::{NbDeployError, NbResult};

const SNIPPET_CHARS: usize = 40;

/// Statement kinds the grammar still parses but Python 3 does not accept.
const PYTHON2_ONLY_KINDS: &[&str] = &["print_statement", "exec_statement"];

/// Parse `source` as a Python module. Fails on any syntax error.
pub fn parse_python(source: &str) -> NbResult<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| NbDeployError::Parse {
            line: 0,
            column: 0,
            message: format!("failed to load Python grammar: {e}"),
        })?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| NbDeployError::Parse {
            line: 0,
            column: 0,
            message: "parser produced no tree".to_string(),
        })?;

    if let Some(node) = first_invalid_node(tree.root_node()) {
        let position = node.start_position();
        let message = if PYTHON2_ONLY_KINDS.contains(&node.kind()) {
            format!("`{}` is Python 2 syntax", node.kind())
        } else if node.is_missing() {
            format!("missing `{}`", node.kind())
        } else {
            let snippet: String = node_text(&node, source)
                .chars()
                .take(SNIPPET_CHARS)
                .collect();
            format!("invalid syntax near `{}`", snippet.trim())
        };
        return Err(NbDeployError::Parse {
            line: position.row + 1,
            column: position.column + 1,
            message,
        });
    }

    Ok(tree)
}

/// Depth-first search, in source order, for the first ERROR or MISSING node
/// or Python 2 only statement.
fn first_invalid_node(root: Node<'_>) -> Option<Node<'_>> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() || PYTHON2_ONLY_KINDS.contains(&node.kind()) {
            return Some(node);
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    None
}

/// Exact source slice covered by a node.
#[inline]
pub fn node_text<'a>(node: &Node<'_>, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_module() {
        let tree = parse_python("def f(x):\n    return x\n").unwrap();
        assert_eq!(tree.root_node().kind(), "module");
        assert!(!tree.root_node().has_error());
    }

    #[test]
    fn reports_syntax_error_position() {
        let err = parse_python("x = 1\ndef broken(:\n    pass\n").unwrap_err();
        match err {
            NbDeployError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn python2_print_is_rejected() {
        let err = parse_python("print \"x\"\n").unwrap_err();
        match err {
            NbDeployError::Parse { line, column, message } => {
                assert_eq!((line, column), (1, 1));
                assert!(message.contains("print_statement"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn python2_statements_inside_bodies_are_rejected() {
        for source in [
            "def f(out):\n    print >>out, 'x'\n",
            "x = 1\nexec \"y = 2\"\n",
        ] {
            assert!(
                matches!(parse_python(source), Err(NbDeployError::Parse { .. })),
                "{source:?} should be rejected"
            );
        }
        let err = parse_python("def f(out):\n    print >>out, 'x'\n").unwrap_err();
        assert!(matches!(err, NbDeployError::Parse { line: 2, .. }));
    }

    #[test]
    fn print_function_call_is_valid() {
        assert!(parse_python("print(\"x\")\nprint(1, end='')\n").is_ok());
    }

    #[test]
    fn empty_source_is_valid() {
        let tree = parse_python("").unwrap();
        assert_eq!(tree.root_node().named_child_count(), 0);
    }

    #[test]
    fn node_text_slices_exact_bytes() {
        let source = "x = 'é'\nname = 'ü'\n";
        let tree = parse_python(source).unwrap();
        let root = tree.root_node();
        let second = root.named_child(1).unwrap();
        assert_eq!(node_text(&second, source), "name = 'ü'");
    }
}
