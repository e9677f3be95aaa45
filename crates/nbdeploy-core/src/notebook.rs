//! Notebook loading: turns a `.ipynb` document into one [`SourceUnit`].
//!
//! Only code cells that have never recorded an output are kept. A cell with
//! any output, even a stale one, is dropped.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::errors::{NbDeployError, NbResult};
use crate::models::SourceUnit;

#[derive(Debug, Deserialize)]
struct NotebookDocument {
    nbformat: u32,
    #[serde(default)]
    cells: Vec<Cell>,
    /// nbformat 3 nests cells under worksheets.
    #[serde(default)]
    worksheets: Vec<Worksheet>,
}

#[derive(Debug, Deserialize)]
struct Worksheet {
    #[serde(default)]
    cells: Vec<Cell>,
}

#[derive(Debug, Deserialize)]
struct Cell {
    cell_type: CellType,
    /// nbformat 3 code cells keep their text under `input`.
    #[serde(default, alias = "input")]
    source: MultilineString,
    #[serde(default)]
    outputs: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum CellType {
    Code,
    Markdown,
    Raw,
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MultilineString {
    Single(String),
    Lines(Vec<String>),
}

impl Default for MultilineString {
    fn default() -> Self {
        MultilineString::Single(String::new())
    }
}

impl MultilineString {
    fn to_text(&self) -> String {
        match self {
            MultilineString::Single(s) => s.clone(),
            MultilineString::Lines(lines) => lines.concat(),
        }
    }
}

impl Cell {
    fn is_untouched_code(&self) -> bool {
        self.cell_type == CellType::Code && self.outputs.is_empty()
    }
}

/// Build a [`SourceUnit`] from notebook JSON text.
pub fn source_from_json(json: &str) -> NbResult<SourceUnit> {
    let document: NotebookDocument = serde_json::from_str(json)
        .map_err(|e| NbDeployError::Load(format!("invalid notebook document: {e}")))?;

    let cells: Vec<&Cell> = if document.nbformat >= 4 {
        document.cells.iter().collect()
    } else {
        document
            .worksheets
            .iter()
            .flat_map(|w| w.cells.iter())
            .collect()
    };

    let mut text = String::new();
    let mut cells_used = 0usize;
    let mut cells_skipped = 0usize;

    for cell in cells {
        if cell.is_untouched_code() {
            text.push('\n');
            text.push_str(&cell.source.to_text());
            text.push('\n');
            cells_used += 1;
        } else {
            cells_skipped += 1;
        }
    }

    debug!(
        nbformat = document.nbformat,
        cells_used, cells_skipped, "Assembled notebook source"
    );

    Ok(SourceUnit {
        text: text.trim().to_string(),
        cells_used,
        cells_skipped,
    })
}

/// Read a notebook from disk and assemble its eligible code.
pub fn load_notebook(path: &Path) -> NbResult<SourceUnit> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| NbDeployError::Load(format!("failed to read {}: {e}", path.display())))?;
    source_from_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_code_cells_without_outputs() {
        let json = r##"{
            "nbformat": 4,
            "nbformat_minor": 5,
            "metadata": {},
            "cells": [
                {"cell_type": "code", "source": "def a():\n    return 1", "outputs": [], "metadata": {}},
                {"cell_type": "code", "source": "print(a())", "outputs": [{"output_type": "stream", "text": "1"}], "metadata": {}},
                {"cell_type": "markdown", "source": "# Title", "metadata": {}}
            ]
        }"##;
        let unit = source_from_json(json).unwrap();
        assert_eq!(unit.text, "def a():\n    return 1");
        assert_eq!(unit.cells_used, 1);
        assert_eq!(unit.cells_skipped, 2);
    }

    #[test]
    fn joins_cells_with_blank_line() {
        let json = r#"{
            "nbformat": 4,
            "cells": [
                {"cell_type": "code", "source": ["import os\n", "import sys"], "outputs": []},
                {"cell_type": "code", "source": "x = 1", "outputs": []}
            ]
        }"#;
        let unit = source_from_json(json).unwrap();
        assert_eq!(unit.text, "import os\nimport sys\n\nx = 1");
    }

    #[test]
    fn reads_nbformat3_worksheets() {
        let json = r#"{
            "nbformat": 3,
            "worksheets": [{"cells": [
                {"cell_type": "code", "input": ["def f():\n", "    pass"], "outputs": []},
                {"cell_type": "heading", "source": "Intro", "level": 1}
            ]}]
        }"#;
        let unit = source_from_json(json).unwrap();
        assert_eq!(unit.text, "def f():\n    pass");
        assert_eq!(unit.cells_skipped, 1);
    }

    #[test]
    fn malformed_json_is_load_error() {
        let err = source_from_json("{not json").unwrap_err();
        assert!(matches!(err, NbDeployError::Load(_)));
    }

    #[test]
    fn missing_nbformat_is_load_error() {
        let err = source_from_json(r#"{"cells": []}"#).unwrap_err();
        assert!(matches!(err, NbDeployError::Load(_)));
    }

    #[test]
    fn unreadable_path_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_notebook(&dir.path().join("missing.ipynb")).unwrap_err();
        assert!(matches!(err, NbDeployError::Load(_)));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nb.ipynb");
        std::fs::write(
            &path,
            r#"{"nbformat": 4, "cells": [{"cell_type": "code", "source": "y = 2\n", "outputs": []}]}"#,
        )
        .unwrap();
        let unit = load_notebook(&path).unwrap();
        assert_eq!(unit.as_str(), "y = 2");
    }
}
