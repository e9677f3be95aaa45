//! Python bindings for the extraction half of the pipeline, so notebook users
//! can call it without the CLI.

use std::path::Path;

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::extract;
use crate::materialize::writer::{self, TIMESTAMP_FORMAT};
use crate::models::WrittenFile;
use crate::notebook::load_notebook;
use crate::verify::is_equivalent;

#[pyfunction]
pub fn get_code_from_notebook(notebook_path: &str) -> PyResult<String> {
    Ok(load_notebook(Path::new(notebook_path))?.text)
}

/// `{"imports": {"modules": [...], "import_string": str}, "functions": {name: body},
/// "classes": {name: body}}`
#[pyfunction]
pub fn extract_code_elements(py: Python<'_>, code: &str) -> PyResult<PyObject> {
    let catalog = extract::extract_code_elements(code)?;

    let imports = PyDict::new(py);
    imports.set_item(
        "modules",
        PyList::new(py, catalog.imports.modules.iter().map(String::as_str))?,
    )?;
    imports.set_item("import_string", catalog.imports.import_string())?;

    let functions = PyDict::new(py);
    for (name, element) in &catalog.functions {
        functions.set_item(name.as_str(), element.body.as_str())?;
    }
    let classes = PyDict::new(py);
    for (name, element) in &catalog.classes {
        classes.set_item(name.as_str(), element.body.as_str())?;
    }

    let result = PyDict::new(py);
    result.set_item("imports", imports)?;
    result.set_item("functions", functions)?;
    result.set_item("classes", classes)?;

    Ok(result.into_any().unbind())
}

#[pyfunction]
pub fn check_equivalency(list1: Vec<String>, list2: Vec<String>) -> bool {
    is_equivalent(
        list1.iter().map(String::as_str),
        list2.iter().map(String::as_str),
    )
}

/// Returns `File written successfully to <path>` or the error text; write
/// failures are reported, not raised.
#[pyfunction]
#[pyo3(signature = (destination, file_name, code, description=None, custom_lines=None))]
pub fn write_python_file(
    destination: &str,
    file_name: &str,
    code: &str,
    description: Option<&str>,
    custom_lines: Option<&str>,
) -> String {
    let generated_at = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
    let result = writer::write_python_file(
        Path::new(destination),
        file_name,
        code,
        description,
        custom_lines,
        &generated_at,
    );
    WrittenFile {
        file_name: file_name.to_string(),
        result,
    }
    .to_string()
}
