//! nbdeploy core library: turn a Jupyter notebook into organized Python
//! modules.
//!
//! The pipeline loads a notebook's untouched code cells, extracts top-level
//! imports, functions and classes with their verbatim source, asks a grouping
//! collaborator (an LLM, or a saved reply) how to split them into files,
//! checks the proposal names exactly the extracted elements, and writes the
//! files. With the `python` feature the crate also builds as a Python
//! extension module (`nbdeploy_core`).

pub mod config;
pub mod errors;
pub mod extract;
pub mod grouping;
pub mod materialize;
pub mod models;
pub mod notebook;
pub mod pipeline;
pub mod verify;

#[cfg(feature = "python")]
mod python;

pub use config::DeployConfig;
pub use errors::{FileWriteError, NbDeployError, NbResult};
pub use pipeline::{Pipeline, RunReport, Stage};

#[cfg(feature = "python")]
use pyo3::prelude::*;

// ---------------------------------------------------------------------------
// Top-level Python module: nbdeploy_core
// ---------------------------------------------------------------------------

#[cfg(feature = "python")]
#[pymodule]
fn nbdeploy_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("DEFAULT_MODEL", config::DEFAULT_MODEL)?;
    m.add("DEFAULT_SEED", config::DEFAULT_SEED)?;

    m.add_function(wrap_pyfunction!(python::get_code_from_notebook, m)?)?;
    m.add_function(wrap_pyfunction!(python::extract_code_elements, m)?)?;
    m.add_function(wrap_pyfunction!(python::check_equivalency, m)?)?;
    m.add_function(wrap_pyfunction!(python::write_python_file, m)?)?;

    Ok(())
}
