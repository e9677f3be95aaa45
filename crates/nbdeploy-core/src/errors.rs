//! Error types for the nbdeploy core library.
//!
//! Two layers: [`NbDeployError`] aborts a whole run, while [`FileWriteError`]
//! is carried as a value next to the files that did get written.

use std::path::PathBuf;

use crate::models::ElementKind;

/// Fatal errors. Any of these halts the pipeline at the stage that raised it.
#[derive(Debug, thiserror::Error)]
pub enum NbDeployError {
    #[error("Load error: {0}")]
    Load(String),

    #[error("Parse error at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Duplicate name error: {kind} name '{name}' is already in use")]
    DuplicateName { kind: ElementKind, name: String },

    #[error("Response format error: {0}")]
    ResponseFormat(String),

    #[error("Proposal error: {0}")]
    Proposal(String),

    #[error(
        "Equivalence error: proposed grouping does not match extracted elements (missing: [{}], extra: [{}])",
        .missing.join(", "),
        .extra.join(", ")
    )]
    Equivalence {
        missing: Vec<String>,
        extra: Vec<String>,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type NbResult<T> = Result<T, NbDeployError>;

/// Per-file failure. Returned inline so sibling files still get written.
#[derive(Debug, thiserror::Error)]
pub enum FileWriteError {
    #[error("Error: {name} not found in code elements.")]
    ElementNotFound { name: String },

    #[error("Error writing file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(feature = "python")]
impl From<NbDeployError> for pyo3::PyErr {
    fn from(err: NbDeployError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};

        match &err {
            NbDeployError::Io(_) | NbDeployError::Load(_) => PyIOError::new_err(err.to_string()),
            NbDeployError::Proposal(_) | NbDeployError::Config(_) => {
                PyRuntimeError::new_err(err.to_string())
            }
            NbDeployError::Parse { .. }
            | NbDeployError::DuplicateName { .. }
            | NbDeployError::ResponseFormat(_)
            | NbDeployError::Equivalence { .. }
            | NbDeployError::Json(_) => PyValueError::new_err(err.to_string()),
        }
    }
}
