//! Fixed instruction text and the request sent to a grouping collaborator.

use serde::Serialize;

use crate::models::{ElementCatalog, SourceUnit};

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant designed to output JSON.";

pub const INSTRUCTIONS: &str = concat!(
    "Please group the classes and functions defined in the following code into separate ",
    "python files. You do not have to list out the full text to be included in each python ",
    "file, but please provide a simple list of what function and or class each python file ",
    "contains as well as a short description the file's basic functionality and purpose. ",
    "Please try to group the functions and classes into as few files as possible. Please ",
    "provide JSON output in the following format for each file: ",
    "'filename.py': {'description': 'Two-Three sentence description', ",
    "'content': ['function1', 'class1']}"
);

/// Which text the collaborator sees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CodeStringMode {
    /// Extracted function and class bodies only.
    #[default]
    Reconstructed,
    /// The notebook source as assembled, imports and all.
    FullSource,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProposalRequest {
    pub model: String,
    pub seed: i64,
    pub instructions: String,
    pub code: String,
}

impl ProposalRequest {
    pub fn new(
        mode: CodeStringMode,
        unit: &SourceUnit,
        catalog: &ElementCatalog,
        model: impl Into<String>,
        seed: i64,
    ) -> Self {
        let code = match mode {
            CodeStringMode::Reconstructed => catalog.code_string(),
            CodeStringMode::FullSource => unit.text.clone(),
        };
        Self {
            model: model.into(),
            seed,
            instructions: INSTRUCTIONS.to_string(),
            code,
        }
    }
}
