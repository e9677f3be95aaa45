//! File materialization: one Python file per group plus a shared imports
//! module, all siblings in one destination directory.
//!
//! A missing element aborts only its own group and an I/O error only its own
//! file; both come back as values in the [`MaterializeReport`].

pub mod writer;

use std::path::{Component, Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::{info, warn};

use crate::errors::{FileWriteError, NbResult};
use crate::models::{
    ElementCatalog, FileGroup, Grouping, ImportsFileStatus, MaterializeReport, WrittenFile,
};
use writer::{create_python_file, normalize_file_name, write_python_file, TIMESTAMP_FORMAT};

pub const IMPORTS_MODULE: &str = "imports";
pub const IMPORTS_DESCRIPTION: &str = "Imports for the project.";

/// Dotted Python module path for a destination directory (`out/src` →
/// `out.src`). Root, prefix and `.` components are dropped.
pub fn destination_module(destination: &Path) -> String {
    let parts: Vec<String> = destination
        .components()
        .filter_map(|c| match c {
            Component::Normal(os) => Some(os.to_string_lossy().to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect();
    parts.join(".")
}

pub struct Materializer {
    destination: PathBuf,
    generated_at: String,
}

impl Materializer {
    /// Timestamp is taken once so every file of a run carries the same one.
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
            generated_at: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    pub fn with_timestamp(mut self, generated_at: NaiveDateTime) -> Self {
        self.generated_at = generated_at.format(TIMESTAMP_FORMAT).to_string();
        self
    }

    /// `from <destination>.imports import *`
    pub fn import_line(&self) -> String {
        let module = destination_module(&self.destination);
        if module.is_empty() {
            format!("from {IMPORTS_MODULE} import *")
        } else {
            format!("from {module}.{IMPORTS_MODULE} import *")
        }
    }

    /// Create-only: an existing imports file is left exactly as it is.
    fn write_imports(&self, catalog: &ElementCatalog) -> ImportsFileStatus {
        match create_python_file(
            &self.destination,
            IMPORTS_MODULE,
            &catalog.imports.import_string(),
            Some(IMPORTS_DESCRIPTION),
            None,
            &self.generated_at,
        ) {
            Ok(Some(path)) => ImportsFileStatus::Written(path),
            Ok(None) => {
                let path = self.destination.join(normalize_file_name(IMPORTS_MODULE));
                info!(path = %path.display(), "Imports file already present, skipping");
                ImportsFileStatus::Skipped(path)
            }
            Err(err) => {
                warn!(error = %err, "Failed to write imports file");
                ImportsFileStatus::Failed(err)
            }
        }
    }

    fn group_code(group: &FileGroup, catalog: &ElementCatalog) -> Result<String, FileWriteError> {
        let mut code = String::new();
        for name in &group.element_names {
            let element = catalog
                .lookup(name)
                .ok_or_else(|| FileWriteError::ElementNotFound { name: name.clone() })?;
            if catalog.is_shadowed(name) {
                warn!(
                    file = %group.file_name,
                    name = %name,
                    "Name is both a function and a class; writing the class only"
                );
            }
            code.push_str(&element.body);
            code.push_str("\n\n");
        }
        Ok(code)
    }

    fn write_group(&self, group: &FileGroup, catalog: &ElementCatalog, import_line: &str) -> WrittenFile {
        let result = Self::group_code(group, catalog).and_then(|code| {
            write_python_file(
                &self.destination,
                &group.file_name,
                &code,
                Some(&group.description),
                Some(import_line),
                &self.generated_at,
            )
        });
        if let Err(err) = &result {
            warn!(file = %group.file_name, error = %err, "Group not written");
        }
        WrittenFile {
            file_name: group.file_name.clone(),
            result,
        }
    }

    /// Write the imports file (if absent) and every group. Only a failure to
    /// create the destination directory is fatal.
    pub fn write_all(
        &self,
        grouping: &Grouping,
        catalog: &ElementCatalog,
    ) -> NbResult<MaterializeReport> {
        std::fs::create_dir_all(&self.destination)?;

        let imports = self.write_imports(catalog);
        let import_line = self.import_line();
        let files: Vec<WrittenFile> = grouping
            .groups
            .iter()
            .map(|group| self.write_group(group, catalog, &import_line))
            .collect();

        let written = files.iter().filter(|f| f.is_ok()).count();
        info!(
            destination = %self.destination.display(),
            written,
            failed = files.len() - written,
            "Materialized grouping"
        );

        Ok(MaterializeReport { imports, files })
    }
}
