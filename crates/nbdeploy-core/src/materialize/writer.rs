//! Generic "write code to a Python file" primitive.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::errors::FileWriteError;

pub const PY_SUFFIX: &str = ".py";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append `.py` unless already present.
pub fn normalize_file_name(file_name: &str) -> String {
    if file_name.ends_with(PY_SUFFIX) {
        file_name.to_string()
    } else {
        format!("{file_name}{PY_SUFFIX}")
    }
}

/// Compose the file text. Each header part is only emitted when supplied:
///
/// ```text
/// """
/// <description>
/// File generated on: <timestamp>
/// """
///
/// <custom lines>
///
/// <code>
/// ```
pub fn render_file(
    code: &str,
    description: Option<&str>,
    custom_lines: Option<&str>,
    generated_at: &str,
) -> String {
    let mut text = code.to_string();
    if let Some(lines) = custom_lines {
        text = format!("{lines}\n\n{text}");
    }
    if let Some(description) = description {
        text = format!("\"\"\"\n{description}\nFile generated on: {generated_at}\n\"\"\"\n\n{text}");
    }
    text
}

/// Write `code` to `<destination>/<file_name>.py`, overwriting any file there.
pub fn write_python_file(
    destination: &Path,
    file_name: &str,
    code: &str,
    description: Option<&str>,
    custom_lines: Option<&str>,
    generated_at: &str,
) -> Result<PathBuf, FileWriteError> {
    let full_path = destination.join(normalize_file_name(file_name));
    let text = render_file(code, description, custom_lines, generated_at);
    std::fs::write(&full_path, text).map_err(|source| FileWriteError::Write {
        path: full_path.clone(),
        source,
    })?;
    Ok(full_path)
}

/// Like [`write_python_file`], but only creates: `Ok(None)` when the file
/// already exists, which is left untouched.
pub fn create_python_file(
    destination: &Path,
    file_name: &str,
    code: &str,
    description: Option<&str>,
    custom_lines: Option<&str>,
    generated_at: &str,
) -> Result<Option<PathBuf>, FileWriteError> {
    let full_path = destination.join(normalize_file_name(file_name));
    let mut file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&full_path)
    {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(None),
        Err(source) => {
            return Err(FileWriteError::Write {
                path: full_path,
                source,
            })
        }
    };
    let text = render_file(code, description, custom_lines, generated_at);
    file.write_all(text.as_bytes())
        .map_err(|source| FileWriteError::Write {
            path: full_path.clone(),
            source,
        })?;
    Ok(Some(full_path))
}
