//! Parsing of the collaborator's grouping reply.
//!
//! Expected shape:
//! `{"<file>": {"description": "...", "content": ["name", ...]}, ...}`.
//! File order is kept as sent; a JSON object with a repeated key is rejected
//! rather than silently keeping the last value.

use std::collections::HashSet;
use std::fmt;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::errors::{NbDeployError, NbResult};
use crate::materialize::writer::normalize_file_name;
use crate::materialize::IMPORTS_MODULE;
use crate::models::{FileGroup, Grouping};

#[derive(Debug, Deserialize)]
struct ProposedFile {
    description: String,
    content: Vec<String>,
}

struct OrderedEntries(Vec<(String, ProposedFile)>);

impl<'de> Deserialize<'de> for OrderedEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = OrderedEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping file names to {description, content}")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some(entry) = map.next_entry::<String, ProposedFile>()? {
                    entries.push(entry);
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

fn check_file_name(file_name: &str) -> NbResult<()> {
    if file_name.trim().is_empty() {
        return Err(NbDeployError::ResponseFormat(
            "empty file name in grouping".to_string(),
        ));
    }
    if file_name.contains('/') || file_name.contains('\\') || file_name.contains("..") {
        return Err(NbDeployError::ResponseFormat(format!(
            "file name '{file_name}' must not contain a path"
        )));
    }
    Ok(())
}

/// Parse and shape-check a grouping reply.
pub fn parse_grouping(text: &str) -> NbResult<Grouping> {
    let OrderedEntries(entries) = serde_json::from_str(text)
        .map_err(|e| NbDeployError::ResponseFormat(format!("invalid grouping JSON: {e}")))?;

    let reserved = normalize_file_name(IMPORTS_MODULE);
    let mut seen: HashSet<String> = HashSet::new();
    let mut groups = Vec::with_capacity(entries.len());

    for (file_name, proposed) in entries {
        check_file_name(&file_name)?;
        let normalized = normalize_file_name(&file_name);
        if normalized == reserved {
            return Err(NbDeployError::ResponseFormat(format!(
                "file name '{file_name}' collides with the shared imports module"
            )));
        }
        if !seen.insert(normalized) {
            return Err(NbDeployError::ResponseFormat(format!(
                "file name '{file_name}' appears more than once"
            )));
        }
        groups.push(FileGroup {
            file_name,
            description: proposed.description,
            element_names: proposed.content,
        });
    }

    Ok(Grouping { groups })
}
