//! Page definitions collected from the resolved configuration.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use crate::ConfigError;
use crate::include::{ResolvedConfig, Segment, key_label};

/// Top-level keys holding page definitions, in lookup order.
const PAGE_KEYS: [&str; 2] = ["modules", "pages"];

/// One page definition and the file it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry {
    pub id: String,
    pub fields: Mapping,
    /// Configuration file that defines this entry.
    pub source: PathBuf,
}

impl RawEntry {
    /// Field value by name.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// String field, if present and a string.
    #[must_use]
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Directory of the defining file, the base for the entry's relative paths.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        self.source.parent().unwrap_or(Path::new("."))
    }
}

/// A definition that was not a mapping and was left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub id: String,
    pub source: PathBuf,
    pub reason: String,
}

/// Page definitions keyed by id, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct DefinitionMap {
    entries: Vec<RawEntry>,
    index: HashMap<String, usize>,
    skipped: Vec<SkippedEntry>,
    /// Defining file of every id seen, kept or skipped.
    sources: HashMap<String, PathBuf>,
}

impl DefinitionMap {
    /// Collect page definitions from `modules` (or `pages`).
    ///
    /// The value is either a mapping of id to definition or a list of such
    /// mappings, typically one `!include` per list element.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DuplicatePage` when two fragments define the
    /// same id, and `ConfigError::Validation` when the root or the page
    /// collection has the wrong shape.
    pub fn from_resolved(resolved: &ResolvedConfig) -> Result<Self, ConfigError> {
        let root = match resolved.value() {
            Value::Mapping(root) => root,
            Value::Null => return Ok(Self::default()),
            _ => {
                return Err(ConfigError::Validation(
                    "configuration root must be a mapping".to_owned(),
                ));
            }
        };

        let mut map = Self::default();
        let Some((key, pages)) = PAGE_KEYS
            .iter()
            .find_map(|key| root.get(*key).map(|value| (*key, value)))
        else {
            return Ok(map);
        };

        let base = vec![Segment::Key(key.to_owned())];
        match pages {
            Value::Null => {}
            Value::Mapping(fragment) => map.add_fragment(fragment, &base, resolved)?,
            Value::Sequence(fragments) => {
                for (idx, fragment) in fragments.iter().enumerate() {
                    let mut location = base.clone();
                    location.push(Segment::Index(idx));
                    match fragment {
                        Value::Mapping(fragment) => {
                            map.add_fragment(fragment, &location, resolved)?;
                        }
                        Value::Null => {}
                        _ => {
                            return Err(ConfigError::Validation(format!(
                                "'{key}[{idx}]' must be a mapping of page definitions"
                            )));
                        }
                    }
                }
            }
            _ => {
                return Err(ConfigError::Validation(format!(
                    "'{key}' must be a mapping or a list of mappings"
                )));
            }
        }

        tracing::debug!(
            pages = map.entries.len(),
            skipped = map.skipped.len(),
            "Collected page definitions"
        );
        Ok(map)
    }

    fn add_fragment(
        &mut self,
        fragment: &Mapping,
        location: &[Segment],
        resolved: &ResolvedConfig,
    ) -> Result<(), ConfigError> {
        for (key, definition) in fragment {
            let Some(id) = key_label(key) else {
                return Err(ConfigError::Validation(
                    "page ids must be strings".to_owned(),
                ));
            };

            let mut entry_location = location.to_vec();
            entry_location.push(Segment::Key(id.clone()));
            let source = resolved.source_of(&entry_location).to_path_buf();

            if let Some(first) = self.sources.get(&id) {
                return Err(ConfigError::DuplicatePage {
                    id,
                    first: first.clone(),
                    second: source,
                });
            }
            self.sources.insert(id.clone(), source.clone());

            match definition {
                Value::Mapping(fields) => {
                    self.index.insert(id.clone(), self.entries.len());
                    self.entries.push(RawEntry {
                        id,
                        fields: fields.clone(),
                        source,
                    });
                }
                other => {
                    let reason = format!("definition is {}, expected a mapping", kind_of(other));
                    tracing::debug!(page = %id, %reason, "Skipping page definition");
                    self.skipped.push(SkippedEntry { id, source, reason });
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&RawEntry> {
        self.index.get(id).map(|&idx| &self.entries[idx])
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Entries in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &RawEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Definitions that were left out because they were not mappings.
    #[must_use]
    pub fn skipped(&self) -> &[SkippedEntry] {
        &self.skipped
    }
}

/// YAML type name for messages.
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
