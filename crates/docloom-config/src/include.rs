//! `!include` resolution.
//!
//! A configuration may be split across files. Any YAML node tagged
//! `!include <path>` is replaced by the parsed contents of that file, with
//! the path taken relative to the file holding the tag. Included files may
//! include further files.
//!
//! Besides the merged tree, resolution records where each file was spliced
//! in, so later stages can tell which file defined a given node and resolve
//! that node's own relative paths against it.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value};

use crate::ConfigError;

/// YAML tag that splices another file in place.
const INCLUDE_TAG: &str = "include";

/// One step of a path into a YAML tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{key}"),
            Self::Index(idx) => write!(f, "[{idx}]"),
        }
    }
}

/// Text form of a mapping key.
///
/// Page ids and field names are written as plain scalars, which YAML may
/// type as numbers or booleans. Non-scalar keys have no text form.
#[must_use]
pub fn key_label(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A configuration tree with every `!include` expanded.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    root_file: PathBuf,
    value: Value,
    /// Splice points in resolution order: location and the file spliced there.
    splices: Vec<(Vec<Segment>, PathBuf)>,
}

impl ResolvedConfig {
    /// The merged configuration tree.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Canonical path of the top-level configuration file.
    #[must_use]
    pub fn root_file(&self) -> &Path {
        &self.root_file
    }

    /// File that defines the node at `location`.
    ///
    /// This is the file spliced in at the longest recorded prefix of
    /// `location`, or the root file when no include covers it.
    #[must_use]
    pub fn source_of(&self, location: &[Segment]) -> &Path {
        self.splices
            .iter()
            .filter(|(at, _)| location.starts_with(at))
            .max_by_key(|(at, _)| at.len())
            .map_or(self.root_file.as_path(), |(_, file)| file.as_path())
    }

    /// Every file that took part in resolution, root first.
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.root_file.as_path())
            .chain(self.splices.iter().map(|(_, file)| file.as_path()))
    }
}

/// Expands `!include` tags, detecting include cycles.
#[derive(Debug, Default)]
pub struct IncludeResolver {
    /// Files currently being expanded, outermost first.
    stack: Vec<PathBuf>,
    splices: Vec<(Vec<Segment>, PathBuf)>,
}

impl IncludeResolver {
    /// Load `root` and expand all includes reachable from it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if `root` does not exist,
    /// `CircularInclude` if a file includes itself directly or transitively,
    /// `IncludeNotFound` for a missing include target, `InvalidInclude` for
    /// a tag without a path, and `Parse` / `Io` for unreadable files.
    pub fn resolve(root: &Path) -> Result<ResolvedConfig, ConfigError> {
        if !root.exists() {
            return Err(ConfigError::NotFound(root.to_path_buf()));
        }
        let root_file = canonical(root)?;

        let mut resolver = Self::default();
        let value = resolver.load_file(&root_file, &mut Vec::new())?;

        tracing::debug!(
            root = %root_file.display(),
            includes = resolver.splices.len(),
            "Resolved configuration"
        );

        Ok(ResolvedConfig {
            root_file,
            value,
            splices: resolver.splices,
        })
    }

    fn load_file(&mut self, path: &Path, location: &mut Vec<Segment>) -> Result<Value, ConfigError> {
        if let Some(pos) = self.stack.iter().position(|p| p == path) {
            let mut chain = self.stack[pos..].to_vec();
            chain.push(path.to_path_buf());
            return Err(ConfigError::CircularInclude { chain });
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        };

        self.stack.push(path.to_path_buf());
        let expanded = self.expand(value, path, location);
        self.stack.pop();
        expanded
    }

    fn expand(
        &mut self,
        value: Value,
        file: &Path,
        location: &mut Vec<Segment>,
    ) -> Result<Value, ConfigError> {
        match value {
            Value::Tagged(tagged) if tagged.tag == INCLUDE_TAG => {
                self.include(tagged.value, file, location)
            }
            Value::Tagged(tagged) => {
                let TaggedValue { tag, value } = *tagged;
                let value = self.expand(value, file, location)?;
                Ok(Value::Tagged(Box::new(TaggedValue { tag, value })))
            }
            Value::Mapping(mapping) => {
                let mut out = Mapping::with_capacity(mapping.len());
                for (key, value) in mapping {
                    location.push(Segment::Key(key_label(&key).unwrap_or_default()));
                    let value = self.expand(value, file, location);
                    location.pop();
                    out.insert(key, value?);
                }
                Ok(Value::Mapping(out))
            }
            Value::Sequence(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (idx, item) in items.into_iter().enumerate() {
                    location.push(Segment::Index(idx));
                    let item = self.expand(item, file, location);
                    location.pop();
                    out.push(item?);
                }
                Ok(Value::Sequence(out))
            }
            other => Ok(other),
        }
    }

    fn include(
        &mut self,
        target: Value,
        file: &Path,
        location: &mut Vec<Segment>,
    ) -> Result<Value, ConfigError> {
        let Value::String(target) = target else {
            return Err(ConfigError::InvalidInclude {
                file: file.to_path_buf(),
                message: "!include expects a file path".to_owned(),
            });
        };
        let target = target.trim();
        if target.is_empty() {
            return Err(ConfigError::InvalidInclude {
                file: file.to_path_buf(),
                message: "!include path is empty".to_owned(),
            });
        }

        let base = file.parent().unwrap_or(Path::new("."));
        let candidate = base.join(target);
        if !candidate.exists() {
            return Err(ConfigError::IncludeNotFound {
                path: candidate,
                included_from: file.to_path_buf(),
            });
        }
        let included = canonical(&candidate)?;

        tracing::debug!(
            file = %included.display(),
            from = %file.display(),
            "Including configuration file"
        );
        self.splices.push((location.clone(), included.clone()));
        self.load_file(&included, location)
    }
}

fn canonical(path: &Path) -> Result<PathBuf, ConfigError> {
    path.canonicalize().map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    fn key(s: &str) -> Segment {
        Segment::Key(s.to_owned())
    }

    #[test]
    fn test_resolve_without_includes() {
        let temp = tempfile::tempdir().unwrap();
        let root = write(temp.path(), "docs.yaml", "modules:\n  a:\n    title: A\n");

        let resolved = IncludeResolver::resolve(&root).unwrap();

        let expected: Value = serde_yaml::from_str("modules:\n  a:\n    title: A\n").unwrap();
        assert_eq!(resolved.value(), &expected);
        assert_eq!(resolved.root_file(), root.canonicalize().unwrap());
        assert_eq!(resolved.files().count(), 1);
    }

    #[test]
    fn test_nested_relative_includes() {
        let temp = tempfile::tempdir().unwrap();
        let root = write(
            temp.path(),
            "docs.yaml",
            "modules:\n  - !include parts/guides.yaml\n",
        );
        write(
            temp.path(),
            "parts/guides.yaml",
            "guide:\n  title: Guide\n  details: !include deep/details.yaml\n",
        );
        write(temp.path(), "parts/deep/details.yaml", "overview: Deep text\n");

        let resolved = IncludeResolver::resolve(&root).unwrap();

        let expected: Value = serde_yaml::from_str(
            "modules:\n  - guide:\n      title: Guide\n      details:\n        overview: Deep text\n",
        )
        .unwrap();
        assert_eq!(resolved.value(), &expected);
    }

    #[test]
    fn test_provenance_longest_prefix() {
        let temp = tempfile::tempdir().unwrap();
        let root = write(
            temp.path(),
            "docs.yaml",
            "title: Root\nmodules:\n  - !include parts/a.yaml\n  - local:\n      title: Local\n",
        );
        write(temp.path(), "parts/a.yaml", "a:\n  nested: !include b.yaml\n");
        write(temp.path(), "parts/b.yaml", "x: 1\n");

        let resolved = IncludeResolver::resolve(&root).unwrap();
        let a = temp.path().join("parts/a.yaml").canonicalize().unwrap();
        let b = temp.path().join("parts/b.yaml").canonicalize().unwrap();

        let page_a = [key("modules"), Segment::Index(0), key("a")];
        assert_eq!(resolved.source_of(&page_a), a);

        let nested = [key("modules"), Segment::Index(0), key("a"), key("nested"), key("x")];
        assert_eq!(resolved.source_of(&nested), b);

        let local = [key("modules"), Segment::Index(1), key("local")];
        assert_eq!(resolved.source_of(&local), resolved.root_file());
        assert_eq!(resolved.source_of(&[]), resolved.root_file());
    }

    #[test]
    fn test_circular_include() {
        let temp = tempfile::tempdir().unwrap();
        let root = write(temp.path(), "a.yaml", "child: !include b.yaml\n");
        write(temp.path(), "b.yaml", "child: !include a.yaml\n");

        let err = IncludeResolver::resolve(&root).unwrap_err();

        let ConfigError::CircularInclude { chain } = err else {
            panic!("expected CircularInclude, got {err:?}");
        };
        let names: Vec<_> = chain
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.yaml", "b.yaml", "a.yaml"]);
    }

    #[test]
    fn test_self_include() {
        let temp = tempfile::tempdir().unwrap();
        let root = write(temp.path(), "a.yaml", "me: !include a.yaml\n");

        let err = IncludeResolver::resolve(&root).unwrap_err();
        assert!(matches!(err, ConfigError::CircularInclude { ref chain } if chain.len() == 2));
    }

    #[test]
    fn test_same_file_included_twice_is_not_a_cycle() {
        let temp = tempfile::tempdir().unwrap();
        let root = write(
            temp.path(),
            "docs.yaml",
            "first: !include shared.yaml\nsecond: !include shared.yaml\n",
        );
        write(temp.path(), "shared.yaml", "value: 1\n");

        let resolved = IncludeResolver::resolve(&root).unwrap();
        assert_eq!(resolved.files().count(), 3);
    }

    #[test]
    fn test_include_not_found() {
        let temp = tempfile::tempdir().unwrap();
        let root = write(temp.path(), "docs.yaml", "modules: !include missing.yaml\n");

        let err = IncludeResolver::resolve(&root).unwrap_err();

        let ConfigError::IncludeNotFound {
            path,
            included_from,
        } = err
        else {
            panic!("expected IncludeNotFound, got {err:?}");
        };
        assert!(path.ends_with("missing.yaml"));
        assert_eq!(included_from, root.canonicalize().unwrap());
    }

    #[test]
    fn test_include_requires_string_path() {
        let temp = tempfile::tempdir().unwrap();
        let root = write(temp.path(), "docs.yaml", "modules: !include [a.yaml]\n");

        let err = IncludeResolver::resolve(&root).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidInclude { .. }));
    }

    #[test]
    fn test_parse_error_names_file() {
        let temp = tempfile::tempdir().unwrap();
        let root = write(temp.path(), "docs.yaml", "modules: !include bad.yaml\n");
        write(temp.path(), "bad.yaml", "a: [unclosed\n");

        let err = IncludeResolver::resolve(&root).unwrap_err();
        let ConfigError::Parse { path, .. } = err else {
            panic!("expected Parse, got {err:?}");
        };
        assert!(path.ends_with("bad.yaml"));
    }

    #[test]
    fn test_missing_root() {
        let temp = tempfile::tempdir().unwrap();
        let err = IncludeResolver::resolve(&temp.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_empty_included_file_is_null() {
        let temp = tempfile::tempdir().unwrap();
        let root = write(temp.path(), "docs.yaml", "extra: !include empty.yaml\n");
        write(temp.path(), "empty.yaml", "");

        let resolved = IncludeResolver::resolve(&root).unwrap();
        assert_eq!(resolved.value().get("extra"), Some(&Value::Null));
    }

    #[test]
    fn test_key_label() {
        assert_eq!(key_label(&Value::from("page")), Some("page".to_owned()));
        assert_eq!(key_label(&Value::from(42)), Some("42".to_owned()));
        assert_eq!(key_label(&Value::Null), None);
    }
}
