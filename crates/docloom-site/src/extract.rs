//! API extraction adapters.
//!
//! Languages whose reference documentation cannot be produced by a Sphinx
//! directive (Go, Java, Rust, Protobuf) are extracted by external tools.
//! Those tools are wrapped behind [`ApiExtractor`] and registered per
//! language; the assembler falls back to manual content when no adapter is
//! registered or extraction fails.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde_yaml::Mapping;

use crate::api::ApiLanguage;

/// What to extract for one page.
#[derive(Debug, Clone, Copy)]
pub struct ExtractRequest<'a> {
    pub page_id: &'a str,
    /// Packages, files or paths named by the page, in configuration order.
    pub targets: &'a [String],
    /// Source tree to extract from: `godoc_path` / `java_source_path`
    /// when set, otherwise the directory of the defining configuration file.
    pub base_dir: &'a Path,
    /// All fields of the page definition, for tool-specific options such
    /// as `protobuf_diagrams`.
    pub fields: &'a Mapping,
}

/// Extraction error.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The extraction tool is not installed or not usable.
    #[error("Extraction tool unavailable: {0}")]
    Unavailable(String),
    /// The tool ran and failed.
    #[error("Extraction failed: {0}")]
    Failed(String),
    /// I/O error.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Produces reStructuredText API reference content for one language.
pub trait ApiExtractor: Send + Sync {
    /// Language handled by this extractor.
    fn language(&self) -> ApiLanguage;

    /// Extract reference content for `request`.
    ///
    /// The returned text is inserted verbatim below the API heading.
    fn extract(&self, request: &ExtractRequest<'_>) -> Result<String, ExtractError>;
}

/// Extractors keyed by language. One extractor per language.
#[derive(Default)]
pub struct ExtractorRegistry {
    extractors: HashMap<ApiLanguage, Box<dyn ApiExtractor>>,
}

impl ExtractorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extractor, replacing any previous one for its language.
    pub fn register(&mut self, extractor: Box<dyn ApiExtractor>) {
        let language = extractor.language();
        tracing::debug!(%language, "Registered API extractor");
        self.extractors.insert(language, extractor);
    }

    #[must_use]
    pub fn get(&self, language: ApiLanguage) -> Option<&dyn ApiExtractor> {
        self.extractors.get(&language).map(AsRef::as_ref)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut languages: Vec<String> = self.extractors.keys().map(ToString::to_string).collect();
        languages.sort_unstable();
        f.debug_struct("ExtractorRegistry")
            .field("languages", &languages)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    struct Fixed(ApiLanguage, &'static str);

    impl ApiExtractor for Fixed {
        fn language(&self) -> ApiLanguage {
            self.0
        }

        fn extract(&self, request: &ExtractRequest<'_>) -> Result<String, ExtractError> {
            Ok(format!("{} {}", self.1, request.targets.join(",")))
        }
    }

    #[test]
    fn test_register_replaces_per_language() {
        let mut registry = ExtractorRegistry::new();
        registry.register(Box::new(Fixed(ApiLanguage::Go, "first")));
        registry.register(Box::new(Fixed(ApiLanguage::Go, "second")));
        registry.register(Box::new(Fixed(ApiLanguage::Rust, "rust")));

        let targets = vec!["pkg".to_owned()];
        let fields = Mapping::new();
        let request = ExtractRequest {
            page_id: "p",
            targets: &targets,
            base_dir: Path::new("."),
            fields: &fields,
        };
        let go = registry.get(ApiLanguage::Go).unwrap();
        assert_eq!(go.extract(&request).unwrap(), "second pkg");
        assert!(registry.get(ApiLanguage::Java).is_none());
        assert_eq!(
            format!("{registry:?}"),
            "ExtractorRegistry { languages: [\"go\", \"rust\"] }"
        );
    }

    #[test]
    fn test_registry_is_send_sync() {
        static_assertions::assert_impl_all!(ExtractorRegistry: Send, Sync);
    }
}
