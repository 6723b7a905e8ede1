//! Configuration management for docloom.
//!
//! Loads a YAML project configuration, expands `!include` tags, collects
//! page definitions and parses tool-wide settings.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Includes
//!
//! Any node may be replaced by another file with `!include <path>`, where
//! the path is relative to the including file:
//!
//! ```yaml
//! modules:
//!   - !include guides/pages.yaml
//!   - !include reference/pages.yaml
//! ```
//!
//! Each page remembers the file that defines it, so paths inside a page
//! definition (markdown includes, diagrams) resolve next to that file.

mod definitions;
mod include;
mod settings;

use std::path::{Path, PathBuf};

use serde_yaml::Value;

pub use definitions::{DefinitionMap, RawEntry, SkippedEntry};
pub use include::{IncludeResolver, ResolvedConfig, Segment, key_label};
pub use settings::{
    CustomSection, DiagramSettings, DoxygenSettings, ExtractionSettings, IndexSettings,
    NavigationSettings, Settings,
};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override index page generation.
    pub generate_index: Option<bool>,
    /// Override API extraction.
    pub extraction_enabled: Option<bool>,
    /// Override `PlantUML` directive availability.
    pub plantuml: Option<bool>,
    /// Override Mermaid directive availability.
    pub mermaid: Option<bool>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// YAML parsing error.
    #[error("YAML parse error in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    /// A file includes itself, directly or through other files.
    #[error("Circular include: {}", display_chain(.chain))]
    CircularInclude {
        /// Files in include order, ending with the repeated one.
        chain: Vec<PathBuf>,
    },
    /// An `!include` target does not exist.
    #[error(
        "Included file not found: {} (included from {})",
        path.display(),
        included_from.display()
    )]
    IncludeNotFound { path: PathBuf, included_from: PathBuf },
    /// An `!include` tag without a usable path.
    #[error("Invalid include in {}: {message}", file.display())]
    InvalidInclude { file: PathBuf, message: String },
    /// The same page id is defined twice.
    #[error(
        "Page '{id}' is defined in both {} and {}",
        first.display(),
        second.display()
    )]
    DuplicatePage {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

fn display_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// A loaded project configuration.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub settings: Settings,
    pub definitions: DefinitionMap,
    resolved: ResolvedConfig,
}

impl ProjectConfig {
    /// Load configuration from `config_path` with optional CLI settings.
    ///
    /// CLI settings are applied after parsing, allowing CLI arguments to
    /// take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist, an include fails, parsing
    /// fails, or a page id is defined twice.
    pub fn load(
        config_path: &Path,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let resolved = IncludeResolver::resolve(config_path)?;
        let settings = parse_settings(&resolved)?;
        let definitions = DefinitionMap::from_resolved(&resolved)?;

        let mut config = Self {
            settings,
            definitions,
            resolved,
        };
        if let Some(cli) = cli_settings {
            config.apply_cli_settings(cli);
        }

        tracing::info!(
            config = %config.config_path().display(),
            pages = config.definitions.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(generate_index) = settings.generate_index {
            self.settings.generate_index = generate_index;
        }
        if let Some(enabled) = settings.extraction_enabled {
            self.settings.extraction.enabled = enabled;
        }
        if let Some(plantuml) = settings.plantuml {
            self.settings.diagrams.plantuml = plantuml;
        }
        if let Some(mermaid) = settings.mermaid {
            self.settings.diagrams.mermaid = mermaid;
        }
    }

    /// Canonical path of the top-level configuration file.
    #[must_use]
    pub fn config_path(&self) -> &Path {
        self.resolved.root_file()
    }

    /// Directory of the top-level configuration file.
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        self.config_path().parent().unwrap_or(Path::new("."))
    }

    /// The merged configuration tree.
    #[must_use]
    pub fn resolved(&self) -> &ResolvedConfig {
        &self.resolved
    }

    /// Top-level value by key, including keys docloom itself ignores.
    #[must_use]
    pub fn section(&self, key: &str) -> Option<&Value> {
        self.resolved.value().get(key)
    }
}

fn parse_settings(resolved: &ResolvedConfig) -> Result<Settings, ConfigError> {
    match resolved.value() {
        Value::Null => Ok(Settings::default()),
        Value::Mapping(_) => {
            serde_yaml::from_value(resolved.value().clone()).map_err(|source| ConfigError::Parse {
                path: resolved.root_file().to_path_buf(),
                source,
            })
        }
        _ => Err(ConfigError::Validation(
            "configuration root must be a mapping".to_owned(),
        )),
    }
}
