//! Generation pipeline.
//!
//! Runs every stage for one configuration and returns the documents to
//! write. Nothing is written here; the caller decides (real run or dry run).

use std::path::{Path, PathBuf};

use docloom_config::{CliSettings, ConfigError, ProjectConfig};
use docloom_diagrams::DirectiveSupport;

use crate::assemble::Assembler;
use crate::diagnostics::{Diagnostic, RunContext, Severity};
use crate::extract::ExtractorRegistry;
use crate::fields;
use crate::navigation::{NavigationOptions, emit};
use crate::render::{render_index, render_page};
use crate::tree::{BuildError, build_forest};

/// Index document name.
pub const INDEX_FILE: &str = "index.rst";

/// Default output directory, relative to the configuration file.
const DEFAULT_OUTPUT_DIR: &str = "docs";

/// Generation error.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// One generated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the output directory.
    pub path: PathBuf,
    pub content: String,
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    /// Page documents in hierarchy pre-order, then the index.
    pub files: Vec<GeneratedFile>,
    pub diagnostics: Vec<Diagnostic>,
}

impl GenerationOutput {
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }
}

/// Documentation generator for a loaded configuration.
#[derive(Debug)]
pub struct Generator<'a> {
    config: &'a ProjectConfig,
    extractors: ExtractorRegistry,
    output_dir: PathBuf,
}

impl<'a> Generator<'a> {
    /// Create a generator writing to `docs/` next to the configuration file.
    #[must_use]
    pub fn new(config: &'a ProjectConfig) -> Self {
        Self {
            config,
            extractors: ExtractorRegistry::new(),
            output_dir: config.config_dir().join(DEFAULT_OUTPUT_DIR),
        }
    }

    /// Use `extractors` for API extraction.
    #[must_use]
    pub fn with_extractors(mut self, extractors: ExtractorRegistry) -> Self {
        self.extractors = extractors;
        self
    }

    /// Set the output directory. Relative paths resolve against the
    /// current directory.
    #[must_use]
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        let output_dir = output_dir.into();
        self.output_dir = std::path::absolute(&output_dir).unwrap_or(output_dir);
        self
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Build every document.
    ///
    /// # Errors
    ///
    /// Returns an error when the page hierarchy is invalid. Problems with
    /// individual fields are reported as diagnostics instead.
    pub fn run(&self) -> Result<GenerationOutput, GenerateError> {
        let settings = &self.config.settings;
        let definitions = &self.config.definitions;
        let mut ctx = RunContext::new();

        for skipped in definitions.skipped() {
            ctx.warn(&skipped.id, None, skipped.reason.clone());
        }

        let mut forest = build_forest(definitions, &mut ctx)?;

        let assembler = Assembler::new(settings, &self.extractors, self.output_dir.clone());
        for idx in 0..forest.len() {
            let Some(node) = forest.get(idx) else {
                continue;
            };
            let Some(entry) = definitions.get(&node.id) else {
                continue;
            };
            let blocks = assembler.assemble(node, entry, &mut ctx);
            forest.set_blocks(idx, blocks);
        }

        let support = DirectiveSupport {
            plantuml: settings.diagrams.plantuml,
            mermaid: settings.diagrams.mermaid,
        };
        let options = NavigationOptions::from(&settings.navigation);
        let navigation = emit(&forest, &options);

        let mut files = Vec::with_capacity(forest.len() + 1);
        for idx in forest.preorder() {
            let Some(node) = forest.get(idx) else {
                continue;
            };
            let entry = definitions.get(&node.id);
            let description = entry.and_then(|entry| fields::text(entry, "description", &mut ctx));
            let module = entry.and_then(|entry| entry.get_str("module"));
            let nav = navigation.iter().find(|block| block.node == idx);
            files.push(GeneratedFile {
                path: node.output_file(),
                content: render_page(node, description.as_deref(), module, nav, support),
            });
        }

        if settings.generate_index {
            files.push(GeneratedFile {
                path: PathBuf::from(INDEX_FILE),
                content: render_index(&settings.index, &forest, &options, support),
            });
        }

        tracing::info!(
            pages = forest.len(),
            files = files.len(),
            warnings = ctx.warning_count(),
            "Generated documentation"
        );
        Ok(GenerationOutput {
            files,
            diagnostics: ctx.into_diagnostics(),
        })
    }
}

/// Load `config_path` and generate into `output_dir`.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the page
/// hierarchy is invalid.
pub fn generate(
    config_path: &Path,
    cli_settings: Option<&CliSettings>,
    output_dir: &Path,
) -> Result<GenerationOutput, GenerateError> {
    let config = ProjectConfig::load(config_path, cli_settings)?;
    Generator::new(&config).with_output_dir(output_dir).run()
}
