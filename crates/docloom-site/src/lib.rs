//! Page hierarchy, content assembly and navigation for docloom.
//!
//! Turns loaded page definitions into reStructuredText documents:
//!
//! 1. [`build_forest`] wires pages into a hierarchy and allocates slugs;
//! 2. [`Assembler`] builds each page's [`ContentBlock`]s from its fields;
//! 3. [`emit`] produces one `toctree` per page with children;
//! 4. [`render_page`] and [`render_index`] produce the final documents.
//!
//! [`Generator`] runs all stages for a [`ProjectConfig`](docloom_config::ProjectConfig).
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//!
//! use docloom_config::ProjectConfig;
//! use docloom_site::Generator;
//!
//! let config = ProjectConfig::load(Path::new("docs.yaml"), None)?;
//! let output = Generator::new(&config).with_output_dir("docs").run()?;
//! for file in &output.files {
//!     println!("{}", file.path.display());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Output Layout
//!
//! A page with path `guide/install` is written to
//! `generated/guide/install.rst`. Its parent's `toctree` lists it as
//! `guide/install`, relative to `generated/guide.rst`.

mod api;
mod assemble;
mod block;
mod diagnostics;
mod extract;
mod fields;
mod generator;
mod navigation;
mod paths;
mod render;
mod slug;
mod tree;

pub use api::{ApiBody, ApiLanguage, ApiReference};
pub use assemble::Assembler;
pub use block::{
    ContentBlock, CustomSection, Diagram, DiagramContent, ExampleKind, GuideSection, IncludeKind,
    InstallStep, ListKind, NarrativeSection, RelatedTool, TroubleshootingItem, UsageExample,
};
pub use diagnostics::{Diagnostic, RunContext, Severity};
pub use extract::{ApiExtractor, ExtractError, ExtractRequest, ExtractorRegistry};
pub use generator::{
    GenerateError, GeneratedFile, GenerationOutput, Generator, INDEX_FILE, generate,
};
pub use navigation::{NavigationBlock, NavigationOptions, emit};
pub use paths::relative_dir;
pub use render::{render_index, render_page};
pub use slug::{SlugAllocator, fallback_slug, slugify};
pub use tree::{BuildError, Forest, GENERATED_DIR, PageNode, build_forest};
