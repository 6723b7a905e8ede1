//! Diagram support for docloom.
//!
//! Detects diagram languages from file names and renders diagram sources as
//! Sphinx directives (`uml`, `mermaid`, `graphviz`) or SVG images. When a
//! project lacks the `PlantUML` or Mermaid extension, diagrams fall back to
//! highlighted code blocks so the build still succeeds.

mod language;
mod render;

pub use language::DiagramLanguage;
pub use render::{DirectiveSupport, downgrade_directives, render_image, render_source};
