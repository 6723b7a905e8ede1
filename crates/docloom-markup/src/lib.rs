//! reStructuredText output for docloom.
//!
//! This crate provides:
//! - Display-width measurement so section underlines fit emoji and CJK titles
//! - Small builders for headings, code blocks, lists and indentation
//! - [`convert`]: a line-oriented Markdown to reStructuredText converter
//!
//! # Quick Start
//!
//! ```
//! use docloom_markup::{convert, heading, ConvertOptions};
//!
//! let mut page = heading("Installation", '=');
//! page.push_str(&convert(
//!     "## Requirements\n\n- Rust 1.91\n",
//!     &ConvertOptions::for_page("Installation"),
//! ));
//! assert!(page.contains("Requirements\n~~~~~~~~~~~~"));
//! ```

pub mod markdown;
mod rst;
mod width;

pub use markdown::{ConvertOptions, DocKind, convert, convert_link, normalize_title};
pub use rst::{
    ADORNMENTS, DIRECTIVE_INDENT, GENERATED_BANNER, adornment_for_level, bullet_list, code_block, heading, indent,
    literal_block, underline,
};
pub use width::{char_width, display_width, has_non_narrow};
