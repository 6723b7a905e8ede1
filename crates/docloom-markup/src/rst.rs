//! reStructuredText building blocks shared by every generated document.

use crate::width::display_width;

/// Section adornment characters, outermost first.
///
/// Generated pages use `=` for the page title and `-` for top-level
/// sections, so text folded into a page starts one level lower.
pub const ADORNMENTS: [char; 6] = ['=', '-', '~', '^', '"', ','];

/// Adornments for headings that are not demoted.
///
/// Level five differs from [`ADORNMENTS`] so that all six levels stay
/// distinct when a document is converted stand-alone.
const UNDEMOTED: [char; 6] = ['=', '-', '~', '^', ':', ','];

/// Underline character for a heading level (1-based).
///
/// With `demote` set, level 1 maps to the section style (`-`) instead of
/// the page-title style (`=`). Levels past the table reuse the innermost
/// style.
#[must_use]
pub fn adornment_for_level(level: usize, demote: bool) -> char {
    let idx = level.saturating_sub(1);
    if demote {
        ADORNMENTS[(idx + 1).min(ADORNMENTS.len() - 1)]
    } else {
        UNDEMOTED[idx.min(UNDEMOTED.len() - 1)]
    }
}

/// Build an underline for `title` using `adornment`.
///
/// The underline is as wide as the title's display width, never shorter.
#[must_use]
pub fn underline(title: &str, adornment: char) -> String {
    std::iter::repeat_n(adornment, display_width(title).max(1)).collect()
}

/// Render a section title with its underline, followed by a blank line.
///
/// # Examples
///
/// ```
/// use docloom_markup::heading;
///
/// assert_eq!(heading("Overview", '-'), "Overview\n--------\n\n");
/// ```
#[must_use]
pub fn heading(title: &str, adornment: char) -> String {
    format!("{title}\n{}\n\n", underline(title, adornment))
}

/// Indentation of directive bodies and literal blocks.
pub const DIRECTIVE_INDENT: usize = 3;

/// Indent every non-empty line of `text` by `width` spaces.
///
/// Empty lines stay empty so directive bodies carry no trailing whitespace.
#[must_use]
pub fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a `code-block` directive.
#[must_use]
pub fn code_block(language: &str, code: &str) -> String {
    let language = if language.trim().is_empty() {
        "text"
    } else {
        language.trim()
    };
    format!(
        ".. code-block:: {language}\n\n{}\n\n",
        indent(code.trim_end(), DIRECTIVE_INDENT)
    )
}

/// Render a bullet list, one item per line.
#[must_use]
pub fn bullet_list<S: AsRef<str>>(items: &[S]) -> String {
    let mut out = String::new();
    for item in items {
        out.push_str("* ");
        out.push_str(&indent_continuation(item.as_ref(), 2));
        out.push('\n');
    }
    out.push('\n');
    out
}

/// Indent all lines after the first, for multi-line list items.
fn indent_continuation(text: &str, width: usize) -> String {
    let mut lines = text.trim_end().lines();
    let Some(first) = lines.next() else {
        return String::new();
    };
    let rest: Vec<String> = lines
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{}{line}", " ".repeat(width))
            }
        })
        .collect();
    if rest.is_empty() {
        first.to_owned()
    } else {
        format!("{first}\n{}", rest.join("\n"))
    }
}

/// Wrap text in a literal block (`::`).
#[must_use]
pub fn literal_block(text: &str) -> String {
    format!("::\n\n{}\n\n", indent(text.trim_end(), DIRECTIVE_INDENT))
}

/// Generated-file banner placed at the top of every document.
pub const GENERATED_BANNER: &str = "..
   This file is AUTO-GENERATED by docloom.
   DO NOT EDIT manually - changes will be overwritten.
   To modify this documentation, edit the source YAML configuration
   and regenerate.

";

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_adornment_levels_demoted() {
        assert_eq!(adornment_for_level(1, true), '-');
        assert_eq!(adornment_for_level(2, true), '~');
        assert_eq!(adornment_for_level(3, true), '^');
        assert_eq!(adornment_for_level(4, true), '"');
        assert_eq!(adornment_for_level(5, true), ',');
        assert_eq!(adornment_for_level(6, true), ',');
    }

    #[test]
    fn test_adornment_levels_not_demoted() {
        assert_eq!(adornment_for_level(1, false), '=');
        assert_eq!(adornment_for_level(2, false), '-');
        assert_eq!(adornment_for_level(3, false), '~');
        assert_eq!(adornment_for_level(4, false), '^');
        assert_eq!(adornment_for_level(5, false), ':');
    }

    #[test]
    fn test_first_four_levels_are_distinct() {
        for demote in [true, false] {
            let styles: Vec<char> = (1..=4).map(|l| adornment_for_level(l, demote)).collect();
            let mut deduped = styles.clone();
            deduped.dedup();
            assert_eq!(styles, deduped);
        }
    }

    #[test]
    fn test_underline_covers_emoji_title() {
        let title = "🚀 Quick Start 🎉";
        let line = underline(title, '=');
        assert!(line.chars().count() >= display_width(title));
        assert_eq!(line.chars().count(), 17);
    }

    #[test]
    fn test_heading_empty_title_still_has_adornment() {
        assert_eq!(heading("", '-'), "\n-\n\n");
    }

    #[test]
    fn test_indent_skips_blank_lines() {
        assert_eq!(indent("a\n\n  b", 3), "   a\n\n     b");
    }

    #[test]
    fn test_code_block_defaults_language() {
        assert_eq!(
            code_block("", "print(1)\n"),
            ".. code-block:: text\n\n   print(1)\n\n"
        );
    }

    #[test]
    fn test_directive_bodies_share_indentation() {
        let code = "def f():\n    return 1\n";
        assert_eq!(
            code_block("python", code),
            ".. code-block:: python\n\n   def f():\n       return 1\n\n"
        );
        assert_eq!(literal_block(code), "::\n\n   def f():\n       return 1\n\n");
    }

    #[test]
    fn test_bullet_list_multiline_item() {
        assert_eq!(
            bullet_list(&["one", "two\nlines"]),
            "* one\n* two\n  lines\n\n"
        );
    }

    #[test]
    fn test_literal_block() {
        assert_eq!(literal_block("MIT\nLicense\n"), "::\n\n   MIT\n   License\n\n");
    }
}
