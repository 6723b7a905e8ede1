//! Markdown to reStructuredText conversion.
//!
//! A line-oriented converter for the Markdown found in project READMEs and
//! guides. It recognizes a fixed set of constructs and passes everything
//! else through untouched, so unusual input degrades to plain paragraphs
//! rather than failing.
//!
//! Converted text is usually folded into a page that already owns the `=`
//! title, which is why headings are demoted by default and why a leading
//! heading that repeats the page title is dropped.

mod blocks;
mod inline;

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

pub use inline::convert_link;

use crate::rst::{DIRECTIVE_INDENT, adornment_for_level, code_block, underline};

static ATX_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s{0,3}(#{1,6})\s+(.*?)(?:\s+#+)?\s*$").unwrap());

static LIST_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)([-*+]|\d+[.)])\s+(.*)$").unwrap());

/// Special handling for well-known repository files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocKind {
    /// Ordinary Markdown.
    #[default]
    Regular,
    /// `CHANGELOG*`: a leading "Changelog" heading is dropped.
    Changelog,
    /// `LICENSE*`, `COPYING*`, `NOTICE*`: kept verbatim in a code block.
    License,
}

impl DocKind {
    /// Classify a file by its name.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use docloom_markup::DocKind;
    ///
    /// assert_eq!(DocKind::from_path(Path::new("docs/CHANGELOG.md")), DocKind::Changelog);
    /// assert_eq!(DocKind::from_path(Path::new("LICENSE")), DocKind::License);
    /// assert_eq!(DocKind::from_path(Path::new("README.md")), DocKind::Regular);
    /// ```
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_uppercase())
            .unwrap_or_default();
        if name.starts_with("CHANGELOG") {
            Self::Changelog
        } else if ["LICENSE", "LICENCE", "COPYING", "NOTICE"]
            .iter()
            .any(|prefix| name.starts_with(prefix))
        {
            Self::License
        } else {
            Self::Regular
        }
    }
}

/// Options for [`convert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Title of the page the text is folded into.
    pub page_title: Option<String>,
    /// Prefix for relative image paths.
    pub base_dir: Option<PathBuf>,
    /// Shift headings one level down (`#` renders as a section, not a title).
    pub demote_headings: bool,
    pub doc_kind: DocKind,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            page_title: None,
            base_dir: None,
            demote_headings: true,
            doc_kind: DocKind::Regular,
        }
    }
}

impl ConvertOptions {
    /// Options for text folded into the page titled `title`.
    #[must_use]
    pub fn for_page(title: impl Into<String>) -> Self {
        Self {
            page_title: Some(title.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    #[must_use]
    pub fn with_doc_kind(mut self, doc_kind: DocKind) -> Self {
        self.doc_kind = doc_kind;
        self
    }
}

/// Convert Markdown text to reStructuredText.
///
/// # Examples
///
/// ```
/// use docloom_markup::{convert, ConvertOptions};
///
/// let rst = convert(
///     "# Guide\n\nSee [setup](./setup.md).\n",
///     &ConvertOptions::for_page("Guide"),
/// );
/// assert_eq!(rst, "See :doc:`setup <setup>`.\n");
/// ```
#[must_use]
pub fn convert(text: &str, options: &ConvertOptions) -> String {
    if options.doc_kind == DocKind::License {
        return code_block("text", text);
    }
    Converter::new(options).run(text)
}

/// Normalize a title for duplicate detection.
///
/// Lowercases, drops everything that is neither alphanumeric nor
/// whitespace (emoji, punctuation), and collapses whitespace.
///
/// ```
/// use docloom_markup::normalize_title;
///
/// assert_eq!(normalize_title("🚀 Getting  Started!"), "getting started");
/// ```
#[must_use]
pub fn normalize_title(title: &str) -> String {
    let kept: String = title
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One open list level.
struct ListLevel {
    source_indent: usize,
    out_indent: usize,
    marker_width: usize,
}

struct Converter<'a> {
    options: &'a ConvertOptions,
    out: Vec<String>,
    seen_h1: bool,
    lists: Vec<ListLevel>,
    in_quote: bool,
}

impl<'a> Converter<'a> {
    fn new(options: &'a ConvertOptions) -> Self {
        Self {
            options,
            out: Vec::new(),
            seen_h1: false,
            lists: Vec::new(),
            in_quote: false,
        }
    }

    fn run(mut self, text: &str) -> String {
        let lines: Vec<&str> = text.lines().collect();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];
            let trimmed = line.trim();

            if !trimmed.starts_with('>') {
                self.in_quote = false;
            }

            if let Some(fence) = fence_marker(trimmed) {
                i = self.fenced_code(&lines, i, fence);
                continue;
            }

            if trimmed.is_empty() {
                self.blank();
                i += 1;
                continue;
            }

            if let Some(caps) = ATX_HEADING_RE.captures(line) {
                self.heading(caps[1].len(), &caps[2]);
                i += 1;
                continue;
            }

            if let Some(level) = lines.get(i + 1).and_then(|next| setext_level(next))
                && self.lists.is_empty()
                && is_plain_text(line)
            {
                self.heading(level, trimmed);
                i += 2;
                continue;
            }

            if is_rule(trimmed) {
                self.end_list();
                self.blank();
                self.out.push("----".to_owned());
                self.blank();
                i += 1;
                continue;
            }

            if blocks::is_table_row(line)
                && lines.get(i + 1).is_some_and(|next| blocks::is_table_separator(next))
            {
                i = self.table(&lines, i);
                continue;
            }

            if blocks::checkbox_item(line).is_some() {
                i = self.checkboxes(&lines, i);
                continue;
            }

            if let Some((alt, src)) = inline::standalone_image(line) {
                self.image(alt, src);
                i += 1;
                continue;
            }

            if let Some(rest) = trimmed.strip_prefix('>') {
                self.quote(rest);
                i += 1;
                continue;
            }

            if let Some(caps) = LIST_ITEM_RE.captures(line) {
                self.list_item(caps[1].len(), &caps[2], &caps[3]);
                i += 1;
                continue;
            }

            self.text(line);
            i += 1;
        }

        while self.out.last().is_some_and(String::is_empty) {
            self.out.pop();
        }
        if self.out.is_empty() {
            return String::new();
        }
        let mut result = self.out.join("\n");
        result.push('\n');
        result
    }

    /// Push a separating blank line unless one is already there.
    fn blank(&mut self) {
        if self.out.last().is_some_and(|l| !l.is_empty()) {
            self.out.push(String::new());
        }
    }

    fn end_list(&mut self) {
        if !self.lists.is_empty() {
            self.lists.clear();
            self.blank();
        }
    }

    fn heading(&mut self, level: usize, raw_title: &str) {
        self.end_list();
        if level == 1 && !self.seen_h1 {
            self.seen_h1 = true;
            if self.repeats_page_title(raw_title) {
                return;
            }
        }

        let title = inline::convert_inline(raw_title.trim());
        let adornment = adornment_for_level(level, self.options.demote_headings);
        let rule = underline(&title, adornment);
        self.blank();
        self.out.push(title);
        self.out.push(rule);
        self.out.push(String::new());
    }

    fn repeats_page_title(&self, raw_title: &str) -> bool {
        let normalized = normalize_title(raw_title);
        if self.options.doc_kind == DocKind::Changelog && normalized == "changelog" {
            return true;
        }
        self.options
            .page_title
            .as_deref()
            .is_some_and(|title| normalize_title(title) == normalized)
    }

    /// Emit a fenced block; returns the index after the closing fence.
    fn fenced_code(&mut self, lines: &[&str], start: usize, fence: &str) -> usize {
        let opening = lines[start];
        let opening_indent = leading_spaces(opening);
        let pad = match self.lists.last() {
            Some(top) if opening_indent > 0 => " ".repeat(top.out_indent + top.marker_width),
            _ => {
                self.end_list();
                String::new()
            }
        };

        let info = opening.trim()[fence.len()..].trim();
        let language = info.split_whitespace().next().unwrap_or("text");
        self.blank();
        self.out.push(format!("{pad}.. code-block:: {language}"));
        self.out.push(String::new());

        let mut i = start + 1;
        while i < lines.len() {
            let line = lines[i];
            if is_closing_fence(line.trim(), fence) {
                i += 1;
                break;
            }
            if line.trim().is_empty() {
                self.out.push(String::new());
            } else {
                let body = strip_indent(line, opening_indent);
                self.out.push(format!("{pad}{}{body}", " ".repeat(DIRECTIVE_INDENT)));
            }
            i += 1;
        }

        while self.out.last().is_some_and(String::is_empty) {
            self.out.pop();
        }
        self.out.push(String::new());
        i
    }

    fn table(&mut self, lines: &[&str], start: usize) -> usize {
        let mut end = start + 2;
        while end < lines.len() && blocks::is_table_row(lines[end]) {
            end += 1;
        }

        self.end_list();
        self.blank();
        match blocks::render_table(&lines[start..end]) {
            Some(rendered) => {
                self.out.extend(rendered);
                self.out.push(String::new());
            }
            None => self
                .out
                .extend(lines[start..end].iter().map(|l| (*l).to_owned())),
        }
        end
    }

    fn checkboxes(&mut self, lines: &[&str], start: usize) -> usize {
        let mut items = Vec::new();
        let mut end = start;
        while let Some(item) = lines.get(end).and_then(|l| blocks::checkbox_item(l)) {
            items.push(item);
            end += 1;
        }

        self.end_list();
        self.blank();
        self.out.extend(blocks::render_checkboxes(&items));
        self.out.push(String::new());
        end
    }

    fn image(&mut self, alt: &str, src: &str) {
        self.end_list();
        self.blank();
        self.out
            .push(format!(".. image:: {}", self.image_path(src)));
        if !alt.trim().is_empty() {
            self.out.push(format!("   :alt: {}", alt.trim()));
        }
        self.out.push(String::new());
    }

    fn image_path(&self, src: &str) -> String {
        let Some(base) = self.options.base_dir.as_deref() else {
            return src.to_owned();
        };
        if inline::has_scheme(src) || src.starts_with('/') {
            return src.to_owned();
        }
        let base = base.to_string_lossy().replace('\\', "/");
        let base = base.trim_end_matches('/');
        if base.is_empty() || base == "." {
            return src.to_owned();
        }
        let src = src.strip_prefix("./").unwrap_or(src);
        format!("{base}/{src}")
    }

    fn quote(&mut self, rest: &str) {
        if !self.in_quote {
            self.end_list();
            self.blank();
            self.in_quote = true;
        }
        let content = rest.strip_prefix(' ').unwrap_or(rest).trim_end();
        if content.is_empty() {
            self.blank();
        } else {
            self.out
                .push(format!("   {}", inline::convert_inline(content)));
        }
    }

    fn list_item(&mut self, indent: usize, marker: &str, content: &str) {
        let marker = if marker.ends_with(['.', ')']) {
            format!("{}.", &marker[..marker.len() - 1])
        } else {
            "*".to_owned()
        };
        let marker_width = marker.len() + 1;

        let mut level_changed = false;
        while self.lists.last().is_some_and(|top| top.source_indent > indent) {
            self.lists.pop();
            level_changed = true;
        }

        let out_indent = match self.lists.last_mut() {
            Some(top) if top.source_indent == indent => {
                top.marker_width = marker_width;
                top.out_indent
            }
            parent => {
                let out_indent = parent.map_or(0, |top| top.out_indent + top.marker_width);
                self.lists.push(ListLevel {
                    source_indent: indent,
                    out_indent,
                    marker_width,
                });
                level_changed = true;
                out_indent
            }
        };

        if level_changed {
            self.blank();
        }
        self.out.push(format!(
            "{}{marker} {}",
            " ".repeat(out_indent),
            inline::convert_inline(content.trim_end())
        ));
    }

    fn text(&mut self, line: &str) {
        match self.lists.last() {
            Some(top) if leading_spaces(line) > 0 => {
                let pad = " ".repeat(top.out_indent + top.marker_width);
                self.out
                    .push(format!("{pad}{}", inline::convert_inline(line.trim())));
            }
            Some(_) => {
                self.end_list();
                self.out.push(inline::convert_inline(line.trim()));
            }
            None => self.out.push(inline::convert_inline(line.trim())),
        }
    }
}

/// Opening fence of a code block (three or more backticks or tildes).
fn fence_marker(trimmed: &str) -> Option<&str> {
    for ch in ['`', '~'] {
        let run = trimmed.chars().take_while(|&c| c == ch).count();
        if run >= 3 {
            return Some(&trimmed[..run]);
        }
    }
    None
}

fn is_closing_fence(trimmed: &str, fence: &str) -> bool {
    let Some(ch) = fence.chars().next() else {
        return false;
    };
    let run = trimmed.chars().take_while(|&c| c == ch).count();
    run >= fence.len() && trimmed[run..].trim().is_empty()
}

/// Level of a setext underline (`===` or `---`).
fn setext_level(line: &str) -> Option<usize> {
    let trimmed = line.trim();
    if trimmed.len() >= 3 && trimmed.chars().all(|c| c == '=') {
        Some(1)
    } else if trimmed.len() >= 3 && trimmed.chars().all(|c| c == '-') {
        Some(2)
    } else {
        None
    }
}

/// Line that can be the text of a setext heading.
fn is_plain_text(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && leading_spaces(line) < 4
        && !trimmed.starts_with(['>', '|', '#'])
        && !LIST_ITEM_RE.is_match(line)
        && !is_rule(trimmed)
        && fence_marker(trimmed).is_none()
}

/// Thematic break: three or more `-`, `*` or `_`, optionally spaced.
fn is_rule(trimmed: &str) -> bool {
    let mut marks = trimmed.chars().filter(|c| !c.is_whitespace());
    let Some(first) = marks.next() else {
        return false;
    };
    matches!(first, '-' | '*' | '_')
        && marks.clone().all(|c| c == first)
        && marks.count() >= 2
}

fn leading_spaces(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

/// Remove up to `width` columns of leading whitespace.
fn strip_indent(line: &str, width: usize) -> &str {
    let mut removed = 0;
    for (idx, ch) in line.char_indices() {
        if removed >= width || !ch.is_whitespace() {
            return &line[idx..];
        }
        removed += if ch == '\t' { 4 } else { 1 };
    }
    ""
}
