//! Multi-line Markdown constructs: pipe tables and task lists.

use std::sync::LazyLock;

use regex::Regex;

use super::inline::convert_inline;

/// Table delimiter row: `| --- | :---: |`.
static TABLE_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\|?\s*:?-+:?\s*(\|\s*:?-+:?\s*)*\|?\s*$").unwrap()
});

/// Task list item: `- [ ] text` or `* [x] text`.
static CHECKBOX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*+]\s+\[([ xX])\]\s+(.*)$").unwrap());

/// Whether `line` could start a pipe table.
pub(super) fn is_table_row(line: &str) -> bool {
    line.trim_start().starts_with('|')
}

pub(super) fn is_table_separator(line: &str) -> bool {
    line.contains('-') && TABLE_SEPARATOR_RE.is_match(line)
}

/// Split a table row into trimmed cells.
fn split_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let trimmed = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('|').unwrap_or(trimmed);
    trimmed
        .split('|')
        .map(|cell| convert_inline(cell.trim()))
        .collect()
}

/// Render a pipe table as a `list-table` directive.
///
/// `lines` holds the header row, the delimiter row and the body rows.
/// Returns `None` when the rows do not form a table, in which case the
/// caller keeps the text as written.
pub(super) fn render_table(lines: &[&str]) -> Option<Vec<String>> {
    let (header, rest) = lines.split_first()?;
    let (separator, body) = rest.split_first()?;
    if !is_table_separator(separator) {
        return None;
    }

    let mut rows = vec![split_row(header)];
    rows.extend(body.iter().map(|line| split_row(line)));
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    if columns == 0 {
        return None;
    }

    let mut out = vec![
        ".. list-table::".to_owned(),
        "   :header-rows: 1".to_owned(),
        "   :widths: auto".to_owned(),
        String::new(),
    ];
    for row in &mut rows {
        row.resize(columns, String::new());
        for (i, cell) in row.iter().enumerate() {
            let marker = if i == 0 { "   * -" } else { "     -" };
            if cell.is_empty() {
                out.push(marker.to_owned());
            } else {
                out.push(format!("{marker} {cell}"));
            }
        }
    }
    Some(out)
}

/// Match a task list item: returns `(checked, text)`.
pub(super) fn checkbox_item(line: &str) -> Option<(bool, &str)> {
    let caps = CHECKBOX_RE.captures(line)?;
    let checked = !caps.get(1)?.as_str().trim().is_empty();
    Some((checked, caps.get(2)?.as_str()))
}

/// Render task list items as a raw HTML list with checkbox inputs.
pub(super) fn render_checkboxes(items: &[(bool, &str)]) -> Vec<String> {
    let mut out = vec![
        ".. raw:: html".to_owned(),
        String::new(),
        "   <ul class=\"task-list\">".to_owned(),
    ];
    for (checked, text) in items {
        let state = if *checked { " checked" } else { "" };
        out.push(format!(
            "   <li><input type=\"checkbox\" disabled{state}> {}</li>",
            html_inline(text)
        ));
    }
    out.push("   </ul>".to_owned());
    out
}

/// Escape text for HTML and turn code spans into `<code>` elements.
fn html_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, part) in text.split('`').enumerate() {
        let escaped = escape_html(part);
        // Odd segments sit between a pair of backticks.
        if i % 2 == 1 {
            out.push_str("<code>");
            out.push_str(&escaped);
            out.push_str("</code>");
        } else {
            out.push_str(&escaped);
        }
    }
    out
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_table_separator_detection() {
        assert!(is_table_separator("|---|---|"));
        assert!(is_table_separator("| :--- | ---: |"));
        assert!(is_table_separator("--- | ---"));
        assert!(!is_table_separator("| a | b |"));
    }

    #[test]
    fn test_render_table() {
        let lines = [
            "| Feature | Status |",
            "|---------|--------|",
            "| Links   | `yes`  |",
            "| Tables  |",
        ];
        let out = render_table(&lines).unwrap();
        assert_eq!(
            out,
            vec![
                ".. list-table::",
                "   :header-rows: 1",
                "   :widths: auto",
                "",
                "   * - Feature",
                "     - Status",
                "   * - Links",
                "     - ``yes``",
                "   * - Tables",
                "     -",
            ]
        );
    }

    #[test]
    fn test_render_table_without_separator() {
        assert_eq!(render_table(&["| a | b |", "| c | d |"]), None);
    }

    #[test]
    fn test_checkbox_item() {
        assert_eq!(checkbox_item("- [ ] todo"), Some((false, "todo")));
        assert_eq!(checkbox_item("* [x] done"), Some((true, "done")));
        assert_eq!(checkbox_item("- [X] Done too"), Some((true, "Done too")));
        assert_eq!(checkbox_item("- plain"), None);
    }

    #[test]
    fn test_render_checkboxes() {
        let out = render_checkboxes(&[(false, "run `make`"), (true, "a < b")]);
        assert_eq!(
            out,
            vec![
                ".. raw:: html",
                "",
                "   <ul class=\"task-list\">",
                "   <li><input type=\"checkbox\" disabled> run <code>make</code></li>",
                "   <li><input type=\"checkbox\" disabled checked> a &lt; b</li>",
                "   </ul>",
            ]
        );
    }
}
