//! Inline Markdown constructs: links, images, code spans.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

/// `[text](target)` or `![alt](target)`, with an optional quoted title.
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(!?)\[([^\]]*)\]\(\s*<?([^)\s>]+)>?(?:\s+"[^"]*")?\s*\)"#).unwrap()
});

/// A line that holds nothing but an image.
static IMAGE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*!\[([^\]]*)\]\(\s*<?([^)\s>]+)>?(?:\s+"[^"]*")?\s*\)\s*$"#).unwrap()
});

/// URI scheme prefix (`https:`, `mailto:`, ...).
static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").unwrap());

/// Extensions of files that are documents in the generated tree.
const DOCUMENT_EXTENSIONS: [&str; 3] = ["md", "rst", "markdown"];

/// Convert the inline constructs of one line of text.
///
/// Code spans are protected first, so link syntax inside them survives
/// verbatim (as in fenced code).
pub(crate) fn convert_inline(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + 8);
    let mut rest = line;

    while let Some(start) = rest.find('`') {
        let ticks = rest[start..].chars().take_while(|&c| c == '`').count();
        let fence = &rest[start..start + ticks];
        let after = &rest[start + ticks..];
        let Some(end) = after.find(fence) else {
            break;
        };
        out.push_str(&convert_links(&rest[..start]));
        let code = after[..end].trim();
        if code.is_empty() {
            out.push_str(fence);
            out.push_str(fence);
        } else {
            out.push_str("``");
            out.push_str(code);
            out.push_str("``");
        }
        rest = &after[end + ticks..];
    }

    out.push_str(&convert_links(rest));
    out
}

/// Rewrite every Markdown link in `text`. Inline images are left untouched.
pub(crate) fn convert_links(text: &str) -> String {
    LINK_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            if &caps[1] == "!" {
                return caps[0].to_owned();
            }
            convert_link(&caps[2], &caps[3])
        })
        .into_owned()
}

/// Convert a single link to reference markup.
///
/// # Examples
///
/// ```
/// use docloom_markup::convert_link;
///
/// assert_eq!(
///     convert_link("Docs", "https://example.com"),
///     "`Docs <https://example.com>`_"
/// );
/// assert_eq!(convert_link("Setup", "./setup.md"), ":doc:`Setup <setup>`");
/// assert_eq!(
///     convert_link("Jump", "#installation"),
///     ":ref:`Jump <installation>`"
/// );
/// ```
pub fn convert_link(text: &str, url: &str) -> String {
    let text = text.trim();

    if SCHEME_RE.is_match(url) {
        let label = if text.is_empty() { url } else { text };
        return format!("`{label} <{url}>`_");
    }

    if let Some(anchor) = url.strip_prefix('#') {
        return if text.is_empty() {
            format!(":ref:`{anchor}`")
        } else {
            format!(":ref:`{text} <{anchor}>`")
        };
    }

    let (path, anchor) = match url.split_once('#') {
        Some((path, anchor)) => (path, Some(anchor)),
        None => (url, None),
    };

    let Some(target) = document_target(path) else {
        let label = if text.is_empty() { url } else { text };
        return format!("`{label} <{url}>`_");
    };

    let label = if text.is_empty() { target.as_str() } else { text };
    match anchor.map(anchor_label).filter(|l| !l.is_empty()) {
        Some(section) if !mentions_all_words(label, &section) => {
            format!(":doc:`{label} ({section}) <{target}>`")
        }
        _ => format!(":doc:`{label} <{target}>`"),
    }
}

/// Document name for a relative link, or `None` when it points at a
/// non-document file.
///
/// `./guide/setup.md` becomes `guide/setup`; extension-less paths are
/// documents as written.
fn document_target(path: &str) -> Option<String> {
    let trimmed = path.strip_prefix("./").unwrap_or(path);
    let file_name = trimmed.rsplit('/').next().unwrap_or(trimmed);

    match Path::new(file_name).extension().and_then(|e| e.to_str()) {
        None => Some(trimmed.trim_end_matches('/').to_owned()),
        Some(ext) if DOCUMENT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) => {
            let stem_len = trimmed.len() - ext.len() - 1;
            Some(trimmed[..stem_len].to_owned())
        }
        Some(_) => None,
    }
}

/// Turn a heading anchor into readable words: `installation-steps`
/// becomes `Installation Steps`.
fn anchor_label(anchor: &str) -> String {
    anchor
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether every word of `section` already appears in `text`.
fn mentions_all_words(text: &str, section: &str) -> bool {
    let text = text.to_lowercase();
    section
        .split_whitespace()
        .all(|word| text.contains(&word.to_lowercase()))
}

/// Match a line that consists of a single image: returns `(alt, src)`.
pub(crate) fn standalone_image(line: &str) -> Option<(&str, &str)> {
    let caps = IMAGE_LINE_RE.captures(line)?;
    let alt = caps.get(1)?.as_str();
    let src = caps.get(2)?.as_str();
    Some((alt, src))
}

/// Whether a link target carries a URI scheme.
pub(crate) fn has_scheme(url: &str) -> bool {
    SCHEME_RE.is_match(url)
}
