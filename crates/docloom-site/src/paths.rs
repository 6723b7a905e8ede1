//! Path helpers for references between generated documents and sources.

use std::path::{Component, Path};

/// Relative path from directory `from` to directory or file `to`.
///
/// Both paths should be absolute (or both relative to the same base).
/// The result uses `/` separators as reStructuredText expects, and is
/// `.` when the two are equal.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use docloom_site::relative_dir;
///
/// assert_eq!(relative_dir(Path::new("/p/docs/generated"), Path::new("/p/guides")), "../../guides");
/// assert_eq!(relative_dir(Path::new("/p/docs"), Path::new("/p/docs/img")), "img");
/// assert_eq!(relative_dir(Path::new("/p"), Path::new("/p")), ".");
/// ```
#[must_use]
pub fn relative_dir(from: &Path, to: &Path) -> String {
    let from_segs = segments(from);
    let to_segs = segments(to);

    let common = from_segs
        .iter()
        .zip(&to_segs)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; from_segs.len() - common];
    parts.extend(to_segs[common..].iter().map(String::as_str));

    if parts.is_empty() {
        ".".to_owned()
    } else {
        parts.join("/")
    }
}

/// Normalized path segments. `.` is dropped and `..` pops when possible.
fn segments(path: &Path) -> Vec<String> {
    let mut segs: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(seg) => segs.push(seg.to_string_lossy().into_owned()),
            Component::ParentDir => {
                if segs.last().is_some_and(|s| s != "..") {
                    segs.pop();
                } else {
                    segs.push("..".to_owned());
                }
            }
            Component::RootDir | Component::Prefix(_) | Component::CurDir => {}
        }
    }
    segs
}

/// Join `base` and a path from the configuration. Absolute paths are kept.
#[must_use]
pub(crate) fn resolve_from(base: &Path, written: &str) -> std::path::PathBuf {
    let path = Path::new(written);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
