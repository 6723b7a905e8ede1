//! Filesystem-safe page slugs.
//!
//! Slugs name output files and navigation targets, so they are restricted
//! to `[a-z0-9-]`. Latin letters with diacritics fold to their ASCII base.
//! Titles with no ASCII-representable characters (emoji, CJK) get a
//! hash-based slug instead of an empty one.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

/// Prefix of hash-based fallback slugs.
const FALLBACK_PREFIX: &str = "page-";

/// Hex characters of the title hash kept in a fallback slug.
const FALLBACK_HASH_LEN: usize = 8;

/// ASCII replacement for a lowercase Latin letter with a diacritic.
fn fold_latin(ch: char) -> Option<&'static str> {
    let folded = match ch {
        'à'..='å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è'..='ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'ĥ' | 'ħ' => "h",
        'ì'..='ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'ĳ' => "ij",
        'ĵ' => "j",
        'ķ' => "k",
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => "l",
        'ñ' | 'ń' | 'ņ' | 'ň' => "n",
        'ò'..='ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => "o",
        'œ' => "oe",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'ß' => "ss",
        'ś' | 'ŝ' | 'ş' | 'š' => "s",
        'ţ' | 'ť' | 'ŧ' => "t",
        'þ' => "th",
        'ù'..='ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'ŵ' => "w",
        'ý' | 'ÿ' | 'ŷ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(folded)
}

/// Combining diacritical marks, dropped so decomposed letters fold too.
fn is_combining_mark(ch: char) -> bool {
    matches!(u32::from(ch), 0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF)
}

/// Natural slug of a title. Empty when the title has no usable characters.
///
/// # Examples
///
/// ```
/// use docloom_site::slugify;
///
/// assert_eq!(slugify("Getting Started"), "getting-started");
/// assert_eq!(slugify("Café & Crème"), "cafe-creme");
/// assert_eq!(slugify("🚀🎉"), "");
/// ```
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.chars().flat_map(char::to_lowercase) {
        if is_combining_mark(ch) {
            continue;
        }
        let mut buf = [0; 4];
        let piece = if ch.is_ascii_alphanumeric() {
            Some(&*ch.encode_utf8(&mut buf))
        } else {
            fold_latin(ch)
        };
        match piece {
            Some(piece) => {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push_str(piece);
            }
            None => pending_dash = true,
        }
    }
    slug
}

/// Hash-based slug for titles without a natural slug.
#[must_use]
pub fn fallback_slug(title: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{FALLBACK_PREFIX}{}", &digest[..FALLBACK_HASH_LEN])
}

/// Allocates unique slugs within one sibling scope.
///
/// Uniqueness is case-insensitive; colliding slugs get `-2`, `-3`, ...
#[derive(Debug, Default)]
pub struct SlugAllocator {
    used: HashSet<String>,
}

impl SlugAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a slug for `title` and mark it as used.
    ///
    /// ```
    /// use docloom_site::SlugAllocator;
    ///
    /// let mut scope = SlugAllocator::new();
    /// assert_eq!(scope.allocate("Overview"), "overview");
    /// assert_eq!(scope.allocate("Overview"), "overview-2");
    /// assert_eq!(scope.allocate("OVERVIEW"), "overview-3");
    /// ```
    pub fn allocate(&mut self, title: &str) -> String {
        let mut base = slugify(title);
        if base.is_empty() {
            base = fallback_slug(title);
        }

        let mut candidate = base.clone();
        let mut suffix = 2;
        while self.used.contains(&candidate.to_lowercase()) {
            candidate = format!("{base}-{suffix}");
            suffix += 1;
        }
        self.used.insert(candidate.to_lowercase());
        candidate
    }

    /// Whether `slug` is already taken in this scope.
    #[must_use]
    pub fn is_used(&self, slug: &str) -> bool {
        self.used.contains(&slug.to_lowercase())
    }
}
