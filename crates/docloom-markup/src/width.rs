//! Display-width measurement for section underlines.
//!
//! reStructuredText rejects a section title whose underline is shorter than
//! the title's column width. Sphinx measures columns with the East Asian
//! Width property, so emoji and CJK glyphs occupy two columns while
//! combining marks occupy none. Counting `chars()` undercounts those titles.

use std::ops::RangeInclusive;

/// Combining marks with a non-zero canonical combining class.
///
/// These attach to the preceding base character and take no column.
const ZERO_WIDTH: &[RangeInclusive<u32>] = &[
    // Combining Diacritical Marks
    0x0300..=0x036F,
    // Hebrew points
    0x0591..=0x05BD,
    0x05C1..=0x05C2,
    0x05C4..=0x05C5,
    // Arabic harakat
    0x064B..=0x065F,
    // Combining Diacritical Marks Extended
    0x1AB0..=0x1AFF,
    // Combining Diacritical Marks Supplement
    0x1DC0..=0x1DFF,
    // Combining Diacritical Marks for Symbols
    0x20D0..=0x20FF,
    // Combining Half Marks
    0xFE20..=0xFE2F,
];

/// Wide and fullwidth ranges, plus pictographs rendered as emoji.
///
/// Symbol blocks that are only sometimes drawn as emoji (Misc Symbols,
/// Dingbats) are counted wide as well: an underline that is too long is
/// valid markup, one that is too short is not.
const DOUBLE_WIDTH: &[RangeInclusive<u32>] = &[
    // Hangul Jamo
    0x1100..=0x115F,
    // Watch, hourglass
    0x231A..=0x231B,
    // Angle brackets
    0x2329..=0x232A,
    // Media control symbols
    0x23E9..=0x23F3,
    0x23F8..=0x23FA,
    // Geometric shapes used as emoji
    0x25FD..=0x25FE,
    // Miscellaneous Symbols and Dingbats
    0x2600..=0x27BF,
    // Stars and circles
    0x2B1B..=0x2B1C,
    0x2B50..=0x2B50,
    0x2B55..=0x2B55,
    // CJK Radicals through Kangxi, CJK Symbols and Punctuation
    0x2E80..=0x303E,
    // Hiragana through CJK Compatibility
    0x3041..=0x33FF,
    // CJK Unified Ideographs Extension A
    0x3400..=0x4DBF,
    // CJK Unified Ideographs
    0x4E00..=0x9FFF,
    // Yi Syllables and Radicals
    0xA000..=0xA4CF,
    // Hangul Jamo Extended-A
    0xA960..=0xA97F,
    // Hangul Syllables
    0xAC00..=0xD7A3,
    // CJK Compatibility Ideographs
    0xF900..=0xFAFF,
    // Vertical forms
    0xFE10..=0xFE19,
    // CJK Compatibility Forms, Small Form Variants
    0xFE30..=0xFE6F,
    // Fullwidth Forms
    0xFF00..=0xFF60,
    0xFFE0..=0xFFE6,
    // Mahjong, domino and playing cards
    0x1F000..=0x1F0FF,
    // Enclosed alphanumeric and ideographic supplements
    0x1F100..=0x1F2FF,
    // Misc Symbols and Pictographs, Emoticons, Transport and Map
    0x1F300..=0x1F6FF,
    // Geometric Shapes Extended
    0x1F7E0..=0x1F7EB,
    // Supplemental Symbols and Pictographs, Symbols and Pictographs Extended-A
    0x1F900..=0x1FAFF,
    // CJK Unified Ideographs Extensions B..F
    0x20000..=0x2FFFD,
    // CJK Unified Ideographs Extension G and later
    0x30000..=0x3FFFD,
];

/// Column width of a single character.
#[must_use]
pub fn char_width(ch: char) -> usize {
    let cp = u32::from(ch);
    if cp < 0x0300 {
        return 1;
    }
    if ZERO_WIDTH.iter().any(|r| r.contains(&cp)) {
        0
    } else if DOUBLE_WIDTH.iter().any(|r| r.contains(&cp)) {
        2
    } else {
        1
    }
}

/// Column width of a string as the downstream renderer measures it.
///
/// # Examples
///
/// ```
/// use docloom_markup::display_width;
///
/// assert_eq!(display_width("Guide"), 5);
/// assert_eq!(display_width("🚀 Launch"), 9);
/// assert_eq!(display_width("日本語"), 6);
/// ```
#[must_use]
pub fn display_width(text: &str) -> usize {
    text.chars().map(char_width).sum()
}

/// Whether any character of `text` is wider or narrower than one column.
///
/// Callers use this to log when an underline length differs from the
/// character count.
#[must_use]
pub fn has_non_narrow(text: &str) -> bool {
    text.chars().any(|ch| char_width(ch) != 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_is_one_column_per_char() {
        assert_eq!(display_width("Hello, world"), 12);
        assert!(!has_non_narrow("Hello, world"));
    }

    #[test]
    fn test_emoji_counts_two_columns() {
        assert_eq!(display_width("🚀"), 2);
        assert_eq!(display_width("🚀🎉"), 4);
        assert!(has_non_narrow("🚀"));
    }

    #[test]
    fn test_cjk_counts_two_columns() {
        assert_eq!(display_width("ガイド"), 6);
        assert_eq!(display_width("한국어"), 6);
    }

    #[test]
    fn test_combining_mark_counts_zero() {
        // "e" followed by COMBINING ACUTE ACCENT
        assert_eq!(display_width("e\u{0301}"), 1);
    }

    #[test]
    fn test_variation_selector_and_zwj_are_counted() {
        // heart + VS16 renders as a two-column emoji
        assert!(display_width("\u{2764}\u{FE0F}") >= 2);
        // family sequence: three wide glyphs joined by two ZWJ
        assert_eq!(display_width("👨\u{200D}👩\u{200D}👧"), 8);
    }

    #[test]
    fn test_width_never_below_char_count_for_titles_without_marks() {
        for title in ["✅ Done", "⭐ Stars", "📦 Package ⚙️ Setup", "Überblick"] {
            assert!(display_width(title) >= title.chars().count(), "{title}");
        }
    }
}
