//! Right-to-left text helpers
//!
//! The renderers draw glyphs strictly left to right. Strings containing
//! Hebrew or Arabic are reversed so they read correctly; pure LTR strings
//! are returned untouched.

/// True for characters of the Hebrew and Arabic blocks.
pub fn is_rtl_char(c: char) -> bool {
    matches!(c, '\u{0590}'..='\u{05FF}' | '\u{0600}'..='\u{06FF}' | '\u{FB1D}'..='\u{FB4F}')
}

pub fn contains_rtl(text: &str) -> bool {
    text.chars().any(is_rtl_char)
}

/// Visual glyph order for a single-line string.
pub fn visual_order(text: &str) -> String {
    if contains_rtl(text) {
        text.chars().rev().collect()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ltr_untouched() {
        assert_eq!(visual_order("VIN 1HGCM82633A"), "VIN 1HGCM82633A");
        assert_eq!(visual_order(""), "");
    }

    #[test]
    fn test_hebrew_reversed() {
        assert_eq!(visual_order("חוסרים"), "םירסוח");
    }

    #[test]
    fn test_mixed_reversed_as_whole() {
        assert_eq!(visual_order("אב 12"), "21 בא");
    }

    #[test]
    fn test_contains_rtl() {
        assert!(contains_rtl("abc ד"));
        assert!(!contains_rtl("abc"));
    }
}
