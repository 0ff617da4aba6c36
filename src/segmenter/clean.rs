use tracing::debug;

const NBSP: char = '\u{a0}';

/// Normalizes raw input before any offsets are computed: drops non-whitespace
/// control characters, folds NBSP to a space and smart quotes to ASCII.
pub fn clean_text(text: &str) -> String {
    text.chars()
        .filter_map(|ch| {
            if ch.is_control() && !ch.is_whitespace() {
                debug!("Control character being dropped: U+{:04X}", ch as u32);
                return None;
            }
            Some(match ch {
                NBSP => ' ',
                '\u{201c}' | '\u{201d}' => '"',
                '\u{2018}' | '\u{2019}' => '\'',
                other => other,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_control_characters() {
        assert_eq!(clean_text("a\u{0}b\u{7}c"), "abc");
    }

    #[test]
    fn test_keeps_whitespace_controls() {
        assert_eq!(clean_text("a\tb\r\nc"), "a\tb\r\nc");
    }

    #[test]
    fn test_folds_quotes_and_nbsp() {
        assert_eq!(
            clean_text("\u{201c}It\u{2019}s\u{a0}fine\u{201d}"),
            "\"It's fine\""
        );
    }
}
