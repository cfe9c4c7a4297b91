//! Transcript cleanup applied before text is returned to clients.

use once_cell::sync::Lazy;
use regex::Regex;

static ANSI_COLOUR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("ANSI pattern is valid"));

static SPACE_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \x{00A0}]{2,}").expect("space pattern is valid"));

/// Strip colour escapes and control characters, collapse space runs, trim.
///
/// Newlines and tabs survive; DEL does not.
pub fn clean_text(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let without_ansi = ANSI_COLOUR.replace_all(raw, "");
    let printable: String = without_ansi
        .chars()
        .filter(|&c| c == '\n' || c == '\t' || (c >= ' ' && c != '\u{7f}'))
        .collect();

    SPACE_RUNS.replace_all(&printable, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(clean_text("Сәлем, әлем!"), "Сәлем, әлем!");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn test_strips_ansi_and_controls() {
        assert_eq!(clean_text("\x1b[31mred\x1b[0m text"), "red text");
        assert_eq!(clean_text("bell\x07 and del\x7f"), "bell and del");
    }

    #[test]
    fn test_keeps_newlines_and_tabs() {
        assert_eq!(clean_text("line one\n\tline two"), "line one\n\tline two");
    }

    #[test]
    fn test_collapses_spaces_and_trims() {
        assert_eq!(clean_text("  too    many \u{a0}\u{a0}spaces  "), "too many spaces");
    }
}
