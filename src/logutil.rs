//! Keeps generator narrative and player-supplied names on a single log line.

use std::fmt::Write;

/// Characters of input kept before the preview is cut with an ellipsis.
pub const MAX_PREVIEW: usize = 240;

/// Escape `s` for single-line logging, truncated to [`MAX_PREVIEW`] characters.
pub fn escape_log(s: &str) -> String {
    escape_log_with(s, MAX_PREVIEW)
}

/// Escape backslashes and control characters, keeping at most `limit` input characters.
pub fn escape_log_with(s: &str, limit: usize) -> String {
    let mut out = String::with_capacity(s.len().min(limit) + 4);
    for (index, ch) in s.chars().enumerate() {
        if index == limit {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrative_stays_on_one_line() {
        let narrative = "Leo cries.\nThen\tpractises\r\nscales \\ arpeggios\u{7}";
        assert_eq!(
            escape_log(narrative),
            "Leo cries.\\nThen\\tpractises\\r\\nscales \\\\ arpeggios\\x07"
        );
    }

    #[test]
    fn long_text_is_cut() {
        let long = "a".repeat(MAX_PREVIEW + 20);
        let escaped = escape_log(&long);
        assert!(escaped.ends_with('…'));
        assert_eq!(escaped.chars().count(), MAX_PREVIEW + 1);
        assert_eq!(escape_log_with("abc", 3), "abc");
    }
}
