//! C++ string literal escaping
//!
//! File contents are embedded as narrow string literals that may span many
//! physical lines of the generated source. Two grammars are supported:
//!
//! - [`EscapeStyle::Continuation`]: each newline is written as `\n` followed
//!   by a backslash-newline line splice, keeping a single literal token.
//! - [`EscapeStyle::Concatenation`]: each newline is written as `\n` and the
//!   literal is closed and reopened on the next line; the compiler joins the
//!   adjacent literals.
//!
//! Both decode (see [`crate::parse::unescape_literal`]) to the input with
//! CRLF normalized to LF.

use serde::Deserialize;
use std::fmt::Write as FmtWrite;

/// Escape grammar for multi-line literals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EscapeStyle {
    /// `\n\` + newline (line splice)
    #[default]
    Continuation,
    /// `\n"` + newline + `"` (adjacent literal concatenation)
    Concatenation,
}

/// Replace every CRLF pair with a single LF. Lone CRs are kept.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// Escape text contents as a quoted literal, breaking the physical line
/// after every newline according to `style`.
pub fn escape_text_literal(content: &str, style: EscapeStyle) -> String {
    let content = normalize_line_endings(content);
    let mut out = String::with_capacity(content.len() + content.len() / 8 + 2);
    out.push('"');
    push_escaped(&mut out, &content, Some(style));
    out.push('"');
    out
}

/// Escape an entry name as a single-line quoted literal
pub fn escape_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push('"');
    push_escaped(&mut out, name, None);
    out.push('"');
    out
}

fn push_escaped(out: &mut String, text: &str, line_break: Option<EscapeStyle>) {
    let mut prev = '\0';
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => {
                out.push_str("\\n");
                match line_break {
                    Some(EscapeStyle::Continuation) => out.push_str("\\\n"),
                    Some(EscapeStyle::Concatenation) => out.push_str("\"\n\""),
                    None => {}
                }
            }
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            // `??x` would be read as a trigraph by pre-C++17 compilers
            '?' if prev == '?' => out.push_str("\\?"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                // Octal escapes stop after three digits, unlike \x
                let _ = write!(out, "\\{:03o}", c as u32);
            }
            c => out.push(c),
        }
        prev = c;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_crlf_only() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\n"), "a\nb\rc\n");
    }

    #[test]
    fn test_continuation_newline() {
        assert_eq!(
            escape_text_literal("hi\n", EscapeStyle::Continuation),
            "\"hi\\n\\\n\""
        );
    }

    #[test]
    fn test_concatenation_newline() {
        assert_eq!(
            escape_text_literal("a\nb", EscapeStyle::Concatenation),
            "\"a\\n\"\n\"b\""
        );
    }

    #[test]
    fn test_crlf_becomes_single_break() {
        assert_eq!(
            escape_text_literal("a\r\nb", EscapeStyle::Continuation),
            escape_text_literal("a\nb", EscapeStyle::Continuation)
        );
    }

    #[test]
    fn test_quotes_and_backslashes() {
        assert_eq!(
            escape_text_literal(r#"say "x" \ y"#, EscapeStyle::Continuation),
            r#""say \"x\" \\ y""#
        );
    }

    #[test]
    fn test_literal_backslash_n_is_not_a_newline() {
        // Content is a backslash followed by the letter n, no line feed
        let escaped = escape_text_literal("\\n", EscapeStyle::Continuation);
        assert_eq!(escaped, "\"\\\\n\"");
        assert!(!escaped.contains('\n'));
    }

    #[test]
    fn test_control_characters_use_octal() {
        assert_eq!(escape_name("a\u{1}7\u{7f}"), "\"a\\0017\\177\"");
        assert_eq!(escape_name("tab\there"), "\"tab\\there\"");
    }

    #[test]
    fn test_trigraph_guard() {
        assert_eq!(escape_name("??="), "\"?\\?=\"");
        assert_eq!(escape_name("a?b"), "\"a?b\"");
    }

    #[test]
    fn test_name_never_breaks_line() {
        assert_eq!(escape_name("odd\nname"), "\"odd\\nname\"");
    }

    #[test]
    fn test_utf8_passes_through() {
        assert_eq!(escape_name("héllo ✓"), "\"héllo ✓\"");
    }

    #[test]
    fn test_empty_content() {
        assert_eq!(escape_text_literal("", EscapeStyle::Concatenation), "\"\"");
    }
}
