//! Name escaping for the manifest text format.
//!
//! Tokens are separated by single spaces, so names and stream paths cannot
//! contain raw whitespace. Each whitespace byte is written as `\NNN` (octal)
//! and a literal backslash as `\\`.

use std::fmt::Write;

/// Escape a file name or stream path for inclusion in manifest text.
pub fn escape_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c' => {
                let _ = write!(out, "\\{:03o}", ch as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// Reverse [`escape_name`].
///
/// `\\` becomes `\`, `\NNN` with three octal digits becomes that byte, and
/// any other backslash is kept literally. Returns `None` if the result is not
/// valid UTF-8.
pub fn unescape_name(escaped: &str) -> Option<String> {
    if !escaped.contains('\\') {
        return Some(escaped.to_string());
    }

    let bytes = escaped.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            if bytes.get(i + 1) == Some(&b'\\') {
                out.push(b'\\');
                i += 2;
                continue;
            }
            if let Some(byte) = octal_escape(&bytes[i + 1..]) {
                out.push(byte);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).ok()
}

fn octal_escape(rest: &[u8]) -> Option<u8> {
    let digits = rest.get(..3)?;
    if !digits.iter().all(|b| (b'0'..=b'7').contains(b)) {
        return None;
    }
    let value = digits
        .iter()
        .fold(0u32, |acc, b| acc * 8 + u32::from(b - b'0'));
    u8::try_from(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_space_and_backslash() {
        assert_eq!(escape_name("foo bar"), "foo\\040bar");
        assert_eq!(escape_name("a\\b"), "a\\\\b");
        assert_eq!(escape_name("tab\there"), "tab\\011here");
        assert_eq!(escape_name("plain.txt"), "plain.txt");
    }

    #[test]
    fn unescape_cases() {
        for (input, expect) in [
            ("\\040", " "),
            ("\\009", "\\009"),
            ("\\\\\\040\\\\", "\\ \\"),
            ("\\\\040\\", "\\040\\"),
            ("trailing\\", "trailing\\"),
            ("\\04", "\\04"),
        ] {
            assert_eq!(unescape_name(input).as_deref(), Some(expect), "input {input:?}");
        }
    }

    #[test]
    fn escape_then_unescape_preserves_name() {
        for name in ["foo bar", "a\\b c", "résumé final.pdf", "\\040 literal"] {
            assert_eq!(unescape_name(&escape_name(name)).as_deref(), Some(name));
        }
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert_eq!(unescape_name("\\377"), None);
    }
}
