//! Character scanner over a borrowed command line
//!
//! [`Cursor`] walks the input by index and hands out sub-slices of it.
//! Values are only copied when quoting or escaping has to be resolved.

use std::borrow::Cow;

#[inline]
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

#[inline]
fn is_quote(b: u8) -> bool {
    b == b'\'' || b == b'"'
}

/// Index-based view over the unread part of a command line
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    end: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            end: src.len(),
        }
    }

    /// Unread part of the input
    pub fn remaining(&self) -> &'a str {
        &self.src[self.pos..self.end]
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.end
    }

    /// Whether the next token is a flag
    pub fn at_parameter(&self) -> bool {
        self.remaining().starts_with('-')
    }

    /// Next whitespace-delimited token, without consuming it
    pub fn peek_token(&self) -> &'a str {
        let rest = self.remaining();
        let len = rest.bytes().position(is_whitespace).unwrap_or(rest.len());
        &rest[..len]
    }

    /// Move forward `n` bytes; callers pass ASCII-aligned counts
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.end);
    }

    /// Skip leading whitespace and line continuations, drop trailing whitespace
    ///
    /// A backslash counts as a continuation only when followed by
    /// whitespace or the end of input.
    pub fn trim_leading(&mut self) {
        let bytes = self.src.as_bytes();
        while self.pos < self.end {
            let b = bytes[self.pos];
            let continuation =
                b == b'\\' && (self.pos + 1 == self.end || is_whitespace(bytes[self.pos + 1]));
            if is_whitespace(b) || continuation {
                self.pos += 1;
            } else {
                break;
            }
        }

        while self.end > self.pos && is_whitespace(bytes[self.end - 1]) {
            self.end -= 1;
        }
    }

    /// Read a flag token up to the next whitespace
    pub fn read_parameter(&mut self) -> &'a str {
        self.trim_leading();
        let rest = self.remaining();
        let len = rest.bytes().position(is_whitespace).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    /// Read one shell word with its quoting and escaping resolved
    ///
    /// Quoted and unquoted segments that touch each other form a single
    /// value (`key="a b"` reads as `key=a b`). A quote that is never closed
    /// runs to the end of the input.
    pub fn read_value(&mut self) -> Cow<'a, str> {
        self.trim_leading();
        let rest = self.remaining();
        let bytes = rest.as_bytes();

        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b if is_whitespace(b) => break,
                b'\\' | b'\'' | b'"' => return self.read_compound_value(),
                _ => i += 1,
            }
        }

        self.pos += i;
        Cow::Borrowed(&rest[..i])
    }

    fn read_compound_value(&mut self) -> Cow<'a, str> {
        let rest = self.remaining();
        let bytes = rest.as_bytes();
        let mut value = String::with_capacity(rest.len());

        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            if is_whitespace(b) {
                break;
            }
            if is_quote(b) {
                i = read_quoted(rest, i + 1, b, &mut value);
            } else {
                let start = i;
                i = skip_unquoted(rest, i);
                value.push_str(&unescape(&rest[start..i]));
            }
        }

        self.pos += i;
        Cow::Owned(value)
    }
}

/// End of an unquoted run starting at `i`; escaped characters belong to it
fn skip_unquoted(src: &str, mut i: usize) -> usize {
    let bytes = src.as_bytes();
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\\' {
            i += 1 + src[i + 1..].chars().next().map_or(0, char::len_utf8);
        } else if is_whitespace(b) || is_quote(b) {
            break;
        } else {
            i += 1;
        }
    }
    i
}

/// Copy a quoted segment into `value`, returning the index after it
///
/// `start` points just past the opening quote.
fn read_quoted(src: &str, start: usize, quote: u8, value: &mut String) -> usize {
    let bytes = src.as_bytes();
    let mut run = start;
    let mut i = start;

    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\\' {
            value.push_str(&src[run..i]);
            match src[i + 1..].chars().next() {
                Some(escaped) => {
                    value.push(escaped);
                    i += 1 + escaped.len_utf8();
                }
                None => i += 1,
            }
            run = i;
        } else if b == quote {
            value.push_str(&src[run..i]);
            if quote == b'\'' && is_shell_quoted_apostrophe(&bytes[i..]) {
                value.push('\'');
                i += SHELL_QUOTED_APOSTROPHE.len();
                run = i;
            } else {
                return i + 1;
            }
        } else {
            i += 1;
        }
    }

    value.push_str(&src[run..]);
    bytes.len()
}

/// `'\''`: close the single quote, emit an escaped one, reopen
///
/// The usual way to put an apostrophe inside a single-quoted shell
/// argument. It continues the same value.
const SHELL_QUOTED_APOSTROPHE: &[u8] = b"'\\''";

fn is_shell_quoted_apostrophe(bytes: &[u8]) -> bool {
    bytes.starts_with(SHELL_QUOTED_APOSTROPHE)
}

/// Drop escape backslashes; a doubled backslash leaves one behind
pub fn unescape(raw: &str) -> Cow<'_, str> {
    if !raw.contains('\\') {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_of(input: &str) -> String {
        Cursor::new(input).read_value().into_owned()
    }

    #[test]
    fn test_trim_leading_skips_continuations() {
        let mut cursor = Cursor::new(" \\\n  -X POST  \n");
        cursor.trim_leading();
        assert_eq!(cursor.remaining(), "-X POST");
    }

    #[test]
    fn test_trim_leading_keeps_escaped_character() {
        let mut cursor = Cursor::new("  \\-d");
        cursor.trim_leading();
        assert_eq!(cursor.remaining(), "\\-d");
    }

    #[test]
    fn test_read_parameter_advances() {
        let mut cursor = Cursor::new("-H 'a: b'");
        assert!(cursor.at_parameter());
        assert_eq!(cursor.read_parameter(), "-H");
        assert_eq!(cursor.read_value(), "a: b");
        cursor.trim_leading();
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_plain_value_is_borrowed() {
        let mut cursor = Cursor::new("https://example.com next");
        let value = cursor.read_value();
        assert!(matches!(value, Cow::Borrowed("https://example.com")));
        assert_eq!(cursor.remaining(), " next");
    }

    #[test]
    fn test_empty_input() {
        let mut cursor = Cursor::new("   ");
        assert_eq!(cursor.read_value(), "");
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_quote_only_values() {
        assert_eq!(value_of("\"\""), "");
        assert_eq!(value_of("''"), "");
    }

    #[test]
    fn test_escaped_quotes() {
        assert_eq!(value_of(r#""\"""#), "\"");
        assert_eq!(value_of(r"'\''"), "'");
        assert_eq!(value_of(r#"'"'"#), "\"");
        assert_eq!(value_of(r#""'""#), "'");
    }

    #[test]
    fn test_shell_quoted_apostrophe() {
        assert_eq!(value_of(r"'it'\''s me'"), "it's me");
    }

    #[test]
    fn test_double_backslash_survives() {
        assert_eq!(value_of(r"'\\some_data'"), "\\some_data");
        assert_eq!(value_of(r"D:\\cert.p12:123"), "D:\\cert.p12:123");
    }

    #[test]
    fn test_adjacent_segments_join() {
        assert_eq!(value_of(r#"key="value with space" rest"#), "key=value with space");
        assert_eq!(value_of(r#"key="\"""#), "key=\"");
    }

    #[test]
    fn test_unterminated_quote_runs_to_end() {
        let mut cursor = Cursor::new("'abc def");
        assert_eq!(cursor.read_value(), "abc def");
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_escaped_space_stays_in_value() {
        assert_eq!(value_of(r"my\ file.txt other"), "my file.txt");
        assert_eq!(value_of(r"caf\é"), "café");
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("plain"), "plain");
        assert_eq!(unescape(r"a\b"), "ab");
        assert_eq!(unescape(r"a\\b"), "a\\b");
        assert_eq!(unescape("trailing\\"), "trailing");
    }
}
