use super::escape::unescape;
use crate::syntax::SyntaxKind;
use std::borrow::Cow;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteType {
    None,
    Basic,
    MultiLineBasic,
    Literal,
    MultiLineLiteral,
}

impl QuoteType {
    pub fn from_kind(kind: SyntaxKind) -> Self {
        match kind {
            SyntaxKind::BASIC_STRING => QuoteType::Basic,
            SyntaxKind::MULTI_LINE_BASIC_STRING => QuoteType::MultiLineBasic,
            SyntaxKind::LITERAL_STRING => QuoteType::Literal,
            SyntaxKind::MULTI_LINE_LITERAL_STRING => QuoteType::MultiLineLiteral,
            _ => QuoteType::None,
        }
    }

    fn delimiter(self) -> &'static str {
        match self {
            QuoteType::None => "",
            QuoteType::Basic => "\"",
            QuoteType::MultiLineBasic => "\"\"\"",
            QuoteType::Literal => "'",
            QuoteType::MultiLineLiteral => "'''",
        }
    }
}

/// Remove quotes and unescape a string token.
///
/// If it fails, the byte index (within `s`) of the failure is returned.
pub fn unquote(s: &str, quote_type: QuoteType) -> Result<String, usize> {
    let delimiter = quote_type.delimiter();
    let inner = s
        .strip_prefix(delimiter)
        .and_then(|s| s.strip_suffix(delimiter))
        .ok_or(0usize)?;
    let mut offset = delimiter.len();

    let inner = match quote_type {
        QuoteType::MultiLineBasic | QuoteType::MultiLineLiteral => {
            // a newline right after the opening delimiter is trimmed
            if let Some(rest) = inner.strip_prefix("\r\n") {
                offset += 2;
                rest
            } else if let Some(rest) = inner.strip_prefix('\n') {
                offset += 1;
                rest
            } else {
                inner
            }
        }
        _ => inner,
    };

    match quote_type {
        QuoteType::Basic | QuoteType::MultiLineBasic => {
            unescape(inner).map_err(|index| index + offset)
        }
        _ => Ok(inner.to_string()),
    }
}

/// Whether a key has to be quoted to be written as a TOML key.
pub fn need_quote(key: &str) -> bool {
    key.is_empty()
        || !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Key text as it has to be written in a document.
pub fn quote_key(key: &str) -> Cow<'_, str> {
    if need_quote(key) {
        Cow::Owned(quote(key))
    } else {
        Cow::Borrowed(key)
    }
}

/// Write `s` as a single-line basic string.
pub fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '\u{8}' => quoted.push_str("\\b"),
            '\t' => quoted.push_str("\\t"),
            '\n' => quoted.push_str("\\n"),
            '\u{c}' => quoted.push_str("\\f"),
            '\r' => quoted.push_str("\\r"),
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            c if c.is_control() => {
                let _ = write!(quoted, "\\u{:04X}", c as u32);
            }
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquote() {
        assert_eq!(unquote(r#""a\tb""#, QuoteType::Basic).unwrap(), "a\tb");
        assert_eq!(unquote(r#"'C:\path'"#, QuoteType::Literal).unwrap(), r#"C:\path"#);
        assert_eq!(
            unquote("\"\"\"\nline one\nline two\"\"\"", QuoteType::MultiLineBasic).unwrap(),
            "line one\nline two"
        );
        assert_eq!(
            unquote("'''\r\n  raw \\n'''", QuoteType::MultiLineLiteral).unwrap(),
            "  raw \\n"
        );
        assert_eq!(unquote("bare", QuoteType::None).unwrap(), "bare");
    }

    #[test]
    fn test_unquote_error_index() {
        // the index points at the backslash inside the token
        assert_eq!(unquote(r#""ab\q""#, QuoteType::Basic), Err(3));
        assert_eq!(unquote("\"\"\"\n\\q\"\"\"", QuoteType::MultiLineBasic), Err(4));
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("plain"), r#""plain""#);
        assert_eq!(quote("tab\there \"q\" \\"), r#""tab\there \"q\" \\""#);
        assert_eq!(quote("\u{1}\u{7f}"), r#""\u0001\u007F""#);
        assert_eq!(quote_key("bare-key_1"), "bare-key_1");
        assert_eq!(quote_key("a.b"), r#""a.b""#);
        assert_eq!(quote_key(""), r#""""#);
    }
}
