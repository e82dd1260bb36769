use logos::{Lexer, Logos};

/// Escaping based on:
///
/// \b         - backspace       (U+0008)
/// \t         - tab             (U+0009)
/// \n         - linefeed        (U+000A)
/// \f         - form feed       (U+000C)
/// \r         - carriage return (U+000D)
/// \"         - quote           (U+0022)
/// \\         - backslash       (U+005C)
/// \uXXXX     - unicode         (U+XXXX)
/// \UXXXXXXXX - unicode         (U+XXXXXXXX)
///
/// A backslash at the end of a line trims the line ending and all
/// whitespace up to the next non-whitespace character.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Escape {
    #[token(r#"\b"#)]
    Backspace,

    #[token(r#"\t"#)]
    Tab,

    #[regex(r#"\\[ \t]*\r?\n[ \t\r\n]*"#)]
    LineContinuation,

    #[token(r#"\n"#)]
    LineFeed,

    #[token(r#"\f"#)]
    FormFeed,

    #[token(r#"\r"#)]
    CarriageReturn,

    #[token(r#"\""#)]
    DoubleQuote,

    #[token(r#"\\"#)]
    Backslash,

    // Same thing repeated 4 times, but the {n} repetition syntax is not supported by Logos
    #[regex(r#"\\u[0-9A-Fa-f][0-9A-Fa-f][0-9A-Fa-f][0-9A-Fa-f]"#)]
    Unicode,

    // Same thing repeated 8 times, but the {n} repetition syntax is not supported by Logos
    #[regex(
        r#"\\U[0-9A-Fa-f][0-9A-Fa-f][0-9A-Fa-f][0-9A-Fa-f][0-9A-Fa-f][0-9A-Fa-f][0-9A-Fa-f][0-9A-Fa-f]"#
    )]
    UnicodeLarge,

    #[regex(r#"\\."#)]
    Unknown,

    #[regex(r#"[^\\]+"#)]
    UnEscaped,

    #[error]
    Error,
}
use Escape::*;

/// Unescape all supported sequences found in [Escape](Escape).
///
/// If it fails, the byte index of the offending backslash is returned.
pub fn unescape(s: &str) -> Result<String, usize> {
    let mut new_s = String::with_capacity(s.len());
    let mut lexer: Lexer<Escape> = Lexer::new(s);

    while let Some(t) = lexer.next() {
        match t {
            Backspace => new_s += "\u{0008}",
            Tab => new_s += "\u{0009}",
            LineFeed => new_s += "\u{000A}",
            FormFeed => new_s += "\u{000C}",
            CarriageReturn => new_s += "\u{000D}",
            DoubleQuote => new_s += "\u{0022}",
            Backslash => new_s += "\u{005C}",
            LineContinuation => {}
            Unicode | UnicodeLarge => {
                new_s.push(unicode_scalar(&lexer).ok_or(lexer.span().start)?);
            }
            Unknown | Error => return Err(lexer.span().start),
            UnEscaped => {
                new_s += lexer.slice();
            }
        }
    }

    Ok(new_s)
}

/// Same as unescape, but doesn't create a new
/// unescaped string, and returns all invalid escape indices.
pub fn check_escape(s: &str) -> Result<(), Vec<usize>> {
    let mut lexer: Lexer<Escape> = Lexer::new(s);
    let mut invalid = Vec::new();

    while let Some(t) = lexer.next() {
        match t {
            Unicode | UnicodeLarge => {
                if unicode_scalar(&lexer).is_none() {
                    invalid.push(lexer.span().start);
                }
            }
            Unknown | Error => invalid.push(lexer.span().start),
            _ => {}
        }
    }

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(invalid)
    }
}

/// Surrogate code points and values past U+10FFFF are not scalar values.
fn unicode_scalar(lexer: &Lexer<Escape>) -> Option<char> {
    u32::from_str_radix(&lexer.slice()[2..], 16)
        .ok()
        .and_then(std::char::from_u32)
}
