//! Context-sensitive tokenizer.
//!
//! TOML words mean different things left and right of `=`: `1.2` is a
//! dotted key before it and a float after it. The lexer tracks whether it is
//! inside a key from the tokens it emitted and the stack of open brackets.

use crate::error::Error;
use crate::syntax::SyntaxKind::{self, *};
use crate::util::mapper::Position;
use crate::value::datetime::{looks_like_datetime, Datetime, DatetimeKind};
use crate::value::number::{check_decimal, check_digit_groups, check_float, has_sign};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'s> {
    pub kind: SyntaxKind,
    pub text: &'s str,
    pub position: Position,
}

impl<'s> Token<'s> {
    #[inline]
    pub fn new(kind: SyntaxKind, text: &'s str, position: Position) -> Self {
        Self {
            kind,
            text,
            position,
        }
    }
}

impl core::fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            EOF => write!(f, "end of input"),
            NEWLINE => write!(f, "newline"),
            _ => write!(f, "`{}`", self.text),
        }
    }
}

/// Split `source` into tokens. The last token is always `EOF`.
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, Error> {
    let mut lexer = Lexer::new(source);
    while lexer.peek_char().is_some() {
        lexer.scan_next_token()?;
    }
    let end = lexer.pos;
    lexer.tokens.push(Token::new(EOF, "", end));
    tracing::trace!(count = lexer.tokens.len(), "tokenized");
    Ok(lexer.tokens)
}

fn is_bare_key_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

fn is_value_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '+' | '.' | ':')
}

fn is_control(ch: char) -> bool {
    (ch < ' ' && ch != '\t') || ch == '\u{7f}'
}

struct Lexer<'s> {
    source: &'s str,
    pos: Position,
    tokens: Vec<Token<'s>>,
    open: Vec<SyntaxKind>,
    /// Whether the next word is (part of) a key.
    key: bool,
}

impl<'s> Lexer<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            pos: Position::START,
            tokens: vec![],
            open: vec![],
            key: true,
        }
    }

    fn rest(&self) -> &'s str {
        &self.source[self.pos.offset..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn peek_is(&self, ch: char) -> bool {
        self.peek_char() == Some(ch)
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos.step(ch);
        Some(ch)
    }

    fn checkpoint(&self) -> Position {
        self.pos
    }

    fn restore(&mut self, pos: Position) {
        self.pos = pos;
    }

    fn push(&mut self, kind: SyntaxKind, start: Position) {
        let text = &self.source[start.offset..self.pos.offset];
        if kind.is_open() {
            self.open.push(kind);
        } else if kind.is_close() {
            self.open.pop();
        }
        if !kind.is_trivia() {
            self.key = match kind {
                NEWLINE | COMMA => self.open.last() != Some(&BRACKET_START),
                PERIOD | BRACE_START | HEADER_START | ARRAY_HEADER_START => true,
                kind if kind.is_key_segment() => self.key,
                _ => false,
            };
        }
        self.tokens.push(Token::new(kind, text, start));
    }

    fn scan_next_token(&mut self) -> Result<(), Error> {
        let start = self.checkpoint();
        let ch = match self.peek_char() {
            Some(ch) => ch,
            None => return Ok(()),
        };
        match ch {
            ' ' | '\t' => {
                while matches!(self.peek_char(), Some(' ' | '\t')) {
                    self.next_char();
                }
                self.push(WHITESPACE, start);
            }
            '\n' | '\r' => {
                loop {
                    match self.peek_char() {
                        Some('\n') => {
                            self.next_char();
                        }
                        Some('\r') if self.peek_nth(1) == Some('\n') => {
                            self.next_char();
                            self.next_char();
                        }
                        Some('\r') => {
                            return Err(Error::lex("standalone carriage return", self.pos));
                        }
                        _ => break,
                    }
                }
                self.push(NEWLINE, start);
            }
            '#' => self.scan_comment(start)?,
            '"' if self.rest().starts_with("\"\"\"") => {
                self.scan_multi_line_string(start, '"')?
            }
            '"' => self.scan_string(start, '"')?,
            '\'' if self.rest().starts_with("'''") => {
                self.scan_multi_line_string(start, '\'')?
            }
            '\'' => self.scan_string(start, '\'')?,
            '=' => self.single(EQ, start),
            ',' => self.single(COMMA, start),
            '.' if self.key => self.single(PERIOD, start),
            '{' => self.single(BRACE_START, start),
            '}' => self.single(BRACE_END, start),
            '[' => {
                self.next_char();
                let kind = if self.open.is_empty() && self.key {
                    if self.peek_is('[') {
                        self.next_char();
                        ARRAY_HEADER_START
                    } else {
                        HEADER_START
                    }
                } else {
                    BRACKET_START
                };
                self.push(kind, start);
            }
            ']' => {
                self.next_char();
                let kind = match self.open.last() {
                    Some(ARRAY_HEADER_START) if self.peek_is(']') => {
                        self.next_char();
                        ARRAY_HEADER_END
                    }
                    Some(HEADER_START | ARRAY_HEADER_START) => HEADER_END,
                    _ => BRACKET_END,
                };
                self.push(kind, start);
            }
            ch if self.key && is_bare_key_char(ch) => {
                while self.peek_char().map_or(false, is_bare_key_char) {
                    self.next_char();
                }
                self.push(IDENT, start);
            }
            ch if is_value_char(ch) => self.scan_word(start)?,
            ch => {
                return Err(Error::lex(
                    format!("unexpected character `{}`", ch.escape_debug()),
                    start,
                ))
            }
        }
        Ok(())
    }

    fn single(&mut self, kind: SyntaxKind, start: Position) {
        self.next_char();
        self.push(kind, start);
    }

    fn scan_comment(&mut self, start: Position) -> Result<(), Error> {
        while let Some(ch) = self.peek_char() {
            match ch {
                '\n' => break,
                '\r' if self.peek_nth(1) == Some('\n') => break,
                '\r' => return Err(Error::lex("standalone carriage return", self.pos)),
                ch if is_control(ch) => {
                    return Err(Error::lex("control character in comment", self.pos))
                }
                _ => {
                    self.next_char();
                }
            }
        }
        self.push(COMMENT, start);
        Ok(())
    }

    fn scan_string(&mut self, start: Position, quote: char) -> Result<(), Error> {
        self.next_char();
        loop {
            match self.peek_char() {
                None | Some('\n') => return Err(Error::lex("unterminated string", start)),
                Some('\r') if self.peek_nth(1) == Some('\n') => {
                    return Err(Error::lex("unterminated string", start))
                }
                Some(ch) if ch == quote => {
                    self.next_char();
                    break;
                }
                Some('\\') if quote == '"' => {
                    self.next_char();
                    match self.peek_char() {
                        None | Some('\n') => return Err(Error::lex("unterminated string", start)),
                        Some(ch) if is_control(ch) => {
                            return Err(Error::lex("control character in string", self.pos))
                        }
                        Some(_) => {
                            self.next_char();
                        }
                    }
                }
                Some(ch) if is_control(ch) => {
                    return Err(Error::lex("control character in string", self.pos))
                }
                Some(_) => {
                    self.next_char();
                }
            }
        }
        let kind = if quote == '"' {
            BASIC_STRING
        } else {
            LITERAL_STRING
        };
        self.push(kind, start);
        Ok(())
    }

    fn scan_multi_line_string(&mut self, start: Position, quote: char) -> Result<(), Error> {
        for _ in 0..3 {
            self.next_char();
        }
        loop {
            match self.peek_char() {
                None => return Err(Error::lex("unterminated multi-line string", start)),
                Some(ch) if ch == quote => {
                    let mut run = 0;
                    while run < 5 && self.peek_is(quote) {
                        self.next_char();
                        run += 1;
                    }
                    // up to two quotes before the closing three are content
                    if run >= 3 {
                        break;
                    }
                }
                Some('\\') if quote == '"' => {
                    self.next_char();
                    if matches!(self.peek_char(), Some('"' | '\\')) {
                        self.next_char();
                    }
                }
                Some('\n') => {
                    self.next_char();
                }
                Some('\r') if self.peek_nth(1) == Some('\n') => {
                    self.next_char();
                    self.next_char();
                }
                Some('\r') => return Err(Error::lex("standalone carriage return", self.pos)),
                Some(ch) if is_control(ch) => {
                    return Err(Error::lex("control character in string", self.pos))
                }
                Some(_) => {
                    self.next_char();
                }
            }
        }
        let kind = if quote == '"' {
            MULTI_LINE_BASIC_STRING
        } else {
            MULTI_LINE_LITERAL_STRING
        };
        self.push(kind, start);
        Ok(())
    }

    /// A value-position word: boolean, number, date-time, or an `IDENT`
    /// the parser will reject.
    fn scan_word(&mut self, start: Position) -> Result<(), Error> {
        self.eat_word();
        let date = &self.source[start.offset..self.pos.offset];
        if date.len() == 10 && looks_like_datetime(date) && self.peek_is(' ') {
            let saved = self.checkpoint();
            self.next_char();
            let rest = self.rest().as_bytes();
            if rest.len() > 2 && rest[..2].iter().all(u8::is_ascii_digit) && rest[2] == b':' {
                self.eat_word();
            } else {
                self.restore(saved);
            }
        }
        let word = &self.source[start.offset..self.pos.offset];
        let kind = classify_word(word).map_err(|message| Error::lex(message, start))?;
        self.push(kind, start);
        Ok(())
    }

    fn eat_word(&mut self) {
        while self.peek_char().map_or(false, is_value_char) {
            self.next_char();
        }
    }
}

fn classify_word(word: &str) -> Result<SyntaxKind, String> {
    match word {
        "true" | "false" => return Ok(BOOL),
        "inf" | "+inf" | "-inf" | "nan" | "+nan" | "-nan" => return Ok(FLOAT),
        _ => {}
    }
    if looks_like_datetime(word) {
        let datetime: Datetime = word.parse().map_err(|e| format!("{}", e))?;
        return Ok(match datetime.kind() {
            DatetimeKind::OffsetDateTime => OFFSET_DATE_TIME,
            DatetimeKind::LocalDateTime => LOCAL_DATE_TIME,
            DatetimeKind::LocalDate => LOCAL_DATE,
            DatetimeKind::LocalTime => LOCAL_TIME,
        });
    }
    let unsigned = if has_sign(word) { &word[1..] } else { word };
    let based = match unsigned.get(..2) {
        Some("0x") => Some((16, INTEGER_HEX)),
        Some("0o") => Some((8, INTEGER_OCT)),
        Some("0b") => Some((2, INTEGER_BIN)),
        _ => None,
    };
    if let Some((radix, kind)) = based {
        if has_sign(word) {
            return Err(format!("invalid integer `{}`: a sign is not allowed here", word));
        }
        check_digit_groups(&unsigned[2..], radix)
            .map_err(|e| format!("invalid integer `{}`: {}", word, e))?;
        return Ok(kind);
    }
    if !unsigned.starts_with(|c: char| c.is_ascii_digit()) {
        return Ok(IDENT);
    }
    if unsigned.chars().all(|c| c.is_ascii_digit() || c == '_') {
        check_digit_groups(unsigned, 10).map_err(|e| format!("invalid integer `{}`: {}", word, e))?;
        if check_decimal(unsigned).is_err() {
            return Ok(IDENT);
        }
        return Ok(INTEGER);
    }
    let float_shaped = unsigned
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '_' | '.' | 'e' | 'E' | '+' | '-'))
        && unsigned.contains(|c| matches!(c, '.' | 'e' | 'E'));
    if float_shaped {
        check_float(word).map_err(|e| format!("invalid float `{}`: {}", word, e))?;
        return Ok(FLOAT);
    }
    Ok(IDENT)
}
