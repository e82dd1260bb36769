//! TOML document to syntax tree parsing.

use crate::ast::Document;
use crate::error::Error;
use crate::lexer::{tokenize, Token};
use crate::syntax::{SyntaxKind, SyntaxKind::*, SyntaxNode};
use crate::util::escape::check_escape;
use rowan::{GreenNode, GreenNodeBuilder};

macro_rules! with_node {
    ($builder:expr, $kind:ident, $($content:tt)*) => {
        {
            $builder.start_node($kind.into());
            let res = $($content)*;
            $builder.finish_node();
            res
        }
    };
}

/// A lossless syntax tree. Every byte of the source is kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyntaxTree {
    green: GreenNode,
}

impl SyntaxTree {
    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    /// A fresh rowan root over the tree.
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn document(&self) -> Document {
        Document::from_root(self.syntax())
    }

    /// The exact source text the tree was parsed from.
    pub fn to_text(&self) -> String {
        self.syntax().text().to_string()
    }
}

impl core::fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.syntax().text())
    }
}

/// Parse a TOML document into a [`SyntaxTree`].
///
/// Parsing stops at the first lexical or grammar error. Basic strings are
/// checked for invalid escape sequences, but key and table semantics are
/// left to [`build`](crate::build).
#[tracing::instrument(skip_all)]
pub fn parse(source: &str) -> Result<SyntaxTree, Error> {
    let tokens = tokenize(source)?;
    let mut parser = Parser::new(&tokens);
    with_node!(parser.builder, DOCUMENT, parser.parse_document())?;
    Ok(SyntaxTree {
        green: parser.builder.finish(),
    })
}

type ParserResult<T> = Result<T, Error>;

struct Parser<'t, 's> {
    tokens: &'t [Token<'s>],
    index: usize,
    builder: GreenNodeBuilder<'static>,
}

impl<'t, 's> Parser<'t, 's> {
    fn new(tokens: &'t [Token<'s>]) -> Self {
        Self {
            tokens,
            index: 0,
            builder: GreenNodeBuilder::new(),
        }
    }

    fn parse_document(&mut self) -> ParserResult<()> {
        self.parse_entries()?;
        loop {
            let token = self.peek();
            match token.kind {
                EOF => return Ok(()),
                HEADER_START => with_node!(self.builder, TABLE, self.parse_table(false))?,
                ARRAY_HEADER_START => {
                    with_node!(self.builder, TABLE_ARRAY, self.parse_table(true))?
                }
                _ => return Err(unexpected(token, "a table header")),
            }
        }
    }

    /// Key/value lines up to the next table header.
    fn parse_entries(&mut self) -> ParserResult<()> {
        loop {
            match self.peek().kind {
                NEWLINE => self.bump(),
                EOF | HEADER_START | ARRAY_HEADER_START => return Ok(()),
                _ => {
                    with_node!(self.builder, ENTRY, self.parse_entry())?;
                    self.expect_line_end()?;
                }
            }
        }
    }

    fn parse_table(&mut self, is_array: bool) -> ParserResult<()> {
        self.bump();
        with_node!(self.builder, KEY, self.parse_key())?;
        if is_array {
            self.expect(ARRAY_HEADER_END, "`]]`")?;
        } else {
            self.expect(HEADER_END, "`]`")?;
        }
        self.expect_line_end()?;
        self.parse_entries()
    }

    fn parse_entry(&mut self) -> ParserResult<()> {
        with_node!(self.builder, KEY, self.parse_key())?;
        self.expect(EQ, "`=`")?;
        self.parse_item()
    }

    fn parse_key(&mut self) -> ParserResult<()> {
        loop {
            let token = self.peek();
            match token.kind {
                IDENT | LITERAL_STRING => self.bump(),
                BASIC_STRING => {
                    check_string(token)?;
                    self.bump();
                }
                MULTI_LINE_BASIC_STRING | MULTI_LINE_LITERAL_STRING => {
                    return Err(Error::parse(
                        "multi-line strings are not allowed as keys",
                        token.position,
                    ))
                }
                _ => return Err(unexpected(token, "a key")),
            }

            // whitespace after the last segment belongs to the parent node
            let mut next = self.index;
            while self.tokens[next].kind == WHITESPACE {
                next += 1;
            }
            if self.tokens[next].kind != PERIOD {
                return Ok(());
            }
            self.expect(PERIOD, "`.`")?;
        }
    }

    fn parse_item(&mut self) -> ParserResult<()> {
        let token = self.peek();
        match token.kind {
            BRACKET_START => with_node!(self.builder, ARRAY, self.parse_array()),
            BRACE_START => with_node!(self.builder, INLINE_TABLE, self.parse_inline_table()),
            kind if kind.is_scalar() => {
                if matches!(kind, BASIC_STRING | MULTI_LINE_BASIC_STRING) {
                    check_string(token)?;
                }
                with_node!(self.builder, VALUE, self.bump());
                Ok(())
            }
            IDENT => Err(Error::parse(
                format!("invalid value `{}`", token.text),
                token.position,
            )),
            _ => Err(unexpected(token, "a value")),
        }
    }

    fn parse_array(&mut self) -> ParserResult<()> {
        self.bump();
        loop {
            if self.peek_multiline().kind == BRACKET_END {
                self.bump();
                return Ok(());
            }
            self.parse_item()?;
            let token = self.peek_multiline();
            match token.kind {
                COMMA => self.bump(),
                BRACKET_END => {
                    self.bump();
                    return Ok(());
                }
                _ => return Err(unexpected(token, "`,` or `]`")),
            }
        }
    }

    fn parse_inline_table(&mut self) -> ParserResult<()> {
        self.bump();
        if self.peek().kind == BRACE_END {
            self.bump();
            return Ok(());
        }
        loop {
            self.no_newline()?;
            with_node!(self.builder, ENTRY, self.parse_entry())?;
            self.no_newline()?;
            let token = self.peek();
            match token.kind {
                COMMA => {
                    self.bump();
                    let next = self.peek();
                    if next.kind == BRACE_END {
                        return Err(Error::parse(
                            "trailing commas are not allowed in inline tables",
                            token.position,
                        ));
                    }
                }
                BRACE_END => {
                    self.bump();
                    return Ok(());
                }
                _ => return Err(unexpected(token, "`,` or `}`")),
            }
        }
    }

    fn no_newline(&mut self) -> ParserResult<()> {
        let token = self.peek();
        if token.kind == NEWLINE {
            return Err(Error::parse(
                "newlines are not allowed in inline tables",
                token.position,
            ));
        }
        Ok(())
    }

    fn expect_line_end(&mut self) -> ParserResult<()> {
        let token = self.peek();
        match token.kind {
            NEWLINE => {
                self.bump();
                Ok(())
            }
            EOF => Ok(()),
            _ => Err(unexpected(token, "a newline")),
        }
    }

    fn expect(&mut self, kind: SyntaxKind, expected: &str) -> ParserResult<()> {
        let token = self.peek();
        if token.kind == kind {
            self.bump();
            Ok(())
        } else {
            Err(unexpected(token, expected))
        }
    }

    fn current(&self) -> Token<'s> {
        self.tokens[self.index]
    }

    /// The next significant token; whitespace and comments are emitted
    /// into the current node.
    fn peek(&mut self) -> Token<'s> {
        while self.current().kind.is_trivia() {
            self.bump();
        }
        self.current()
    }

    /// Like [`Parser::peek`], also skipping newlines.
    fn peek_multiline(&mut self) -> Token<'s> {
        while self.current().kind.is_trivia() || self.current().kind == NEWLINE {
            self.bump();
        }
        self.current()
    }

    fn bump(&mut self) {
        let token = self.current();
        if token.kind != EOF {
            self.builder.token(token.kind.into(), token.text);
            self.index += 1;
        }
    }
}

fn unexpected(token: Token<'_>, expected: &str) -> Error {
    Error::parse(format!("expected {}, found {}", expected, token), token.position)
}

fn check_string(token: Token<'_>) -> ParserResult<()> {
    match check_escape(token.text) {
        Ok(()) => Ok(()),
        Err(indices) => {
            let index = indices.first().copied().unwrap_or_default();
            Err(Error::parse(
                "invalid escape sequence",
                token.position.advanced_by(&token.text[..index]),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AstNode;
    use crate::syntax::stringify_syntax;
    use crate::util::mapper::Position;

    fn parse_error(source: &str) -> Error {
        match parse(source) {
            Err(err) => err,
            Ok(tree) => panic!("expected an error, got {}", stringify_syntax(0, tree.syntax().into()).unwrap()),
        }
    }

    #[test]
    fn test_tree_shape() {
        let tree = parse("a = 1\n[t]\nb.c = [1, { d = 2 }]\n").unwrap();
        let dump = stringify_syntax(0, tree.syntax().into()).unwrap();
        let kinds: Vec<&str> = dump
            .lines()
            .map(|l| l.trim_start().split('@').next().unwrap())
            .filter(|k| k.chars().all(|c| c.is_ascii_uppercase() || c == '_'))
            .collect();
        assert_eq!(kinds[0], "DOCUMENT");
        assert!(kinds.contains(&"TABLE"));
        assert!(kinds.contains(&"INLINE_TABLE"));
        assert_eq!(kinds.iter().filter(|k| **k == "ENTRY").count(), 3);
        assert_eq!(kinds.iter().filter(|k| **k == "VALUE").count(), 3);
    }

    #[test]
    fn test_lossless() {
        for source in [
            "",
            "\n\n",
            "# only a comment",
            "a = 1",
            "  a . b = 'x' # c\r\n[ t . 'u' ]  # h\n\n[[ arr ]]\nv = [\n  1, # one\n  2,\n]\n",
            "s = \"\"\"\nmulti\\\n  line\"\"\"\nt = { a = 1, b = { c = [] } }\n",
        ] {
            assert_eq!(parse(source).unwrap().to_text(), source);
        }
    }

    #[test]
    fn test_grammar_errors() {
        assert!(parse_error("a").message().contains("expected `=`"));
        assert!(parse_error("a =").message().contains("end of input"));
        assert!(parse_error("a = 1 b = 2").message().contains("expected a newline"));
        assert!(parse_error("[a]b = 1").message().contains("expected a newline"));
        assert!(parse_error("[a\n").message().contains("expected `]`"));
        assert!(parse_error("[[a]\n").message().contains("expected `]]`"));
        assert!(parse_error("a = [1 2]").message().contains("`,` or `]`"));
        assert!(parse_error("a = [,]").message().contains("expected a value"));
        assert!(parse_error("= 1").message().contains("expected a key"));
        assert!(parse_error("a. = 1").message().contains("expected a key"));
        assert!(parse_error("a = 007").message().contains("invalid value"));
    }

    #[test]
    fn test_inline_table_errors() {
        assert!(parse_error("t = { a = 1, }")
            .message()
            .contains("trailing commas"));
        assert!(parse_error("t = { a = 1,\n b = 2 }")
            .message()
            .contains("newlines"));
        assert!(parse_error("t = {\n}").message().contains("newlines"));
    }

    #[test]
    fn test_multi_line_key() {
        let err = parse_error("\"\"\"a\"\"\" = 1");
        assert!(err.message().contains("multi-line strings"));
        assert_eq!(err.position(), Position::new(1, 1, 0));
    }

    #[test]
    fn test_escape_error_position() {
        let err = parse_error("a = 1\nb = \"x\\qy\"\n");
        assert_eq!(err.message(), "invalid escape sequence");
        assert_eq!(err.position(), Position::new(2, 7, 12));
        assert!(parse_error("a = \"\\uD800\"").message().contains("escape"));
        assert!(parse("a = \"\\U0001F600 \\u00e9\"").is_ok());
    }

    #[test]
    fn test_array_trivia() {
        let tree = parse("a = [ # start\n  1,\n\n  # between\n  2 # last\n]\n").unwrap();
        assert_eq!(tree.document().syntax().kind(), DOCUMENT);
    }
}
