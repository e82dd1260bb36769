//! Declaration of the syntax kinds shared by the lexer, parser and syntax tree.

#![allow(non_camel_case_types)]

/// Enum containing all the tokens and nodes in a syntax tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    WHITESPACE = 0,
    NEWLINE,
    COMMENT,

    /// A bare key, or a value-position word that is not a valid value.
    IDENT,

    PERIOD,
    COMMA,
    EQ,

    BASIC_STRING,
    MULTI_LINE_BASIC_STRING,
    LITERAL_STRING,
    MULTI_LINE_LITERAL_STRING,

    INTEGER,
    INTEGER_HEX,
    INTEGER_OCT,
    INTEGER_BIN,
    FLOAT,
    BOOL,

    OFFSET_DATE_TIME,
    LOCAL_DATE_TIME,
    LOCAL_DATE,
    LOCAL_TIME,

    /// `[` of an array value.
    BRACKET_START,
    BRACKET_END,
    /// `[` of a `[table]` header.
    HEADER_START,
    HEADER_END,
    /// `[[` of an `[[array.of.tables]]` header.
    ARRAY_HEADER_START,
    ARRAY_HEADER_END,
    BRACE_START,
    BRACE_END,

    EOF,

    // composite types
    KEY,
    VALUE,
    ARRAY,
    INLINE_TABLE,
    ENTRY,
    TABLE,
    TABLE_ARRAY,
    DOCUMENT,
}

impl SyntaxKind {
    /// Tokens the grammar skips between other tokens.
    pub fn is_trivia(self) -> bool {
        matches!(self, SyntaxKind::WHITESPACE | SyntaxKind::COMMENT)
    }

    pub fn is_key_segment(self) -> bool {
        matches!(
            self,
            SyntaxKind::IDENT | SyntaxKind::BASIC_STRING | SyntaxKind::LITERAL_STRING
        )
    }

    pub fn is_string(self) -> bool {
        matches!(
            self,
            SyntaxKind::BASIC_STRING
                | SyntaxKind::MULTI_LINE_BASIC_STRING
                | SyntaxKind::LITERAL_STRING
                | SyntaxKind::MULTI_LINE_LITERAL_STRING
        )
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            SyntaxKind::INTEGER
                | SyntaxKind::INTEGER_HEX
                | SyntaxKind::INTEGER_OCT
                | SyntaxKind::INTEGER_BIN
        )
    }

    pub fn is_datetime(self) -> bool {
        matches!(
            self,
            SyntaxKind::OFFSET_DATE_TIME
                | SyntaxKind::LOCAL_DATE_TIME
                | SyntaxKind::LOCAL_DATE
                | SyntaxKind::LOCAL_TIME
        )
    }

    /// Tokens that form a complete value on their own.
    pub fn is_scalar(self) -> bool {
        self.is_string()
            || self.is_integer()
            || self.is_datetime()
            || matches!(self, SyntaxKind::FLOAT | SyntaxKind::BOOL)
    }

    pub fn is_open(self) -> bool {
        matches!(
            self,
            SyntaxKind::BRACKET_START
                | SyntaxKind::HEADER_START
                | SyntaxKind::ARRAY_HEADER_START
                | SyntaxKind::BRACE_START
        )
    }

    pub fn is_close(self) -> bool {
        matches!(
            self,
            SyntaxKind::BRACKET_END
                | SyntaxKind::HEADER_END
                | SyntaxKind::ARRAY_HEADER_END
                | SyntaxKind::BRACE_END
        )
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lang {}
impl rowan::Language for Lang {
    type Kind = SyntaxKind;
    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 <= SyntaxKind::DOCUMENT as u16);
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }
    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

pub type SyntaxNode = rowan::SyntaxNode<Lang>;
pub type SyntaxToken = rowan::SyntaxToken<Lang>;
pub type SyntaxElement = rowan::NodeOrToken<SyntaxNode, SyntaxToken>;

pub fn stringify_syntax(
    indent: usize,
    element: SyntaxElement,
) -> Result<String, Box<dyn std::error::Error>> {
    let mut buf: Vec<u8> = vec![];
    write_syntax(&mut buf, indent, element)?;
    Ok(std::str::from_utf8(&buf)?.to_string())
}

pub fn write_syntax<T: std::io::Write>(
    w: &mut T,
    indent: usize,
    element: SyntaxElement,
) -> Result<(), Box<dyn std::error::Error>> {
    let kind: SyntaxKind = element.kind();
    write!(w, "{:indent$}", "", indent = indent)?;
    match element {
        rowan::NodeOrToken::Node(node) => {
            writeln!(w, "{:?}@{:?}", kind, node.text_range())?;
            for child in node.children_with_tokens() {
                write_syntax(w, indent + 2, child)?;
            }
        }

        rowan::NodeOrToken::Token(token) => {
            writeln!(w, "{:?}@{:?} {:?}", kind, token.text_range(), token.text())?;
        }
    }
    Ok(())
}
