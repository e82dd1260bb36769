//! Typed views over the syntax tree.
//!
//! The wrappers hold a [`SyntaxNode`] and never own data; they are cheap
//! to clone and always reflect the tree exactly.

use crate::syntax::{SyntaxKind, SyntaxKind::*, SyntaxNode, SyntaxToken};
use crate::util::quote::{unquote, QuoteType};

pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(syntax: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;
}

macro_rules! ast_node {
    (
    $(#[$attrs:meta])*
    $vis:vis struct $name:ident($($kind:ident)|+);
    ) => {
        $(#[$attrs])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        $vis struct $name {
            syntax: SyntaxNode,
        }

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                matches!(kind, $($kind)|+)
            }

            fn cast(syntax: SyntaxNode) -> Option<Self> {
                if Self::can_cast(syntax.kind()) {
                    Some(Self { syntax })
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.syntax
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.syntax.text())
            }
        }
    };
}

ast_node! {
    /// The root of a parsed document.
    pub struct Document(DOCUMENT);
}

ast_node! {
    /// A `[table]` or `[[array.of.tables]]` section with its entries.
    pub struct Table(TABLE | TABLE_ARRAY);
}

ast_node! {
    /// A dotted key of an entry or a table header.
    pub struct Key(KEY);
}

ast_node! {
    pub struct KeyValue(ENTRY);
}

ast_node! {
    /// A single scalar value token.
    pub struct Value(VALUE);
}

ast_node! {
    pub struct Array(ARRAY);
}

ast_node! {
    pub struct InlineTable(INLINE_TABLE);
}

/// Any composite node of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    Document(Document),
    Table(Table),
    ArrayOfTables(Table),
    Key(Key),
    KeyValue(KeyValue),
    Value(Value),
    Array(Array),
    InlineTable(InlineTable),
}

impl Node {
    pub fn cast(syntax: SyntaxNode) -> Option<Self> {
        let node = match syntax.kind() {
            DOCUMENT => Node::Document(Document { syntax }),
            TABLE => Node::Table(Table { syntax }),
            TABLE_ARRAY => Node::ArrayOfTables(Table { syntax }),
            KEY => Node::Key(Key { syntax }),
            ENTRY => Node::KeyValue(KeyValue { syntax }),
            VALUE => Node::Value(Value { syntax }),
            ARRAY => Node::Array(Array { syntax }),
            INLINE_TABLE => Node::InlineTable(InlineTable { syntax }),
            _ => return None,
        };
        Some(node)
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Node::Document(v) => v.syntax(),
            Node::Table(v) | Node::ArrayOfTables(v) => v.syntax(),
            Node::Key(v) => v.syntax(),
            Node::KeyValue(v) => v.syntax(),
            Node::Value(v) => v.syntax(),
            Node::Array(v) => v.syntax(),
            Node::InlineTable(v) => v.syntax(),
        }
    }
}

/// The right-hand side of an entry, or an array element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Item {
    Value(Value),
    Array(Array),
    InlineTable(InlineTable),
}

impl Item {
    pub fn cast(syntax: SyntaxNode) -> Option<Self> {
        match syntax.kind() {
            VALUE => Some(Item::Value(Value { syntax })),
            ARRAY => Some(Item::Array(Array { syntax })),
            INLINE_TABLE => Some(Item::InlineTable(InlineTable { syntax })),
            _ => None,
        }
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Item::Value(v) => v.syntax(),
            Item::Array(v) => v.syntax(),
            Item::InlineTable(v) => v.syntax(),
        }
    }
}

impl Document {
    pub(crate) fn from_root(syntax: SyntaxNode) -> Self {
        Self { syntax }
    }

    /// Top-level entries and table sections, in source order.
    pub fn children(&self) -> impl Iterator<Item = Node> {
        self.syntax.children().filter_map(Node::cast)
    }
}

impl Table {
    pub fn is_array_of_tables(&self) -> bool {
        self.syntax.kind() == TABLE_ARRAY
    }

    pub fn key(&self) -> Option<Key> {
        self.syntax.children().find_map(Key::cast)
    }

    pub fn entries(&self) -> impl Iterator<Item = KeyValue> {
        self.syntax.children().filter_map(KeyValue::cast)
    }
}

/// One segment of a dotted key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeySegment {
    token: SyntaxToken,
}

impl KeySegment {
    pub fn token(&self) -> &SyntaxToken {
        &self.token
    }

    pub fn is_quoted(&self) -> bool {
        self.token.kind() != IDENT
    }

    /// The decoded key; on failure the byte index of the bad escape.
    pub fn value(&self) -> Result<String, usize> {
        unquote(self.token.text(), QuoteType::from_kind(self.token.kind()))
    }
}

impl Key {
    /// Segments in order. A parsed key has at least one.
    pub fn segments(&self) -> impl Iterator<Item = KeySegment> {
        self.syntax
            .children_with_tokens()
            .filter_map(|element| element.into_token())
            .filter(|token| token.kind().is_key_segment())
            .map(|token| KeySegment { token })
    }
}

impl KeyValue {
    pub fn key(&self) -> Option<Key> {
        self.syntax.children().find_map(Key::cast)
    }

    pub fn item(&self) -> Option<Item> {
        self.syntax.children().find_map(Item::cast)
    }
}

impl Value {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|element| element.into_token())
            .find(|token| token.kind().is_scalar())
    }

    pub fn kind(&self) -> Option<SyntaxKind> {
        self.token().map(|token| token.kind())
    }

    pub fn text(&self) -> String {
        self.token()
            .map(|token| token.text().to_string())
            .unwrap_or_default()
    }
}

impl Array {
    pub fn items(&self) -> impl Iterator<Item = Item> {
        self.syntax.children().filter_map(Item::cast)
    }
}

impl InlineTable {
    pub fn entries(&self) -> impl Iterator<Item = KeyValue> {
        self.syntax.children().filter_map(KeyValue::cast)
    }
}
