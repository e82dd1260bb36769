//! Building the data model from a syntax tree.
//!
//! Tables are tracked by path so that TOML's definition rules can be
//! checked: a table is defined once by a header, tables created by
//! dotted keys cannot be reopened by a header, and inline tables are
//! closed once written.

use std::collections::HashSet;

use tracing::debug;

use super::datetime::Datetime;
use super::number::{parse_float, parse_integer};
use super::{Table, Value};
use crate::ast::{self, AstNode, Item, Node};
use crate::error::Error;
use crate::parser::SyntaxTree;
use crate::syntax::{SyntaxKind::*, SyntaxNode};
use crate::util::mapper::{Mapper, Position};
use crate::util::quote::{quote_key, unquote, QuoteType};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PathSegment {
    Key(String),
    /// An element of an array of tables.
    Index(usize),
}

type TablePath = Vec<PathSegment>;

#[derive(Debug, Default)]
struct BuildState {
    /// Defined by a `[header]`.
    explicit: HashSet<TablePath>,
    /// Created by a dotted key.
    implicit: HashSet<TablePath>,
    arrays_of_tables: HashSet<TablePath>,
}

#[derive(Debug)]
struct KeyPart {
    name: String,
    position: Position,
}

/// Build the model of a parsed document.
#[tracing::instrument(skip_all)]
pub fn build(tree: &SyntaxTree) -> Result<Table, Error> {
    let text = tree.to_text();
    let mut builder = Builder {
        mapper: Mapper::new(&text),
        state: BuildState::default(),
        root: Table::new(),
        section: vec![],
    };
    for node in tree.document().children() {
        match node {
            Node::KeyValue(entry) => builder.insert_entry(&entry)?,
            Node::Table(table) => {
                builder.define_table(&table)?;
                builder.insert_entries(&table)?;
            }
            Node::ArrayOfTables(table) => {
                builder.append_table(&table)?;
                builder.insert_entries(&table)?;
            }
            _ => {}
        }
    }
    Ok(builder.root)
}

struct Builder<'s> {
    mapper: Mapper<'s>,
    state: BuildState,
    root: Table,
    /// The table that entries are currently added to.
    section: TablePath,
}

impl<'s> Builder<'s> {
    fn insert_entries(&mut self, table: &ast::Table) -> Result<(), Error> {
        for entry in table.entries() {
            self.insert_entry(&entry)?;
        }
        Ok(())
    }

    fn insert_entry(&mut self, entry: &ast::KeyValue) -> Result<(), Error> {
        let keys = self.key_parts(entry.key(), entry.syntax())?;
        let value = self.entry_value(entry)?;
        insert_dotted(
            &mut self.root,
            &mut self.state,
            self.section.clone(),
            &keys,
            value,
        )
    }

    /// `[a.b.c]`
    fn define_table(&mut self, table: &ast::Table) -> Result<(), Error> {
        let keys = self.key_parts(table.key(), table.syntax())?;
        let (last, mut path) = self.open_header(&keys)?;
        let state = &mut self.state;
        let parent = table_at_mut(&mut self.root, &path, last.position)?;
        path.push(PathSegment::Key(last.name.clone()));
        match parent.entries.get(&last.name) {
            None => {
                parent
                    .entries
                    .insert(last.name.clone(), Value::Table(Table::new()));
            }
            Some(Value::Table(t)) if t.is_inline() => {
                return Err(Error::semantic(
                    format!("inline table `{}` cannot be extended", dotted(&keys)),
                    last.position,
                ))
            }
            Some(Value::Table(_)) if state.explicit.contains(&path) => {
                return Err(Error::semantic(
                    format!("table `{}` is defined more than once", dotted(&keys)),
                    last.position,
                ))
            }
            Some(Value::Table(_)) if state.implicit.contains(&path) => {
                return Err(Error::semantic(
                    format!(
                        "table `{}` was already defined by dotted keys",
                        dotted(&keys)
                    ),
                    last.position,
                ))
            }
            Some(Value::Table(_)) => {}
            Some(Value::Array(_)) if state.arrays_of_tables.contains(&path) => {
                return Err(Error::semantic(
                    format!(
                        "table `{}` is already defined as an array of tables",
                        dotted(&keys)
                    ),
                    last.position,
                ))
            }
            Some(other) => {
                return Err(Error::semantic(
                    format!(
                        "key `{}` is already defined as {}",
                        dotted(&keys),
                        article(other.type_name())
                    ),
                    last.position,
                ))
            }
        }
        debug!(table = %dotted(&keys), "defined table");
        state.explicit.insert(path.clone());
        self.section = path;
        Ok(())
    }

    /// `[[a.b.c]]`
    fn append_table(&mut self, table: &ast::Table) -> Result<(), Error> {
        let keys = self.key_parts(table.key(), table.syntax())?;
        let (last, mut path) = self.open_header(&keys)?;
        let state = &mut self.state;
        let parent = table_at_mut(&mut self.root, &path, last.position)?;
        path.push(PathSegment::Key(last.name.clone()));
        let index = match parent.entries.get_mut(&last.name) {
            None => {
                parent
                    .entries
                    .insert(last.name.clone(), Value::Array(vec![Value::Table(Table::new())]));
                state.arrays_of_tables.insert(path.clone());
                0
            }
            Some(Value::Array(items)) if state.arrays_of_tables.contains(&path) => {
                items.push(Value::Table(Table::new()));
                items.len() - 1
            }
            Some(Value::Array(_)) => {
                return Err(Error::semantic(
                    format!("cannot append to static array `{}`", dotted(&keys)),
                    last.position,
                ))
            }
            Some(other) => {
                return Err(Error::semantic(
                    format!(
                        "key `{}` is already defined as {}",
                        dotted(&keys),
                        article(other.type_name())
                    ),
                    last.position,
                ))
            }
        };
        debug!(table = %dotted(&keys), index, "appended array of tables element");
        path.push(PathSegment::Index(index));
        self.section = path;
        Ok(())
    }

    /// Walk every header segment but the last from the root, creating
    /// missing tables. Arrays of tables resolve to their last element.
    fn open_header<'k>(&mut self, keys: &'k [KeyPart]) -> Result<(&'k KeyPart, TablePath), Error> {
        let (last, parents) = keys
            .split_last()
            .ok_or_else(|| Error::semantic("empty key", Position::START))?;
        let mut path = vec![];
        for (i, part) in parents.iter().enumerate() {
            let table = table_at_mut(&mut self.root, &path, part.position)?;
            path.push(PathSegment::Key(part.name.clone()));
            let value = table
                .entries
                .entry(part.name.clone())
                .or_insert_with(|| Value::Table(Table::new()));
            match value {
                Value::Table(t) if t.is_inline() => {
                    return Err(Error::semantic(
                        format!("inline table `{}` cannot be extended", dotted(&keys[..=i])),
                        part.position,
                    ))
                }
                Value::Table(_) => {}
                Value::Array(items) if self.state.arrays_of_tables.contains(&path) => {
                    path.push(PathSegment::Index(items.len().saturating_sub(1)));
                }
                other => {
                    return Err(Error::semantic(
                        format!(
                            "key `{}` is already defined as {}",
                            dotted(&keys[..=i]),
                            article(other.type_name())
                        ),
                        part.position,
                    ))
                }
            }
        }
        Ok((last, path))
    }

    fn key_parts(
        &self,
        key: Option<ast::Key>,
        owner: &SyntaxNode,
    ) -> Result<Vec<KeyPart>, Error> {
        let position = self.mapper.position_at(owner.text_range().start());
        let key = key.ok_or_else(|| Error::semantic("missing key", position))?;
        let parts = key
            .segments()
            .map(|segment| {
                let token = segment.token();
                let position = self.mapper.position_at(token.text_range().start());
                segment
                    .value()
                    .map(|name| KeyPart { name, position })
                    .map_err(|index| {
                        Error::semantic(
                            "invalid escape sequence",
                            position.advanced_by(token.text().get(..index).unwrap_or_default()),
                        )
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if parts.is_empty() {
            return Err(Error::semantic("missing key", position));
        }
        Ok(parts)
    }

    fn entry_value(&self, entry: &ast::KeyValue) -> Result<Value, Error> {
        match entry.item() {
            Some(item) => self.item_value(item),
            None => Err(Error::semantic(
                "missing value",
                self.mapper.position_at(entry.syntax().text_range().end()),
            )),
        }
    }

    fn item_value(&self, item: Item) -> Result<Value, Error> {
        match item {
            Item::Value(value) => self.scalar_value(&value),
            Item::Array(array) => array
                .items()
                .map(|item| self.item_value(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Item::InlineTable(inline) => {
                // each inline table is a closed world with its own rules
                let mut table = Table::new();
                let mut state = BuildState::default();
                for entry in inline.entries() {
                    let keys = self.key_parts(entry.key(), entry.syntax())?;
                    let value = self.entry_value(&entry)?;
                    insert_dotted(&mut table, &mut state, vec![], &keys, value)?;
                }
                table.freeze();
                Ok(Value::Table(table))
            }
        }
    }

    fn scalar_value(&self, value: &ast::Value) -> Result<Value, Error> {
        let start = self.mapper.position_at(value.syntax().text_range().start());
        let token = value
            .token()
            .ok_or_else(|| Error::semantic("missing value", start))?;
        let position = self.mapper.position_at(token.text_range().start());
        let text = token.text();
        match token.kind() {
            kind if kind.is_string() => unquote(text, QuoteType::from_kind(kind))
                .map(Value::String)
                .map_err(|index| {
                    Error::semantic(
                        "invalid escape sequence",
                        position.advanced_by(text.get(..index).unwrap_or_default()),
                    )
                }),
            kind if kind.is_integer() => parse_integer(text, kind)
                .map(Value::Integer)
                .map_err(|message| Error::semantic(message, position)),
            FLOAT => parse_float(text)
                .map(Value::Float)
                .map_err(|message| Error::semantic(message, position)),
            BOOL => Ok(Value::Boolean(text == "true")),
            kind if kind.is_datetime() => text
                .parse::<Datetime>()
                .map(Value::Datetime)
                .map_err(|err| Error::semantic(err.to_string(), position)),
            _ => Err(Error::semantic(
                format!("unexpected value `{}`", text),
                position,
            )),
        }
    }
}

/// Insert `value` under a dotted key, relative to the table at `path`.
fn insert_dotted(
    root: &mut Table,
    state: &mut BuildState,
    mut path: TablePath,
    keys: &[KeyPart],
    value: Value,
) -> Result<(), Error> {
    let (last, parents) = keys
        .split_last()
        .ok_or_else(|| Error::semantic("empty key", Position::START))?;
    for (i, part) in parents.iter().enumerate() {
        let table = table_at_mut(root, &path, part.position)?;
        path.push(PathSegment::Key(part.name.clone()));
        match table.entries.get(&part.name) {
            None => {
                table
                    .entries
                    .insert(part.name.clone(), Value::Table(Table::new()));
                debug!(key = %dotted(&keys[..=i]), "created table from dotted key");
                state.implicit.insert(path.clone());
            }
            Some(Value::Table(t)) if t.is_inline() => {
                return Err(Error::semantic(
                    format!("inline table `{}` cannot be extended", dotted(&keys[..=i])),
                    part.position,
                ))
            }
            Some(Value::Table(_)) if state.explicit.contains(&path) => {
                return Err(Error::semantic(
                    format!(
                        "table `{}` is already defined and cannot be extended by dotted keys",
                        dotted(&keys[..=i])
                    ),
                    part.position,
                ))
            }
            Some(Value::Table(_)) => {}
            Some(Value::Array(_)) if state.arrays_of_tables.contains(&path) => {
                return Err(Error::semantic(
                    format!(
                        "array of tables `{}` cannot be extended by dotted keys",
                        dotted(&keys[..=i])
                    ),
                    part.position,
                ))
            }
            Some(other) => {
                return Err(Error::semantic(
                    format!(
                        "key `{}` is already defined as {}",
                        dotted(&keys[..=i]),
                        article(other.type_name())
                    ),
                    part.position,
                ))
            }
        }
    }
    let table = table_at_mut(root, &path, last.position)?;
    if table.entries.contains_key(&last.name) {
        return Err(Error::semantic(
            format!("duplicate key `{}`", dotted(keys)),
            last.position,
        ));
    }
    table.entries.insert(last.name.clone(), value);
    Ok(())
}

fn table_at_mut<'t>(
    root: &'t mut Table,
    path: &[PathSegment],
    position: Position,
) -> Result<&'t mut Table, Error> {
    let lost = || Error::semantic("table path no longer exists", position);
    let mut table = root;
    let mut segments = path.iter().peekable();
    while let Some(segment) = segments.next() {
        let value = match segment {
            PathSegment::Key(key) => table.entries.get_mut(key),
            PathSegment::Index(_) => return Err(lost()),
        };
        let value = match (value, segments.peek()) {
            (Some(Value::Array(items)), Some(PathSegment::Index(index))) => {
                let index = *index;
                segments.next();
                items.get_mut(index)
            }
            (value, _) => value,
        };
        table = match value {
            Some(Value::Table(t)) => t,
            _ => return Err(lost()),
        };
    }
    Ok(table)
}

fn dotted(keys: &[KeyPart]) -> String {
    keys.iter()
        .map(|k| quote_key(&k.name).into_owned())
        .collect::<Vec<_>>()
        .join(".")
}

fn article(type_name: &str) -> String {
    match type_name.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => format!("an {}", type_name),
        _ => format!("a {}", type_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn load(source: &str) -> Result<Table, Error> {
        build(&parse(source)?)
    }

    fn semantic_error(source: &str) -> Error {
        match load(source) {
            Err(err @ Error::Semantic { .. }) => err,
            other => panic!("expected a semantic error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_key() {
        let err = semantic_error("a = 1\na = 2");
        assert_eq!(err.message(), "duplicate key `a`");
        assert_eq!(err.position(), Position::new(2, 1, 6));
        assert!(semantic_error("a.b = 1\na.b = 2").message().contains("`a.b`"));
        assert!(semantic_error("\"a\" = 1\na = 2").message().contains("duplicate"));
    }

    #[test]
    fn test_table_redefinition() {
        let err = semantic_error("[a]\nb = 1\n[a]");
        assert_eq!(err.message(), "table `a` is defined more than once");
        assert_eq!(err.position(), Position::new(3, 2, 11));
        assert_eq!(
            semantic_error("a.b = 1\n[a]").message(),
            "table `a` was already defined by dotted keys"
        );
        assert_eq!(
            semantic_error("[a]\nb.c = 1\n[a.b]").message(),
            "table `a.b` was already defined by dotted keys"
        );
        assert_eq!(
            semantic_error("a = 1\n[a]").message(),
            "key `a` is already defined as an integer"
        );
    }

    #[test]
    fn test_implicit_tables() {
        let table = load("[a.b]\nx = 1\n[a]\ny = 2\n").unwrap();
        assert_eq!(table.get_path(&["a", "b", "x"]), Some(&Value::Integer(1)));
        assert_eq!(table.get_path(&["a", "y"]), Some(&Value::Integer(2)));

        let table = load(
            "[fruit]\napple.color = 'red'\napple.taste.sweet = true\n\
             [fruit.apple.texture]\nsmooth = true\n",
        )
        .unwrap();
        assert_eq!(
            table.get_path(&["fruit", "apple", "texture", "smooth"]),
            Some(&Value::Boolean(true))
        );
        assert_eq!(
            table.get_path(&["fruit", "apple", "taste", "sweet"]),
            Some(&Value::Boolean(true))
        );
    }

    #[test]
    fn test_dotted_keys_into_defined_tables() {
        assert_eq!(
            semantic_error("[a.b.c]\nz = 9\n[a]\nb.c.t = 1").message(),
            "table `b.c` is already defined and cannot be extended by dotted keys"
        );
        assert_eq!(
            semantic_error("[[a.b]]\n[a]\nb.c = 1").message(),
            "array of tables `b` cannot be extended by dotted keys"
        );
        assert_eq!(
            semantic_error("a = 'x'\na.b = 1").message(),
            "key `a` is already defined as a string"
        );
    }

    #[test]
    fn test_arrays_of_tables() {
        let table = load("[[p]]\nn = 1\n[[p]]\nn = 2\n[p.q]\nm = 3\n[[p.r]]\n").unwrap();
        let items = table.get("p").and_then(Value::as_array).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_table().unwrap().get("n"), Some(&Value::Integer(1)));
        let second = items[1].as_table().unwrap();
        assert_eq!(second.get_path(&["q", "m"]), Some(&Value::Integer(3)));
        assert_eq!(second.get("r").and_then(Value::as_array).map(Vec::len), Some(1));
        assert!(items[0].as_table().unwrap().get("q").is_none());
    }

    #[test]
    fn test_arrays_of_tables_errors() {
        assert_eq!(
            semantic_error("a = [1]\n[[a]]").message(),
            "cannot append to static array `a`"
        );
        assert_eq!(
            semantic_error("[[a]]\n[a]").message(),
            "table `a` is already defined as an array of tables"
        );
        assert_eq!(
            semantic_error("[a]\n[[a]]").message(),
            "key `a` is already defined as a table"
        );
        assert_eq!(
            semantic_error("a = [{}]\n[a.b]").message(),
            "key `a` is already defined as an array"
        );
    }

    #[test]
    fn test_inline_tables_are_closed() {
        assert_eq!(
            semantic_error("t = { x = 1 }\nt.y = 2").message(),
            "inline table `t` cannot be extended"
        );
        assert_eq!(
            semantic_error("t = { x = 1 }\n[t]").message(),
            "inline table `t` cannot be extended"
        );
        assert_eq!(
            semantic_error("t = { x = 1 }\n[t.sub]").message(),
            "inline table `t` cannot be extended"
        );
        assert_eq!(
            semantic_error("t = { a.b = 1, a = 2 }").message(),
            "duplicate key `a`"
        );

        let table = load("t = { a.b = 1, a.c = { d = [] } }").unwrap();
        let t = table.get("t").and_then(Value::as_table).unwrap();
        assert!(t.is_inline());
        assert!(t.get("a").and_then(Value::as_table).unwrap().is_inline());
        assert_eq!(t.get_path(&["a", "b"]), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_scalars() {
        let table = load(
            "\"a\\tb\" = 'lit\\n'\nhex = 0xff\nbig = -9223372036854775808\n\
             f = 6.5e-1\nd = 2024-02-29\nnested = [[1, 2], ['x']]\n",
        )
        .unwrap();
        assert_eq!(table.get("a\tb"), Some(&Value::from("lit\\n")));
        assert_eq!(table.get("hex"), Some(&Value::Integer(255)));
        assert_eq!(table.get("big"), Some(&Value::Integer(i64::MIN)));
        assert_eq!(table.get("f"), Some(&Value::Float(0.65)));
        assert_eq!(
            table.get("d").and_then(Value::as_datetime).map(Datetime::kind),
            Some(crate::value::DatetimeKind::LocalDate)
        );
        let nested = table.get("nested").and_then(Value::as_array).unwrap();
        assert_eq!(nested[1], Value::Array(vec![Value::from("x")]));
    }

    #[test]
    fn test_integer_overflow() {
        let err = semantic_error("a = 1\nb = 9223372036854775808");
        assert!(err.message().contains("does not fit in 64 bits"));
        assert_eq!(err.position(), Position::new(2, 5, 10));
    }

    #[test]
    fn test_float_overflow() {
        let err = semantic_error("a = 1\nb = 1e400");
        assert_eq!(err.message(), "float `1e400` does not fit in 64 bits");
        assert_eq!(err.position(), Position::new(2, 5, 10));
        assert!(load("a = inf\nb = -inf").is_ok());
    }
}
