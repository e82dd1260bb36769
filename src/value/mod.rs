//! The TOML data model.

pub(crate) mod datetime;
pub mod from_syntax;
pub(crate) mod number;
pub mod options;
#[cfg(feature = "serde")]
mod serde;
pub mod to_toml;

pub use datetime::{Datetime, DatetimeError, DatetimeKind};
pub use options::{OptionParseError, Options, OptionsIncomplete};

use indexmap::IndexMap;
use std::str::FromStr;

pub type Array = Vec<Value>;

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Datetime(Datetime),
    Array(Array),
    Table(Table),
}

/// An insertion-ordered mapping of keys to values.
///
/// `inline` marks tables written as `{ ... }`. It only affects how the
/// table is serialized and is ignored by equality.
#[derive(Debug, Clone, Default)]
pub struct Table {
    entries: IndexMap<String, Value>,
    inline: bool,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty table that serializes as `{ ... }`.
    pub fn new_inline() -> Self {
        Self {
            entries: IndexMap::new(),
            inline: true,
        }
    }

    pub fn is_inline(&self) -> bool {
        self.inline
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    /// Insert or replace an entry, keeping the position of a replaced key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.entries.keys()
    }

    /// Follow a path of keys through nested tables.
    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value> {
        let (last, parents) = path.split_last()?;
        let mut table = self;
        for key in parents {
            table = table.get(key.as_ref())?.as_table()?;
        }
        table.get(last.as_ref())
    }

    /// Mark this table and the tables created inside it by dotted keys
    /// as inline. Arrays are left alone.
    pub(crate) fn freeze(&mut self) {
        self.inline = true;
        for value in self.entries.values_mut() {
            if let Value::Table(table) = value {
                table.freeze();
            }
        }
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Table {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            inline: false,
        }
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Table {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromStr for Table {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::from_str(s)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            // nan compares equal to nan so that models can be compared
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Datetime(a), Value::Datetime(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Table(a), Value::Table(b)) => a == b,
            _ => false,
        }
    }
}

macro_rules! value_from {
    (
        $(
          $elm:ident: $t:ty,
        )*
    ) => {
    $(
    impl From<$t> for Value {
        fn from(v: $t) -> Self {
            Self::$elm(v)
        }
    }
    )*
    };
}

value_from!(
    String: String,
    Integer: i64,
    Float: f64,
    Boolean: bool,
    Datetime: Datetime,
    Array: Array,
    Table: Table,
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

macro_rules! define_value_fns {
    (copy $elm:ident, $t:ty, $is_fn:ident, $as_fn:ident) => {
        pub fn $is_fn(&self) -> bool {
            matches!(self, Value::$elm(..))
        }

        pub fn $as_fn(&self) -> Option<$t> {
            match self {
                Value::$elm(v) => Some(*v),
                _ => None,
            }
        }
    };
    ($elm:ident, $t:ty, $is_fn:ident, $as_fn:ident) => {
        pub fn $is_fn(&self) -> bool {
            matches!(self, Value::$elm(..))
        }

        pub fn $as_fn(&self) -> Option<&$t> {
            match self {
                Value::$elm(ref v) => Some(v),
                _ => None,
            }
        }
    };
}

impl Value {
    define_value_fns!(copy Integer, i64, is_integer, as_integer);
    define_value_fns!(copy Float, f64, is_float, as_float);
    define_value_fns!(copy Boolean, bool, is_bool, as_bool);
    define_value_fns!(Datetime, Datetime, is_datetime, as_datetime);
    define_value_fns!(Array, Array, is_array, as_array);
    define_value_fns!(Table, Table, is_table, as_table);

    pub fn is_str(&self) -> bool {
        matches!(self, Value::String(..))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_table_mut(&mut self) -> Option<&mut Table> {
        match self {
            Value::Table(v) => Some(v),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Boolean(_) => "boolean",
            Value::Datetime(_) => "datetime",
            Value::Array(_) => "array",
            Value::Table(t) if t.is_inline() => "inline table",
            Value::Table(_) => "table",
        }
    }
}
