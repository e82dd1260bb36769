//! A lossless TOML 1.0.0 parser and serializer.
//!
//! Text is tokenized by a context-sensitive [lexer], turned into a
//! [rowan](rowan) syntax tree that keeps every byte of the source by the
//! [parser], and built into a [`Table`] that enforces TOML's key and table
//! rules. A [`Table`] is written back as TOML by [`serialize`].
//!
//! ```
//! let table = tomlsyn::from_str("[server]\nport = 8080\n").unwrap();
//! assert_eq!(
//!     table.get_path(&["server", "port"]).and_then(|v| v.as_integer()),
//!     Some(8080)
//! );
//! assert_eq!(tomlsyn::serialize(&table), "[server]\nport = 8080\n");
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod syntax;
pub mod util;
pub mod value;

#[doc(inline)]
pub use crate::error::{Error, ErrorKind, ErrorObject};
#[doc(inline)]
pub use crate::parser::{parse, SyntaxTree};
#[doc(inline)]
pub use crate::util::mapper::Position;
#[doc(inline)]
pub use crate::value::from_syntax::build;
#[doc(inline)]
pub use crate::value::to_toml::to_string_with;
#[doc(inline)]
pub use crate::value::{
    Array, Datetime, DatetimeError, DatetimeKind, OptionParseError, Options, OptionsIncomplete,
    Table, Value,
};

/// Parse and build a document.
pub fn from_str(source: &str) -> Result<Table, Error> {
    build(&parse(source)?)
}

/// Check that `source` is a valid TOML document.
pub fn validate(source: &str) -> Result<(), Error> {
    from_str(source).map(|_| ())
}

/// Serialize `table` with the default [`Options`].
pub fn serialize(table: &Table) -> String {
    to_string_with(table, &Options::default())
}
