//! Writing the data model as TOML text.

use std::fmt::{Display, Formatter, Result};

use super::{Options, Table, Value};
use crate::util::quote::{quote, quote_key};

/// Serialize `table` as a TOML document.
#[tracing::instrument(skip_all)]
pub fn to_string_with(table: &Table, options: &Options) -> String {
    let mut serializer = Serializer {
        options,
        out: String::new(),
    };
    serializer.write_body(table, &mut vec![]);
    serializer.finish()
}

impl Table {
    pub fn to_toml(&self, options: &Options) -> String {
        to_string_with(self, options)
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(&self.to_toml(&Options::default()))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let mut s = String::new();
        write_inline(&mut s, self);
        f.write_str(&s)
    }
}

struct Serializer<'o> {
    options: &'o Options,
    out: String,
}

impl<'o> Serializer<'o> {
    fn finish(self) -> String {
        let mut out = self.out;
        while out.ends_with('\n') {
            out.pop();
        }
        if self.options.trailing_newline && !out.is_empty() {
            out.push('\n');
        }
        out
    }

    fn table_indent(&self, depth: usize) -> String {
        if self.options.indent_tables {
            self.options.indent_string.repeat(depth.saturating_sub(1))
        } else {
            String::new()
        }
    }

    /// Plain entries first, then sub-tables and arrays of tables.
    fn write_body(&mut self, table: &Table, path: &mut Vec<String>) {
        let indent = self.table_indent(path.len());
        for (key, value) in table {
            if is_section(value) {
                continue;
            }
            self.out.push_str(&indent);
            self.out.push_str(&quote_key(key));
            self.out.push_str(" = ");
            self.write_value(value, &indent);
            self.out.push('\n');
        }
        for (key, value) in table {
            match value {
                Value::Table(t) if !t.is_inline() => {
                    path.push(key.clone());
                    // a header is only needed when there is something to put under it
                    if t.is_empty() || t.iter().any(|(_, v)| !is_section(v)) {
                        self.write_header(path, false);
                    }
                    self.write_body(t, path);
                    path.pop();
                }
                Value::Array(items) if is_array_of_tables(items) => {
                    path.push(key.clone());
                    for item in items {
                        if let Value::Table(t) = item {
                            self.write_header(path, true);
                            self.write_body(t, path);
                        }
                    }
                    path.pop();
                }
                _ => {}
            }
        }
    }

    fn write_header(&mut self, path: &[String], array: bool) {
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        let name = path
            .iter()
            .map(|k| quote_key(k))
            .collect::<Vec<_>>()
            .join(".");
        self.out.push_str(&self.table_indent(path.len()));
        if array {
            self.out.push_str("[[");
            self.out.push_str(&name);
            self.out.push_str("]]\n");
        } else {
            self.out.push('[');
            self.out.push_str(&name);
            self.out.push_str("]\n");
        }
    }

    fn write_value(&mut self, value: &Value, indent: &str) {
        let mut inline = String::new();
        write_inline(&mut inline, value);
        match value {
            Value::Array(items)
                if !items.is_empty() && indent.len() + inline.len() > self.options.array_width =>
            {
                let inner = format!("{}{}", indent, self.options.indent_string);
                self.out.push_str("[\n");
                for item in items {
                    self.out.push_str(&inner);
                    self.write_value(item, &inner);
                    self.out.push_str(",\n");
                }
                self.out.push_str(indent);
                self.out.push(']');
            }
            _ => self.out.push_str(&inline),
        }
    }
}

/// Values written as their own `[table]` or `[[table]]` section.
fn is_section(value: &Value) -> bool {
    match value {
        Value::Table(t) => !t.is_inline(),
        Value::Array(items) => is_array_of_tables(items),
        _ => false,
    }
}

fn is_array_of_tables(items: &[Value]) -> bool {
    !items.is_empty()
        && items
            .iter()
            .all(|item| matches!(item, Value::Table(t) if !t.is_inline()))
}

fn write_inline(out: &mut String, value: &Value) {
    match value {
        Value::String(s) => out.push_str(&quote(s)),
        Value::Integer(i) => out.push_str(&i.to_string()),
        Value::Float(f) => out.push_str(&format_float(*f)),
        Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Datetime(d) => out.push_str(d.raw()),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_inline(out, item);
            }
            out.push(']');
        }
        Value::Table(table) if table.is_empty() => out.push_str("{}"),
        Value::Table(table) => {
            out.push_str("{ ");
            for (i, (key, value)) in table.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&quote_key(key));
                out.push_str(" = ");
                write_inline(out, value);
            }
            out.push_str(" }");
        }
    }
}

/// Floats always keep a fraction or an exponent.
fn format_float(f: f64) -> String {
    if f.is_nan() {
        "nan".into()
    } else if f.is_infinite() {
        String::from(if f > 0.0 { "inf" } else { "-inf" })
    } else {
        format!("{:?}", f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::from_str;

    fn roundtrip(source: &str) -> String {
        from_str(source).unwrap().to_toml(&Options::default())
    }

    #[test]
    fn test_scalars() {
        let out = roundtrip(
            "s = \"a\\tb\\u0001\"\ni = 0xff\nf = 1e3\nn = -nan\nb = true\nd = 1979-05-27 07:32:00Z\n",
        );
        assert_eq!(
            out,
            "s = \"a\\tb\\u0001\"\ni = 255\nf = 1000.0\nn = nan\nb = true\nd = 1979-05-27 07:32:00Z\n"
        );
    }

    #[test]
    fn test_sections() {
        let source = "title = 'T'\n[a.b]\nx = 1\n[a.c]\n[[p]]\nname = 'one'\n[p.sub]\ny = 2\n[[p]]\n";
        let out = roundtrip(source);
        assert_eq!(
            out,
            "title = \"T\"\n\n[a.b]\nx = 1\n\n[a.c]\n\n[[p]]\nname = \"one\"\n\n[p.sub]\ny = 2\n\n[[p]]\n"
        );
        assert_eq!(from_str(&out).unwrap(), from_str(source).unwrap());
    }

    #[test]
    fn test_inline_and_keys() {
        let out = roundtrip("t = { a.b = 1, \"c d\" = [] }\n\"\" = 1\n");
        assert_eq!(out, "t = { a = { b = 1 }, \"c d\" = [] }\n\"\" = 1\n");
    }

    #[test]
    fn test_array_width() {
        let mut options = Options::default();
        options.array_width = 10;
        let table = from_str("a = [1, 2, 3, 4, 5]\nb = [1]\n").unwrap();
        assert_eq!(
            table.to_toml(&options),
            "a = [\n  1,\n  2,\n  3,\n  4,\n  5,\n]\nb = [1]\n"
        );
    }

    #[test]
    fn test_indent_tables_and_newline() {
        let mut options = Options::default();
        options.indent_tables = true;
        options.trailing_newline = false;
        let table = from_str("[a]\nx = 1\n[a.b]\ny = 2\n").unwrap();
        assert_eq!(table.to_toml(&options), "[a]\nx = 1\n\n  [a.b]\n  y = 2");
    }

    #[test]
    fn test_display() {
        let table = from_str("v = [1.5, 'x', { k = false }]").unwrap();
        assert_eq!(
            table.get("v").unwrap().to_string(),
            "[1.5, \"x\", { k = false }]"
        );
        assert_eq!(format_float(-0.0), "-0.0");
        assert_eq!(format_float(f64::NEG_INFINITY), "-inf");
    }
}
