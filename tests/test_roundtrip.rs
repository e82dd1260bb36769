mod common;

use proptest::prelude::*;
use tomlsyn::{Options, Table, Value};

const DATETIMES: &[&str] = &[
    "1979-05-27T07:32:00Z",
    "1979-05-27 00:32:00.999999-07:00",
    "2016-12-31T23:59:60+01:30",
    "1979-05-27T07:32:00",
    "1979-05-27",
    "07:32:00.5",
];

fn key() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z0-9_-]{1,8}",
        "[ -~]{0,6}",
        "\\PC{0,4}",
    ]
}

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Integer),
        (-1.0e6..1.0e6f64).prop_map(Value::Float),
        prop_oneof![
            Just(f64::INFINITY),
            Just(f64::NEG_INFINITY),
            Just(f64::NAN),
            Just(-0.0),
            Just(1e300),
            Just(5e-324),
        ]
        .prop_map(Value::Float),
        any::<bool>().prop_map(Value::Boolean),
        "[\\PC\t\n\r]{0,12}".prop_map(Value::String),
        prop::sample::select(DATETIMES).prop_map(|s| Value::Datetime(s.parse().unwrap())),
    ]
}

fn entries(inner: impl Strategy<Value = Value>) -> impl Strategy<Value = Vec<(String, Value)>> {
    prop::collection::vec((key(), inner), 0..4)
}

fn value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            entries(inner.clone()).prop_map(|e| Value::Table(e.into_iter().collect())),
            entries(inner).prop_map(|e| {
                let mut table = Table::new_inline();
                for (k, v) in e {
                    table.insert(k, v);
                }
                Value::Table(table)
            }),
        ]
    })
}

fn document() -> impl Strategy<Value = Table> {
    prop::collection::vec((key(), value()), 0..6).prop_map(|e| e.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn serialized_documents_load_back(table in document()) {
        common::init_tracing();
        let text = tomlsyn::serialize(&table);
        let again = tomlsyn::from_str(&text);
        prop_assert!(again.is_ok(), "{:?}\n{}", again, text);
        prop_assert_eq!(again.unwrap(), table);
    }

    #[test]
    fn serializer_options_keep_documents_valid(
        table in document(),
        indent_tables in any::<bool>(),
        array_width in 0usize..40,
    ) {
        let options = Options {
            indent_tables,
            array_width,
            ..Options::default()
        };
        let text = tomlsyn::to_string_with(&table, &options);
        let again = tomlsyn::from_str(&text);
        prop_assert!(again.is_ok(), "{:?}\n{}", again, text);
        prop_assert_eq!(again.unwrap(), table);
    }

    #[test]
    fn syntax_tree_keeps_every_byte(table in document()) {
        let text = tomlsyn::serialize(&table);
        let tree = tomlsyn::parse(&text).unwrap();
        prop_assert_eq!(tree.to_text(), text);
    }
}
