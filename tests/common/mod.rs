#![allow(unused)]

use tomlsyn::{Error, Table};

pub(crate) fn include_fixture(file: &str) -> String {
    let mut file_path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    for p in format!("tests/fixtures/{}", file).split('/') {
        file_path = file_path.join(p);
    }
    std::fs::read_to_string(&file_path)
        .unwrap_or_else(|err| panic!("cannot read {}: {}", file_path.display(), err))
}

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub(crate) fn load(source: &str) -> Table {
    init_tracing();
    match tomlsyn::from_str(source) {
        Ok(table) => table,
        Err(err) => panic!("failed to load document: {}\n{}", err, source),
    }
}

pub(crate) fn load_err(source: &str) -> Error {
    init_tracing();
    match tomlsyn::from_str(source) {
        Ok(table) => panic!("expected an error, got {:?}", table),
        Err(err) => err,
    }
}

/// Serialize and load again; the model must not change.
pub(crate) fn assert_roundtrip(table: &Table) {
    let text = tomlsyn::serialize(table);
    let again = match tomlsyn::from_str(&text) {
        Ok(again) => again,
        Err(err) => panic!("serialized output does not load: {}\n{}", err, text),
    };
    assert_eq!(&again, table, "round trip changed the model:\n{}", text);
}

macro_rules! valid_fixture {
    ($name:literal, $fn_name:ident) => {
        #[test]
        fn $fn_name() {
            let source = crate::common::include_fixture(concat!("valid/", $name, ".toml"));
            let expected = crate::common::include_fixture(concat!("valid/", $name, ".json"));
            let table = crate::common::load(&source);
            assert_eq!(
                serde_json::to_value(&table).unwrap(),
                serde_json::from_str::<serde_json::Value>(&expected).unwrap()
            );
            assert_eq!(tomlsyn::parse(&source).unwrap().to_text(), source);
            crate::common::assert_roundtrip(&table);
        }
    };
}

macro_rules! invalid_fixture {
    ($name:literal, $fn_name:ident, $kind:ident) => {
        #[test]
        fn $fn_name() {
            let source = crate::common::include_fixture(concat!("invalid/", $name, ".toml"));
            let err = crate::common::load_err(&source);
            assert_eq!(err.kind(), tomlsyn::ErrorKind::$kind, "{}", err);
        }
    };
}
