mod common;

use common::{assert_roundtrip, load, load_err};
use tomlsyn::ast::Node;
use tomlsyn::{ErrorKind, Value};

#[test]
fn test_exact_text_round_trip() {
    for source in [
        "",
        "# only a comment\n",
        "a=1",
        "\ttitle = \"x\"   # trailing\r\n\r\n[ a . 'b c' ] # header\nv = [ 1 ,\n 2 , ] \n",
        "[[p]]\nname = '''\nraw\n'''\n[p.s]\nx = { y = [ { z = 1979-05-27 07:32:00Z } ] }\n",
    ] {
        let tree = tomlsyn::parse(source).unwrap();
        assert_eq!(tree.to_text(), source);
    }
}

#[test]
fn test_model_round_trip() {
    let table = load(
        "title = \"T\"\n[a]\nb.c = 1\nd = { e = [1, 2.5, 'x'] }\n[[a.list]]\nk = 07:32:00\n[[a.list]]\n",
    );
    assert_roundtrip(&table);
}

#[test]
fn test_duplicate_keys_are_semantic_errors() {
    for source in ["a=1\na=2", "a.b=1\na.b=2", "a=1\n[a]\nb=2"] {
        assert_eq!(load_err(source).kind(), ErrorKind::Semantic, "{}", source);
    }
}

#[test]
fn test_array_of_tables_chaining() {
    let table = load("[[p]]\n[p.s]\nv=1\n\n[[p]]\n[p.s]\nv=2");
    let p = table.get("p").and_then(Value::as_array).unwrap();
    assert_eq!(p.len(), 2);
    for (item, expected) in p.iter().zip([1, 2]) {
        let v = item.as_table().unwrap().get_path(&["s", "v"]);
        assert_eq!(v, Some(&Value::Integer(expected)));
    }
}

#[test]
fn test_number_bases() {
    for (source, expected) in [
        ("a=0x1A", 26),
        ("a=0o17", 15),
        ("a=0b101", 5),
        ("a=1_000", 1000),
    ] {
        assert_eq!(load(source).get("a"), Some(&Value::Integer(expected)), "{}", source);
    }
    assert_eq!(load_err("a=007").kind(), ErrorKind::Parse);
}

#[test]
fn test_dotted_key_or_float() {
    let tree = tomlsyn::parse("1.2 = 3").unwrap();
    let entry = match tree.document().children().next() {
        Some(Node::KeyValue(entry)) => entry,
        other => panic!("unexpected node {:?}", other),
    };
    let segments: Vec<String> = entry
        .key()
        .unwrap()
        .segments()
        .map(|s| s.value().unwrap())
        .collect();
    assert_eq!(segments, vec!["1", "2"]);
    let table = tomlsyn::build(&tree).unwrap();
    assert_eq!(table.get_path(&["1", "2"]), Some(&Value::Integer(3)));

    assert_eq!(load("a = 1.2").get("a"), Some(&Value::Float(1.2)));
}

#[test]
fn test_inline_table_immutability() {
    let err = load_err("t = { a = 1 }\n[t.b]\nc=2");
    assert_eq!(err.kind(), ErrorKind::Semantic);
    assert_eq!(err.message(), "inline table `t` cannot be extended");
}
