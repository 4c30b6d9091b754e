use chrono::{FixedOffset, NaiveDate, TimeZone};
use num_bigint::BigInt;
use serde::Serialize;
use toml_emit::{dump, to_string, to_string_with, toml, Error, Table, TomlEncoder, Value};

fn doc(entries: &[(&str, Value)]) -> Table {
    let table = Table::new();
    for (key, value) in entries {
        table.insert(*key, value.clone());
    }
    table
}

#[test]
fn flat_document() {
    let table = doc(&[
        ("a", Value::from("I'm a string")),
        ("b", Value::from(vec!["I'm", "a", "list"])),
        ("c", Value::from(2400)),
        ("d", Value::from(true)),
        ("e", Value::from(0.5)),
    ]);
    assert_eq!(
        to_string(&table).unwrap(),
        "a = \"I'm a string\"\nb = [ \"I'm\", \"a\", \"list\",]\nc = 2400\nd = true\ne = 0.5\n"
    );
}

#[test]
fn encoding_is_deterministic() {
    let table = doc(&[
        ("x", Value::from(1)),
        ("t", Value::Table(doc(&[("y", Value::from(2.5))]))),
        ("arr", Value::from(vec![1, 2, 3])),
    ]);
    let first = to_string(&table).unwrap();
    let second = to_string(&table).unwrap();
    assert_eq!(first, second);
}

#[test]
fn key_order_is_input_order() {
    let table = doc(&[
        ("c", Value::from(1)),
        ("a", Value::from(2)),
        ("b", Value::from(3)),
    ]);
    assert_eq!(to_string(&table).unwrap(), "c = 1\na = 2\nb = 3\n");
}

#[test]
fn nested_tables_render_breadth_first() {
    let u = doc(&[("c", Value::from(3))]);
    let t = doc(&[("b", Value::from(2)), ("u", Value::Table(u))]);
    let s = doc(&[("d", Value::from(4))]);
    let root = doc(&[
        ("a", Value::from(1)),
        ("t", Value::Table(t)),
        ("s", Value::Table(s)),
    ]);
    assert_eq!(
        to_string(&root).unwrap(),
        "a = 1\n\n[t]\nb = 2\n\n[s]\nd = 4\n\n[t.u]\nc = 3\n"
    );
}

#[test]
fn quoted_keys_in_assignments_and_headers() {
    let inner = doc(&[("x y", Value::from(1))]);
    let root = doc(&[
        ("plain", Value::from(1)),
        ("needs quoting", Value::from(2)),
        ("dotted.key", Value::Table(inner)),
    ]);
    assert_eq!(
        to_string(&root).unwrap(),
        "plain = 1\n\"needs quoting\" = 2\n\n[\"dotted.key\"]\n\"x y\" = 1\n"
    );
}

#[test]
fn string_escapes_survive_encoding() {
    let root = doc(&[
        ("backslash", Value::from("\\x64")),
        ("quote", Value::from("say \"hi\"")),
        ("control", Value::from("a\u{10}b")),
    ]);
    assert_eq!(
        to_string(&root).unwrap(),
        "backslash = \"\\\\x64\"\nquote = \"say \\\"hi\\\"\"\ncontrol = \"a\\u0010b\"\n"
    );
}

#[test]
fn dates_times_and_bigints() {
    let offset = FixedOffset::east_opt(0).unwrap();
    let root = doc(&[
        ("day", Value::from(NaiveDate::from_ymd_opt(2020, 6, 1).unwrap())),
        (
            "stamp",
            Value::from(offset.with_ymd_and_hms(2020, 6, 1, 12, 0, 0).unwrap()),
        ),
        ("big", Value::from(BigInt::from(u64::MAX))),
    ]);
    assert_eq!(
        to_string(&root).unwrap(),
        "day = 2020-06-01\nstamp = 2020-06-01T12:00:00Z\nbig = 18446744073709551615\n"
    );
}

#[test]
fn array_of_tables() {
    let y = doc(&[("z", Value::from(3))]);
    let e1 = doc(&[("x", Value::from(1))]);
    let e2 = doc(&[("x", Value::from(2)), ("y", Value::Table(y))]);
    let root = doc(&[(
        "arr",
        Value::Array(vec![Value::Table(e1), Value::Table(e2)]),
    )]);
    assert_eq!(
        to_string(&root).unwrap(),
        "[[arr]]\nx = 1\n\n[[arr]]\nx = 2\n\n[arr.y]\nz = 3\n"
    );
}

#[test]
fn null_entries_are_omitted() {
    let root = doc(&[
        ("gone", Value::Null),
        ("kept", Value::from(1)),
        ("also_gone", Value::from(None::<i64>)),
    ]);
    assert_eq!(to_string(&root).unwrap(), "kept = 1\n");
}

#[test]
fn cyclic_document_is_rejected_with_no_output() {
    let b = Table::new();
    b.insert("self", b.clone());
    let a = doc(&[("lead", Value::from(1)), ("b", Value::Table(b))]);
    let err = to_string(&a).unwrap_err();
    assert!(matches!(err, Error::Cycle));
    assert_eq!(err.to_string(), "circular reference detected");
}

#[test]
fn separator_variant() {
    let root = doc(&[("values", Value::from(vec![1, 2, 3]))]);

    let tabbed = TomlEncoder::new().with_array_separator(",\t").unwrap();
    assert_eq!(
        to_string_with(&root, &tabbed).unwrap(),
        "values = [ 1,\t 2,\t 3,\t]\n"
    );

    // Every element gets a leading space in addition to whatever trailing
    // whitespace the separator carries.
    let spaced = TomlEncoder::new().with_array_separator(", ").unwrap();
    assert_eq!(
        to_string_with(&root, &spaced).unwrap(),
        "values = [ 1,  2,  3, ]\n"
    );

    assert!(matches!(
        TomlEncoder::new().with_array_separator(";"),
        Err(Error::InvalidSeparator(_))
    ));
}

#[test]
fn inline_table_variant() {
    let point = Table::inline();
    point.insert("x", 1);
    point.insert("y", 2);
    let root = doc(&[("point", Value::Table(point)), ("n", Value::from(3))]);

    let inline = TomlEncoder::new().with_inline_tables();
    assert_eq!(
        to_string_with(&root, &inline).unwrap(),
        "point = { x = 1, y = 2 }\nn = 3\n"
    );

    // The marker is ignored without the variant.
    assert_eq!(
        to_string(&root).unwrap(),
        "n = 3\n\n[point]\nx = 1\ny = 2\n"
    );
}

#[test]
fn comment_variant() {
    let root = doc(&[
        ("a", Value::commented(1, " # the first")),
        ("b", Value::from(2)),
    ]);

    let commented = TomlEncoder::new().with_comments();
    assert_eq!(
        to_string_with(&root, &commented).unwrap(),
        "a = 1 # the first\nb = 2\n"
    );
    assert_eq!(to_string(&root).unwrap(), "a = 1\nb = 2\n");
}

#[test]
fn numeric_scalar_variant() {
    let root = doc(&[("ratio", Value::ext(2.5f32)), ("count", Value::ext(7u8))]);

    let numeric = TomlEncoder::new().with_numeric_scalars();
    assert_eq!(
        to_string_with(&root, &numeric).unwrap(),
        "ratio = 2.5\ncount = 7\n"
    );

    // Without the variant these fall back to quoted strings.
    assert_eq!(
        to_string(&root).unwrap(),
        "ratio = \"2.5\"\ncount = \"7\"\n"
    );
}

#[test]
fn custom_scalar_registration() {
    let mut encoder = TomlEncoder::new();
    encoder.register_scalar::<char>(|c| format!("\"char:{}\"", c));
    let root = doc(&[("c", Value::ext('q'))]);
    assert_eq!(to_string_with(&root, &encoder).unwrap(), "c = \"char:q\"\n");
}

#[test]
fn default_probes_handle_paths_and_addresses() {
    use std::net::{IpAddr, Ipv4Addr};
    use std::path::PathBuf;

    let root = doc(&[
        ("path", Value::ext(PathBuf::from("/etc/app.toml"))),
        ("addr", Value::ext(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)))),
    ]);
    assert_eq!(
        to_string(&root).unwrap(),
        "path = \"/etc/app.toml\"\naddr = \"10.0.0.1\"\n"
    );
}

#[test]
fn dump_to_writer() {
    let root = doc(&[("a", Value::from(1))]);
    let mut buf = Vec::new();
    let text = dump(&root, &mut buf).unwrap();
    assert_eq!(text, "a = 1\n");
    assert_eq!(buf, b"a = 1\n");
}

#[test]
fn dump_to_path_round_trips() {
    let root = doc(&[("written", Value::from(true))]);
    let path = std::env::temp_dir().join("toml_emit_dump_test.toml");
    let text = dump(&root, path.as_path()).unwrap();
    let read_back = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(read_back, text);
    assert_eq!(text, "written = true\n");
}

#[test]
fn dump_rejects_non_utf8_byte_paths() {
    let root = doc(&[("a", Value::from(1))]);
    let bad: &[u8] = &[0x2f, 0x74, 0x6d, 0x70, 0x2f, 0xff, 0xfe];
    assert!(matches!(
        dump(&root, bad),
        Err(Error::InvalidDestination(_))
    ));
}

#[test]
fn dump_failure_writes_nothing() {
    let cyclic = Table::new();
    cyclic.insert("self", cyclic.clone());
    let mut buf = Vec::new();
    assert!(dump(&cyclic, &mut buf).is_err());
    assert!(buf.is_empty());
}

#[derive(Serialize)]
struct AppConfig {
    title: String,
    database: Database,
    ports: Vec<u16>,
}

#[derive(Serialize)]
struct Database {
    host: String,
    max_connections: u32,
}

#[test]
fn serde_types_encode_end_to_end() {
    let config = AppConfig {
        title: "demo".to_string(),
        database: Database {
            host: "db.local".to_string(),
            max_connections: 50,
        },
        ports: vec![8001, 8002],
    };
    let table = toml_emit::to_table(&config).unwrap();
    assert_eq!(
        to_string(&table).unwrap(),
        "title = \"demo\"\nports = [ 8001, 8002,]\n\n[database]\nhost = \"db.local\"\nmax_connections = 50\n"
    );
}

#[test]
fn macro_built_documents_encode() {
    let value = toml!({
        "title": "example",
        "servers": { "alpha": { "ip": "10.0.0.1" } },
    });
    let table = value.as_table().unwrap();
    assert_eq!(
        to_string(table).unwrap(),
        "title = \"example\"\n\n[servers.alpha]\nip = \"10.0.0.1\"\n"
    );
}
