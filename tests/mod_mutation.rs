use serde::Serialize;

use docwire::utils::devlog;
use docwire::wire;
use docwire::{DbError, Key, Mutation, Operation, to_wire_mutations};

#[derive(Serialize)]
struct Item {
    name: String,
    qty: i64,
}

fn item() -> Item {
    Item { name: "widget".into(), qty: 3 }
}

#[test]
fn repeated_deletes_collapse_to_first() {
    let k1 = Key::name_key("K", "one", None);
    let k2 = Key::name_key("K", "two", None);
    let muts =
        vec![Mutation::delete(&k1), Mutation::delete(&k1), Mutation::delete(&k1), Mutation::delete(&k2)];
    let out = to_wire_mutations(&muts).unwrap();
    assert_eq!(out, vec![wire::Mutation::Delete(k1.to_wire()), wire::Mutation::Delete(k2.to_wire())]);
}

#[test]
fn writes_are_not_deduplicated() {
    let k = Key::name_key("K", "one", None);
    let muts = vec![
        Mutation::upsert(&k, &item()),
        Mutation::upsert(&k, &item()),
        Mutation::delete(&k),
        Mutation::update(&k, &item()),
        Mutation::delete(&k),
    ];
    let out = to_wire_mutations(&muts).unwrap();
    assert_eq!(out.len(), 4);
    assert!(matches!(out[0], wire::Mutation::Upsert(_)));
    assert!(matches!(out[2], wire::Mutation::Delete(_)));
    assert!(matches!(out[3], wire::Mutation::Update(_)));
}

#[test]
fn invalid_mutation_yields_positional_multi_error() {
    let good = Key::name_key("K", "one", None);
    let bad = Key::name_key("", "nokind", None);
    let muts = vec![Mutation::insert(&good, &item()), Mutation::insert(&bad, &item())];
    let Err(DbError::Multi(merr)) = to_wire_mutations(&muts) else { panic!("expected multi error") };
    assert_eq!(merr.len(), 2);
    assert_eq!(merr.error_count(), 1);
    assert!(merr.0[0].is_none());
    assert!(matches!(merr.0[1], Some(DbError::InvalidKey(_))));
}

#[test]
fn every_invalid_mutation_is_reported() {
    let incomplete = Key::incomplete("K", None);
    let muts = vec![
        Mutation::update(&incomplete, &item()),
        Mutation::delete(&Key::name_key("K", "ok", None)),
        Mutation::delete(&incomplete),
        Mutation::insert(&Key::name_key("K", "x", None), &5i32),
    ];
    let Err(DbError::Multi(merr)) = to_wire_mutations(&muts) else { panic!("expected multi error") };
    let slots: Vec<usize> = merr.iter().map(|(i, _)| i).collect();
    assert_eq!(slots, [0, 2, 3]);
    assert!(matches!(merr.0[0], Some(DbError::IncompleteKey { op: "update", .. })));
    assert!(matches!(merr.0[2], Some(DbError::IncompleteKey { op: "delete", .. })));
    assert!(matches!(merr.0[3], Some(DbError::Encoding(_))));
    assert!(merr.to_string().ends_with("(and 2 other errors)"));
}

#[test]
fn incomplete_keys_are_fine_for_insert_and_upsert() {
    let k = Key::incomplete("K", Some(&Key::name_key("P", "p", None)));
    let m = Mutation::insert(&k, &item());
    assert!(m.err().is_none());
    assert_eq!(m.operation(), Some(Operation::Insert));
    assert!(Mutation::upsert(&k, &item()).err().is_none());
}

#[test]
fn entity_properties_are_encoded() {
    let k = Key::id_key("K", 42, None);
    let out = to_wire_mutations(&[Mutation::insert(&k, &item())]).unwrap();
    let wire::Mutation::Insert(entity) = &out[0] else { panic!("expected insert") };
    assert_eq!(entity.key, k.to_wire());
    assert_eq!(entity.properties["name"], docwire::Value::from("widget"));
    assert_eq!(entity.properties["qty"], docwire::Value::Integer(3));
}

#[test]
fn empty_batch() {
    assert!(to_wire_mutations(&[]).unwrap().is_empty());
}

#[test]
fn assembly_emits_devlog_line() {
    let _g = devlog::enable_thread_sink();
    let k = Key::name_key("K", "a", None);
    to_wire_mutations(&[Mutation::delete(&k), Mutation::delete(&k)]).unwrap();
    let lines = devlog::drain();
    assert_eq!(lines, vec![r#"{"op":"to_wire_mutations","input":2,"output":1}"#.to_string()]);
}
