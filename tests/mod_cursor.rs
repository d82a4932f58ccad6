use std::collections::BTreeMap;

use docwire::wire::{self, FieldReference};
use docwire::{Client, ClientConfig, DbError, Direction, DocumentRef, DocumentSnapshot, Value, map_value};

const ROOT: &str = "projects/P/databases/(default)/documents";

fn client() -> Client {
    Client::new(ClientConfig::new("P")).unwrap()
}

fn snap(path: &str, fields: Value) -> DocumentSnapshot {
    let Value::Map(fields) = fields else { panic!("fields must be a map") };
    DocumentSnapshot::new(DocumentRef::from_path(&format!("{ROOT}/{path}")).unwrap(), fields)
}

fn order(p: &str, direction: Direction) -> wire::Order {
    wire::Order { field: FieldReference { field_path: p.into() }, direction }
}

#[test]
fn direction_algebra() {
    let q = client().collection("C").order_by("a", Direction::Asc);
    let sq = q.start_at([1]).end_before([9]).to_wire().unwrap();
    assert_eq!(sq.start_at, Some(wire::Cursor { values: vec![Value::Integer(1)], before: true }));
    assert_eq!(sq.end_at, Some(wire::Cursor { values: vec![Value::Integer(9)], before: true }));

    let sq = q.start_after([1]).end_at([9]).to_wire().unwrap();
    assert_eq!(sq.start_at, Some(wire::Cursor { values: vec![Value::Integer(1)], before: false }));
    assert_eq!(sq.end_at, Some(wire::Cursor { values: vec![Value::Integer(9)], before: false }));
}

#[test]
fn later_bound_replaces_earlier() {
    let q = client().collection("C").order_by("a", Direction::Asc);
    let sq = q.start_at([1]).start_after([2]).end_at([3]).end_before([4]).to_wire().unwrap();
    assert_eq!(sq.start_at, Some(wire::Cursor { values: vec![Value::Integer(2)], before: false }));
    assert_eq!(sq.end_at, Some(wire::Cursor { values: vec![Value::Integer(4)], before: true }));
}

#[test]
fn snapshot_cursor_appends_document_name() {
    let doc = snap("C/D", map_value! {"a" => 7});
    let q = client().collection("C").order_by("a", Direction::Asc).start_at_snapshot(&doc);
    let sq = q.to_wire().unwrap();
    assert_eq!(sq.order_by, vec![order("a", Direction::Asc), order("__name__", Direction::Asc)]);
    assert_eq!(
        sq.start_at,
        Some(wire::Cursor { values: vec![Value::Integer(7), Value::reference(format!("{ROOT}/C/D"))], before: true })
    );
}

#[test]
fn snapshot_cursor_inherits_last_direction() {
    let doc = snap("C/D", map_value! {"a" => 1, "b" => 2});
    let q = client()
        .collection("C")
        .order_by("a", Direction::Asc)
        .order_by("b", Direction::Desc)
        .end_before_snapshot(&doc);
    let sq = q.to_wire().unwrap();
    assert_eq!(sq.order_by[2], order("__name__", Direction::Desc));
    assert_eq!(sq.end_at.unwrap().values.len(), 3);
}

#[test]
fn snapshot_cursor_without_orders() {
    let doc = snap("C/D", map_value! {"a" => 1});
    let sq = client().collection("C").start_after_snapshot(&doc).to_wire().unwrap();
    assert_eq!(sq.order_by, vec![order("__name__", Direction::Asc)]);
    assert_eq!(sq.start_at.unwrap().values, vec![Value::reference(format!("{ROOT}/C/D"))]);
}

#[test]
fn snapshot_cursor_orders_by_inequality_field_first() {
    let doc = snap("C/D", map_value! {"a" => 3});
    let sq = client().collection("C").where_("a", ">", 1).start_at_snapshot(&doc).to_wire().unwrap();
    assert_eq!(sq.order_by, vec![order("a", Direction::Asc), order("__name__", Direction::Asc)]);
    assert_eq!(sq.start_at.unwrap().values[0], Value::Integer(3));
}

#[test]
fn explicit_name_order_is_not_repeated() {
    let doc = snap("C/D", map_value! {});
    let sq = client()
        .collection("C")
        .order_by("__name__", Direction::Desc)
        .start_at_snapshot(&doc)
        .to_wire()
        .unwrap();
    assert_eq!(sq.order_by, vec![order("__name__", Direction::Desc)]);
}

#[test]
fn snapshot_missing_order_field() {
    let doc = snap("C/D", map_value! {"b" => 1});
    let q = client().collection("C").order_by("a", Direction::Asc).start_at_snapshot(&doc);
    assert!(matches!(q.to_wire(), Err(DbError::MissingField(_))));
}

#[test]
fn snapshot_nested_field() {
    let doc = snap("C/D", map_value! {"m" => map_value! {"x" => "v"}});
    let sq = client().collection("C").order_by("m.x", Direction::Asc).start_at_snapshot(&doc).to_wire().unwrap();
    assert_eq!(sq.start_at.unwrap().values[0], Value::from("v"));
}

#[test]
fn mixing_snapshot_and_values() {
    let doc = snap("C/D", map_value! {"a" => 1});
    let q = client().collection("C").order_by("a", Direction::Asc).start_at_snapshot(&doc).end_at([5]);
    assert_eq!(q.to_wire(), Err(DbError::MixedCursorType));
}

#[test]
fn value_count_checks() {
    let q = client().collection("C").order_by("a", Direction::Asc);
    assert!(matches!(q.start_at([1, 2]).to_wire(), Err(DbError::InvalidCursor(_))));
    assert!(matches!(q.start_at(Vec::<Value>::new()).to_wire(), Err(DbError::InvalidCursor(_))));
    let two = q.order_by("b", Direction::Asc);
    assert!(two.start_at([1]).to_wire().is_ok());
}

#[test]
fn document_id_cursor_values() {
    let c = client().collection("C");
    let q = c.order_by("__name__", Direction::Asc);
    let sq = q.start_at(["D"]).to_wire().unwrap();
    assert_eq!(sq.start_at.unwrap().values, vec![Value::reference(format!("{ROOT}/C/D"))]);

    assert!(matches!(q.start_at(["D/E"]).to_wire(), Err(DbError::InvalidValue(_))));
    assert!(matches!(q.start_at([7]).to_wire(), Err(DbError::InvalidValue(_))));
    assert!(matches!(q.start_at([""]).to_wire(), Err(DbError::InvalidValue(_))));

    let sq = q.end_at([c.doc("E").unwrap()]).to_wire().unwrap();
    assert_eq!(sq.end_at.unwrap().values, vec![Value::reference(format!("{ROOT}/C/E"))]);
}

#[test]
fn collection_group_document_id_cursor() {
    let q = client().collection_group("S").order_by("__name__", Direction::Asc);
    let sq = q.start_at(["C/D/S/E"]).to_wire().unwrap();
    assert_eq!(sq.start_at.unwrap().values, vec![Value::reference(format!("{ROOT}/C/D/S/E"))]);
    assert!(matches!(q.start_at(["C/D/S"]).to_wire(), Err(DbError::InvalidValue(_))));
}

#[test]
fn out_of_scope_reference_is_rejected() {
    let sub = client().collection("C").doc("D1").unwrap().collection("S");
    let other = client().collection("C").doc("D2").unwrap().collection("S").doc("X").unwrap();
    let q = sub.order_by("__name__", Direction::Asc).start_at([&other]);
    assert!(matches!(q.to_wire(), Err(DbError::ScopeMismatch { .. })));

    let deeper = sub.doc("X").unwrap().collection("S").doc("Y").unwrap();
    let q = sub.order_by("__name__", Direction::Asc).end_at([&deeper]);
    assert!(matches!(q.to_wire(), Err(DbError::ScopeMismatch { .. })));

    let group = client().collection_group("S").order_by("__name__", Direction::Asc);
    assert!(group.start_at([&other]).to_wire().is_ok());
    assert!(group.end_at([&deeper]).to_wire().is_ok());
}

#[test]
fn out_of_scope_snapshot_and_filter() {
    let sub = client().collection("C").doc("D1").unwrap().collection("S");
    let foreign = snap("C/D2/S/X", map_value! {});
    assert!(matches!(sub.start_at_snapshot(&foreign).to_wire(), Err(DbError::ScopeMismatch { .. })));
    assert!(client().collection_group("S").start_at_snapshot(&foreign).to_wire().is_ok());

    let other = client().collection("C").doc("D2").unwrap().collection("S").doc("X").unwrap();
    let q = sub.where_("__name__", "==", &other);
    assert!(matches!(q.to_wire(), Err(DbError::ScopeMismatch { .. })));
    assert!(sub.where_("__name__", "==", sub.doc("X").unwrap()).to_wire().is_ok());
}

#[test]
fn vector_cursor_values_are_tagged() {
    let q = client().collection("C").order_by("v", Direction::Asc);
    let sq = q.start_at([docwire::Vector(vec![1.0])]).to_wire().unwrap();
    let mut expected = BTreeMap::new();
    expected.insert("__type__".to_string(), Value::from("__vector__"));
    expected.insert("value".to_string(), Value::Array(vec![Value::Double(1.0)]));
    assert_eq!(sq.start_at.unwrap().values, vec![Value::Map(expected)]);
}
