use proptest::prelude::*;
use std::cmp::Ordering;

use docwire::{Client, ClientConfig, Direction, DocumentSnapshot, Value};

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Boolean),
        any::<i64>().prop_map(Value::Integer),
        any::<f64>().prop_map(Value::Double),
        "[a-c]{0,3}".prop_map(Value::String),
        prop::collection::vec(any::<u8>(), 0..3).prop_map(Value::Bytes),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(2, 8, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(Value::Array),
            prop::collection::btree_map("[a-b]", inner, 0..3).prop_map(Value::Map),
        ]
    })
}

fn docs(values: Vec<(Value, i64)>) -> Vec<DocumentSnapshot> {
    let coll = Client::new(ClientConfig::new("P")).unwrap().collection("C");
    values
        .into_iter()
        .enumerate()
        .map(|(i, (a, b))| {
            let mut fields = std::collections::BTreeMap::new();
            fields.insert("a".to_string(), a);
            fields.insert("b".to_string(), Value::Integer(b));
            DocumentSnapshot::new(coll.doc(&format!("d{i}")).unwrap(), fields)
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_compare_is_antisymmetric(a in value(), b in value()) {
        let ab = docwire::value::compare_values(&a, &b);
        let ba = docwire::value::compare_values(&b, &a);
        prop_assert_eq!(ab, ba.reverse());
        prop_assert_eq!(docwire::value::compare_values(&a, &a), Ordering::Equal);
    }

    #[test]
    fn prop_sorted_output_is_non_decreasing(v in prop::collection::vec((value(), -5i64..5), 0..30), desc in any::<bool>()) {
        let dir = if desc { Direction::Desc } else { Direction::Asc };
        let q = Client::new(ClientConfig::new("P")).unwrap().collection("C").order_by("a", dir).order_by("b", Direction::Asc);
        let mut ds = docs(v);
        q.sort_documents(&mut ds).unwrap();
        let cmp = q.compare_func();
        for w in ds.windows(2) {
            prop_assert_ne!(cmp(&w[0], &w[1]).unwrap(), Ordering::Greater);
        }
    }
}
