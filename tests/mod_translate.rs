use docwire::utils::devlog;
use docwire::wire::RunQueryRequest;
use docwire::{
    Client, ClientConfig, DbError, Direction, DistanceMeasure, DocumentRef, DocumentSnapshot, EntityFilter,
    FieldPath, Query, RunOption, Value, map_value,
};

fn client() -> Client {
    Client::new(ClientConfig::new("P").with_database("db1")).unwrap()
}

fn assert_round_trip(q: &Query) {
    let req = q.to_run_request().unwrap();
    let bytes = q.serialize().unwrap();
    let back = Query::deserialize(&bytes).unwrap();
    assert_eq!(back.to_run_request().unwrap(), req);
}

#[test]
fn round_trip_plain_queries() {
    let c = client().collection("C");
    assert_round_trip(c.query());
    assert_round_trip(&c.where_("a", "==", 1).where_("b", ">=", 2.5).order_by("b", Direction::Desc).limit(3));
    assert_round_trip(&c.select(&["a", "m.n"]).offset(7));
    assert_round_trip(&c.select::<&str>(&[]));
    assert_round_trip(&c.where_path(FieldPath::new(["weird.name", "`x`"]), "array-contains-any", vec![1, 2]));
    assert_round_trip(&c.where_("a", "==", Value::Null).where_("b", "==", f64::NAN));
    assert_round_trip(&c.with_run_options([RunOption::explain(true)]));
}

#[test]
fn round_trip_composites_and_cursors() {
    let c = client().collection("C");
    let f = EntityFilter::or([
        docwire::query::PropertyFilter::new("a", "<", 1).into(),
        EntityFilter::and([
            docwire::query::PropertyFilter::new("b", "in", vec!["x", "y"]).into(),
            docwire::query::PropertyFilter::new("c", "not-in", vec![1]).into(),
        ]),
    ]);
    assert_round_trip(&c.where_entity(f));
    let ordered = c.order_by("a", Direction::Asc).order_by("__name__", Direction::Asc);
    assert_round_trip(&ordered.start_after([Value::from(1), Value::from("D")]).end_at([Value::from(9)]));

    let Value::Map(fields) = (map_value! {"a" => 4}) else { unreachable!() };
    let doc = DocumentSnapshot::new(c.doc("D").unwrap(), fields);
    assert_round_trip(&c.order_by("a", Direction::Desc).start_at_snapshot(&doc));
}

#[test]
fn round_trip_collection_group_and_vector_search() {
    let g = client().collection_group("S").order_by("__name__", Direction::Asc).start_at(["C/D/S/E"]);
    assert_round_trip(&g);
    let v = client().collection("C").where_("k", "==", true).find_nearest(
        "emb",
        vec![0.25f32, 0.5],
        3,
        DistanceMeasure::Euclidean,
        Some(docwire::FindNearestOptions { distance_result_field: None, distance_threshold: Some(1.5) }),
    );
    assert_round_trip(&v);
    let back = Query::deserialize(&v.serialize().unwrap()).unwrap();
    assert_eq!(back.to_wire().unwrap().find_nearest, v.to_wire().unwrap().find_nearest);
}

#[test]
fn nan_filter_survives_round_trip() {
    let q = client().collection("C").where_("x", "==", f64::NAN);
    let back = Query::deserialize(&q.serialize().unwrap()).unwrap();
    assert_eq!(back.to_wire().unwrap(), q.to_wire().unwrap());
}

#[test]
fn non_finite_cursor_and_in_values_survive_round_trip() {
    let c = client().collection("C");
    for v in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let queries = [
            c.order_by("a", Direction::Asc).start_at([v]),
            c.order_by("a", Direction::Desc).end_before([Value::from(v)]),
            c.where_("a", "in", vec![v, 1.0]),
            c.where_("a", "not-in", vec![v]),
        ];
        for q in &queries {
            let bytes = q.serialize().unwrap();
            let back = Query::deserialize(&bytes).unwrap();
            // NaN never compares equal, so compare the re-encoded bytes
            assert_eq!(back.serialize().unwrap(), bytes);
        }
    }

    let Value::Map(fields) = (map_value! {"a" => f64::NAN}) else { unreachable!() };
    let doc = DocumentSnapshot::new(c.doc("D").unwrap(), fields);
    let q = c.order_by("a", Direction::Asc).start_after_snapshot(&doc);
    let bytes = q.serialize().unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains(r#"{"double":"NaN"}"#));
    assert_eq!(Query::deserialize(&bytes).unwrap().serialize().unwrap(), bytes);
}

#[test]
fn deserialize_rejects_garbage() {
    assert!(matches!(Query::deserialize(b"not json"), Err(DbError::Serialization(_))));
    let mut req = client().collection("C").to_run_request().unwrap();
    req.structured_query.from.clear();
    let bytes = serde_json::to_vec(&req).unwrap();
    assert!(matches!(Query::deserialize(&bytes), Err(DbError::InvalidArgument(_))));
}

#[test]
fn request_json_shape() {
    let q = client().collection("C").where_("a", ">", 1).order_by("a", Direction::Asc).limit(2);
    let json: serde_json::Value = serde_json::from_slice(&q.serialize().unwrap()).unwrap();
    assert_eq!(json["parent"], "projects/P/databases/db1/documents");
    assert_eq!(json["structured_query"]["from"][0]["collection_id"], "C");
    assert_eq!(json["structured_query"]["where"]["field_filter"]["op"], "GREATER_THAN");
    assert_eq!(json["structured_query"]["order_by"][0]["direction"], "ASCENDING");
    assert_eq!(json["structured_query"]["limit"], 2);
    let req: RunQueryRequest = serde_json::from_value(json).unwrap();
    assert_eq!(req, q.to_run_request().unwrap());
}

#[test]
fn translation_emits_devlog_line() {
    let _g = devlog::enable_thread_sink();
    let _ = client().collection("C").where_("a", "==", 1).to_wire().unwrap();
    let lines = devlog::drain();
    assert_eq!(lines.len(), 1);
    let v: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(v["op"], "to_wire");
    assert_eq!(v["collection"], "C");
    assert_eq!(v["filters"], 1);

    let _ = client().collection("C").where_("a", "<>", 1).to_wire();
    assert!(devlog::drain().is_empty());
}

#[test]
fn reference_values_from_document_refs() {
    let d = DocumentRef::from_path("projects/P/databases/db1/documents/C/D").unwrap();
    assert_eq!(Value::from(&d), Value::reference("projects/P/databases/db1/documents/C/D"));
}
