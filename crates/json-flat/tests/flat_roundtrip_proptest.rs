use json_flat::{decode, encode, graph_eq, Graph};
use proptest::prelude::*;
use serde_json::{Map, Value as Json};

fn arb_json() -> impl Strategy<Value = Json> {
    let leaf = prop_oneof![
        Just(Json::Null),
        any::<bool>().prop_map(Json::Bool),
        any::<i64>().prop_map(Json::from),
        "[a-z0-9]{0,3}".prop_map(Json::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Json::Array),
            prop::collection::btree_map("[a-z0-9]{0,3}", inner, 0..6)
                .prop_map(|fields| Json::Object(fields.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

proptest! {
    #[test]
    fn acyclic_values_roundtrip(json in arb_json()) {
        let mut graph = Graph::new();
        let root = graph.insert_json(&json);
        let text = encode(&graph, &root).unwrap();
        let doc = decode(&text).unwrap();
        prop_assert_eq!(doc.to_json().unwrap(), json);
        prop_assert!(graph_eq(&graph, &root, &doc.graph, &doc.root));
    }

    #[test]
    fn reencoding_is_stable(json in arb_json()) {
        let mut graph = Graph::new();
        let root = graph.insert_json(&json);
        let text = encode(&graph, &root).unwrap();
        let doc = decode(&text).unwrap();
        prop_assert_eq!(encode(&doc.graph, &doc.root).unwrap(), text);
    }
}
