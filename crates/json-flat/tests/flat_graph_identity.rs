use json_flat::{decode, encode, graph_eq, FlatError, Graph, Node, Value};
use serde_json::json;

fn table_len(text: &str) -> usize {
    let value: serde_json::Value = serde_json::from_str(text).expect("envelope is JSON");
    value.as_array().expect("envelope is an array").len()
}

#[test]
fn shared_object_is_stored_once() {
    let mut graph = Graph::new();
    let a = graph.object();
    graph.set(a, "x", 1i64).unwrap();
    let root = graph.object();
    graph.set(root, "p", a).unwrap();
    graph.set(root, "q", a).unwrap();

    let text = encode(&graph, &Value::Node(root)).unwrap();
    assert_eq!(text, r#"[{"p":"1","q":"1"},{"x":1}]"#);
    assert_eq!(table_len(&text), 2);
}

#[test]
fn shared_object_decodes_to_one_instance() {
    let doc = decode(r#"[{"p":"1","q":"1"},{"x":1}]"#).unwrap();
    let root = doc.root_node().unwrap();
    let p = doc.graph.get(root, "p").and_then(Value::as_node).unwrap();
    let q = doc.graph.get(root, "q").and_then(Value::as_node).unwrap();
    assert_eq!(p, q);

    let mut graph = doc.graph;
    graph.set(p, "x", 2i64).unwrap();
    assert_eq!(graph.get(q, "x"), Some(&Value::from(2i64)));
}

#[test]
fn self_cycle_roundtrip() {
    let mut graph = Graph::new();
    let a = graph.object();
    graph.set(a, "self", a).unwrap();

    let text = encode(&graph, &Value::Node(a)).unwrap();
    assert_eq!(text, r#"[{"self":"0"}]"#);

    let doc = decode(&text).unwrap();
    let b = doc.root_node().unwrap();
    assert_eq!(doc.graph.get(b, "self"), Some(&Value::Node(b)));
    assert!(graph_eq(&graph, &Value::Node(a), &doc.graph, &doc.root));
}

#[test]
fn mutual_cycle_through_arrays() {
    let mut graph = Graph::new();
    let left = graph.array();
    let right = graph.array();
    graph.push(left, "L").unwrap();
    graph.push(left, right).unwrap();
    graph.push(right, "R").unwrap();
    graph.push(right, left).unwrap();

    let text = encode(&graph, &Value::Node(left)).unwrap();
    assert_eq!(text, r#"[["1","2"],"L",["3","0"],"R"]"#);

    let doc = decode(&text).unwrap();
    let l = doc.root_node().unwrap();
    let r = doc.graph.at(l, 1).and_then(Value::as_node).unwrap();
    assert_eq!(doc.graph.at(r, 1), Some(&Value::Node(l)));
    assert_eq!(doc.graph.at(r, 0), Some(&Value::from("R")));
    assert_eq!(doc.graph.len(), 2);
    assert!(graph_eq(&graph, &Value::Node(left), &doc.graph, &doc.root));
}

#[test]
fn back_edge_to_ancestor_and_sibling_sharing() {
    // root -> {child: c, again: c}; c -> {parent: root, list: [c, root]}
    let mut graph = Graph::new();
    let root = graph.object();
    let c = graph.object();
    let list = graph.array();
    graph.set(root, "child", c).unwrap();
    graph.set(root, "again", c).unwrap();
    graph.set(c, "parent", root).unwrap();
    graph.set(c, "list", list).unwrap();
    graph.push(list, c).unwrap();
    graph.push(list, root).unwrap();

    let text = encode(&graph, &Value::Node(root)).unwrap();
    assert_eq!(table_len(&text), 3);

    let doc = decode(&text).unwrap();
    assert_eq!(doc.graph.len(), 3);
    assert!(graph_eq(&graph, &Value::Node(root), &doc.graph, &doc.root));

    let r = doc.root_node().unwrap();
    let child = doc.graph.get(r, "child").and_then(Value::as_node).unwrap();
    assert_eq!(doc.graph.get(r, "again"), Some(&Value::Node(child)));
    assert_eq!(doc.graph.get(child, "parent"), Some(&Value::Node(r)));
}

#[test]
fn decoded_field_order_follows_the_slot() {
    let doc = decode(r#"[{"z":"1","a":1,"m":"2"},{},"t"]"#).unwrap();
    let root = doc.root_node().unwrap();
    match doc.graph.node(root) {
        Some(Node::Object(map)) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            assert_eq!(keys, ["z", "a", "m"]);
        }
        other => panic!("expected an object, got {other:?}"),
    }
}

#[test]
fn cyclic_document_cannot_be_materialized() {
    let doc = decode(r#"[{"self":"0"}]"#).unwrap();
    assert!(matches!(doc.to_json(), Err(FlatError::Cycle(_))));
}

#[test]
fn shared_document_materializes_with_duplicates() {
    let doc = decode(r#"[{"p":"1","q":"1"},{"x":1}]"#).unwrap();
    assert_eq!(
        doc.to_json().unwrap(),
        json!({"p": {"x": 1}, "q": {"x": 1}})
    );
}
