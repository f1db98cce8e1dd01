//! Shape-aware equality of value graphs.

use std::collections::HashMap;

use crate::graph::{Graph, Node, NodeId, Value};

/// Deep equality of two value graphs that also compares their shape.
///
/// Leaves compare by value. Nodes are matched pairwise as they are reached
/// and the pairing must stay one-to-one: two references to one node in `a`
/// must be two references to one node in `b`, and a cycle must close at the
/// matching node. Object field order is not significant.
///
/// # Examples
///
/// ```
/// use json_flat::{graph_eq, Graph, Value};
///
/// let mut a = Graph::new();
/// let x = a.object();
/// a.set(x, "self", x).unwrap();
///
/// let mut b = Graph::new();
/// let y = b.object();
/// let z = b.object();
/// b.set(y, "self", z).unwrap();
/// b.set(z, "self", y).unwrap();
///
/// assert!(graph_eq(&a, &Value::Node(x), &a, &Value::Node(x)));
/// assert!(!graph_eq(&a, &Value::Node(x), &b, &Value::Node(y)));
/// ```
pub fn graph_eq(a: &Graph, root_a: &Value, b: &Graph, root_b: &Value) -> bool {
    let mut forward: HashMap<NodeId, NodeId> = HashMap::new();
    let mut backward: HashMap<NodeId, NodeId> = HashMap::new();
    let mut stack = vec![(root_a, root_b)];

    while let Some(pair) = stack.pop() {
        let (x, y) = match pair {
            (Value::Node(x), Value::Node(y)) => (*x, *y),
            (va, vb) => {
                if va != vb {
                    return false;
                }
                continue;
            }
        };
        match (forward.get(&x), backward.get(&y)) {
            (Some(fx), Some(by)) if *fx == y && *by == x => continue,
            (None, None) => {
                forward.insert(x, y);
                backward.insert(y, x);
            }
            _ => return false,
        }
        let (Some(nx), Some(ny)) = (a.node(x), b.node(y)) else {
            return false;
        };
        match (nx, ny) {
            (Node::Array(xs), Node::Array(ys)) => {
                if xs.len() != ys.len() {
                    return false;
                }
                stack.extend(xs.iter().zip(ys.iter()));
            }
            (Node::Object(xs), Node::Object(ys)) => {
                if xs.len() != ys.len() {
                    return false;
                }
                for (key, vx) in xs {
                    match ys.get(key) {
                        Some(vy) => stack.push((vx, vy)),
                        None => return false,
                    }
                }
            }
            _ => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn trees_compare_like_json() {
        let mut a = Graph::new();
        let ra = a.insert_json(&json!({"k": [1, "s", null], "o": {}}));
        let mut b = Graph::new();
        let rb = b.insert_json(&json!({"o": {}, "k": [1, "s", null]}));
        assert!(graph_eq(&a, &ra, &b, &rb));

        let rc = b.insert_json(&json!({"o": {}, "k": [1, "s", false]}));
        assert!(!graph_eq(&a, &ra, &b, &rc));
    }

    #[test]
    fn sharing_must_match() {
        let mut shared = Graph::new();
        let x = shared.object();
        let root = shared.array();
        shared.push(root, x).unwrap();
        shared.push(root, x).unwrap();

        let mut copied = Graph::new();
        let copy = copied.insert_json(&json!([{}, {}]));

        assert!(!graph_eq(&shared, &Value::Node(root), &copied, &copy));
        assert!(!graph_eq(&copied, &copy, &shared, &Value::Node(root)));
    }
}
