//! Cycle-tolerant JSON codec.
//!
//! Plain JSON can only describe trees. This crate encodes an arbitrary value
//! graph, including shared and self-referential composites, as a flat
//! record table: a JSON array whose slot 0 is the root and in which every
//! composite or text field is replaced by the decimal index of the slot
//! holding it. Decoding rebuilds the graph so that each slot becomes exactly
//! one node, which preserves both sharing and cycles.
//!
//! # Example
//!
//! ```
//! use json_flat::{decode, encode, Graph, Value};
//!
//! let mut graph = Graph::new();
//! let a = graph.object();
//! graph.set(a, "name", "a").unwrap();
//! graph.set(a, "self", a).unwrap();
//!
//! let text = encode(&graph, &Value::Node(a)).unwrap();
//! assert_eq!(text, r#"[{"name":"1","self":"0"},"a"]"#);
//!
//! let doc = decode(&text).unwrap();
//! let b = doc.root_node().unwrap();
//! assert_eq!(doc.graph.get(b, "self"), Some(&Value::Node(b)));
//! assert_eq!(doc.graph.get(b, "name"), Some(&Value::from("a")));
//! ```
//!
//! # Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`graph`] | [`Graph`] arena, [`Node`], [`Value`], [`Document`] |
//! | [`encoder`] | [`FlatEncoder`] |
//! | [`decoder`] | [`FlatDecoder`] |
//! | [`hooks`] | replacer / reviver: [`Key`], [`Holder`] |
//! | [`indent`] | [`Indent`] |
//! | [`cli`] | logic behind `flat-pack` / `flat-unpack` |

mod equal;
mod error;
mod record;

pub mod cli;
pub mod decoder;
pub mod encoder;
pub mod graph;
pub mod hooks;
pub mod indent;

pub use decoder::FlatDecoder;
pub use encoder::FlatEncoder;
pub use equal::graph_eq;
pub use error::FlatError;
pub use graph::{Document, Graph, Node, NodeId, Value, MAX_TREE_DEPTH};
pub use hooks::{Holder, Key};
pub use indent::Indent;

/// Encodes `root` with no replacer and compact slots.
pub fn encode(graph: &Graph, root: &Value) -> Result<String, FlatError> {
    FlatEncoder::new().encode(graph, root)
}

/// Decodes a record table with no reviver.
pub fn decode(text: &str) -> Result<Document, FlatError> {
    FlatDecoder::new().decode(text)
}
