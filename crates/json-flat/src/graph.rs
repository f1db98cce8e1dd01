//! Value graph arena.
//!
//! Composites live in a [`Graph`] and are addressed by [`NodeId`] handles
//! instead of owned pointers, so a node may be reachable from several
//! parents, or from itself, without reference counting. Leaves are stored
//! inline in [`Value`].
//!
//! ```
//! use json_flat::{Graph, Value};
//!
//! let mut graph = Graph::new();
//! let a = graph.object();
//! graph.set(a, "self", Value::Node(a)).unwrap();
//! assert_eq!(graph.get(a, "self"), Some(&Value::Node(a)));
//! ```

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use serde_json::{Map, Number};

use crate::error::FlatError;

/// Deepest nesting [`Graph::to_json`] will write. Matches the recursion limit
/// of `serde_json`'s parser, so anything materialized can be read back.
pub const MAX_TREE_DEPTH: usize = 128;

/// Handle of a composite inside a [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A field or element value: either a leaf or a handle to a composite.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    /// Text leaf. Text is deduplicated by content when encoded.
    String(String),
    Node(NodeId),
}

impl Value {
    pub fn is_leaf(&self) -> bool {
        !matches!(self, Value::Node(_))
    }

    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Value::Node(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n.into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<NodeId> for Value {
    fn from(id: NodeId) -> Self {
        Value::Node(id)
    }
}

impl TryFrom<f64> for Value {
    type Error = FlatError;

    /// NaN and the infinities have no JSON form.
    fn try_from(f: f64) -> Result<Self, Self::Error> {
        Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| FlatError::Unserializable(f.to_string()))
    }
}

/// A composite value.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Object(IndexMap<String, Value>),
    Array(Vec<Value>),
}

impl Node {
    pub fn len(&self) -> usize {
        match self {
            Node::Object(map) => map.len(),
            Node::Array(arr) => arr.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Append-only arena of composites.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Allocates an empty object.
    pub fn object(&mut self) -> NodeId {
        self.insert(Node::Object(IndexMap::new()))
    }

    /// Allocates an empty array.
    pub fn array(&mut self) -> NodeId {
        self.insert(Node::Array(Vec::new()))
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    /// Field `key` of object `id`.
    pub fn get(&self, id: NodeId, key: &str) -> Option<&Value> {
        match self.node(id)? {
            Node::Object(map) => map.get(key),
            Node::Array(_) => None,
        }
    }

    /// Element `index` of array `id`.
    pub fn at(&self, id: NodeId, index: usize) -> Option<&Value> {
        match self.node(id)? {
            Node::Array(arr) => arr.get(index),
            Node::Object(_) => None,
        }
    }

    /// Sets a field on an object, returning the previous value.
    pub fn set(
        &mut self,
        id: NodeId,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, FlatError> {
        match self.node_mut(id) {
            Some(Node::Object(map)) => Ok(map.insert(key.into(), value.into())),
            Some(Node::Array(_)) => Err(FlatError::NotAnObject(id)),
            None => Err(FlatError::UnknownNode(id)),
        }
    }

    /// Appends an element to an array.
    pub fn push(&mut self, id: NodeId, value: impl Into<Value>) -> Result<(), FlatError> {
        match self.node_mut(id) {
            Some(Node::Array(arr)) => {
                arr.push(value.into());
                Ok(())
            }
            Some(Node::Object(_)) => Err(FlatError::NotAnArray(id)),
            None => Err(FlatError::UnknownNode(id)),
        }
    }

    /// Imports a JSON tree. Every composite becomes a fresh node, so the
    /// result shares nothing.
    pub fn insert_json(&mut self, json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.clone()),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                let values = items.iter().map(|item| self.insert_json(item)).collect();
                Value::Node(self.insert(Node::Array(values)))
            }
            serde_json::Value::Object(obj) => {
                let fields = obj
                    .iter()
                    .map(|(k, v)| (k.clone(), self.insert_json(v)))
                    .collect();
                Value::Node(self.insert(Node::Object(fields)))
            }
        }
    }

    /// Materializes `value` as a JSON tree.
    ///
    /// Shared nodes are written once per path that reaches them. A node that
    /// reaches itself fails with [`FlatError::Cycle`], and nesting beyond
    /// [`MAX_TREE_DEPTH`] fails with [`FlatError::TooDeep`].
    pub fn to_json(&self, value: &Value) -> Result<serde_json::Value, FlatError> {
        let mut path = HashSet::new();
        self.write_json(value, &mut path)
    }

    fn write_json(
        &self,
        value: &Value,
        path: &mut HashSet<NodeId>,
    ) -> Result<serde_json::Value, FlatError> {
        let id = match value {
            Value::Null => return Ok(serde_json::Value::Null),
            Value::Bool(b) => return Ok(serde_json::Value::Bool(*b)),
            Value::Number(n) => return Ok(serde_json::Value::Number(n.clone())),
            Value::String(s) => return Ok(serde_json::Value::String(s.clone())),
            Value::Node(id) => *id,
        };
        let node = self.node(id).ok_or(FlatError::UnknownNode(id))?;
        if path.contains(&id) {
            return Err(FlatError::Cycle(id));
        }
        if path.len() >= MAX_TREE_DEPTH {
            return Err(FlatError::TooDeep(MAX_TREE_DEPTH));
        }
        path.insert(id);
        let json = match node {
            Node::Array(arr) => serde_json::Value::Array(
                arr.iter()
                    .map(|item| self.write_json(item, path))
                    .collect::<Result<_, _>>()?,
            ),
            Node::Object(map) => {
                let mut obj = Map::new();
                for (key, item) in map {
                    obj.insert(key.clone(), self.write_json(item, path)?);
                }
                serde_json::Value::Object(obj)
            }
        };
        path.remove(&id);
        Ok(json)
    }
}

/// A decoded value graph together with its root.
#[derive(Debug, Clone)]
pub struct Document {
    pub graph: Graph,
    pub root: Value,
}

impl Document {
    pub fn to_json(&self) -> Result<serde_json::Value, FlatError> {
        self.graph.to_json(&self.root)
    }

    /// Root node handle, when the root is a composite.
    pub fn root_node(&self) -> Option<NodeId> {
        self.root.as_node()
    }
}
