//! `FlatDecoder`: rebuilds a value graph from a record table.
//!
//! Every composite slot becomes exactly one [`Node`]. A node is allocated
//! the first time a field references its slot, before any of its own
//! fields are read, so later references (shared siblings, back edges to an
//! ancestor, the node itself) resolve to that same handle.
//!
//! Each node is filled in two passes. The first pass assigns leaf fields
//! and references to slots that already have a node, and leaves a `null`
//! placeholder for every composite seen for the first time. The second pass
//! fills those placeholders in order, each once its own subtree is done.
//! The passes run on an explicit frame stack rather than recursion, so the
//! depth of the graph is not bounded by the call stack.

use indexmap::IndexMap;

use crate::error::FlatError;
use crate::graph::{Document, Graph, Node, NodeId, Value};
use crate::hooks::{Holder, Key, OwnedKey, Reviver};
use crate::record::{parse_table, Field, Record};

#[derive(Debug, Default)]
pub struct FlatDecoder<'a> {
    reviver: Reviver<'a>,
}

impl<'a> FlatDecoder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transforms or drops values as they are rebuilt, innermost first.
    pub fn with_reviver<F>(mut self, f: F) -> Self
    where
        F: FnMut(Holder<'_>, Key<'_>, Value) -> Option<Value> + 'a,
    {
        self.reviver = Reviver::Func(Box::new(f));
        self
    }

    pub fn decode(&mut self, text: &str) -> Result<Document, FlatError> {
        let envelope: serde_json::Value = serde_json::from_str(text).map_err(FlatError::Parse)?;
        self.rebuild(parse_table(envelope)?)
    }

    /// Decodes a record table that is already a JSON array value.
    pub fn decode_value(&mut self, envelope: serde_json::Value) -> Result<Document, FlatError> {
        self.rebuild(parse_table(envelope)?)
    }

    fn rebuild(&mut self, table: Vec<Record>) -> Result<Document, FlatError> {
        let mut revival = Revival {
            table: &table,
            graph: Graph::new(),
            nodes: vec![None; table.len()],
        };
        let root = revival.run(&mut self.reviver);
        tracing::debug!(
            slots = table.len(),
            nodes = revival.graph.len(),
            "decoded record table"
        );
        Ok(Document {
            graph: revival.graph,
            root,
        })
    }
}

/// Outcome of looking up a referenced slot.
enum Claim {
    /// First visit of a composite slot: a node was just allocated for it.
    Fresh(NodeId),
    /// A leaf slot, or a composite whose node already exists.
    Seen(Value),
}

/// A composite fill that still waits for its deferred fields.
struct Frame {
    node: NodeId,
    deferred: Vec<Pending>,
    next: usize,
}

struct Pending {
    key: OwnedKey,
    slot: usize,
    node: NodeId,
}

struct Revival<'t> {
    table: &'t [Record],
    graph: Graph,
    /// Node of each visited composite slot; doubles as the visited set.
    nodes: Vec<Option<NodeId>>,
}

impl Revival<'_> {
    fn run(&mut self, reviver: &mut Reviver<'_>) -> Value {
        let root = match self.claim(0) {
            Claim::Seen(leaf) => {
                return reviver
                    .apply(Holder::root(&self.graph), Key::Root, leaf)
                    .unwrap_or(Value::Null);
            }
            Claim::Fresh(root) => root,
        };

        let mut stack = vec![Frame {
            node: root,
            deferred: self.first_pass(reviver, 0, root),
            next: 0,
        }];
        while let Some(frame) = stack.last() {
            if let Some(pending) = frame.deferred.get(frame.next) {
                let (slot, node) = (pending.slot, pending.node);
                let deferred = self.first_pass(reviver, slot, node);
                stack.push(Frame {
                    node,
                    deferred,
                    next: 0,
                });
                continue;
            }
            let done = frame.node;
            stack.pop();
            if let Some(parent) = stack.last_mut() {
                let key = &parent.deferred[parent.next].key;
                self.assign(reviver, parent.node, key.as_key(), Value::Node(done));
                parent.next += 1;
            }
        }

        reviver
            .apply(Holder::root(&self.graph), Key::Root, Value::Node(root))
            .unwrap_or(Value::Null)
    }

    fn claim(&mut self, slot: usize) -> Claim {
        if let Some(node) = self.nodes[slot] {
            return Claim::Seen(Value::Node(node));
        }
        let node = match &self.table[slot] {
            Record::Leaf(value) => return Claim::Seen(value.clone()),
            Record::Object(fields) => Node::Object(IndexMap::with_capacity(fields.len())),
            Record::Array(items) => Node::Array(Vec::with_capacity(items.len())),
        };
        let id = self.graph.insert(node);
        self.nodes[slot] = Some(id);
        Claim::Fresh(id)
    }

    /// Assigns every field of `slot` that can be resolved now and returns
    /// the ones that must wait for their own subtree.
    fn first_pass(&mut self, reviver: &mut Reviver<'_>, slot: usize, node: NodeId) -> Vec<Pending> {
        let table = self.table;
        let mut deferred = Vec::new();
        match &table[slot] {
            Record::Leaf(_) => {}
            Record::Object(fields) => {
                for (name, field) in fields {
                    let key = OwnedKey::Field(name.clone());
                    deferred.extend(self.visit(reviver, node, key, field));
                }
            }
            Record::Array(items) => {
                for (index, field) in items.iter().enumerate() {
                    deferred.extend(self.visit(reviver, node, OwnedKey::Index(index), field));
                }
            }
        }
        deferred
    }

    fn visit(
        &mut self,
        reviver: &mut Reviver<'_>,
        node: NodeId,
        key: OwnedKey,
        field: &Field,
    ) -> Option<Pending> {
        let value = match field {
            Field::Leaf(value) => value.clone(),
            Field::Ref(target) => match self.claim(*target) {
                Claim::Seen(value) => value,
                Claim::Fresh(child) => {
                    self.place(node, &key, Value::Null);
                    return Some(Pending {
                        key,
                        slot: *target,
                        node: child,
                    });
                }
            },
        };
        self.assign(reviver, node, key.as_key(), value);
        None
    }

    fn assign(&mut self, reviver: &mut Reviver<'_>, node: NodeId, key: Key<'_>, value: Value) {
        let revived = reviver.apply(Holder::node_of(&self.graph, node), key, value);
        match (self.graph.node_mut(node), key, revived) {
            (Some(Node::Object(map)), Key::Field(name), Some(value)) => {
                map.insert(name.to_owned(), value);
            }
            (Some(Node::Object(map)), Key::Field(name), None) => {
                map.shift_remove(name);
            }
            (Some(Node::Array(items)), Key::Index(index), revived) => {
                let value = revived.unwrap_or(Value::Null);
                match items.get_mut(index) {
                    Some(slot) => *slot = value,
                    None => items.push(value),
                }
            }
            _ => {}
        }
    }

    /// Writes a placeholder without consulting the reviver.
    fn place(&mut self, node: NodeId, key: &OwnedKey, value: Value) {
        match (self.graph.node_mut(node), key) {
            (Some(Node::Object(map)), OwnedKey::Field(name)) => {
                map.insert(name.clone(), value);
            }
            (Some(Node::Array(items)), OwnedKey::Index(_)) => items.push(value),
            _ => {}
        }
    }
}
