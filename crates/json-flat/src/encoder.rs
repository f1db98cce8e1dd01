//! `FlatEncoder`: flattens a value graph into a record table.
//!
//! Slots are processed as a worklist: slot 0 holds the root, and every
//! composite or text value met while flattening a slot is given the next
//! free slot the first time its identity is seen. Composites are identified
//! by [`NodeId`], text by its content.

use std::collections::HashMap;

use serde_json::Map;

use crate::error::FlatError;
use crate::graph::{Graph, Node, NodeId, Value};
use crate::hooks::{Holder, Key, Replacer};
use crate::indent::Indent;
use crate::record::{format_token, join_slots, write_slot};

#[derive(Debug, Default)]
pub struct FlatEncoder<'a> {
    replacer: Replacer<'a>,
    space: Option<Indent>,
}

impl<'a> FlatEncoder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transforms or drops fields before they are flattened.
    pub fn with_replacer<F>(mut self, f: F) -> Self
    where
        F: FnMut(Holder<'_>, Key<'_>, Value) -> Option<Value> + 'a,
    {
        self.replacer = Replacer::Func(Box::new(f));
        self
    }

    /// Keeps only the named object fields.
    pub fn with_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.replacer = Replacer::Keys(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Pretty-prints each slot. The table layout is unaffected.
    pub fn with_space(mut self, space: impl Into<Indent>) -> Self {
        self.space = Some(space.into());
        self
    }

    /// Encodes `root` as `[slot0,slot1,...]` text.
    pub fn encode(&mut self, graph: &Graph, root: &Value) -> Result<String, FlatError> {
        let slots = self.flatten(graph, root)?;
        let indent = self.space.as_ref().and_then(Indent::unit);
        let texts = slots
            .iter()
            .map(|slot| write_slot(slot, indent.as_deref()))
            .collect::<Result<Vec<_>, _>>()?;
        let text = join_slots(&texts);
        tracing::debug!(slots = texts.len(), bytes = text.len(), "encoded record table");
        Ok(text)
    }

    /// Encodes `root` as a JSON array value instead of text, for embedding
    /// the record table in a larger message.
    pub fn encode_value(&mut self, graph: &Graph, root: &Value) -> Result<serde_json::Value, FlatError> {
        Ok(serde_json::Value::Array(self.flatten(graph, root)?))
    }

    fn flatten(&mut self, graph: &Graph, root: &Value) -> Result<Vec<serde_json::Value>, FlatError> {
        let root = self
            .replacer
            .apply(Holder::root(graph), Key::Root, root.clone())
            .unwrap_or(Value::Null);
        let mut table = SlotTable::default();
        table.slot_of(root);

        let mut out = Vec::new();
        let mut i = 0;
        // The table grows while it is walked.
        while i < table.values.len() {
            tracing::trace!(slot = i, "flattening slot");
            let slot = match table.values[i].clone() {
                Value::Node(id) => self.flatten_node(graph, id, &mut table)?,
                Value::Null => serde_json::Value::Null,
                Value::Bool(b) => serde_json::Value::Bool(b),
                Value::Number(n) => serde_json::Value::Number(n),
                Value::String(s) => serde_json::Value::String(s),
            };
            out.push(slot);
            i += 1;
        }
        Ok(out)
    }

    /// Writes one composite with each field replaced and then tokenized.
    /// The node itself is not passed to the replacer again: that happened
    /// when its parent's field was flattened.
    fn flatten_node(
        &mut self,
        graph: &Graph,
        id: NodeId,
        table: &mut SlotTable,
    ) -> Result<serde_json::Value, FlatError> {
        let node = graph.node(id).ok_or(FlatError::UnknownNode(id))?;
        let holder = Holder::node_of(graph, id);
        match node {
            Node::Object(map) => {
                let mut obj = Map::new();
                for (key, value) in map {
                    if let Some(after) = self.replacer.apply(holder, Key::Field(key), value.clone()) {
                        obj.insert(key.clone(), table.field(graph, after)?);
                    }
                }
                Ok(serde_json::Value::Object(obj))
            }
            Node::Array(items) => {
                let mut arr = Vec::with_capacity(items.len());
                for (index, value) in items.iter().enumerate() {
                    let field = match self.replacer.apply(holder, Key::Index(index), value.clone()) {
                        Some(after) => table.field(graph, after)?,
                        None => serde_json::Value::Null,
                    };
                    arr.push(field);
                }
                Ok(serde_json::Value::Array(arr))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Identity {
    Node(NodeId),
    Text(String),
}

/// Record table under construction plus the identity map into it.
#[derive(Debug, Default)]
struct SlotTable {
    values: Vec<Value>,
    known: HashMap<Identity, usize>,
}

impl SlotTable {
    /// Slot of `value`, appending it if its identity is new. Only the root
    /// may be a leaf other than text; it is appended without an identity.
    fn slot_of(&mut self, value: Value) -> usize {
        let identity = match &value {
            Value::Node(id) => Some(Identity::Node(*id)),
            Value::String(s) => Some(Identity::Text(s.clone())),
            _ => None,
        };
        if let Some(slot) = identity.as_ref().and_then(|id| self.known.get(id)) {
            return *slot;
        }
        let slot = self.values.len();
        self.values.push(value);
        if let Some(identity) = identity {
            self.known.insert(identity, slot);
        }
        slot
    }

    /// Field form of a replaced value: a token for composites and text,
    /// the value itself for other leaves.
    fn field(&mut self, graph: &Graph, value: Value) -> Result<serde_json::Value, FlatError> {
        match value {
            Value::Node(id) if !graph.contains(id) => Err(FlatError::UnknownNode(id)),
            Value::Node(_) | Value::String(_) => {
                Ok(serde_json::Value::String(format_token(self.slot_of(value))))
            }
            Value::Null => Ok(serde_json::Value::Null),
            Value::Bool(b) => Ok(serde_json::Value::Bool(b)),
            Value::Number(n) => Ok(serde_json::Value::Number(n)),
        }
    }
}
