//! Replacer and reviver hooks.
//!
//! Both hooks follow the standard JSON serializer contract: they receive the
//! container being processed, the key of the field inside it and the field
//! value, and return the value to use instead. Returning `None` drops the
//! field.

use std::fmt;

use crate::graph::{Graph, NodeId, Value};

/// Position of a value inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key<'k> {
    /// The synthetic `""` key under which the root value is passed.
    Root,
    Field(&'k str),
    Index(usize),
}

impl fmt::Display for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Root => Ok(()),
            Key::Field(name) => f.write_str(name),
            Key::Index(i) => write!(f, "{i}"),
        }
    }
}

/// Owned [`Key`], for keys that outlive the borrow they were read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum OwnedKey {
    Field(String),
    Index(usize),
}

impl OwnedKey {
    pub(crate) fn as_key(&self) -> Key<'_> {
        match self {
            OwnedKey::Field(name) => Key::Field(name),
            OwnedKey::Index(i) => Key::Index(*i),
        }
    }
}

/// Container a hook is invoked on.
#[derive(Debug, Clone, Copy)]
pub struct Holder<'g> {
    graph: &'g Graph,
    node: Option<NodeId>,
}

impl<'g> Holder<'g> {
    pub(crate) fn root(graph: &'g Graph) -> Self {
        Self { graph, node: None }
    }

    pub(crate) fn node_of(graph: &'g Graph, node: NodeId) -> Self {
        Self {
            graph,
            node: Some(node),
        }
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// The container node, or `None` for the root call.
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn is_root(&self) -> bool {
        self.node.is_none()
    }
}

pub type HookFn<'a> = Box<dyn FnMut(Holder<'_>, Key<'_>, Value) -> Option<Value> + 'a>;

/// Encoder-side hook.
#[derive(Default)]
pub enum Replacer<'a> {
    #[default]
    Identity,
    Func(HookFn<'a>),
    /// Keeps only the listed object fields. Array elements and the root
    /// are not filtered.
    Keys(Vec<String>),
}

impl Replacer<'_> {
    pub(crate) fn apply(&mut self, holder: Holder<'_>, key: Key<'_>, value: Value) -> Option<Value> {
        match self {
            Replacer::Identity => Some(value),
            Replacer::Func(f) => f(holder, key, value),
            Replacer::Keys(keys) => match key {
                Key::Field(name) if !keys.iter().any(|k| k == name) => None,
                _ => Some(value),
            },
        }
    }
}

impl fmt::Debug for Replacer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Replacer::Identity => f.write_str("Identity"),
            Replacer::Func(_) => f.write_str("Func(..)"),
            Replacer::Keys(keys) => f.debug_tuple("Keys").field(keys).finish(),
        }
    }
}

/// Decoder-side hook.
#[derive(Default)]
pub enum Reviver<'a> {
    #[default]
    Identity,
    Func(HookFn<'a>),
}

impl Reviver<'_> {
    pub(crate) fn apply(&mut self, holder: Holder<'_>, key: Key<'_>, value: Value) -> Option<Value> {
        match self {
            Reviver::Identity => Some(value),
            Reviver::Func(f) => f(holder, key, value),
        }
    }
}

impl fmt::Debug for Reviver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reviver::Identity => f.write_str("Identity"),
            Reviver::Func(_) => f.write_str("Func(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_display_matches_serializer_keys() {
        assert_eq!(Key::Root.to_string(), "");
        assert_eq!(Key::Field("name").to_string(), "name");
        assert_eq!(Key::Index(7).to_string(), "7");
    }

    #[test]
    fn key_filter_only_drops_unlisted_fields() {
        let graph = Graph::new();
        let mut replacer = Replacer::Keys(vec!["keep".into()]);
        let holder = Holder::root(&graph);
        assert_eq!(
            replacer.apply(holder, Key::Field("keep"), Value::Bool(true)),
            Some(Value::Bool(true))
        );
        assert_eq!(replacer.apply(holder, Key::Field("drop"), Value::Null), None);
        assert_eq!(
            replacer.apply(holder, Key::Index(3), Value::Null),
            Some(Value::Null)
        );
        assert_eq!(
            replacer.apply(holder, Key::Root, Value::Null),
            Some(Value::Null)
        );
    }
}
