use {
    indexmap::IndexMap,
    itertools::Itertools,
    serde_json::Value,
    tap::{Pipe, Tap},
};

/// Flat mapping from a dotted field path to the leaf value found there.
pub type FieldMap = IndexMap<String, Value>;

/// Field tree of a captured value.
///
/// Records keep their accessible fields in declaration order. An `Option`
/// becomes a [`Node::Reference`], anything else is a [`Node::Leaf`].
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Record(Vec<(&'static str, Node)>),
    Reference(Option<Box<Node>>),
    Leaf(Value),
}

impl Node {
    /// Follows a reference a single level. `None` for a null reference,
    /// any other node is returned as is.
    pub fn deref_once(self) -> Option<Node> {
        match self {
            Node::Reference(target) => target.map(|target| *target),
            other => Some(other),
        }
    }

    /// A record with no leaf anywhere below it, which flattens to nothing.
    pub fn is_empty_record(&self) -> bool {
        match self {
            Node::Record(fields) => fields.iter().all(|(_, node)| node.is_empty_record()),
            _ => false,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Node::Record(fields) => fields
                .into_iter()
                .map(|(label, node)| (label.to_string(), node.into_value()))
                .collect::<serde_json::Map<_, _>>()
                .pipe(Value::Object),
            Node::Reference(None) => Value::Null,
            Node::Reference(Some(target)) => target.into_value(),
            Node::Leaf(value) => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FieldPath(Vec<&'static str>);

impl FieldPath {
    pub fn join(&self, label: &'static str) -> Self {
        self.clone().tap_mut(|p| p.0.push(label))
    }

    /// Number of labels in the path, top level fields have depth 1.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn render(&self, separator: &str) -> String {
        self.0.iter().join(separator)
    }
}

pub mod capture;
pub mod flatten;
