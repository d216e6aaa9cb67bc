use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::node::LineageNode;

/// Flat map from normalized identifier to node.
///
/// Serializes as a plain JSON object, which is the shape graph renderers
/// consume. Maps from several walks can be combined with
/// [`LineageGraph::merge`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineageGraph {
    nodes: BTreeMap<String, LineageNode>,
}

impl LineageGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a node. Returns `false` if the key was already present; the
    /// stored node is replaced either way.
    pub fn insert(&mut self, key: impl Into<String>, node: LineageNode) -> bool {
        self.nodes.insert(key.into(), node).is_none()
    }

    pub fn get(&self, key: &str) -> Option<&LineageNode> {
        self.nodes.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LineageNode)> {
        self.nodes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Union another walk's result into this one.
    pub fn merge(&mut self, other: LineageGraph) {
        self.nodes.extend(other.nodes);
    }

    /// Number of nodes of each kind.
    pub fn kind_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for node in self.nodes.values() {
            *counts.entry(node.kind()).or_insert(0) += 1;
        }
        counts
    }

    pub fn into_inner(self) -> BTreeMap<String, LineageNode> {
        self.nodes
    }
}

impl IntoIterator for LineageGraph {
    type Item = (String, LineageNode);
    type IntoIter = std::collections::btree_map::IntoIter<String, LineageNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}
