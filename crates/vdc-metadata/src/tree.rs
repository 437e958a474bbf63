//! XML-like element tree for VDC metadata (spec §4.5, §6, §9 "Metadata XML
//! tree with back-references").
//!
//! Nodes live in a single arena per tree and are addressed by [`NodeId`]
//! instead of raw pointers — the "explicit integer handle table" the spec
//! calls for in place of the original's pointer back-references.

use std::collections::BTreeMap;

/// A typed child element's payload. The original stores these as XML child
/// elements tagged `Long`/`Double`/`String` with the real tag carried as an
/// attribute; see [`crate::xml`].
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Long(Vec<i64>),
    Double(Vec<f64>),
    String(String),
}

/// Handle into a [`MetadataTree`]'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone)]
pub struct MetadataNode {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub elements: BTreeMap<String, Element>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

impl MetadataNode {
    fn new(tag: impl Into<String>, parent: Option<NodeId>) -> Self {
        Self {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            elements: BTreeMap::new(),
            children: Vec::new(),
            parent,
        }
    }
}

/// An arena of [`MetadataNode`]s rooted at `root`.
#[derive(Debug, Clone)]
pub struct MetadataTree {
    nodes: Vec<MetadataNode>,
    root: NodeId,
}

impl MetadataTree {
    pub fn new(root_tag: impl Into<String>) -> Self {
        Self { nodes: vec![MetadataNode::new(root_tag, None)], root: NodeId(0) }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &MetadataNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut MetadataNode {
        &mut self.nodes[id.0]
    }

    pub fn new_child(&mut self, parent: NodeId, tag: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(MetadataNode::new(tag, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn set_attr(&mut self, id: NodeId, key: impl Into<String>, value: impl Into<String>) {
        self.node_mut(id).attrs.insert(key.into(), value.into());
    }

    pub fn attr(&self, id: NodeId, key: &str) -> Option<&str> {
        self.node(id).attrs.get(key).map(String::as_str)
    }

    pub fn set_element_double(&mut self, id: NodeId, tag: impl Into<String>, values: Vec<f64>) {
        self.node_mut(id).elements.insert(tag.into(), Element::Double(values));
    }

    pub fn set_element_long(&mut self, id: NodeId, tag: impl Into<String>, values: Vec<i64>) {
        self.node_mut(id).elements.insert(tag.into(), Element::Long(values));
    }

    pub fn set_element_string(&mut self, id: NodeId, tag: impl Into<String>, value: impl Into<String>) {
        self.node_mut(id).elements.insert(tag.into(), Element::String(value.into()));
    }

    pub fn element_double(&self, id: NodeId, tag: &str) -> Option<&[f64]> {
        match self.node(id).elements.get(tag) {
            Some(Element::Double(v)) => Some(v),
            _ => None,
        }
    }

    pub fn element_long(&self, id: NodeId, tag: &str) -> Option<&[i64]> {
        match self.node(id).elements.get(tag) {
            Some(Element::Long(v)) => Some(v),
            _ => None,
        }
    }

    pub fn element_string(&self, id: NodeId, tag: &str) -> Option<&str> {
        match self.node(id).elements.get(tag) {
            Some(Element::String(v)) => Some(v),
            _ => None,
        }
    }

    pub fn find_child_by_tag(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.node(id).children.iter().copied().find(|&c| self.node(c).tag == tag)
    }

    /// Walk a sequence of node tags from `id`, returning the element stored
    /// on the final node under `leaf_tag`. Mirrors the original's
    /// `GetElementDouble(tagpath, ...)` path-addressed lookup.
    pub fn element_double_at_path(&self, id: NodeId, tagpath: &[&str], leaf_tag: &str) -> Option<&[f64]> {
        let node = self.walk(id, tagpath)?;
        self.element_double(node, leaf_tag)
    }

    fn walk(&self, mut id: NodeId, tagpath: &[&str]) -> Option<NodeId> {
        for tag in tagpath {
            id = self.find_child_by_tag(id, tag)?;
        }
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_elements_round_trip_by_tag() {
        let mut tree = MetadataTree::new("AMRTree");
        let root = tree.root();
        tree.set_attr(root, "version", "1");
        tree.set_element_long(root, "parent_table", vec![-1, 0, 0, 0, 0, 0, 0, 0, 0]);

        assert_eq!(tree.attr(root, "version"), Some("1"));
        assert_eq!(tree.element_long(root, "parent_table"), Some(&[-1, 0, 0, 0, 0, 0, 0, 0, 0][..]));
    }

    #[test]
    fn nested_children_addressable_by_tagpath() {
        let mut tree = MetadataTree::new("Root");
        let root = tree.root();
        let branch = tree.new_child(root, "Branch");
        tree.set_element_double(branch, "extents", vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);

        let found = tree.element_double_at_path(root, &["Branch"], "extents");
        assert_eq!(found, Some(&[0.0, 0.0, 0.0, 1.0, 1.0, 1.0][..]));
    }

    #[test]
    fn missing_element_returns_none() {
        let tree = MetadataTree::new("Root");
        assert_eq!(tree.element_double(tree.root(), "nope"), None);
    }
}
