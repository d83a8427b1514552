use crate::document::Document;
use crate::types::{NodeKey, NodeKind};

/// Pre-order walk over the descendants of a node, excluding the node itself.
///
/// The walk is lazy: callers that stop early never visit the rest of the
/// subtree.
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeKey>,
}

impl<'a> Descendants<'a> {
    fn new(doc: &'a Document, root: NodeKey) -> Self {
        let mut stack = Vec::new();
        if let Some(record) = doc.record(root) {
            stack.extend(record.children.iter().rev().copied());
        }
        Self { doc, stack }
    }
}

impl Iterator for Descendants<'_> {
    type Item = NodeKey;

    fn next(&mut self) -> Option<NodeKey> {
        let key = self.stack.pop()?;
        if let Some(record) = self.doc.record(key) {
            self.stack.extend(record.children.iter().rev().copied());
        }
        Some(key)
    }
}

impl Document {
    pub fn descendants(&self, root: NodeKey) -> Descendants<'_> {
        Descendants::new(self, root)
    }

    /// Text nodes under `root` in document order.
    pub fn text_nodes(&self, root: NodeKey) -> impl Iterator<Item = NodeKey> + '_ {
        self.descendants(root)
            .filter(|k| matches!(self.record(*k).map(|r| &r.kind), Some(NodeKind::Text { .. })))
    }

    pub fn find_first(&self, root: NodeKey, mut pred: impl FnMut(&Document, NodeKey) -> bool) -> Option<NodeKey> {
        self.descendants(root).find(|k| pred(self, *k))
    }

    pub fn find_all(&self, root: NodeKey, mut pred: impl FnMut(&Document, NodeKey) -> bool) -> Vec<NodeKey> {
        self.descendants(root).filter(|k| pred(self, *k)).collect()
    }

    /// Elements under `root` carrying `class`, in document order.
    pub fn elements_with_class(&self, root: NodeKey, class: &str) -> Vec<NodeKey> {
        self.find_all(root, |doc, k| doc.has_class(k, class))
    }

    pub fn first_with_class(&self, root: NodeKey, class: &str) -> Option<NodeKey> {
        self.find_first(root, |doc, k| doc.has_class(k, class))
    }

    pub fn element_by_id(&self, id: &str) -> Option<NodeKey> {
        self.find_first(self.root(), |doc, k| doc.attr(k, "id") == Some(id))
    }

    /// Nearest inclusive ancestor of `key` satisfying `pred`.
    pub fn closest(&self, key: NodeKey, mut pred: impl FnMut(&Document, NodeKey) -> bool) -> Option<NodeKey> {
        let mut current = Some(key);
        while let Some(k) = current {
            if pred(self, k) {
                return Some(k);
            }
            current = self.parent(k);
        }
        None
    }
}
