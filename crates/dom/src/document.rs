use crate::error::DomError;
use crate::observer::{MutationRecord, ObserveOptions, ObserverId, ObserverRegistry};
use crate::types::{Node, NodeKey, NodeKind, NodeRecord};
use std::collections::HashMap;
use std::sync::Arc;

/// A live, mutable document tree shared by the host application and the
/// engines that annotate it.
///
/// Invariants:
/// - Keys are never reused; removed subtrees are freed.
/// - A node has at most one parent and operations never create cycles.
/// - Text edits happen in place, so a text node keeps its key across
///   `set_text` calls.
/// - Nodes created but never inserted (or detached) are live but not
///   connected.
pub struct Document {
    nodes: HashMap<NodeKey, NodeRecord>,
    next_key: u32,
    root: NodeKey,
    body: NodeKey,
    observers: ObserverRegistry,
}

impl Document {
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: HashMap::new(),
            next_key: 0,
            root: NodeKey::INVALID,
            body: NodeKey::INVALID,
            observers: ObserverRegistry::default(),
        };
        doc.root = doc.alloc(NodeKind::Document);
        doc.body = doc.create_element("body");
        let (root, body) = (doc.root, doc.body);
        doc.link_child(root, body, None);
        doc
    }

    pub fn root(&self) -> NodeKey {
        self.root
    }

    pub fn body(&self) -> NodeKey {
        self.body
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeKey {
        self.next_key += 1;
        let key = NodeKey(self.next_key);
        self.nodes.insert(key, NodeRecord::new(kind));
        key
    }

    // =========================================================================
    // Creation
    // =========================================================================

    pub fn create_element(&mut self, name: &str) -> NodeKey {
        self.alloc(NodeKind::Element {
            name: Arc::from(name.to_ascii_lowercase()),
            attributes: Vec::new(),
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeKey {
        self.alloc(NodeKind::Text {
            text: text.to_string(),
        })
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Append `child` to `parent`, moving it out of its current parent first.
    pub fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        self.unlink(child);
        self.link_child(parent, child, None);
        Ok(())
    }

    /// Insert `child` into `parent` directly before `before`.
    pub fn insert_before(
        &mut self,
        parent: NodeKey,
        child: NodeKey,
        before: NodeKey,
    ) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        self.ensure_live(before)?;
        if child == before {
            return Ok(());
        }
        if self.nodes[&before].parent != Some(parent) {
            return Err(DomError::InvalidSibling { parent, before });
        }
        self.unlink(child);
        self.link_child(parent, child, Some(before));
        Ok(())
    }

    /// Take `key` out of its parent but keep the subtree alive so it can be
    /// re-inserted later.
    pub fn detach(&mut self, key: NodeKey) -> Result<(), DomError> {
        self.ensure_live(key)?;
        if key == self.root {
            return Err(DomError::RootImmutable);
        }
        self.unlink(key);
        Ok(())
    }

    /// Detach `key` and free its entire subtree.
    pub fn remove(&mut self, key: NodeKey) -> Result<(), DomError> {
        self.detach(key)?;
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            if let Some(record) = self.nodes.remove(&current) {
                stack.extend(record.children);
            }
        }
        Ok(())
    }

    fn check_insert(&self, parent: NodeKey, child: NodeKey) -> Result<(), DomError> {
        self.ensure_live(parent)?;
        self.ensure_live(child)?;
        if child == self.root {
            return Err(DomError::RootImmutable);
        }
        if !self.nodes[&parent].allows_children() {
            return Err(DomError::InvalidParent(parent));
        }
        if parent == child || self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::CycleDetected { parent, child });
        }
        Ok(())
    }

    fn unlink(&mut self, key: NodeKey) {
        let Some(parent) = self.nodes.get_mut(&key).and_then(|r| r.parent.take()) else {
            return;
        };
        if let Some(record) = self.nodes.get_mut(&parent) {
            record.children.retain(|k| *k != key);
        }
        self.notify(MutationRecord::ChildList {
            target: parent,
            added: Vec::new(),
            removed: vec![key],
        });
    }

    fn link_child(&mut self, parent: NodeKey, child: NodeKey, before: Option<NodeKey>) {
        let siblings = &mut self
            .nodes
            .get_mut(&parent)
            .expect("parent checked live")
            .children;
        match before.and_then(|b| siblings.iter().position(|k| *k == b)) {
            Some(pos) => siblings.insert(pos, child),
            None => siblings.push(child),
        }
        if let Some(record) = self.nodes.get_mut(&child) {
            record.parent = Some(parent);
        }
        self.notify(MutationRecord::ChildList {
            target: parent,
            added: vec![child],
            removed: Vec::new(),
        });
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// Replace the data of a text node in place.
    pub fn set_text(&mut self, key: NodeKey, text: &str) -> Result<(), DomError> {
        let record = self.nodes.get_mut(&key).ok_or(DomError::MissingKey(key))?;
        match &mut record.kind {
            NodeKind::Text { text: existing } => {
                existing.clear();
                existing.push_str(text);
            }
            _ => return Err(DomError::WrongNodeKind(key)),
        }
        self.notify(MutationRecord::CharacterData { target: key });
        Ok(())
    }

    /// Set the text content of an element.
    ///
    /// When the element holds exactly one text child that node is edited in
    /// place; otherwise all children are removed and a single text node is
    /// appended.
    pub fn set_text_content(&mut self, key: NodeKey, text: &str) -> Result<(), DomError> {
        let record = self.nodes.get(&key).ok_or(DomError::MissingKey(key))?;
        match record.kind {
            NodeKind::Text { .. } => return self.set_text(key, text),
            NodeKind::Document => return Err(DomError::WrongNodeKind(key)),
            NodeKind::Element { .. } => {}
        }
        if let [only] = record.children[..]
            && self.is_text(only)
        {
            return self.set_text(only, text);
        }
        for child in record.children.clone() {
            self.remove(child)?;
        }
        let node = self.create_text(text);
        self.append_child(key, node)
    }

    pub fn set_attribute(&mut self, key: NodeKey, name: &str, value: &str) -> Result<(), DomError> {
        let record = self.nodes.get_mut(&key).ok_or(DomError::MissingKey(key))?;
        let NodeKind::Element { attributes, .. } = &mut record.kind else {
            return Err(DomError::WrongNodeKind(key));
        };
        match attributes.iter_mut().find(|(k, _)| &**k == name) {
            Some((_, v)) => {
                v.clear();
                v.push_str(value);
            }
            None => attributes.push((Arc::from(name), value.to_string())),
        }
        self.notify(MutationRecord::Attributes {
            target: key,
            name: name.to_string(),
        });
        Ok(())
    }

    pub fn remove_attribute(&mut self, key: NodeKey, name: &str) -> Result<(), DomError> {
        let record = self.nodes.get_mut(&key).ok_or(DomError::MissingKey(key))?;
        let NodeKind::Element { attributes, .. } = &mut record.kind else {
            return Err(DomError::WrongNodeKind(key));
        };
        let before = attributes.len();
        attributes.retain(|(k, _)| &**k != name);
        if attributes.len() != before {
            self.notify(MutationRecord::Attributes {
                target: key,
                name: name.to_string(),
            });
        }
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Whether `key` still refers to a node owned by this document.
    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(&key)
    }

    /// Whether `key` is live and reachable from the document root.
    pub fn is_connected(&self, key: NodeKey) -> bool {
        let mut current = Some(key);
        while let Some(k) = current {
            if k == self.root {
                return true;
            }
            current = self.nodes.get(&k).and_then(|r| r.parent);
        }
        false
    }

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(&key).and_then(|r| r.parent)
    }

    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        self.nodes.get(&key).map_or(&[], |r| &r.children)
    }

    pub fn is_element(&self, key: NodeKey) -> bool {
        matches!(
            self.nodes.get(&key).map(|r| &r.kind),
            Some(NodeKind::Element { .. })
        )
    }

    pub fn is_text(&self, key: NodeKey) -> bool {
        matches!(
            self.nodes.get(&key).map(|r| &r.kind),
            Some(NodeKind::Text { .. })
        )
    }

    pub fn tag_name(&self, key: NodeKey) -> Option<&str> {
        match self.nodes.get(&key).map(|r| &r.kind) {
            Some(NodeKind::Element { name, .. }) => Some(name),
            _ => None,
        }
    }

    /// Data of a text node.
    pub fn text(&self, key: NodeKey) -> Option<&str> {
        match self.nodes.get(&key).map(|r| &r.kind) {
            Some(NodeKind::Text { text }) => Some(text),
            _ => None,
        }
    }

    pub fn attr(&self, key: NodeKey, name: &str) -> Option<&str> {
        match self.nodes.get(&key).map(|r| &r.kind) {
            Some(NodeKind::Element { attributes, .. }) => attributes
                .iter()
                .find(|(k, _)| &**k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn classes(&self, key: NodeKey) -> impl Iterator<Item = &str> {
        self.attr(key, "class").unwrap_or("").split_ascii_whitespace()
    }

    pub fn has_class(&self, key: NodeKey, class: &str) -> bool {
        self.classes(key).any(|c| c == class)
    }

    /// Concatenated data of all descendant text nodes, in document order.
    pub fn text_content(&self, key: NodeKey) -> String {
        if let Some(text) = self.text(key) {
            return text.to_string();
        }
        let mut out = String::new();
        for node in self.text_nodes(key) {
            if let Some(text) = self.text(node) {
                out.push_str(text);
            }
        }
        out
    }

    pub(crate) fn record(&self, key: NodeKey) -> Option<&NodeRecord> {
        self.nodes.get(&key)
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeKey, node: NodeKey) -> bool {
        let mut current = Some(node);
        while let Some(k) = current {
            if k == ancestor {
                return true;
            }
            current = self.nodes.get(&k).and_then(|r| r.parent);
        }
        false
    }

    // =========================================================================
    // Observation
    // =========================================================================

    pub fn observe(&mut self, target: NodeKey, options: ObserveOptions) -> ObserverId {
        let id = self.observers.register(target, options);
        log::trace!(target: "dom.observer", "observer {id:?} on {target:?} ({options:?})");
        id
    }

    pub fn disconnect(&mut self, id: ObserverId) -> bool {
        let removed = self.observers.disconnect(id);
        if removed {
            log::trace!(target: "dom.observer", "observer {id:?} disconnected");
        }
        removed
    }

    pub fn take_records(&mut self, id: ObserverId) -> Vec<MutationRecord> {
        self.observers.take(id)
    }

    pub fn pending_records(&self, id: ObserverId) -> usize {
        self.observers.pending(id)
    }

    fn notify(&mut self, record: MutationRecord) {
        if self.observers.is_empty() {
            return;
        }
        let mut ancestors = Vec::new();
        let mut current = Some(record.target());
        while let Some(k) = current {
            ancestors.push(k);
            current = self.nodes.get(&k).and_then(|r| r.parent);
        }
        self.observers.deliver(record, &ancestors);
    }

    // =========================================================================
    // Materialization
    // =========================================================================

    pub fn materialize(&self, key: NodeKey) -> Result<Node, DomError> {
        let record = self.nodes.get(&key).ok_or(DomError::MissingKey(key))?;
        let children = record
            .children
            .iter()
            .map(|child| self.materialize(*child))
            .collect::<Result<Vec<_>, _>>()?;
        let node = match &record.kind {
            NodeKind::Document => Node::Document { key, children },
            NodeKind::Element { name, attributes } => Node::Element {
                key,
                name: Arc::clone(name),
                attributes: attributes.clone(),
                children,
            },
            NodeKind::Text { text } => Node::Text {
                key,
                text: text.clone(),
            },
        };
        Ok(node)
    }

    fn ensure_live(&self, key: NodeKey) -> Result<(), DomError> {
        if self.nodes.contains_key(&key) {
            Ok(())
        } else {
            Err(DomError::MissingKey(key))
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
