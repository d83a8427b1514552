use std::sync::Arc;

/// Arena key of a node inside a [`Document`](crate::Document).
///
/// Keys are allocated monotonically and never reused, so a key held after
/// its node was removed simply stops resolving instead of aliasing a newer
/// node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(pub u32);

impl NodeKey {
    /// Reserved sentinel; never handed out by a document.
    pub const INVALID: NodeKey = NodeKey(0);
}

/// Owned, materialized view of a subtree.
///
/// The live document is an arena; this tree form exists for snapshots and
/// structural comparisons in tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Document {
        key: NodeKey,
        children: Vec<Node>,
    },
    Element {
        key: NodeKey,
        name: Arc<str>,
        attributes: Vec<(Arc<str>, String)>,
        children: Vec<Node>,
    },
    Text {
        key: NodeKey,
        text: String,
    },
}

impl Node {
    pub fn key(&self) -> NodeKey {
        match self {
            Node::Document { key, .. } => *key,
            Node::Element { key, .. } => *key,
            Node::Text { key, .. } => *key,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Document { children, .. } | Node::Element { children, .. } => children,
            _ => &[],
        }
    }
}

pub(crate) enum NodeKind {
    Document,
    Element {
        name: Arc<str>,
        attributes: Vec<(Arc<str>, String)>,
    },
    Text {
        text: String,
    },
}

pub(crate) struct NodeRecord {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,
}

impl NodeRecord {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    pub(crate) fn allows_children(&self) -> bool {
        matches!(self.kind, NodeKind::Document | NodeKind::Element { .. })
    }
}
