use core_types::RowType;
use dom::{Document, NodeKey};

/// Class names and attributes of the host page the engine relies on.
///
/// Rows are `.msg` elements containing a `.from .user` sender label and a
/// `.content` body; an ancestor carries the active channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostSchema {
    pub chat_root_id: &'static str,
    pub row_class: &'static str,
    pub row_type_attr: &'static str,
    pub row_id_attr: &'static str,
    pub sender_wrapper_class: &'static str,
    pub sender_class: &'static str,
    pub content_class: &'static str,
    pub channel_attr: &'static str,
    pub userlist_class: &'static str,
    pub user_class: &'static str,
    pub user_name_attr: &'static str,
    pub color_class_prefix: &'static str,
    /// Elements with a class starting with one of these are never pruned
    /// from a content subtree, even when empty.
    pub protected_class_prefixes: &'static [&'static str],
}

impl HostSchema {
    pub const THELOUNGE: HostSchema = HostSchema {
        chat_root_id: "chat",
        row_class: "msg",
        row_type_attr: "data-type",
        row_id_attr: "id",
        sender_wrapper_class: "from",
        sender_class: "user",
        content_class: "content",
        channel_attr: "data-current-channel",
        userlist_class: "userlist",
        user_class: "user",
        user_name_attr: "data-name",
        color_class_prefix: "color-",
        protected_class_prefixes: &["preview-size", "toggle-button", "user", "irc-fg", "irc-bg"],
    };

    pub fn chat_root(&self, doc: &Document) -> Option<NodeKey> {
        doc.element_by_id(self.chat_root_id)
    }

    pub fn is_row(&self, doc: &Document, key: NodeKey) -> bool {
        doc.has_class(key, self.row_class)
    }

    /// Nearest row containing `key`, `key` included.
    pub fn row_of(&self, doc: &Document, key: NodeKey) -> Option<NodeKey> {
        doc.closest(key, |d, k| self.is_row(d, k))
    }

    /// `node` itself when it is a row, otherwise every row below it.
    pub fn rows_in(&self, doc: &Document, node: NodeKey) -> Vec<NodeKey> {
        if self.is_row(doc, node) {
            return vec![node];
        }
        doc.elements_with_class(node, self.row_class)
    }

    pub fn sender_of(&self, doc: &Document, row: NodeKey) -> Option<NodeKey> {
        let wrapper = doc.first_with_class(row, self.sender_wrapper_class)?;
        doc.first_with_class(wrapper, self.sender_class)
    }

    pub fn content_of(&self, doc: &Document, row: NodeKey) -> Option<NodeKey> {
        doc.first_with_class(row, self.content_class)
    }

    /// Channel of the nearest ancestor carrying one, or the empty string.
    pub fn channel_of(&self, doc: &Document, row: NodeKey) -> String {
        doc.closest(row, |d, k| d.attr(k, self.channel_attr).is_some())
            .and_then(|k| doc.attr(k, self.channel_attr))
            .unwrap_or("")
            .to_string()
    }

    pub fn row_type(&self, doc: &Document, row: NodeKey) -> RowType {
        RowType::from_attr(doc.attr(row, self.row_type_attr))
    }

    pub fn row_id<'a>(&self, doc: &'a Document, row: NodeKey) -> Option<&'a str> {
        doc.attr(row, self.row_id_attr).filter(|id| !id.is_empty())
    }

    pub fn is_protected(&self, doc: &Document, key: NodeKey) -> bool {
        doc.classes(key).any(|class| {
            self.protected_class_prefixes
                .iter()
                .any(|prefix| class.starts_with(prefix))
        })
    }

    pub fn color_class<'a>(&self, doc: &'a Document, key: NodeKey) -> Option<&'a str> {
        doc.classes(key)
            .find(|class| class.starts_with(self.color_class_prefix))
    }
}

impl Default for HostSchema {
    fn default() -> Self {
        Self::THELOUNGE
    }
}
