//! A scripted host that renders chat the way TheLounge does.
//!
//! ```text
//! body
//!   div#chat
//!     div.chat-view[data-current-channel]
//!       div.messages
//!         div#msg-N.msg[data-type]
//!           span.time
//!           span.from > span.user.color-N[data-name]
//!           span.content
//!       aside.userlist > span.user.color-N[data-name] ...
//! ```

use crate::escape_text;
use core_types::{Millis, SharedUserList, UserList};
use dom::{Document, DomSnapshot, DomSnapshotOptions, El, NodeKey};
use std::cell::RefCell;
use std::rc::Rc;

/// TheLounge's nick color: sum of char codes, 32 buckets.
pub fn color_for(nick: &str) -> String {
    let hash: u32 = nick.encode_utf16().map(u32::from).sum();
    format!("color-{}", hash % 32 + 1)
}

pub struct LoungeHost {
    pub doc: Document,
    pub users: SharedUserList,
    chat: Option<NodeKey>,
    view: Option<NodeKey>,
    messages: Option<NodeKey>,
    userlist: Option<NodeKey>,
    channel: String,
    next_msg_id: u32,
}

impl LoungeHost {
    /// A page with the chat already rendered.
    pub fn new(channel: &str) -> Self {
        let mut host = Self::without_chat(channel);
        host.mount_chat();
        host
    }

    /// A page whose chat root has not been rendered yet.
    pub fn without_chat(channel: &str) -> Self {
        Self {
            doc: Document::new(),
            users: Rc::new(RefCell::new(UserList::default())),
            chat: None,
            view: None,
            messages: None,
            userlist: None,
            channel: channel.to_string(),
            next_msg_id: 1,
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn chat(&self) -> Option<NodeKey> {
        self.chat
    }

    /// Render a fresh chat root under the body.
    pub fn mount_chat(&mut self) -> NodeKey {
        let chat = El::new("div").attr("id", "chat").child(
            El::new("div")
                .class("chat-view")
                .attr("data-current-channel", &self.channel)
                .child(El::new("div").class("messages"))
                .child(El::new("aside").class("userlist")),
        );
        let body = self.doc.body();
        let chat = self.doc.append_tree(body, &chat).expect("body accepts children");
        let view = self.doc.children(chat)[0];
        self.messages = Some(self.doc.children(view)[0]);
        self.userlist = Some(self.doc.children(view)[1]);
        self.view = Some(view);
        self.chat = Some(chat);
        self.render_userlist();
        chat
    }

    /// Destroy the chat root and everything in it, as a route change does.
    pub fn teardown_chat(&mut self) {
        if let Some(chat) = self.chat.take() {
            self.doc.remove(chat).expect("chat is live");
        }
        self.view = None;
        self.messages = None;
        self.userlist = None;
    }

    /// Take the chat root out of the page but keep it for [`attach_chat`](Self::attach_chat).
    pub fn detach_chat(&mut self) {
        if let Some(chat) = self.chat {
            self.doc.detach(chat).expect("chat is live");
        }
    }

    pub fn attach_chat(&mut self) {
        if let Some(chat) = self.chat {
            let body = self.doc.body();
            self.doc.append_child(body, chat).expect("chat is live");
        }
    }

    /// Switch channels: the message list is re-rendered empty.
    pub fn switch_channel(&mut self, channel: &str) {
        self.channel = channel.to_string();
        let (Some(view), Some(messages)) = (self.view, self.messages) else {
            return;
        };
        self.doc
            .set_attribute(view, "data-current-channel", channel)
            .expect("view is live");
        for row in self.doc.children(messages).to_vec() {
            self.doc.remove(row).expect("row is live");
        }
    }

    pub fn push_message(&mut self, sender: &str, text: &str) -> NodeKey {
        self.push_message_with(sender, El::new("span").text(text))
    }

    /// Append a message row whose content element is `content`; the
    /// `content` class is added to it.
    pub fn push_message_with(&mut self, sender: &str, content: El) -> NodeKey {
        let row = self.row("message").child(
            El::new("span").class("from").child(
                El::new("span")
                    .class("user")
                    .class(&color_for(sender))
                    .attr("data-name", sender)
                    .text(sender),
            ),
        );
        let row = row.child(content.class("content"));
        self.append_row(&row)
    }

    /// Append a join, quit or condensed row.
    pub fn push_system(&mut self, kind: &str, text: &str) -> NodeKey {
        let row = self.row(kind).child(El::new("span").class("content").text(text));
        self.append_row(&row)
    }

    fn row(&mut self, kind: &str) -> El {
        let id = format!("msg-{}", self.next_msg_id);
        self.next_msg_id += 1;
        El::new("div")
            .attr("id", &id)
            .class("msg")
            .attr("data-type", kind)
            .child(El::new("span").class("time").text("12:00"))
    }

    fn append_row(&mut self, row: &El) -> NodeKey {
        let messages = self.messages.expect("chat is mounted");
        self.doc.append_tree(messages, row).expect("messages accepts rows")
    }

    /// Virtualized scroll-out: the row leaves the document but stays alive.
    pub fn scroll_out(&mut self, row: NodeKey) {
        self.doc.detach(row).expect("row is live");
    }

    pub fn scroll_in(&mut self, row: NodeKey) {
        let messages = self.messages.expect("chat is mounted");
        self.doc.append_child(messages, row).expect("row is live");
    }

    /// Re-render a row's content the way the host does after an edit.
    pub fn rerender_content(&mut self, row: NodeKey, text: &str) {
        let content = self
            .doc
            .first_with_class(row, "content")
            .expect("row has content");
        for child in self.doc.children(content).to_vec() {
            self.doc.remove(child).expect("child is live");
        }
        let node = self.doc.create_text(text);
        self.doc.append_child(content, node).expect("content accepts text");
    }

    /// Join a user to the channel and re-render the userlist.
    pub fn add_user(&mut self, nick: &str, now: Millis) {
        self.users.borrow_mut().insert(nick, now);
        self.render_userlist();
    }

    pub fn render_userlist(&mut self) {
        let Some(list) = self.userlist else {
            return;
        };
        for child in self.doc.children(list).to_vec() {
            self.doc.remove(child).expect("child is live");
        }
        let nicks: Vec<String> = self.users.borrow().users.iter().map(|u| u.nick.clone()).collect();
        for nick in nicks {
            let user = El::new("span")
                .class("user")
                .class(&color_for(&nick))
                .attr("data-name", &nick)
                .text(&nick);
            self.doc.append_tree(list, &user).expect("userlist accepts users");
        }
    }

    pub fn rows(&self) -> Vec<NodeKey> {
        match self.messages {
            Some(messages) => self.doc.children(messages).to_vec(),
            None => Vec::new(),
        }
    }

    pub fn sender_label(&self, row: NodeKey) -> String {
        self.doc
            .first_with_class(row, "from")
            .map(|from| self.doc.text_content(from))
            .unwrap_or_default()
    }

    pub fn content_text(&self, row: NodeKey) -> String {
        self.doc
            .first_with_class(row, "content")
            .map(|content| self.doc.text_content(content))
            .unwrap_or_default()
    }

    /// One line per rendered row: `label "content"`.
    pub fn transcript(&self) -> Vec<String> {
        self.rows()
            .into_iter()
            .map(|row| {
                format!(
                    "{} \"{}\"",
                    self.sender_label(row),
                    escape_text(&self.content_text(row))
                )
            })
            .collect()
    }

    pub fn snapshot(&self, key: NodeKey) -> Vec<String> {
        let node = self.doc.materialize(key).expect("node is live");
        DomSnapshot::new(&node, DomSnapshotOptions::default())
            .as_lines()
            .to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_hash_matches_lounge_buckets() {
        // 'a' = 97 -> 97 % 32 + 1
        assert_eq!(color_for("a"), "color-2");
        assert_eq!(color_for("ab"), format!("color-{}", (97 + 98) % 32 + 1));
    }

    #[test]
    fn rows_render_with_lounge_markup() {
        let mut host = LoungeHost::new("#ath");
        let row = host.push_message("Chatbot", "[SB] Alice: hi");
        assert_eq!(host.doc.attr(row, "id"), Some("msg-1"));
        assert_eq!(host.sender_label(row), "Chatbot");
        assert_eq!(host.transcript(), ["Chatbot \"[SB] Alice: hi\""]);
        assert_eq!(host.doc.element_by_id("chat"), host.chat());
    }

    #[test]
    fn switch_channel_clears_rows() {
        let mut host = LoungeHost::new("#a");
        host.push_message("x", "y");
        host.switch_channel("#b");
        assert!(host.rows().is_empty());
        assert_eq!(host.channel(), "#b");
    }

    #[test]
    fn add_user_renders_userlist_entry() {
        let mut host = LoungeHost::new("#a");
        host.add_user("Alice", Millis(1));
        let list = host.doc.first_with_class(host.doc.root(), "userlist").unwrap();
        let user = host.doc.children(list)[0];
        assert_eq!(host.doc.attr(user, "data-name"), Some("Alice"));
        assert!(host.doc.has_class(user, &color_for("Alice")));
    }
}
