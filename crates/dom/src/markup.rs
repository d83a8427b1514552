use crate::document::Document;
use crate::types::{NodeKey, NodeKind};

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "wbr"];

impl Document {
    /// Markup of the children of `key`, in the shape a browser's
    /// `innerHTML` getter produces. Empty for unknown keys and text nodes.
    pub fn inner_html(&self, key: NodeKey) -> String {
        let mut out = String::new();
        if let Some(record) = self.record(key) {
            for child in &record.children {
                self.write_markup(*child, &mut out);
            }
        }
        out
    }

    fn write_markup(&self, key: NodeKey, out: &mut String) {
        let Some(record) = self.record(key) else {
            return;
        };
        match &record.kind {
            NodeKind::Text { text } => escape_into(text, false, out),
            NodeKind::Element { name, attributes } => {
                out.push('<');
                out.push_str(name);
                for (k, v) in attributes {
                    out.push(' ');
                    out.push_str(k);
                    out.push_str("=\"");
                    escape_into(v, true, out);
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&&**name) {
                    return;
                }
                for child in &record.children {
                    self.write_markup(*child, out);
                }
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
            NodeKind::Document => {
                for child in &record.children {
                    self.write_markup(*child, out);
                }
            }
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '\u{A0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::El;
    use crate::document::Document;

    #[test]
    fn inner_html_serializes_children_only() {
        let mut doc = Document::new();
        let body = doc.body();
        let content = doc
            .append_tree(
                body,
                &El::new("span")
                    .class("content")
                    .child(El::new("span").class("irc-fg4").text("[SB] "))
                    .text("a < b & c")
                    .child(El::new("a").attr("href", "https://x?a=1&b=\"2\"").text("link"))
                    .child(El::new("br")),
            )
            .unwrap();

        assert_eq!(
            doc.inner_html(content),
            "<span class=\"irc-fg4\">[SB] </span>a &lt; b &amp; c\
             <a href=\"https://x?a=1&amp;b=&quot;2&quot;\">link</a><br>"
        );
    }

    #[test]
    fn inner_html_of_text_or_missing_node_is_empty() {
        let mut doc = Document::new();
        let text = doc.create_text("x");
        doc.remove(text).unwrap();
        assert_eq!(doc.inner_html(text), "");
        let live = doc.create_text("y");
        assert_eq!(doc.inner_html(live), "");
    }
}
