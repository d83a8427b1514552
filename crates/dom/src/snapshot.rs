use crate::types::Node;
use std::fmt;

/// Deterministic line-per-node rendering of a subtree for test comparisons.
/// Not a stable format.
///
/// Rules:
/// - Attribute order is significant and rendered as stored.
/// - Text is rendered quoted with control characters escaped; zero-width
///   characters are shown as `\u{..}` so they are visible in diffs.
/// - Node keys are omitted unless `with_keys` is set.
#[derive(Clone, Copy, Debug, Default)]
pub struct DomSnapshotOptions {
    pub with_keys: bool,
}

#[derive(Debug)]
pub struct DomSnapshot {
    lines: Vec<String>,
}

impl DomSnapshot {
    pub fn new(root: &Node, options: DomSnapshotOptions) -> Self {
        let mut lines = Vec::new();
        walk(root, &options, 0, &mut lines);
        Self { lines }
    }

    pub fn as_lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for DomSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn walk(node: &Node, options: &DomSnapshotOptions, depth: usize, out: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    let key = if options.with_keys {
        format!(" #{}", node.key().0)
    } else {
        String::new()
    };
    match node {
        Node::Document { children, .. } => {
            out.push(format!("{indent}#document{key}"));
            for c in children {
                walk(c, options, depth + 1, out);
            }
        }
        Node::Element {
            name,
            attributes,
            children,
            ..
        } => {
            let mut line = format!("{indent}<{name}");
            for (k, v) in attributes {
                line.push_str(&format!(" {k}=\"{}\"", escape(v)));
            }
            line.push('>');
            line.push_str(&key);
            out.push(line);
            for c in children {
                walk(c, options, depth + 1, out);
            }
        }
        Node::Text { text, .. } => out.push(format!("{indent}\"{}\"{key}", escape(text))),
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\u{200B}'..='\u{200D}' | '\u{FEFF}' => out.push_str(&format!("\\u{{{:X}}}", ch as u32)),
            ch if ch < ' ' => out.push_str(&format!("\\u{{{:02X}}}", ch as u32)),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::El;
    use crate::Document;

    #[test]
    fn renders_attributes_in_order_and_escapes_invisible_text() {
        let mut doc = Document::new();
        let body = doc.body();
        let key = doc
            .append_tree(
                body,
                &El::new("span").attr("b", "2").attr("a", "1").text("x\u{200B}y"),
            )
            .unwrap();
        let snap = DomSnapshot::new(&doc.materialize(key).unwrap(), DomSnapshotOptions::default());
        assert_eq!(snap.as_lines(), ["<span b=\"2\" a=\"1\">", "  \"x\\u{200B}y\""]);
    }
}
