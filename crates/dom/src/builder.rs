//! Declarative subtree construction.
//!
//! Hosts and fixtures describe a subtree with [`El`] and insert it in one
//! call. Each created node produces the same mutation records as if it had
//! been built with the primitive API.

use crate::document::Document;
use crate::error::DomError;
use crate::types::NodeKey;

#[derive(Clone, Debug)]
pub enum Part {
    Element(El),
    Text(String),
}

#[derive(Clone, Debug)]
pub struct El {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Part>,
}

impl El {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.to_string(), value.to_string()));
        self
    }

    /// Append a class token, merging with an existing `class` attribute.
    pub fn class(mut self, class: &str) -> Self {
        match self.attributes.iter_mut().find(|(k, _)| k == "class") {
            Some((_, v)) => {
                v.push(' ');
                v.push_str(class);
            }
            None => self.attributes.push(("class".to_string(), class.to_string())),
        }
        self
    }

    pub fn child(mut self, child: El) -> Self {
        self.children.push(Part::Element(child));
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.children.push(Part::Text(text.to_string()));
        self
    }
}

impl Document {
    /// Create the subtree described by `el` without inserting it.
    pub fn build(&mut self, el: &El) -> Result<NodeKey, DomError> {
        let key = self.create_element(&el.name);
        for (name, value) in &el.attributes {
            self.set_attribute(key, name, value)?;
        }
        for part in &el.children {
            let child = match part {
                Part::Element(child) => self.build(child)?,
                Part::Text(text) => self.create_text(text),
            };
            self.append_child(key, child)?;
        }
        Ok(key)
    }

    /// Build `el` and append it to `parent`.
    pub fn append_tree(&mut self, parent: NodeKey, el: &El) -> Result<NodeKey, DomError> {
        let key = self.build(el)?;
        self.append_child(parent, key)?;
        Ok(key)
    }
}
