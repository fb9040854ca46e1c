//! Rendered output tree.
//!
//! Renderers build a [`Node`] tree instead of writing HTML directly; the tree
//! carries tags, attributes, and text, and serializes to safe HTML for iframe
//! srcDoc or static export. No script, no inline event handlers.

use std::fmt::Write;

/// One element in the rendered page tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Element with a single text child (e.g. `<span>hello</span>`).
    pub fn text(tag: &str, text: &str) -> Self {
        let mut node = Self::new(tag);
        node.text = Some(text.to_string());
        node
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    /// Appends to the `class` attribute, creating it if absent.
    pub fn class(mut self, class: &str) -> Self {
        if let Some(existing) = self.attrs.iter_mut().find(|(n, _)| n == "class") {
            existing.1.push(' ');
            existing.1.push_str(class);
        } else {
            self.attrs.push(("class".to_string(), class.to_string()));
        }
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    /// Looks up an attribute value by name.
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Depth-first search for the first descendant with the given tag.
    pub fn find(&self, tag: &str) -> Option<&Node> {
        if self.tag == tag {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(tag))
    }

    /// Depth-first search for the first descendant carrying `attr=value`.
    pub fn find_by_attr(&self, name: &str, value: &str) -> Option<&Node> {
        if self.get_attr(name) == Some(value) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_attr(name, value))
    }

    /// Concatenated text content of this node and all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(ref t) = self.text {
            out.push_str(t);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Serializes the tree to HTML. Text and attribute values are escaped.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out).expect("writing to String");
        out
    }

    fn write_html(&self, out: &mut String) -> std::fmt::Result {
        write!(out, "<{}", self.tag)?;
        for (name, value) in &self.attrs {
            write!(out, " {}=\"{}\"", name, escape_html(value))?;
        }
        if VOID_TAGS.contains(&self.tag.as_str()) {
            return write!(out, ">");
        }
        write!(out, ">")?;
        if let Some(ref text) = self.text {
            write!(out, "{}", escape_html(text))?;
        }
        for child in &self.children {
            child.write_html(out)?;
        }
        write!(out, "</{}>", self.tag)
    }
}

const VOID_TAGS: &[&str] = &["img", "input", "br", "hr", "meta", "link"];

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
