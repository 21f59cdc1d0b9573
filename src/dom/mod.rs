//! Owned HTML document tree.
//!
//! The optimizer mutates one document at a time, so the tree is a plain
//! owned structure: elements own their children, nothing is shared, and a
//! node is moved by detaching it (taking ownership) and inserting it again.
//!
//! # Modules
//!
//! - `parse`: Lenient tokenizer-driven parser (`Document::parse`)
//! - `render`: Serializer back to HTML text (`Document::render`)
//!
//! The parser never synthesizes `<html>`, `<head>` or `<body>`, so callers
//! can tell when a document lacks them.

mod parse;
mod render;

use std::fmt;

// =============================================================================
// Types
// =============================================================================

/// Parsed HTML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Top-level nodes (doctype, comments, `<html>`, stray text).
    pub children: Vec<Node>,
}

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Decoded text. Inside raw text elements this is the verbatim source.
    Text(String),
    Comment(String),
    /// Rendered doctype body, e.g. `html` for `<!DOCTYPE html>`.
    Doctype(String),
}

/// An element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercase tag name.
    pub tag: String,
    pub attrs: Attrs,
    pub children: Vec<Node>,
}

/// Ordered attribute list.
///
/// Setting an existing name replaces its value in place, so attribute order
/// in the rendered output stays stable across passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs(Vec<(String, String)>);

// =============================================================================
// Attrs
// =============================================================================

impl Attrs {
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has(&self, name: &str) -> bool {
        self.0.iter().any(|(k, _)| k == name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (k, v) in iter {
            attrs.set(k, v);
        }
        attrs
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Attrs {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

// =============================================================================
// Node
// =============================================================================

impl Node {
    #[inline]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    #[inline]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn into_element(self) -> Option<Element> {
        match self {
            Self::Element(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Element> for Node {
    fn from(elem: Element) -> Self {
        Self::Element(elem)
    }
}

// =============================================================================
// Element
// =============================================================================

impl Element {
    pub fn new(tag: impl Into<String>, attrs: impl Into<Attrs>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attrs: attrs.into(),
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    #[inline]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name)
    }

    #[inline]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.has(name)
    }

    #[inline]
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.set(name, value);
    }

    /// Whether the whitespace-separated `rel` list contains `token`.
    pub fn has_rel(&self, token: &str) -> bool {
        self.attr("rel").is_some_and(|rel| {
            rel.split_ascii_whitespace()
                .any(|t| t.eq_ignore_ascii_case(token))
        })
    }

    /// `<script>` without a `src` attribute.
    #[inline]
    pub fn is_inline_script(&self) -> bool {
        self.is("script") && !self.has_attr("src")
    }

    /// Script execution is already non-blocking.
    #[inline]
    pub fn is_deferred(&self) -> bool {
        self.has_attr("defer") || self.has_attr("async")
    }

    pub fn push(&mut self, node: impl Into<Node>) {
        self.children.push(node.into());
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
                Node::Comment(_) | Node::Doctype(_) => {}
            }
        }
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children.clear();
        self.children.push(Node::Text(text.into()));
    }

    /// Iterate direct element children.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Index (in `children`) of the first direct child matching `pred`.
    pub fn position(&self, pred: impl Fn(&Element) -> bool) -> Option<usize> {
        self.children
            .iter()
            .position(|n| n.as_element().is_some_and(&pred))
    }

    /// First descendant (depth-first, document order) matching `pred`.
    pub fn find(&self, pred: &impl Fn(&Element) -> bool) -> Option<&Element> {
        for child in self.elements() {
            if pred(child) {
                return Some(child);
            }
            if let Some(found) = child.find(pred) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants matching `pred`, in document order.
    pub fn find_all(&self, pred: &impl Fn(&Element) -> bool) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_matching(pred, &mut out);
        out
    }

    fn collect_matching<'a>(
        &'a self,
        pred: &impl Fn(&Element) -> bool,
        out: &mut Vec<&'a Element>,
    ) {
        for child in self.elements() {
            if pred(child) {
                out.push(child);
            }
            child.collect_matching(pred, out);
        }
    }

    /// Visit every descendant element mutably, in document order.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        for child in &mut self.children {
            if let Node::Element(e) = child {
                f(e);
                e.walk_mut(f);
            }
        }
    }

    /// Detach every descendant matching `pred`, in document order.
    ///
    /// Matched elements are removed whole; their subtrees are not searched.
    pub fn detach_all(&mut self, pred: &impl Fn(&Element) -> bool) -> Vec<Element> {
        let mut out = Vec::new();
        self.detach_into(pred, &mut out);
        out
    }

    fn detach_into(&mut self, pred: &impl Fn(&Element) -> bool, out: &mut Vec<Element>) {
        let mut i = 0;
        while i < self.children.len() {
            let matched = self.children[i].as_element().is_some_and(pred);
            if matched {
                if let Some(elem) = self.children.remove(i).into_element() {
                    out.push(elem);
                }
                continue;
            }
            if let Node::Element(e) = &mut self.children[i] {
                e.detach_into(pred, out);
            }
            i += 1;
        }
    }

    /// Insert `nodes` right before the last descendant matching `pred`.
    ///
    /// The nodes land in the matched element's parent. Returns the nodes
    /// back when nothing matched.
    pub fn insert_before_last(
        &mut self,
        pred: &impl Fn(&Element) -> bool,
        mut nodes: Vec<Node>,
    ) -> Result<(), Vec<Node>> {
        // Reverse pre-order: a child's descendants come after the child itself.
        for i in (0..self.children.len()).rev() {
            let Node::Element(child) = &mut self.children[i] else {
                continue;
            };
            nodes = match child.insert_before_last(pred, nodes) {
                Ok(()) => return Ok(()),
                Err(nodes) => nodes,
            };
            if pred(child) {
                self.children.splice(i..i, nodes);
                return Ok(());
            }
        }
        Err(nodes)
    }

    /// Insert `nodes` right after the first descendant matching `pred`.
    ///
    /// Returns the nodes back when nothing matched.
    pub fn insert_after_first(
        &mut self,
        pred: &impl Fn(&Element) -> bool,
        mut nodes: Vec<Node>,
    ) -> Result<(), Vec<Node>> {
        for i in 0..self.children.len() {
            let Node::Element(child) = &mut self.children[i] else {
                continue;
            };
            if pred(child) {
                self.children.splice(i + 1..i + 1, nodes);
                return Ok(());
            }
            nodes = match child.insert_after_first(pred, nodes) {
                Ok(()) => return Ok(()),
                Err(nodes) => nodes,
            };
        }
        Err(nodes)
    }
}

// =============================================================================
// Document
// =============================================================================

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// First element with `tag` anywhere in the document.
    pub fn find_tag(&self, tag: &str) -> Option<&Element> {
        let pred = |e: &Element| e.is(tag);
        self.top_elements().find_map(|e| {
            if pred(e) { Some(e) } else { e.find(&pred) }
        })
    }

    /// Mutable access to the first element with `tag`.
    pub fn find_tag_mut(&mut self, tag: &str) -> Option<&mut Element> {
        fn search<'a>(nodes: &'a mut [Node], tag: &str) -> Option<&'a mut Element> {
            for node in nodes {
                let Node::Element(e) = node else { continue };
                if e.is(tag) {
                    return Some(e);
                }
                if let Some(found) = search(&mut e.children, tag) {
                    return Some(found);
                }
            }
            None
        }
        search(&mut self.children, tag)
    }

    /// All elements in the document matching `pred`, in document order.
    pub fn find_all(&self, pred: &impl Fn(&Element) -> bool) -> Vec<&Element> {
        let mut out = Vec::new();
        for e in self.top_elements() {
            if pred(e) {
                out.push(e);
            }
            out.extend(e.find_all(pred));
        }
        out
    }

    fn top_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Parse HTML text into an owned tree.
    pub fn parse(html: &str) -> Self {
        parse::parse_document(html)
    }

    /// Render the tree back to HTML text.
    pub fn render(&self) -> String {
        render::render_document(self)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

// =============================================================================
// Tests
// =============================================================================
