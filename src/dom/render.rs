//! HTML serializer for the owned tree.
//!
//! Output rules:
//! - attributes are always written as `name="value"`
//! - void elements get no end tag
//! - `script`/`style` children are written verbatim, other text is escaped

use super::{Document, Element, Node};
use crate::utils::html::{escape_attr, escape_text, is_raw_text_element, is_void_element};

pub(super) fn render_document(doc: &Document) -> String {
    let mut out = String::with_capacity(4096);
    for node in &doc.children {
        render_node(node, false, &mut out);
    }
    out
}

fn render_node(node: &Node, raw: bool, out: &mut String) {
    match node {
        Node::Element(elem) => render_element(elem, out),
        Node::Text(text) if raw => out.push_str(text),
        Node::Text(text) => out.push_str(&escape_text(text)),
        Node::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        Node::Doctype(body) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(body);
            out.push('>');
        }
    }
}

fn render_element(elem: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&elem.tag);
    for (name, value) in elem.attrs.iter() {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
    out.push('>');

    if is_void_element(&elem.tag) {
        return;
    }

    let raw = is_raw_text_element(&elem.tag);
    for child in &elem.children {
        render_node(child, raw, out);
    }

    out.push_str("</");
    out.push_str(&elem.tag);
    out.push('>');
}
