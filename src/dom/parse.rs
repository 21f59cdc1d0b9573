//! Lenient HTML parser built on the html5ever tokenizer.
//!
//! Only the tokenizer is used. Tree construction is done here with a simple
//! open-element stack, so the resulting tree mirrors the source structure:
//! missing `<head>`/`<body>` are not synthesized, unmatched end tags are
//! dropped, and an end tag closes every element opened after its match.
//!
//! The tokenizer is switched into the matching raw text state after
//! `<script>`/`<style>`/`<title>`/`<textarea>` start tags, so script bodies
//! come through verbatim.

use std::cell::RefCell;

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Doctype, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer,
    TokenizerOpts,
};

use super::{Attrs, Document, Element, Node};
use crate::utils::html::{is_escapable_raw_text_element, is_raw_text_element, is_void_element};

/// Parse a full HTML document.
pub(super) fn parse_document(html: &str) -> Document {
    let builder = RefCell::new(TreeBuilder::default());

    {
        let tok = Tokenizer::new(TreeSink { builder: &builder }, TokenizerOpts::default());
        let mut buffer = BufferQueue::default();
        buffer.push_back(StrTendril::from(html));
        let _ = tok.feed(&mut buffer);
        tok.end();
    }

    builder.into_inner().finish()
}

// =============================================================================
// Tree construction
// =============================================================================

/// Open-element stack plus the finished top-level nodes.
#[derive(Default)]
struct TreeBuilder {
    roots: Vec<Node>,
    open: Vec<Element>,
}

impl TreeBuilder {
    /// Children list of the innermost open element (or the document).
    fn current_children(&mut self) -> &mut Vec<Node> {
        match self.open.last_mut() {
            Some(elem) => &mut elem.children,
            None => &mut self.roots,
        }
    }

    fn append(&mut self, node: Node) {
        self.current_children().push(node);
    }

    /// Append text, merging with a directly preceding text node.
    fn append_text(&mut self, text: &str) {
        let children = self.current_children();
        if let Some(Node::Text(prev)) = children.last_mut() {
            prev.push_str(text);
        } else {
            children.push(Node::Text(text.to_string()));
        }
    }

    fn start_tag(&mut self, tag: Tag) -> TokenSinkResult<()> {
        let name = tag.name.to_ascii_lowercase().to_string();
        let attrs: Attrs = tag
            .attrs
            .iter()
            .map(|a| (a.name.local.to_ascii_lowercase().to_string(), a.value.to_string()))
            .collect();
        let elem = Element::new(name, attrs);

        if is_void_element(&elem.tag) || (tag.self_closing && !is_raw_text_element(&elem.tag)) {
            self.append(Node::Element(elem));
            return TokenSinkResult::Continue;
        }

        let raw = raw_kind(&elem.tag);
        self.open.push(elem);
        match raw {
            Some(kind) => TokenSinkResult::RawData(kind),
            None => TokenSinkResult::Continue,
        }
    }

    fn end_tag(&mut self, tag: &Tag) {
        let name = tag.name.to_ascii_lowercase().to_string();
        let Some(pos) = self.open.iter().rposition(|e| e.tag == name) else {
            // Unmatched end tag (including `</br>` and friends): drop it.
            return;
        };
        while self.open.len() > pos {
            self.close_innermost();
        }
    }

    /// Pop the innermost open element into its parent.
    fn close_innermost(&mut self) {
        if let Some(elem) = self.open.pop() {
            self.append(Node::Element(elem));
        }
    }

    fn finish(mut self) -> Document {
        while !self.open.is_empty() {
            self.close_innermost();
        }
        Document::new(self.roots)
    }
}

/// Tokenizer state to switch into after a start tag.
fn raw_kind(tag: &str) -> Option<RawKind> {
    if tag == "script" {
        Some(RawKind::ScriptData)
    } else if is_raw_text_element(tag) {
        Some(RawKind::Rawtext)
    } else if is_escapable_raw_text_element(tag) {
        Some(RawKind::Rcdata)
    } else {
        None
    }
}

/// Reassemble the doctype body (`html PUBLIC "..." "..."`).
fn doctype_body(doctype: &Doctype) -> String {
    let mut out = doctype
        .name
        .as_ref()
        .map(|n| n.to_string())
        .unwrap_or_default();
    match (&doctype.public_id, &doctype.system_id) {
        (Some(public), Some(system)) => {
            out.push_str(&format!(" PUBLIC \"{public}\" \"{system}\""));
        }
        (Some(public), None) => out.push_str(&format!(" PUBLIC \"{public}\"")),
        (None, Some(system)) => out.push_str(&format!(" SYSTEM \"{system}\"")),
        (None, None) => {}
    }
    out
}

// =============================================================================
// Token sink
// =============================================================================

/// Feeds tokenizer output into the shared tree builder.
struct TreeSink<'a> {
    builder: &'a RefCell<TreeBuilder>,
}

impl TokenSink for TreeSink<'_> {
    type Handle = ();

    fn process_token(&self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        let mut builder = self.builder.borrow_mut();
        match token {
            Token::TagToken(tag) => match tag.kind {
                TagKind::StartTag => return builder.start_tag(tag),
                TagKind::EndTag => builder.end_tag(&tag),
            },
            Token::CharacterTokens(text) => builder.append_text(&text),
            Token::CommentToken(text) => builder.append(Node::Comment(text.to_string())),
            Token::DoctypeToken(doctype) => builder.append(Node::Doctype(doctype_body(&doctype))),
            Token::NullCharacterToken | Token::EOFToken | Token::ParseError(_) => {}
        }
        TokenSinkResult::Continue
    }
}

// =============================================================================
// Tests
// =============================================================================
