//! HTML utility functions.
//!
//! Provides common HTML processing functions:
//! - `escape_text()`, `escape_attr()` - HTML entity escaping for rendering
//! - `is_void_element()` - Elements without end tag (br, link, meta, etc.)
//! - `is_raw_text_element()` - Raw text elements (script, style)
//! - `is_escapable_raw_text_element()` - RCDATA elements (title, textarea)
//! - `file_name()` - Final path segment of a `src`/`href` value

use std::borrow::Cow;

// =============================================================================
// HTML Escaping
// =============================================================================

/// Characters escaped in text content.
const TEXT_ESCAPE_CHARS: [char; 3] = ['&', '<', '>'];

/// Characters escaped in double-quoted attribute values.
const ATTR_ESCAPE_CHARS: [char; 2] = ['&', '"'];

/// Get the HTML entity for a special character.
#[inline]
fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        _ => None,
    }
}

/// Escape text content for rendering.
///
/// Uses `Cow` to avoid allocation when no escaping is needed.
///
/// # Example
/// ```ignore
/// assert_eq!(escape_text("a < b"), "a &lt; b");
/// assert_eq!(escape_text("hello"), "hello"); // No allocation
/// ```
#[inline]
pub fn escape_text(s: &str) -> Cow<'_, str> {
    escape_with(s, &TEXT_ESCAPE_CHARS)
}

/// Escape a value rendered inside double quotes.
#[inline]
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    escape_with(s, &ATTR_ESCAPE_CHARS)
}

/// Internal: escape with specified character set.
#[inline]
fn escape_with<'a>(s: &'a str, chars: &[char]) -> Cow<'a, str> {
    if !s.contains(chars) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) if chars.contains(&c) => result.push_str(entity),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

// =============================================================================
// Element Classification
// =============================================================================

/// Check if an HTML tag is a void element.
///
/// Void elements cannot have children and are rendered without an end tag.
#[inline]
pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Check if tag is a raw text element (content should not be HTML-escaped).
///
/// In the HTML standard, script and style content is "raw text".
#[inline]
pub fn is_raw_text_element(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

/// Check if tag is an escapable raw text element.
///
/// In the HTML standard, textarea and title are "escapable raw text".
#[inline]
pub fn is_escapable_raw_text_element(tag: &str) -> bool {
    matches!(tag, "textarea" | "title")
}

// =============================================================================
// URL helpers
// =============================================================================

/// Final path segment of a `src` or `href` value.
///
/// Query strings and fragments are kept, matching how filenames are
/// compared against the configured fragments (substring containment).
///
/// # Examples
///
/// - `file_name("site_libs/quarto-nav/quarto-nav.js")` -> `"quarto-nav.js"`
/// - `file_name("quarto.js")` -> `"quarto.js"`
/// - `file_name("dir/")` -> `""`
#[inline]
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

// =============================================================================
// Tests
// =============================================================================
