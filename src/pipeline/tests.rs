//! End-to-end tests of the optimization pipeline.

use std::sync::Arc;

use super::*;
use crate::config::test_parse_config;
use crate::dom::{Document, Element};
use crate::telemetry::{NoopTelemetry, Recorder};

// =============================================================================
// Helpers
// =============================================================================

fn run_with(config: &TuneConfig, html: &str) -> Result<Optimized, OptimizeError> {
    let ctx = OptimizeContext::new(config, Arc::new(NoopTelemetry)).unwrap();
    optimize(html, "test.html", &ctx)
}

fn run(html: &str) -> Result<Optimized, OptimizeError> {
    run_with(&TuneConfig::default(), html)
}

fn head_of(doc: &Document) -> &Element {
    doc.find_tag("head").unwrap()
}

fn body_of(doc: &Document) -> &Element {
    doc.find_tag("body").unwrap()
}

fn src_is(fragment: &'static str) -> impl Fn(&Element) -> bool {
    move |e: &Element| e.is("script") && e.attr("src").is_some_and(|s| s.contains(fragment))
}

const QUARTO_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en"><head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Home</title>
<script src="site_libs/quarto-nav/quarto-nav.js"></script>
<script src="site_libs/clipboard/clipboard.min.js" async></script>
<script src="site_libs/quarto-html/quarto.js"></script>
<script src="site_libs/bootstrap/bootstrap.min.js"></script>
<link href="site_libs/bootstrap/bootstrap-icons.css" rel="stylesheet">
<link href="site_libs/bootstrap/bootstrap.min.css" rel="stylesheet" id="quarto-bootstrap">
<link href="styles.css" rel="stylesheet">
</head>
<body>
<p><a href="https://github.com/quarto-dev/quarto-cli">source</a></p>
<script>window.document.addEventListener("DOMContentLoaded", function (event) { init(); });</script>
<script>var footer = 1;</script>
</body></html>"#;

// =============================================================================
// Structure
// =============================================================================

#[test]
fn test_missing_head_fails() {
    let err = run("<html><body><p>x</p></body></html>").unwrap_err();
    assert_eq!(err, OptimizeError::MissingHead);
}

#[test]
fn test_missing_body_fails() {
    let err = run("<html><head><title>x</title></head></html>").unwrap_err();
    assert_eq!(err, OptimizeError::MissingBody);
}

#[test]
fn test_failure_emits_event() {
    let config = TuneConfig::default();
    let recorder = Arc::new(Recorder::default());
    let ctx = OptimizeContext::new(&config, recorder.clone()).unwrap();

    assert!(optimize("<p>no structure</p>", "broken.html", &ctx).is_err());

    let events = recorder.events();
    assert_eq!(
        recorder.messages(),
        vec!["Starting HTML optimization", "Missing head or body"]
    );
    assert_eq!(events[1].data["file"], "broken.html");
}

// =============================================================================
// Scripts
// =============================================================================

#[test]
fn test_deferrable_script_moves_to_body_with_defer() {
    let out = run(
        r#"<html><head><script src="site_libs/quarto-nav/quarto-nav.js"></script></head><body><p>x</p></body></html>"#,
    )
    .unwrap();
    let doc = Document::parse(&out.html);

    assert!(head_of(&doc).find(&src_is("quarto-nav.js")).is_none());
    let moved = body_of(&doc).find(&src_is("quarto-nav.js")).unwrap();
    assert!(moved.has_attr("defer"));
    assert_eq!(out.changes.scripts_deferred, 1);
    assert_eq!(out.changes.scripts_moved, 1);
}

#[test]
fn test_async_script_moves_without_defer() {
    let out = run(
        r#"<html><head><script src="clipboard.min.js" async></script></head><body></body></html>"#,
    )
    .unwrap();
    let doc = Document::parse(&out.html);

    let moved = body_of(&doc).find(&src_is("clipboard.min.js")).unwrap();
    assert!(!moved.has_attr("defer"));
    assert_eq!(out.changes.scripts_moved, 1);
    assert_eq!(out.changes.scripts_deferred, 0);
}

#[test]
fn test_moved_scripts_land_before_last_inline_script() {
    let out = run(
        r#"<html><head><script src="headroom.min.js"></script><script src="fuse.min.js"></script></head><body><script>var a;</script><div><script>var last;</script></div></body></html>"#,
    )
    .unwrap();
    let doc = Document::parse(&out.html);

    let div = body_of(&doc).find(&|e: &Element| e.is("div")).unwrap();
    let order: Vec<String> = div
        .elements()
        .map(|e| {
            e.attr("src")
                .map_or_else(|| e.text_content(), str::to_string)
        })
        .collect();
    assert_eq!(order, vec!["headroom.min.js", "fuse.min.js", "var last;"]);
}

#[test]
fn test_critical_script_deferred_in_place() {
    let out = run(
        r#"<html><head><script src="quarto.js"></script><script src="bootstrap.min.js" defer></script></head><body></body></html>"#,
    )
    .unwrap();
    let doc = Document::parse(&out.html);
    let head = head_of(&doc);

    assert!(head.find(&src_is("quarto.js")).unwrap().has_attr("defer"));
    assert!(head.find(&src_is("bootstrap.min.js")).is_some());
    assert_eq!(out.changes.scripts_deferred, 1);
    assert_eq!(out.changes.scripts_moved, 0);
}

#[test]
fn test_unlisted_script_untouched() {
    let out = run(r#"<html><head><script src="app.js"></script></head><body></body></html>"#)
        .unwrap();
    let doc = Document::parse(&out.html);

    let script = head_of(&doc).find(&src_is("app.js")).unwrap();
    assert!(!script.has_attr("defer"));
    assert_eq!(out.changes.scripts_deferred, 0);
}

// =============================================================================
// Stylesheets
// =============================================================================

#[test]
fn test_only_critical_stylesheet_preloaded() {
    let out = run(
        r#"<html><head><link rel="stylesheet" href="site_libs/bootstrap/bootstrap.min.css"><link rel="stylesheet" href="custom.css"></head><body></body></html>"#,
    )
    .unwrap();
    let doc = Document::parse(&out.html);
    let head = head_of(&doc);

    let preloads = head.find_all(&|e: &Element| e.is("link") && e.has_rel("preload"));
    assert_eq!(preloads.len(), 1);
    assert_eq!(preloads[0].attr("href"), Some("site_libs/bootstrap/bootstrap.min.css"));
    assert_eq!(preloads[0].attr("as"), Some("style"));
    assert_eq!(preloads[0].attr("fetchpriority"), Some("high"));
    assert_eq!(out.changes.css_preloaded, 1);
}

#[test]
fn test_non_priority_critical_css_has_no_fetchpriority() {
    let out = run(
        r#"<html><head><link rel="stylesheet" href="bootstrap-icons.css"></head><body></body></html>"#,
    )
    .unwrap();

    assert!(out.html.contains(r#"<link rel="preload" href="bootstrap-icons.css" as="style">"#));
    assert!(out.html.contains(r#"<link rel="stylesheet" href="bootstrap-icons.css">"#));
    assert_eq!(out.changes.css_preloaded, 1);
}

#[test]
fn test_existing_preload_not_duplicated() {
    let out = run(
        r#"<html><head><link rel="preload" href="bootstrap.min.css" as="style"><link rel="stylesheet" href="bootstrap.min.css"></head><body></body></html>"#,
    )
    .unwrap();
    let doc = Document::parse(&out.html);

    let preloads = head_of(&doc).find_all(&|e: &Element| e.has_rel("preload"));
    assert_eq!(preloads.len(), 1);
    assert_eq!(out.changes.css_preloaded, 0);
    // The stylesheet itself still gets its priority hint
    assert!(out.html.contains(r#"<link rel="stylesheet" href="bootstrap.min.css" fetchpriority="high">"#));
}

#[test]
fn test_minimal_document_end_to_end() {
    let config = test_parse_config("[monitor]\nenable = false");
    let out = run_with(
        &config,
        r#"<head><link rel="stylesheet" href="bootstrap.min.css"></head><body></body>"#,
    )
    .unwrap();

    assert_eq!(out.changes.css_preloaded, 1);
    assert!(out.html.contains(
        r#"<link rel="preload" href="bootstrap.min.css" as="style" fetchpriority="high"><link rel="stylesheet" href="bootstrap.min.css" fetchpriority="high">"#
    ));
}

#[test]
fn test_minimal_document_snippet_takes_second_slot() {
    let out = run(r#"<head><link rel="stylesheet" href="bootstrap.min.css"></head><body></body>"#)
        .unwrap();
    let doc = Document::parse(&out.html);
    let head = head_of(&doc);

    assert_eq!(out.changes.css_preloaded, 1);
    let kinds: Vec<&str> = head
        .elements()
        .map(|e| match e.attr("rel") {
            Some(rel) => rel,
            None => e.tag.as_str(),
        })
        .collect();
    assert_eq!(kinds, vec!["preload", "script", "stylesheet"]);
}

#[test]
fn test_existing_fetchpriority_kept_on_stylesheet() {
    let out = run(
        r#"<html><head><link rel="stylesheet" href="bootstrap.min.css" fetchpriority="low"></head><body></body></html>"#,
    )
    .unwrap();
    let doc = Document::parse(&out.html);
    let head = head_of(&doc);

    let sheet = head.find(&|e: &Element| e.has_rel("stylesheet")).unwrap();
    assert_eq!(sheet.attr("fetchpriority"), Some("low"));
    let preload = head.find(&|e: &Element| e.has_rel("preload")).unwrap();
    assert_eq!(preload.attr("fetchpriority"), Some("high"));
    assert_eq!(out.changes.css_preloaded, 1);
}

// =============================================================================
// Hints and snippet
// =============================================================================

#[test]
fn test_preconnect_added_once() {
    let html = r#"<html><head><meta charset="utf-8"><title>x</title></head><body><a href="https://github.com/org/repo">repo</a></body></html>"#;
    let out = run(html).unwrap();
    let doc = Document::parse(&out.html);
    let head = head_of(&doc);

    let hints = head.find_all(&|e: &Element| e.has_rel("preconnect"));
    assert_eq!(hints.len(), 1);
    assert_eq!(hints[0].attr("href"), Some("https://github.com"));
    // Both go in as the second child; the snippet lands after the hint did
    let tags: Vec<&str> = head.elements().map(|e| e.tag.as_str()).collect();
    assert_eq!(tags, vec!["meta", "script", "link", "title"]);

    let again = run(&out.html).unwrap();
    let doc = Document::parse(&again.html);
    assert_eq!(head_of(&doc).find_all(&|e: &Element| e.has_rel("preconnect")).len(), 1);
}

#[test]
fn test_preconnect_is_second_child_after_leading_metas() {
    let config = test_parse_config("[monitor]\nenable = false");
    let html = r#"<html><head><meta charset="utf-8"><meta name="generator" content="quarto"><meta name="viewport" content="width=device-width"><title>x</title></head><body><a href="https://github.com/org">repo</a></body></html>"#;
    let out = run_with(&config, html).unwrap();
    let doc = Document::parse(&out.html);
    let head = head_of(&doc);

    let at = head.elements().position(|e| e.has_rel("preconnect"));
    assert_eq!(at, Some(1));
    assert_eq!(head.elements().next().unwrap().attr("charset"), Some("utf-8"));
}

#[test]
fn test_snippet_without_viewport_is_second_child() {
    let out = run(
        r#"<html><head><title>x</title><link rel="stylesheet" href="styles.css"></head><body></body></html>"#,
    )
    .unwrap();
    let doc = Document::parse(&out.html);
    let head = head_of(&doc);

    let tags: Vec<&str> = head.elements().map(|e| e.tag.as_str()).collect();
    assert_eq!(tags, vec!["title", "script", "link"]);
    assert!(head.elements().nth(1).unwrap().text_content().contains("performance.now()"));
}

#[test]
fn test_no_preconnect_without_matching_link() {
    let out = run(r#"<html><head></head><body><a href="/about.html">about</a></body></html>"#)
        .unwrap();
    assert!(!out.html.contains("preconnect"));
}

#[test]
fn test_snippet_inserted_after_viewport() {
    let out = run(QUARTO_PAGE).unwrap();
    let doc = Document::parse(&out.html);
    let head = head_of(&doc);

    let tags: Vec<&str> = head.elements().map(|e| e.tag.as_str()).collect();
    let viewport = head
        .elements()
        .position(|e| e.attr("name") == Some("viewport"))
        .unwrap();
    assert_eq!(tags[viewport + 1], "script");

    let snippet = head.elements().nth(viewport + 1).unwrap();
    assert!(snippet.is_inline_script());
    assert!(snippet.text_content().contains("performance.now()"));
    assert!(snippet.text_content().contains("runId:\"optimized\""));
}

#[test]
fn test_existing_snippet_rewritten_not_duplicated() {
    let html = r#"<html><head><meta name="viewport" content="width=device-width"><script>(function(){const t=performance.now();log({runId:'baseline',hypothesisId:'A'});log({hypothesisId:"B"});})();</script></head><body></body></html>"#;
    let out = run(html).unwrap();
    let doc = Document::parse(&out.html);

    let marker = |e: &Element| e.is_inline_script() && e.text_content().contains("performance.now");
    let snippets = head_of(&doc).find_all(&marker);
    assert_eq!(snippets.len(), 1);

    let text = snippets[0].text_content();
    assert!(text.contains("runId:'optimized'"));
    assert!(text.contains("hypothesisId:'D'"));
    assert!(text.contains("hypothesisId:\"E\""));
    assert!(!text.contains("baseline"));
}

#[test]
fn test_monitor_disabled() {
    let config = test_parse_config("[monitor]\nenable = false");
    let out = run_with(&config, "<html><head></head><body></body></html>").unwrap();
    assert!(!out.html.contains("performance.now"));
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn test_load_order_fixed() {
    let out = run(
        r#"<html><head><script src="bootstrap.min.js"></script><script src="quarto.js"></script></head><body></body></html>"#,
    )
    .unwrap();
    let doc = Document::parse(&out.html);
    let head = head_of(&doc);

    let quarto = head.position(src_is("quarto.js")).unwrap();
    let bootstrap = head.position(src_is("bootstrap.min.js")).unwrap();
    assert!(quarto < bootstrap);
}

#[test]
fn test_load_order_skips_nested_script() {
    let html = r#"<html><head><script src="bootstrap.min.js"></script><noscript><script src="quarto.js"></script></noscript></head><body></body></html>"#;
    let out = run(html).unwrap();
    let doc = Document::parse(&out.html);
    let head = head_of(&doc);

    // Not a direct child of <head>: order is left alone
    let bootstrap = head.position(src_is("bootstrap.min.js")).unwrap();
    let noscript = head.position(|e: &Element| e.is("noscript")).unwrap();
    assert!(bootstrap < noscript);
    assert!(head.position(src_is("quarto.js")).is_none());
}

#[test]
fn test_dom_ready_script_is_last() {
    let out = run(QUARTO_PAGE).unwrap();
    let doc = Document::parse(&out.html);

    let scripts = body_of(&doc).find_all(&|e: &Element| e.is("script"));
    let last = scripts.last().unwrap();
    assert!(last.is_inline_script());
    assert!(last.text_content().contains("DOMContentLoaded"));
}

#[test]
fn test_dom_ready_scripts_keep_relative_order() {
    let html = r#"<html><head></head><body><script>addEventListener('DOMContentLoaded', a)</script><script>addEventListener('DOMContentLoaded', b)</script><p>x</p><script>var c;</script></body></html>"#;
    let out = run(html).unwrap();
    let doc = Document::parse(&out.html);

    let texts: Vec<String> = body_of(&doc)
        .find_all(&|e: &Element| e.is("script"))
        .iter()
        .map(|e| e.text_content())
        .collect();
    assert_eq!(
        texts,
        vec![
            "var c;",
            "addEventListener('DOMContentLoaded', a)",
            "addEventListener('DOMContentLoaded', b)",
        ]
    );
}

// =============================================================================
// Formatting and idempotence
// =============================================================================

#[test]
fn test_formatting_flag_set_when_scripts_adjacent() {
    let out = run(
        r#"<html><head><meta name="viewport" content="x"></head><body><script src="a.js"></script><script src="b.js"></script></body></html>"#,
    )
    .unwrap();
    assert_eq!(out.changes.formatting_improved, 1);
    assert!(out.html.contains("<script src=\"a.js\"></script>\n<script src=\"b.js\"></script>"));
}

#[test]
fn test_second_pass_adds_nothing() {
    let first = run(QUARTO_PAGE).unwrap();
    assert_eq!(first.changes.scripts_moved, 2);
    // quarto-nav.js (moved), quarto.js and bootstrap.min.js (in place)
    assert_eq!(first.changes.scripts_deferred, 3);
    assert_eq!(first.changes.css_preloaded, 2);

    let second = run(&first.html).unwrap();
    assert_eq!(second.changes.scripts_deferred, 0);
    assert_eq!(second.changes.css_preloaded, 0);
    assert_eq!(second.changes.scripts_moved, 0);

    let doc = Document::parse(&second.html);
    let head = head_of(&doc);
    assert_eq!(
        head.find_all(&|e: &Element| e.has_rel("preload")).len(),
        2,
        "no duplicate preloads"
    );
    assert_eq!(
        head.find_all(&|e: &Element| e.is_inline_script()).len(),
        1,
        "one monitoring snippet"
    );
}

#[test]
fn test_steps_emit_events() {
    let config = TuneConfig::default();
    let recorder = Arc::new(Recorder::default());
    let ctx = OptimizeContext::new(&config, recorder.clone()).unwrap();

    let out = optimize(QUARTO_PAGE, "index.html", &ctx).unwrap();

    let messages = recorder.messages();
    assert_eq!(messages.first().map(String::as_str), Some("Starting HTML optimization"));
    assert_eq!(messages.last().map(String::as_str), Some("Optimization complete"));
    for expected in [
        "Script deferred and moved",
        "Script moved",
        "Script deferred in head",
        "CSS preload added",
        "Preconnect added",
        "Added performance script",
        "DOMContentLoaded scripts moved to end",
    ] {
        assert!(messages.iter().any(|m| m == expected), "missing event {expected:?}");
    }

    let events = recorder.events();
    let complete = events.last().unwrap();
    assert_eq!(complete.data["file"], "index.html");
    assert_eq!(
        complete.data["changes"]["css_preloaded"],
        out.changes.css_preloaded
    );
}
