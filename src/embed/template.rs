//! Template types for typed variable injection.

use std::marker::PhantomData;

/// Trait for template variable sets
pub trait TemplateVars {
    fn apply(&self, content: &str) -> String;
}

/// Template with typed variable injection
#[derive(Debug, Clone, Copy)]
pub struct Template<V> {
    content: &'static str,
    _marker: PhantomData<V>,
}

impl<V> Template<V> {
    pub const fn new(content: &'static str) -> Self {
        Self {
            content,
            _marker: PhantomData,
        }
    }
}

impl<V: TemplateVars> Template<V> {
    /// Render with `vars`. Surrounding whitespace from the source file is dropped.
    pub fn render(&self, vars: &V) -> String {
        vars.apply(self.content.trim())
    }
}

/// Encode `value` as a JavaScript string literal.
pub fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NameVars<'a> {
        name: &'a str,
    }

    impl TemplateVars for NameVars<'_> {
        fn apply(&self, content: &str) -> String {
            content.replace("__NAME__", &js_string(self.name))
        }
    }

    #[test]
    fn test_render_replaces_and_trims() {
        const TPL: Template<NameVars<'static>> = Template::new("\n hello(__NAME__);\n");
        assert_eq!(TPL.render(&NameVars { name: "x" }), "hello(\"x\");");
    }

    #[test]
    fn test_js_string_escapes_quotes() {
        assert_eq!(js_string("a\"b"), r#""a\"b""#);
        assert_eq!(js_string("http://127.0.0.1:7242/ingest"), r#""http://127.0.0.1:7242/ingest""#);
    }
}
