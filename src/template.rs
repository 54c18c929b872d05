//! Template rendering for names, messages and file content.
//!
//! Two renderers share the [`TemplateRenderer`] trait:
//! * [`PlaceholderRenderer`] only replaces `${name}` placeholders.
//! * [`BlockRenderer`] additionally expands `{if expr}...{endif}` and
//!   `{for item in list}...{endfor}` blocks.

use crate::expr::{evaluate, Value};
use log::debug;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^{}]*)\}").expect("placeholder pattern is valid"));

static CONDITIONAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{if\s+([^}]+)\}(.*?)\{endif\}").expect("conditional pattern is valid")
});

static LOOP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{for\s+(\w+)\s+in\s+([^}]+)\}(.*?)\{endfor\}").expect("loop pattern is valid")
});

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders `template` against `context`, a JSON object of bound names.
    ///
    /// Rendering never fails: input that cannot be resolved is left as written.
    fn render(&self, template: &str, context: &serde_json::Value) -> String;
}

/// Text form of a context value when substituted into a template.
pub fn stringify(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Replaces every `${name}` whose name is bound in `context`.
/// Placeholders with unbound names are kept verbatim.
pub fn substitute(template: &str, context: &serde_json::Value) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match context.get(&caps[1]) {
            Some(value) => stringify(value),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Renderer that performs placeholder substitution only.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderRenderer;

impl TemplateRenderer for PlaceholderRenderer {
    fn render(&self, template: &str, context: &serde_json::Value) -> String {
        substitute(template, context)
    }
}

/// Renderer with conditional and loop blocks.
///
/// Passes run in a fixed order: placeholders, then `{if}` blocks, then `{for}`
/// blocks. The body of a `{for}` block is rendered recursively with the loop
/// variable bound, so placeholders and conditions that mention it resolve there.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlockRenderer;

impl BlockRenderer {
    pub fn new() -> Self {
        Self
    }

    fn render_conditionals(&self, template: &str, context: &serde_json::Value) -> String {
        CONDITIONAL
            .replace_all(template, |caps: &Captures| {
                let condition = caps[1].trim();
                match evaluate(condition, context) {
                    Ok(value) if value.is_truthy() => caps[2].to_string(),
                    Ok(_) => String::new(),
                    Err(e) => {
                        debug!("Keeping {{if {}}} block as written: {}", condition, e);
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }

    fn render_loops(&self, template: &str, context: &serde_json::Value) -> String {
        LOOP.replace_all(template, |caps: &Captures| {
            let var_name = &caps[1];
            let list_expr = caps[2].trim();
            let body = &caps[3];

            let items = match context.get(list_expr) {
                Some(serde_json::Value::Array(items)) => items.clone(),
                _ => match evaluate(list_expr, context) {
                    Ok(Value::List(items)) => items.iter().map(Value::to_json).collect(),
                    Ok(other) => {
                        debug!("Keeping {{for}} block as written: '{}' is {:?}", list_expr, other);
                        return caps[0].to_string();
                    }
                    Err(e) => {
                        debug!("Keeping {{for}} block as written: {}", e);
                        return caps[0].to_string();
                    }
                },
            };

            let mut local = match context {
                serde_json::Value::Object(map) => map.clone(),
                _ => serde_json::Map::new(),
            };
            items
                .into_iter()
                .map(|item| {
                    local.insert(var_name.to_string(), item);
                    self.render(body, &serde_json::Value::Object(local.clone()))
                })
                .collect::<String>()
        })
        .into_owned()
    }
}

impl TemplateRenderer for BlockRenderer {
    fn render(&self, template: &str, context: &serde_json::Value) -> String {
        let substituted = substitute(template, context);
        let conditioned = self.render_conditionals(&substituted, context);
        self.render_loops(&conditioned, context)
    }
}
