//! Prompt templates.
//!
//! Templates interpolate `{name}` placeholders, where `name` is made of lowercase ASCII
//! letters, digits and underscores. Any other `{` is literal text, so JSON examples can be
//! written inline. Rendering is a single pass: substituted values are never re-scanned.

use crate::error::TemplateError;
use serde_json::{Map, Value};

/// Renders a template against resolved field values.
///
/// # Errors
/// Returns `TemplateError::UnknownPlaceholder` if a placeholder has no value.
pub fn render(
    template: &str,
    template_name: &str,
    values: &Map<String, Value>,
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        match placeholder_at(after) {
            Some(name) => {
                let value = values.get(name).ok_or_else(|| TemplateError::UnknownPlaceholder {
                    placeholder: name.to_string(),
                    template: template_name.to_string(),
                })?;
                out.push_str(&render_value(value));
                rest = &after[name.len() + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    Ok(out)
}

/// Returns the placeholder name if `text` starts with `name}`.
fn placeholder_at(text: &str) -> Option<&str> {
    let end = text
        .find(|c: char| !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'))?;
    (end > 0 && text[end..].starts_with('}')).then(|| &text[..end])
}

/// Renders one value into prompt text.
///
/// Strings are inserted verbatim, arrays of strings are joined with `", "`, `null` renders
/// empty and everything else renders as compact JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) if items.iter().all(Value::is_string) => {
            items.iter().filter_map(Value::as_str).collect::<Vec<_>>().join(", ")
        }
        other => other.to_string(),
    }
}

/// Renders every string inside a JSON value.
///
/// A string that is exactly one placeholder (`"{inquiry}"`) is replaced by the raw value, so
/// objects and lists survive; other strings are rendered as text.
///
/// # Errors
/// Returns `TemplateError::UnknownPlaceholder` if a placeholder has no value.
pub fn render_json(
    value: &Value,
    template_name: &str,
    values: &Map<String, Value>,
) -> Result<Value, TemplateError> {
    Ok(match value {
        Value::String(s) => match whole_placeholder(s) {
            Some(name) => values.get(name).cloned().ok_or_else(|| {
                TemplateError::UnknownPlaceholder {
                    placeholder: name.to_string(),
                    template: template_name.to_string(),
                }
            })?,
            None => Value::String(render(s, template_name, values)?),
        },
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| render_json(item, template_name, values))
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), render_json(v, template_name, values)?)))
                .collect::<Result<_, TemplateError>>()?,
        ),
        other => other.clone(),
    })
}

fn whole_placeholder(s: &str) -> Option<&str> {
    let inner = s.strip_prefix('{')?;
    placeholder_at(inner).filter(|name| name.len() + 1 == inner.len())
}
