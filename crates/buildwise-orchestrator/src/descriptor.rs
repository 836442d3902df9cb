//! Declarative agent descriptors.
//!
//! Every structured agent is one `AgentDescriptor`: the fields it reads, its prompt, the keys
//! its reply must carry, a fallback payload, and what it adds to the payload afterwards.

use crate::error::{AgentError, TemplateError};
use crate::response::ResponseSchema;
use crate::template::{self, render_json};
use serde_json::{Map, Value};

/// Input handed to an agent: an open mapping that grows through a pipeline.
pub type AgentInput = Map<String, Value>;

/// Value used when a field is absent from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    /// A fixed string.
    Text(&'static str),
    /// An empty list.
    List,
    /// An empty object.
    Object,
    /// JSON `null`.
    Null,
}

impl FieldDefault {
    /// Materialises the default.
    pub fn to_value(self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.to_string()),
            Self::List => Value::Array(Vec::new()),
            Self::Object => Value::Object(Map::new()),
            Self::Null => Value::Null,
        }
    }
}

/// Where a field's value comes from.
#[derive(Debug, Clone, Copy)]
pub enum FieldSource {
    /// Dotted key paths tried in order, separated by `|` (e.g. `"site_feasibility_report.summary|site_summary"`).
    Path(&'static str),
    /// Computed from the whole input.
    Computed(fn(&AgentInput) -> Value),
}

/// One named value made available to templates.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Placeholder name.
    pub name: &'static str,
    /// Value source.
    pub source: FieldSource,
    /// Used when no path resolves to a non-null value.
    pub default: FieldDefault,
}

impl FieldSpec {
    /// A field read by path, defaulting to a string.
    pub const fn text(name: &'static str, path: &'static str, default: &'static str) -> Self {
        Self { name, source: FieldSource::Path(path), default: FieldDefault::Text(default) }
    }

    /// A field read by path, defaulting to an empty list.
    pub const fn list(name: &'static str, path: &'static str) -> Self {
        Self { name, source: FieldSource::Path(path), default: FieldDefault::List }
    }

    /// A field read by path, defaulting to an empty object.
    pub const fn object(name: &'static str, path: &'static str) -> Self {
        Self { name, source: FieldSource::Path(path), default: FieldDefault::Object }
    }

    /// A field computed from the whole input.
    pub const fn computed(name: &'static str, compute: fn(&AgentInput) -> Value) -> Self {
        Self { name, source: FieldSource::Computed(compute), default: FieldDefault::Null }
    }

    /// Resolves the field against an input. Absence is never an error.
    pub fn resolve(&self, input: &AgentInput) -> Value {
        let found = match self.source {
            FieldSource::Path(paths) => {
                paths.split('|').find_map(|path| lookup(input, path.trim())).cloned()
            }
            FieldSource::Computed(compute) => Some(compute(input)).filter(|v| !v.is_null()),
        };
        found.unwrap_or_else(|| self.default.to_value())
    }
}

/// Follows a dotted key path; `null` counts as absent.
pub fn lookup<'a>(input: &'a AgentInput, path: &str) -> Option<&'a Value> {
    let mut keys = path.split('.');
    let mut current = input.get(keys.next()?)?;
    for key in keys {
        current = current.as_object()?.get(key)?;
    }
    (!current.is_null()).then_some(current)
}

/// An image rendered from a prompt template and stored base64-encoded under `field`.
#[derive(Debug, Clone, Copy)]
pub struct ImageSpec {
    /// Payload key receiving the base64 image, or `null` when unavailable.
    pub field: &'static str,
    /// Prompt template; may use descriptor fields and payload keys.
    pub prompt: &'static str,
}

/// Post-processing hook: receives the resolved fields and the payload being built.
pub type FinishHook = fn(&Map<String, Value>, &mut Map<String, Value>);

/// Declarative configuration of one structured agent.
#[derive(Debug, Clone, Copy)]
pub struct AgentDescriptor {
    /// Unique, stable identifier (snake case).
    pub id: &'static str,
    /// Display name; reported as `agent_name`.
    pub name: &'static str,
    /// What the agent does.
    pub description: &'static str,
    /// Short task label used when the service gives no reply ("cost/supply chain").
    pub task: &'static str,
    /// Activity named when the agent faults ("cost and supply chain analysis").
    pub activity: &'static str,
    /// Key the payload is returned (and merged) under.
    pub output_key: &'static str,
    /// Sampling temperature, within `[0, 2]`.
    pub temperature: f32,
    /// Values made available to templates.
    pub fields: &'static [FieldSpec],
    /// Prompt template.
    pub prompt: &'static str,
    /// Keys the model reply must carry.
    pub schema: ResponseSchema,
    /// Static fallback payload; its string values are templates.
    pub fallback: fn() -> Value,
    /// Static entries merged into the payload, overriding the reply; values are templates.
    pub annotations: &'static [(&'static str, &'static str)],
    /// Input keys copied verbatim into the payload when present.
    pub pass_through: &'static [&'static str],
    /// Images rendered after the text reply.
    pub images: &'static [ImageSpec],
    /// Derived fields.
    pub finish: Option<FinishHook>,
}

impl AgentDescriptor {
    /// Resolves every declared field against the input.
    pub fn resolve_fields(&self, input: &AgentInput) -> Map<String, Value> {
        self.fields.iter().map(|field| (field.name.to_string(), field.resolve(input))).collect()
    }

    /// Renders the prompt.
    pub fn render_prompt(&self, fields: &Map<String, Value>) -> Result<String, TemplateError> {
        template::render(self.prompt, self.id, fields)
    }

    /// Renders the fallback payload and checks it against the schema.
    pub fn render_fallback(
        &self,
        fields: &Map<String, Value>,
    ) -> Result<Map<String, Value>, AgentError> {
        let Value::Object(payload) = render_json(&(self.fallback)(), self.id, fields)? else {
            return Err(AgentError::InvalidFallback {
                agent: self.id.to_string(),
                reason: "fallback is not a JSON object".to_string(),
            });
        };

        let missing = self.schema.missing_keys(&payload);
        if !missing.is_empty() {
            return Err(AgentError::InvalidFallback {
                agent: self.id.to_string(),
                reason: format!("missing keys {}", missing.join(", ")),
            });
        }
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(v: Value) -> AgentInput {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_lookup_dotted_path() {
        let data = input(json!({"site_feasibility_report": {"zoning_data": {"allowed_height_m": 12}}}));
        assert_eq!(
            lookup(&data, "site_feasibility_report.zoning_data.allowed_height_m"),
            Some(&json!(12))
        );
        assert_eq!(lookup(&data, "site_feasibility_report.missing"), None);
        assert_eq!(lookup(&data, "site_feasibility_report.zoning_data.allowed_height_m.deeper"), None);
    }

    #[test]
    fn test_field_alternatives_and_defaults() {
        let field = FieldSpec::text(
            "style",
            "architectural_concept.design_summary|architectural_concept.design_style_summary",
            "N/A",
        );

        let legacy = input(json!({"architectural_concept": {"design_style_summary": "Brutalist"}}));
        assert_eq!(field.resolve(&legacy), json!("Brutalist"));

        let current = input(json!({"architectural_concept": {
            "design_summary": "Modernist",
            "design_style_summary": "Brutalist"
        }}));
        assert_eq!(field.resolve(&current), json!("Modernist"));

        assert_eq!(field.resolve(&AgentInput::new()), json!("N/A"));
        assert_eq!(field.resolve(&input(json!({"architectural_concept": null}))), json!("N/A"));
    }

    #[test]
    fn test_computed_field() {
        fn key_count(input: &AgentInput) -> Value {
            json!(input.len())
        }
        let field = FieldSpec::computed("count", key_count);
        assert_eq!(field.resolve(&input(json!({"a": 1, "b": 2}))), json!(2));
    }

    #[test]
    fn test_defaults_materialise() {
        assert_eq!(FieldDefault::List.to_value(), json!([]));
        assert_eq!(FieldDefault::Object.to_value(), json!({}));
        assert_eq!(FieldDefault::Null.to_value(), Value::Null);
        assert_eq!(FieldDefault::Text("medium").to_value(), json!("medium"));
    }
}
