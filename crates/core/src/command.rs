//! Command parser and normalizer.
//!
//! Deserializes a repaired payload into a [`Command`], folding action
//! synonyms, coercing nested values into strings, and checking required
//! fields. This is the only stage allowed to give up on a block: a payload
//! that does not deserialize is dropped with a diagnostic.

use crate::diag::{Diagnostic, Span, Stage, codes, ctx, snippet};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use toolfence_profile::Profile;

/// Name of the mandatory action field.
pub const ACTION_FIELD: &str = "action";

/// Name of the description field.
pub const DESCRIPTION_FIELD: &str = "description";

/// A validated tool call.
///
/// Every field value is a plain string; nested structures have already been
/// serialized. Executors must still treat each value as untrusted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Canonical action name.
    pub action: String,
    /// Parameters in payload order, excluding `action` and `description`.
    pub fields: IndexMap<String, String>,
    /// Human-readable label.
    pub description: String,
}

impl Command {
    /// Look up a field value.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// The description used when the payload does not supply one.
    pub fn default_description(action: &str) -> String {
        format!("Executing {action}")
    }
}

/// Lookup key for synonym folding: trimmed, ASCII-lowercased, with `-` and
/// spaces turned into `_`.
fn action_key(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

/// Fold `name` onto its canonical action name.
///
/// Known synonyms map to their target, a differently-spelled canonical name
/// (`Create-File`) maps to its canonical spelling, and anything else is
/// returned trimmed but otherwise unchanged.
pub fn fold_action(name: &str, profile: &Profile) -> String {
    let key = action_key(name);
    if let Some(to) = profile
        .action_synonyms
        .iter()
        .find_map(|(from, to)| (action_key(from) == key).then_some(to))
    {
        return to.clone();
    }
    if profile.is_canonical_action(&key) {
        return key;
    }
    name.trim().to_string()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parse one block payload into a command.
///
/// Returns `None` (after pushing an error diagnostic) when the payload is
/// empty, does not deserialize, is not an object, lacks a usable action, or
/// lacks a profile-required field. All other corrections are recorded as
/// warnings or notes and the command is returned.
pub fn parse_command(
    payload: &str,
    span: Span,
    profile: &Profile,
    issues: &mut Vec<Diagnostic>,
) -> Option<Command> {
    if payload.trim().is_empty() {
        issues.push(Diagnostic::error(
            codes::EMPTY_BLOCK,
            Stage::Parse,
            "empty tool_call block",
            Some(span),
        ));
        return None;
    }

    let value: Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(e) => {
            issues.push(
                Diagnostic::error(
                    codes::PARSE_FAILURE,
                    Stage::Parse,
                    format!("tool_call payload is not valid JSON: {e}"),
                    Some(span),
                )
                .with_snippet(snippet(payload, profile.snippet_chars))
                .with_context(ctx!(
                    "reason" => e.to_string(),
                    "line" => e.line().to_string(),
                    "column" => e.column().to_string(),
                )),
            );
            return None;
        }
    };

    let mut map = match value {
        Value::Object(map) => map,
        other => {
            issues.push(
                Diagnostic::error(
                    codes::NOT_AN_OBJECT,
                    Stage::Parse,
                    format!(
                        "tool_call payload must be a JSON object, found {}",
                        value_kind(&other)
                    ),
                    Some(span),
                )
                .with_snippet(snippet(payload, profile.snippet_chars))
                .with_context(ctx!("kind" => value_kind(&other))),
            );
            return None;
        }
    };

    let raw_action = match map.shift_remove(ACTION_FIELD) {
        Some(Value::String(s)) if !s.trim().is_empty() => s,
        other => {
            let reason = match &other {
                None => "absent".to_string(),
                Some(Value::String(_)) => "empty".to_string(),
                Some(v) => format!("not a string ({})", value_kind(v)),
            };
            issues.push(
                Diagnostic::error(
                    codes::MISSING_ACTION,
                    Stage::Validate,
                    format!("tool_call payload has no usable 'action' field: {reason}"),
                    Some(span),
                )
                .with_snippet(snippet(payload, profile.snippet_chars))
                .with_context(ctx!("field" => ACTION_FIELD, "reason" => reason)),
            );
            return None;
        }
    };

    let action = fold_action(&raw_action, profile);
    if action != raw_action.trim() {
        issues.push(
            Diagnostic::info(
                codes::ACTION_FOLDED,
                Stage::Normalize,
                format!("action '{raw_action}' normalized to '{action}'"),
                Some(span),
            )
            .with_context(ctx!("from" => raw_action.clone(), "to" => action.clone())),
        );
    }

    let description = match map.shift_remove(DESCRIPTION_FIELD) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::String(_) | Value::Null) | None => None,
        Some(other) => {
            coerce_value(DESCRIPTION_FIELD, other, &action, span, profile, issues)
        }
    };
    let description = description.unwrap_or_else(|| Command::default_description(&action));

    let fields = normalize_fields(map, &action, span, profile, issues);

    if let Some(missing) = profile
        .required_for(&action)
        .iter()
        .find(|f| !fields.contains_key(f.as_str()))
    {
        issues.push(
            Diagnostic::error(
                codes::MISSING_REQUIRED_FIELD,
                Stage::Validate,
                format!("'{action}' requires field '{missing}'"),
                Some(span),
            )
            .with_context(ctx!("action" => action.clone(), "field" => missing.clone())),
        );
        return None;
    }

    Some(Command {
        action,
        fields,
        description,
    })
}

/// Convert every remaining payload entry into a string field.
fn normalize_fields(
    map: Map<String, Value>,
    action: &str,
    span: Span,
    profile: &Profile,
    issues: &mut Vec<Diagnostic>,
) -> IndexMap<String, String> {
    let mut fields = IndexMap::with_capacity(map.len());
    for (name, value) in map {
        if let Some(text) = coerce_value(&name, value, action, span, profile, issues) {
            fields.insert(name, text);
        }
    }
    fields
}

/// Turn one JSON value into a field string.
///
/// Strings pass through; numbers and booleans are stringified; `null` is
/// dropped; arrays and objects are serialized, pretty-printed for textual
/// fields and compact otherwise.
fn coerce_value(
    name: &str,
    value: Value,
    action: &str,
    span: Span,
    profile: &Profile,
    issues: &mut Vec<Diagnostic>,
) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null => {
            issues.push(
                Diagnostic::info(
                    codes::NULL_FIELD_DROPPED,
                    Stage::Normalize,
                    format!("field '{name}' of '{action}' was null and has been dropped"),
                    Some(span),
                )
                .with_context(ctx!("field" => name, "action" => action)),
            );
            None
        }
        nested @ (Value::Array(_) | Value::Object(_)) => {
            let kind = value_kind(&nested);
            let textual = profile.is_textual_field(name);
            let text = if textual {
                format!("{nested:#}")
            } else {
                nested.to_string()
            };
            issues.push(
                Diagnostic::warn(
                    codes::VALUE_COERCED,
                    Stage::Normalize,
                    format!("field '{name}' of '{action}' held an {kind}; serialized to a string"),
                    Some(span),
                )
                .with_snippet(snippet(&text, profile.snippet_chars))
                .with_context(ctx!(
                    "kind" => "coerced",
                    "field" => name,
                    "from" => kind,
                    "style" => if textual { "pretty" } else { "compact" },
                )),
            );
            Some(text)
        }
    }
}
