//! Field-level coercion of loosely typed JSON, plus the light structural
//! coercion applied to summary and task blobs.
//!
//! Every helper has an explicit default and never fails.

use crate::model::{SummaryBlock, TaskItem, TaskList};
use serde_json::{Map, Value};

pub const MAX_SUMMARY_BULLETS: usize = 8;

impl SummaryBlock {
    /// Read `{"bullets": [...]}`. Strings are trimmed, other scalars are
    /// stringified, blanks and containers are dropped.
    pub fn from_value(value: &Value) -> Self {
        let bullets = list_of(value.get("bullets"))
            .iter()
            .filter_map(scalar_text)
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .take(MAX_SUMMARY_BULLETS)
            .collect();
        Self { bullets }
    }
}

impl TaskList {
    /// Read `{"items": [...]}`. Items without any description are dropped.
    pub fn from_value(value: &Value) -> Self {
        let items = list_of(value.get("items"))
            .iter()
            .filter_map(Value::as_object)
            .filter_map(task_item_from_object)
            .collect();
        Self { items }
    }
}

fn task_item_from_object(map: &Map<String, Value>) -> Option<TaskItem> {
    let description = optional_text(first_truthy(map, &["description", "task", "title"]))?;
    let owner = optional_text(map.get("owner"));

    let mut assignees: Vec<String> = list_of(map.get("assignees"))
        .iter()
        .filter_map(scalar_text)
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();
    if assignees.is_empty() {
        assignees.extend(owner.clone());
    }

    Some(TaskItem {
        owner,
        description,
        due: optional_text(map.get("due")),
        priority: optional_text(map.get("priority")),
        source_snippet: optional_text(map.get("source_snippet")),
        assignees,
    })
}

fn optional_text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(scalar_text)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

pub(crate) fn list_of(value: Option<&Value>) -> &[Value] {
    match value {
        Some(Value::Array(items)) => items,
        _ => &[],
    }
}

pub(crate) fn text_of(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Text of a scalar; null and containers yield nothing.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => Some(text_of(value)),
        _ => None,
    }
}

pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

pub(crate) fn first_truthy<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| is_truthy(value))
}

/// Finite float from a number, numeric string, or bool.
pub(crate) fn coerce_f64(value: &Value) -> Option<f64> {
    let f = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => return None,
    };
    f.is_finite().then_some(f)
}

pub(crate) fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
