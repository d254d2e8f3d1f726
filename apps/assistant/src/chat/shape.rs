//! Reply shape detection — classifies an untyped AI reply into one of the
//! ad-hoc document shapes the model is known to produce.
//!
//! The backend promises nothing about its replies: most are plain prose, but
//! structured answers arrive as JSON in a handful of recurring layouts. This
//! module is the single place where those layouts are told apart, so the
//! precedence between them stays auditable and testable per variant.

use serde_json::{Map, Value};

/// Object fields that carry the whole reply as one string, in priority order.
const SINGULAR_FIELDS: [&str; 5] = ["message", "response", "answer", "content", "text"];

/// Object fields an array element may carry its text in, in priority order.
const ITEM_TEXT_FIELDS: [&str; 3] = ["text", "message", "advice"];

/// One advice category from a `tips_to_improve_resume` document.
#[derive(Debug, Clone, PartialEq)]
pub struct TipCategory {
    pub category: String,
    /// `None` when the category object has no advice array; such a category
    /// still contributes its heading.
    pub advice: Option<Vec<String>>,
}

/// One advice category from a `title` + `advice` document.
#[derive(Debug, Clone, PartialEq)]
pub struct AdviceCategory {
    pub category: String,
    pub points: Vec<String>,
}

/// A `title` + `advice` document, with an optional trailing note.
#[derive(Debug, Clone, PartialEq)]
pub struct TitledAdvice {
    pub title: String,
    pub categories: Vec<AdviceCategory>,
    pub note: Option<String>,
}

/// The closed union of reply documents the normalizer understands.
///
/// Classification is ordered — the first matching variant wins:
/// string > singular message field > resume tips > titled advice > array >
/// generic object > scalar. Reordering these checks changes user-visible
/// output, so the order is part of the contract.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyShape {
    /// The reply was a JSON string, or an object carrying one of the singular
    /// message fields.
    Text(String),
    /// `{"tips_to_improve_resume": [{category, advice}, ...]}`
    ResumeTips(Vec<TipCategory>),
    /// `{"title": ..., "advice": [{category, points}, ...], "note"?: ...}`
    TitledAdvice(TitledAdvice),
    /// A bare JSON array of tips.
    List(Vec<Value>),
    /// Any other JSON object.
    Document(Map<String, Value>),
    /// A non-string JSON scalar (number, bool, null).
    Scalar(Value),
}

impl ReplyShape {
    /// Classifies a parsed JSON value.
    pub fn classify(value: Value) -> ReplyShape {
        match value {
            Value::String(text) => ReplyShape::Text(text),
            Value::Array(items) => ReplyShape::List(items),
            Value::Object(map) => Self::classify_object(map),
            scalar => ReplyShape::Scalar(scalar),
        }
    }

    fn classify_object(map: Map<String, Value>) -> ReplyShape {
        for field in SINGULAR_FIELDS {
            if let Some(Value::String(text)) = map.get(field) {
                if !text.is_empty() {
                    return ReplyShape::Text(text.clone());
                }
            }
        }

        if let Some(Value::Array(items)) = map.get("tips_to_improve_resume") {
            let categories = items.iter().filter_map(tip_category).collect();
            return ReplyShape::ResumeTips(categories);
        }

        if let Some(advice) = titled_advice(&map) {
            return ReplyShape::TitledAdvice(advice);
        }

        ReplyShape::Document(map)
    }
}

/// Renders any JSON value as display text: strings verbatim, everything else
/// in its compact JSON form.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Extracts the display text of one array element, if it has any.
pub fn item_text(item: &Value) -> Option<String> {
    match item {
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => ITEM_TEXT_FIELDS.iter().find_map(|field| match map.get(*field) {
            Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
            _ => None,
        }),
        _ => None,
    }
}

/// Decodes one `tips_to_improve_resume` element. Elements without a category
/// name are malformed and skipped, per the degrade-not-abort rule.
fn tip_category(item: &Value) -> Option<TipCategory> {
    let map = item.as_object()?;
    let category = nonempty_string(map.get("category"))?;
    let advice = map
        .get("advice")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().map(value_text).collect());
    Some(TipCategory { category, advice })
}

/// Decodes a `title` + `advice` document. Both keys must be present; advice
/// categories only come from an array value, anything else yields none.
fn titled_advice(map: &Map<String, Value>) -> Option<TitledAdvice> {
    let title = nonempty_string(map.get("title"))?;
    let advice = map.get("advice")?;
    let categories = match advice {
        Value::Array(items) => items.iter().filter_map(advice_category).collect(),
        _ => Vec::new(),
    };
    Some(TitledAdvice {
        title,
        categories,
        note: nonempty_string(map.get("note")),
    })
}

fn advice_category(item: &Value) -> Option<AdviceCategory> {
    let map = item.as_object()?;
    let category = nonempty_string(map.get("category"))?;
    let points = map
        .get("points")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().map(value_text).collect())
        .unwrap_or_default();
    Some(AdviceCategory { category, points })
}

fn nonempty_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
        _ => None,
    }
}
