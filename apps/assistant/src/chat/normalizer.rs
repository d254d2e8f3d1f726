//! Response normalization — turns one raw AI reply into canonical chat text.
//!
//! The canonical vocabulary is deliberately tiny: `**…**` heading lines,
//! `- ` bullet lines, `*…*` note lines, blank-line paragraph breaks, and plain
//! text. Whatever shape the model answers in, the output of [`normalize`] uses
//! only these conventions, so the line renderer has a single format to
//! understand.

use std::fmt::Write;

use serde_json::{Map, Value};

use crate::chat::shape::{item_text, value_text, AdviceCategory, ReplyShape, TipCategory, TitledAdvice};

/// Header line emitted above a `tips_to_improve_resume` document.
pub const TIPS_HEADER: &str = "Here are some tips to improve your resume:";

/// Intro line for an array reply none of whose elements carry usable text.
const LIST_FALLBACK_INTRO: &str = "Here's some advice for you:";

/// Normalizes one raw AI reply into canonical text.
///
/// Total: every input maps to some readable string. A reply that is not valid
/// JSON is already plain text and passes through unchanged — parse failure is
/// the common branch here, not an error.
pub fn normalize(raw: &str) -> String {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => render_shape(ReplyShape::classify(value)),
        Err(_) => raw.to_string(),
    }
}

fn render_shape(shape: ReplyShape) -> String {
    match shape {
        ReplyShape::Text(text) => text,
        ReplyShape::ResumeTips(categories) => render_resume_tips(&categories),
        ReplyShape::TitledAdvice(advice) => render_titled_advice(&advice),
        ReplyShape::List(items) => render_list(&items),
        ReplyShape::Document(map) => render_document(map),
        ReplyShape::Scalar(value) => pretty(&value),
    }
}

fn render_resume_tips(categories: &[TipCategory]) -> String {
    let mut out = format!("{TIPS_HEADER}\n\n");
    for TipCategory { category, advice } in categories {
        let _ = writeln!(out, "**{category}:**");
        if let Some(tips) = advice {
            for tip in tips {
                let _ = writeln!(out, "- {tip}");
            }
        }
        out.push('\n');
    }
    out
}

fn render_titled_advice(advice: &TitledAdvice) -> String {
    let mut out = format!("**{}**\n\n", advice.title);
    for AdviceCategory { category, points } in &advice.categories {
        let _ = writeln!(out, "**{category}**");
        for point in points {
            let _ = writeln!(out, "- {point}");
        }
        out.push('\n');
    }
    if let Some(note) = &advice.note {
        let _ = writeln!(out, "*Note: {note}*");
    }
    out
}

/// Numbered list. Elements that yield no text keep their slot in the
/// numbering; if nothing yields text at all, fall back to an intro line plus
/// the raw values.
fn render_list(items: &[Value]) -> String {
    let mut out = String::new();
    for (index, item) in items.iter().enumerate() {
        if let Some(text) = item_text(item) {
            let _ = writeln!(out, "{}. {text}", index + 1);
        }
    }
    if out.is_empty() {
        let joined: Vec<String> = items.iter().map(value_text).collect();
        out = format!("{LIST_FALLBACK_INTRO}\n{}", joined.join("\n"));
    }
    out
}

/// Generic object: a `**Key:** value` section per non-empty string field and a
/// numbered section per non-empty array field. Keys iterate in serde_json's
/// sorted map order, so the output is deterministic for a given document.
fn render_document(map: Map<String, Value>) -> String {
    let mut out = String::new();
    for (key, value) in &map {
        match value {
            Value::String(text) if !text.is_empty() => {
                let _ = write!(out, "**{}:** {text}\n\n", capitalize(key));
            }
            Value::Array(items) if !items.is_empty() => {
                let _ = writeln!(out, "**{}:**", capitalize(key));
                for (index, item) in items.iter().enumerate() {
                    let _ = writeln!(out, "{}. {}", index + 1, value_text(item));
                }
                out.push('\n');
            }
            _ => {}
        }
    }
    if out.is_empty() {
        // Nothing renderable — show the document itself rather than nothing.
        pretty(&Value::Object(map))
    } else {
        out
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
