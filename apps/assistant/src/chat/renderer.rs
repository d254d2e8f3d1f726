//! Line renderer — classifies canonical chat text into display blocks.
//!
//! Understands exactly the vocabulary the normalizer emits, nothing more.
//! Full markdown is out of scope.

use serde::Serialize;

/// One renderable unit of canonical text. Immutable once produced; derived on
/// every render rather than stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum DisplayBlock {
    /// A line wrapped in `**…**`.
    Heading(String),
    /// A line starting with `- `.
    Bullet(String),
    /// A line wrapped in single `*…*`.
    Note(String),
    /// A blank line.
    Break,
    /// Anything else.
    Plain(String),
}

/// Splits canonical text on newlines and classifies each line independently.
///
/// Pure and restartable: safe to call on every render pass. Unrecognized
/// lines always fall through to [`DisplayBlock::Plain`] — there is no failure
/// mode.
pub fn render(text: &str) -> impl Iterator<Item = DisplayBlock> + '_ {
    text.lines().map(classify_line)
}

/// Classification order mirrors the vocabulary priority: heading before
/// bullet before note before break. The patterns require different leading
/// tokens, so at most one can match a given line.
fn classify_line(line: &str) -> DisplayBlock {
    if let Some(inner) = line.strip_prefix("**").and_then(|rest| rest.strip_suffix("**")) {
        return DisplayBlock::Heading(inner.to_string());
    }
    if let Some(item) = line.strip_prefix("- ") {
        return DisplayBlock::Bullet(item.to_string());
    }
    if let Some(inner) = line.strip_prefix('*').and_then(|rest| rest.strip_suffix('*')) {
        return DisplayBlock::Note(inner.to_string());
    }
    if line.trim().is_empty() {
        return DisplayBlock::Break;
    }
    DisplayBlock::Plain(line.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(text: &str) -> Vec<DisplayBlock> {
        render(text).collect()
    }

    #[test]
    fn test_renders_full_sequence() {
        assert_eq!(
            blocks("**Title**\n- item1\n- item2\n\n*note*"),
            vec![
                DisplayBlock::Heading("Title".to_string()),
                DisplayBlock::Bullet("item1".to_string()),
                DisplayBlock::Bullet("item2".to_string()),
                DisplayBlock::Break,
                DisplayBlock::Note("note".to_string()),
            ]
        );
    }

    #[test]
    fn test_heading_beats_note() {
        // `**x**` also starts and ends with a single `*`; heading must win.
        assert_eq!(
            blocks("**Formatting:**"),
            vec![DisplayBlock::Heading("Formatting:".to_string())]
        );
    }

    #[test]
    fn test_plain_lines_fall_through() {
        assert_eq!(
            blocks("just prose"),
            vec![DisplayBlock::Plain("just prose".to_string())]
        );
        // A dash without the trailing space is not a bullet.
        assert_eq!(
            blocks("-dash"),
            vec![DisplayBlock::Plain("-dash".to_string())]
        );
        // An unterminated emphasis marker is not a note.
        assert_eq!(
            blocks("*open"),
            vec![DisplayBlock::Plain("*open".to_string())]
        );
    }

    #[test]
    fn test_whitespace_only_line_is_break() {
        assert_eq!(blocks("a\n   \nb").len(), 3);
        assert_eq!(blocks("a\n   \nb")[1], DisplayBlock::Break);
    }

    #[test]
    fn test_empty_text_yields_no_blocks() {
        assert_eq!(blocks(""), Vec::new());
    }

    #[test]
    fn test_render_is_restartable() {
        let text = "**T**\n- a";
        let first: Vec<_> = render(text).collect();
        let second: Vec<_> = render(text).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_blocks_serialize_tagged() {
        let heading = serde_json::to_value(DisplayBlock::Heading("T".to_string())).unwrap();
        assert_eq!(heading, serde_json::json!({"kind": "heading", "text": "T"}));
        let brk = serde_json::to_value(DisplayBlock::Break).unwrap();
        assert_eq!(brk, serde_json::json!({"kind": "break"}));
    }
}
