use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// A unit flowing through the pipeline.
///
/// `value` is the fundamental identifier: collection dedupes on it and
/// selection follows `id`, the 0-based insertion order assigned when the
/// item enters the collected buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub value: String,
    /// Opaque structured payload consumed by renderers, previewers, and
    /// actions.
    #[serde(default)]
    pub detail: serde_json::Value,
    /// Display string; `value` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorations: Vec<Decoration>,
    /// Matcher-assigned score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Item {
    /// Item carrying only a value; the collect stage assigns the real id.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            id: 0,
            value: value.into(),
            detail: serde_json::Value::Null,
            label: None,
            decorations: Vec::new(),
            score: None,
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = detail;
        self
    }

    /// Display string, falling back to the value.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.value)
    }
}

/// Highlight span attached to a display line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoration {
    /// 1-based line within the window.
    pub line: usize,
    /// 1-based column of the first highlighted cell.
    pub column: usize,
    pub length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<u32>,
}

impl Decoration {
    #[must_use]
    pub fn span(line: usize, column: usize, length: usize) -> Self {
        Self {
            line,
            column,
            length,
            highlight: None,
        }
    }
}

/// Window entry handed to the current renderer.
///
/// The renderer mutates `label` and `decorations` in place; the underlying
/// item is shared with the rest of the pipeline and stays untouched.
#[derive(Debug, Clone)]
pub struct DisplayItem {
    pub item: Rc<Item>,
    pub label: String,
    pub decorations: Vec<Decoration>,
}

impl DisplayItem {
    /// Wrap an item with the default `label = value` and no decorations.
    #[must_use]
    pub fn new(item: Rc<Item>) -> Self {
        let label = item.label().to_string();
        Self {
            item,
            label,
            decorations: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_falls_back_to_value() {
        let item = Item::new("src/main.rs");
        assert_eq!(item.label(), "src/main.rs");

        let labelled = Item {
            label: Some("main.rs".into()),
            ..Item::new("src/main.rs")
        };
        assert_eq!(labelled.label(), "main.rs");
    }

    #[test]
    fn display_item_starts_from_item_label() {
        let item = Rc::new(Item::new("alpha"));
        let display = DisplayItem::new(Rc::clone(&item));
        assert_eq!(display.label, "alpha");
        assert!(display.decorations.is_empty());
    }

    #[test]
    fn item_round_trips_through_serde() {
        let item = Item {
            id: 7,
            score: Some(0.5),
            decorations: vec![Decoration::span(1, 3, 2)],
            ..Item::new("alpha").with_detail(serde_json::json!({"path": "alpha"}))
        };
        let encoded = serde_json::to_string(&item).expect("serialize");
        let decoded: Item = serde_json::from_str(&encoded).expect("deserialize");
        assert_eq!(decoded, item);
    }
}
