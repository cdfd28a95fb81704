use anyhow::Result;

use crate::cancel::Signal;
use crate::extensions::Previewer;
use crate::types::{Item, PreviewPayload};

/// Previews the textual `detail` fields of an item.
///
/// Reads `detail.text` (string or array of strings) and `detail.filetype`;
/// falls back to previewing the value itself.
#[derive(Debug, Default)]
pub struct TextPreviewer;

impl Previewer for TextPreviewer {
    fn name(&self) -> &str {
        "text"
    }

    fn preview(&self, item: &Item, signal: &Signal) -> Result<Option<PreviewPayload>> {
        signal.check()?;
        let content = match item.detail.get("text") {
            Some(serde_json::Value::String(text)) => {
                text.lines().map(str::to_string).collect()
            }
            Some(serde_json::Value::Array(lines)) => lines
                .iter()
                .filter_map(|line| line.as_str().map(str::to_string))
                .collect(),
            _ => vec![item.value.clone()],
        };
        let mut payload = PreviewPayload::new(content);
        if let Some(filetype) = item.detail.get("filetype").and_then(|v| v.as_str()) {
            payload = payload.with_filetype(filetype);
        }
        Ok(Some(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_string_detail_into_lines() {
        let item = Item::new("note").with_detail(serde_json::json!({
            "text": "first\nsecond",
            "filetype": "markdown",
        }));
        let payload = TextPreviewer
            .preview(&item, &Signal::new())
            .expect("preview")
            .expect("payload");
        assert_eq!(payload.content, ["first", "second"]);
        assert_eq!(payload.filetype.as_deref(), Some("markdown"));
    }

    #[test]
    fn falls_back_to_the_value() {
        let item = Item::new("bare");
        let payload = TextPreviewer
            .preview(&item, &Signal::new())
            .expect("preview")
            .expect("payload");
        assert_eq!(payload.content, ["bare"]);
        assert!(payload.filetype.is_none());
    }
}
