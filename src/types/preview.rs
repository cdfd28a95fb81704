use serde::{Deserialize, Serialize};

/// Content produced by a previewer for the item under the cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewPayload {
    pub content: Vec<String>,
    /// Filetype hint for the host's syntax highlighting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filetype: Option<String>,
}

impl PreviewPayload {
    #[must_use]
    pub fn new(content: Vec<String>) -> Self {
        Self {
            content,
            filetype: None,
        }
    }

    #[must_use]
    pub fn with_filetype(mut self, filetype: impl Into<String>) -> Self {
        self.filetype = Some(filetype.into());
        self
    }
}
