use anyhow::Result;

use crate::host::{Host, WindowId};
use crate::types::PreviewPayload;

/// Preview pane component.
#[derive(Debug, Default)]
pub struct PreviewComponent {
    window: Option<WindowId>,
    payload: Option<PreviewPayload>,
    failed: bool,
    dirty: bool,
}

impl PreviewComponent {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, window: WindowId) {
        self.window = Some(window);
        self.dirty = true;
    }

    pub fn detach(&mut self) -> Option<WindowId> {
        self.window.take()
    }

    /// Replace the preview content; `None` clears the pane.
    pub fn set_payload(&mut self, payload: Option<PreviewPayload>) {
        if self.payload != payload {
            self.payload = payload;
            self.dirty = true;
        }
    }

    pub fn set_failed(&mut self, failed: bool) {
        if self.failed != failed {
            self.failed = failed;
            self.dirty = true;
        }
    }

    /// Filetype hint of the current payload, for the host's highlighting.
    #[must_use]
    pub fn filetype(&self) -> Option<&str> {
        self.payload.as_ref()?.filetype.as_deref()
    }

    #[must_use]
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Raw host command escape hatch for the preview window.
    pub fn execute(&mut self, host: &mut dyn Host, command: &str) -> Result<()> {
        if let Some(window) = self.window {
            host.execute(window, command)?;
        }
        Ok(())
    }

    /// Write the preview content; returns whether anything changed.
    pub fn render(&mut self, host: &mut dyn Host) -> Result<bool> {
        let (true, Some(window)) = (self.dirty, self.window) else {
            return Ok(false);
        };
        let lines = self
            .payload
            .as_ref()
            .map(|payload| payload.content.clone())
            .unwrap_or_default();
        host.set_content(window, &lines)?;
        self.dirty = false;
        Ok(true)
    }
}
