use anyhow::Result;

use crate::host::{Host, WindowId};

/// Query line component.
#[derive(Debug, Default)]
pub struct InputComponent {
    window: Option<WindowId>,
    query: String,
    cmdpos: usize,
    failed: bool,
    dirty: bool,
}

impl InputComponent {
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

    pub fn set_query(&mut self, query: &str) {
        if self.query != query {
            self.query = query.to_string();
            self.dirty = true;
        }
    }

    pub fn set_cmdpos(&mut self, cmdpos: usize) {
        if self.cmdpos != cmdpos {
            self.cmdpos = cmdpos;
            self.dirty = true;
        }
    }

    pub fn set_failed(&mut self, failed: bool) {
        if self.failed != failed {
            self.failed = failed;
            self.dirty = true;
        }
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn failed(&self) -> bool {
        self.failed
    }

    #[must_use]
    pub fn cmdpos(&self) -> usize {
        self.cmdpos
    }

    /// Write the query line; returns whether anything changed.
    pub fn render(&mut self, host: &mut dyn Host) -> Result<bool> {
        let (true, Some(window)) = (self.dirty, self.window) else {
            return Ok(false);
        };
        host.set_content(window, &[self.query.clone()])?;
        self.dirty = false;
        Ok(true)
    }
}
