use anyhow::Result;

use crate::host::{Host, WindowId};
use crate::types::{Decoration, DisplayItem};

/// Visible result list component.
#[derive(Debug, Default)]
pub struct ListComponent {
    window: Option<WindowId>,
    lines: Vec<String>,
    decorations: Vec<Decoration>,
    cursor_line: usize,
    failed: bool,
    dirty: bool,
}

impl ListComponent {
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

    /// Replace the visible window with the render stage's output.
    pub fn set_window(&mut self, items: &[DisplayItem], cursor_line: usize) {
        self.lines = items.iter().map(|item| item.label.clone()).collect();
        self.decorations = items
            .iter()
            .flat_map(|item| item.decorations.iter().copied())
            .collect();
        self.cursor_line = cursor_line;
        self.dirty = true;
    }

    pub fn set_failed(&mut self, failed: bool) {
        if self.failed != failed {
            self.failed = failed;
            self.dirty = true;
        }
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    #[must_use]
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Raw host command escape hatch for the list window.
    pub fn execute(&mut self, host: &mut dyn Host, command: &str) -> Result<()> {
        if let Some(window) = self.window {
            host.execute(window, command)?;
        }
        Ok(())
    }

    /// Write content, decorations, and the cursor line; returns whether
    /// anything changed.
    pub fn render(&mut self, host: &mut dyn Host) -> Result<bool> {
        let (true, Some(window)) = (self.dirty, self.window) else {
            return Ok(false);
        };
        host.set_content(window, &self.lines)?;
        host.set_decorations(window, &self.decorations)?;
        if self.cursor_line > 0 {
            host.set_cursor_line(window, self.cursor_line)?;
        }
        self.dirty = false;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::host::{MemoryHost, WindowRect};
    use crate::types::Item;

    fn display(value: &str, decorations: Vec<Decoration>) -> DisplayItem {
        let mut item = DisplayItem::new(Rc::new(Item::new(value)));
        item.decorations = decorations;
        item
    }

    #[test]
    fn writes_labels_decorations_and_cursor() {
        let mut host = MemoryHost::new();
        let window = host
            .open_window(WindowRect {
                row: 1,
                col: 0,
                width: 40,
                height: 10,
            })
            .expect("open");
        let mut component = ListComponent::new();
        component.attach(window);
        component.set_window(
            &[
                display("apple", vec![Decoration::span(1, 1, 2)]),
                display("apricot", vec![Decoration::span(2, 1, 2)]),
            ],
            2,
        );

        assert!(component.render(&mut host).expect("render"));
        let record = host.window(window).expect("record");
        assert_eq!(record.lines, ["apple", "apricot"]);
        assert_eq!(record.decorations.len(), 2);
        assert_eq!(record.cursor_line, 2);

        assert!(!component.render(&mut host).expect("render"));
    }

    #[test]
    fn execute_passes_commands_to_the_window() {
        let mut host = MemoryHost::new();
        let window = host
            .open_window(WindowRect {
                row: 0,
                col: 0,
                width: 10,
                height: 5,
            })
            .expect("open");
        let mut component = ListComponent::new();
        component.attach(window);
        component
            .execute(&mut host, "normal! \\<C-d>")
            .expect("execute");
        assert_eq!(
            host.window(window).expect("record").executed,
            ["normal! \\<C-d>"]
        );
    }
}
