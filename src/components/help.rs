use anyhow::Result;

use crate::host::{Host, WindowId};

/// Help overlay component: pages of plain text, toggled and paged by
/// events.
#[derive(Debug, Default)]
pub struct HelpComponent {
    window: Option<WindowId>,
    lines: Vec<String>,
    page: usize,
    page_height: usize,
    visible: bool,
    dirty: bool,
}

impl HelpComponent {
    #[must_use]
    pub fn new(page_height: usize) -> Self {
        Self {
            page_height: page_height.max(1),
            ..Self::default()
        }
    }

    pub fn attach(&mut self, window: WindowId) {
        self.window = Some(window);
        self.dirty = true;
    }

    pub fn detach(&mut self) -> Option<WindowId> {
        self.window.take()
    }

    /// Replace the help text (typically the action and key summaries).
    pub fn set_lines(&mut self, lines: Vec<String>) {
        self.lines = lines;
        self.page = 0;
        self.dirty = true;
    }

    /// Toggle visibility; returns the new state so the orchestrator can
    /// open or close the overlay window.
    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        self.page = 0;
        self.dirty = true;
        self.visible
    }

    /// Move by whole pages, clamped to the available range.
    pub fn page_by(&mut self, amount: i64) {
        let last = self.page_count().saturating_sub(1);
        let moved = (self.page as i64 + amount).clamp(0, last as i64) as usize;
        if moved != self.page {
            self.page = moved;
            self.dirty = true;
        }
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.lines.len().div_ceil(self.page_height).max(1)
    }

    /// Write the current page; returns whether anything changed.
    pub fn render(&mut self, host: &mut dyn Host) -> Result<bool> {
        let (true, Some(window)) = (self.dirty, self.window) else {
            return Ok(false);
        };
        if !self.visible {
            self.dirty = false;
            return Ok(false);
        }
        let start = self.page * self.page_height;
        let end = (start + self.page_height).min(self.lines.len());
        let page = if start < end {
            self.lines[start..end].to_vec()
        } else {
            Vec::new()
        };
        host.set_content(window, &page)?;
        self.dirty = false;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryHost, WindowRect};

    fn lines(count: usize) -> Vec<String> {
        (0..count).map(|n| format!("line-{n}")).collect()
    }

    #[test]
    fn pages_clamp_at_both_ends() {
        let mut component = HelpComponent::new(2);
        component.set_lines(lines(5));
        assert_eq!(component.page_count(), 3);

        component.page_by(-1);
        assert_eq!(component.page(), 0);
        component.page_by(10);
        assert_eq!(component.page(), 2);
    }

    #[test]
    fn toggle_flips_visibility_and_resets_the_page() {
        let mut component = HelpComponent::new(2);
        component.set_lines(lines(5));
        component.page_by(2);

        assert!(component.toggle());
        assert_eq!(component.page(), 0);
        assert!(!component.toggle());
    }

    #[test]
    fn renders_the_current_page_when_visible() {
        let mut host = MemoryHost::new();
        let window = host
            .open_window(WindowRect {
                row: 5,
                col: 5,
                width: 40,
                height: 2,
            })
            .expect("open");
        let mut component = HelpComponent::new(2);
        component.attach(window);
        component.set_lines(lines(5));

        // Hidden help renders nothing.
        assert!(!component.render(&mut host).expect("render"));

        component.toggle();
        component.page_by(1);
        assert!(component.render(&mut host).expect("render"));
        assert_eq!(
            host.window(window).expect("record").lines,
            ["line-2", "line-3"]
        );
    }
}
