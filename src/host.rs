//! What the engine demands from the editor host.
//!
//! The core never renders pixels or cells: it opens floating windows,
//! writes plain lines and decoration spans into their buffers, and asks the
//! host to redraw. Everything visual beyond that (borders, spinners,
//! styling) belongs to the host and the coordinator extension.

use std::collections::{HashMap, VecDeque};

use anyhow::{Result, bail};

use crate::types::Decoration;

/// Terminal dimensions handed to the coordinator's layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: usize,
    pub height: usize,
}

/// Placement of one floating window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRect {
    pub row: usize,
    pub col: usize,
    pub width: usize,
    pub height: usize,
}

/// Handle for a window opened through the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u64);

/// Terminal transition of the host's command-line prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputStatus {
    /// The prompt is still live.
    Pending,
    /// The user accepted the prompt (Enter).
    Accepted,
    /// The user cancelled out of the prompt (Esc / interrupt).
    Cancelled,
}

/// Host surface the engine drives.
pub trait Host {
    fn screen_size(&self) -> ScreenSize;

    fn open_window(&mut self, rect: WindowRect) -> Result<WindowId>;
    fn move_window(&mut self, id: WindowId, rect: WindowRect) -> Result<()>;
    fn close_window(&mut self, id: WindowId) -> Result<()>;

    /// Replace the window's buffer content.
    fn set_content(&mut self, id: WindowId, lines: &[String]) -> Result<()>;
    /// Attach inline decorations to the window's buffer.
    fn set_decorations(&mut self, id: WindowId, decorations: &[Decoration]) -> Result<()>;
    /// Place the window cursor on a 1-based line.
    fn set_cursor_line(&mut self, id: WindowId, line: usize) -> Result<()>;

    /// Current command-line string.
    fn cmdline(&self) -> String;
    /// Current command-line cursor position (byte offset).
    fn cmdpos(&self) -> usize;
    /// Observe whether the prompt reached a terminal transition.
    fn poll_input(&mut self) -> InputStatus;

    /// Run a raw host command with the window focused (escape hatch for
    /// list/preview scrolling commands the engine does not model).
    fn execute(&mut self, id: WindowId, command: &str) -> Result<()>;

    fn request_redraw(&mut self);
    /// Emit a named user event (`PickerEnter`, `PickerLeave`, …).
    fn emit_event(&mut self, name: &str);
    /// Single-line, user-visible message channel for expected errors.
    fn echo(&mut self, message: &str);
}

/// Window state recorded by [`MemoryHost`].
#[derive(Debug, Clone, Default)]
pub struct WindowRecord {
    pub rect: Option<WindowRect>,
    pub lines: Vec<String>,
    pub decorations: Vec<Decoration>,
    pub cursor_line: usize,
    pub executed: Vec<String>,
    pub open: bool,
}

/// In-memory host for tests and headless embedding.
///
/// Records every write the engine performs and lets the driver script the
/// command-line and the prompt's terminal transition.
#[derive(Debug, Default)]
pub struct MemoryHost {
    pub screen: Option<ScreenSize>,
    next_window: u64,
    windows: HashMap<WindowId, WindowRecord>,
    cmdline: String,
    cmdpos: usize,
    input_script: VecDeque<InputStatus>,
    pub emitted_events: Vec<String>,
    pub echoed: Vec<String>,
    pub redraw_count: usize,
}

impl Default for InputStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl MemoryHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the command-line the engine will observe next tick.
    pub fn set_cmdline(&mut self, cmdline: impl Into<String>) {
        self.cmdline = cmdline.into();
        self.cmdpos = self.cmdline.len();
    }

    pub fn set_cmdpos(&mut self, cmdpos: usize) {
        self.cmdpos = cmdpos;
    }

    /// Script the next prompt transition the engine will observe; each
    /// poll consumes one scripted status, then the prompt reads pending.
    pub fn set_input_status(&mut self, status: InputStatus) {
        self.input_script.push_back(status);
    }

    #[must_use]
    pub fn window(&self, id: WindowId) -> Option<&WindowRecord> {
        self.windows.get(&id)
    }

    #[must_use]
    pub fn open_windows(&self) -> usize {
        self.windows.values().filter(|window| window.open).count()
    }

    fn window_mut(&mut self, id: WindowId) -> Result<&mut WindowRecord> {
        match self.windows.get_mut(&id) {
            Some(window) if window.open => Ok(window),
            Some(_) => bail!("window {:?} is closed", id),
            None => bail!("unknown window {:?}", id),
        }
    }
}

impl Host for MemoryHost {
    fn screen_size(&self) -> ScreenSize {
        self.screen.unwrap_or(ScreenSize {
            width: 120,
            height: 40,
        })
    }

    fn open_window(&mut self, rect: WindowRect) -> Result<WindowId> {
        self.next_window += 1;
        let id = WindowId(self.next_window);
        self.windows.insert(
            id,
            WindowRecord {
                rect: Some(rect),
                open: true,
                cursor_line: 1,
                ..WindowRecord::default()
            },
        );
        Ok(id)
    }

    fn move_window(&mut self, id: WindowId, rect: WindowRect) -> Result<()> {
        self.window_mut(id)?.rect = Some(rect);
        Ok(())
    }

    fn close_window(&mut self, id: WindowId) -> Result<()> {
        self.window_mut(id)?.open = false;
        Ok(())
    }

    fn set_content(&mut self, id: WindowId, lines: &[String]) -> Result<()> {
        self.window_mut(id)?.lines = lines.to_vec();
        Ok(())
    }

    fn set_decorations(&mut self, id: WindowId, decorations: &[Decoration]) -> Result<()> {
        self.window_mut(id)?.decorations = decorations.to_vec();
        Ok(())
    }

    fn set_cursor_line(&mut self, id: WindowId, line: usize) -> Result<()> {
        self.window_mut(id)?.cursor_line = line;
        Ok(())
    }

    fn cmdline(&self) -> String {
        self.cmdline.clone()
    }

    fn cmdpos(&self) -> usize {
        self.cmdpos
    }

    fn poll_input(&mut self) -> InputStatus {
        self.input_script.pop_front().unwrap_or(InputStatus::Pending)
    }

    fn execute(&mut self, id: WindowId, command: &str) -> Result<()> {
        self.window_mut(id)?.executed.push(command.to_string());
        Ok(())
    }

    fn request_redraw(&mut self) {
        self.redraw_count += 1;
    }

    fn emit_event(&mut self, name: &str) {
        self.emitted_events.push(name.to_string());
    }

    fn echo(&mut self, message: &str) {
        self.echoed.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_record_content_and_close() {
        let mut host = MemoryHost::new();
        let id = host
            .open_window(WindowRect {
                row: 0,
                col: 0,
                width: 10,
                height: 2,
            })
            .expect("open");
        host.set_content(id, &["hello".to_string()]).expect("write");
        assert_eq!(host.window(id).expect("record").lines, ["hello"]);

        host.close_window(id).expect("close");
        assert_eq!(host.open_windows(), 0);
        assert!(host.set_content(id, &[]).is_err());
    }

    #[test]
    fn input_status_is_consumed_once() {
        let mut host = MemoryHost::new();
        host.set_input_status(InputStatus::Accepted);
        assert_eq!(host.poll_input(), InputStatus::Accepted);
        assert_eq!(host.poll_input(), InputStatus::Pending);
    }

    #[test]
    fn cmdline_updates_move_the_cursor_to_the_end() {
        let mut host = MemoryHost::new();
        host.set_cmdline("query");
        assert_eq!(host.cmdline(), "query");
        assert_eq!(host.cmdpos(), 5);
    }
}
