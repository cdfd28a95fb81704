//! Observes the host's command-line and reports terminal transitions.

use crate::events::{Event, EventQueue};
use crate::host::{Host, InputStatus};

/// Where the prompt session stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverStatus {
    /// Still reading input.
    Active,
    /// The prompt was accepted; `action` names the action to run, or the
    /// picker's default when absent.
    Accepted { action: Option<String> },
    /// The prompt was cancelled.
    Cancelled,
}

/// Polls the host's command-line state once per tick and emits change
/// events when the string or cursor differ from the last observation.
#[derive(Debug)]
pub struct InputDriver {
    last_cmdline: Option<String>,
    last_cmdpos: Option<usize>,
    status: DriverStatus,
}

impl InputDriver {
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_cmdline: None,
            last_cmdpos: None,
            status: DriverStatus::Active,
        }
    }

    /// Observe the host once: record accept/cancel transitions and dispatch
    /// change events for the command-line string and cursor.
    pub fn poll(&mut self, host: &mut dyn Host, queue: &EventQueue) {
        if self.status != DriverStatus::Active {
            return;
        }
        match host.poll_input() {
            InputStatus::Accepted => {
                self.status = DriverStatus::Accepted { action: None };
            }
            InputStatus::Cancelled => {
                self.status = DriverStatus::Cancelled;
            }
            InputStatus::Pending => {}
        }

        let cmdline = host.cmdline();
        if self.last_cmdline.as_deref() != Some(cmdline.as_str()) {
            self.last_cmdline = Some(cmdline.clone());
            queue.dispatch(Event::CmdlineChanged { cmdline });
        }
        let cmdpos = host.cmdpos();
        if self.last_cmdpos != Some(cmdpos) {
            self.last_cmdpos = Some(cmdpos);
            queue.dispatch(Event::CmdposChanged { cmdpos });
        }
    }

    /// Programmatically accept the prompt with a chosen action name.
    pub fn accept(&mut self, action: impl Into<String>) {
        if self.status == DriverStatus::Active {
            self.status = DriverStatus::Accepted {
                action: Some(action.into()),
            };
        }
    }

    #[must_use]
    pub fn status(&self) -> &DriverStatus {
        &self.status
    }

    /// Return to reading input (the picker looped for another round).
    pub fn reactivate(&mut self) {
        self.status = DriverStatus::Active;
    }
}

impl Default for InputDriver {
    fn default() -> Self {
        Self::new()
    }
}
