//! Typed events and the engine-scoped event queue.
//!
//! Producers (the input driver, the processors, host key maps) only ever
//! enqueue; the scheduler tick drains the queue in FIFO order. Events
//! dispatched while a drain is in progress land on a fresh queue and are
//! observed on the next tick.

use std::cell::RefCell;
use std::rc::Rc;

use crate::cancel::StageError;

/// Pipeline stage a processor lifecycle event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Collect,
    Match,
    Sort,
    Render,
    Preview,
}

impl Stage {
    /// Lowercase stage name used in logs (`collect-processor-updated` etc).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Collect => "collect",
            Self::Match => "match",
            Self::Sort => "sort",
            Self::Render => "render",
            Self::Preview => "preview",
        }
    }
}

/// Lifecycle notice dispatched by a processor.
#[derive(Debug, Clone)]
pub enum ProcessorEvent {
    Started(Stage),
    Updated(Stage),
    Succeeded(Stage),
    Failed(Stage, StageError),
}

/// How a select event mutates the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectMethod {
    On,
    Off,
    Toggle,
}

/// Absolute position accepted by cursor and belt setters; `Last` is the
/// `"$"` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexTarget {
    At(usize),
    Last,
}

/// Everything the orchestrator reacts to.
#[derive(Debug, Clone)]
pub enum Event {
    /// The host's command-line string changed.
    CmdlineChanged { cmdline: String },
    /// The host's command-line cursor moved.
    CmdposChanged { cmdpos: usize },
    /// Relative cursor motion; `scroll` multiplies by the list page size.
    MoveCursor { amount: i64, scroll: bool },
    /// Absolute cursor motion.
    MoveCursorAt { cursor: IndexTarget },
    /// Mutate the selection for one item; defaults to the item under the
    /// cursor.
    SelectItem {
        cursor: Option<usize>,
        method: SelectMethod,
    },
    /// Mutate the selection across all currently matched items.
    SelectAllItems { method: SelectMethod },
    SwitchMatcher { amount: i64, cycle: bool },
    SwitchMatcherAt { index: IndexTarget },
    SwitchSorter { amount: i64, cycle: bool },
    SwitchSorterAt { index: IndexTarget },
    SwitchRenderer { amount: i64, cycle: bool },
    SwitchRendererAt { index: IndexTarget },
    SwitchPreviewer { amount: i64, cycle: bool },
    SwitchPreviewerAt { index: IndexTarget },
    /// Accept the prompt with the named action.
    InvokeAction { name: String },
    /// Raw host command executed against the list window.
    ListExecute { command: String },
    /// Raw host command executed against the preview window.
    PreviewExecute { command: String },
    HelpToggle,
    HelpPage { amount: i64 },
    Processor(ProcessorEvent),
}

/// Single-owner FIFO of [`Event`]s, scoped to one engine instance.
///
/// Cloning shares the underlying queue; the engine is single-threaded by
/// contract, so producers and the draining tick always live on one thread.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    inner: Rc<RefCell<Vec<Event>>>,
}

impl EventQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event. O(1); never blocks.
    pub fn dispatch(&self, event: Event) {
        self.inner.borrow_mut().push(event);
    }

    /// Shorthand for dispatching a processor lifecycle event.
    pub fn dispatch_processor(&self, event: ProcessorEvent) {
        self.dispatch(Event::Processor(event));
    }

    /// Swap the queue out, then feed each event to `consumer` in enqueue
    /// order. Events dispatched by the consumer defer to the next drain.
    pub fn drain(&self, mut consumer: impl FnMut(Event)) {
        let drained = std::mem::take(&mut *self.inner.borrow_mut());
        for event in drained {
            consumer(event);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}
