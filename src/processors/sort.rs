use std::rc::Rc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::cancel::{Cancelled, StageError, Signal};
use crate::error::EngineError;
use crate::events::{EventQueue, IndexTarget, ProcessorEvent, Stage};
use crate::extensions::Sorter;
use crate::types::Item;

/// Applies the current sorter to the matched items, copy-then-sort.
///
/// The sorter list may be empty, in which case items pass through
/// unchanged. A sorter failure still publishes the unsorted copy so the
/// render stage can advance over the last good data.
pub struct SortProcessor {
    sorters: Vec<Rc<dyn Sorter>>,
    index: usize,
    queue: EventQueue,
    published: Vec<Rc<Item>>,
    pending: Option<Vec<Rc<Item>>>,
    disposal: Signal,
}

impl SortProcessor {
    #[must_use]
    pub fn new(sorters: Vec<Rc<dyn Sorter>>, queue: EventQueue) -> Self {
        Self {
            sorters,
            index: 0,
            queue,
            published: Vec::new(),
            pending: None,
            disposal: Signal::new(),
        }
    }

    /// Reserve a sort over `items`; only the latest reservation is kept.
    pub fn start(&mut self, items: Vec<Rc<Item>>) -> Result<(), EngineError> {
        if self.disposal.is_aborted() {
            return Err(EngineError::Disposed);
        }
        self.pending = Some(items);
        Ok(())
    }

    /// Run the reserved sort, if any.
    pub fn turn(&mut self, _now: Instant) {
        let Some(items) = self.pending.take() else {
            return;
        };
        self.queue
            .dispatch_processor(ProcessorEvent::Started(Stage::Sort));

        let mut copy = items;
        let Some(sorter) = self.sorters.get(self.index) else {
            self.published = copy;
            self.queue
                .dispatch_processor(ProcessorEvent::Succeeded(Stage::Sort));
            return;
        };

        let signal = self.disposal.child();
        match sorter.sort(&mut copy, &signal) {
            Ok(()) => {
                debug!(sorter = sorter.name(), items = copy.len(), "sort succeeded");
                self.published = copy;
                self.queue
                    .dispatch_processor(ProcessorEvent::Succeeded(Stage::Sort));
            }
            // Cancellation only reaches here through disposal; terminate
            // without publishing or reporting.
            Err(error) if error.downcast_ref::<Cancelled>().is_some() => {}
            Err(error) => {
                warn!(sorter = sorter.name(), %error, "sort failed");
                self.published = copy;
                self.queue.dispatch_processor(ProcessorEvent::Failed(
                    Stage::Sort,
                    StageError::failed(error),
                ));
            }
        }
    }

    pub fn set_index(&mut self, target: IndexTarget) {
        if self.sorters.is_empty() {
            return;
        }
        let last = self.sorters.len() - 1;
        self.index = match target {
            IndexTarget::At(index) => index.min(last),
            IndexTarget::Last => last,
        };
    }

    /// Relative sorter switch. Returns whether the index changed.
    pub fn shift_index(&mut self, amount: i64, cycle: bool) -> bool {
        if self.sorters.is_empty() {
            return false;
        }
        let len = self.sorters.len() as i64;
        let current = self.index as i64;
        let moved = if cycle {
            (current + amount).rem_euclid(len)
        } else {
            (current + amount).clamp(0, len - 1)
        };
        self.index = moved as usize;
        moved != current
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Latest published (sorted) list.
    #[must_use]
    pub fn items(&self) -> &[Rc<Item>] {
        &self.published
    }

    pub fn dispose(&mut self) {
        self.disposal.abort();
        self.pending = None;
    }
}
