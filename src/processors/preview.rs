use std::rc::Rc;
use std::time::Instant;

use tracing::warn;

use crate::cancel::{Cancelled, Signal, StageError};
use crate::error::EngineError;
use crate::events::{EventQueue, IndexTarget, ProcessorEvent, Stage};
use crate::extensions::Previewer;
use crate::types::{Item, PreviewPayload};

/// Generates preview content for the item under the cursor via the current
/// previewer.
///
/// The previewer list may be empty; with no previewer, or no item, the
/// published payload is `None`. The orchestrator drives this through a
/// debounced reservation because the cursor moves frequently and previews
/// are expensive.
pub struct PreviewProcessor {
    previewers: Vec<Rc<dyn Previewer>>,
    index: usize,
    queue: EventQueue,
    published: Option<PreviewPayload>,
    pending: Option<Option<Rc<Item>>>,
    disposal: Signal,
}

impl PreviewProcessor {
    #[must_use]
    pub fn new(previewers: Vec<Rc<dyn Previewer>>, queue: EventQueue) -> Self {
        Self {
            previewers,
            index: 0,
            queue,
            published: None,
            pending: None,
            disposal: Signal::new(),
        }
    }

    /// Reserve a preview of `item`; only the latest reservation is kept.
    pub fn start(&mut self, item: Option<Rc<Item>>) -> Result<(), EngineError> {
        if self.disposal.is_aborted() {
            return Err(EngineError::Disposed);
        }
        self.pending = Some(item);
        Ok(())
    }

    /// Run the reserved preview, if any.
    pub fn turn(&mut self, _now: Instant) {
        let Some(request) = self.pending.take() else {
            return;
        };
        self.queue
            .dispatch_processor(ProcessorEvent::Started(Stage::Preview));

        let (Some(item), Some(previewer)) = (request, self.previewers.get(self.index))
        else {
            self.published = None;
            self.queue
                .dispatch_processor(ProcessorEvent::Succeeded(Stage::Preview));
            return;
        };

        let signal = self.disposal.child();
        match previewer.preview(&item, &signal) {
            Ok(payload) => {
                self.published = payload;
                self.queue
                    .dispatch_processor(ProcessorEvent::Succeeded(Stage::Preview));
            }
            // Cancellation only reaches here through disposal; terminate
            // without publishing or reporting.
            Err(error) if error.downcast_ref::<Cancelled>().is_some() => {}
            Err(error) => {
                warn!(previewer = previewer.name(), %error, "preview failed");
                self.published = None;
                self.queue.dispatch_processor(ProcessorEvent::Failed(
                    Stage::Preview,
                    StageError::failed(error),
                ));
            }
        }
    }

    pub fn set_index(&mut self, target: IndexTarget) {
        if self.previewers.is_empty() {
            return;
        }
        let last = self.previewers.len() - 1;
        self.index = match target {
            IndexTarget::At(index) => index.min(last),
            IndexTarget::Last => last,
        };
    }

    /// Relative previewer switch. Returns whether the index changed.
    pub fn shift_index(&mut self, amount: i64, cycle: bool) -> bool {
        if self.previewers.is_empty() {
            return false;
        }
        let len = self.previewers.len() as i64;
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

    #[must_use]
    pub fn has_previewers(&self) -> bool {
        !self.previewers.is_empty()
    }

    /// Latest published preview payload.
    #[must_use]
    pub fn payload(&self) -> Option<&PreviewPayload> {
        self.published.as_ref()
    }

    pub fn dispose(&mut self) {
        self.disposal.abort();
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Event;
    use crate::extensions::builtin::TextPreviewer;

    fn lifecycle_counts(queue: &EventQueue) -> (usize, usize) {
        let mut counts = (0, 0);
        queue.drain(|event| {
            if let Event::Processor(processor_event) = event {
                match processor_event {
                    ProcessorEvent::Succeeded(Stage::Preview) => counts.0 += 1,
                    ProcessorEvent::Failed(Stage::Preview, _) => counts.1 += 1,
                    _ => {}
                }
            }
        });
        counts
    }

    #[test]
    fn previews_the_requested_item() {
        let queue = EventQueue::new();
        let mut processor =
            PreviewProcessor::new(vec![Rc::new(TextPreviewer)], queue.clone());
        processor
            .start(Some(Rc::new(Item::new("alpha"))))
            .expect("start");
        processor.turn(Instant::now());

        assert_eq!(
            processor.payload().expect("payload").content,
            ["alpha"]
        );
        assert_eq!(lifecycle_counts(&queue), (1, 0));
    }

    #[test]
    fn no_item_publishes_none() {
        let queue = EventQueue::new();
        let mut processor =
            PreviewProcessor::new(vec![Rc::new(TextPreviewer)], queue.clone());
        processor.start(None).expect("start");
        processor.turn(Instant::now());

        assert!(processor.payload().is_none());
        assert_eq!(lifecycle_counts(&queue), (1, 0));
    }

    #[test]
    fn no_previewer_publishes_none() {
        let queue = EventQueue::new();
        let mut processor = PreviewProcessor::new(Vec::new(), queue.clone());
        processor
            .start(Some(Rc::new(Item::new("alpha"))))
            .expect("start");
        processor.turn(Instant::now());

        assert!(processor.payload().is_none());
        assert_eq!(lifecycle_counts(&queue), (1, 0));
        assert!(!processor.has_previewers());
    }

    #[test]
    fn failure_publishes_none_and_dispatches_failed() {
        struct Failing;

        impl Previewer for Failing {
            fn name(&self) -> &str {
                "failing"
            }

            fn preview(
                &self,
                _item: &Item,
                _signal: &Signal,
            ) -> anyhow::Result<Option<PreviewPayload>> {
                anyhow::bail!("previewer exploded")
            }
        }

        let queue = EventQueue::new();
        let mut processor = PreviewProcessor::new(vec![Rc::new(Failing)], queue.clone());
        processor
            .start(Some(Rc::new(Item::new("alpha"))))
            .expect("start");
        processor.turn(Instant::now());

        assert!(processor.payload().is_none());
        assert_eq!(lifecycle_counts(&queue), (0, 1));
    }

    #[test]
    fn disposal_rejects_further_starts() {
        let queue = EventQueue::new();
        let mut processor = PreviewProcessor::new(Vec::new(), queue);
        processor.dispose();
        assert!(matches!(processor.start(None), Err(EngineError::Disposed)));
    }
}
