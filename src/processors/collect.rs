use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::cancel::{Cancelled, Signal, StageError};
use crate::collections::{Chunker, UniqueOrderedBuffer};
use crate::error::EngineError;
use crate::events::{EventQueue, ProcessorEvent, Stage};
use crate::extensions::{Source, SourceParams};
use crate::stream::{PollStream, Step};
use crate::types::Item;

/// Tuning knobs for the collect stage.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Stop accepting items once this many have been collected.
    pub threshold: usize,
    /// Flush a chunk to observers after this many accepted items.
    pub chunk_size: usize,
    /// Flush a partial chunk after this much time since the last flush.
    pub chunk_interval: Duration,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            threshold: 100_000,
            chunk_size: 1_000,
            chunk_interval: Duration::from_millis(100),
        }
    }
}

struct CollectRun {
    stream: Box<dyn PollStream<Item = Item>>,
    signal: Signal,
    last_flush: Instant,
}

/// Pulls from a source, dedupes by value, assigns insertion-order ids, and
/// dispatches progress in chunks.
///
/// Within one run every stored item has a distinct `value` and a distinct
/// `id` equal to its 0-based insertion index. Collection runs once per
/// picker session; cancellation terminates the iteration silently.
pub struct CollectProcessor {
    source: Rc<dyn Source>,
    options: CollectOptions,
    queue: EventQueue,
    buffer: UniqueOrderedBuffer<Rc<Item>>,
    chunker: Chunker<u64>,
    run: Option<CollectRun>,
    paused: bool,
    started: bool,
    succeeded: bool,
    disposal: Signal,
}

impl CollectProcessor {
    #[must_use]
    pub fn new(source: Rc<dyn Source>, options: CollectOptions, queue: EventQueue) -> Self {
        let chunker = Chunker::new(options.chunk_size);
        Self {
            source,
            options,
            queue,
            buffer: UniqueOrderedBuffer::new(|item: &Rc<Item>| item.value.clone()),
            chunker,
            run: None,
            paused: false,
            started: false,
            succeeded: false,
            disposal: Signal::new(),
        }
    }

    /// Seed the buffer with previously collected items (session resume).
    /// Their ids are preserved; the uniqueness filter still applies.
    pub fn seed(&mut self, items: impl IntoIterator<Item = Rc<Item>>) {
        self.buffer.extend(items);
    }

    /// Begin iterating the source. A second start within the same session
    /// is ignored; collection runs once.
    pub fn start(&mut self, params: &SourceParams) -> Result<(), EngineError> {
        if self.disposal.is_aborted() {
            return Err(EngineError::Disposed);
        }
        if self.started {
            return Ok(());
        }
        self.started = true;
        let signal = self.disposal.child();
        let stream = self.source.collect(params, &signal);
        self.run = Some(CollectRun {
            stream,
            signal,
            last_flush: Instant::now(),
        });
        debug!(source = self.source.name(), "collect started");
        self.queue.dispatch_processor(ProcessorEvent::Started(Stage::Collect));
        Ok(())
    }

    /// Block the consumer at a barrier until [`resume`](Self::resume) or an
    /// abort releases it.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Advance one cooperative slice: at most one chunk of pulls.
    pub fn turn(&mut self, now: Instant) {
        let Some(mut run) = self.run.take() else {
            return;
        };

        // An abort releases the pause barrier and terminates silently.
        if run.signal.is_aborted() {
            return;
        }
        if self.paused {
            self.run = Some(run);
            return;
        }

        let mut pulled = 0;
        while pulled < self.options.chunk_size {
            match run.stream.poll_next(&run.signal) {
                Ok(Step::Ready(mut item)) => {
                    pulled += 1;
                    if self.buffer.contains_key(&item.value) {
                        continue;
                    }
                    let id = self.buffer.len() as u64;
                    item.id = id;
                    self.buffer.push(Rc::new(item));
                    if self.chunker.put(id) {
                        self.chunker.consume();
                        run.last_flush = now;
                        self.queue
                            .dispatch_processor(ProcessorEvent::Updated(Stage::Collect));
                    }
                    if self.buffer.len() >= self.options.threshold {
                        self.finish();
                        return;
                    }
                }
                Ok(Step::Pending) => break,
                Ok(Step::Done) => {
                    self.finish();
                    return;
                }
                Err(error) => {
                    if error.downcast_ref::<Cancelled>().is_some() {
                        return;
                    }
                    warn!(source = self.source.name(), %error, "collect failed");
                    self.queue.dispatch_processor(ProcessorEvent::Failed(
                        Stage::Collect,
                        StageError::failed(error),
                    ));
                    return;
                }
            }
        }

        if self.chunker.count() > 0
            && now.duration_since(run.last_flush) >= self.options.chunk_interval
        {
            self.chunker.consume();
            run.last_flush = now;
            self.queue
                .dispatch_processor(ProcessorEvent::Updated(Stage::Collect));
        }
        self.run = Some(run);
    }

    fn finish(&mut self) {
        if self.chunker.count() > 0 {
            self.chunker.consume();
            self.queue
                .dispatch_processor(ProcessorEvent::Updated(Stage::Collect));
        }
        self.run = None;
        self.succeeded = true;
        debug!(
            source = self.source.name(),
            collected = self.buffer.len(),
            "collect succeeded"
        );
        self.queue
            .dispatch_processor(ProcessorEvent::Succeeded(Stage::Collect));
    }

    /// Collected items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[Rc<Item>] {
        self.buffer.items()
    }

    #[must_use]
    pub fn is_collecting(&self) -> bool {
        self.run.is_some()
    }

    #[must_use]
    pub fn has_succeeded(&self) -> bool {
        self.succeeded
    }

    /// Cancel the iteration and reject any further starts.
    pub fn dispose(&mut self) {
        self.disposal.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Event;
    use crate::extensions::builtin::StaticSource;
    use crate::stream::IterStream;

    fn drain_events(queue: &EventQueue) -> Vec<Event> {
        let mut events = Vec::new();
        queue.drain(|event| events.push(event));
        events
    }

    fn count_lifecycle(events: &[Event]) -> (usize, usize, usize) {
        let mut updated = 0;
        let mut succeeded = 0;
        let mut failed = 0;
        for event in events {
            match event {
                Event::Processor(ProcessorEvent::Updated(Stage::Collect)) => updated += 1,
                Event::Processor(ProcessorEvent::Succeeded(Stage::Collect)) => succeeded += 1,
                Event::Processor(ProcessorEvent::Failed(Stage::Collect, _)) => failed += 1,
                _ => {}
            }
        }
        (updated, succeeded, failed)
    }

    fn processor_for(values: &[&str]) -> (CollectProcessor, EventQueue) {
        let queue = EventQueue::new();
        let source = Rc::new(StaticSource::from_values("test", values.to_vec()));
        let processor =
            CollectProcessor::new(source, CollectOptions::default(), queue.clone());
        (processor, queue)
    }

    fn run_to_completion(processor: &mut CollectProcessor) {
        let mut guard = 0;
        while processor.is_collecting() {
            processor.turn(Instant::now());
            guard += 1;
            assert!(guard < 1_000, "collect did not finish");
        }
    }

    #[test]
    fn dedupes_by_value_and_assigns_insertion_ids() {
        let (mut processor, queue) = processor_for(&["a", "b", "a", "c"]);
        processor.start(&SourceParams::default()).expect("start");
        run_to_completion(&mut processor);

        let values: Vec<&str> = processor
            .items()
            .iter()
            .map(|item| item.value.as_str())
            .collect();
        assert_eq!(values, ["a", "b", "c"]);
        let ids: Vec<u64> = processor.items().iter().map(|item| item.id).collect();
        assert_eq!(ids, [0, 1, 2]);

        let (_, succeeded, failed) = count_lifecycle(&drain_events(&queue));
        assert_eq!(succeeded, 1);
        assert_eq!(failed, 0);
    }

    #[test]
    fn threshold_caps_an_infinite_source() {
        struct Infinite;

        impl Source for Infinite {
            fn name(&self) -> &str {
                "infinite"
            }

            fn collect(
                &self,
                _params: &SourceParams,
                _signal: &Signal,
            ) -> Box<dyn PollStream<Item = Item>> {
                Box::new(IterStream::new(
                    (0u64..).map(|n| Item::new(format!("x{n}"))),
                ))
            }
        }

        let queue = EventQueue::new();
        let options = CollectOptions {
            threshold: 1_000,
            ..CollectOptions::default()
        };
        let mut processor = CollectProcessor::new(Rc::new(Infinite), options, queue.clone());
        processor.start(&SourceParams::default()).expect("start");
        run_to_completion(&mut processor);

        assert_eq!(processor.items().len(), 1_000);
        assert!(processor.has_succeeded());
        let (_, succeeded, _) = count_lifecycle(&drain_events(&queue));
        assert_eq!(succeeded, 1);
    }

    #[test]
    fn chunk_size_flushes_updates_mid_run() {
        let values: Vec<String> = (0..25).map(|n| format!("item-{n}")).collect();
        let queue = EventQueue::new();
        let source = Rc::new(StaticSource::from_values("test", values));
        let options = CollectOptions {
            chunk_size: 10,
            ..CollectOptions::default()
        };
        let mut processor = CollectProcessor::new(source, options, queue.clone());
        processor.start(&SourceParams::default()).expect("start");
        run_to_completion(&mut processor);

        let (updated, succeeded, _) = count_lifecycle(&drain_events(&queue));
        // Two full chunks plus the partial flush on completion.
        assert_eq!(updated, 3);
        assert_eq!(succeeded, 1);
        assert_eq!(processor.items().len(), 25);
    }

    #[test]
    fn pause_blocks_progress_until_resume() {
        let (mut processor, _queue) = processor_for(&["a", "b"]);
        processor.start(&SourceParams::default()).expect("start");
        processor.pause();
        processor.turn(Instant::now());
        assert!(processor.items().is_empty());
        assert!(processor.is_collecting());

        processor.resume();
        run_to_completion(&mut processor);
        assert_eq!(processor.items().len(), 2);
    }

    #[test]
    fn abort_during_pause_releases_the_barrier_and_terminates() {
        let (mut processor, queue) = processor_for(&["a", "b"]);
        processor.start(&SourceParams::default()).expect("start");
        drain_events(&queue);
        processor.pause();
        processor.turn(Instant::now());
        assert!(processor.is_collecting());

        processor.dispose();
        processor.turn(Instant::now());
        assert!(!processor.is_collecting());
        assert!(!processor.has_succeeded());
        let (updated, succeeded, failed) = count_lifecycle(&drain_events(&queue));
        assert_eq!((updated, succeeded, failed), (0, 0, 0));
    }

    #[test]
    fn disposal_terminates_without_failure_events() {
        let (mut processor, queue) = processor_for(&["a", "b"]);
        processor.start(&SourceParams::default()).expect("start");
        drain_events(&queue);

        processor.dispose();
        processor.turn(Instant::now());
        assert!(!processor.is_collecting());
        let (updated, succeeded, failed) = count_lifecycle(&drain_events(&queue));
        assert_eq!((updated, succeeded, failed), (0, 0, 0));

        assert!(matches!(
            processor.start(&SourceParams::default()),
            Err(EngineError::Disposed)
        ));
    }

    #[test]
    fn seeded_items_keep_their_ids_and_block_duplicates() {
        let (mut processor, _queue) = processor_for(&["a", "d"]);
        let seeded = Rc::new(Item {
            id: 0,
            ..Item::new("a")
        });
        processor.seed([Rc::clone(&seeded), Rc::new(Item {
            id: 1,
            ..Item::new("b")
        })]);

        processor.start(&SourceParams::default()).expect("start");
        run_to_completion(&mut processor);

        let values: Vec<&str> = processor
            .items()
            .iter()
            .map(|item| item.value.as_str())
            .collect();
        assert_eq!(values, ["a", "b", "d"]);
        assert_eq!(processor.items()[2].id, 2);
    }

    #[test]
    fn second_start_is_ignored() {
        let (mut processor, queue) = processor_for(&["a"]);
        processor.start(&SourceParams::default()).expect("start");
        run_to_completion(&mut processor);
        drain_events(&queue);

        processor.start(&SourceParams::default()).expect("restart is a no-op");
        assert!(!processor.is_collecting());
        assert!(drain_events(&queue).is_empty());
    }
}
