use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::cancel::{Cancelled, Signal, StageError};
use crate::collections::ItemBelt;
use crate::error::EngineError;
use crate::events::{EventQueue, IndexTarget, ProcessorEvent, Stage};
use crate::extensions::{MatchInput, Matcher};
use crate::stream::{PollStream, Step};
use crate::types::Item;

/// Tuning knobs for the match stage.
#[derive(Debug, Clone)]
pub struct MatchOptions {
    /// Cooperative delay between chunks, yielding ticks to the rest of the
    /// engine.
    pub interval: Duration,
    /// Cap on matched items.
    pub threshold: usize,
    /// Items pulled per scheduler turn.
    pub chunk_size: usize,
    /// Incremental flush cadence for slow matchers.
    pub chunk_interval: Duration,
    /// Force live publication even for non-incremental matchers.
    pub incremental: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            interval: Duration::ZERO,
            threshold: 100_000,
            chunk_size: 1_000,
            chunk_interval: Duration::from_millis(100),
            incremental: false,
        }
    }
}

struct MatchRun {
    stream: Box<dyn PollStream<Item = Rc<Item>>>,
    signal: Signal,
    query: String,
    snapshot_len: usize,
    matched: Vec<Rc<Item>>,
    incremental: bool,
    resume_at: Option<Instant>,
    last_flush: Instant,
    published_len: usize,
}

struct Reservation {
    input: MatchInput,
    restart: bool,
}

/// Filters the collected items by the current query through the active
/// matcher.
///
/// At most one run is in flight; newer `start` calls replace any pending
/// reservation, and a restart aborts the running work first. A start with
/// an unchanged query over an unchanged collected snapshot is a no-op that
/// re-dispatches `succeeded` when idle, so downstream stages re-trigger
/// without re-running the matcher.
pub struct MatchProcessor {
    matchers: ItemBelt<Rc<dyn Matcher>>,
    options: MatchOptions,
    queue: EventQueue,
    published: Vec<Rc<Item>>,
    last_key: Option<(String, usize)>,
    run: Option<MatchRun>,
    reserved: Option<Reservation>,
    disposal: Signal,
}

impl MatchProcessor {
    /// # Panics
    ///
    /// Panics when `matchers` is empty; the match stage always has an
    /// active strategy.
    #[must_use]
    pub fn new(
        matchers: Vec<Rc<dyn Matcher>>,
        options: MatchOptions,
        queue: EventQueue,
    ) -> Self {
        Self {
            matchers: ItemBelt::new(matchers),
            options,
            queue,
            published: Vec::new(),
            last_key: None,
            run: None,
            reserved: None,
            disposal: Signal::new(),
        }
    }

    /// Seed the published list (session resume) without running a matcher.
    pub fn seed(&mut self, items: Vec<Rc<Item>>) {
        self.published = items;
    }

    /// Request a match run over `input`.
    ///
    /// With `restart` the current run is aborted and the new input takes
    /// its place; without it the new input waits until the current run
    /// finishes. Only the latest reservation is kept.
    pub fn start(&mut self, input: MatchInput, restart: bool) -> Result<(), EngineError> {
        if self.disposal.is_aborted() {
            return Err(EngineError::Disposed);
        }
        if let Some(run) = &self.run {
            if restart {
                run.signal.abort();
            }
            self.reserved = Some(Reservation { input, restart });
            return Ok(());
        }
        let key = (input.query.clone(), input.items.len());
        if self.last_key.as_ref() == Some(&key) {
            // Same query over the same snapshot: re-trigger downstream only.
            self.queue
                .dispatch_processor(ProcessorEvent::Succeeded(Stage::Match));
            return Ok(());
        }
        self.begin(input);
        Ok(())
    }

    fn begin(&mut self, input: MatchInput) {
        let matcher = Rc::clone(self.matchers.current());
        let signal = self.disposal.child();
        let incremental = self.options.incremental || matcher.incremental();
        let query = input.query.clone();
        let snapshot_len = input.items.len();
        debug!(matcher = matcher.name(), %query, items = snapshot_len, "match started");
        let stream = matcher.match_items(input, &signal);
        self.run = Some(MatchRun {
            stream,
            signal,
            query,
            snapshot_len,
            matched: Vec::new(),
            incremental,
            resume_at: None,
            last_flush: Instant::now(),
            published_len: 0,
        });
        self.queue
            .dispatch_processor(ProcessorEvent::Started(Stage::Match));
    }

    /// Advance one cooperative slice: at most one chunk of pulls.
    pub fn turn(&mut self, now: Instant) {
        let Some(mut run) = self.run.take() else {
            return;
        };

        if run.signal.is_aborted() {
            self.cancelled();
            return;
        }
        if run.resume_at.is_some_and(|at| now < at) {
            self.run = Some(run);
            return;
        }

        let mut pulled = 0;
        while pulled < self.options.chunk_size {
            match run.stream.poll_next(&run.signal) {
                Ok(Step::Ready(item)) => {
                    pulled += 1;
                    run.matched.push(item);
                    if run.matched.len() >= self.options.threshold {
                        self.complete(run);
                        return;
                    }
                }
                Ok(Step::Pending) => break,
                Ok(Step::Done) => {
                    self.complete(run);
                    return;
                }
                Err(error) => {
                    if error.downcast_ref::<Cancelled>().is_some() {
                        self.cancelled();
                    } else {
                        warn!(%error, "match failed");
                        self.queue.dispatch_processor(ProcessorEvent::Failed(
                            Stage::Match,
                            StageError::failed(error),
                        ));
                        self.start_reserved();
                    }
                    return;
                }
            }
        }

        // Publish the growing list between chunks in incremental mode.
        let flush_due = pulled >= self.options.chunk_size
            || now.duration_since(run.last_flush) >= self.options.chunk_interval;
        if run.incremental && flush_due && run.matched.len() > run.published_len {
            self.published = run.matched.clone();
            run.published_len = run.matched.len();
            run.last_flush = now;
            self.queue
                .dispatch_processor(ProcessorEvent::Updated(Stage::Match));
        }
        if !self.options.interval.is_zero() {
            run.resume_at = Some(now + self.options.interval);
        }
        self.run = Some(run);
    }

    fn complete(&mut self, run: MatchRun) {
        debug!(matched = run.matched.len(), query = %run.query, "match succeeded");
        self.published = run.matched;
        self.last_key = Some((run.query, run.snapshot_len));
        self.queue
            .dispatch_processor(ProcessorEvent::Succeeded(Stage::Match));
        self.start_reserved();
    }

    fn cancelled(&mut self) {
        // A restart-abort surfaces as the cancellation sentinel; disposal
        // terminates without any event.
        if !self.disposal.is_aborted() {
            self.queue.dispatch_processor(ProcessorEvent::Failed(
                Stage::Match,
                StageError::Cancelled,
            ));
        }
        self.start_reserved();
    }

    fn start_reserved(&mut self) {
        if let Some(reservation) = self.reserved.take()
            && !self.disposal.is_aborted()
        {
            let key = (reservation.input.query.clone(), reservation.input.items.len());
            if !reservation.restart && self.last_key.as_ref() == Some(&key) {
                self.queue
                    .dispatch_processor(ProcessorEvent::Succeeded(Stage::Match));
                return;
            }
            self.begin(reservation.input);
        }
    }

    /// Switch the active matcher; the caller re-starts with `restart`.
    pub fn set_index(&mut self, target: IndexTarget) {
        self.matchers.set_index(target);
    }

    /// Relative matcher switch. Returns whether the index changed.
    pub fn shift_index(&mut self, amount: i64, cycle: bool) -> bool {
        self.matchers.shift(amount, cycle)
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.matchers.index()
    }

    #[must_use]
    pub fn matcher_count(&self) -> usize {
        self.matchers.len()
    }

    /// Latest published matched list.
    #[must_use]
    pub fn items(&self) -> &[Rc<Item>] {
        &self.published
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    pub fn dispose(&mut self) {
        self.disposal.abort();
        self.reserved = None;
    }
}
