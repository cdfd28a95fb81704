//! Pull-based, cooperatively cancellable streams.
//!
//! Every stage boundary in the pipeline is a [`PollStream`]: the consumer
//! pulls one element at a time, the producer may report [`Step::Pending`]
//! when nothing is available yet (the consumer retries on a later scheduler
//! tick), and the shared [`Signal`] cancels the stream mid-flight. Streams
//! may be infinite; the collect stage caps them at its threshold.

use crate::cancel::{Cancelled, Signal};

/// Outcome of polling a stream once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<T> {
    /// An element is available.
    Ready(T),
    /// Nothing available yet; poll again on a later tick.
    Pending,
    /// The stream is exhausted.
    Done,
}

/// A lazy sequence drained one element per poll.
pub trait PollStream {
    type Item;

    /// Produce the next element, or report why none is available.
    ///
    /// Implementations check `signal` before doing work and return
    /// [`Cancelled`] (via `?`) once it has fired.
    fn poll_next(&mut self, signal: &Signal) -> anyhow::Result<Step<Self::Item>>;
}

impl<T> PollStream for Box<dyn PollStream<Item = T>> {
    type Item = T;

    fn poll_next(&mut self, signal: &Signal) -> anyhow::Result<Step<T>> {
        (**self).poll_next(signal)
    }
}

/// Adapter exposing any iterator as a [`PollStream`].
pub struct IterStream<I> {
    iter: I,
}

impl<I> IterStream<I> {
    #[must_use]
    pub fn new(iter: I) -> Self {
        Self { iter }
    }
}

impl<I: Iterator> PollStream for IterStream<I> {
    type Item = I::Item;

    fn poll_next(&mut self, signal: &Signal) -> anyhow::Result<Step<I::Item>> {
        signal.check().map_err(|_| Cancelled)?;
        Ok(match self.iter.next() {
            Some(item) => Step::Ready(item),
            None => Step::Done,
        })
    }
}

/// Stream over an owned vector, in order.
pub fn from_vec<T>(items: Vec<T>) -> IterStream<std::vec::IntoIter<T>> {
    IterStream::new(items.into_iter())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_order_then_reports_done() {
        let signal = Signal::new();
        let mut stream = from_vec(vec![1, 2]);
        assert_eq!(stream.poll_next(&signal).expect("poll"), Step::Ready(1));
        assert_eq!(stream.poll_next(&signal).expect("poll"), Step::Ready(2));
        assert_eq!(stream.poll_next(&signal).expect("poll"), Step::Done);
    }

    #[test]
    fn aborted_signal_stops_the_stream() {
        let signal = Signal::new();
        signal.abort();
        let mut stream = from_vec(vec![1]);
        let error = stream.poll_next(&signal).expect_err("cancelled");
        assert!(error.downcast_ref::<Cancelled>().is_some());
    }

    #[test]
    fn infinite_iterators_are_pollable() {
        let signal = Signal::new();
        let mut stream = IterStream::new(0u64..);
        for expected in 0..32 {
            assert_eq!(
                stream.poll_next(&signal).expect("poll"),
                Step::Ready(expected)
            );
        }
    }
}
