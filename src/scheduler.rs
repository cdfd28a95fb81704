//! Periodic tick driver.
//!
//! The tick is the only thing that moves the engine: it drains the event
//! queue, runs reserved work, and advances the processors. Each tick runs
//! to completion before the driver sleeps, so ticks never overlap and an
//! overrunning tick simply delays the next one.

use std::ops::ControlFlow;
use std::thread;
use std::time::Duration;

use anyhow::Result;

use crate::cancel::Signal;

/// Default pause between ticks.
pub const SCHEDULER_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
pub struct Scheduler {
    interval: Duration,
}

impl Scheduler {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Run `tick` every interval until the signal fires (`Ok(None)`), the
    /// tick breaks with a value, or the tick errors.
    pub fn run<T>(
        &self,
        signal: &Signal,
        mut tick: impl FnMut() -> Result<ControlFlow<T>>,
    ) -> Result<Option<T>> {
        loop {
            if signal.is_aborted() {
                return Ok(None);
            }
            if let ControlFlow::Break(value) = tick()? {
                return Ok(Some(value));
            }
            if signal.is_aborted() {
                return Ok(None);
            }
            thread::sleep(self.interval);
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SCHEDULER_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breaks_with_the_tick_value() {
        let scheduler = Scheduler::new(Duration::ZERO);
        let mut ticks = 0;
        let result = scheduler
            .run(&Signal::new(), || {
                ticks += 1;
                Ok(if ticks == 3 {
                    ControlFlow::Break("done")
                } else {
                    ControlFlow::Continue(())
                })
            })
            .expect("run");
        assert_eq!(result, Some("done"));
        assert_eq!(ticks, 3);
    }

    #[test]
    fn resolves_with_none_when_the_signal_fires() {
        let scheduler = Scheduler::new(Duration::ZERO);
        let signal = Signal::new();
        let stopper = signal.clone();
        let mut ticks = 0;
        let result = scheduler
            .run(&signal, || {
                ticks += 1;
                stopper.abort();
                Ok(ControlFlow::Continue(()))
            })
            .expect("run");
        assert_eq!(result, None::<()>);
        assert_eq!(ticks, 1);
    }

    #[test]
    fn tick_errors_propagate() {
        let scheduler = Scheduler::new(Duration::ZERO);
        let result: Result<Option<()>> =
            scheduler.run(&Signal::new(), || anyhow::bail!("tick exploded"));
        assert!(result.is_err());
    }
}
