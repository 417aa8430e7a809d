//! Frame pacing for timed step sequences
//!
//! A [`Pacer`] spreads `steps` over `duration`. Step `i` is due at
//! `start + duration * i / steps`, always measured from the absolute start
//! instant, so a late step shortens the next wait instead of pushing every
//! later deadline back.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};
use tracing::trace;

/// Number of frames needed to cover `duration_secs` at `frame_rate`, at least one
#[inline]
pub fn step_count(frame_rate: u32, duration_secs: f64) -> u32 {
    let frames = (frame_rate as f64 * duration_secs).round();
    if frames.is_nan() || frames < 1.0 {
        1
    } else {
        // `as` saturates at u32::MAX
        frames as u32
    }
}

/// Convert seconds to a `Duration`, treating non-finite or negative input as zero
#[inline]
pub fn seconds(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}

/// Outcome of a pacing wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    /// Deadline reached, carry on with the next step
    Continue,
    /// Cancellation was requested while waiting
    Cancelled,
}

/// Cooperative cancellation signal checked at every pacing point
#[derive(Debug, Clone)]
pub struct Cancellation {
    rx: watch::Receiver<bool>,
}

impl Cancellation {
    pub fn new(rx: watch::Receiver<bool>) -> Self {
        Self { rx }
    }

    /// Create a trigger and the matching signal
    pub fn channel() -> (watch::Sender<bool>, Self) {
        let (tx, rx) = watch::channel(false);
        (tx, Self::new(rx))
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once cancellation is requested; never resolves if the trigger is dropped
    async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Absolute-deadline scheduler for one timed operation
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    start: Instant,
    duration: Duration,
    steps: u32,
}

impl Pacer {
    /// Start pacing now
    pub fn start(duration: Duration, steps: u32) -> Self {
        Self::starting_at(Instant::now(), duration, steps)
    }

    pub fn starting_at(start: Instant, duration: Duration, steps: u32) -> Self {
        Self {
            start,
            duration,
            steps: steps.max(1),
        }
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Offset of step `step` from the start instant
    #[inline]
    pub fn offset(&self, step: u32) -> Duration {
        let fraction = step.min(self.steps) as f64 / self.steps as f64;
        self.duration.mul_f64(fraction)
    }

    /// Absolute deadline of step `step`
    #[inline]
    pub fn deadline(&self, step: u32) -> Instant {
        self.start + self.offset(step)
    }

    /// Suspend until the deadline of `step`
    ///
    /// Returns immediately when the deadline already passed. With a
    /// cancellation signal the wait ends early once it fires.
    pub async fn wait(&self, step: u32, cancel: Option<&mut Cancellation>) -> Pace {
        if let Some(cancel) = cancel.as_deref() {
            if cancel.is_cancelled() {
                return Pace::Cancelled;
            }
        }

        let deadline = self.deadline(step);
        let now = Instant::now();
        if deadline <= now {
            trace!(step, behind_us = (now - deadline).as_micros() as u64, "step late, not sleeping");
            return Pace::Continue;
        }

        match cancel {
            None => {
                sleep_until(deadline).await;
                Pace::Continue
            }
            Some(cancel) => {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Pace::Cancelled,
                    _ = sleep_until(deadline) => Pace::Continue,
                }
            }
        }
    }
}
