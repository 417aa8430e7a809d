//! Rate-limited wheel scrolling
//!
//! A scroll of `delta` units is spread over `|delta| / units_per_sec` seconds.
//! Each frame adds `delta / steps` to a fractional accumulator and emits the
//! whole part as one wheel tick, so scroll rates below one unit per frame still
//! come out evenly. The final flush emits `delta - emitted` computed in integer
//! arithmetic, which keeps the total exact whatever the float error.

use std::time::Duration;

use tracing::{debug, trace};

use crate::backend::ButtonBackend;
use crate::config::ScrollConfig;
use crate::pacing::{seconds, step_count, Cancellation, Pace, Pacer};
use crate::settings::SettingsHandle;
use crate::Result;

/// Precomputed tick schedule for one scroll
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPlan {
    pub delta: i32,
    pub duration: Duration,
    pub steps: u32,
    /// Units added to the accumulator per frame, signed like `delta`
    pub per_step: f64,
}

impl ScrollPlan {
    /// Plan a scroll, or `None` for a zero delta
    pub fn new(delta: i32, config: &ScrollConfig) -> Option<Self> {
        if delta == 0 {
            return None;
        }
        let duration_secs = (delta as f64).abs() / config.units_per_sec;
        let steps = step_count(config.frame_rate, duration_secs);
        Some(Self {
            delta,
            duration: seconds(duration_secs),
            steps,
            per_step: delta as f64 / steps as f64,
        })
    }
}

/// Residue below this magnitude is float noise, not a partial unit
const RESIDUE_EPSILON: f64 = 1e-9;

/// Whole units owed for a fractional residue, rounded away from zero
///
/// `|residue| < 1` after every loop step, so the result is -1, 0 or 1.
pub fn flush_residue(residue: f64) -> i64 {
    if residue.abs() < RESIDUE_EPSILON {
        0
    } else {
        (residue.abs().ceil() as i64) * residue.signum() as i64
    }
}

/// Summary of a finished `scroll`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollReport {
    /// Signed sum of all emitted ticks
    pub emitted: i32,
    /// Wheel events sent to the backend
    pub ticks: u32,
    pub steps: u32,
    pub cancelled: bool,
}

/// Delivers wheel ticks through a `ButtonBackend`
#[derive(Debug, Clone)]
pub struct ScrollController {
    settings: SettingsHandle,
}

impl ScrollController {
    pub fn new(settings: SettingsHandle) -> Self {
        Self { settings }
    }

    /// Scroll by `delta` wheel units (positive = up, negative = down)
    pub async fn scroll<B>(&self, backend: &mut B, delta: i32) -> Result<ScrollReport>
    where
        B: ButtonBackend + ?Sized,
    {
        self.scroll_with_cancel(backend, delta, None).await
    }

    /// Like [`scroll`](Self::scroll), stopping early once `cancel` fires
    ///
    /// On cancellation the fractional residue is rounded away from zero (see
    /// [`flush_residue`]) and flushed; the part of `delta` not yet accumulated
    /// is dropped.
    pub async fn scroll_with_cancel<B>(
        &self,
        backend: &mut B,
        delta: i32,
        mut cancel: Option<&mut Cancellation>,
    ) -> Result<ScrollReport>
    where
        B: ButtonBackend + ?Sized,
    {
        let config = self.settings.snapshot().scroll;

        let Some(plan) = ScrollPlan::new(delta, &config) else {
            return Ok(ScrollReport {
                emitted: 0,
                ticks: 0,
                steps: 0,
                cancelled: false,
            });
        };

        debug!(
            delta,
            duration_ms = plan.duration.as_millis() as u64,
            steps = plan.steps,
            per_step = plan.per_step,
            "Scrolling"
        );

        let pacer = Pacer::start(plan.duration, plan.steps);
        let mut accumulator = 0.0_f64;
        let mut emitted: i64 = 0;
        let mut ticks = 0;
        let mut cancelled = cancel.as_deref().is_some_and(Cancellation::is_cancelled);

        if !cancelled {
            for step in 1..=plan.steps {
                accumulator += plan.per_step;
                let tick = accumulator.trunc() as i32;
                if tick != 0 {
                    backend.wheel_tick(tick)?;
                    accumulator -= tick as f64;
                    emitted += tick as i64;
                    ticks += 1;
                    trace!(step, tick, residue = accumulator, "wheel tick");
                }

                if pacer.wait(step, cancel.as_deref_mut()).await == Pace::Cancelled {
                    debug!(step, emitted, "Scroll cancelled, flushing residue");
                    cancelled = true;
                    break;
                }
            }
        }

        let flush = if cancelled {
            flush_residue(accumulator)
        } else {
            delta as i64 - emitted
        };
        if flush != 0 {
            backend.wheel_tick(flush as i32)?;
            emitted += flush;
            ticks += 1;
            trace!(flush, "residue flush");
        }

        Ok(ScrollReport {
            emitted: emitted as i32,
            ticks,
            steps: plan.steps,
            cancelled,
        })
    }
}
