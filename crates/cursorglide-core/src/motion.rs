//! Timed linear pointer motion
//!
//! `move_to` clamps the target into the backend's current bounds, walks a
//! straight line towards it at the configured speed (one absolute write per
//! frame) and finishes with one write of the exact target so rounding never
//! leaves the pointer a pixel short.

use std::time::Duration;

use tracing::{debug, trace};

use crate::backend::{Bounds, Position, PositionBackend};
use crate::config::MotionConfig;
use crate::pacing::{seconds, step_count, Cancellation, Pace, Pacer};
use crate::settings::SettingsHandle;
use crate::Result;

/// Clamp a target into `bounds`; applying it twice changes nothing
#[inline]
pub fn clamp_target(target: Position, bounds: Bounds) -> Position {
    bounds.clamp(target)
}

/// Precomputed interpolation from one point to another
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionPlan {
    pub from: Position,
    pub to: Position,
    pub distance: f64,
    pub duration: Duration,
    pub steps: u32,
}

impl MotionPlan {
    /// Plan a move, or `None` when the target is less than one pixel away
    pub fn new(from: Position, to: Position, config: &MotionConfig) -> Option<Self> {
        let distance = from.distance_to(to);
        if distance < 1.0 {
            return None;
        }
        let duration_secs = distance / config.speed_px_per_sec;
        Some(Self {
            from,
            to,
            distance,
            duration: seconds(duration_secs),
            steps: step_count(config.frame_rate, duration_secs),
        })
    }

    /// Rounded intermediate point for `step` in `1..=steps`
    pub fn point_at(&self, step: u32) -> Position {
        let t = step.min(self.steps) as f64 / self.steps as f64;
        let dx = self.to.x as f64 - self.from.x as f64;
        let dy = self.to.y as f64 - self.from.y as f64;
        Position::new(
            (self.from.x as f64 + dx * t).round() as i32,
            (self.from.y as f64 + dy * t).round() as i32,
        )
    }
}

/// Summary of a finished `move_to`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveReport {
    /// Clamped target the pointer rests on
    pub target: Position,
    /// Interpolation steps performed (0 on the direct-write path)
    pub steps: u32,
    /// Position writes issued, including the final exact one
    pub writes: u32,
    pub cancelled: bool,
}

/// Moves the pointer smoothly with a `PositionBackend`
#[derive(Debug, Clone)]
pub struct MotionController {
    settings: SettingsHandle,
}

impl MotionController {
    pub fn new(settings: SettingsHandle) -> Self {
        Self { settings }
    }

    /// Smoothly move the pointer to `(target_x, target_y)`
    pub async fn move_to<B>(&self, backend: &mut B, target_x: i32, target_y: i32) -> Result<MoveReport>
    where
        B: PositionBackend + ?Sized,
    {
        self.move_to_with_cancel(backend, target_x, target_y, None).await
    }

    /// Like [`move_to`](Self::move_to), stopping early once `cancel` fires
    ///
    /// A cancelled move still ends with a write of the exact clamped target.
    pub async fn move_to_with_cancel<B>(
        &self,
        backend: &mut B,
        target_x: i32,
        target_y: i32,
        mut cancel: Option<&mut Cancellation>,
    ) -> Result<MoveReport>
    where
        B: PositionBackend + ?Sized,
    {
        let config = self.settings.snapshot().motion;

        let current = backend.position()?;
        let bounds = backend.bounds()?;
        let target = clamp_target(Position::new(target_x, target_y), bounds);

        let Some(plan) = MotionPlan::new(current, target, &config) else {
            trace!("pointer already at {}, direct write", target);
            backend.set_position(target)?;
            return Ok(MoveReport {
                target,
                steps: 0,
                writes: 1,
                cancelled: false,
            });
        };

        debug!(
            from = %current,
            to = %target,
            distance = plan.distance,
            duration_ms = plan.duration.as_millis() as u64,
            steps = plan.steps,
            "Moving pointer"
        );

        let pacer = Pacer::start(plan.duration, plan.steps);
        let mut writes = 0;
        let mut cancelled = cancel.as_deref().is_some_and(Cancellation::is_cancelled);

        if !cancelled {
            for step in 1..=plan.steps {
                let point = plan.point_at(step);
                backend.set_position(point)?;
                writes += 1;
                trace!(step, x = point.x, y = point.y, "pointer step");

                if pacer.wait(step, cancel.as_deref_mut()).await == Pace::Cancelled {
                    debug!(step, "Move cancelled, jumping to target");
                    cancelled = true;
                    break;
                }
            }
        }

        backend.set_position(target)?;
        writes += 1;

        Ok(MoveReport {
            target,
            steps: plan.steps,
            writes,
            cancelled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::RecordingBackend;
    use crate::settings::Settings;
    use tokio::time::Instant;

    fn controller(speed_px_per_sec: f64, frame_rate: u32) -> MotionController {
        let mut settings = Settings::default();
        settings.motion = MotionConfig {
            speed_px_per_sec,
            frame_rate,
        };
        MotionController::new(SettingsHandle::new(settings).unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn test_arrives_exactly_on_target() {
        let motion = controller(1000.0, 120);
        let mut backend = RecordingBackend::full_hd(Position::new(3, 7));

        let report = motion.move_to(&mut backend, 1234, 567).await.unwrap();

        assert_eq!(backend.position, Position::new(1234, 567));
        assert_eq!(report.target, Position::new(1234, 567));
        assert_eq!(backend.writes.last().unwrap().0, Position::new(1234, 567));
        assert_eq!(report.writes as usize, backend.writes.len());
        assert_eq!(report.writes, report.steps + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_bounds_target_is_clamped() {
        let motion = controller(5000.0, 120);
        let mut backend = RecordingBackend::full_hd(Position::new(100, 100));

        let report = motion.move_to(&mut backend, 5000, -50).await.unwrap();

        assert_eq!(report.target, Position::new(1919, 0));
        assert_eq!(backend.position, Position::new(1919, 0));
        let bounds = backend.bounds;
        assert!(backend.written_positions().iter().all(|p| bounds.contains(*p)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_distance_writes_once_without_delay() {
        let motion = controller(1000.0, 120);
        let mut backend = RecordingBackend::full_hd(Position::new(800, 400));
        let start = Instant::now();

        let report = motion.move_to(&mut backend, 800, 400).await.unwrap();

        assert_eq!(backend.written_positions(), vec![Position::new(800, 400)]);
        assert_eq!(report.steps, 0);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sub_pixel_clamped_target_takes_direct_path() {
        let motion = controller(1000.0, 120);
        let mut backend = RecordingBackend::full_hd(Position::new(1919, 500));

        motion.move_to(&mut backend, 4000, 500).await.unwrap();

        assert_eq!(backend.written_positions(), vec![Position::new(1919, 500)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_step_count_and_duration_follow_speed() {
        // 600 px at 1200 px/s is 0.5 s; at 60 fps that is 30 steps
        let motion = controller(1200.0, 60);
        let mut backend = RecordingBackend::full_hd(Position::new(100, 200));
        let start = Instant::now();

        let report = motion.move_to(&mut backend, 700, 200).await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(report.steps, 30);
        assert_eq!(backend.writes.len(), 31);
        let frame = Duration::from_secs_f64(1.0 / 60.0);
        assert!(elapsed >= Duration::from_millis(500) - Duration::from_millis(1));
        assert!(elapsed <= Duration::from_millis(500) + frame);
    }

    #[tokio::test(start_paused = true)]
    async fn test_intermediate_points_are_monotonic_and_paced() {
        let motion = controller(1000.0, 120);
        let mut backend = RecordingBackend::full_hd(Position::new(0, 0));

        motion.move_to(&mut backend, 400, 300).await.unwrap();

        let positions = backend.written_positions();
        for pair in positions.windows(2) {
            assert!(pair[1].x >= pair[0].x);
            assert!(pair[1].y >= pair[0].y);
        }
        for pair in backend.writes.windows(2) {
            assert!(pair[1].1 >= pair[0].1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounds_are_queried_on_every_call() {
        let motion = controller(10_000.0, 120);
        let mut backend = RecordingBackend::full_hd(Position::new(0, 0));

        motion.move_to(&mut backend, 3000, 3000).await.unwrap();
        assert_eq!(backend.position, Position::new(1919, 1079));

        // Display shrinks between calls
        backend.bounds = Bounds::new(0, 0, 1279, 719);
        motion.move_to(&mut backend, 3000, 3000).await.unwrap();

        assert_eq!(backend.position, Position::new(1279, 719));
        assert_eq!(backend.bounds_queries.get(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_config_update_mid_move_does_not_affect_running_call() {
        let settings = SettingsHandle::new(Settings {
            motion: MotionConfig {
                speed_px_per_sec: 1000.0,
                frame_rate: 100,
            },
            ..Settings::default()
        })
        .unwrap();
        let motion = MotionController::new(settings.clone());

        let writer = settings.clone();
        let mut backend = RecordingBackend::full_hd(Position::new(0, 0)).on_write(move |n| {
            if n == 3 {
                writer.update_config(50.0, 10, 300.0).unwrap();
            }
        });

        // 1000 px at 1000 px/s and 100 fps is 100 steps
        let start = Instant::now();
        let report = motion.move_to(&mut backend, 1000, 0).await.unwrap();

        assert_eq!(report.steps, 100);
        assert_eq!(backend.writes.len(), 101);
        assert!(start.elapsed() <= Duration::from_millis(1010));

        // The next call picks up the new settings
        backend.writes.clear();
        let report = motion.move_to(&mut backend, 950, 0).await.unwrap();
        assert_eq!(report.steps, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_move_still_lands_on_target() {
        let motion = controller(100.0, 60);
        let mut backend = RecordingBackend::full_hd(Position::new(0, 0));
        let (trigger, mut cancel) = Cancellation::channel();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            let _ = trigger.send(true);
        });

        let start = Instant::now();
        let report = motion
            .move_to_with_cancel(&mut backend, 1000, 0, Some(&mut cancel))
            .await
            .unwrap();

        assert!(report.cancelled);
        assert!(start.elapsed() < Duration::from_secs(1));
        assert!(report.writes < report.steps + 1);
        assert_eq!(backend.position, Position::new(1000, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backend_failure_propagates_without_rollback() {
        let motion = controller(1000.0, 120);
        let mut backend = RecordingBackend::full_hd(Position::new(0, 0));
        backend.fail_on_write = Some(4);

        let result = motion.move_to(&mut backend, 500, 0).await;

        assert!(matches!(result, Err(crate::Error::Backend(_))));
        assert_eq!(backend.writes.len(), 3);
        assert_ne!(backend.position, Position::new(0, 0));
    }

    #[test]
    fn test_plan_end_point_is_exact() {
        let plan = MotionPlan::new(
            Position::new(-20, 15),
            Position::new(333, -777),
            &MotionConfig::default(),
        )
        .unwrap();
        assert_eq!(plan.point_at(plan.steps), Position::new(333, -777));
        assert_eq!(plan.point_at(0), Position::new(-20, 15));
    }
}
