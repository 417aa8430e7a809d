use std::collections::VecDeque;

use tracing::trace;

use super::{Bounds, ButtonBackend, PointerBackend, Position, PositionBackend};
use crate::{Error, Result};

/// Number of events kept in the history ring
const HISTORY_LIMIT: usize = 4096;

/// Event observed by the virtual desktop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Moved(Position),
    PrimaryClick(Position),
    SecondaryClick(Position),
    Wheel(i32),
}

/// In-memory pointer with fixed bounds
///
/// Behaves like a single-display desktop without touching the OS. Used for
/// dry runs and on platforms without a native backend.
#[derive(Debug, Clone)]
pub struct VirtualDesktop {
    bounds: Bounds,
    position: Position,
    history: VecDeque<PointerEvent>,
}

impl VirtualDesktop {
    /// Create a desktop with the pointer in the middle of `bounds`
    pub fn new(bounds: Bounds) -> Self {
        let center = Position::new(
            ((bounds.min_x as i64 + bounds.max_x as i64) / 2) as i32,
            ((bounds.min_y as i64 + bounds.max_y as i64) / 2) as i32,
        );
        Self {
            bounds,
            position: center,
            history: VecDeque::new(),
        }
    }

    /// Place the pointer without recording an event, clamped into the bounds
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = self.bounds.clamp(position);
        self
    }

    /// Most recent events, oldest first
    pub fn history(&self) -> impl Iterator<Item = &PointerEvent> {
        self.history.iter()
    }

    /// Change the addressable area (simulates a display reconfiguration)
    ///
    /// A pointer left outside the new area is pulled onto its nearest edge,
    /// as the OS does when a display goes away.
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        self.position = bounds.clamp(self.position);
    }

    fn record(&mut self, event: PointerEvent) {
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(event);
    }
}

impl PositionBackend for VirtualDesktop {
    fn position(&self) -> Result<Position> {
        Ok(self.position)
    }

    fn set_position(&mut self, position: Position) -> Result<()> {
        if !self.bounds.contains(position) {
            return Err(Error::Backend(format!(
                "position {} outside virtual desktop {}",
                position, self.bounds
            )));
        }
        trace!("virtual pointer -> {}", position);
        self.position = position;
        self.record(PointerEvent::Moved(position));
        Ok(())
    }

    fn bounds(&self) -> Result<Bounds> {
        Ok(self.bounds)
    }
}

impl ButtonBackend for VirtualDesktop {
    fn primary_click(&mut self) -> Result<()> {
        trace!("virtual primary click at {}", self.position);
        self.record(PointerEvent::PrimaryClick(self.position));
        Ok(())
    }

    fn secondary_click(&mut self) -> Result<()> {
        trace!("virtual secondary click at {}", self.position);
        self.record(PointerEvent::SecondaryClick(self.position));
        Ok(())
    }

    fn wheel_tick(&mut self, magnitude: i32) -> Result<()> {
        trace!("virtual wheel {:+}", magnitude);
        self.record(PointerEvent::Wheel(magnitude));
        Ok(())
    }
}

impl PointerBackend for VirtualDesktop {
    fn name(&self) -> &'static str {
        "virtual"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_centered() {
        let desktop = VirtualDesktop::new(Bounds::new(0, 0, 1919, 1079));
        assert_eq!(desktop.position().unwrap(), Position::new(959, 539));
    }

    #[test]
    fn test_rejects_writes_outside_bounds() {
        let mut desktop = VirtualDesktop::new(Bounds::new(0, 0, 99, 99));
        assert!(desktop.set_position(Position::new(100, 5)).is_err());
        assert!(desktop.set_position(Position::new(99, 99)).is_ok());
        assert_eq!(desktop.position().unwrap(), Position::new(99, 99));
    }

    #[test]
    fn test_records_clicks_at_current_position() {
        let mut desktop =
            VirtualDesktop::new(Bounds::new(0, 0, 99, 99)).with_position(Position::new(10, 20));
        desktop.primary_click().unwrap();
        desktop.wheel_tick(-2).unwrap();
        desktop.secondary_click().unwrap();

        let events: Vec<_> = desktop.history().copied().collect();
        assert_eq!(
            events,
            vec![
                PointerEvent::PrimaryClick(Position::new(10, 20)),
                PointerEvent::Wheel(-2),
                PointerEvent::SecondaryClick(Position::new(10, 20)),
            ]
        );
    }

    #[test]
    fn test_shrinking_bounds_pulls_pointer_inside() {
        let mut desktop = VirtualDesktop::new(Bounds::new(0, 0, 1919, 1079))
            .with_position(Position::new(1900, 1000));
        desktop.set_bounds(Bounds::new(0, 0, 1279, 719));

        assert_eq!(desktop.position().unwrap(), Position::new(1279, 719));
        assert_eq!(desktop.history().count(), 0);
    }

    #[test]
    fn test_initial_position_is_clamped() {
        let desktop =
            VirtualDesktop::new(Bounds::new(0, 0, 99, 99)).with_position(Position::new(-5, 500));
        assert_eq!(desktop.position().unwrap(), Position::new(0, 99));
    }

    #[test]
    fn test_history_is_bounded() {
        let mut desktop = VirtualDesktop::new(Bounds::new(0, 0, 9, 9));
        for _ in 0..HISTORY_LIMIT + 10 {
            desktop.wheel_tick(1).unwrap();
        }
        assert_eq!(desktop.history().count(), HISTORY_LIMIT);
    }
}
