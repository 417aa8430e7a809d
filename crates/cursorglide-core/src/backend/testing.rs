//! Recording backend for unit tests

use tokio::time::Instant;

use super::{Bounds, ButtonBackend, PointerBackend, Position, PositionBackend};
use crate::{Error, Result};

type WriteHook = Box<dyn FnMut(usize) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Click {
    Primary,
    Secondary,
}

/// Backend that remembers every call and when it happened
pub struct RecordingBackend {
    pub position: Position,
    pub bounds: Bounds,
    pub writes: Vec<(Position, Instant)>,
    pub ticks: Vec<(i32, Instant)>,
    pub clicks: Vec<Click>,
    pub bounds_queries: std::cell::Cell<usize>,
    /// Write index (1-based) that fails with a backend error
    pub fail_on_write: Option<usize>,
    on_write: Option<WriteHook>,
}

impl RecordingBackend {
    pub fn new(position: Position, bounds: Bounds) -> Self {
        Self {
            position,
            bounds,
            writes: Vec::new(),
            ticks: Vec::new(),
            clicks: Vec::new(),
            bounds_queries: std::cell::Cell::new(0),
            fail_on_write: None,
            on_write: None,
        }
    }

    /// Full HD display with the pointer at `position`
    pub fn full_hd(position: Position) -> Self {
        Self::new(position, Bounds::new(0, 0, 1919, 1079))
    }

    /// Run `hook` with the 1-based write count after every position write
    pub fn on_write(mut self, hook: impl FnMut(usize) + Send + 'static) -> Self {
        self.on_write = Some(Box::new(hook));
        self
    }

    pub fn written_positions(&self) -> Vec<Position> {
        self.writes.iter().map(|(position, _)| *position).collect()
    }

    pub fn tick_magnitudes(&self) -> Vec<i32> {
        self.ticks.iter().map(|(magnitude, _)| *magnitude).collect()
    }
}

impl PositionBackend for RecordingBackend {
    fn position(&self) -> Result<Position> {
        Ok(self.position)
    }

    fn set_position(&mut self, position: Position) -> Result<()> {
        let index = self.writes.len() + 1;
        if self.fail_on_write == Some(index) {
            return Err(Error::Backend(format!("injected failure on write {}", index)));
        }
        self.position = position;
        self.writes.push((position, Instant::now()));
        if let Some(hook) = self.on_write.as_mut() {
            hook(index);
        }
        Ok(())
    }

    fn bounds(&self) -> Result<Bounds> {
        self.bounds_queries.set(self.bounds_queries.get() + 1);
        Ok(self.bounds)
    }
}

impl ButtonBackend for RecordingBackend {
    fn primary_click(&mut self) -> Result<()> {
        self.clicks.push(Click::Primary);
        Ok(())
    }

    fn secondary_click(&mut self) -> Result<()> {
        self.clicks.push(Click::Secondary);
        Ok(())
    }

    fn wheel_tick(&mut self, magnitude: i32) -> Result<()> {
        self.ticks.push((magnitude, Instant::now()));
        Ok(())
    }
}

impl PointerBackend for RecordingBackend {
    fn name(&self) -> &'static str {
        "recording"
    }
}
