//! OS pointer backend built on `enigo`
//!
//! Covers Windows, macOS and Linux (X11). Bounds are those of the main
//! display only.

use enigo::{Axis, Button, Coordinate, Direction, Enigo, Mouse, Settings};
use tracing::debug;

use super::{Bounds, ButtonBackend, PointerBackend, Position, PositionBackend};
use crate::{Error, Result};

pub struct EnigoBackend {
    enigo: Enigo,
}

impl EnigoBackend {
    pub fn new() -> Result<Self> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| Error::Backend(format!("failed to connect to input system: {}", e)))?;
        debug!("Connected enigo pointer backend");
        Ok(Self { enigo })
    }

    fn click(&mut self, button: Button) -> Result<()> {
        self.enigo
            .button(button, Direction::Click)
            .map_err(|e| Error::Backend(e.to_string()))
    }
}

impl PositionBackend for EnigoBackend {
    fn position(&self) -> Result<Position> {
        let (x, y) = self
            .enigo
            .location()
            .map_err(|e| Error::Backend(e.to_string()))?;
        Ok(Position::new(x, y))
    }

    fn set_position(&mut self, position: Position) -> Result<()> {
        self.enigo
            .move_mouse(position.x, position.y, Coordinate::Abs)
            .map_err(|e| Error::Backend(e.to_string()))
    }

    fn bounds(&self) -> Result<Bounds> {
        let (width, height) = self
            .enigo
            .main_display()
            .map_err(|e| Error::Backend(e.to_string()))?;
        Ok(Bounds::from_origin_size(Position::default(), width, height))
    }
}

impl ButtonBackend for EnigoBackend {
    fn primary_click(&mut self) -> Result<()> {
        self.click(Button::Left)
    }

    fn secondary_click(&mut self) -> Result<()> {
        self.click(Button::Right)
    }

    fn wheel_tick(&mut self, magnitude: i32) -> Result<()> {
        // enigo scrolls down for positive lengths
        self.enigo
            .scroll(-magnitude, Axis::Vertical)
            .map_err(|e| Error::Backend(e.to_string()))
    }
}

impl PointerBackend for EnigoBackend {
    fn name(&self) -> &'static str {
        "enigo"
    }
}
