//! Pointer device capabilities
//!
//! The controllers only ever talk to these traits. Concrete devices are picked
//! once at startup by [`create_backend`], keyed on the configured backend name
//! and the platform the binary runs on.

#[cfg(feature = "enigo")]
mod desktop;
#[cfg(test)]
pub(crate) mod testing;
mod virtual_desktop;

#[cfg(feature = "enigo")]
pub use desktop::EnigoBackend;
pub use virtual_desktop::{PointerEvent, VirtualDesktop};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::GeneralConfig;
use crate::{Error, Result};

/// Absolute pointer coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: Position) -> f64 {
        let dx = other.x as f64 - self.x as f64;
        let dy = other.y as f64 - self.y as f64;
        dx.hypot(dy)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Inclusive rectangle of addressable coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Bounds {
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Bounds of a `width` x `height` display whose top-left corner is `origin`
    pub fn from_origin_size(origin: Position, width: i32, height: i32) -> Self {
        Self::new(
            origin.x,
            origin.y,
            origin.x.saturating_add(width - 1),
            origin.y.saturating_add(height - 1),
        )
    }

    /// True when no coordinate lies inside
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn contains(&self, position: Position) -> bool {
        (self.min_x..=self.max_x).contains(&position.x)
            && (self.min_y..=self.max_y).contains(&position.y)
    }

    /// Nearest point inside the rectangle
    ///
    /// Uses `max`/`min` rather than `i32::clamp` so a malformed rectangle
    /// reported by a backend cannot panic.
    pub fn clamp(&self, position: Position) -> Position {
        Position {
            x: position.x.min(self.max_x).max(self.min_x),
            y: position.y.min(self.max_y).max(self.min_y),
        }
    }

    pub fn width(&self) -> i64 {
        self.max_x as i64 - self.min_x as i64 + 1
    }

    pub fn height(&self) -> i64 {
        self.max_y as i64 - self.min_y as i64 + 1
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x [{}..{}], y [{}..{}]",
            self.min_x, self.max_x, self.min_y, self.max_y
        )
    }
}

/// Absolute pointer position capability
pub trait PositionBackend {
    /// Current absolute pointer position
    fn position(&self) -> Result<Position>;

    /// Move the pointer to an absolute position
    fn set_position(&mut self, position: Position) -> Result<()>;

    /// Addressable area, queried fresh on every call
    fn bounds(&self) -> Result<Bounds>;
}

/// Button and wheel capability
pub trait ButtonBackend {
    /// One primary (left) press and release
    fn primary_click(&mut self) -> Result<()>;

    /// One secondary (right) press and release
    fn secondary_click(&mut self) -> Result<()>;

    /// One atomic wheel event; positive scrolls up, negative scrolls down
    fn wheel_tick(&mut self, magnitude: i32) -> Result<()>;
}

/// A complete pointer device
pub trait PointerBackend: PositionBackend + ButtonBackend + Send {
    /// Short name for logs
    fn name(&self) -> &'static str;
}

impl<T: PositionBackend + ?Sized> PositionBackend for Box<T> {
    fn position(&self) -> Result<Position> {
        (**self).position()
    }

    fn set_position(&mut self, position: Position) -> Result<()> {
        (**self).set_position(position)
    }

    fn bounds(&self) -> Result<Bounds> {
        (**self).bounds()
    }
}

impl<T: ButtonBackend + ?Sized> ButtonBackend for Box<T> {
    fn primary_click(&mut self) -> Result<()> {
        (**self).primary_click()
    }

    fn secondary_click(&mut self) -> Result<()> {
        (**self).secondary_click()
    }

    fn wheel_tick(&mut self, magnitude: i32) -> Result<()> {
        (**self).wheel_tick(magnitude)
    }
}

impl<T: PointerBackend + ?Sized> PointerBackend for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Backend selection from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Native backend for the running platform
    Auto,
    /// OS pointer through the `enigo` crate
    Enigo,
    /// In-memory pointer, no OS side effects
    Virtual,
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "enigo" | "desktop" => Ok(Self::Enigo),
            "virtual" | "dry-run" => Ok(Self::Virtual),
            other => Err(Error::Unsupported(format!(
                "unknown backend '{}' (expected auto, enigo or virtual)",
                other
            ))),
        }
    }
}

/// Create the pointer backend named in the configuration
pub fn create_backend(general: &GeneralConfig) -> Result<Box<dyn PointerBackend>> {
    let kind: BackendKind = general.backend.parse()?;
    let backend: Box<dyn PointerBackend> = match kind {
        BackendKind::Virtual => Box::new(VirtualDesktop::new(general.virtual_bounds)),
        BackendKind::Enigo => desktop_backend()?,
        BackendKind::Auto => match platform_backend(std::env::consts::OS) {
            Ok(backend) => backend,
            Err(Error::Unsupported(reason)) => {
                warn!("No native pointer backend ({}), using virtual desktop", reason);
                Box::new(VirtualDesktop::new(general.virtual_bounds))
            }
            Err(e) => return Err(e),
        },
    };
    info!("Pointer backend: {}", backend.name());
    Ok(backend)
}

/// Native backend for a platform name as reported by `std::env::consts::OS`
fn platform_backend(os: &str) -> Result<Box<dyn PointerBackend>> {
    match os {
        "windows" | "macos" | "linux" => desktop_backend(),
        other => Err(Error::Unsupported(format!(
            "no pointer implementation available for OS '{}'",
            other
        ))),
    }
}

#[cfg(feature = "enigo")]
fn desktop_backend() -> Result<Box<dyn PointerBackend>> {
    Ok(Box::new(EnigoBackend::new()?))
}

#[cfg(not(feature = "enigo"))]
fn desktop_backend() -> Result<Box<dyn PointerBackend>> {
    Err(Error::Unsupported(
        "built without the `enigo` feature".to_string(),
    ))
}
