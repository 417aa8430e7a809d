//! Runtime-mutable controller settings
//!
//! Motion and scroll parameters live in a single shared cell. Writers replace
//! the whole value; every `move_to` / `scroll` call copies it once at entry,
//! so an update never reaches an interpolation that is already running.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::config::{AppConfig, MotionConfig, ScrollConfig};
use crate::Result;

/// Immutable snapshot of the controller parameters
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Settings {
    pub motion: MotionConfig,
    pub scroll: ScrollConfig,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.motion.validate()?;
        self.scroll.validate()
    }
}

impl From<&AppConfig> for Settings {
    fn from(config: &AppConfig) -> Self {
        Self {
            motion: config.motion,
            scroll: config.scroll,
        }
    }
}

/// Cloneable handle to the shared settings cell
#[derive(Debug, Clone)]
pub struct SettingsHandle {
    tx: Arc<watch::Sender<Settings>>,
}

impl SettingsHandle {
    /// Create a handle from validated settings
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;
        let (tx, _rx) = watch::channel(settings);
        Ok(Self { tx: Arc::new(tx) })
    }

    /// Copy of the current settings
    pub fn snapshot(&self) -> Settings {
        *self.tx.borrow()
    }

    /// Replace the motion speed, the shared frame rate and the scroll rate
    pub fn update_config(
        &self,
        speed_px_per_sec: f64,
        frame_rate: u32,
        scroll_units_per_sec: f64,
    ) -> Result<()> {
        self.set(Settings {
            motion: MotionConfig {
                speed_px_per_sec,
                frame_rate,
            },
            scroll: ScrollConfig {
                units_per_sec: scroll_units_per_sec,
                frame_rate,
            },
        })
    }

    /// Replace the settings wholesale; invalid values leave the cell untouched
    pub fn set(&self, settings: Settings) -> Result<()> {
        settings.validate()?;
        self.tx.send_replace(settings);
        info!(
            speed_px_per_sec = settings.motion.speed_px_per_sec,
            motion_frame_rate = settings.motion.frame_rate,
            units_per_sec = settings.scroll.units_per_sec,
            scroll_frame_rate = settings.scroll.frame_rate,
            "Controller settings updated"
        );
        Ok(())
    }

    /// Watch for settings changes
    pub fn subscribe(&self) -> watch::Receiver<Settings> {
        self.tx.subscribe()
    }
}

impl Default for SettingsHandle {
    fn default() -> Self {
        let (tx, _rx) = watch::channel(Settings::default());
        Self { tx: Arc::new(tx) }
    }
}
