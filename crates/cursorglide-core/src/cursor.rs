use tracing::debug;

use crate::backend::{create_backend, Bounds, PointerBackend, Position};
use crate::config::AppConfig;
use crate::motion::{MotionController, MoveReport};
use crate::pacing::Cancellation;
use crate::scroll::{ScrollController, ScrollReport};
use crate::settings::{Settings, SettingsHandle};
use crate::Result;

/// One pointer device driven by the motion and scroll controllers
///
/// Every operation takes `&mut self`, so a single cursor can never run two
/// motions or scrolls at once. Share it between producers through
/// [`PointerService`](crate::service::PointerService).
pub struct Cursor<B = Box<dyn PointerBackend>> {
    backend: B,
    settings: SettingsHandle,
    motion: MotionController,
    scroll: ScrollController,
}

impl Cursor {
    /// Build the configured backend and controllers
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;
        let backend = create_backend(&config.general)?;
        let settings = SettingsHandle::new(Settings::from(config))?;
        Ok(Self::new(backend, settings))
    }
}

impl<B: PointerBackend> Cursor<B> {
    pub fn new(backend: B, settings: SettingsHandle) -> Self {
        Self {
            backend,
            motion: MotionController::new(settings.clone()),
            scroll: ScrollController::new(settings.clone()),
            settings,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    pub fn settings(&self) -> &SettingsHandle {
        &self.settings
    }

    /// Change motion speed, frame rate and scroll rate for the next operation
    pub fn update_config(
        &self,
        speed_px_per_sec: f64,
        frame_rate: u32,
        scroll_units_per_sec: f64,
    ) -> Result<()> {
        self.settings
            .update_config(speed_px_per_sec, frame_rate, scroll_units_per_sec)
    }

    pub fn position(&self) -> Result<Position> {
        self.backend.position()
    }

    pub fn bounds(&self) -> Result<Bounds> {
        self.backend.bounds()
    }

    pub async fn move_to(&mut self, target_x: i32, target_y: i32) -> Result<MoveReport> {
        self.motion.move_to(&mut self.backend, target_x, target_y).await
    }

    pub async fn move_to_with_cancel(
        &mut self,
        target_x: i32,
        target_y: i32,
        cancel: Option<&mut Cancellation>,
    ) -> Result<MoveReport> {
        self.motion
            .move_to_with_cancel(&mut self.backend, target_x, target_y, cancel)
            .await
    }

    pub async fn scroll(&mut self, delta: i32) -> Result<ScrollReport> {
        self.scroll.scroll(&mut self.backend, delta).await
    }

    pub async fn scroll_with_cancel(
        &mut self,
        delta: i32,
        cancel: Option<&mut Cancellation>,
    ) -> Result<ScrollReport> {
        self.scroll
            .scroll_with_cancel(&mut self.backend, delta, cancel)
            .await
    }

    pub fn primary_click(&mut self) -> Result<()> {
        debug!("Primary click");
        self.backend.primary_click()
    }

    pub fn secondary_click(&mut self) -> Result<()> {
        debug!("Secondary click");
        self.backend.secondary_click()
    }
}
