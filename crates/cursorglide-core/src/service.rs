//! Serialized pointer executor
//!
//! A [`PointerService`] owns a [`Cursor`] on its own task and runs queued
//! commands one at a time, so any number of producers (a command prompt, a
//! sensor loop) can share one pointer without interleaving their writes.

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::backend::{Bounds, PointerBackend, Position};
use crate::cursor::Cursor;
use crate::motion::MoveReport;
use crate::pacing::Cancellation;
use crate::scroll::ScrollReport;
use crate::settings::SettingsHandle;
use crate::{Error, Result};

/// Queue depth before producers wait
const COMMAND_QUEUE_SIZE: usize = 32;

/// Work item for the pointer task
#[derive(Debug)]
pub enum PointerCommand {
    MoveTo {
        x: i32,
        y: i32,
        respond_to: oneshot::Sender<Result<MoveReport>>,
    },
    Scroll {
        delta: i32,
        respond_to: oneshot::Sender<Result<ScrollReport>>,
    },
    PrimaryClick {
        respond_to: oneshot::Sender<Result<()>>,
    },
    SecondaryClick {
        respond_to: oneshot::Sender<Result<()>>,
    },
    Bounds {
        respond_to: oneshot::Sender<Result<(Bounds, Position)>>,
    },
}

/// Task that owns the pointer
pub struct PointerService<B> {
    cursor: Cursor<B>,
    commands: mpsc::Receiver<PointerCommand>,
    shutdown: watch::Receiver<bool>,
}

impl<B: PointerBackend + 'static> PointerService<B> {
    /// Spawn the pointer task; the join handle gives the cursor back after shutdown
    pub fn spawn(cursor: Cursor<B>) -> (PointerHandle, JoinHandle<Cursor<B>>) {
        let (tx, commands) = mpsc::channel(COMMAND_QUEUE_SIZE);
        let (shutdown_tx, shutdown) = watch::channel(false);
        let handle = PointerHandle {
            tx,
            settings: cursor.settings().clone(),
            shutdown: std::sync::Arc::new(shutdown_tx),
        };

        let service = Self {
            cursor,
            commands,
            shutdown,
        };
        let task = tokio::spawn(service.run());
        (handle, task)
    }

    async fn run(mut self) -> Cursor<B> {
        info!("Pointer service started ({})", self.cursor.backend().name());
        let mut cancel = Cancellation::new(self.shutdown.clone());

        loop {
            tokio::select! {
                biased;
                result = self.shutdown.changed() => {
                    if result.is_err() || *self.shutdown.borrow() {
                        info!("Pointer service received shutdown signal");
                        break;
                    }
                }
                command = self.commands.recv() => {
                    match command {
                        Some(command) => self.execute(command, &mut cancel).await,
                        None => {
                            debug!("All pointer handles dropped");
                            break;
                        }
                    }
                }
            }
        }

        info!("Pointer service stopped");
        self.cursor
    }

    async fn execute(&mut self, command: PointerCommand, cancel: &mut Cancellation) {
        match command {
            PointerCommand::MoveTo { x, y, respond_to } => {
                let result = self.cursor.move_to_with_cancel(x, y, Some(cancel)).await;
                if let Err(e) = &result {
                    warn!("Move to ({}, {}) failed: {}", x, y, e);
                }
                let _ = respond_to.send(result);
            }
            PointerCommand::Scroll { delta, respond_to } => {
                let result = self.cursor.scroll_with_cancel(delta, Some(cancel)).await;
                if let Err(e) = &result {
                    warn!("Scroll by {} failed: {}", delta, e);
                }
                let _ = respond_to.send(result);
            }
            PointerCommand::PrimaryClick { respond_to } => {
                let _ = respond_to.send(self.cursor.primary_click());
            }
            PointerCommand::SecondaryClick { respond_to } => {
                let _ = respond_to.send(self.cursor.secondary_click());
            }
            PointerCommand::Bounds { respond_to } => {
                let result = self.cursor.bounds().and_then(|bounds| {
                    let position = self.cursor.position()?;
                    Ok((bounds, position))
                });
                let _ = respond_to.send(result);
            }
        }
    }
}

/// Cloneable producer side of a [`PointerService`]
#[derive(Debug, Clone)]
pub struct PointerHandle {
    tx: mpsc::Sender<PointerCommand>,
    settings: SettingsHandle,
    shutdown: std::sync::Arc<watch::Sender<bool>>,
}

impl PointerHandle {
    pub async fn move_to(&self, x: i32, y: i32) -> Result<MoveReport> {
        self.request(|respond_to| PointerCommand::MoveTo { x, y, respond_to })
            .await
    }

    pub async fn scroll(&self, delta: i32) -> Result<ScrollReport> {
        self.request(|respond_to| PointerCommand::Scroll { delta, respond_to })
            .await
    }

    pub async fn primary_click(&self) -> Result<()> {
        self.request(|respond_to| PointerCommand::PrimaryClick { respond_to })
            .await
    }

    pub async fn secondary_click(&self) -> Result<()> {
        self.request(|respond_to| PointerCommand::SecondaryClick { respond_to })
            .await
    }

    /// Current bounds and pointer position
    pub async fn bounds(&self) -> Result<(Bounds, Position)> {
        self.request(|respond_to| PointerCommand::Bounds { respond_to })
            .await
    }

    /// Takes effect on the next queued command, never on the running one
    pub fn update_config(
        &self,
        speed_px_per_sec: f64,
        frame_rate: u32,
        scroll_units_per_sec: f64,
    ) -> Result<()> {
        self.settings
            .update_config(speed_px_per_sec, frame_rate, scroll_units_per_sec)
    }

    pub fn settings(&self) -> &SettingsHandle {
        &self.settings
    }

    /// Cancel the running command (it still finishes on its exact target) and stop the task
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<Result<T>>) -> PointerCommand,
    ) -> Result<T> {
        if *self.shutdown.borrow() {
            return Err(Error::ServiceStopped);
        }
        let (respond_to, response) = oneshot::channel();
        self.tx
            .send(command(respond_to))
            .await
            .map_err(|_| Error::ServiceStopped)?;
        response.await.map_err(|_| Error::ServiceStopped)?
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::backend::testing::RecordingBackend;
    use crate::config::MotionConfig;
    use crate::settings::Settings;

    fn spawn_service(
        start: Position,
        speed_px_per_sec: f64,
    ) -> (PointerHandle, JoinHandle<Cursor<RecordingBackend>>) {
        let settings = SettingsHandle::new(Settings {
            motion: MotionConfig {
                speed_px_per_sec,
                frame_rate: 60,
            },
            ..Settings::default()
        })
        .unwrap();
        let cursor = Cursor::new(RecordingBackend::full_hd(start), settings);
        PointerService::spawn(cursor)
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_producers_do_not_interleave() {
        let (handle, task) = spawn_service(Position::new(0, 0), 1000.0);

        let right = handle.clone();
        let down = handle.clone();
        let (a, b) = tokio::join!(right.move_to(600, 0), down.move_to(600, 600));
        let a = a.unwrap();
        let b = b.unwrap();

        handle.shutdown();
        let backend = task.await.unwrap().into_backend();
        let positions = backend.written_positions();

        // join! polls the first move first, so it holds the queue head
        assert_eq!(positions.len() as u32, a.writes + b.writes);
        let (first, second) = positions.split_at(a.writes as usize);
        assert!(first.iter().all(|p| p.y == 0));
        assert!(second.iter().all(|p| p.x == 600));
        assert_eq!(*first.last().unwrap(), Position::new(600, 0));
        assert_eq!(backend.position, Position::new(600, 600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_running_move_on_exact_target() {
        let (handle, task) = spawn_service(Position::new(0, 0), 100.0);

        let mover = handle.clone();
        let pending = tokio::spawn(async move { mover.move_to(1500, 0).await });

        tokio::time::sleep(Duration::from_millis(300)).await;
        handle.shutdown();

        let report = pending.await.unwrap().unwrap();
        assert!(report.cancelled);

        let backend = task.await.unwrap().into_backend();
        assert_eq!(backend.position, Position::new(1500, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_after_shutdown_fail() {
        let (handle, task) = spawn_service(Position::new(0, 0), 1000.0);
        handle.shutdown();
        task.await.unwrap();

        assert!(matches!(handle.move_to(5, 5).await, Err(Error::ServiceStopped)));
        assert!(matches!(handle.scroll(3).await, Err(Error::ServiceStopped)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clicks_bounds_and_config_through_handle() {
        let (handle, task) = spawn_service(Position::new(40, 50), 1000.0);

        let (bounds, position) = handle.bounds().await.unwrap();
        assert_eq!(bounds, Bounds::new(0, 0, 1919, 1079));
        assert_eq!(position, Position::new(40, 50));

        handle.primary_click().await.unwrap();
        handle.secondary_click().await.unwrap();
        handle.update_config(500.0, 30, 60.0).unwrap();
        assert_eq!(handle.settings().snapshot().motion.frame_rate, 30);

        let report = handle.scroll(-6).await.unwrap();
        assert_eq!(report.emitted, -6);

        drop(handle);
        let backend = task.await.unwrap().into_backend();
        assert_eq!(backend.clicks.len(), 2);
    }
}
