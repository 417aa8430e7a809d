pub mod backend;
pub mod config;
pub mod cursor;
pub mod error;
pub mod motion;
pub mod pacing;
pub mod scroll;
pub mod service;
pub mod settings;

pub use backend::{
    create_backend, BackendKind, Bounds, ButtonBackend, PointerBackend, Position, PositionBackend,
};
pub use config::{AppConfig, MotionConfig, ScrollConfig};
pub use cursor::Cursor;
pub use error::{Error, Result};
pub use motion::{MotionController, MoveReport};
pub use scroll::{ScrollController, ScrollReport};
pub use service::{PointerHandle, PointerService};
pub use settings::{Settings, SettingsHandle};
