use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Pointer service has stopped")]
    ServiceStopped,
}

pub type Result<T> = std::result::Result<T, Error>;
