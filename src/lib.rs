pub mod audio;
pub mod config;
pub mod library;
pub mod playback;
pub mod ui;

pub use config::PlayerConfig;
pub use playback::{Phase, PlaybackSession, PlaybackState, PlayerHandle, PlayerService, SessionHost};

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum RecordingsError {
    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    IOError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),
}

impl From<std::io::Error> for RecordingsError {
    fn from(e: std::io::Error) -> Self {
        RecordingsError::IOError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RecordingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let err: RecordingsError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, RecordingsError::IOError(ref msg) if msg.contains("gone")));
    }
}
