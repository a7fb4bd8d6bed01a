pub mod audio;
pub mod config;
pub mod net;
pub mod session;
pub mod ui;
pub mod utils;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum HiwarError {
    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    #[error("Microphone access denied: {0}")]
    PermissionDenied(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Protocol error: {0}")]
    ProtocolError(String),

    #[error("Playback error: {0}")]
    PlaybackError(String),

    #[error("IO error: {0}")]
    IOError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),
}

impl From<std::io::Error> for HiwarError {
    fn from(e: std::io::Error) -> Self {
        HiwarError::IOError(e.to_string())
    }
}

impl HiwarError {
    /// Check if this error is recoverable by starting a new session
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Hardware/device errors may require user intervention
            HiwarError::AudioDeviceError(_) => false,
            HiwarError::PermissionDenied(_) => false,
            // A new recording session opens a fresh connection
            HiwarError::TransportError(_) => true,
            HiwarError::ProtocolError(_) => true,
            // Playback failures never block the conversation
            HiwarError::PlaybackError(_) => true,
            HiwarError::IOError(_) => false,
            HiwarError::ConfigError(_) => false,
            HiwarError::ChannelError(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            HiwarError::AudioDeviceError(_) => {
                "Audio device error. Please check your microphone.".to_string()
            }
            HiwarError::PermissionDenied(_) => {
                "Microphone access was denied. Please allow microphone use and try again."
                    .to_string()
            }
            HiwarError::TransportError(_) => {
                "Could not reach the assistant service. Please try again.".to_string()
            }
            HiwarError::ProtocolError(_) => {
                "Received an unexpected reply from the assistant service.".to_string()
            }
            HiwarError::PlaybackError(_) => {
                "Voice playback failed. The reply is shown as text.".to_string()
            }
            HiwarError::IOError(_) => "File system error occurred.".to_string(),
            HiwarError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
            HiwarError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, HiwarError>;
