//! Error types for tonegen-ap
//!
//! Every failure in a session is fatal: the controller tears the engine down
//! and surfaces the error, whose [`ErrorCode`] becomes the process exit status.

use thiserror::Error;

/// Main error type for tonegen-ap
#[derive(Error, Debug)]
pub enum Error {
    /// Engine-wide initialization failed; no stream was attempted
    #[error("Audio engine initialization failed: {0}")]
    Initialization(String),

    /// Host reports no default output device
    #[error("No default output device")]
    NoDefaultOutputDevice,

    /// Device capability query failed
    #[error("Device query failed: {0}")]
    DeviceQuery(String),

    /// Opening a stream failed
    #[error("Failed to open stream at {sample_rate} Hz: {reason}")]
    StreamOpen { sample_rate: u32, reason: String },

    /// Starting a stream failed
    #[error("Failed to start stream: {0}")]
    StreamStart(String),

    /// Stopping a stream failed
    #[error("Failed to stop stream: {0}")]
    StreamStop(String),

    /// Closing a stream failed
    #[error("Failed to close stream: {0}")]
    StreamClose(String),

    /// Engine-wide teardown failed
    #[error("Audio engine teardown failed: {0}")]
    Termination(String),

    /// Lifecycle call made in the wrong state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Configuration errors from tonegen-common
    #[error(transparent)]
    Config(#[from] tonegen_common::Error),
}

/// Convenience Result type using tonegen-ap Error
pub type Result<T> = std::result::Result<T, Error>;

/// Stable numeric code for each error category
///
/// `NoError` is never produced by an [`Error`]; it is the success exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCode {
    NoError = 0,
    Initialization = 10,
    NoDefaultOutputDevice = 11,
    DeviceQuery = 12,
    StreamOpen = 20,
    StreamStart = 21,
    StreamStop = 22,
    StreamClose = 23,
    Termination = 24,
    InvalidState = 30,
    Config = 40,
}

impl ErrorCode {
    /// Value used as process exit status
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Human-readable text for the code
    pub fn text(self) -> &'static str {
        match self {
            ErrorCode::NoError => "Success",
            ErrorCode::Initialization => "Audio engine not initialized",
            ErrorCode::NoDefaultOutputDevice => "No default output device",
            ErrorCode::DeviceQuery => "Device unavailable",
            ErrorCode::StreamOpen => "Stream could not be opened",
            ErrorCode::StreamStart => "Stream could not be started",
            ErrorCode::StreamStop => "Stream could not be stopped",
            ErrorCode::StreamClose => "Stream could not be closed",
            ErrorCode::Termination => "Audio engine teardown failed",
            ErrorCode::InvalidState => "Invalid stream state",
            ErrorCode::Config => "Invalid configuration",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.as_u8(), self.text())
    }
}

impl Error {
    /// Error category code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Initialization(_) => ErrorCode::Initialization,
            Error::NoDefaultOutputDevice => ErrorCode::NoDefaultOutputDevice,
            Error::DeviceQuery(_) => ErrorCode::DeviceQuery,
            Error::StreamOpen { .. } => ErrorCode::StreamOpen,
            Error::StreamStart(_) => ErrorCode::StreamStart,
            Error::StreamStop(_) => ErrorCode::StreamStop,
            Error::StreamClose(_) => ErrorCode::StreamClose,
            Error::Termination(_) => ErrorCode::Termination,
            Error::InvalidState(_) => ErrorCode::InvalidState,
            Error::Config(_) => ErrorCode::Config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_has_nonzero_code() {
        let errors = [
            Error::Initialization("x".into()),
            Error::NoDefaultOutputDevice,
            Error::DeviceQuery("x".into()),
            Error::StreamOpen { sample_rate: 44_100, reason: "x".into() },
            Error::StreamStart("x".into()),
            Error::StreamStop("x".into()),
            Error::StreamClose("x".into()),
            Error::Termination("x".into()),
            Error::InvalidState("x".into()),
            Error::Config(tonegen_common::Error::Config("x".into())),
        ];

        for error in &errors {
            assert_ne!(error.code(), ErrorCode::NoError, "{error}");
            assert_ne!(error.code().as_u8(), 0);
        }
    }

    #[test]
    fn test_open_error_names_rate() {
        let error = Error::StreamOpen { sample_rate: 48_000, reason: "busy".into() };
        assert_eq!(error.to_string(), "Failed to open stream at 48000 Hz: busy");
        assert_eq!(error.code().to_string(), "20 (Stream could not be opened)");
    }
}
