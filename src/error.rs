//! Error handling for the setup tool
//!
//! Library code returns `SetupError`; the binary wraps it in `anyhow` where a
//! file path or other context has to be attached.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the setup tool
#[derive(Error, Debug)]
pub enum SetupError {
    /// IO errors (console, directories, symlinks)
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// IO error tied to a specific path; the cause is the error's source
    #[error("IO error at {}", path.display())]
    PathIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Validation errors (package names, URLs)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Host environment errors (not Termux, no home directory)
    #[error("Host error: {0}")]
    Host(String),

    /// Menu state machine misuse
    #[error("Menu transition error: {0}")]
    MenuTransition(String),
}

/// Result type alias for setup operations
pub type Result<T> = std::result::Result<T, SetupError>;

impl SetupError {
    /// Attach a path to an IO error
    pub fn path_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::PathIo {
            path: path.into(),
            source,
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a host error
    pub fn host(msg: impl Into<String>) -> Self {
        Self::Host(msg.into())
    }

    pub fn menu_transition(msg: impl Into<String>) -> Self {
        Self::MenuTransition(msg.into())
    }

    /// The message followed by each underlying cause, `: `-separated
    pub fn report(&self) -> String {
        let mut msg = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            msg.push_str(": ");
            msg.push_str(&cause.to_string());
            source = cause.source();
        }
        msg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SetupError::validation("package name is empty");
        assert_eq!(err.to_string(), "Validation error: package name is empty");

        let err = SetupError::host("not running inside Termux");
        assert_eq!(err.to_string(), "Host error: not running inside Termux");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SetupError = io_err.into();
        assert!(matches!(err, SetupError::Io(_)));
    }

    #[test]
    fn test_path_io_mentions_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = SetupError::path_io("/data/home/tools", io_err);
        let msg = format!("{:#}", anyhow::Error::new(err));
        assert_eq!(msg, "IO error at /data/home/tools: denied");
    }

    #[test]
    fn test_report_includes_cause() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory");
        let err = SetupError::path_io("/home/u/tools", io_err);
        assert_eq!(err.report(), "IO error at /home/u/tools: not a directory");
    }

    #[test]
    fn test_io_cause_is_printed_once_in_chain() {
        let io_err = std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "stream did not contain valid UTF-8",
        );
        let err: SetupError = io_err.into();
        let msg = format!("{:#}", anyhow::Error::new(err));
        assert_eq!(msg.matches("stream did not contain valid UTF-8").count(), 1);
    }
}
