//! Error types for the bounded buffer system

/// Result type for bounded buffer operations
pub type Result<T> = std::result::Result<T, BufferError>;

/// Errors that can occur while setting up or running a producer/consumer run
///
/// Cancellation is deliberately absent: a cancelled worker stops cleanly and
/// reports its partial progress instead of failing.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BufferError {
    /// Invalid configuration with parameter
    #[error("Invalid configuration for '{parameter}': {message}")]
    InvalidConfig {
        /// Configuration parameter name
        parameter: String,
        /// Error message
        message: String,
    },

    /// Failed to spawn a worker thread
    #[error("Failed to spawn worker thread {worker}: {message}")]
    SpawnError {
        /// Label of the worker that failed to spawn
        worker: String,
        /// Error message
        message: String,
        /// Source IO error
        #[source]
        source: Option<std::io::Error>,
    },

    /// A worker thread (or an event hook it called) panicked
    #[error("Worker thread {worker} panicked: {message}")]
    WorkerPanic {
        /// Label of the panicked worker
        worker: String,
        /// Panic message
        message: String,
    },

    /// General error
    #[error("{0}")]
    Other(String),
}

impl BufferError {
    /// Create an invalid config error
    pub fn invalid_config(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        BufferError::InvalidConfig {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a spawn error with source
    pub fn spawn_with_source(
        worker: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        BufferError::SpawnError {
            worker: worker.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a worker panic error
    pub fn worker_panic(worker: impl Into<String>, message: impl Into<String>) -> Self {
        BufferError::WorkerPanic {
            worker: worker.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        BufferError::Other(msg.into())
    }
}

/// Extract a readable message from a caught panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = BufferError::invalid_config("capacity", "must be greater than 0");
        assert!(matches!(err, BufferError::InvalidConfig { .. }));

        let err = BufferError::worker_panic("C2", "hook exploded");
        assert!(matches!(err, BufferError::WorkerPanic { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = BufferError::invalid_config("num_producers", "must be greater than 0");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for 'num_producers': must be greater than 0"
        );

        let err = BufferError::worker_panic("P1", "boom");
        assert_eq!(err.to_string(), "Worker thread P1 panicked: boom");
    }

    #[test]
    fn test_spawn_error_with_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::WouldBlock, "no threads left");
        let err = BufferError::spawn_with_source("P3", "Cannot create thread", io_err);

        assert!(matches!(err, BufferError::SpawnError { .. }));
        assert!(err.to_string().contains("worker thread P3"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload = std::panic::catch_unwind(|| panic!("static message")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "static message");

        let payload = std::panic::catch_unwind(|| panic!("formatted {}", 7)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "formatted 7");
    }
}
