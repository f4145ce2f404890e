//! Error types for the telemetry pipeline.
//!
//! All errors implement the `std::error::Error` trait and carry structured
//! context. The pipeline contains recoverable failures at their origin: the
//! socket reader retries connection errors, the sampler skips a tick on an
//! insufficient frame. Only construction-time errors (configuration) and sink
//! failures propagate.
//!
//! Use [`TelemetryError::is_retryable`] to classify an error before deciding
//! whether to retry or abort:
//!
//! ```rust
//! use axislog::TelemetryError;
//!
//! let error = TelemetryError::connection_failed("controller unreachable");
//! assert!(error.is_retryable());
//! ```

use thiserror::Error;

/// Result type alias for telemetry operations.
pub type Result<T, E = TelemetryError> = std::result::Result<T, E>;

/// Main error type for the telemetry pipeline.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TelemetryError {
    #[error("Failed to connect to controller: {reason}")]
    Connection {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Frame too short: {actual} bytes, need at least {required}")]
    InsufficientFrame { actual: usize, required: usize },

    #[error("Write of {len} bytes at offset {offset} exceeds frame length {frame_len}")]
    OutOfBounds { offset: usize, len: usize, frame_len: usize },

    #[error("Axis {axis} rejected: {reason}")]
    InvalidAxis { axis: u16, reason: String },

    #[error("Configuration error: {reason}")]
    Config {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Output sink error: {context}")]
    Sink {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl TelemetryError {
    /// Returns whether this error is potentially recoverable through retry.
    ///
    /// Connection errors clear up when the controller comes back, and a short
    /// frame is replaced by the next network read. Bounds, axis, and
    /// configuration errors are permanent for a given setup, and a failed
    /// sink stays failed until the operator intervenes.
    pub fn is_retryable(&self) -> bool {
        match self {
            TelemetryError::Connection { .. } => true,
            TelemetryError::InsufficientFrame { .. } => true,
            TelemetryError::OutOfBounds { .. } => false,
            TelemetryError::InvalidAxis { .. } => false,
            TelemetryError::Config { .. } => false,
            TelemetryError::Sink { .. } => false,
        }
    }

    /// Helper constructor for connection errors.
    pub fn connection_failed(reason: impl Into<String>) -> Self {
        TelemetryError::Connection { reason: reason.into(), source: None }
    }

    /// Helper constructor for connection errors with a source.
    pub fn connection_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        TelemetryError::Connection { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for configuration errors.
    pub fn config_error(reason: impl Into<String>) -> Self {
        TelemetryError::Config { reason: reason.into(), source: None }
    }

    /// Helper constructor for configuration errors with a source.
    pub fn config_error_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        TelemetryError::Config { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for output sink errors.
    pub fn sink_error(context: impl Into<String>, source: std::io::Error) -> Self {
        TelemetryError::Sink { context: context.into(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(test)]
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn error_messages_contain_their_context(
                reason in ".*",
                actual in 0usize..4096usize,
                required in 1usize..4096usize,
                axis in 0u16..64u16
            ) {
                let connection = TelemetryError::connection_failed(reason.clone());
                prop_assert!(connection.to_string().contains(&reason));

                let short = TelemetryError::InsufficientFrame { actual, required };
                let msg = short.to_string();
                prop_assert!(msg.contains(&actual.to_string()));
                prop_assert!(msg.contains(&required.to_string()));

                let bad_axis = TelemetryError::InvalidAxis { axis, reason: reason.clone() };
                prop_assert!(bad_axis.to_string().contains(&axis.to_string()));
            }

            #[test]
            fn source_chain_is_traversable(reason in ".*", inner in ".*") {
                let io_err = std::io::Error::other(inner.clone());
                let error = TelemetryError::connection_failed_with_source(
                    reason,
                    Box::new(io_err),
                );

                let source = std::error::Error::source(&error)
                    .expect("connection error should expose its source");
                prop_assert_eq!(source.to_string(), inner);
            }
        }
    }

    #[test]
    fn retryability_classification() {
        assert!(TelemetryError::connection_failed("refused").is_retryable());
        assert!(TelemetryError::InsufficientFrame { actual: 10, required: 570 }.is_retryable());

        assert!(!TelemetryError::OutOfBounds { offset: 3600, len: 4, frame_len: 3600 }
            .is_retryable());
        assert!(!TelemetryError::InvalidAxis { axis: 0, reason: "zero".into() }.is_retryable());
        assert!(!TelemetryError::config_error("missing file").is_retryable());
        assert!(
            !TelemetryError::sink_error("append row", std::io::Error::other("disk full"))
                .is_retryable()
        );
    }

    #[test]
    fn error_traits_validation() {
        // Compile-time check: TelemetryError must be Send + Sync + 'static
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<TelemetryError>();

        let error = TelemetryError::connection_failed("test");
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn sink_error_preserves_io_source() {
        let error = TelemetryError::sink_error(
            "append row",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        );
        let source = std::error::Error::source(&error).expect("sink error carries io source");
        assert_eq!(source.to_string(), "read-only");
    }
}
