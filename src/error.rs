//! Unified error type.

/// The error type returned by apiprobe's fallible operations.
///
/// Application-level failures (404, 400, the simulated 500) are expressed as
/// HTTP [`Response`](crate::Response) values, not as `Error`s. This type
/// surfaces infrastructure failures: reading configuration, binding to a
/// port or accepting a connection.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid {key}: {message}")]
    Config { key: &'static str, message: String },
}

impl Error {
    pub(crate) fn config(key: &'static str, message: impl Into<String>) -> Self {
        Self::Config { key, message: message.into() }
    }
}
