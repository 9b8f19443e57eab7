use thiserror::Error;

/// Failures surfaced by buffers, calibration, the frame cache and the aligner.
///
/// Every variant is fail-fast: the operation that produced it has not written a
/// partial result anywhere.
#[derive(Debug, Error)]
pub enum Error {
    /// A stream is unsupported, not started, or has no calibration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Buffer geometry, channel count or scalar size does not match what was asked for.
    #[error("format error: {0}")]
    Format(String),

    /// Row, column or channel outside the buffer.
    #[error("index error: {0}")]
    Index(String),

    /// Back-projection through a distortion model that has no closed-form inverse.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("settings error: {0}")]
    Settings(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
