use thiserror::Error;

/// Errors returned by vision anonymization operations.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("unknown anonymization method {0:?}, expected \"pixelate\" or \"blur\"")]
    InvalidMethod(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("face detector error: {0}")]
    Detector(String),
}
