use thiserror::Error;

/// Errors returned by voice de-identification operations.
#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("frequency band width must be greater than zero")]
    InvalidBandWidth,

    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("wav error: {0}")]
    Wav(#[from] hound::Error),
}
