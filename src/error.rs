use thiserror::Error;

#[derive(Error, Debug)]
pub enum FirError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Block floating-point vector must have at least one element")]
    EmptyVector,

    #[error("Length mismatch: expected {expected} elements, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Frame too long: frame size is {frame_size}, got {len} samples")]
    FrameTooLong { frame_size: usize, len: usize },

    #[error("Stream already finished; no further frames accepted")]
    StreamFinished,

    #[error("Frame transport error: {0}")]
    Transport(String),

    #[error("Unsupported input format: {0}")]
    InputFormat(String),

    #[error("Filter design failed: {0}")]
    FilterDesign(String),

    #[error("WAV I/O error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Filter stage '{0}' panicked")]
    StagePanic(String),
}

pub type Result<T> = std::result::Result<T, FirError>;
