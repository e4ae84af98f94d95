use std::path::PathBuf;

use thiserror::Error;

/// Failures from the I/O layers around the quiz (audio, terminal, tone files).
/// The challenge engine itself never fails.
#[derive(Error, Debug)]
pub enum QuizError {
    #[error("no output audio device available")]
    NoOutputDevice,

    #[error("failed to get default output config: {0}")]
    AudioConfig(String),

    #[error("audio stream error: {0}")]
    AudioStream(String),

    #[error("audio thread disconnected")]
    AudioDisconnected,

    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    #[error("reading {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("line {line}: {message}")]
    Config { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, QuizError>;
