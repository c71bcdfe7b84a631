use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TTS request failed: {0}")]
    Http(String),
    #[error("`{program}` exited with {status}: {stderr}")]
    Command {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("synthesizer produced no audio at {0}")]
    EmptyArtifact(PathBuf),
    #[error("playback failed: {0}")]
    Playback(String),
    #[error("invalid player command: {0}")]
    InvalidCommand(String),
    #[error("nothing to say")]
    EmptyText,
}

impl From<reqwest::Error> for SpeechError {
    fn from(err: reqwest::Error) -> Self {
        SpeechError::Http(err.to_string())
    }
}
