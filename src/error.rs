use std::path::PathBuf;

use thiserror::Error;

use crate::transcription::TranscriptionError;

#[derive(Debug, Error)]
pub enum VoxpollError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Audio file is empty: {}", .0.display())]
    EmptyAudio(PathBuf),

    #[error("Transcription provider error: {0}")]
    Transcription(#[from] TranscriptionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
