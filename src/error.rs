use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WaveformError {
    #[error("media bytes unreachable for {locator}: {reason}")]
    Fetch { locator: String, reason: String },

    #[error("audio track not decodable: {0}")]
    Decode(String),
}

impl WaveformError {
    pub fn fetch(locator: impl Into<String>, reason: impl ToString) -> Self {
        WaveformError::Fetch {
            locator: locator.into(),
            reason: reason.to_string(),
        }
    }

    pub fn decode(reason: impl ToString) -> Self {
        WaveformError::Decode(reason.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    #[error("playback failed: {0}")]
    Rejected(String),

    #[error("failed to load video: {0}")]
    Media(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("ffmpeg not found on PATH")]
    FfmpegMissing,

    #[error("export io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("trim range {start:.2}..{end:.2} is not exportable")]
    EmptyRange { start: f64, end: f64 },

    #[error("export failed: {0}")]
    Failed(String),
}
