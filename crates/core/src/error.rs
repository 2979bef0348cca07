use thiserror::Error;

/// Failures of a single transcript extraction attempt.
///
/// Every variant is terminal for the attempt: nothing is retried and no
/// partial document is produced.
#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("Request to {url} failed. {reason}")]
    Network { url: String, reason: String },

    #[error("Unable to parse player response. {reason}")]
    Parse { reason: String },

    #[error("No captions available for video {video_id}")]
    NoCaptions { video_id: String },

    #[error("Transcript extraction was cancelled")]
    Cancelled,
}

/// Coarse failure class, carried by the `Failed` acquisition stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    Parse,
    NoCaptions,
    Cancelled,
}

impl TranscriptError {
    pub fn kind(&self) -> FailureKind {
        match self {
            TranscriptError::Network { .. } => FailureKind::Network,
            TranscriptError::Parse { .. } => FailureKind::Parse,
            TranscriptError::NoCaptions { .. } => FailureKind::NoCaptions,
            TranscriptError::Cancelled => FailureKind::Cancelled,
        }
    }

    pub(crate) fn network(url: impl Into<String>, reason: impl ToString) -> Self {
        TranscriptError::Network {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn parse(reason: impl ToString) -> Self {
        TranscriptError::Parse {
            reason: reason.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum PinocchioError {
    #[error(transparent)]
    Transcript(#[from] TranscriptError),

    #[error("Analysis rejected by server: {reason}")]
    AnalysisRejected { reason: String },

    #[error("Server at {url} responded with status {status}")]
    ApiStatus { url: String, status: u16 },

    #[error("API request failed: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Invalid value for {var}: {reason}")]
    InvalidConfig { var: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PinocchioError>;
