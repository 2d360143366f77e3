use std::path::PathBuf;

/// Why a file was not accepted as the current selection.
#[derive(Debug, thiserror::Error)]
pub enum PickError {
    #[error("not an image file: {name} ({mime})")]
    NotAnImage { name: String, mime: String },

    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of a single upload/predict round trip.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("no image selected")]
    NoImage,

    #[error("an upload is already in flight")]
    AlreadyUploading,

    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("backend answered {status}{}", .detail.as_ref().map(|d| format!(": {d}")).unwrap_or_default())]
    Status {
        status: reqwest::StatusCode,
        detail: Option<String>,
    },

    #[error("response is not JSON: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("cannot start upload worker: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("upload worker stopped without answering")]
    WorkerGone,
}

impl UploadError {
    /// Validation failures are reported before any request is made.
    pub fn is_validation(&self) -> bool {
        matches!(self, UploadError::NoImage | UploadError::AlreadyUploading)
    }
}

impl From<reqwest::Error> for UploadError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UploadError::Timeout
        } else {
            UploadError::Transport(err)
        }
    }
}

/// Invalid build-time or runtime configuration value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid backend url {value:?}: {source}")]
    BackendUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("backend url must be http or https: {0}")]
    Scheme(String),

    #[error("invalid timeout {0:?}, expected whole seconds")]
    Timeout(String),

    #[error("unknown progress mode {0:?}, expected `simulated` or `transport`")]
    ProgressMode(String),
}
