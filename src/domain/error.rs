use thiserror::Error;

/// Terminal outcome of a download request other than completion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadError {
    #[error("{message}")]
    Interrupted { title: String, message: String },

    #[error("The download of {filename} made no progress for {idle_secs}s")]
    Stalled { filename: String, idle_secs: u64 },

    #[error("Download was removed from the queue before it started")]
    Cleared,

    #[error("Window was unregistered before the download finished")]
    Unbound,

    /// The request ended without being resolved or rejected, e.g. it was cancelled.
    #[error("Download ended without a result")]
    Unsettled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Window not registered")]
    NotBound,

    #[error("Invalid download URL: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("A window is already registered")]
    AlreadyBound,
}
