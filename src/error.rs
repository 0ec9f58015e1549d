use std::io;
use std::path::PathBuf;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of a single GET.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Connection, DNS, timeout or body read failure.
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: BoxError,
    },
}

impl FetchError {
    /// Replaces the reported URL, e.g. to keep credentials out of messages.
    pub fn with_url(self, url: String) -> Self {
        match self {
            Self::Status { status, .. } => Self::Status { url, status },
            Self::Network { source, .. } => Self::Network { url, source },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("blog identifier must not be empty")]
    EmptyBlog,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("storage error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse response from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid checkpoint {}: {source}", path.display())]
    Checkpoint {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl CollectorError {
    pub(crate) fn storage(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Storage { path, source }
    }
}

pub type Result<T> = std::result::Result<T, CollectorError>;
