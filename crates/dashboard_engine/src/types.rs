use std::fmt;

use dashboard_core::{LocatorError, MovieRecord, RunId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Discovering,
    FetchingLists,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineProgress {
    pub run_id: RunId,
    pub stage: Stage,
    pub lists_discovered: Option<usize>,
    pub lists_fetched: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Progress(PipelineProgress),
    RunCompleted {
        run_id: RunId,
        result: Result<Vec<MovieRecord>, RunError>,
    },
}

/// A successful response body with the declared media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Failure of one pipeline stage against one source location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("failed to fetch {url}: {source}")]
    Network { url: String, source: FetchError },
    #[error("failed to parse {url}: {message}")]
    Parse { url: String, message: String },
    #[error(transparent)]
    Locator(#[from] LocatorError),
}

impl SourceError {
    pub(crate) fn network(url: &str, source: FetchError) -> Self {
        Self::Network {
            url: url.to_string(),
            source,
        }
    }

    pub(crate) fn parse(url: &str, message: impl Into<String>) -> Self {
        Self::Parse {
            url: url.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunError {
    #[error("list discovery failed: {0}")]
    Discovery(SourceError),
    #[error("engine unavailable: {0}")]
    Engine(String),
}
