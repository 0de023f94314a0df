/// Structured error types for folio-core.
///
/// Uses `thiserror` so the server, the HTTP client and the CLI can match on
/// what went wrong. Binary crates (folio-cli) wrap these in `anyhow`.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::session::Phase;
use crate::validation::ValidationError;

/// Main error type for folio operations
#[derive(Error, Debug)]
pub enum FolioError {
    /// The persistence service answered with a non-2xx status.
    ///
    /// Rendered as one line: status, status text and body.
    #[error("API error {status}: {status_text} – {}", .body.as_deref().unwrap_or("no body"))]
    Api {
        status: u16,
        status_text: String,
        body: Option<String>,
    },

    /// The request never produced a response (connect, DNS, TLS, decode)
    #[error("Transport error: {reason}")]
    Transport { reason: String },

    /// JSON parsing or serialization failed
    #[error("JSON error at {context}: {source}")]
    Json {
        context: String,
        source: serde_json::Error,
    },

    /// Input rejected before any request was issued
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Operation not legal in the session's current state
    #[error(transparent)]
    Session(#[from] SessionError),

    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Configuration error
    #[error("Configuration error in {path:?}: {reason}")]
    Config { path: PathBuf, reason: String },
}

/// Result type alias for folio-core operations
pub type Result<T> = std::result::Result<T, FolioError>;

impl FolioError {
    /// Create an API error from a status line and response body.
    ///
    /// Empty bodies are stored as `None` so the message reads "no body".
    pub fn api(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        let body = body.into();
        Self::Api {
            status,
            status_text: status_text.into(),
            body: if body.is_empty() { None } else { Some(body) },
        }
    }

    /// A 404 carrying the same `{"detail": ...}` body the server sends
    pub fn not_found(detail: &str) -> Self {
        Self::api(
            404,
            "Not Found",
            serde_json::json!({ "detail": detail }).to_string(),
        )
    }

    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    pub fn config(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// HTTP status for API errors, `None` for everything else
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised by the editor session when an operation is attempted in a
/// state that does not allow it. Stale indices are never errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("no project selected")]
    NoProject,

    #[error("no document open")]
    NoOpenDocument,

    #[error("cannot {operation} while {phase}")]
    InvalidPhase {
        operation: &'static str,
        phase: Phase,
    },

    #[error("a save is already in flight")]
    SaveInProgress,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
