//! Error types.
//!
//! `ContentError` represents failures when talking to the content backend.
//! It is defined in `geoquiz-core` so the quiz controller can downcast and
//! classify errors coming through `ContentSource` without string matching.

use thiserror::Error;

use crate::session::Stage;

/// Errors that can occur when fetching or normalizing content.
#[derive(Debug, Error)]
pub enum ContentError {
    /// Transport-level failure (DNS, connection reset, TLS, ...).
    #[error("network error: {0}")]
    Network(String),

    /// The API answered with a non-2xx status.
    #[error("HTTP error (status {status})")]
    Http { status: u16 },

    /// The request was aborted after the configured deadline.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The payload is not JSON or does not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A link inside a question could not be matched against side-loaded entries.
    #[error("question {question_id}: unresolved reference {reference}")]
    ReferenceResolution {
        question_id: String,
        reference: String,
    },
}

impl ContentError {
    /// Returns `true` for failures the user sees as "network trouble".
    ///
    /// Timeouts are classified together with HTTP and transport failures.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            ContentError::Network(_) | ContentError::Http { .. } | ContentError::Timeout(_)
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ContentError::Timeout(_))
    }
}

/// Errors returned by quiz session operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The action is not allowed in the current stage.
    #[error("cannot {action} while in stage {from}")]
    InvalidTransition { from: Stage, action: &'static str },

    /// There is no question at the current index.
    #[error("no current question")]
    NoCurrentQuestion,

    /// The option does not belong to the current question.
    #[error("option {0} does not belong to the current question")]
    UnknownOption(String),
}
