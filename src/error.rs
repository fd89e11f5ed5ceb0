//! Crate-level error type
//!
//! Every component keeps its own `thiserror` enum; they all fold into
//! [`LdpError`], whose variants are the outcomes an HTTP layer has to tell
//! apart.

use crate::rdf::{ParseError, SerializeError};
use crate::sparql::SparqlError;
use crate::store::StoreError;
use thiserror::Error;

/// Errors surfaced by the resource engines
#[derive(Error, Debug)]
pub enum LdpError {
    /// Resource, page or container graph is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Content or query could not be parsed
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Operation is not defined for this kind of resource
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Requested or supplied media type cannot be handled
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Conditional update sent without `If-Match`
    #[error("Precondition required: {0}")]
    PreconditionRequired(String),

    /// `If-Match` does not match the current ETag
    #[error("Precondition failed for {uri}: expected {expected}, current {current}")]
    PreconditionFailed {
        uri: String,
        expected: String,
        current: String,
    },

    /// URI minting exhausted or name already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// I/O failure, store fault, poisoned lock
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type LdpResult<T> = Result<T, LdpError>;

impl LdpError {
    /// HTTP status code an external request layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            LdpError::NotFound(_) => 404,
            LdpError::BadRequest(_) => 400,
            LdpError::MethodNotAllowed(_) => 405,
            LdpError::UnsupportedMediaType(_) => 415,
            LdpError::PreconditionRequired(_) => 428,
            LdpError::PreconditionFailed { .. } => 412,
            LdpError::Conflict(_) => 409,
            LdpError::Internal(_) => 500,
        }
    }

    pub(crate) fn not_found(uri: &str) -> Self {
        LdpError::NotFound(uri.to_string())
    }
}

impl From<StoreError> for LdpError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MintExhausted { .. } => LdpError::Conflict(err.to_string()),
            StoreError::InvalidIri(_) => LdpError::BadRequest(err.to_string()),
            StoreError::Query(inner) => inner.into(),
            StoreError::Storage(_) | StoreError::LockPoisoned | StoreError::UnexpectedResult(_) => {
                LdpError::Internal(err.to_string())
            }
        }
    }
}

impl From<SparqlError> for LdpError {
    fn from(err: SparqlError) -> Self {
        match err {
            SparqlError::Parse(_) | SparqlError::Unsupported(_) => {
                LdpError::BadRequest(err.to_string())
            }
            SparqlError::Evaluation(_) | SparqlError::Results(_) => {
                LdpError::Internal(err.to_string())
            }
        }
    }
}

impl From<ParseError> for LdpError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::UnsupportedFormat(_) => LdpError::UnsupportedMediaType(err.to_string()),
            _ => LdpError::BadRequest(err.to_string()),
        }
    }
}

impl From<SerializeError> for LdpError {
    fn from(err: SerializeError) -> Self {
        match err {
            SerializeError::UnsupportedFormat(_) => {
                LdpError::UnsupportedMediaType(err.to_string())
            }
            _ => LdpError::Internal(err.to_string()),
        }
    }
}

impl From<std::io::Error> for LdpError {
    fn from(err: std::io::Error) -> Self {
        LdpError::Internal(format!("I/O error: {}", err))
    }
}

impl From<oxrdf::IriParseError> for LdpError {
    fn from(err: oxrdf::IriParseError) -> Self {
        LdpError::BadRequest(format!("Invalid IRI: {}", err))
    }
}

impl<T> From<std::sync::PoisonError<T>> for LdpError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        LdpError::Internal("lock poisoned".to_string())
    }
}
