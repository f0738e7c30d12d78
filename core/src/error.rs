//! Error types for the Inquire client.
//!
//! # Design
//! Each failure class has its own type so callers can tell a caller bug
//! (`ValidationError`, `ApiError::ClientBusy`) from a recoverable network
//! problem (`TransportError`) and from a server that answered with something
//! unusable (`ApiError::Decode`, `MalformedRecordError`). `ApiError` is the
//! value carried by the failure notification and tags every variant with
//! the originating method, record errors included.

use thiserror::Error;

use crate::client::ClientState;
use crate::types::ApiMethod;

/// A caller-supplied argument violates a request builder constraint.
/// Requests that fail validation never reach the network.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("'{field}' is required")]
    Empty { field: &'static str },

    #[error("'{field}' is {actual} characters, the maximum is {max}")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("coordinate ({latitude}, {longitude}) is out of range")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("no location is available")]
    MissingCoordinate,

    #[error("no payment token is available")]
    MissingPaymentToken,
}

/// What was wrong with a record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldProblem {
    Missing,
    WrongType { expected: &'static str },
    Mismatch { expected: String, found: String },
}

/// A structurally valid response lacks a required domain field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("record field '{field}' is malformed: {problem}")]
pub struct MalformedRecordError {
    pub field: &'static str,
    pub problem: FieldProblem,
}

impl MalformedRecordError {
    pub fn missing(field: &'static str) -> Self {
        Self {
            field,
            problem: FieldProblem::Missing,
        }
    }

    pub fn wrong_type(field: &'static str, expected: &'static str) -> Self {
        Self {
            field,
            problem: FieldProblem::WrongType { expected },
        }
    }

    /// Attach the method whose response held the bad record.
    pub fn for_method(self, method: ApiMethod) -> ApiError {
        ApiError::MalformedRecord {
            method,
            source: self,
        }
    }
}

impl std::fmt::Display for FieldProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldProblem::Missing => f.write_str("missing"),
            FieldProblem::WrongType { expected } => write!(f, "expected {expected}"),
            FieldProblem::Mismatch { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
        }
    }
}

/// The request could not be completed over the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Errors delivered through the failure notification.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("{method}: {source}")]
    Validation {
        method: ApiMethod,
        #[source]
        source: ValidationError,
    },

    /// An operation was invoked on an instance that is not idle.
    #[error("{method} invoked on a client that is already {state}")]
    ClientBusy {
        method: ApiMethod,
        state: ClientState,
    },

    #[error("{method}: {source}")]
    Transport {
        method: ApiMethod,
        #[source]
        source: TransportError,
    },

    /// The server responded but the body is not a JSON object.
    #[error("{method}: response could not be decoded: {reason}")]
    Decode { method: ApiMethod, reason: String },

    /// A record in a decoded response lacks a required domain field.
    #[error("{method}: {source}")]
    MalformedRecord {
        method: ApiMethod,
        #[source]
        source: MalformedRecordError,
    },
}

impl ApiError {
    /// The method that raised the error.
    pub fn method(&self) -> ApiMethod {
        match self {
            ApiError::Validation { method, .. }
            | ApiError::ClientBusy { method, .. }
            | ApiError::Transport { method, .. }
            | ApiError::Decode { method, .. }
            | ApiError::MalformedRecord { method, .. } => *method,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport { .. })
    }
}

/// A configuration value could not be parsed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{key} must be an http(s) URL, got '{value}'")]
    InvalidUrl { key: &'static str, value: String },
}
