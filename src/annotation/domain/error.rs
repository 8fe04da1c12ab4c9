//! Error types for annotation domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain annotation values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnnotationDomainError {
    /// The annotation kind is empty after trimming.
    #[error("annotation kind must not be empty")]
    EmptyKind,

    /// The version is zero or does not fit the persisted column.
    #[error("annotation version {0} is outside the storable range")]
    InvalidVersion(u32),
}

/// Error returned while parsing annotation statuses from persistence or
/// requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown annotation status: {0}")]
pub struct ParseAnnotationStatusError(pub String);

/// Error returned while parsing save modes from requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown save mode: {0}")]
pub struct ParseSaveModeError(pub String);
