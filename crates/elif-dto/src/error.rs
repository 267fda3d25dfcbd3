//! Error types for DTO relationship tracking
//!
//! Every failure is synchronous and surfaced to the immediate caller. The
//! relationship container validates before it mutates, so an error never
//! leaves partial state behind.

use thiserror::Error;

use crate::relationships::{IdKind, IdShape, RelationKind};

/// Result type alias for DTO operations
pub type DtoResult<T> = Result<T, DtoError>;

/// Error types for DTO and relationship operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DtoError {
    /// The name is not declared, or is declared under the other relation kind
    #[error("{kind} relationship `{name}` not found.")]
    RelationNotFound { name: String, kind: RelationKind },

    /// The id's runtime kind is not part of the relation's permitted shape
    #[error("The related id should be of the type {expected}, instead the id was `{value}` ({given}).")]
    RelationTypeMismatch {
        relation: String,
        expected: IdShape,
        value: String,
        given: IdKind,
    },

    /// Illegal null/empty/reset attempt, or a malformed relation declaration
    #[error("{message}")]
    RelationConstraintViolation { relation: String, message: String },

    /// Serialization/deserialization error at the DTO boundary
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DtoError {
    pub(crate) fn not_found(name: &str, kind: RelationKind) -> Self {
        DtoError::RelationNotFound {
            name: name.to_string(),
            kind,
        }
    }

    pub(crate) fn constraint(relation: &str, message: impl Into<String>) -> Self {
        DtoError::RelationConstraintViolation {
            relation: relation.to_string(),
            message: message.into(),
        }
    }

    /// Name of the relation the error refers to, if any
    pub fn relation(&self) -> Option<&str> {
        match self {
            DtoError::RelationNotFound { name, .. } => Some(name),
            DtoError::RelationTypeMismatch { relation, .. } => Some(relation),
            DtoError::RelationConstraintViolation { relation, .. } => Some(relation),
            DtoError::Serialization(_) => None,
        }
    }
}

impl From<serde_json::Error> for DtoError {
    fn from(err: serde_json::Error) -> Self {
        DtoError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for DtoError {
    fn from(err: serde_yaml::Error) -> Self {
        DtoError::Serialization(err.to_string())
    }
}
