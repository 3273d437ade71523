//! Domain error types.

use record_store::StoreError;
use thiserror::Error;

use crate::course::CourseError;

/// Closed classification of every failure the service can report.
///
/// The boundary maps each kind to exactly one HTTP status; components never
/// pick status codes themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or missing required input at the service boundary.
    InvalidArgument,
    /// One or more per-field constraints were violated.
    ValidationFailed,
    /// A referenced course, student or lecturer does not exist.
    EntityNotFound,
    /// A student was added to a course twice.
    DuplicateMember,
    /// A student was removed from a course they are not enrolled in.
    MemberNotFound,
    /// A membership operation was attempted on a course in the wrong state.
    InvalidState,
    /// The store rejected a write because of a relational constraint.
    ConflictingState,
    /// Anything else.
    Unexpected,
}

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Caller supplied an argument the operation cannot accept.
    #[error("{0}")]
    InvalidArgument(String),

    /// The requested entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A course membership rule was violated.
    #[error(transparent)]
    Course(#[from] CourseError),

    /// A persisted course points at a record that no longer exists.
    #[error("{kind} with id {id} references missing {missing_kind} with id {missing_id}")]
    DanglingReference {
        kind: &'static str,
        id: String,
        missing_kind: &'static str,
        missing_id: String,
    },

    /// An error occurred in the record store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl DomainError {
    /// Returns the classification used by the boundary translator.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            DomainError::NotFound(_) => ErrorKind::EntityNotFound,
            DomainError::Course(err) => err.kind(),
            DomainError::DanglingReference { .. } => ErrorKind::Unexpected,
            DomainError::Store(err) if err.is_constraint_violation() => {
                ErrorKind::ConflictingState
            }
            DomainError::Store(_) => ErrorKind::Unexpected,
        }
    }
}
