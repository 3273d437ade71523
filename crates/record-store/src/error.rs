use thiserror::Error;

/// Errors that can occur when interacting with the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write was rejected by a relational constraint, e.g. a course
    /// referencing a lecturer that does not exist, or deleting a student who
    /// is still enrolled somewhere.
    #[error("Constraint violation on {kind}: {detail}")]
    Constraint { kind: &'static str, detail: String },

    /// The store handed back a saved record without an identity.
    #[error("Store returned {kind} without an assigned id")]
    Unassigned { kind: &'static str },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// Returns true if the store refused the write because of a constraint.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, StoreError::Constraint { .. })
    }
}

/// Result type for record store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
