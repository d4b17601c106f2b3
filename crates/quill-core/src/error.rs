//! Repository-level error types.

use thiserror::Error;

/// Errors surfaced by the persistence layer. Constraint violations map
/// to 400 at the HTTP boundary, query/connection failures to 500.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}
