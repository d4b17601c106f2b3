use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Post, User};
use crate::error::RepoError;

/// Generic repository trait defining the persistence operations the
/// domain needs. Nothing in scope is ever deleted.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity. Fails with `RepoError::Constraint` on a
    /// uniqueness violation.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Persist changes to an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;
}

/// User repository with domain-specific lookups.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their unique, case-sensitive username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository. List and single-post reads join the author so the
/// HTTP layer can render `author.username` without a second round-trip.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// All posts with their authors, newest first. Each call re-queries
    /// the store.
    async fn list_recent(&self) -> Result<Vec<(Post, User)>, RepoError>;

    /// A single post with its author.
    async fn find_with_author(&self, id: Uuid) -> Result<Option<(Post, User)>, RepoError>;
}
