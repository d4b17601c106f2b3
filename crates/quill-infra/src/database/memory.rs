//! In-memory repositories - used as fallback when no database is
//! configured, and in handler tests.
//!
//! Note: Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Post, User};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository, UserRepository};

#[derive(Default)]
struct Store {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, Post>,
}

/// HashMap-backed repository implementing both the user and post ports,
/// so the author join works against a single store.
#[derive(Default)]
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.read().await.users.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;

        if store.users.values().any(|u| u.username == user.username) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }

        store.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;

        if !store.users.contains_key(&user.id) {
            return Err(RepoError::NotFound);
        }

        store.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        // Case-sensitive, like the unique column in the store.
        Ok(self
            .store
            .read()
            .await
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.read().await.posts.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        self.store.write().await.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;

        if !store.posts.contains_key(&post.id) {
            return Err(RepoError::NotFound);
        }

        store.posts.insert(post.id, post.clone());
        Ok(post)
    }
}

#[async_trait]
impl PostRepository for InMemoryRepository {
    async fn list_recent(&self) -> Result<Vec<(Post, User)>, RepoError> {
        let store = self.store.read().await;

        let mut posts: Vec<&Post> = store.posts.values().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        posts
            .into_iter()
            .map(|p| {
                let author = store
                    .users
                    .get(&p.author_id)
                    .cloned()
                    .ok_or(RepoError::NotFound)?;
                Ok((p.clone(), author))
            })
            .collect()
    }

    async fn find_with_author(&self, id: Uuid) -> Result<Option<(Post, User)>, RepoError> {
        let store = self.store.read().await;

        let Some(post) = store.posts.get(&id) else {
            return Ok(None);
        };
        let author = store
            .users
            .get(&post.author_id)
            .cloned()
            .ok_or(RepoError::NotFound)?;

        Ok(Some((post.clone(), author)))
    }
}
