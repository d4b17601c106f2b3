//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{PostRepository, UploadStore, UserRepository};
use quill_infra::database::{DatabaseConnections, InMemoryRepository};
use quill_infra::storage::DiskUploadStore;

#[cfg(feature = "postgres")]
use quill_infra::database::{PostgresPostRepository, PostgresUserRepository};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub uploads: Arc<dyn UploadStore>,
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let uploads: Arc<dyn UploadStore> = Arc::new(DiskUploadStore::new(&config.upload_dir));

        #[cfg(feature = "postgres")]
        let (db, users, posts): (
            Option<Arc<DatabaseConnections>>,
            Arc<dyn UserRepository>,
            Arc<dyn PostRepository>,
        ) = {
            if let Some(db_config) = &config.database {
                match DatabaseConnections::init(db_config).await {
                    Ok(connections) => {
                        let conn = Arc::new(connections);
                        let users = Arc::new(PostgresUserRepository::new(conn.main.clone()));
                        let posts = Arc::new(PostgresPostRepository::new(conn.main.clone()));
                        (Some(conn), users, posts)
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                        Self::in_memory()
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Self::in_memory()
            }
        };

        #[cfg(not(feature = "postgres"))]
        let (db, users, posts) = {
            tracing::info!("Running without postgres feature - using in-memory repositories");
            Self::in_memory()
        };

        tracing::info!("Application state initialized");

        Self {
            users,
            posts,
            uploads,
            db,
        }
    }

    fn in_memory() -> (
        Option<Arc<DatabaseConnections>>,
        Arc<dyn UserRepository>,
        Arc<dyn PostRepository>,
    ) {
        let repo = Arc::new(InMemoryRepository::new());
        (None, repo.clone(), repo)
    }
}
