//! Application state - shared across all handlers.

use std::sync::Arc;

use agora_core::ports::{
    CommentRepository, LikeRepository, PostLookup, PostRepository, UserDirectory,
};
use agora_core::services::{CommentService, LikeService, PostService};
use agora_infra::database::{DatabaseConfig, DatabaseConnections};
use agora_infra::{
    InMemoryCommentRepository, InMemoryLikeRepository, InMemoryPostRepository,
    InMemoryUserDirectory,
};

#[cfg(feature = "postgres")]
use agora_infra::{
    PostgresCommentRepository, PostgresLikeRepository, PostgresPostRepository,
    PostgresUserDirectory,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub comments: Arc<CommentService>,
    pub posts: Arc<PostService>,
    pub likes: Arc<LikeService>,
    pub db: Option<Arc<DatabaseConnections>>,
}

/// Repository set the services are built from.
struct Repositories {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
    lookup: Arc<dyn PostLookup>,
    likes: Arc<dyn LikeRepository>,
    users: Arc<dyn UserDirectory>,
}

impl Repositories {
    fn in_memory() -> Self {
        let posts = Arc::new(InMemoryPostRepository::new());
        Self {
            comments: Arc::new(InMemoryCommentRepository::new()),
            posts: posts.clone(),
            lookup: posts,
            likes: Arc::new(InMemoryLikeRepository::new()),
            users: Arc::new(InMemoryUserDirectory::new()),
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(db: &DatabaseConnections) -> Self {
        let posts = Arc::new(PostgresPostRepository::new(db.main.clone()));
        Self {
            comments: Arc::new(PostgresCommentRepository::new(db.main.clone())),
            posts: posts.clone(),
            lookup: posts,
            likes: Arc::new(PostgresLikeRepository::new(db.main.clone())),
            users: Arc::new(PostgresUserDirectory::new(db.users().clone())),
        }
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(db_config: Option<&DatabaseConfig>) -> Self {
        #[cfg(feature = "postgres")]
        let (db, repos) = match db_config {
            Some(config) => match DatabaseConnections::init(config).await {
                Ok(connections) => {
                    let repos = Repositories::postgres(&connections);
                    (Some(Arc::new(connections)), repos)
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    (None, Repositories::in_memory())
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                (None, Repositories::in_memory())
            }
        };

        #[cfg(not(feature = "postgres"))]
        let (db, repos) = {
            let _ = db_config;
            tracing::info!("Running without postgres feature - using in-memory repositories");
            (None, Repositories::in_memory())
        };

        tracing::info!("Application state initialized");
        Self::from_repositories(repos, db)
    }

    /// State backed entirely by in-memory repositories.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::from_repositories(Repositories::in_memory(), None)
    }

    fn from_repositories(repos: Repositories, db: Option<Arc<DatabaseConnections>>) -> Self {
        Self {
            comments: Arc::new(CommentService::new(repos.comments)),
            posts: Arc::new(PostService::new(repos.posts, repos.users)),
            likes: Arc::new(LikeService::new(repos.likes, repos.lookup)),
            db,
        }
    }
}
