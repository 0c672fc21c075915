use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, Like, Page, PageRequest, Post, PostFilter, Tag};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;
}

/// Comment repository. Rows are never removed; soft deletes go through `update`.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Non-deleted comments of a post, oldest first.
    async fn find_by_post(
        &self,
        post_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Comment>, RepoError>;

    /// Every non-deleted comment of a post, oldest first.
    async fn find_thread(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;

    /// Number of non-deleted comments on a post.
    async fn count_by_post(&self, post_id: Uuid) -> Result<u64, RepoError>;

    /// Write `content`, `edited_at` and `updated_at` of a live comment,
    /// leaving every other column alone. `None` when the comment is absent
    /// or has been deleted in the meantime.
    async fn save_edit(&self, comment: &Comment) -> Result<Option<Comment>, RepoError>;
}

/// Post repository. Posts are stored together with their tag set.
///
/// `insert` and `update` resolve the post's tags by slug, creating missing
/// ones, and return the post carrying the stored tags.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError>;

    /// Atomically add one view and return the post as stored afterwards.
    async fn increment_view_count(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    /// Filtered listing, newest first (`created_at` desc, then `id` desc).
    async fn list(&self, filter: &PostFilter, page: PageRequest)
    -> Result<Page<Post>, RepoError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;

    /// All tags ordered by name.
    async fn list_tags(&self) -> Result<Vec<Tag>, RepoError>;
}

/// Like repository.
#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Store the like unless the user already likes the post.
    /// Returns the stored like and whether it was created by this call.
    async fn insert_if_absent(&self, like: Like) -> Result<(Like, bool), RepoError>;

    async fn find(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Like>, RepoError>;

    /// Remove the user's like; `false` when there was none.
    async fn delete(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError>;

    async fn count_by_post(&self, post_id: Uuid) -> Result<u64, RepoError>;
}
