use std::sync::Arc;

use uuid::Uuid;

use crate::domain::Like;
use crate::error::{DomainError, DomainResult};
use crate::ports::{LikeRepository, PostLookup};

/// Likes: one per user per post, addressed by post slug.
pub struct LikeService {
    likes: Arc<dyn LikeRepository>,
    posts: Arc<dyn PostLookup>,
}

impl LikeService {
    pub fn new(likes: Arc<dyn LikeRepository>, posts: Arc<dyn PostLookup>) -> Self {
        Self { likes, posts }
    }

    /// Like a post. Liking twice returns the existing like; the second
    /// element is `false` in that case.
    pub async fn like(&self, user_id: Uuid, post_slug: &str) -> DomainResult<(Like, bool)> {
        let post_id = self.post_id(post_slug).await?;
        let (like, created) = self
            .likes
            .insert_if_absent(Like::new(post_id, user_id))
            .await?;

        if created {
            tracing::info!(post_id = %post_id, user_id = %user_id, "Post liked");
        }
        Ok((like, created))
    }

    /// Withdraw the caller's like.
    pub async fn unlike(&self, user_id: Uuid, post_slug: &str) -> DomainResult<()> {
        let post_id = self.post_id(post_slug).await?;
        if !self.likes.delete(post_id, user_id).await? {
            return Err(DomainError::not_found("Like", post_slug));
        }

        tracing::info!(post_id = %post_id, user_id = %user_id, "Post unliked");
        Ok(())
    }

    pub async fn count(&self, post_slug: &str) -> DomainResult<u64> {
        let post_id = self.post_id(post_slug).await?;
        Ok(self.likes.count_by_post(post_id).await?)
    }

    /// Whether `user_id` currently likes the post.
    pub async fn status(&self, user_id: Uuid, post_slug: &str) -> DomainResult<bool> {
        let post_id = self.post_id(post_slug).await?;
        Ok(self.likes.find(post_id, user_id).await?.is_some())
    }

    async fn post_id(&self, slug: &str) -> DomainResult<Uuid> {
        self.posts
            .post_id_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", slug))
    }
}
