use std::sync::Arc;

use uuid::Uuid;

use crate::domain::comment::{build_reply_tree, validate_content};
use crate::domain::{Comment, CommentNode, Page, PageRequest};
use crate::error::{DomainError, DomainResult};
use crate::ports::CommentRepository;

use super::ensure_owner;

/// Input for a new comment. Content length is checked at the boundary.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    pub content: String,
}

/// Comment threads: creation, reply trees, author-only edits and soft deletes.
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentRepository>) -> Self {
        Self { comments }
    }

    /// Create a comment authored by `author_id`.
    ///
    /// A reply inherits its post from the parent; when both are given they
    /// must agree. The parent must exist and not be deleted.
    pub async fn create(&self, author_id: Uuid, input: NewComment) -> DomainResult<Comment> {
        validate_content(&input.content).map_err(DomainError::Validation)?;

        let post_id = match input.parent_id {
            Some(parent_id) => {
                let parent = self.find_active(parent_id).await?.ok_or_else(|| {
                    DomainError::Validation("Parent comment not found".to_string())
                })?;
                if input.post_id.is_some_and(|post_id| post_id != parent.post_id) {
                    return Err(DomainError::Validation(
                        "Parent comment belongs to a different post".to_string(),
                    ));
                }
                parent.post_id
            }
            None => input
                .post_id
                .ok_or_else(|| DomainError::Validation("post_id is required".to_string()))?,
        };

        let comment = Comment::new(post_id, author_id, input.parent_id, input.content);
        let comment = self.comments.insert(comment).await?;

        tracing::info!(
            comment_id = %comment.id,
            post_id = %comment.post_id,
            user_id = %author_id,
            "Comment created"
        );
        Ok(comment)
    }

    /// Fetch a live comment.
    pub async fn get(&self, id: Uuid) -> DomainResult<Comment> {
        self.find_active(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Comment", id))
    }

    /// Fetch a live comment with all live replies beneath it.
    pub async fn get_with_replies(&self, id: Uuid) -> DomainResult<CommentNode> {
        let root = self.get(id).await?;
        let thread = self.comments.find_thread(root.post_id).await?;
        Ok(build_reply_tree(root, thread))
    }

    pub async fn list_by_post(
        &self,
        post_id: Uuid,
        page: PageRequest,
    ) -> DomainResult<Page<Comment>> {
        Ok(self.comments.find_by_post(post_id, page).await?)
    }

    pub async fn count_by_post(&self, post_id: Uuid) -> DomainResult<u64> {
        Ok(self.comments.count_by_post(post_id).await?)
    }

    /// Change the content of the caller's own comment.
    ///
    /// Absent → not found, someone else's → forbidden. Without new content,
    /// or with identical content, nothing is written.
    pub async fn update(
        &self,
        id: Uuid,
        caller_id: Uuid,
        content: Option<String>,
    ) -> DomainResult<Comment> {
        let mut comment = self.get(id).await?;
        ensure_owner(
            comment.author_id,
            caller_id,
            "Not authorized to update this comment",
        )?;

        let Some(content) = content else {
            return Ok(comment);
        };
        validate_content(&content).map_err(DomainError::Validation)?;
        if !comment.edit(content) {
            return Ok(comment);
        }

        let comment = self
            .comments
            .save_edit(&comment)
            .await?
            .ok_or_else(|| DomainError::not_found("Comment", id))?;
        tracing::info!(comment_id = %id, user_id = %caller_id, "Comment edited");
        Ok(comment)
    }

    /// Soft-delete the caller's own comment.
    ///
    /// Absent and not-owned are reported identically as not found so the
    /// caller cannot probe for other users' comments.
    pub async fn delete(&self, id: Uuid, caller_id: Uuid) -> DomainResult<()> {
        let mut comment = match self.find_active(id).await? {
            Some(c) if c.author_id == caller_id => c,
            _ => return Err(DomainError::not_found("Comment", id)),
        };

        comment.soft_delete();
        self.comments.update(comment).await?;

        tracing::info!(comment_id = %id, user_id = %caller_id, "Comment deleted");
        Ok(())
    }

    async fn find_active(&self, id: Uuid) -> DomainResult<Option<Comment>> {
        let comment = self.comments.find_by_id(id).await?;
        Ok(comment.filter(|c| !c.is_deleted))
    }
}
