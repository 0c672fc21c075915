use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::post::{
    normalize_tag_names, post_slug, suffixed_slug, validate_post_content, validate_summary,
    validate_title,
};
use crate::domain::{
    Page, PageRequest, Post, PostChanges, PostFilter, PostStatus, PostSummary, Tag,
};
use crate::error::{DomainError, DomainResult, RepoError};
use crate::ports::{PostRepository, UserDirectory};

use super::ensure_owner;

const SLUG_ATTEMPTS: usize = 5;

/// Input for a new post. Field lengths are checked at the boundary.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub status: PostStatus,
    pub tags: Vec<String>,
}

/// Posts: authoring, slug lookup with view counting, filtered listings.
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserDirectory>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, users: Arc<dyn UserDirectory>) -> Self {
        Self { posts, users }
    }

    /// Filtered, paginated listing. Does not count as a view.
    pub async fn list(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> DomainResult<Page<PostSummary>> {
        let posts = self.posts.list(filter, page).await?;

        let mut author_ids: Vec<Uuid> = posts.items.iter().map(|p| p.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();
        let names = self.usernames(&author_ids).await;

        Ok(posts.map(|post| PostSummary {
            author_username: names.get(&post.author_id).cloned(),
            post,
        }))
    }

    pub async fn list_by_author(
        &self,
        author_id: Uuid,
        page: PageRequest,
    ) -> DomainResult<Page<PostSummary>> {
        let filter = PostFilter {
            author_id: Some(author_id),
            ..Default::default()
        };
        self.list(&filter, page).await
    }

    /// Read a post by slug, counting the read as one view.
    pub async fn view_by_slug(&self, slug: &str) -> DomainResult<PostSummary> {
        let post = self
            .posts
            .increment_view_count(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", slug))?;

        let names = self.usernames(&[post.author_id]).await;
        Ok(PostSummary {
            author_username: names.get(&post.author_id).cloned(),
            post,
        })
    }

    /// Create a post authored by `author_id` with a unique slug.
    pub async fn create(&self, author_id: Uuid, input: NewPost) -> DomainResult<Post> {
        validate_title(&input.title).map_err(DomainError::Validation)?;
        validate_post_content(&input.content).map_err(DomainError::Validation)?;
        if let Some(summary) = &input.summary {
            validate_summary(summary).map_err(DomainError::Validation)?;
        }

        let tags = normalize_tag_names(&input.tags)
            .map_err(DomainError::Validation)?
            .iter()
            .map(|name| Tag::new(name))
            .collect::<Vec<_>>();

        let base = post_slug(&input.title);
        let mut slug = base.clone();
        for attempt in 1..=SLUG_ATTEMPTS {
            if self.posts.slug_exists(&slug).await? {
                slug = suffixed_slug(&base);
                continue;
            }

            let post = Post::new(
                author_id,
                input.title.trim().to_string(),
                slug.clone(),
                input.content.clone(),
                input.summary.clone(),
                input.status,
                tags.clone(),
            );
            match self.posts.insert(post).await {
                Ok(post) => {
                    tracing::info!(
                        post_id = %post.id,
                        slug = %post.slug,
                        user_id = %author_id,
                        "Post created"
                    );
                    return Ok(post);
                }
                // Lost a race for the slug; try another.
                Err(RepoError::Constraint(msg)) if attempt < SLUG_ATTEMPTS => {
                    tracing::debug!(slug = %slug, error = %msg, "Slug taken on insert");
                    slug = suffixed_slug(&base);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(DomainError::Conflict(format!(
            "Could not allocate a unique slug for '{base}'"
        )))
    }

    /// Find a post by id, falling back to slug when `identifier` is not a UUID
    /// or no post has that id.
    pub async fn resolve(&self, identifier: &str) -> DomainResult<Post> {
        if let Ok(id) = Uuid::parse_str(identifier) {
            if let Some(post) = self.posts.find_by_id(id).await? {
                return Ok(post);
            }
        }
        self.posts
            .find_by_slug(identifier)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", identifier))
    }

    /// Apply changes to the caller's own post.
    pub async fn update(
        &self,
        identifier: &str,
        caller_id: Uuid,
        changes: PostChanges,
    ) -> DomainResult<Post> {
        let mut post = self.resolve(identifier).await?;
        ensure_owner(
            post.author_id,
            caller_id,
            "You don't have permission to update this post",
        )?;

        if let Some(title) = changes.title {
            validate_title(&title).map_err(DomainError::Validation)?;
            post.title = title.trim().to_string();
        }
        if let Some(content) = changes.content {
            validate_post_content(&content).map_err(DomainError::Validation)?;
            post.content = content;
        }
        if let Some(summary) = changes.summary {
            validate_summary(&summary).map_err(DomainError::Validation)?;
            post.summary = Some(summary);
        }
        if let Some(status) = changes.status {
            post.set_status(status);
        }
        if let Some(names) = changes.tags {
            post.tags = normalize_tag_names(&names)
                .map_err(DomainError::Validation)?
                .iter()
                .map(|name| Tag::new(name))
                .collect();
        }
        post.updated_at = Utc::now();

        let post = self.posts.update(post).await?;
        tracing::info!(post_id = %post.id, user_id = %caller_id, "Post updated");
        Ok(post)
    }

    /// Delete the caller's own post.
    pub async fn delete(&self, identifier: &str, caller_id: Uuid) -> DomainResult<()> {
        let post = self.resolve(identifier).await?;
        ensure_owner(
            post.author_id,
            caller_id,
            "You don't have permission to delete this post",
        )?;

        self.posts.delete(post.id).await?;
        tracing::info!(post_id = %post.id, user_id = %caller_id, "Post deleted");
        Ok(())
    }

    pub async fn tags(&self) -> DomainResult<Vec<Tag>> {
        Ok(self.posts.list_tags().await?)
    }

    /// Display names are decoration; a failing directory must not fail the read.
    async fn usernames(&self, ids: &[Uuid]) -> HashMap<Uuid, String> {
        if ids.is_empty() {
            return HashMap::new();
        }
        match self.users.usernames(ids).await {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!(error = %e, "User directory lookup failed");
                HashMap::new()
            }
        }
    }
}
