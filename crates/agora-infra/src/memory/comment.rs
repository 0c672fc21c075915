use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use agora_core::domain::{Comment, Page, PageRequest};
use agora_core::error::RepoError;
use agora_core::ports::{BaseRepository, CommentRepository};

/// Comment store keyed by id.
#[derive(Default)]
pub struct InMemoryCommentRepository {
    store: RwLock<HashMap<Uuid, Comment>>,
}

impl InMemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn active(&self, post_id: Uuid) -> Vec<Comment> {
        let store = self.store.read().await;
        let mut comments: Vec<Comment> = store
            .values()
            .filter(|c| c.post_id == post_id && !c.is_deleted)
            .cloned()
            .collect();
        comments.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        comments
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryCommentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut store = self.store.write().await;
        if store.contains_key(&comment.id) {
            return Err(RepoError::Constraint(format!("duplicate comment id {}", comment.id)));
        }
        store.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut store = self.store.write().await;
        match store.get_mut(&comment.id) {
            Some(slot) => {
                *slot = comment.clone();
                Ok(comment)
            }
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn find_by_post(
        &self,
        post_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Comment>, RepoError> {
        let comments = self.active(post_id).await;
        let total = comments.len() as u64;
        let items = comments
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.per_page() as usize)
            .collect();
        Ok(Page::new(items, total, page))
    }

    async fn find_thread(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        Ok(self.active(post_id).await)
    }

    async fn count_by_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        let store = self.store.read().await;
        Ok(store
            .values()
            .filter(|c| c.post_id == post_id && !c.is_deleted)
            .count() as u64)
    }

    async fn save_edit(&self, comment: &Comment) -> Result<Option<Comment>, RepoError> {
        let mut store = self.store.write().await;
        let Some(stored) = store.get_mut(&comment.id).filter(|c| !c.is_deleted) else {
            return Ok(None);
        };
        stored.content = comment.content.clone();
        stored.edited_at = comment.edited_at;
        stored.updated_at = comment.updated_at;
        Ok(Some(stored.clone()))
    }
}
