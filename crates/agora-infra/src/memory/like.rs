use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use agora_core::domain::Like;
use agora_core::error::RepoError;
use agora_core::ports::LikeRepository;

/// Like store keyed by `(post_id, user_id)`, which makes pairs unique.
#[derive(Default)]
pub struct InMemoryLikeRepository {
    store: RwLock<HashMap<(Uuid, Uuid), Like>>,
}

impl InMemoryLikeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LikeRepository for InMemoryLikeRepository {
    async fn insert_if_absent(&self, like: Like) -> Result<(Like, bool), RepoError> {
        let mut store = self.store.write().await;
        let key = (like.post_id, like.user_id);
        if let Some(existing) = store.get(&key) {
            return Ok((existing.clone(), false));
        }
        store.insert(key, like.clone());
        Ok((like, true))
    }

    async fn find(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Like>, RepoError> {
        Ok(self.store.read().await.get(&(post_id, user_id)).cloned())
    }

    async fn delete(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        Ok(self.store.write().await.remove(&(post_id, user_id)).is_some())
    }

    async fn count_by_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        let store = self.store.read().await;
        Ok(store.keys().filter(|(post, _)| *post == post_id).count() as u64)
    }
}
