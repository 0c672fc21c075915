use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use agora_core::error::RepoError;
use agora_core::ports::UserDirectory;

/// Username table populated by hand; empty unless seeded.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    names: RwLock<HashMap<Uuid, String>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, user_id: Uuid, username: impl Into<String>) {
        self.names.write().await.insert(user_id, username.into());
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn usernames(&self, user_ids: &[Uuid]) -> Result<HashMap<Uuid, String>, RepoError> {
        let names = self.names.read().await;
        Ok(user_ids
            .iter()
            .filter_map(|id| names.get(id).map(|n| (*id, n.clone())))
            .collect())
    }
}
