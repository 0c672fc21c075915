//! Read-only views onto data owned by other services.

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::RepoError;

/// Display names of users, owned by the identity service.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Usernames for the given ids. Unknown ids are simply absent.
    async fn usernames(&self, user_ids: &[Uuid]) -> Result<HashMap<Uuid, String>, RepoError>;
}

/// Slug resolution for posts, owned by the posts service.
#[async_trait]
pub trait PostLookup: Send + Sync {
    async fn post_id_by_slug(&self, slug: &str) -> Result<Option<Uuid>, RepoError>;
}
