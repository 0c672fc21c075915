use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use agora_core::domain::{Page, PageRequest, Post, PostFilter, Tag};
use agora_core::error::RepoError;
use agora_core::ports::{BaseRepository, PostLookup, PostRepository};

#[derive(Default)]
struct Store {
    posts: HashMap<Uuid, Post>,
    /// Tags keyed by slug.
    tags: HashMap<String, Tag>,
}

impl Store {
    /// Swap the post's tags for the stored rows, creating missing ones.
    fn resolve_tags(&mut self, tags: &[Tag]) -> Vec<Tag> {
        let mut resolved: Vec<Tag> = tags
            .iter()
            .map(|t| {
                self.tags
                    .entry(t.slug.clone())
                    .or_insert_with(|| t.clone())
                    .clone()
            })
            .collect();
        resolved.sort_by(|a, b| a.name.cmp(&b.name));
        resolved
    }

    fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> bool {
        self.posts
            .values()
            .any(|p| p.slug == slug && Some(p.id) != except)
    }
}

/// Post store with the same uniqueness rules as the database.
#[derive(Default)]
pub struct InMemoryPostRepository {
    store: RwLock<Store>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.read().await.posts.get(&id).cloned())
    }

    async fn insert(&self, mut post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        if store.posts.contains_key(&post.id) || store.slug_taken(&post.slug, None) {
            return Err(RepoError::Constraint(format!(
                "duplicate post slug {}",
                post.slug
            )));
        }
        post.tags = store.resolve_tags(&post.tags);
        store.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, mut post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        if store.slug_taken(&post.slug, Some(post.id)) {
            return Err(RepoError::Constraint(format!(
                "duplicate post slug {}",
                post.slug
            )));
        }
        post.tags = store.resolve_tags(&post.tags);

        let slot = store.posts.get_mut(&post.id).ok_or(RepoError::NotFound)?;
        post.view_count = slot.view_count;
        post.created_at = slot.created_at;
        *slot = post.clone();
        Ok(post)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store.posts.values().find(|p| p.slug == slug).cloned())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError> {
        Ok(self.store.read().await.slug_taken(slug, None))
    }

    async fn increment_view_count(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let mut store = self.store.write().await;
        Ok(store
            .posts
            .values_mut()
            .find(|p| p.slug == slug)
            .map(|post| {
                post.view_count += 1;
                post.clone()
            }))
    }

    async fn list(&self, filter: &PostFilter, page: PageRequest) -> Result<Page<Post>, RepoError> {
        let store = self.store.read().await;
        let mut posts: Vec<&Post> = store.posts.values().filter(|p| filter.matches(p)).collect();
        posts.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        let total = posts.len() as u64;
        let items = posts
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.per_page() as usize)
            .cloned()
            .collect();
        Ok(Page::new(items, total, page))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.store.write().await.posts.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, RepoError> {
        let store = self.store.read().await;
        let mut tags: Vec<Tag> = store.tags.values().cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }
}

#[async_trait]
impl PostLookup for InMemoryPostRepository {
    async fn post_id_by_slug(&self, slug: &str) -> Result<Option<Uuid>, RepoError> {
        let store = self.store.read().await;
        Ok(store.posts.values().find(|p| p.slug == slug).map(|p| p.id))
    }
}
