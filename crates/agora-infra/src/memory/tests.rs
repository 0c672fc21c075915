//! Service behaviour against the in-memory repositories.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use agora_core::domain::{Comment, PageRequest, PostChanges, PostFilter, PostStatus};
use agora_core::ports::{BaseRepository, CommentRepository};
use agora_core::services::{CommentService, LikeService, NewComment, NewPost, PostService};
use agora_core::DomainError;

use super::{
    InMemoryCommentRepository, InMemoryLikeRepository, InMemoryPostRepository,
    InMemoryUserDirectory,
};

fn new_post(title: &str, tags: &[&str]) -> NewPost {
    NewPost {
        title: title.to_string(),
        content: format!("All about {title}"),
        summary: None,
        status: PostStatus::Published,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

fn top_level(post_id: Uuid, content: &str) -> NewComment {
    NewComment {
        post_id: Some(post_id),
        parent_id: None,
        content: content.to_string(),
    }
}

fn reply(parent_id: Uuid, content: &str) -> NewComment {
    NewComment {
        post_id: None,
        parent_id: Some(parent_id),
        content: content.to_string(),
    }
}

/// Keep creation timestamps strictly increasing.
async fn tick() {
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
}

struct Posts {
    service: Arc<PostService>,
    repo: Arc<InMemoryPostRepository>,
    users: Arc<InMemoryUserDirectory>,
}

fn posts() -> Posts {
    let repo = Arc::new(InMemoryPostRepository::new());
    let users = Arc::new(InMemoryUserDirectory::new());
    let service = Arc::new(PostService::new(repo.clone(), users.clone()));
    Posts {
        service,
        repo,
        users,
    }
}

// Comments

#[tokio::test]
async fn test_comment_author_is_caller() {
    let service = CommentService::new(Arc::new(InMemoryCommentRepository::new()));
    let caller = Uuid::new_v4();
    let post_id = Uuid::new_v4();

    let comment = service.create(caller, top_level(post_id, "hi")).await.unwrap();

    assert_eq!(comment.author_id, caller);
    assert_eq!(comment.post_id, post_id);
    assert!(!comment.edited());
}

#[tokio::test]
async fn test_reply_inherits_parent_post() {
    let service = CommentService::new(Arc::new(InMemoryCommentRepository::new()));
    let user = Uuid::new_v4();
    let post_id = Uuid::new_v4();

    let parent = service.create(user, top_level(post_id, "root")).await.unwrap();
    let child = service.create(user, reply(parent.id, "child")).await.unwrap();

    assert_eq!(child.post_id, post_id);
    assert_eq!(child.parent_id, Some(parent.id));
}

#[tokio::test]
async fn test_reply_rejects_foreign_or_missing_parent() {
    let service = CommentService::new(Arc::new(InMemoryCommentRepository::new()));
    let user = Uuid::new_v4();
    let parent = service
        .create(user, top_level(Uuid::new_v4(), "root"))
        .await
        .unwrap();

    let mismatched = NewComment {
        post_id: Some(Uuid::new_v4()),
        parent_id: Some(parent.id),
        content: "x".to_string(),
    };
    let err = service.create(user, mismatched).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let err = service
        .create(user, reply(Uuid::new_v4(), "x"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn test_comment_content_bounds() {
    let service = CommentService::new(Arc::new(InMemoryCommentRepository::new()));
    let user = Uuid::new_v4();

    let err = service
        .create(user, top_level(Uuid::new_v4(), ""))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let long = "x".repeat(5001);
    let err = service
        .create(user, top_level(Uuid::new_v4(), &long))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn test_non_owner_cannot_edit_or_delete() {
    let service = CommentService::new(Arc::new(InMemoryCommentRepository::new()));
    let owner = Uuid::new_v4();
    let intruder = Uuid::new_v4();
    let comment = service
        .create(owner, top_level(Uuid::new_v4(), "mine"))
        .await
        .unwrap();

    let err = service
        .update(comment.id, intruder, Some("theirs".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    let err = service.delete(comment.id, intruder).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));

    let stored = service.get(comment.id).await.unwrap();
    assert_eq!(stored.content, "mine");
    assert!(!stored.is_deleted);
    assert!(stored.edited_at.is_none());
}

#[tokio::test]
async fn test_edit_sets_flag_only_on_change() {
    let service = CommentService::new(Arc::new(InMemoryCommentRepository::new()));
    let owner = Uuid::new_v4();
    let comment = service
        .create(owner, top_level(Uuid::new_v4(), "same"))
        .await
        .unwrap();

    let unchanged = service
        .update(comment.id, owner, Some("same".to_string()))
        .await
        .unwrap();
    assert!(!unchanged.edited());

    let untouched = service.update(comment.id, owner, None).await.unwrap();
    assert!(!untouched.edited());

    let edited = service
        .update(comment.id, owner, Some("different".to_string()))
        .await
        .unwrap();
    assert!(edited.edited());
    assert!(edited.edited_label().unwrap().starts_with("edited - "));
    assert_eq!(service.get(comment.id).await.unwrap().content, "different");
}

#[tokio::test]
async fn test_edit_racing_delete_keeps_comment_deleted() {
    let repo = Arc::new(InMemoryCommentRepository::new());
    let service = CommentService::new(repo.clone());
    let owner = Uuid::new_v4();
    let comment = service
        .create(owner, top_level(Uuid::new_v4(), "original"))
        .await
        .unwrap();

    // Read taken by an edit before the delete commits.
    let mut stale = repo.find_by_id(comment.id).await.unwrap().unwrap();
    service.delete(comment.id, owner).await.unwrap();

    assert!(stale.edit("late edit".to_string()));
    assert!(repo.save_edit(&stale).await.unwrap().is_none());

    let stored = repo.find_by_id(comment.id).await.unwrap().unwrap();
    assert!(stored.is_deleted);
    assert_eq!(stored.content, "original");
    assert!(stored.edited_at.is_none());
    assert!(matches!(
        service
            .update(comment.id, owner, Some("again".to_string()))
            .await
            .unwrap_err(),
        DomainError::NotFound { .. }
    ));
}

#[tokio::test]
async fn test_deleted_comment_is_hidden() {
    let service = CommentService::new(Arc::new(InMemoryCommentRepository::new()));
    let owner = Uuid::new_v4();
    let post_id = Uuid::new_v4();
    let root = service.create(owner, top_level(post_id, "root")).await.unwrap();
    let child = service.create(owner, reply(root.id, "child")).await.unwrap();
    let _grandchild = service.create(owner, reply(child.id, "grandchild")).await.unwrap();

    service.delete(child.id, owner).await.unwrap();

    assert!(matches!(
        service.get(child.id).await.unwrap_err(),
        DomainError::NotFound { .. }
    ));
    assert!(matches!(
        service.delete(child.id, owner).await.unwrap_err(),
        DomainError::NotFound { .. }
    ));

    let page = service
        .list_by_post(post_id, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert!(page.items.iter().all(|c| c.id != child.id));

    let tree = service.get_with_replies(root.id).await.unwrap();
    assert!(tree.replies.is_empty());
    assert_eq!(service.count_by_post(post_id).await.unwrap(), 2);
}

#[tokio::test]
async fn test_replies_ordered_oldest_first() {
    let repo = Arc::new(InMemoryCommentRepository::new());
    let service = CommentService::new(repo.clone());
    let user = Uuid::new_v4();
    let post_id = Uuid::new_v4();
    let root = service.create(user, top_level(post_id, "root")).await.unwrap();

    let base = Utc::now();
    for (offset, text) in [(30, "third"), (10, "first"), (20, "second")] {
        let mut c = Comment::new(post_id, user, Some(root.id), text.to_string());
        c.created_at = base + Duration::seconds(offset);
        c.updated_at = c.created_at;
        repo.insert(c).await.unwrap();
    }

    let tree = service.get_with_replies(root.id).await.unwrap();
    let order: Vec<&str> = tree
        .replies
        .iter()
        .map(|n| n.comment.content.as_str())
        .collect();
    assert_eq!(order, ["first", "second", "third"]);
}

#[tokio::test]
async fn test_comment_page_past_end() {
    let service = CommentService::new(Arc::new(InMemoryCommentRepository::new()));
    let user = Uuid::new_v4();
    let post_id = Uuid::new_v4();
    for i in 0..3 {
        service
            .create(user, top_level(post_id, &format!("c{i}")))
            .await
            .unwrap();
    }

    let page = service
        .list_by_post(post_id, PageRequest::new(Some(5), Some(2)).unwrap())
        .await
        .unwrap();

    assert!(page.items.is_empty());
    assert_eq!(page.total, 3);
    assert_eq!(page.total_pages(), 2);
    assert!(!page.has_next());
    assert!(page.has_prev());
}

// Posts

#[tokio::test]
async fn test_create_post_slug_and_tags() {
    let p = posts();
    let author = Uuid::new_v4();

    let post = p
        .service
        .create(author, new_post("Hello, World!", &["Rust", "rust", "Web Dev"]))
        .await
        .unwrap();

    assert_eq!(post.slug, "hello-world");
    assert_eq!(post.author_id, author);
    assert_eq!(post.view_count, 0);
    assert!(post.published_at.is_some());
    let slugs: Vec<&str> = post.tags.iter().map(|t| t.slug.as_str()).collect();
    assert_eq!(slugs, ["rust", "web-dev"]);

    let again = p
        .service
        .create(author, new_post("Hello World", &[]))
        .await
        .unwrap();
    assert_ne!(again.slug, post.slug);
    assert!(again.slug.starts_with("hello-world-"));
}

#[tokio::test]
async fn test_tags_shared_between_posts() {
    let p = posts();
    let author = Uuid::new_v4();
    let a = p.service.create(author, new_post("A", &["Rust"])).await.unwrap();
    let b = p.service.create(author, new_post("B", &["rust"])).await.unwrap();

    assert_eq!(a.tags[0].id, b.tags[0].id);
    assert_eq!(p.service.tags().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_views_all_counted() {
    let p = posts();
    let post = p
        .service
        .create(Uuid::new_v4(), new_post("Busy", &[]))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..25 {
        let service = p.service.clone();
        let slug = post.slug.clone();
        handles.push(tokio::spawn(async move {
            service.view_by_slug(&slug).await.map(|s| s.post.view_count)
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = p.repo.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.view_count, 25);
}

#[tokio::test]
async fn test_listing_does_not_count_views() {
    let p = posts();
    let author = Uuid::new_v4();
    p.users.register(author, "alice").await;
    let post = p.service.create(author, new_post("Quiet", &[])).await.unwrap();

    let page = p
        .service
        .list(&PostFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.items[0].author_username.as_deref(), Some("alice"));
    p.service.resolve(&post.slug).await.unwrap();

    let stored = p.repo.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.view_count, 0);

    let viewed = p.service.view_by_slug(&post.slug).await.unwrap();
    assert_eq!(viewed.post.view_count, 1);
}

#[tokio::test]
async fn test_list_filters_and_order() {
    let p = posts();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let first = p
        .service
        .create(alice, new_post("Async Rust", &["rust"]))
        .await
        .unwrap();
    tick().await;
    let mut draft = new_post("Draft thoughts", &[]);
    draft.status = PostStatus::Draft;
    p.service.create(bob, draft).await.unwrap();
    tick().await;
    let last = p
        .service
        .create(bob, new_post("Cooking pasta", &["food"]))
        .await
        .unwrap();

    let all = p
        .service
        .list(&PostFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(all.total, 3);
    assert_eq!(all.items.first().map(|s| s.post.id), Some(last.id));
    assert_eq!(all.items.last().map(|s| s.post.id), Some(first.id));

    let published = PostFilter {
        status: Some(PostStatus::Published),
        ..Default::default()
    };
    assert_eq!(p.service.list(&published, PageRequest::default()).await.unwrap().total, 2);

    let tagged = PostFilter {
        tag: Some("rust".to_string()),
        ..Default::default()
    };
    let page = p.service.list(&tagged, PageRequest::default()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].post.id, first.id);

    let search = PostFilter {
        search: Some("PASTA".to_string()),
        ..Default::default()
    };
    let page = p.service.list(&search, PageRequest::default()).await.unwrap();
    assert_eq!(page.items[0].post.id, last.id);

    let by_bob = p
        .service
        .list_by_author(bob, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(by_bob.total, 2);
}

#[tokio::test]
async fn test_post_update_and_delete_ownership() {
    let p = posts();
    let owner = Uuid::new_v4();
    let mut draft = new_post("Owned", &["one"]);
    draft.status = PostStatus::Draft;
    let post = p.service.create(owner, draft).await.unwrap();
    assert!(post.published_at.is_none());

    let changes = PostChanges {
        title: Some("Stolen".to_string()),
        ..Default::default()
    };
    let err = p
        .service
        .update(&post.slug, Uuid::new_v4(), changes)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));
    let err = p
        .service
        .delete(&post.id.to_string(), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    let changes = PostChanges {
        status: Some(PostStatus::Published),
        tags: Some(vec!["two".to_string()]),
        ..Default::default()
    };
    let updated = p
        .service
        .update(&post.id.to_string(), owner, changes)
        .await
        .unwrap();
    assert_eq!(updated.title, "Owned");
    assert_eq!(updated.slug, post.slug);
    assert!(updated.published_at.is_some());
    assert_eq!(updated.tags.len(), 1);
    assert_eq!(updated.tags[0].slug, "two");

    p.service.delete(&post.slug, owner).await.unwrap();
    assert!(matches!(
        p.service.resolve(&post.slug).await.unwrap_err(),
        DomainError::NotFound { .. }
    ));
}

#[tokio::test]
async fn test_view_unknown_slug() {
    let p = posts();
    let err = p.service.view_by_slug("missing").await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

// Likes

#[tokio::test]
async fn test_like_is_idempotent() {
    let p = posts();
    let post = p
        .service
        .create(Uuid::new_v4(), new_post("Likeable", &[]))
        .await
        .unwrap();
    let likes = LikeService::new(Arc::new(InMemoryLikeRepository::new()), p.repo.clone());
    let user = Uuid::new_v4();

    let (first, created) = likes.like(user, &post.slug).await.unwrap();
    assert!(created);
    let (second, created) = likes.like(user, &post.slug).await.unwrap();
    assert!(!created);
    assert_eq!(first.id, second.id);

    assert_eq!(likes.count(&post.slug).await.unwrap(), 1);
    assert!(likes.status(user, &post.slug).await.unwrap());
    assert!(!likes.status(Uuid::new_v4(), &post.slug).await.unwrap());
}

#[tokio::test]
async fn test_unlike() {
    let p = posts();
    let post = p
        .service
        .create(Uuid::new_v4(), new_post("Fickle", &[]))
        .await
        .unwrap();
    let likes = LikeService::new(Arc::new(InMemoryLikeRepository::new()), p.repo.clone());
    let user = Uuid::new_v4();

    likes.like(user, &post.slug).await.unwrap();
    likes.unlike(user, &post.slug).await.unwrap();
    assert_eq!(likes.count(&post.slug).await.unwrap(), 0);

    let err = likes.unlike(user, &post.slug).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity: "Like", .. }));

    let err = likes.like(user, "no-such-post").await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity: "Post", .. }));
}
