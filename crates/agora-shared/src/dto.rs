//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use agora_core::domain::post::slugify;
use agora_core::domain::{
    Comment, CommentNode, Like, PageRequest, Post, PostChanges, PostFilter, PostStatus,
    PostSummary, Tag,
};

// Comments

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub post_id: Option<Uuid>,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCommentRequest {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentPageQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl CommentPageQuery {
    pub fn page_request(&self) -> Result<PageRequest, String> {
        PageRequest::new(self.page, self.page_size)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentQuery {
    #[serde(default, deserialize_with = "flag")]
    pub include_replies: Option<bool>,
}

/// Query-string flag: `true/false`, `1/0`, `yes/no`, `on/off`, `t/f`, `y/n`,
/// in any case.
fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "t" | "y" => Ok(Some(true)),
        "false" | "0" | "no" | "off" | "f" | "n" => Ok(Some(false)),
        _ => Err(serde::de::Error::custom(format!(
            "'{raw}' is not a valid boolean"
        ))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub edited: bool,
    pub edited_at_formatted: Option<String>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            edited: comment.edited(),
            edited_at_formatted: comment.edited_label(),
            id: comment.id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            parent_id: comment.parent_id,
            content: comment.content,
            is_deleted: comment.is_deleted,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            edited_at: comment.edited_at,
        }
    }
}

/// A comment with its visible replies, nested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentWithReplies {
    #[serde(flatten)]
    pub comment: CommentResponse,
    pub replies: Vec<CommentWithReplies>,
}

impl From<CommentNode> for CommentWithReplies {
    fn from(node: CommentNode) -> Self {
        Self {
            comment: node.comment.into(),
            replies: node.replies.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Comment> for CommentWithReplies {
    fn from(comment: Comment) -> Self {
        Self {
            comment: comment.into(),
            replies: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentCount {
    pub post_id: Uuid,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deleted {
    pub deleted: bool,
}

// Posts

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub status: PostStatus,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub summary: Option<String>,
    pub status: Option<PostStatus>,
    pub tags: Option<Vec<String>>,
}

impl From<UpdatePostRequest> for PostChanges {
    fn from(req: UpdatePostRequest) -> Self {
        Self {
            title: req.title,
            content: req.content,
            summary: req.summary,
            status: req.status,
            tags: req.tags,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
    pub author_id: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
}

impl PostListQuery {
    /// Parse the raw query, collecting every problem rather than the first.
    pub fn parse(self) -> Result<(PostFilter, PageRequest), Vec<String>> {
        let mut errors = Vec::new();

        let page = PageRequest::new(self.page, self.limit).map_err(|e| errors.push(e));
        let status = match self.status.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => raw.parse::<PostStatus>().map(Some).unwrap_or_else(|e| {
                errors.push(e);
                None
            }),
            None => None,
        };
        let author_id = match self.author_id.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => Uuid::parse_str(raw).map(Some).unwrap_or_else(|_| {
                errors.push(format!("author_id '{raw}' is not a valid UUID"));
                None
            }),
            None => None,
        };
        // A tag with no sluggable characters stays as an empty slug, which no
        // stored tag carries, so the page comes back empty.
        let tag = self
            .tag
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(slugify);
        let search = self
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        match page {
            Ok(page) if errors.is_empty() => Ok((
                PostFilter {
                    status,
                    author_id,
                    tag,
                    search,
                },
                page,
            )),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorPostsQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl AuthorPostsQuery {
    pub fn page_request(&self) -> Result<PageRequest, String> {
        PageRequest::new(self.page, self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            slug: tag.slug,
        }
    }
}

/// Listing row; the body is left out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListItem {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author_username: Option<String>,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub status: PostStatus,
    pub view_count: i64,
    pub tags: Vec<TagResponse>,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<PostSummary> for PostListItem {
    fn from(summary: PostSummary) -> Self {
        let post = summary.post;
        Self {
            id: post.id,
            author_id: post.author_id,
            author_username: summary.author_username,
            title: post.title,
            slug: post.slug,
            summary: post.summary,
            status: post.status,
            view_count: post.view_count,
            tags: post.tags.into_iter().map(Into::into).collect(),
            created_at: post.created_at,
            published_at: post.published_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetail {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author_username: Option<String>,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub summary: Option<String>,
    pub status: PostStatus,
    pub view_count: i64,
    pub tags: Vec<TagResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<PostSummary> for PostDetail {
    fn from(summary: PostSummary) -> Self {
        let post = summary.post;
        Self {
            id: post.id,
            author_id: post.author_id,
            author_username: summary.author_username,
            title: post.title,
            slug: post.slug,
            content: post.content,
            summary: post.summary,
            status: post.status,
            view_count: post.view_count,
            tags: post.tags.into_iter().map(Into::into).collect(),
            created_at: post.created_at,
            updated_at: post.updated_at,
            published_at: post.published_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostCreated {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub status: PostStatus,
    pub tags: Vec<TagResponse>,
    pub created_at: DateTime<Utc>,
}

impl From<Post> for PostCreated {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            slug: post.slug,
            title: post.title,
            status: post.status,
            tags: post.tags.into_iter().map(Into::into).collect(),
            created_at: post.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostUpdated {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub status: PostStatus,
    pub tags: Vec<TagResponse>,
    pub updated_at: DateTime<Utc>,
}

impl From<Post> for PostUpdated {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            slug: post.slug,
            title: post.title,
            status: post.status,
            tags: post.tags.into_iter().map(Into::into).collect(),
            updated_at: post.updated_at,
        }
    }
}

// Likes

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeRequest {
    pub post_slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Like> for LikeResponse {
    fn from(like: Like) -> Self {
        Self {
            id: like.id,
            post_id: like.post_id,
            user_id: like.user_id,
            created_at: like.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeCount {
    pub post_slug: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeStatus {
    pub post_slug: String,
    pub liked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_response_edited_fields() {
        let mut comment = Comment::new(Uuid::new_v4(), Uuid::new_v4(), None, "a".into());
        let plain = CommentResponse::from(comment.clone());
        assert!(!plain.edited);
        assert!(plain.edited_at_formatted.is_none());

        comment.edit("b".into());
        let edited = CommentResponse::from(comment);
        assert!(edited.edited);
        assert!(
            edited
                .edited_at_formatted
                .as_deref()
                .is_some_and(|s| s.starts_with("edited - "))
        );
    }

    #[test]
    fn test_replies_flatten_into_comment() {
        let comment = Comment::new(Uuid::new_v4(), Uuid::new_v4(), None, "root".into());
        let json = serde_json::to_value(CommentWithReplies::from(comment)).unwrap();
        assert_eq!(json["content"], "root");
        assert_eq!(json["replies"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn test_post_list_query_parses_filters() {
        let author = Uuid::new_v4();
        let query = PostListQuery {
            page: Some(2),
            limit: Some(5),
            status: Some("published".into()),
            author_id: Some(author.to_string()),
            tag: Some("Web Dev".into()),
            search: Some("  rust ".into()),
        };

        let (filter, page) = query.parse().unwrap();
        assert_eq!(filter.status, Some(PostStatus::Published));
        assert_eq!(filter.author_id, Some(author));
        assert_eq!(filter.tag.as_deref(), Some("web-dev"));
        assert_eq!(filter.search.as_deref(), Some("rust"));
        assert_eq!(page.offset(), 5);
    }

    #[test]
    fn test_post_list_query_collects_errors() {
        let query = PostListQuery {
            limit: Some(500),
            status: Some("deleted".into()),
            author_id: Some("not-a-uuid".into()),
            ..Default::default()
        };

        let errors = query.parse().unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_post_list_query_keeps_unsluggable_tag() {
        for raw in ["++", "!!!", "日本"] {
            let query = PostListQuery {
                tag: Some(raw.into()),
                ..Default::default()
            };
            let (filter, _) = query.parse().unwrap();
            assert_eq!(filter.tag.as_deref(), Some(""), "tag {raw:?}");
        }

        let blank = PostListQuery {
            tag: Some("   ".into()),
            ..Default::default()
        };
        assert!(blank.parse().unwrap().0.tag.is_none());
    }

    #[test]
    fn test_comment_query_flag_spellings() {
        for (raw, expected) in [
            ("true", true),
            ("1", true),
            ("YES", true),
            ("on", true),
            ("false", false),
            ("0", false),
            ("no", false),
            ("Off", false),
        ] {
            let json = format!(r#"{{"include_replies":"{raw}"}}"#);
            let query: CommentQuery = serde_json::from_str(&json).unwrap();
            assert_eq!(query.include_replies, Some(expected), "flag {raw:?}");
        }

        let absent: CommentQuery = serde_json::from_str("{}").unwrap();
        assert!(absent.include_replies.is_none());
        assert!(serde_json::from_str::<CommentQuery>(r#"{"include_replies":"maybe"}"#).is_err());
    }

    #[test]
    fn test_create_post_defaults() {
        let req: CreatePostRequest =
            serde_json::from_str(r#"{"title":"T","content":"C"}"#).unwrap();
        assert_eq!(req.status, PostStatus::Draft);
        assert!(req.tags.is_empty());
        assert!(req.summary.is_none());
    }
}
