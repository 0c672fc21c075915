use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_POST_CONTENT_LENGTH: usize = 100_000;
pub const MAX_SUMMARY_LENGTH: usize = 500;
pub const MAX_TAGS_PER_POST: usize = 10;
pub const MAX_TAG_NAME_LENGTH: usize = 50;

const MAX_SLUG_LENGTH: usize = 200;

/// Publication state of a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            "archived" => Ok(PostStatus::Archived),
            other => Err(format!(
                "Invalid status '{other}', expected one of: draft, published, archived"
            )),
        }
    }
}

/// Tag attached to posts (many-to-many).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl Tag {
    pub fn new(name: &str) -> Self {
        let name = name.trim().to_string();
        Self {
            id: Uuid::new_v4(),
            slug: slugify(&name),
            name,
        }
    }
}

/// Post entity - a slugged article with a tag set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub summary: Option<String>,
    pub status: PostStatus,
    pub view_count: i64,
    pub tags: Vec<Tag>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Create a new post. `slug` must already be unique.
    pub fn new(
        author_id: Uuid,
        title: String,
        slug: String,
        content: String,
        summary: Option<String>,
        status: PostStatus,
        tags: Vec<Tag>,
    ) -> Self {
        let now = Utc::now();
        let mut post = Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            slug,
            content,
            summary,
            status: PostStatus::Draft,
            view_count: 0,
            tags,
            created_at: now,
            updated_at: now,
            published_at: None,
        };
        post.set_status(status);
        post
    }

    /// Change status; the first transition to published stamps `published_at`.
    pub fn set_status(&mut self, status: PostStatus) {
        if status == PostStatus::Published && self.published_at.is_none() {
            self.published_at = Some(Utc::now());
        }
        self.status = status;
    }
}

/// Fields a post author may change. `None` leaves the field as is.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub summary: Option<String>,
    pub status: Option<PostStatus>,
    pub tags: Option<Vec<String>>,
}

/// Filters for post listings; all present filters must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub status: Option<PostStatus>,
    pub author_id: Option<Uuid>,
    /// Tag slug.
    pub tag: Option<String>,
    /// Case-insensitive substring of title, summary or content.
    pub search: Option<String>,
}

impl PostFilter {
    /// Whether a post satisfies every filter (used by in-memory stores).
    pub fn matches(&self, post: &Post) -> bool {
        if self.status.is_some_and(|s| s != post.status) {
            return false;
        }
        if self.author_id.is_some_and(|a| a != post.author_id) {
            return false;
        }
        if let Some(tag) = &self.tag {
            if !post.tags.iter().any(|t| &t.slug == tag) {
                return false;
            }
        }
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            let hit = post.title.to_lowercase().contains(&term)
                || post.content.to_lowercase().contains(&term)
                || post
                    .summary
                    .as_deref()
                    .is_some_and(|s| s.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }
        true
    }
}

/// Listing row: the post without its body, plus the author's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSummary {
    pub post: Post,
    pub author_username: Option<String>,
}

/// Turn arbitrary text into a URL slug: lowercase ASCII alphanumerics
/// separated by single dashes.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.len() > MAX_SLUG_LENGTH {
        slug.truncate(MAX_SLUG_LENGTH);
        while slug.ends_with('-') {
            slug.pop();
        }
    }
    slug
}

/// Slug for a post title, falling back to `post` when nothing survives.
pub fn post_slug(title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        "post".to_string()
    } else {
        slug
    }
}

/// Disambiguate a taken slug with a short random suffix.
pub fn suffixed_slug(base: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{}-{}", base, &id[..8])
}

pub fn validate_title(title: &str) -> Result<(), String> {
    let len = title.trim().chars().count();
    if len == 0 {
        return Err("Title must not be empty".to_string());
    }
    if len > MAX_TITLE_LENGTH {
        return Err(format!("Title must be at most {MAX_TITLE_LENGTH} characters"));
    }
    Ok(())
}

pub fn validate_post_content(content: &str) -> Result<(), String> {
    let len = content.chars().count();
    if len == 0 {
        return Err("Content must not be empty".to_string());
    }
    if len > MAX_POST_CONTENT_LENGTH {
        return Err(format!(
            "Content must be at most {MAX_POST_CONTENT_LENGTH} characters"
        ));
    }
    Ok(())
}

pub fn validate_summary(summary: &str) -> Result<(), String> {
    if summary.chars().count() > MAX_SUMMARY_LENGTH {
        return Err(format!(
            "Summary must be at most {MAX_SUMMARY_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Validate tag names and collapse duplicates (by slug), keeping first spelling.
pub fn normalize_tag_names(names: &[String]) -> Result<Vec<String>, String> {
    let mut seen = Vec::new();
    let mut out = Vec::new();
    for name in names {
        let trimmed = name.trim();
        let len = trimmed.chars().count();
        if len == 0 || len > MAX_TAG_NAME_LENGTH {
            return Err(format!(
                "Tag names must be between 1 and {MAX_TAG_NAME_LENGTH} characters"
            ));
        }
        let slug = slugify(trimmed);
        if slug.is_empty() {
            return Err(format!("Tag '{trimmed}' has no usable characters"));
        }
        if !seen.contains(&slug) {
            seen.push(slug);
            out.push(trimmed.to_string());
        }
    }
    if out.len() > MAX_TAGS_PER_POST {
        return Err(format!("A post can have at most {MAX_TAGS_PER_POST} tags"));
    }
    Ok(out)
}
