use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum content length of a comment, in characters.
pub const MAX_COMMENT_LENGTH: usize = 5000;

/// Deepest reply level emitted by [`build_reply_tree`].
pub const MAX_REPLY_DEPTH: usize = 64;

const EDITED_FORMAT: &str = "%b %d, %Y %I:%M %p";

/// Comment entity - a (possibly nested) remark attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
}

impl Comment {
    /// Create a new comment.
    pub fn new(post_id: Uuid, author_id: Uuid, parent_id: Option<Uuid>, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            parent_id,
            content,
            is_deleted: false,
            created_at: now,
            updated_at: now,
            edited_at: None,
        }
    }

    /// Replace the content. Returns `false` when the content is unchanged,
    /// in which case neither timestamp moves.
    pub fn edit(&mut self, content: String) -> bool {
        if self.content == content {
            return false;
        }
        let now = Utc::now();
        self.content = content;
        self.edited_at = Some(now);
        self.updated_at = now;
        true
    }

    /// Mark the comment as deleted, keeping the row.
    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
        self.updated_at = Utc::now();
    }

    pub fn edited(&self) -> bool {
        self.edited_at.is_some()
    }

    /// Display label such as `edited - Jan 02, 2024 03:04 PM`.
    pub fn edited_label(&self) -> Option<String> {
        self.edited_at.map(edited_label)
    }
}

/// Format an edit timestamp for display.
pub fn edited_label(at: DateTime<Utc>) -> String {
    format!("edited - {}", at.format(EDITED_FORMAT))
}

/// Check comment content against the length rules.
pub fn validate_content(content: &str) -> Result<(), String> {
    let len = content.chars().count();
    if len == 0 {
        return Err("Comment content must not be empty".to_string());
    }
    if len > MAX_COMMENT_LENGTH {
        return Err(format!(
            "Comment content must be at most {MAX_COMMENT_LENGTH} characters"
        ));
    }
    Ok(())
}

/// A comment together with its ordered replies.
#[derive(Debug, Clone, Serialize)]
pub struct CommentNode {
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    /// Total number of comments in this subtree, including the root.
    pub fn count(&self) -> usize {
        1 + self.replies.iter().map(CommentNode::count).sum::<usize>()
    }
}

/// Assemble the reply tree under `root` from the flat comments of its post.
///
/// `thread` may contain any comments of the post in any order; deleted ones
/// and anything not reachable from `root` are ignored. Siblings come out in
/// creation order. Every comment is emitted at most once, so corrupted
/// parent pointers cannot make the walk loop.
pub fn build_reply_tree(root: Comment, thread: Vec<Comment>) -> CommentNode {
    let mut children: HashMap<Uuid, Vec<Comment>> = HashMap::new();
    for comment in thread {
        if comment.is_deleted || comment.id == root.id {
            continue;
        }
        if let Some(parent_id) = comment.parent_id {
            children.entry(parent_id).or_default().push(comment);
        }
    }
    for siblings in children.values_mut() {
        siblings.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    }

    let mut visited = HashSet::new();
    visited.insert(root.id);
    attach_replies(root, &mut children, &mut visited, 0)
}

fn attach_replies(
    comment: Comment,
    children: &mut HashMap<Uuid, Vec<Comment>>,
    visited: &mut HashSet<Uuid>,
    depth: usize,
) -> CommentNode {
    let direct = children.remove(&comment.id).unwrap_or_default();

    if depth >= MAX_REPLY_DEPTH && !direct.is_empty() {
        tracing::warn!(
            comment_id = %comment.id,
            dropped = direct.len(),
            "Reply tree depth limit reached"
        );
        return CommentNode {
            comment,
            replies: Vec::new(),
        };
    }

    let mut replies = Vec::with_capacity(direct.len());
    for child in direct {
        if !visited.insert(child.id) {
            tracing::warn!(comment_id = %child.id, "Cycle in comment parent chain");
            continue;
        }
        replies.push(attach_replies(child, children, visited, depth + 1));
    }

    CommentNode { comment, replies }
}
