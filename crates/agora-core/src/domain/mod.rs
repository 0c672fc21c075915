//! Domain entities - the core business objects.

pub mod comment;
pub mod like;
pub mod pagination;
pub mod post;

pub use comment::{Comment, CommentNode};
pub use like::Like;
pub use pagination::{Page, PageRequest};
pub use post::{Post, PostChanges, PostFilter, PostStatus, PostSummary, Tag};
