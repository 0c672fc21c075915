//! In-memory repositories - used when no database is configured and in tests.
//!
//! Data is lost on process restart.

mod comment;
mod directory;
mod like;
mod post;

pub use comment::InMemoryCommentRepository;
pub use directory::InMemoryUserDirectory;
pub use like::InMemoryLikeRepository;
pub use post::InMemoryPostRepository;

#[cfg(test)]
mod tests;
