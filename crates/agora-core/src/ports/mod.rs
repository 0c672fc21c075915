//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod directory;
mod repository;

pub use auth::{AuthError, TokenClaims, TokenService};
pub use directory::{PostLookup, UserDirectory};
pub use repository::{BaseRepository, CommentRepository, LikeRepository, PostRepository};
