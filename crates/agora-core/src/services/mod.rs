//! Domain services - ownership rules and derived data on top of the ports.

mod comment;
mod like;
mod post;

pub use comment::{CommentService, NewComment};
pub use like::LikeService;
pub use post::{NewPost, PostService};

use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

/// Only the recorded owner may mutate a record.
pub fn ensure_owner(owner_id: Uuid, caller_id: Uuid, denied: &str) -> DomainResult<()> {
    if owner_id == caller_id {
        Ok(())
    } else {
        Err(DomainError::Forbidden(denied.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_owner() {
        let owner = Uuid::new_v4();
        assert!(ensure_owner(owner, owner, "nope").is_ok());

        let err = ensure_owner(owner, Uuid::new_v4(), "nope").unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(msg) if msg == "nope"));
    }
}
