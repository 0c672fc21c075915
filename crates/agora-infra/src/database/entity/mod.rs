//! SeaORM entities, one schema per service.

pub mod comment;
pub mod like;
pub mod post;
pub mod post_tag;
pub mod tag;
