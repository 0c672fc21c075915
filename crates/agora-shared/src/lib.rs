//! # Agora Shared
//!
//! Wire types of the HTTP API: request bodies, query strings, response
//! payloads and the common envelope.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, Items, PaginatedResponse, Pagination, PostPage};
