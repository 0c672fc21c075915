//! Like handlers.

use actix_web::{HttpResponse, web};

use agora_shared::ApiResponse;
use agora_shared::dto::{Deleted, LikeCount, LikeRequest, LikeResponse, LikeStatus};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /likes - liking twice returns the existing like.
pub async fn like(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<LikeRequest>,
) -> AppResult<HttpResponse> {
    let (like, created) = state
        .likes
        .like(identity.user_id, &body.post_slug)
        .await?;

    let message = if created {
        "Post liked successfully"
    } else {
        "Post already liked"
    };
    Ok(HttpResponse::Ok().json(ApiResponse::ok(LikeResponse::from(like), message)))
}

/// DELETE /likes/{post_slug}
pub async fn unlike(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    state.likes.unlike(identity.user_id, &path).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        Deleted { deleted: true },
        "Like removed successfully",
    )))
}

/// GET /likes/{post_slug}/count
pub async fn count(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let post_slug = path.into_inner();
    let count = state.likes.count(&post_slug).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        LikeCount { post_slug, count },
        "Like count retrieved successfully",
    )))
}

/// GET /likes/{post_slug}/status
pub async fn status(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post_slug = path.into_inner();
    let liked = state.likes.status(identity.user_id, &post_slug).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        LikeStatus { post_slug, liked },
        "Like status retrieved successfully",
    )))
}
