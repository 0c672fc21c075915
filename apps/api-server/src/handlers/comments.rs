//! Comment handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use agora_core::DomainError;
use agora_core::services::NewComment;
use agora_shared::dto::{
    CommentCount, CommentPageQuery, CommentQuery, CommentResponse, CommentWithReplies,
    CreateCommentRequest, Deleted, UpdateCommentRequest,
};
use agora_shared::{ApiResponse, PaginatedResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

async fn create_comment(
    state: &AppState,
    identity: Identity,
    req: CreateCommentRequest,
) -> AppResult<HttpResponse> {
    let comment = state
        .comments
        .create(
            identity.user_id,
            NewComment {
                post_id: req.post_id,
                parent_id: req.parent_id,
                content: req.content,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        CommentResponse::from(comment),
        "Comment created successfully",
    )))
}

/// POST /comments
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    create_comment(&state, identity, body.into_inner()).await
}

/// POST /comments/post/{post_id}
pub async fn create_for_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let mut req = body.into_inner();
    req.post_id = Some(path.into_inner());
    create_comment(&state, identity, req).await
}

/// GET /comments/post/{post_id}?page=&page_size=
pub async fn list_by_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<CommentPageQuery>,
) -> AppResult<HttpResponse> {
    let page = query
        .page_request()
        .map_err(|e| AppError::Validation(vec![e]))?;
    let comments = state.comments.list_by_post(path.into_inner(), page).await?;

    Ok(HttpResponse::Ok().json(PaginatedResponse::<CommentResponse>::from_page(
        comments,
        "Comments retrieved successfully",
    )))
}

/// GET /comments/{id}?include_replies=
pub async fn get(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<CommentQuery>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let body = if query.include_replies.unwrap_or(true) {
        CommentWithReplies::from(state.comments.get_with_replies(id).await?)
    } else {
        CommentWithReplies::from(state.comments.get(id).await?)
    };

    Ok(HttpResponse::Ok().json(ApiResponse::ok(body, "Comment retrieved successfully")))
}

/// PUT /comments/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCommentRequest>,
) -> AppResult<HttpResponse> {
    let comment = state
        .comments
        .update(path.into_inner(), identity.user_id, body.into_inner().content)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        CommentResponse::from(comment),
        "Comment updated successfully",
    )))
}

/// DELETE /comments/{id}
///
/// Absent and not-owned comments are indistinguishable to the caller.
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    match state.comments.delete(path.into_inner(), identity.user_id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::ok(
            Deleted { deleted: true },
            "Comment deleted successfully",
        ))),
        Err(DomainError::NotFound { .. }) => Err(AppError::NotFound(
            "Comment not found or not authorized".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

/// GET /comments/post/{post_id}/count
pub async fn count(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let count = state.comments.count_by_post(post_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        CommentCount { post_id, count },
        "Comment count retrieved successfully",
    )))
}
