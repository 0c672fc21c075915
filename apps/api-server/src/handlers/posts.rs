//! Post handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use agora_core::services::NewPost;
use agora_shared::dto::{
    AuthorPostsQuery, CreatePostRequest, PostCreated, PostDetail, PostListItem, PostListQuery,
    PostUpdated, TagResponse, UpdatePostRequest,
};
use agora_shared::{ApiResponse, Items, PostPage};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /posts/?page=&limit=&status=&author_id=&tag=&search=
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<PostListQuery>,
) -> AppResult<HttpResponse> {
    let (filter, page) = query.into_inner().parse().map_err(AppError::Validation)?;
    let posts = state.posts.list(&filter, page).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        PostPage::<PostListItem>::from_page(posts),
        "Posts retrieved successfully",
    )))
}

/// GET /posts/{slug}/ - counts as a view.
pub async fn get(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let post = state.posts.view_by_slug(&path).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        PostDetail::from(post),
        "Post retrieved successfully",
    )))
}

/// POST /posts/
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let post = state
        .posts
        .create(
            identity.user_id,
            NewPost {
                title: req.title,
                content: req.content,
                summary: req.summary,
                status: req.status,
                tags: req.tags,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        PostCreated::from(post),
        "Post created successfully",
    )))
}

/// PUT /posts/{post_identifier}/ - id or slug.
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .update(&path, identity.user_id, body.into_inner().into())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        PostUpdated::from(post),
        "Post updated successfully",
    )))
}

/// DELETE /posts/{post_identifier}/ - id or slug.
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    state.posts.delete(&path, identity.user_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("Post deleted successfully")))
}

/// GET /posts/tags
pub async fn tags(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let tags = state.posts.tags().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        Items {
            items: tags.into_iter().map(TagResponse::from).collect(),
        },
        "Tags retrieved successfully",
    )))
}

/// GET /posts/authors/{author_id}/posts?page=&limit=
pub async fn by_author(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<AuthorPostsQuery>,
) -> AppResult<HttpResponse> {
    let page = query
        .page_request()
        .map_err(|e| AppError::Validation(vec![e]))?;
    let posts = state.posts.list_by_author(path.into_inner(), page).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        PostPage::<PostListItem>::from_page(posts),
        "Author posts retrieved successfully",
    )))
}
