//! HTTP tests against in-memory state and real tokens.

use std::sync::Arc;

use actix_web::{App, http::StatusCode, test, web};
use serde_json::{Value, json};
use uuid::Uuid;

use agora_core::ports::TokenService;
use agora_infra::{JwtConfig, JwtTokenService};

use super::configure_routes;
use crate::config::EnabledServices;
use crate::observability::RequestIdMiddleware;
use crate::state::AppState;

fn tokens() -> Arc<dyn TokenService> {
    Arc::new(JwtTokenService::new(JwtConfig {
        secret: "handler-test-secret".to_string(),
        ..Default::default()
    }))
}

fn bearer(tokens: &Arc<dyn TokenService>, user_id: Uuid) -> (&'static str, String) {
    let token = tokens.generate_token(user_id).unwrap();
    ("Authorization", format!("Bearer {token}"))
}

macro_rules! app {
    ($state:expr, $tokens:expr) => {
        app!($state, $tokens, EnabledServices::default())
    };
    ($state:expr, $tokens:expr, $services:expr) => {
        test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .app_data(web::Data::new($state.clone()))
                .app_data(web::Data::new($tokens.clone()))
                .configure(|cfg| configure_routes(cfg, $services)),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health_and_request_id() {
    let state = AppState::in_memory();
    let tokens = tokens();
    let app = app!(state, tokens);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "in-memory");

    let req = test::TestRequest::get()
        .uri("/health")
        .insert_header(("X-Request-ID", "trace-123"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(
        resp.headers().get("x-request-id").unwrap().to_str().unwrap(),
        "trace-123"
    );
}

#[actix_web::test]
async fn test_comment_requires_token() {
    let state = AppState::in_memory();
    let tokens = tokens();
    let app = app!(state, tokens);

    let req = test::TestRequest::post()
        .uri("/comments")
        .set_json(json!({"post_id": Uuid::new_v4(), "content": "hi"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "unauthorized");

    let req = test::TestRequest::post()
        .uri("/comments")
        .insert_header(("Authorization", "Bearer not-a-jwt"))
        .set_json(json!({"post_id": Uuid::new_v4(), "content": "hi"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_comment_lifecycle() {
    let state = AppState::in_memory();
    let tokens = tokens();
    let app = app!(state, tokens);
    let author = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    let post_id = Uuid::new_v4();

    let req = test::TestRequest::post()
        .uri(&format!("/comments/post/{post_id}"))
        .insert_header(bearer(&tokens, author))
        .set_json(json!({"content": "root"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["author_id"], author.to_string());
    assert_eq!(body["data"]["edited"], false);
    let root_id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/comments")
        .insert_header(bearer(&tokens, stranger))
        .set_json(json!({"parent_id": root_id, "content": "reply"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["post_id"], post_id.to_string());

    let req = test::TestRequest::get()
        .uri(&format!("/comments/{root_id}"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["replies"][0]["content"], "reply");

    let req = test::TestRequest::get()
        .uri(&format!("/comments/{root_id}?include_replies=false"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["replies"], json!([]));

    // Stranger may neither edit nor delete.
    let req = test::TestRequest::put()
        .uri(&format!("/comments/{root_id}"))
        .insert_header(bearer(&tokens, stranger))
        .set_json(json!({"content": "hijacked"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&format!("/comments/{root_id}"))
        .insert_header(bearer(&tokens, stranger))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Comment not found or not authorized");

    let req = test::TestRequest::put()
        .uri(&format!("/comments/{root_id}"))
        .insert_header(bearer(&tokens, author))
        .set_json(json!({"content": "root, revised"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["edited"], true);
    assert!(
        body["data"]["edited_at_formatted"]
            .as_str()
            .unwrap()
            .starts_with("edited - ")
    );

    let req = test::TestRequest::delete()
        .uri(&format!("/comments/{root_id}"))
        .insert_header(bearer(&tokens, author))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["deleted"], true);

    let req = test::TestRequest::get()
        .uri(&format!("/comments/{root_id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&format!("/comments/post/{post_id}/count"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["count"], 1);
}

#[actix_web::test]
async fn test_comment_pagination() {
    let state = AppState::in_memory();
    let tokens = tokens();
    let app = app!(state, tokens);
    let user = Uuid::new_v4();
    let post_id = Uuid::new_v4();

    for i in 0..3 {
        let req = test::TestRequest::post()
            .uri(&format!("/comments/post/{post_id}"))
            .insert_header(bearer(&tokens, user))
            .set_json(json!({"content": format!("c{i}")}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/comments/post/{post_id}?page=3&page_size=2"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["total"], 3);
    assert_eq!(body["page"], 3);
    assert_eq!(body["page_size"], 2);
    assert_eq!(body["total_pages"], 2);

    let req = test::TestRequest::get()
        .uri(&format!("/comments/post/{post_id}?page_size=101"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri(&format!("/comments/post/{post_id}?page=abc"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn test_post_views_and_listing() {
    let state = AppState::in_memory();
    let tokens = tokens();
    let app = app!(state, tokens);
    let author = Uuid::new_v4();

    let req = test::TestRequest::post()
        .uri("/posts/")
        .insert_header(bearer(&tokens, author))
        .set_json(json!({
            "title": "Hello World",
            "content": "First post",
            "status": "published",
            "tags": ["Rust", "rust", "Web"]
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["slug"], "hello-world");
    assert_eq!(body["data"]["tags"].as_array().map(Vec::len), Some(2));

    for expected in 1..=2 {
        let req = test::TestRequest::get().uri("/posts/hello-world/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["view_count"], expected);
        assert_eq!(body["data"]["content"], "First post");
    }

    let req = test::TestRequest::get().uri("/posts?tag=RUST").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["items"][0]["view_count"], 2);
    assert!(body["data"]["items"][0].get("content").is_none());
    assert_eq!(body["data"]["pagination"]["total"], 1);
    assert_eq!(body["data"]["pagination"]["has_next"], false);

    // Listing leaves the counter alone.
    let req = test::TestRequest::get().uri("/posts/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["items"][0]["view_count"], 2);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/authors/{author}/posts"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["pagination"]["total"], 1);

    let req = test::TestRequest::get().uri("/posts/tags").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(2));

    let req = test::TestRequest::get().uri("/posts/missing/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_post_list_rejects_bad_filters() {
    let state = AppState::in_memory();
    let tokens = tokens();
    let app = app!(state, tokens);

    let req = test::TestRequest::get()
        .uri("/posts/?status=deleted&author_id=nope&limit=0")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["errors"].as_array().map(Vec::len), Some(3));
}

#[actix_web::test]
async fn test_post_ownership() {
    let state = AppState::in_memory();
    let tokens = tokens();
    let app = app!(state, tokens);
    let owner = Uuid::new_v4();
    let other = Uuid::new_v4();

    let req = test::TestRequest::post()
        .uri("/posts")
        .insert_header(bearer(&tokens, owner))
        .set_json(json!({"title": "Mine", "content": "Body"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["status"], "draft");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri("/posts/mine/")
        .insert_header(bearer(&tokens, other))
        .set_json(json!({"title": "Theirs"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&format!("/posts/{id}"))
        .insert_header(bearer(&tokens, other))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri(&format!("/posts/{id}/"))
        .insert_header(bearer(&tokens, owner))
        .set_json(json!({"title": "Still mine", "status": "published"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["title"], "Still mine");
    assert_eq!(body["data"]["slug"], "mine");
    assert_eq!(body["data"]["status"], "published");

    let req = test::TestRequest::delete()
        .uri("/posts/mine")
        .insert_header(bearer(&tokens, owner))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert!(body["data"].is_null());

    let req = test::TestRequest::get().uri("/posts/mine").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_invalid_json_is_enveloped() {
    let state = AppState::in_memory();
    let tokens = tokens();
    let app = app!(state, tokens);

    let req = test::TestRequest::post()
        .uri("/posts/")
        .insert_header(bearer(&tokens, Uuid::new_v4()))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "bad_request");
}

#[actix_web::test]
async fn test_likes() {
    let state = AppState::in_memory();
    let tokens = tokens();
    let app = app!(state, tokens);
    let user = Uuid::new_v4();

    let req = test::TestRequest::post()
        .uri("/posts/")
        .insert_header(bearer(&tokens, Uuid::new_v4()))
        .set_json(json!({"title": "Likeable", "content": "Body", "status": "published"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    for message in ["Post liked successfully", "Post already liked"] {
        let req = test::TestRequest::post()
            .uri("/likes")
            .insert_header(bearer(&tokens, user))
            .set_json(json!({"post_slug": "likeable"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], message);
        assert_eq!(body["data"]["user_id"], user.to_string());
    }

    let req = test::TestRequest::get().uri("/likes/likeable/count").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"], json!({"post_slug": "likeable", "count": 1}));

    let req = test::TestRequest::get()
        .uri("/likes/likeable/status")
        .insert_header(bearer(&tokens, user))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["liked"], true);

    let req = test::TestRequest::get().uri("/likes/likeable/status").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::delete()
        .uri("/likes/likeable")
        .insert_header(bearer(&tokens, user))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["deleted"], true);

    let req = test::TestRequest::delete()
        .uri("/likes/likeable")
        .insert_header(bearer(&tokens, user))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/likes")
        .insert_header(bearer(&tokens, user))
        .set_json(json!({"post_slug": "nope"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_disabled_services_are_not_mounted() {
    let state = AppState::in_memory();
    let tokens = tokens();
    let app = app!(
        state,
        tokens,
        EnabledServices {
            comments: true,
            posts: false,
            likes: false,
        }
    );

    let req = test::TestRequest::get().uri("/posts/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&format!("/comments/post/{}/count", Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_unsluggable_tag_filter_matches_nothing() {
    let state = AppState::in_memory();
    let tokens = tokens();
    let app = app!(state, tokens);

    let req = test::TestRequest::post()
        .uri("/posts/")
        .insert_header(bearer(&tokens, Uuid::new_v4()))
        .set_json(json!({"title": "Untagged", "content": "Body", "status": "published"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/posts/?tag=%2B%2B").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["pagination"]["total"], 0);
    assert_eq!(body["data"]["items"], json!([]));

    let req = test::TestRequest::get().uri("/posts/?tag=").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["pagination"]["total"], 1);
}

#[actix_web::test]
async fn test_include_replies_flag_spellings() {
    let state = AppState::in_memory();
    let tokens = tokens();
    let app = app!(state, tokens);
    let user = Uuid::new_v4();

    let req = test::TestRequest::post()
        .uri(&format!("/comments/post/{}", Uuid::new_v4()))
        .insert_header(bearer(&tokens, user))
        .set_json(json!({"content": "root"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let root_id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/comments")
        .insert_header(bearer(&tokens, user))
        .set_json(json!({"parent_id": root_id, "content": "reply"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    for (flag, replies) in [("0", 0), ("off", 0), ("1", 1), ("yes", 1)] {
        let req = test::TestRequest::get()
            .uri(&format!("/comments/{root_id}?include_replies={flag}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "flag {flag}");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body["data"]["replies"].as_array().map(Vec::len),
            Some(replies),
            "flag {flag}"
        );
    }

    let req = test::TestRequest::get()
        .uri(&format!("/comments/{root_id}?include_replies=maybe"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
