//! HTTP handlers and route configuration.

mod comments;
mod health;
mod likes;
mod posts;

#[cfg(test)]
mod tests;

use actix_web::web;

use crate::config::EnabledServices;
use crate::middleware::error::{json_error, path_error, query_error};

/// Configure extractor error rendering and the routes of the enabled services.
pub fn configure_routes(cfg: &mut web::ServiceConfig, services: EnabledServices) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .route("/health", web::get().to(health::health_check));

    if services.comments {
        cfg.service(
            web::scope("/comments")
                .route("", web::post().to(comments::create))
                .route("/post/{post_id}", web::post().to(comments::create_for_post))
                .route("/post/{post_id}", web::get().to(comments::list_by_post))
                .route("/post/{post_id}/count", web::get().to(comments::count))
                .route("/{id}", web::get().to(comments::get))
                .route("/{id}", web::put().to(comments::update))
                .route("/{id}", web::delete().to(comments::delete)),
        );
    }

    if services.posts {
        // Fixed segments before `{slug}`; every post route also answers
        // without its trailing slash.
        cfg.service(
            web::scope("/posts")
                .route("", web::get().to(posts::list))
                .route("/", web::get().to(posts::list))
                .route("", web::post().to(posts::create))
                .route("/", web::post().to(posts::create))
                .route("/tags", web::get().to(posts::tags))
                .route(
                    "/authors/{author_id}/posts",
                    web::get().to(posts::by_author),
                )
                .route("/{slug}/", web::get().to(posts::get))
                .route("/{slug}", web::get().to(posts::get))
                .route("/{post_identifier}/", web::put().to(posts::update))
                .route("/{post_identifier}", web::put().to(posts::update))
                .route("/{post_identifier}/", web::delete().to(posts::delete))
                .route("/{post_identifier}", web::delete().to(posts::delete)),
        );
    }

    if services.likes {
        cfg.service(
            web::scope("/likes")
                .route("", web::post().to(likes::like))
                .route("/{post_slug}", web::delete().to(likes::unlike))
                .route("/{post_slug}/count", web::get().to(likes::count))
                .route("/{post_slug}/status", web::get().to(likes::status)),
        );
    }
}
