//! Route configuration.
//!
//! Public surface: health, register/login and the feed (which resolves
//! an optional viewer from the Authorization header itself). Everything
//! else sits behind the `JwtAuth` middleware.
use actix_web::{web, HttpResponse};

use crate::handlers::{auth, comments, favorites, messages, relations, users, videos};
use crate::middleware::JwtAuth;
use crate::security::tokens::TokenManager;

pub fn configure_routes(cfg: &mut web::ServiceConfig, tokens: TokenManager) {
    cfg.route("/health", web::get().to(health_check)).service(
        web::scope("/api/v1")
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login)),
            )
            .route("/feed", web::get().to(videos::get_feed))
            .service(
                web::scope("")
                    .wrap(JwtAuth::new(tokens))
                    .route("/users/{id}", web::get().to(users::get_user))
                    .route("/users/{id}/follow", web::post().to(relations::follow))
                    .route("/users/{id}/follow", web::delete().to(relations::unfollow))
                    .route("/users/{id}/following", web::get().to(users::get_following))
                    .route("/users/{id}/followers", web::get().to(users::get_followers))
                    .route("/users/{id}/videos", web::get().to(videos::list_videos))
                    .route(
                        "/users/{id}/favorites",
                        web::get().to(favorites::list_favorites),
                    )
                    .route("/friends", web::get().to(users::get_friends))
                    .route("/videos", web::post().to(videos::publish))
                    .route("/videos/{id}", web::delete().to(videos::delete))
                    .route("/videos/{id}/favorite", web::post().to(favorites::favorite))
                    .route(
                        "/videos/{id}/favorite",
                        web::delete().to(favorites::unfavorite),
                    )
                    .route("/videos/{id}/comments", web::post().to(comments::create))
                    .route("/videos/{id}/comments", web::get().to(comments::list))
                    .route("/comments/{id}", web::delete().to(comments::delete))
                    .route("/messages", web::post().to(messages::send))
                    .route("/messages/{peer_id}", web::get().to(messages::history)),
            ),
    );
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "service": "reel-service",
        "status": "ok",
    }))
}
