//! HTTP handlers and route configuration.

mod health;
mod posts;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .route("/users/{email}/posts", web::get().to(posts::list_user_posts))
            .route("/posts/{post_key}/comments", web::get().to(posts::list_comments))
            // Anonymous reads, authenticated writes
            .service(
                web::resource("/posts")
                    .route(web::get().to(posts::list_posts))
                    .route(web::post().to(posts::create_post)),
            )
            .route("/comments", web::post().to(posts::create_comment)),
    );
}
