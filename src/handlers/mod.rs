pub mod comment_handlers;
pub mod thread_handlers;

use actix_web::web;

/// Mounts the thread service under /api/threads.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/threads")
            .route("", web::get().to(thread_handlers::list))
            .route("", web::post().to(thread_handlers::create))
            .route("/{id}", web::get().to(thread_handlers::read))
            .route("/{id}", web::put().to(thread_handlers::update))
            .route("/{id}", web::delete().to(thread_handlers::delete))
            .route("/{id}/vote", web::post().to(thread_handlers::vote))
            .route("/{id}/comments", web::post().to(comment_handlers::create))
            .route("/{id}/comments/{comment_id}", web::put().to(comment_handlers::update))
            .route("/{id}/comments/{comment_id}", web::delete().to(comment_handlers::delete)),
    );
}
