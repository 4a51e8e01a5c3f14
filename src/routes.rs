// src/routes.rs

use axum::{
    Router,
    http::Method,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{dashboard, posts},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Nests the user-dashboard and post sub-routers under /api.
/// * Applies global middleware (Trace, CORS).
/// * Serves the static dashboard page for everything else.
/// * Injects global state (gateway + config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        format!("http://localhost:{}", state.config.port)
            .parse()
            .unwrap(),
        format!("http://127.0.0.1:{}", state.config.port)
            .parse()
            .unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let user_routes = Router::new()
        .route("/", get(dashboard::list_users).post(dashboard::create_user))
        .route("/{id}", delete(dashboard::delete_user))
        .route("/{id}/posts", get(dashboard::list_user_posts));

    let post_routes = Router::new()
        .route("/", get(posts::list_posts).post(posts::create_post))
        .route(
            "/{id}",
            get(posts::get_post)
                .put(posts::edit_post)
                .delete(posts::delete_post),
        )
        .route("/{id}/publish", post(posts::publish_post))
        .route("/{id}/unpublish", post(posts::unpublish_post))
        .route("/{id}/visibility", put(posts::set_visibility));

    Router::new()
        .nest("/api/users", user_routes)
        .nest("/api/posts", post_routes)
        // The dashboard page itself; everything stateful goes through /api.
        .fallback_service(ServeDir::new("static"))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
