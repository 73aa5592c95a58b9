mod analysis;
pub mod auth;
mod error;
pub mod guard;
mod notes;
mod validation;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/session", get(auth::session));

    // Note routes - each handler requires a resolved Identity
    let note_routes = Router::new()
        .route("/notes", get(notes::list_notes))
        .route("/notes", post(notes::create_note))
        .route("/notes/:id", get(notes::get_note))
        .route("/notes/:id", put(notes::update_note))
        .route("/notes/:id", delete(notes::delete_note))
        .route("/notes/:id/analysis", post(analysis::create_analysis));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api", note_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
