pub mod paragraphs;
pub mod search;

use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// All HTTP routes. The single-page UI reads `#/paragraph/<id>` itself, so
/// the server only needs to hand it the page.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Serve frontend
        .route("/", get(serve_index))
        .route("/paragraph/{id}", get(serve_index))
        // API routes
        .route("/api/sections", get(paragraphs::list_sections))
        .route("/api/search", post(search::search))
        .route("/api/paragraphs/{id}", get(paragraphs::get_paragraph))
        .route("/api/paragraphs/{id}/citation", get(paragraphs::get_citation))
        .route("/api/config", get(paragraphs::get_config))
        .with_state(state)
        .fallback(get(serve_index))
}

async fn serve_index() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}
