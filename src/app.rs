use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/healthz", get(handlers::healthz))
        .route("/api/state", get(handlers::get_state))
        .route(
            "/api/guestbook",
            get(handlers::get_guestbook)
                .post(handlers::post_guestbook)
                .delete(handlers::clear_guestbook),
        )
        .with_state(state)
}
