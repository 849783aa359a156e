pub mod auth;
pub mod middleware;
pub mod protocol;
pub mod rest;
pub mod state;
pub mod voice;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

pub use middleware::require_session;
pub use state::AppState;

/// Recorded clips and OCR requests stay well below this.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Builds every bridge route on top of the shared state.
pub fn router(state: Arc<AppState>) -> Router {
    // Public routes (no session required)
    let public_routes = Router::new()
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/guest", post(auth::guest_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/auth/me", get(auth::me_handler))
        .route("/auth/preferred-language", put(auth::preferred_language_handler))
        .route("/languages", get(rest::languages_handler))
        .route("/api-docs/openapi.json", get(rest::openapi_handler));

    // Routes that need a signed-in user or a guest
    let protected_routes = Router::new()
        .route("/translate", post(rest::translate_handler))
        .route("/history/{kind}", get(rest::list_history_handler))
        .route("/history/{kind}/{id}", delete(rest::delete_history_handler))
        .route(
            "/history/{kind}/{id}/favorite",
            put(rest::favorite_history_handler),
        )
        .route("/conversation/turns", post(rest::conversation_turn_handler))
        .route("/conversation/days", get(rest::conversation_days_handler))
        .route("/ocr/translate", post(rest::ocr_handler))
        .route(
            "/phrases",
            get(rest::list_phrases_handler).post(rest::add_phrase_handler),
        )
        .route("/phrases/{id}", delete(rest::delete_phrase_handler))
        .route("/speak", post(rest::speak_handler))
        .route("/voice/start", post(voice::start_handler))
        .route("/voice/event", post(voice::event_handler))
        .route("/voice/transcribe", post(voice::transcribe_handler))
        .route("/voice/reset", post(voice::reset_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
