//! services/app/src/web/middleware.rs
//!
//! Session middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use rttc_core::domain::SessionState;
use std::sync::Arc;
use tracing::debug;

use crate::web::state::AppState;

/// Middleware that lets a request through once the device has a session.
///
/// Guests pass; the stores decide themselves what a guest may do.
/// Without any session the request is rejected with 401 Unauthorized.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, (StatusCode, String)> {
    if state.session.state() == SessionState::Unauthenticated {
        debug!("Rejecting {} without a session", req.uri().path());
        return Err((
            StatusCode::UNAUTHORIZED,
            "Sign in or continue as a guest first.".to_string(),
        ));
    }

    Ok(next.run(req).await)
}
