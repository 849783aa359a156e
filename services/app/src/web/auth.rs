//! services/app/src/web/auth.rs
//!
//! Session endpoints: sign in, register, guest mode and sign out.

use axum::{extract::State, http::StatusCode, Json};
use regex::Regex;
use rttc_core::domain::NewAccount;
use rttc_core::error::AuthError;
use std::sync::{Arc, OnceLock};
use tracing::{error, info};

use crate::web::protocol::{
    LoginRequest, PreferredLanguageRequest, RegisterRequest, SessionResponse, UserResponse,
};
use crate::web::state::AppState;

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid"))
}

/// Maps a session failure to the status and message shown by the UI.
pub fn auth_error_response(e: AuthError) -> (StatusCode, String) {
    let status = match &e {
        AuthError::UserNotFound => StatusCode::NOT_FOUND,
        AuthError::WrongPassword | AuthError::NotSignedIn => StatusCode::UNAUTHORIZED,
        AuthError::EmailTaken => StatusCode::CONFLICT,
        AuthError::Validation(_) => StatusCode::BAD_REQUEST,
        AuthError::Unexpected(_) => {
            error!("Session operation failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, e.to_string())
}

fn session_response(state: &AppState) -> Json<SessionResponse> {
    Json(SessionResponse::new(
        state.session.state(),
        state.session.preferred_language(),
    ))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/login - Sign in with an existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = UserResponse),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Incorrect password"),
        (status = 404, description = "User not found")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<UserResponse>, (StatusCode, String)> {
    let user = state
        .session
        .sign_in(&req.email, &req.password)
        .await
        .map_err(auth_error_response)?;
    Ok(Json(user.into()))
}

/// POST /auth/register - Create an account and sign into it
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid or missing fields"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), (StatusCode, String)> {
    let email = req.email.trim();
    if !email.is_empty() && !email_regex().is_match(email) {
        return Err((
            StatusCode::BAD_REQUEST,
            "Please enter a valid email address.".to_string(),
        ));
    }

    let user = state
        .session
        .register(NewAccount {
            username: req.username,
            email: email.to_string(),
            password: req.password,
            preferred_language: req.preferred_language,
        })
        .await
        .map_err(auth_error_response)?;
    info!("Registered {}", user.email);
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /auth/guest - Continue without an account
#[utoipa::path(
    post,
    path = "/auth/guest",
    responses((status = 200, description = "Guest session started", body = SessionResponse))
)]
pub async fn guest_handler(State(state): State<Arc<AppState>>) -> Json<SessionResponse> {
    state.session.sign_in_as_guest().await;
    session_response(&state)
}

/// POST /auth/logout - Forget the cached profile and the guest flag
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 200, description = "Signed out", body = SessionResponse))
)]
pub async fn logout_handler(State(state): State<Arc<AppState>>) -> Json<SessionResponse> {
    state.session.sign_out().await;
    state.voice.lock().recognizer.reset();
    session_response(&state)
}

/// GET /auth/me - The current session
#[utoipa::path(
    get,
    path = "/auth/me",
    responses((status = 200, description = "Current session", body = SessionResponse))
)]
pub async fn me_handler(State(state): State<Arc<AppState>>) -> Json<SessionResponse> {
    session_response(&state)
}

/// PUT /auth/preferred-language - Change the signed-in user's native language
#[utoipa::path(
    put,
    path = "/auth/preferred-language",
    request_body = PreferredLanguageRequest,
    responses(
        (status = 200, description = "Language updated", body = UserResponse),
        (status = 400, description = "Not a language code"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn preferred_language_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PreferredLanguageRequest>,
) -> Result<Json<UserResponse>, (StatusCode, String)> {
    let user = state
        .session
        .set_preferred_language(req.language.trim())
        .await
        .map_err(auth_error_response)?;
    Ok(Json(user.into()))
}
