//! services/app/src/web/rest.rs
//!
//! Contains the Axum handlers for the translation, history, phrase and speech
//! endpoints, and the master definition for the OpenAPI specification.

use crate::web::protocol::{
    AddPhraseRequest, AddPhraseResponse, ConversationTurnRequest, DayGroupResponse,
    FavoriteRequest, HistoryItem, HistoryKind, LanguageResponse, LoginRequest, OcrRequest,
    PhraseListResponse, PhraseQuery, PhraseResponse, PreferredLanguageRequest,
    RegisterRequest, SessionResponse, Side, SpeakRequest, TranslateRequest,
    TranslationResponse, UserResponse, VoiceEventRequest, VoiceStartRequest,
    VoiceStatusResponse,
};
use crate::web::state::AppState;
use crate::web::{auth, voice};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use rttc_core::domain::{ConversationTurn, SpeakerSide, TranslationResult};
use rttc_core::error::StoreError;
use rttc_core::history::group_by_day;
use rttc_core::languages::{is_language_code, locale_for, SUPPORTED_LANGUAGES};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::OpenApi;
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login_handler,
        auth::register_handler,
        auth::guest_handler,
        auth::logout_handler,
        auth::me_handler,
        auth::preferred_language_handler,
        translate_handler,
        list_history_handler,
        delete_history_handler,
        favorite_history_handler,
        conversation_turn_handler,
        conversation_days_handler,
        ocr_handler,
        list_phrases_handler,
        add_phrase_handler,
        delete_phrase_handler,
        speak_handler,
        languages_handler,
        voice::start_handler,
        voice::event_handler,
        voice::transcribe_handler,
        voice::reset_handler,
    ),
    components(
        schemas(
            LoginRequest, RegisterRequest, PreferredLanguageRequest, UserResponse,
            SessionResponse, TranslateRequest, TranslationResponse, HistoryKind, Side,
            HistoryItem, FavoriteRequest, ConversationTurnRequest, DayGroupResponse,
            OcrRequest, PhraseResponse, PhraseListResponse, AddPhraseRequest,
            AddPhraseResponse, SpeakRequest, LanguageResponse, VoiceStartRequest,
            VoiceEventRequest, VoiceStatusResponse
        )
    ),
    tags(
        (name = "Translation Companion API", description = "Local bridge between the mobile UI and the translation core.")
    )
)]
pub struct ApiDoc;

/// GET /api-docs/openapi.json
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

//=========================================================================================
// Shared Helpers
//=========================================================================================

/// Maps a store failure to the status and message shown by the UI.
pub fn store_error_response(e: StoreError) -> (StatusCode, String) {
    let status = match &e {
        StoreError::Validation(_) => StatusCode::BAD_REQUEST,
        StoreError::Detection(_) => StatusCode::BAD_GATEWAY,
        StoreError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

/// Checks a language code supplied by the client.
pub fn checked_language(code: String) -> Result<String, (StatusCode, String)> {
    if is_language_code(&code) {
        Ok(code)
    } else {
        Err((
            StatusCode::BAD_REQUEST,
            format!("'{}' is not a language code", code),
        ))
    }
}

fn require_text(text: &str) -> Result<(), (StatusCode, String)> {
    if text.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Text is required".to_string()));
    }
    Ok(())
}

fn translation_failed() -> (StatusCode, String) {
    (
        StatusCode::BAD_GATEWAY,
        "Could not translate the text. Please try again.".to_string(),
    )
}

fn into_items<E: Into<HistoryItem>>(
    records: Result<Vec<E>, StoreError>,
) -> Result<Vec<HistoryItem>, StoreError> {
    records.map(|records| records.into_iter().map(Into::into).collect())
}

//=========================================================================================
// Translation
//=========================================================================================

/// Translate typed text and record it in the translation history.
#[utoipa::path(
    post,
    path = "/translate",
    request_body = TranslateRequest,
    responses(
        (status = 200, description = "Translated", body = TranslationResponse),
        (status = 400, description = "Blank text or invalid language"),
        (status = 502, description = "Detection or translation failed")
    )
)]
pub async fn translate_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TranslateRequest>,
) -> Result<Json<TranslationResponse>, (StatusCode, String)> {
    require_text(&req.text)?;
    let target = checked_language(state.target_or_default(req.target_language.as_deref()))?;

    let translations = &state.translations;
    let result = state
        .orchestrator
        .translate_and_record(&req.text, &target, |result| async move {
            // The store logs and keeps its own failure.
            let _ = translations.save(result).await;
        })
        .await
        .ok_or_else(translation_failed)?;
    Ok(Json(result.into()))
}

//=========================================================================================
// History
//=========================================================================================

/// List one history, favorites first, then newest first.
#[utoipa::path(
    get,
    path = "/history/{kind}",
    params(("kind" = HistoryKind, Path, description = "translations, conversations or ocr")),
    responses(
        (status = 200, description = "History records", body = [HistoryItem]),
        (status = 500, description = "Backend failure")
    )
)]
pub async fn list_history_handler(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<HistoryKind>,
) -> Result<Json<Vec<HistoryItem>>, (StatusCode, String)> {
    let items = match kind {
        HistoryKind::Translations => into_items(state.translations.list().await),
        HistoryKind::Conversations => into_items(state.conversations.list().await),
        HistoryKind::Ocr => into_items(state.ocr_history.list().await),
    }
    .map_err(store_error_response)?;
    Ok(Json(items))
}

/// Delete one history record owned by the current user.
#[utoipa::path(
    delete,
    path = "/history/{kind}/{id}",
    params(
        ("kind" = HistoryKind, Path, description = "translations, conversations or ocr"),
        ("id" = Uuid, Path, description = "The record to delete")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 500, description = "Backend failure")
    )
)]
pub async fn delete_history_handler(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(HistoryKind, Uuid)>,
) -> Result<StatusCode, (StatusCode, String)> {
    match kind {
        HistoryKind::Translations => state.translations.remove(id).await,
        HistoryKind::Conversations => state.conversations.remove(id).await,
        HistoryKind::Ocr => state.ocr_history.remove(id).await,
    }
    .map_err(store_error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Set or clear the favorite flag of one history record.
#[utoipa::path(
    put,
    path = "/history/{kind}/{id}/favorite",
    params(
        ("kind" = HistoryKind, Path, description = "translations, conversations or ocr"),
        ("id" = Uuid, Path, description = "The record to update")
    ),
    request_body = FavoriteRequest,
    responses(
        (status = 204, description = "Updated"),
        (status = 500, description = "Backend failure")
    )
)]
pub async fn favorite_history_handler(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(HistoryKind, Uuid)>,
    Json(req): Json<FavoriteRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    match kind {
        HistoryKind::Translations => state.translations.set_favorite(id, req.is_favorite).await,
        HistoryKind::Conversations => state.conversations.set_favorite(id, req.is_favorite).await,
        HistoryKind::Ocr => state.ocr_history.set_favorite(id, req.is_favorite).await,
    }
    .map_err(store_error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Conversation
//=========================================================================================

/// Translate one conversation turn and record which side spoke it.
#[utoipa::path(
    post,
    path = "/conversation/turns",
    request_body = ConversationTurnRequest,
    responses(
        (status = 200, description = "Translated", body = TranslationResponse),
        (status = 400, description = "Blank text or invalid language"),
        (status = 502, description = "Detection or translation failed")
    )
)]
pub async fn conversation_turn_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConversationTurnRequest>,
) -> Result<Json<TranslationResponse>, (StatusCode, String)> {
    require_text(&req.text)?;
    let target = checked_language(req.target_language.trim().to_string())?;
    let result = translate_turn(&state, &req.text, &target, req.speaker_side.into())
        .await
        .ok_or_else(translation_failed)?;
    Ok(Json(result.into()))
}

/// Runs the orchestrator for one side of a conversation and stores the turn.
pub async fn translate_turn(
    state: &AppState,
    text: &str,
    target: &str,
    speaker_side: SpeakerSide,
) -> Option<TranslationResult> {
    let conversations = &state.conversations;
    state
        .orchestrator
        .translate_and_record(text, target, |result| async move {
            let _ = conversations
                .save(ConversationTurn {
                    result,
                    speaker_side,
                })
                .await;
        })
        .await
}

/// The conversation history grouped by calendar day, most recent day first.
#[utoipa::path(
    get,
    path = "/conversation/days",
    responses(
        (status = 200, description = "Turns grouped by day", body = [DayGroupResponse]),
        (status = 500, description = "Backend failure")
    )
)]
pub async fn conversation_days_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DayGroupResponse>>, (StatusCode, String)> {
    let records = state
        .conversations
        .list()
        .await
        .map_err(store_error_response)?;
    let days = group_by_day(&records)
        .into_iter()
        .map(|day| DayGroupResponse {
            date: day.date,
            records: day.records.into_iter().map(Into::into).collect(),
        })
        .collect();
    Ok(Json(days))
}

//=========================================================================================
// OCR
//=========================================================================================

/// Read the text in a picture, translate it and record the capture.
#[utoipa::path(
    post,
    path = "/ocr/translate",
    request_body = OcrRequest,
    responses(
        (status = 200, description = "Translated", body = TranslationResponse),
        (status = 400, description = "Missing image or invalid language"),
        (status = 502, description = "OCR or translation failed"),
        (status = 503, description = "OCR is not configured")
    )
)]
pub async fn ocr_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<OcrRequest>,
) -> Result<Json<TranslationResponse>, (StatusCode, String)> {
    let images = state.images.as_ref().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "Image translation is not configured.".to_string(),
        )
    })?;
    if req.image_url.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "An image is required".to_string()));
    }
    let target = checked_language(state.target_or_default(req.target_language.as_deref()))?;

    let result = images
        .run(req.image_url.trim(), &target)
        .await
        .ok_or_else(|| {
            (
                StatusCode::BAD_GATEWAY,
                "No text could be read and translated from this image.".to_string(),
            )
        })?;
    Ok(Json(result.into()))
}

//=========================================================================================
// Phrases
//=========================================================================================

/// Generic and personal phrases in one language.
#[utoipa::path(
    get,
    path = "/phrases",
    params(PhraseQuery),
    responses(
        (status = 200, description = "Phrases", body = PhraseListResponse),
        (status = 400, description = "Invalid language"),
        (status = 500, description = "Backend failure")
    )
)]
pub async fn list_phrases_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PhraseQuery>,
) -> Result<Json<PhraseListResponse>, (StatusCode, String)> {
    let language = checked_language(state.target_or_default(query.language.as_deref()))?;
    let phrases = state
        .phrases
        .list(&language)
        .await
        .map_err(store_error_response)?;
    Ok(Json(PhraseListResponse {
        language,
        user_phrases: phrases.user_phrases.into_iter().map(Into::into).collect(),
        generic_phrases: phrases.generic_phrases.into_iter().map(Into::into).collect(),
    }))
}

/// Add a personal phrase. Its language is detected.
#[utoipa::path(
    post,
    path = "/phrases",
    request_body = AddPhraseRequest,
    responses(
        (status = 201, description = "Added", body = AddPhraseResponse),
        (status = 200, description = "Guest session, nothing saved", body = AddPhraseResponse),
        (status = 400, description = "Blank text"),
        (status = 502, description = "Language detection failed")
    )
)]
pub async fn add_phrase_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddPhraseRequest>,
) -> Result<(StatusCode, Json<AddPhraseResponse>), (StatusCode, String)> {
    let language = state
        .phrases
        .add(&req.text, req.category.as_deref())
        .await
        .map_err(store_error_response)?;
    let status = if language.is_some() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(AddPhraseResponse { language })))
}

/// Delete a personal phrase.
#[utoipa::path(
    delete,
    path = "/phrases/{id}",
    params(("id" = Uuid, Path, description = "The phrase to delete")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Generic phrases cannot be deleted"),
        (status = 500, description = "Backend failure")
    )
)]
pub async fn delete_phrase_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .phrases
        .remove(id)
        .await
        .map_err(store_error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Speech & Languages
//=========================================================================================

/// Read a text aloud in the locale of its language.
#[utoipa::path(
    post,
    path = "/speak",
    request_body = SpeakRequest,
    responses(
        (status = 200, description = "MP3 audio", body = Vec<u8>, content_type = "audio/mpeg"),
        (status = 400, description = "Blank text"),
        (status = 502, description = "Speech synthesis failed"),
        (status = 503, description = "Speech synthesis is not configured")
    )
)]
pub async fn speak_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SpeakRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let tts = state.tts.as_ref().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "Speech synthesis is not configured.".to_string(),
        )
    })?;
    require_text(&req.text)?;

    let locale = locale_for(&req.language);
    info!("Speaking {} characters in {}", req.text.len(), locale);
    let audio = tts.synthesize(&req.text, locale).await.map_err(|e| {
        error!("Speech synthesis failed: {}", e);
        (
            StatusCode::BAD_GATEWAY,
            "Could not play the translation.".to_string(),
        )
    })?;
    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], audio))
}

/// The languages offered by the pickers.
#[utoipa::path(
    get,
    path = "/languages",
    responses((status = 200, description = "Supported languages", body = [LanguageResponse]))
)]
pub async fn languages_handler() -> Json<Vec<LanguageResponse>> {
    Json(SUPPORTED_LANGUAGES.iter().map(Into::into).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_store_errors_to_statuses() {
        assert_eq!(
            store_error_response(StoreError::Validation("Text is required".to_string())),
            (StatusCode::BAD_REQUEST, "Text is required".to_string())
        );
        assert_eq!(
            store_error_response(StoreError::Persistence("boom".to_string())).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn rejects_malformed_language_codes() {
        assert_eq!(checked_language("fr".to_string()), Ok("fr".to_string()));
        assert_eq!(
            checked_language("French".to_string()).unwrap_err().0,
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn openapi_lists_the_bridge_routes() {
        let doc = ApiDoc::openapi();
        for path in ["/translate", "/history/{kind}", "/phrases", "/voice/event", "/auth/login"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
