//! services/app/src/web/voice.rs
//!
//! Voice translation endpoints. The device recognizer forwards its events here; a
//! session only translates once it has both ended and produced a transcript.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use rttc_core::domain::SpeakerSide;
use rttc_core::speech::{RecognitionState, SpeechError, SpeechEvent};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::web::protocol::{
    TranscribeQuery, VoiceEventRequest, VoiceStartRequest, VoiceStatusResponse,
};
use crate::web::rest::{checked_language, translate_turn};
use crate::web::state::AppState;

//=========================================================================================
// Helpers
//=========================================================================================

/// Describes a recognizer state that carries no translation.
pub fn describe(state: &RecognitionState) -> VoiceStatusResponse {
    let (name, transcript, error) = match state {
        RecognitionState::Idle => ("idle", None, None),
        RecognitionState::Listening { transcript, .. } => ("listening", transcript.clone(), None),
        RecognitionState::Completed(text) => ("completed", Some(text.clone()), None),
        RecognitionState::Failed(e) => ("failed", None, Some(e.to_string())),
    };
    VoiceStatusResponse {
        state: name.to_string(),
        transcript,
        result: None,
        error,
    }
}

/// Translates a completed session into its history, or describes where it stands.
async fn finish(
    state: &AppState,
    outcome: RecognitionState,
    target: String,
    speaker_side: Option<SpeakerSide>,
) -> VoiceStatusResponse {
    let text = match outcome {
        RecognitionState::Completed(text) => text,
        other => return describe(&other),
    };

    info!("Voice session completed, translating into {}", target);
    let result = match speaker_side {
        Some(side) => translate_turn(state, &text, &target, side).await,
        None => {
            let translations = &state.translations;
            state
                .orchestrator
                .translate_and_record(&text, &target, |result| async move {
                    let _ = translations.save(result).await;
                })
                .await
        }
    };

    let error = result
        .is_none()
        .then(|| "Could not translate what was said. Please try again.".to_string());
    VoiceStatusResponse {
        state: "completed".to_string(),
        transcript: Some(text),
        result: result.map(Into::into),
        error,
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Open a recognition session.
#[utoipa::path(
    post,
    path = "/voice/start",
    request_body = VoiceStartRequest,
    responses(
        (status = 200, description = "Listening", body = VoiceStatusResponse),
        (status = 400, description = "Invalid language"),
        (status = 409, description = "A session is already running")
    )
)]
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VoiceStartRequest>,
) -> Result<Json<VoiceStatusResponse>, (StatusCode, String)> {
    let target = checked_language(state.target_or_default(req.target_language.as_deref()))?;

    let mut voice = state.voice.lock();
    voice.recognizer.start().map_err(|e| {
        let status = if e == SpeechError::AlreadyListening {
            StatusCode::CONFLICT
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, e.to_string())
    })?;
    voice.target_language = target;
    voice.speaker_side = req.speaker_side.map(Into::into);
    debug!("Voice session started for {}", voice.target_language);
    Ok(Json(describe(voice.recognizer.state())))
}

/// Feed one recognizer event. `end` triggers the translation.
#[utoipa::path(
    post,
    path = "/voice/event",
    request_body = VoiceEventRequest,
    responses((status = 200, description = "Session status", body = VoiceStatusResponse))
)]
pub async fn event_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VoiceEventRequest>,
) -> Json<VoiceStatusResponse> {
    let (outcome, target, side) = {
        let mut voice = state.voice.lock();
        let outcome = voice.recognizer.handle(req.into()).cloned();
        match outcome {
            Some(outcome) => (outcome, voice.target_language.clone(), voice.speaker_side),
            None => return Json(describe(voice.recognizer.state())),
        }
    };
    Json(finish(&state, outcome, target, side).await)
}

/// Transcribe a recorded PCM16 clip server-side and translate it.
#[utoipa::path(
    post,
    path = "/voice/transcribe",
    params(TranscribeQuery),
    request_body(content = Vec<u8>, content_type = "application/octet-stream", description = "Mono PCM16 audio at 16 kHz."),
    responses(
        (status = 200, description = "Session status", body = VoiceStatusResponse),
        (status = 400, description = "No audio or invalid language"),
        (status = 503, description = "Speech recognition is not configured")
    )
)]
pub async fn transcribe_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TranscribeQuery>,
    audio: Bytes,
) -> Result<Json<VoiceStatusResponse>, (StatusCode, String)> {
    let stt = state.stt.clone().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "Speech recognition is not configured.".to_string(),
        )
    })?;
    if audio.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "No audio was recorded.".to_string()));
    }
    let requested_target = match query.target_language.as_deref() {
        Some(target) => Some(checked_language(target.trim().to_string())?),
        None => None,
    };
    let default_target = state.session.preferred_language();

    {
        let mut voice = state.voice.lock();
        if !voice.recognizer.is_listening() {
            voice.recognizer.start().map_err(|e| (StatusCode::CONFLICT, e.to_string()))?;
            voice.target_language = default_target;
            voice.speaker_side = None;
        }
        if let Some(target) = requested_target {
            voice.target_language = target;
        }
    }

    let events = match stt.transcribe(&audio, query.language.as_deref()).await {
        Ok(transcript) => vec![
            SpeechEvent::Result {
                transcript,
                is_final: true,
            },
            SpeechEvent::End,
        ],
        Err(e) => {
            warn!("Transcription failed: {}", e);
            vec![SpeechEvent::Error(e.to_string())]
        }
    };

    let (outcome, target, side) = {
        let mut voice = state.voice.lock();
        let mut outcome = None;
        for event in events {
            if let Some(terminal) = voice.recognizer.handle(event) {
                outcome = Some(terminal.clone());
            }
        }
        let outcome = outcome.unwrap_or_else(|| voice.recognizer.state().clone());
        (outcome, voice.target_language.clone(), voice.speaker_side)
    };
    Ok(Json(finish(&state, outcome, target, side).await))
}

/// Abandon the current session.
#[utoipa::path(
    post,
    path = "/voice/reset",
    responses((status = 200, description = "Idle", body = VoiceStatusResponse))
)]
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Json<VoiceStatusResponse> {
    let mut voice = state.voice.lock();
    voice.recognizer.reset();
    Json(describe(voice.recognizer.state()))
}
