//! services/app/src/web/state.rs
//!
//! Defines the bridge's shared state: the core stores wired to their adapters, and the
//! one voice session the device can run at a time.

use std::sync::Arc;

use parking_lot::Mutex;
use rttc_core::domain::{BilingualRecord, OcrRecord, SpeakerSide, TranslationRecord};
use rttc_core::ports::{
    AccountRepository, CredentialVerifier, HistoryRepository, LanguageDetectionService,
    OcrService, PhraseRepository, SessionContext, SessionStorage, SpeechToTextService,
    TextToSpeechService, TranslationService,
};
use rttc_core::speech::Recognizer;
use rttc_core::{HistoryStore, ImageTranslator, Orchestrator, PhraseStore, SessionStore};

use crate::config::Config;

//=========================================================================================
// Services (the adapters behind every port)
//=========================================================================================

/// Every port implementation the bridge needs. The OpenAI-backed ones are optional.
pub struct Services {
    pub accounts: Arc<dyn AccountRepository>,
    pub translations: Arc<dyn HistoryRepository<TranslationRecord>>,
    pub conversations: Arc<dyn HistoryRepository<BilingualRecord>>,
    pub ocr_history: Arc<dyn HistoryRepository<OcrRecord>>,
    pub phrases: Arc<dyn PhraseRepository>,
    pub session_storage: Arc<dyn SessionStorage>,
    pub verifier: Arc<dyn CredentialVerifier>,
    pub detector: Arc<dyn LanguageDetectionService>,
    pub translator: Arc<dyn TranslationService>,
    pub ocr: Option<Arc<dyn OcrService>>,
    pub stt: Option<Arc<dyn SpeechToTextService>>,
    pub tts: Option<Arc<dyn TextToSpeechService>>,
}

//=========================================================================================
// VoiceSession (the microphone)
//=========================================================================================

/// The recognizer plus where its result goes once it completes.
#[derive(Debug)]
pub struct VoiceSession {
    pub recognizer: Recognizer,
    pub target_language: String,
    /// `Some` when the recording is a conversation turn.
    pub speaker_side: Option<SpeakerSide>,
}

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub config: Arc<Config>,
    pub session: Arc<SessionStore>,
    pub orchestrator: Orchestrator,
    pub translations: Arc<HistoryStore<TranslationRecord>>,
    pub conversations: Arc<HistoryStore<BilingualRecord>>,
    pub ocr_history: Arc<HistoryStore<OcrRecord>>,
    pub phrases: PhraseStore,
    pub images: Option<ImageTranslator>,
    pub stt: Option<Arc<dyn SpeechToTextService>>,
    pub tts: Option<Arc<dyn TextToSpeechService>>,
    pub voice: Mutex<VoiceSession>,
}

impl AppState {
    /// Wires the core stores to the given adapters. The session starts unauthenticated;
    /// call `SessionStore::restore_session` before serving requests.
    pub fn new(config: Arc<Config>, services: Services) -> Self {
        let session = Arc::new(SessionStore::new(
            services.accounts,
            services.session_storage,
            services.verifier,
            config.default_language.clone(),
        ));
        let context: Arc<dyn SessionContext> = session.clone();

        let orchestrator = Orchestrator::new(services.detector.clone(), services.translator);
        let translations = Arc::new(HistoryStore::new(
            "translation",
            context.clone(),
            services.translations,
        ));
        let conversations = Arc::new(HistoryStore::new(
            "conversation",
            context.clone(),
            services.conversations,
        ));
        let ocr_history = Arc::new(HistoryStore::new(
            "ocr",
            context.clone(),
            services.ocr_history,
        ));
        let phrases = PhraseStore::new(context, services.phrases, services.detector);
        let images = services
            .ocr
            .map(|ocr| ImageTranslator::new(ocr, orchestrator.clone(), ocr_history.clone()));

        let voice = Mutex::new(VoiceSession {
            recognizer: Recognizer::new(),
            target_language: config.default_language.clone(),
            speaker_side: None,
        });

        Self {
            config,
            session,
            orchestrator,
            translations,
            conversations,
            ocr_history,
            phrases,
            images,
            stt: services.stt,
            tts: services.tts,
            voice,
        }
    }

    /// The language to translate into when a request names none.
    pub fn target_or_default(&self, requested: Option<&str>) -> String {
        requested
            .map(str::trim)
            .filter(|language| !language.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.session.preferred_language())
    }
}
