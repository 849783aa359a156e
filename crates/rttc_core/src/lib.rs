pub mod domain;
pub mod error;
pub mod history;
pub mod languages;
pub mod normalize;
pub mod ocr;
pub mod orchestrator;
pub mod phrases;
pub mod ports;
pub mod session;
pub mod speech;

pub use domain::{
    BilingualRecord, ConversationTurn, DayGroup, Detection, HistoryEntry, NewAccount, NewPhrase,
    OcrCapture, OcrRecord, Phrase, PhraseList, SessionState, SpeakerSide, TranslationRecord,
    TranslationResult, User, UserCredentials,
};
pub use error::{AuthError, StoreError};
pub use history::{group_by_day, HistoryStore};
pub use ocr::ImageTranslator;
pub use orchestrator::Orchestrator;
pub use phrases::PhraseStore;
pub use ports::{
    AccountRepository, CredentialVerifier, HistoryRepository, LanguageDetectionService,
    OcrService, PhraseRepository, PortError, PortResult, SessionContext, SessionStorage,
    SpeechToTextService, TextToSpeechService, TranslationService,
};
pub use session::SessionStore;
pub use speech::{RecognitionState, Recognizer, SpeechError, SpeechEvent};
