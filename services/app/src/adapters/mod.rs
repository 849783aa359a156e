pub mod credentials;
pub mod db;
pub mod ocr;
pub mod rapidapi;
pub mod session_file;
pub mod sst;
pub mod tts;

pub use credentials::Argon2Verifier;
pub use db::DbAdapter;
pub use ocr::OpenAiOcrAdapter;
pub use rapidapi::RapidApiTranslateAdapter;
pub use session_file::FileSessionStorage;
pub use sst::OpenAiSstAdapter;
pub use tts::OpenAiTtsAdapter;
