//! crates/rttc_core/src/speech.rs
//!
//! State machine for one speech-recognition session.
//!
//! The recognizer reports transcripts and the end of the session as two independent
//! signals. Translation must only start once both are known, so the machine joins
//! them: a session completes on `End`, carrying the latest transcript seen.

use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpeechError {
    #[error("No speech was recognized.")]
    NoSpeech,
    #[error("Speech recognition error: {0}")]
    Recognizer(String),
    #[error("A recognition session is already running.")]
    AlreadyListening,
}

/// Events delivered by the device recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    Result { transcript: String, is_final: bool },
    End,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecognitionState {
    #[default]
    Idle,
    Listening {
        transcript: Option<String>,
        is_final: bool,
    },
    Completed(String),
    Failed(SpeechError),
}

/// One recognition session: `Idle → Listening → {Completed, Failed}`.
#[derive(Debug, Default)]
pub struct Recognizer {
    state: RecognitionState,
}

impl Recognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RecognitionState {
        &self.state
    }

    pub fn is_listening(&self) -> bool {
        matches!(self.state, RecognitionState::Listening { .. })
    }

    /// Opens a session. A previous terminal state is discarded.
    pub fn start(&mut self) -> Result<(), SpeechError> {
        if self.is_listening() {
            return Err(SpeechError::AlreadyListening);
        }
        self.state = RecognitionState::Listening {
            transcript: None,
            is_final: false,
        };
        Ok(())
    }

    /// Feeds one event. Returns the terminal state when this event produced it.
    ///
    /// Events outside a listening session are ignored, which also drops stray results
    /// that arrive after `End`.
    pub fn handle(&mut self, event: SpeechEvent) -> Option<&RecognitionState> {
        let RecognitionState::Listening {
            transcript,
            is_final,
        } = &mut self.state
        else {
            debug!("Ignoring {:?} outside a listening session", event);
            return None;
        };

        match event {
            SpeechEvent::Result {
                transcript: text,
                is_final: final_result,
            } => {
                // A late interim result must not overwrite a final one.
                if *is_final && !final_result {
                    return None;
                }
                *transcript = Some(text);
                *is_final = final_result;
                None
            }
            SpeechEvent::End => {
                self.state = match transcript.take().filter(|text| !text.trim().is_empty()) {
                    Some(text) => RecognitionState::Completed(text.trim().to_string()),
                    None => RecognitionState::Failed(SpeechError::NoSpeech),
                };
                Some(&self.state)
            }
            SpeechEvent::Error(message) => {
                self.state = RecognitionState::Failed(SpeechError::Recognizer(message));
                Some(&self.state)
            }
        }
    }

    /// Returns to `Idle`, dropping any partial transcript.
    pub fn reset(&mut self) {
        self.state = RecognitionState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn result(text: &str, is_final: bool) -> SpeechEvent {
        SpeechEvent::Result {
            transcript: text.to_string(),
            is_final,
        }
    }

    #[test]
    fn completes_with_latest_transcript_on_end() {
        let mut recognizer = Recognizer::new();
        recognizer.start().unwrap();
        assert_eq!(recognizer.handle(result("Onde", false)), None);
        assert_eq!(recognizer.handle(result("Onde fica a praia?", true)), None);
        assert_eq!(
            recognizer.handle(SpeechEvent::End),
            Some(&RecognitionState::Completed("Onde fica a praia?".to_string()))
        );
        assert_eq!(
            recognizer.state(),
            &RecognitionState::Completed("Onde fica a praia?".to_string())
        );
    }

    #[test]
    fn late_interim_result_does_not_replace_final_one() {
        let mut recognizer = Recognizer::new();
        recognizer.start().unwrap();
        recognizer.handle(result("Bom dia", true));
        recognizer.handle(result("Bom", false));
        recognizer.handle(SpeechEvent::End);
        assert_eq!(
            recognizer.state(),
            &RecognitionState::Completed("Bom dia".to_string())
        );
    }

    #[test]
    fn end_without_speech_fails() {
        let mut recognizer = Recognizer::new();
        recognizer.start().unwrap();
        recognizer.handle(result("   ", false));
        assert_eq!(
            recognizer.handle(SpeechEvent::End),
            Some(&RecognitionState::Failed(SpeechError::NoSpeech))
        );
    }

    #[test]
    fn events_after_terminal_state_are_ignored() {
        let mut recognizer = Recognizer::new();
        recognizer.start().unwrap();
        recognizer.handle(SpeechEvent::Error("network".to_string()));
        assert_eq!(recognizer.handle(result("late", true)), None);
        assert_eq!(
            recognizer.state(),
            &RecognitionState::Failed(SpeechError::Recognizer("network".to_string()))
        );
    }

    #[test]
    fn cannot_start_twice() {
        let mut recognizer = Recognizer::new();
        recognizer.start().unwrap();
        assert_eq!(recognizer.start(), Err(SpeechError::AlreadyListening));
    }
}
