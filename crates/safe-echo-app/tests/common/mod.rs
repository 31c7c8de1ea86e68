//! Shared fixtures for app integration tests.

use std::collections::VecDeque;
use std::sync::Arc;

use safe_echo_app::{AppError, PhraseSource};
use safe_echo_audio::{AudioMonitor, SpeechToText, TranscriptionError, Translator};
use safe_echo_classifier::FixedClassifier;
use safe_echo_engine::GuardianEngine;
use safe_echo_store::MemoryStore;

/// Builds an engine over a shared in-memory store, optionally with a
/// fixed-probability classifier.
#[allow(dead_code)]
pub fn engine_with_store(probability: Option<f64>) -> (GuardianEngine, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let classifier = probability
        .map(|p| Arc::new(FixedClassifier::new(p)) as Arc<dyn safe_echo_classifier::TextClassifier>);
    let engine = GuardianEngine::new(classifier, store.clone());
    (engine, store)
}

/// Speech backend that decodes audio bytes as UTF-8 "transcripts", or fails
/// with a scripted error.
#[allow(dead_code)]
pub struct StubSpeech {
    pub failure: Option<TranscriptionError>,
}

impl SpeechToText for StubSpeech {
    fn transcribe(&self, audio: &[u8], _locale: &str) -> Result<String, TranscriptionError> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        String::from_utf8(audio.to_vec())
            .map_err(|error| TranscriptionError::Format(error.to_string()))
    }
}

/// Translator that marks its output so tests can observe the call.
#[allow(dead_code)]
pub struct MarkingTranslator;

impl Translator for MarkingTranslator {
    fn translate_to_english(&self, text: &str) -> Result<String, TranscriptionError> {
        Ok(format!("{text} [en]"))
    }
}

/// Builds an audio monitor over a shared store with pass-through speech.
#[allow(dead_code)]
pub fn monitor_with_store(probability: Option<f64>) -> (AudioMonitor, Arc<MemoryStore>) {
    let (engine, store) = engine_with_store(probability);
    let monitor = AudioMonitor::new(
        engine,
        Box::new(StubSpeech { failure: None }),
        Box::new(MarkingTranslator),
    );
    (monitor, store)
}

/// Scripted phrase source: yields prepared phrases, then drains.
#[allow(dead_code)]
pub struct ScriptedSource {
    pub phrases: VecDeque<Vec<u8>>,
    pub fail_after_drain: bool,
}

impl ScriptedSource {
    #[allow(dead_code)]
    pub fn of(texts: &[&str]) -> Self {
        Self {
            phrases: texts.iter().map(|text| text.as_bytes().to_vec()).collect(),
            fail_after_drain: false,
        }
    }
}

impl PhraseSource for ScriptedSource {
    fn next_phrase(&mut self) -> Result<Option<Vec<u8>>, AppError> {
        match self.phrases.pop_front() {
            Some(phrase) => Ok(Some(phrase)),
            None if self.fail_after_drain => {
                Err(AppError::AudioSource("microphone disconnected".to_string()))
            }
            None => Ok(None),
        }
    }
}
