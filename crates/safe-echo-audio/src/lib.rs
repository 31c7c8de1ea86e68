#![warn(missing_docs)]
//! # safe-echo-audio
//!
//! ## Purpose
//! Boundary between external speech providers and the decision engine:
//! transcribes audio in a selected language, translates to English, and
//! wraps the text verdict in a content-driven "deepfake" escalation.
//!
//! ## Responsibilities
//! - Define the injectable speech-to-text and translation traits.
//! - Map provider failures to a distinct, non-fatal diagnostic taxonomy.
//! - Escalate scam-positive audio content to a blocked-call alert.
//!
//! ## Data flow
//! Raw audio bytes -> [`SpeechToText`] -> [`Translator`] (non-English only)
//! -> decision engine -> [`AudioAssessment`] with transcript/translation
//! attached to the verdict.
//!
//! ## Ownership and lifetimes
//! Provider implementations are owned trait objects; audio bytes are
//! borrowed and never retained.
//!
//! ## Error model
//! Every [`TranscriptionError`] kind is non-fatal and non-scam: it becomes a
//! diagnostic assessment with no alert. Only the monitoring loop decides
//! which kinds terminate a session.
//!
//! ## Security and privacy notes
//! The **deepfake flag is a heuristic proxy derived purely from content
//! risk**, not signal-level audio forensics. It is deliberately isolated in
//! this crate so a real forensics component can replace it without touching
//! the decision engine contract.

use safe_echo_core::{Alert, AlertStatus, AlertType, CallerContext, RiskLevel};
use safe_echo_engine::{AlertReceipt, Classification, GuardianEngine};
use thiserror::Error;
use time::OffsetDateTime;
use url::Url;

/// Fixed deepfake confidence when audio content is scam-positive.
pub const DEEPFAKE_CONFIDENCE: u8 = 88;

/// Fixed deepfake confidence for benign audio content.
pub const NATURAL_AUDIO_CONFIDENCE: u8 = 10;

/// Languages the monitoring surface offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    /// English; transcripts skip translation.
    English,
    /// Hindi.
    Hindi,
    /// Marathi.
    Marathi,
}

impl Language {
    /// Returns the provider locale code for this language.
    pub fn locale(&self) -> &'static str {
        match self {
            Language::English => "en-US",
            Language::Hindi => "hi-IN",
            Language::Marathi => "mr-IN",
        }
    }

}

/// Speech-to-text provider boundary.
pub trait SpeechToText: Send + Sync {
    /// Transcribes one audio phrase in the given provider locale.
    ///
    /// # Errors
    /// Returns a [`TranscriptionError`] kind matching the failure mode.
    fn transcribe(&self, audio: &[u8], locale: &str) -> Result<String, TranscriptionError>;
}

/// Translation provider boundary.
pub trait Translator: Send + Sync {
    /// Translates text of any source language to English.
    ///
    /// # Errors
    /// Returns [`TranscriptionError::Request`] on provider failure.
    fn translate_to_english(&self, text: &str) -> Result<String, TranscriptionError>;
}

/// Provider failure taxonomy; each kind carries a caller-facing diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscriptionError {
    /// No intelligible speech in the phrase.
    #[error("Could not understand audio. Please speak clearly.")]
    Unintelligible,
    /// Provider request/connectivity failure.
    #[error("Speech service error (check internet): {0}")]
    Request(String),
    /// Audio bytes are not a supported format.
    #[error("Audio format error: {0}")]
    Format(String),
}

/// Validates a hosted speech provider endpoint.
///
/// Same policy the rest of the system applies to remote endpoints: must be a
/// parseable HTTPS URL.
///
/// # Errors
/// Returns [`TranscriptionError::Request`] for unparseable or non-HTTPS URLs.
pub fn validate_provider_endpoint(endpoint: &str) -> Result<(), TranscriptionError> {
    let parsed = Url::parse(endpoint)
        .map_err(|error| TranscriptionError::Request(format!("invalid endpoint url: {error}")))?;

    if parsed.scheme() != "https" {
        return Err(TranscriptionError::Request(
            "speech endpoint must use https".to_string(),
        ));
    }

    Ok(())
}

/// Outcome of one audio classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioAssessment {
    /// Content-driven deepfake heuristic; `true` only for scam content.
    pub is_deepfake: bool,
    /// Deepfake confidence (fixed per branch, not a measurement).
    pub confidence: u8,
    /// Human-readable outcome or diagnostic text.
    pub reason: String,
    /// Text classification of the transcribed content, absent when
    /// transcription failed.
    pub content: Option<Classification>,
    /// Escalation alert emitted for scam-positive audio.
    pub alert: Option<AlertReceipt>,
    /// The transcription failure that produced a diagnostic-only assessment.
    pub transcription_error: Option<TranscriptionError>,
}

/// Adapter that feeds transcribed audio into the decision engine.
pub struct AudioMonitor {
    engine: GuardianEngine,
    speech: Box<dyn SpeechToText>,
    translator: Box<dyn Translator>,
}

impl AudioMonitor {
    /// Wires the adapter to an engine and provider implementations.
    pub fn new(
        engine: GuardianEngine,
        speech: Box<dyn SpeechToText>,
        translator: Box<dyn Translator>,
    ) -> Self {
        Self {
            engine,
            speech,
            translator,
        }
    }

    /// Returns the wrapped decision engine, for direct text classification.
    pub fn engine(&self) -> &GuardianEngine {
        &self.engine
    }

    /// Transcribes one phrase and returns `(original, english)`.
    ///
    /// English input skips the translation provider, so both strings are
    /// identical.
    ///
    /// # Errors
    /// Propagates provider failures as [`TranscriptionError`].
    pub fn transcribe_and_translate(
        &self,
        audio: &[u8],
        language: Language,
    ) -> Result<(String, String), TranscriptionError> {
        let original = self.speech.transcribe(audio, language.locale())?;

        if language == Language::English {
            return Ok((original.clone(), original));
        }

        let english = self.translator.translate_to_english(&original)?;
        Ok((original, english))
    }

    /// Classifies one audio phrase end to end.
    ///
    /// Transcription failures yield a diagnostic, non-scam assessment with no
    /// alert. Scam-positive content escalates to `is_deepfake = true` and a
    /// High/Blocked audio-call alert; that flag is a content heuristic, not
    /// audio forensics.
    pub fn classify_audio(
        &self,
        audio: &[u8],
        language: Language,
        context: CallerContext,
    ) -> AudioAssessment {
        let (original, english) = match self.transcribe_and_translate(audio, language) {
            Ok(texts) => texts,
            Err(error) => {
                return AudioAssessment {
                    is_deepfake: false,
                    confidence: NATURAL_AUDIO_CONFIDENCE,
                    reason: error.to_string(),
                    content: None,
                    alert: None,
                    transcription_error: Some(error),
                };
            }
        };

        let mut classification = self.engine.classify(&english, context);
        classification.verdict = classification
            .verdict
            .with_transcripts(original, english);

        if classification.verdict.is_scam {
            let reason = format!(
                "Scam content detected in audio: {}",
                classification.verdict.reason
            );
            let alert = self.record_block_alert(&reason);
            return AudioAssessment {
                is_deepfake: true,
                confidence: DEEPFAKE_CONFIDENCE,
                reason,
                content: Some(classification),
                alert,
                transcription_error: None,
            };
        }

        AudioAssessment {
            is_deepfake: false,
            confidence: NATURAL_AUDIO_CONFIDENCE,
            reason: "Audio seems natural.".to_string(),
            content: Some(classification),
            alert: None,
            transcription_error: None,
        }
    }

    fn record_block_alert(&self, details: &str) -> Option<AlertReceipt> {
        let at = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let alert = Alert::new(
            AlertType::AudioCall,
            RiskLevel::High,
            AlertStatus::Blocked,
            details,
            at,
        )
        .ok()?;

        let persisted = self.engine.alert_sink().append(&alert).is_ok();
        Some(AlertReceipt { alert, persisted })
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for language mapping and endpoint policy.

    use super::*;

    #[test]
    fn languages_map_to_provider_locales() {
        assert_eq!(Language::English.locale(), "en-US");
        assert_eq!(Language::Hindi.locale(), "hi-IN");
        assert_eq!(Language::Marathi.locale(), "mr-IN");
    }

    #[test]
    fn endpoint_policy_requires_https() {
        validate_provider_endpoint("https://speech.example.test/v1").expect("https should pass");
        assert!(validate_provider_endpoint("http://speech.example.test/v1").is_err());
        assert!(validate_provider_endpoint("not a url").is_err());
    }

    #[test]
    fn error_kinds_carry_distinct_diagnostics() {
        let diagnostics = [
            TranscriptionError::Unintelligible.to_string(),
            TranscriptionError::Request("timeout".to_string()).to_string(),
            TranscriptionError::Format("not wav".to_string()).to_string(),
        ];
        assert_ne!(diagnostics[0], diagnostics[1]);
        assert_ne!(diagnostics[1], diagnostics[2]);
    }
}
