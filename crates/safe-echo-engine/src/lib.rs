#![warn(missing_docs)]
//! # safe-echo-engine
//!
//! ## Purpose
//! Combines the probabilistic classifier, the threshold policy, and the
//! deterministic rule engine into a single verdict per input.
//!
//! ## Responsibilities
//! - Select the classifier decision threshold from caller trust context.
//! - Blend model probability with categorized explanations.
//! - Run the keyword fallback cascade when the model is absent, errored, or
//!   undecided.
//! - Emit at most one alert per classification, with the risk/status pair
//!   owned by the branch that fired.
//!
//! ## Data flow
//! Text + [`CallerContext`] -> threshold policy -> model probability ->
//! explanation lookup / keyword fallback -> [`Classification`] (+ optional
//! persisted alert).
//!
//! ## Ownership and lifetimes
//! The engine owns its collaborators behind `Arc` trait objects injected at
//! construction time; there is no process-wide mutable classifier state.
//!
//! ## Error model
//! `classify` is infallible by contract. Classifier and persistence failures
//! are caught, logged through [`EventLog`], and converted into degraded
//! outcomes; a failed append is visible only as
//! [`AlertReceipt::persisted`]` == false`.
//!
//! ## Security and privacy notes
//! Log lines carry error text and branch names, never the scanned input.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use safe_echo_core::CallerContext;
//! use safe_echo_engine::GuardianEngine;
//! use safe_echo_store::MemoryStore;
//!
//! let engine = GuardianEngine::new(None, Arc::new(MemoryStore::new()));
//! let outcome = engine.classify("Your OTP is required", CallerContext::unknown_sender());
//! assert!(outcome.verdict.is_scam);
//! ```

use std::sync::Arc;

use safe_echo_classifier::TextClassifier;
use safe_echo_core::{Alert, AlertStatus, AlertType, CallerContext, RiskLevel, Verdict};
use safe_echo_store::AlertSink;
use time::OffsetDateTime;

/// Classifier probability cutoff for unknown senders; favors recall.
pub const UNKNOWN_SENDER_THRESHOLD: f64 = 0.40;

/// Classifier probability cutoff for saved contacts.
///
/// Trusted senders tolerate more false negatives to avoid alert fatigue, so
/// the bar is raised sharply.
pub const SAVED_CONTACT_THRESHOLD: f64 = 0.85;

/// Fixed confidence for keyword fallback flags.
pub const KEYWORD_CONFIDENCE: u8 = 85;

/// Fixed confidence for the short-text greeting override.
pub const GREETING_CONFIDENCE: u8 = 90;

/// Fixed confidence when nothing matched at all.
pub const NO_MATCH_CONFIDENCE: u8 = 95;

/// Word count at or below which an unexplained model flag is treated as a
/// false positive on a greeting.
pub const SHORT_TEXT_WORD_LIMIT: usize = 3;

const MODEL_PATTERN_REASON: &str =
    "AI warning: this message has patterns seen in scams. Proceed with caution.";
const SAFE_GREETING_REASON: &str = "Safe: looks like a normal greeting.";
const SAFE_CONVERSATION_REASON: &str =
    "Safe: this message looks like a normal conversation.";

/// Maps caller trust context to the classifier decision threshold.
///
/// Pure function; raising trust never lowers the threshold.
pub fn scam_threshold(context: CallerContext) -> f64 {
    if context.is_saved_contact {
        SAVED_CONTACT_THRESHOLD
    } else {
        UNKNOWN_SENDER_THRESHOLD
    }
}

/// Structured event sink for engine observability.
///
/// Implemented by the app run logger; the engine never writes to stdio.
pub trait EventLog: Send + Sync {
    /// Records one pipe-style log event.
    fn record(&self, level: &str, stage: &str, action: &str, detail: &str);
}

/// Event sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLog;

impl EventLog for NoopLog {
    fn record(&self, _level: &str, _stage: &str, _action: &str, _detail: &str) {}
}

/// Engine behavior switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// When `true` (default, matching observed source behavior), a
    /// below-threshold model decision still runs the keyword fallback, so a
    /// keyword match can override a negative model decision. When `false`,
    /// a negative model decision returns a safe verdict immediately.
    pub keyword_fallback_on_negative: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            keyword_fallback_on_negative: true,
        }
    }
}

/// Receipt for one emitted alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertReceipt {
    /// The alert record that was (or should have been) persisted.
    pub alert: Alert,
    /// `false` when the store rejected the append; the verdict still stands.
    pub persisted: bool,
}

/// Outcome of one classification call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// The verdict returned to the caller.
    pub verdict: Verdict,
    /// The alert emitted by the branch that fired, if any.
    pub alert: Option<AlertReceipt>,
}

impl Classification {
    fn clean(verdict: Verdict) -> Self {
        Self {
            verdict,
            alert: None,
        }
    }
}

/// The decision engine.
///
/// Construction injects every collaborator explicitly; the classifier is
/// optional so a missing or corrupt artifact degrades to rule-only mode.
pub struct GuardianEngine {
    classifier: Option<Arc<dyn TextClassifier>>,
    alerts: Arc<dyn AlertSink>,
    log: Arc<dyn EventLog>,
    config: EngineConfig,
}

impl std::fmt::Debug for GuardianEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardianEngine")
            .field("classifier", &self.classifier.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GuardianEngine {
    /// Creates an engine with default config and no log sink.
    pub fn new(classifier: Option<Arc<dyn TextClassifier>>, alerts: Arc<dyn AlertSink>) -> Self {
        Self {
            classifier,
            alerts,
            log: Arc::new(NoopLog),
            config: EngineConfig::default(),
        }
    }

    /// Replaces the event log sink.
    pub fn with_log(mut self, log: Arc<dyn EventLog>) -> Self {
        self.log = log;
        self
    }

    /// Replaces the behavior config.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns `true` when a classifier backend is wired in.
    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    /// Returns a shared handle to the alert sink, for layers (audio
    /// escalation) that emit their own alerts.
    pub fn alert_sink(&self) -> Arc<dyn AlertSink> {
        Arc::clone(&self.alerts)
    }

    /// Classifies one text input.
    ///
    /// Infallible: classifier errors degrade to the keyword fallback, empty
    /// input takes the no-match path, and persistence failures surface only
    /// through [`AlertReceipt::persisted`]. At most one alert is emitted.
    pub fn classify(&self, text: &str, context: CallerContext) -> Classification {
        let threshold = scam_threshold(context);

        if let Some(classifier) = &self.classifier {
            match classifier.probability_of_scam(text) {
                Ok(probability) if probability > threshold => {
                    return self.flag_from_model(text, probability);
                }
                Ok(probability) => {
                    if !self.config.keyword_fallback_on_negative {
                        let confidence =
                            ((1.0 - probability) * 100.0).round().clamp(0.0, 100.0) as u8;
                        return Classification::clean(Verdict::safe(
                            SAFE_CONVERSATION_REASON,
                            confidence,
                        ));
                    }
                    // Below-threshold decisions intentionally fall through to
                    // the keyword fallback; see EngineConfig.
                }
                Err(error) => {
                    self.log
                        .record("ERROR", "engine", "model_inference", &error.to_string());
                }
            }
        }

        self.keyword_fallback(text, context)
    }

    fn flag_from_model(&self, text: &str, probability: f64) -> Classification {
        let confidence = (probability * 100.0).round().clamp(0.0, 100.0) as u8;

        if let Some(explanation) = safe_echo_rules::explain(text) {
            let verdict = self.scam_verdict(explanation.message, confidence);
            let alert = self.record_alert(
                AlertType::Sms,
                RiskLevel::High,
                AlertStatus::Quarantined,
                &verdict.reason,
            );
            return Classification { verdict, alert };
        }

        if word_count(text) > SHORT_TEXT_WORD_LIMIT {
            let verdict = self.scam_verdict(MODEL_PATTERN_REASON, confidence);
            let alert = self.record_alert(
                AlertType::Sms,
                RiskLevel::Low,
                AlertStatus::Flagged,
                &verdict.reason,
            );
            return Classification { verdict, alert };
        }

        // Over-threshold short text with no categorized explanation is a
        // likely model false positive on a greeting.
        Classification::clean(Verdict::safe(SAFE_GREETING_REASON, GREETING_CONFIDENCE))
    }

    fn keyword_fallback(&self, text: &str, context: CallerContext) -> Classification {
        let Some(keyword) = safe_echo_rules::match_keyword(text, context) else {
            return Classification::clean(Verdict::safe(
                SAFE_CONVERSATION_REASON,
                NO_MATCH_CONFIDENCE,
            ));
        };

        let reason = match safe_echo_rules::explain(text) {
            Some(explanation) => explanation.message.to_string(),
            None => format!("Keyword alert: contains suspicious word '{keyword}'."),
        };
        let verdict = self.scam_verdict(&reason, KEYWORD_CONFIDENCE);
        let alert = self.record_alert(
            AlertType::Sms,
            RiskLevel::Medium,
            AlertStatus::Quarantined,
            &verdict.reason,
        );
        Classification { verdict, alert }
    }

    fn scam_verdict(&self, reason: &str, confidence: u8) -> Verdict {
        // Reasons are non-empty by construction and confidence is already in
        // range, so the error arm only guards against future regressions.
        Verdict::scam(reason, confidence).unwrap_or_else(|error| {
            self.log
                .record("ERROR", "engine", "verdict_invariant", &error.to_string());
            Verdict {
                is_scam: true,
                confidence: confidence.min(100),
                reason: "Suspicious content detected.".to_string(),
                transcript: None,
                translation: None,
            }
        })
    }

    fn record_alert(
        &self,
        alert_type: AlertType,
        risk: RiskLevel,
        status: AlertStatus,
        details: &str,
    ) -> Option<AlertReceipt> {
        let at = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let alert = match Alert::new(alert_type, risk, status, details, at) {
            Ok(alert) => alert,
            Err(error) => {
                self.log
                    .record("ERROR", "engine", "alert_build", &error.to_string());
                return None;
            }
        };

        let persisted = match self.alerts.append(&alert) {
            Ok(()) => {
                self.log.record(
                    "INFO",
                    "engine",
                    "alert_recorded",
                    &format!("risk={risk:?} status={status:?}"),
                );
                true
            }
            Err(error) => {
                self.log
                    .record("ERROR", "engine", "alert_append", &error.to_string());
                false
            }
        };

        Some(AlertReceipt { alert, persisted })
    }
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
