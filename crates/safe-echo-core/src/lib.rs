#![warn(missing_docs)]
//! # safe-echo-core
//!
//! ## Purpose
//! Defines the pure data model used across the `safe-echo` workspace.
//!
//! ## Responsibilities
//! - Represent classification verdicts with enforced invariants.
//! - Represent caller trust context for one classification call.
//! - Build persisted alert records with a stable field set.
//!
//! ## Data flow
//! The decision engine produces [`Verdict`] values and, for scam-positive
//! outcomes, derives [`Alert`] records that the alert store persists.
//!
//! ## Ownership and lifetimes
//! Verdicts and alerts own their strings (`String`) to avoid hidden borrow
//! coupling between the engine, audio adapter, and store.
//!
//! ## Error model
//! Invariant violations (blank scam reason, out-of-range confidence) and
//! codec/timestamp failures return [`CoreError`] variants.
//!
//! ## Security and privacy notes
//! Alert details contain only explanation text; raw audio bytes and provider
//! credentials never enter this crate.
//!
//! ## Example
//! ```rust
//! use safe_echo_core::{CallerContext, Verdict};
//!
//! let verdict = Verdict::safe("This message looks like a normal conversation.", 95);
//! assert!(!verdict.is_scam);
//! assert_eq!(CallerContext::default().is_saved_contact, false);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::{self, well_known::Rfc3339};

/// Classification output for one text or audio input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// `true` when the input was judged fraudulent.
    pub is_scam: bool,
    /// Confidence score in `[0, 100]`.
    pub confidence: u8,
    /// Human-readable explanation; never blank for scam verdicts.
    pub reason: String,
    /// Original transcript when the input came from audio.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    /// English translation when the transcript was not English.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
}

impl Verdict {
    /// Constructs a validated scam-positive verdict.
    ///
    /// # Errors
    /// Returns [`CoreError::BlankScamReason`] when `reason` is blank.
    /// Returns [`CoreError::ConfidenceOutOfRange`] when `confidence > 100`.
    pub fn scam(reason: impl Into<String>, confidence: u8) -> Result<Self, CoreError> {
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(CoreError::BlankScamReason);
        }
        validate_confidence(confidence)?;

        Ok(Self {
            is_scam: true,
            confidence,
            reason,
            transcript: None,
            translation: None,
        })
    }

    /// Constructs a safe verdict.
    ///
    /// Out-of-range confidence is clamped to 100 rather than rejected, so a
    /// safe verdict can always be produced on recovery paths.
    pub fn safe(reason: impl Into<String>, confidence: u8) -> Self {
        Self {
            is_scam: false,
            confidence: confidence.min(100),
            reason: reason.into(),
            transcript: None,
            translation: None,
        }
    }

    /// Attaches transcript and translation produced by the audio adapter.
    pub fn with_transcripts(
        mut self,
        transcript: impl Into<String>,
        translation: impl Into<String>,
    ) -> Self {
        self.transcript = Some(transcript.into());
        self.translation = Some(translation.into());
        self
    }
}

/// Trust signal about the message/call origin.
///
/// Immutable for the duration of one classification call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallerContext {
    /// `true` when the sender is a saved contact of the protected user.
    pub is_saved_contact: bool,
}

impl CallerContext {
    /// Context for a sender that is a saved contact.
    pub fn saved_contact() -> Self {
        Self {
            is_saved_contact: true,
        }
    }

    /// Context for an unknown sender.
    pub fn unknown_sender() -> Self {
        Self {
            is_saved_contact: false,
        }
    }
}

/// Input channel that produced an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertType {
    /// Text message or typed input.
    #[serde(rename = "SMS/Text")]
    Sms,
    /// Intercepted audio call.
    #[serde(rename = "Audio Call")]
    AudioCall,
}

/// Severity tag attached to an alert based on which detection path fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Model flagged without a categorized explanation.
    Low,
    /// Keyword fallback match.
    Medium,
    /// Model flag with a categorized explanation, or audio escalation.
    High,
}

/// Handling status assigned by the branch that produced the alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertStatus {
    /// Surfaced to the caregiver without interception.
    Flagged,
    /// Message/call held back pending review.
    Quarantined,
    /// Call terminated by the audio escalation layer.
    Blocked,
}

/// Persisted record of one scam-positive verdict.
///
/// The serialized field set is stable and order-significant:
/// `Time`, `Type`, `Risk`, `Status`, `Details`, `Timestamp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Local display timestamp on a 12-hour clock (`hh:mm AM/PM`).
    #[serde(rename = "Time")]
    pub time: String,
    /// Input channel that produced the alert.
    #[serde(rename = "Type")]
    pub alert_type: AlertType,
    /// Severity tag.
    #[serde(rename = "Risk")]
    pub risk: RiskLevel,
    /// Handling status.
    #[serde(rename = "Status")]
    pub status: AlertStatus,
    /// Explanation text copied from the verdict.
    #[serde(rename = "Details")]
    pub details: String,
    /// Machine-sortable RFC 3339 instant.
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
}

impl Alert {
    /// Builds an alert record, deriving both timestamp representations from
    /// one instant.
    ///
    /// # Errors
    /// Returns [`CoreError::TimestampFormat`] when either representation
    /// cannot be formatted.
    pub fn new(
        alert_type: AlertType,
        risk: RiskLevel,
        status: AlertStatus,
        details: impl Into<String>,
        at: OffsetDateTime,
    ) -> Result<Self, CoreError> {
        let display_format = format_description::parse("[hour repr:12]:[minute] [period]")
            .map_err(|error| CoreError::TimestampFormat(error.to_string()))?;
        let time = at
            .format(&display_format)
            .map_err(|error| CoreError::TimestampFormat(error.to_string()))?;
        let timestamp = at
            .format(&Rfc3339)
            .map_err(|error| CoreError::TimestampFormat(error.to_string()))?;

        Ok(Self {
            time,
            alert_type,
            risk,
            status,
            details: details.into(),
            timestamp,
        })
    }

    /// Serializes the record to JSON.
    ///
    /// # Errors
    /// Returns [`CoreError::Codec`] when serialization fails.
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string(self).map_err(CoreError::Codec)
    }

    /// Deserializes one record from JSON.
    ///
    /// # Errors
    /// Returns [`CoreError::Codec`] when decoding fails.
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        serde_json::from_str(raw).map_err(CoreError::Codec)
    }
}

fn validate_confidence(confidence: u8) -> Result<(), CoreError> {
    if confidence > 100 {
        return Err(CoreError::ConfidenceOutOfRange(confidence));
    }
    Ok(())
}

/// Error type for core model validation and codec failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Scam verdicts must carry a non-empty reason.
    #[error("scam verdict requires a non-empty reason")]
    BlankScamReason,
    /// Confidence must stay within `[0, 100]`.
    #[error("confidence {0} is outside [0, 100]")]
    ConfidenceOutOfRange(u8),
    /// Timestamp formatting failure.
    #[error("timestamp format failure: {0}")]
    TimestampFormat(String),
    /// JSON encoding/decoding error.
    #[error("record codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}
