#![warn(missing_docs)]
//! # safe-echo-classifier
//!
//! ## Purpose
//! Defines the probabilistic text classifier boundary consumed by the
//! decision engine, and a JSON artifact backend trained offline.
//!
//! ## Responsibilities
//! - Expose `P(scam | text)` through a narrow, injectable trait.
//! - Load and validate the versioned classifier artifact once, at load time.
//! - Provide a deterministic fixed-probability backend for tests and demos.
//!
//! ## Data flow
//! Offline training produces `text_model.json` -> [`ArtifactClassifier::load`]
//! validates it -> the decision engine queries
//! [`TextClassifier::probability_of_scam`] per input.
//!
//! ## Ownership and lifetimes
//! The loaded model owns its token weights; inference borrows the input text.
//!
//! ## Error model
//! Missing files, malformed JSON, and contract violations (wrong label set,
//! non-finite weights) are reported as [`ClassifierError`]. Callers are
//! expected to degrade to rule-only mode rather than abort.
//!
//! ## Security and privacy notes
//! The artifact contains only token weights; inference never logs input text.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical schema tag for v1 classifier artifacts.
pub const MODEL_SCHEMA_VERSION_V1: &str = "v1";

/// Exact label set the artifact must declare.
pub const REQUIRED_LABELS: [&str; 2] = ["safe", "scam"];

/// Probabilistic text classifier boundary.
///
/// The contract is fixed: implementations expose the probability of the
/// `scam` label directly, validated once at construction rather than
/// re-derived from a class list per call.
pub trait TextClassifier: Send + Sync {
    /// Returns `P(scam | text)` in `[0, 1]`.
    ///
    /// # Errors
    /// Returns [`ClassifierError::Inference`] when the backend cannot score
    /// the input.
    fn probability_of_scam(&self, text: &str) -> Result<f64, ClassifierError>;
}

/// On-disk artifact layout for the v1 linear model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Artifact schema version.
    pub schema_version: String,
    /// Label set; must be exactly `safe` and `scam`.
    pub labels: Vec<String>,
    /// Intercept term of the logistic model.
    pub bias: f64,
    /// Per-token weights; positive weights push toward `scam`.
    pub weights: HashMap<String, f64>,
}

/// Logistic bag-of-words classifier backed by a validated [`ModelArtifact`].
#[derive(Debug, Clone)]
pub struct ArtifactClassifier {
    bias: f64,
    weights: HashMap<String, f64>,
}

impl ArtifactClassifier {
    /// Loads and validates an artifact from `path`.
    ///
    /// # Errors
    /// Returns [`ClassifierError::ArtifactUnavailable`] when the file cannot
    /// be read, [`ClassifierError::Decode`] for malformed JSON, and
    /// [`ClassifierError::InvalidArtifact`] for contract violations.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|error| {
            ClassifierError::ArtifactUnavailable(format!("{}: {error}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    /// Builds a validated classifier from raw artifact JSON.
    ///
    /// # Errors
    /// Returns [`ClassifierError::Decode`] or
    /// [`ClassifierError::InvalidArtifact`].
    pub fn from_json(raw: &str) -> Result<Self, ClassifierError> {
        let artifact: ModelArtifact = serde_json::from_str(raw)?;
        Self::from_artifact(artifact)
    }

    /// Validates an already-decoded artifact.
    ///
    /// # Errors
    /// Returns [`ClassifierError::InvalidArtifact`] when the schema version
    /// is unsupported, the label set is not exactly `{safe, scam}`, or any
    /// weight is non-finite.
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ClassifierError> {
        if artifact.schema_version != MODEL_SCHEMA_VERSION_V1 {
            return Err(ClassifierError::InvalidArtifact(format!(
                "unsupported schema version '{}'",
                artifact.schema_version
            )));
        }

        let mut labels = artifact.labels.clone();
        labels.sort();
        if labels != REQUIRED_LABELS {
            return Err(ClassifierError::InvalidArtifact(format!(
                "label set must be exactly {REQUIRED_LABELS:?}, got {:?}",
                artifact.labels
            )));
        }

        if !artifact.bias.is_finite() {
            return Err(ClassifierError::InvalidArtifact(
                "bias is not finite".to_string(),
            ));
        }
        for (token, weight) in &artifact.weights {
            if !weight.is_finite() {
                return Err(ClassifierError::InvalidArtifact(format!(
                    "weight for token '{token}' is not finite"
                )));
            }
        }

        Ok(Self {
            bias: artifact.bias,
            weights: artifact.weights,
        })
    }
}

impl TextClassifier for ArtifactClassifier {
    fn probability_of_scam(&self, text: &str) -> Result<f64, ClassifierError> {
        let mut score = self.bias;
        for token in tokenize(text) {
            if let Some(weight) = self.weights.get(&token) {
                score += weight;
            }
        }

        let probability = sigmoid(score);
        if !probability.is_finite() {
            return Err(ClassifierError::Inference(
                "score produced a non-finite probability".to_string(),
            ));
        }
        Ok(probability.clamp(0.0, 1.0))
    }
}

/// Deterministic backend returning one fixed probability.
///
/// Used by tests and demo wiring the same way a synthetic capture backend
/// substitutes for real hardware.
#[derive(Debug, Clone, Copy)]
pub struct FixedClassifier {
    probability: f64,
}

impl FixedClassifier {
    /// Creates a backend that always reports `probability`.
    pub fn new(probability: f64) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
        }
    }
}

impl TextClassifier for FixedClassifier {
    fn probability_of_scam(&self, _text: &str) -> Result<f64, ClassifierError> {
        Ok(self.probability)
    }
}

/// Backend whose every inference call fails.
///
/// Models a loaded-then-broken artifact so degraded-mode paths can be tested.
#[derive(Debug, Clone, Default)]
pub struct FailingClassifier;

impl TextClassifier for FailingClassifier {
    fn probability_of_scam(&self, _text: &str) -> Result<f64, ClassifierError> {
        Err(ClassifierError::Inference(
            "backend is permanently unavailable".to_string(),
        ))
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase())
}

fn sigmoid(score: f64) -> f64 {
    1.0 / (1.0 + (-score).exp())
}

/// Classifier boundary errors.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Artifact file is missing or unreadable.
    #[error("classifier artifact unavailable: {0}")]
    ArtifactUnavailable(String),
    /// Artifact JSON decode failure.
    #[error("classifier artifact decode failure: {0}")]
    Decode(#[from] serde_json::Error),
    /// Artifact violates the v1 contract.
    #[error("invalid classifier artifact: {0}")]
    InvalidArtifact(String),
    /// Backend failed to score an input.
    #[error("classifier inference failure: {0}")]
    Inference(String),
}
