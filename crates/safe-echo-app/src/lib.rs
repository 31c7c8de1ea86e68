#![warn(missing_docs)]
//! # safe-echo-app
//!
//! ## Purpose
//! Orchestrates classifier loading, alert persistence, audio monitoring, and
//! run logging for `safe-echo`.
//!
//! ## Responsibilities
//! - Resolve store/model/endpoint configuration from the environment.
//! - Degrade to rule-only mode when the classifier artifact is unavailable.
//! - Drive the continuous monitoring loop with cooperative cancellation.
//! - Provide the per-run pipe-delimited file logger.
//!
//! ## Data flow
//! Env config -> engine construction -> audio monitor -> per-phrase
//! classification -> caregiver-facing callback + alert store.
//!
//! ## Ownership and lifetimes
//! Collaborators are shared through `Arc` trait objects; the monitoring loop
//! borrows its phrase source mutably for its whole run.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`AppError`]. Inside the loop, only
//! unintelligible phrases are recoverable; any other failure terminates the
//! loop and is surfaced to the caller.
//!
//! ## Security and privacy notes
//! Log lines carry stage/action/diagnostic text only; transcripts and audio
//! bytes are never logged.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use safe_echo_audio::{AudioAssessment, AudioMonitor, Language, TranscriptionError};
use safe_echo_classifier::{ArtifactClassifier, TextClassifier};
use safe_echo_core::CallerContext;
use safe_echo_engine::{EventLog, GuardianEngine};
use safe_echo_store::{JsonFileStore, StoreError};
use thiserror::Error;
use time::OffsetDateTime;

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("SAFE_ECHO_VERSION");

/// Default alert store path when `SAFE_ECHO_ALERT_DB` is unset.
pub const DEFAULT_ALERT_DB: &str = "cloud_db.json";

/// Default classifier artifact path when `SAFE_ECHO_MODEL_PATH` is unset.
pub const DEFAULT_MODEL_PATH: &str = "text_model.json";

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Resolves the alert store path from `SAFE_ECHO_ALERT_DB`.
pub fn alert_db_path_from_env() -> PathBuf {
    path_from_env("SAFE_ECHO_ALERT_DB", DEFAULT_ALERT_DB)
}

/// Resolves the classifier artifact path from `SAFE_ECHO_MODEL_PATH`.
pub fn model_path_from_env() -> PathBuf {
    path_from_env("SAFE_ECHO_MODEL_PATH", DEFAULT_MODEL_PATH)
}

fn path_from_env(key: &str, default: &str) -> PathBuf {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => PathBuf::from(value.trim()),
        _ => PathBuf::from(default),
    }
}

/// Checks the runtime monitoring kill-switch env var.
///
/// Semantics:
/// - Unset => monitoring enabled.
/// - `0`, `false`, `off` (case-insensitive) => monitoring disabled.
/// - Any other value => monitoring enabled.
pub fn monitor_enabled_from_env() -> bool {
    match std::env::var("SAFE_ECHO_MONITOR_ENABLED") {
        Ok(value) => {
            let normalized = value.trim().to_ascii_lowercase();
            !(normalized == "0" || normalized == "false" || normalized == "off")
        }
        Err(_) => true,
    }
}

/// Resolves and validates the hosted speech endpoint from
/// `SAFE_ECHO_SPEECH_ENDPOINT`.
///
/// # Errors
/// Returns [`AppError::Endpoint`] when the value is set but not a valid
/// HTTPS URL.
pub fn speech_endpoint_from_env() -> Result<Option<String>, AppError> {
    match std::env::var("SAFE_ECHO_SPEECH_ENDPOINT") {
        Ok(value) if !value.trim().is_empty() => {
            let endpoint = value.trim().to_string();
            safe_echo_audio::validate_provider_endpoint(&endpoint).map_err(AppError::Endpoint)?;
            Ok(Some(endpoint))
        }
        _ => Ok(None),
    }
}

/// Per-run pipe-delimited logger (`timestamp | level | stage | action |
/// detail`), flushed eagerly on errors.
pub struct RunLogger {
    sink: Mutex<Box<dyn Write + Send>>,
}

impl RunLogger {
    /// Opens (or creates) an append-mode log file at `path`.
    ///
    /// # Errors
    /// Returns [`AppError::Log`] when the file cannot be opened.
    pub fn to_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|error| {
                AppError::Log(format!(
                    "unable to open log file '{}': {error}",
                    path.display()
                ))
            })?;
        Ok(Self::to_writer(Box::new(file)))
    }

    /// Wraps an arbitrary writer (stderr, shared test buffer).
    pub fn to_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            sink: Mutex::new(writer),
        }
    }

    /// Writes one structured log line; failures are swallowed so logging can
    /// never abort classification.
    pub fn write_line(&self, level: &str, stage: &str, action: &str, detail: &str) {
        let timestamp = timestamp_compact_utc();
        let line = format!("{timestamp} | {level} | {stage} | {action} | {detail}\n");

        if let Ok(mut sink) = self.sink.lock() {
            let _ = sink.write_all(line.as_bytes());
            if level == "ERROR" {
                let _ = sink.flush();
            }
        }
    }
}

impl EventLog for RunLogger {
    fn record(&self, level: &str, stage: &str, action: &str, detail: &str) {
        self.write_line(level, stage, action, detail);
    }
}

/// Cloneable in-memory log sink for tests.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        self.inner
            .lock()
            .map(|bytes| String::from_utf8_lossy(&bytes).to_string())
            .unwrap_or_default()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| std::io::Error::other("shared buffer lock poisoned"))?;
        inner.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Loads the classifier artifact, degrading to rule-only mode on failure.
///
/// A missing or corrupt artifact is logged and returns `None`; the decision
/// engine treats that as "classifier absent" and relies on keyword rules.
pub fn load_classifier(path: &Path, log: &dyn EventLog) -> Option<Arc<dyn TextClassifier>> {
    match ArtifactClassifier::load(path) {
        Ok(model) => {
            log.record(
                "INFO",
                "bootstrap",
                "model_loaded",
                &format!("path={}", path.display()),
            );
            Some(Arc::new(model))
        }
        Err(error) => {
            log.record(
                "ERROR",
                "bootstrap",
                "model_unavailable",
                &format!("degrading to rule-only mode: {error}"),
            );
            None
        }
    }
}

/// Builds the decision engine from environment configuration.
///
/// Startup fails before any filesystem work when a configured speech
/// endpoint violates the HTTPS policy.
///
/// # Errors
/// Returns [`AppError::Endpoint`] for an invalid `SAFE_ECHO_SPEECH_ENDPOINT`
/// and [`AppError::Store`] when the alert store cannot be initialized.
/// Classifier load failures are not errors; they degrade to rule-only mode.
pub fn build_engine_from_env(log: Arc<dyn EventLog>) -> Result<GuardianEngine, AppError> {
    speech_endpoint_from_env()?;

    let store = JsonFileStore::new(alert_db_path_from_env());
    store.init()?;

    let classifier = load_classifier(&model_path_from_env(), log.as_ref());
    Ok(GuardianEngine::new(classifier, Arc::new(store)).with_log(log))
}

/// Blocking source of audio phrases for the monitoring loop.
///
/// Implementations own their per-phrase acquisition timeout.
pub trait PhraseSource {
    /// Blocks until the next phrase; `Ok(None)` means the source is drained.
    ///
    /// # Errors
    /// Returns [`AppError::AudioSource`] on capture failure; always fatal to
    /// the loop.
    fn next_phrase(&mut self) -> Result<Option<Vec<u8>>, AppError>;
}

/// Summary of one monitoring session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopReport {
    /// Phrases pulled from the source, including unintelligible ones.
    pub iterations: u64,
    /// Phrases whose content was classified as scam.
    pub scams_detected: u64,
    /// Phrases skipped as unintelligible.
    pub skipped_phrases: u64,
    /// `true` when the external stop signal ended the session.
    pub stopped_by_signal: bool,
    /// `true` when `SAFE_ECHO_MONITOR_ENABLED` ended the session.
    pub disabled_by_kill_switch: bool,
}

/// Runs the single-threaded cooperative monitoring loop.
///
/// Each iteration re-checks the `SAFE_ECHO_MONITOR_ENABLED` kill switch and
/// the `stop` signal, then blocks on one phrase, classifies it synchronously,
/// and invokes `on_assessment`. A disabled kill switch ends the session
/// before any phrase is pulled. Unintelligible phrases are skipped; any
/// other transcription or source failure terminates the loop.
///
/// # Errors
/// Returns [`AppError::AudioSource`] or [`AppError::Transcription`] for the
/// failure that ended the session.
pub fn run_monitor_loop(
    monitor: &AudioMonitor,
    source: &mut dyn PhraseSource,
    language: Language,
    context: CallerContext,
    stop: &AtomicBool,
    mut on_assessment: impl FnMut(&AudioAssessment),
) -> Result<LoopReport, AppError> {
    let mut report = LoopReport::default();

    loop {
        if !monitor_enabled_from_env() {
            report.disabled_by_kill_switch = true;
            break;
        }

        if stop.load(Ordering::Relaxed) {
            report.stopped_by_signal = true;
            break;
        }

        let Some(phrase) = source.next_phrase()? else {
            break;
        };
        report.iterations += 1;

        let assessment = monitor.classify_audio(&phrase, language, context);
        match &assessment.transcription_error {
            Some(TranscriptionError::Unintelligible) => {
                report.skipped_phrases += 1;
                on_assessment(&assessment);
                continue;
            }
            Some(fatal) => return Err(AppError::Transcription(fatal.clone())),
            None => {}
        }

        if assessment.is_deepfake {
            report.scams_detected += 1;
        }
        on_assessment(&assessment);
    }

    Ok(report)
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Alert store failure during setup.
    #[error("alert store error: {0}")]
    Store(#[from] StoreError),
    /// Run log sink failure.
    #[error("run log error: {0}")]
    Log(String),
    /// Configured speech endpoint violates policy.
    #[error("speech endpoint error: {0}")]
    Endpoint(TranscriptionError),
    /// Audio phrase acquisition failure.
    #[error("audio source error: {0}")]
    AudioSource(String),
    /// Non-recoverable transcription failure inside the monitoring loop.
    #[error("transcription error: {0}")]
    Transcription(TranscriptionError),
}

fn timestamp_compact_utc() -> String {
    let now = OffsetDateTime::now_utc();
    format!(
        "{:04}{:02}{:02}_{:02}{:02}{:02}",
        now.year(),
        now.month() as u8,
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}

#[cfg(test)]
mod tests {
    //! Unit tests for logger formatting and config parsing helpers.

    use super::*;

    #[test]
    fn run_logger_writes_pipe_delimited_lines() {
        let buffer = SharedBuffer::new();
        let logger = RunLogger::to_writer(Box::new(buffer.clone()));
        logger.write_line("INFO", "engine", "alert_recorded", "risk=Medium");

        let contents = buffer.contents();
        assert!(contents.contains("| INFO | engine | alert_recorded | risk=Medium"));
    }

    #[test]
    fn version_is_non_empty() {
        assert!(!app_version().trim().is_empty());
    }
}
