#![warn(missing_docs)]
//! # safe-echo-store
//!
//! ## Purpose
//! Append-only persistence for alert records, newest first on read.
//!
//! ## Responsibilities
//! - Define the narrow append/list interface the decision engine requires.
//! - Provide a JSON file backend with idempotent initialization.
//! - Provide an in-memory backend for tests.
//!
//! ## Data flow
//! The decision engine and audio adapter append [`safe_echo_core::Alert`]
//! records; the caregiver surface lists them most recent first.
//!
//! ## Ownership and lifetimes
//! Stores own their backing state behind an interior `Mutex`, so appenders
//! can share one store through `Arc` without external coordination.
//!
//! ## Error model
//! I/O and codec failures are reported as [`StoreError`]. Callers are
//! expected to contain persistence failures; a failed append must never
//! abort classification.
//!
//! ## Security and privacy notes
//! Records contain explanation text only; transcripts and audio bytes are
//! never persisted by this crate.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use safe_echo_core::Alert;
use thiserror::Error;

/// Write side of the alert log.
pub trait AlertSink: Send + Sync {
    /// Durably appends one alert.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the record cannot be persisted.
    fn append(&self, alert: &Alert) -> Result<(), StoreError>;
}

/// Read side of the alert log.
pub trait AlertSource: Send + Sync {
    /// Returns all alerts, most recent first; empty when none recorded.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the log cannot be read.
    fn list(&self) -> Result<Vec<Alert>, StoreError>;
}

/// JSON file store holding one array of alert records, newest first.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes the read-modify-write append cycle within this process.
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Creates a store over `path` without touching the filesystem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Creates an empty store file only when absent.
    ///
    /// Idempotent: an existing file is never truncated.
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] when the file cannot be created.
    pub fn init(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        self.init_locked()
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn init_locked(&self) -> Result<(), StoreError> {
        if !self.path.exists() {
            std::fs::write(&self.path, "[]")?;
        }
        Ok(())
    }

    fn read_locked(&self) -> Result<Vec<Alert>, StoreError> {
        self.init_locked()?;
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

impl AlertSink for JsonFileStore {
    fn append(&self, alert: &Alert) -> Result<(), StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut alerts = self.read_locked()?;
        // Prepend so reads stay newest-first without sorting.
        alerts.insert(0, alert.clone());
        let encoded = serde_json::to_string_pretty(&alerts)?;
        std::fs::write(&self.path, encoded)?;
        Ok(())
    }
}

impl AlertSource for JsonFileStore {
    fn list(&self) -> Result<Vec<Alert>, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        self.read_locked()
    }
}

/// In-memory store for unit and integration tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    alerts: Mutex<Vec<Alert>>,
}

impl MemoryStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AlertSink for MemoryStore {
    fn append(&self, alert: &Alert) -> Result<(), StoreError> {
        let mut alerts = self.alerts.lock().map_err(|_| StoreError::LockPoisoned)?;
        alerts.insert(0, alert.clone());
        Ok(())
    }
}

impl AlertSource for MemoryStore {
    fn list(&self) -> Result<Vec<Alert>, StoreError> {
        let alerts = self.alerts.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(alerts.clone())
    }
}

/// Sink whose every append fails.
///
/// Lets tests exercise the engine's contained-persistence-failure path.
#[derive(Debug, Default)]
pub struct RejectingSink;

impl AlertSink for RejectingSink {
    fn append(&self, _alert: &Alert) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::other(
            "sink rejects all appends",
        )))
    }
}

/// Alert store error type.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("alert store io failure: {0}")]
    Io(#[from] std::io::Error),
    /// Record array encode/decode failure.
    #[error("alert store codec failure: {0}")]
    Codec(#[from] serde_json::Error),
    /// Interior lock was poisoned by a panicking writer.
    #[error("alert store lock poisoned")]
    LockPoisoned,
}
