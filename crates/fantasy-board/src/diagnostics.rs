// Diagnostic sinks: where panel fetch failures are reported.
//
// Failures never reach the rendered page. They are only observable here.

use std::sync::{Arc, Mutex};

use tracing::error;

use crate::fetch::FetchError;

/// One reported failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEntry {
    /// The endpoint that was attempted.
    pub endpoint: String,
    /// Human-readable cause.
    pub message: String,
}

impl From<&FetchError> for DiagnosticEntry {
    fn from(failure: &FetchError) -> Self {
        DiagnosticEntry {
            endpoint: failure.endpoint.clone(),
            message: failure.cause.to_string(),
        }
    }
}

/// Receives fetch-or-parse failures from panel loaders.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, failure: &FetchError);
}

/// Reports failures as `tracing` error events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, failure: &FetchError) {
        error!(endpoint = %failure.endpoint, "Error fetching {}: {}", failure.endpoint, failure.cause);
    }
}

/// Collects failures in memory. Clones share the same entry list.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    entries: Arc<Mutex<Vec<DiagnosticEntry>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every entry reported so far, in report order.
    pub fn entries(&self) -> Vec<DiagnosticEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl DiagnosticSink for RecordingSink {
    fn report(&self, failure: &FetchError) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(DiagnosticEntry::from(failure));
    }
}
