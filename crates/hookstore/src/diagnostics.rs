//! Diagnostic sinks for best-effort store operations
//!
//! A clean never fails its caller. Whatever goes wrong during the walk is
//! recorded here instead, and callers decide whether to log it, collect it,
//! or both.

use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// One event observed while cleaning a secret tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Listing a path failed; the branch was abandoned
    ListFailed { path: String, error: String },
    /// A path had no children or does not exist
    NoSecrets { path: String },
    /// A leaf secret was deleted
    Deleted { path: String },
    /// Deleting a leaf secret failed; siblings were still processed
    DeleteFailed { path: String, error: String },
    /// A spawned branch task ended abnormally
    BranchAborted { path: String, error: String },
}

impl Diagnostic {
    pub fn path(&self) -> &str {
        match self {
            Diagnostic::ListFailed { path, .. }
            | Diagnostic::NoSecrets { path }
            | Diagnostic::Deleted { path }
            | Diagnostic::DeleteFailed { path, .. }
            | Diagnostic::BranchAborted { path, .. } => path,
        }
    }

    /// Whether this diagnostic reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Diagnostic::ListFailed { .. }
                | Diagnostic::DeleteFailed { .. }
                | Diagnostic::BranchAborted { .. }
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ListFailed { path, error } => {
                write!(f, "failed to list secrets under path {:?}: {}", path, error)
            }
            Diagnostic::NoSecrets { path } => write!(f, "no secrets found for path {:?}", path),
            Diagnostic::Deleted { path } => write!(f, "deleted secret {:?}", path),
            Diagnostic::DeleteFailed { path, error } => {
                write!(f, "failed to delete secret with path {:?}: {}", path, error)
            }
            Diagnostic::BranchAborted { path, error } => {
                write!(f, "cleanup of path {:?} aborted: {}", path, error)
            }
        }
    }
}

/// Receives diagnostics from concurrently running branches
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, diagnostic: Diagnostic);
}

/// Emits diagnostics as `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::ListFailed { path, error } => {
                info!(path = %path, error = %error, "Failed to list secrets under path")
            }
            Diagnostic::NoSecrets { path } => {
                info!(path = %path, "No secrets found for path")
            }
            Diagnostic::Deleted { path } => debug!(path = %path, "Deleted secret"),
            Diagnostic::DeleteFailed { path, error } => {
                warn!(path = %path, error = %error, "Failed to delete secret")
            }
            Diagnostic::BranchAborted { path, error } => {
                warn!(path = %path, error = %error, "Secret cleanup branch aborted")
            }
        }
    }
}

/// Collects diagnostics in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<Diagnostic>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn failures(&self) -> Vec<Diagnostic> {
        self.entries()
            .into_iter()
            .filter(Diagnostic::is_failure)
            .collect()
    }

    /// Paths of all deleted secrets, sorted
    pub fn deleted_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .entries()
            .into_iter()
            .filter_map(|d| match d {
                Diagnostic::Deleted { path } => Some(path),
                _ => None,
            })
            .collect();
        paths.sort();
        paths
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, diagnostic: Diagnostic) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(diagnostic);
        }
    }
}

/// Forwards every diagnostic to two sinks
pub struct TeeSink<A, B> {
    first: A,
    second: B,
}

impl<A, B> TeeSink<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: DiagnosticSink, B: DiagnosticSink> DiagnosticSink for TeeSink<A, B> {
    fn record(&self, diagnostic: Diagnostic) {
        self.first.record(diagnostic.clone());
        self.second.record(diagnostic);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Arc<S> {
    fn record(&self, diagnostic: Diagnostic) {
        (**self).record(diagnostic)
    }
}
