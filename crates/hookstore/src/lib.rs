//! Kubeconfig stores for landscape sync hooks
//!
//! This crate provides the storage side of kubeconfig provisioning:
//! - **Store contract**: [`KubeconfigStore`], implemented once per backend
//! - **Vault backend**: KV v2 via vaultrs, with a concurrent recursive clean
//! - **Diagnostics**: best-effort failures are reported to a [`DiagnosticSink`]
//! - **Security**: token zeroing and error sanitization

pub mod diagnostics;
pub mod error;
pub mod security;
pub mod store;
pub mod types;
pub mod vault;

// Re-export commonly used items
pub use diagnostics::{Diagnostic, DiagnosticSink, MemorySink, TeeSink, TracingSink};
pub use error::{Error, Result};
pub use security::{sanitize_error, SecureString};
pub use store::KubeconfigStore;
pub use types::{join_path, ChildEntry, KubeconfigSecret, ListResult, StoreKind};
pub use vault::{KvClient, TreeCleaner, VaultConfig, VaultKvClient, VaultStore};
