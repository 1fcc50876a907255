//! HashiCorp Vault kubeconfig store
//!
//! Kubeconfigs live in a KV v2 engine. Directories are implicit in Vault, so
//! preparing a landscape directory does nothing, and cleaning walks the
//! metadata tree with [`TreeCleaner`].

pub mod cleanup;
pub mod client;
pub mod config;

pub use cleanup::TreeCleaner;
pub use client::{KvClient, TokenStatus, VaultKvClient};
pub use config::{RetryConfig, VaultConfig, DEFAULT_KV_MOUNT};

use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::error::{Error, Result};
use crate::store::KubeconfigStore;
use crate::types::{KubeconfigSecret, StoreKind};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

pub struct VaultStore {
    client: Arc<dyn KvClient>,
    sink: Arc<dyn DiagnosticSink>,
    max_in_flight: Option<usize>,
}

impl VaultStore {
    /// Store over an existing client; diagnostics go to `tracing`
    pub fn new(client: Arc<dyn KvClient>) -> Self {
        Self {
            client,
            sink: Arc::new(TracingSink),
            max_in_flight: None,
        }
    }

    /// Connect a vaultrs client from `config`
    pub fn from_config(config: &VaultConfig) -> Result<Self> {
        let client = VaultKvClient::new(config)?;
        Ok(Self::new(Arc::new(client)).with_max_in_flight(config.max_in_flight))
    }

    /// Send clean diagnostics to `sink` instead of `tracing`
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_max_in_flight(mut self, max_in_flight: Option<usize>) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    fn cleaner(&self) -> TreeCleaner {
        TreeCleaner::new(self.client.clone(), self.sink.clone())
            .with_max_in_flight(self.max_in_flight)
    }
}

#[async_trait]
impl KubeconfigStore for VaultStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Vault
    }

    async fn create_landscape_directory(&self, directory: &str) -> Result<()> {
        debug!(
            "Vault directories are implicit, nothing to create for {:?}",
            directory
        );
        Ok(())
    }

    async fn write_kubeconfig_file(
        &self,
        path: &str,
        name: &str,
        secret: &KubeconfigSecret,
    ) -> Result<()> {
        let kubeconfig = secret.kubeconfig();
        let data = HashMap::from([(name.to_string(), STANDARD.encode(kubeconfig))]);

        self.client
            .write(path, &data)
            .await
            .map_err(|e| Error::write(path, name, e))?;

        debug!(
            "Wrote kubeconfig {} ({} bytes) to vault path {}",
            name,
            kubeconfig.len(),
            path
        );
        Ok(())
    }

    async fn clean_existing_kubeconfigs(&self, path: &str) -> Result<()> {
        info!("Deleting secrets from vault under path {:?}", path);
        self.cleaner().clean(path).await;
        Ok(())
    }
}
