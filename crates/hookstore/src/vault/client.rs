//! Hierarchical KV client seam and its vaultrs implementation

use crate::error::{BackendError, Error, Result};
use crate::types::{ListResult, PATH_SEPARATOR};
use crate::vault::config::{RetryConfig, VaultConfig};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use tracing::{debug, warn};
use vaultrs::api::token::responses::LookupTokenResponse;
use vaultrs::client::{VaultClient, VaultClientSettingsBuilder};
use vaultrs::error::ClientError;
use vaultrs::{kv2, token};

/// Wire operations of a hierarchical KV secret store
///
/// Implementations are shared by every branch of a concurrent clean and
/// must be safe to call from many tasks at once.
#[async_trait]
pub trait KvClient: Send + Sync {
    /// List the immediate children of `path`; names ending in `/` are folders
    async fn list(&self, path: &str) -> std::result::Result<ListResult, BackendError>;

    /// Delete the secret at `path`
    async fn delete(&self, path: &str) -> std::result::Result<(), BackendError>;

    /// Replace the secret at `path` with `data`
    async fn write(
        &self,
        path: &str,
        data: &HashMap<String, String>,
    ) -> std::result::Result<(), BackendError>;
}

/// Token details returned by a lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStatus {
    pub ttl: u64,
    /// `None` when Vault does not report it
    pub renewable: Option<bool>,
}

impl From<LookupTokenResponse> for TokenStatus {
    fn from(info: LookupTokenResponse) -> Self {
        Self {
            ttl: info.ttl,
            renewable: info.renewable,
        }
    }
}

/// KV v2 client backed by vaultrs
pub struct VaultKvClient {
    client: VaultClient,
    mount: String,
    retry: RetryConfig,
}

impl VaultKvClient {
    pub fn new(config: &VaultConfig) -> Result<Self> {
        let mut settings = VaultClientSettingsBuilder::default();
        settings
            .address(&config.address)
            .token(config.token.as_str())
            .timeout(Some(config.timeout));

        if let Some(ns) = &config.namespace {
            settings.namespace(Some(ns.clone()));
        }

        if config.insecure_skip_verify {
            warn!("TLS verification disabled");
            settings.verify(false);
        }

        let settings = settings
            .build()
            .map_err(|e| Error::Client(e.to_string()))?;
        let client = VaultClient::new(settings).map_err(|e| Error::Client(e.to_string()))?;

        Ok(Self {
            client,
            mount: config.mount.clone(),
            retry: config.retry.clone(),
        })
    }

    /// Look up the configured token
    pub async fn lookup_token(&self, token: &str) -> Result<TokenStatus> {
        token::lookup(&self.client, token)
            .await
            .map(TokenStatus::from)
            .map_err(|e| Error::Client(format!("token lookup failed: {}", e)))
    }
}

/// vaultrs addresses secrets relative to the mount
fn relative(path: &str) -> &str {
    path.trim_start_matches(PATH_SEPARATOR)
}

fn is_not_found(err: &ClientError) -> bool {
    matches!(err, ClientError::APIError { code: 404, .. })
}

/// Transport failures, throttling and server errors are worth another attempt
fn is_transient(err: &ClientError) -> bool {
    match err {
        ClientError::APIError { code, .. } => *code == 429 || *code >= 500,
        _ => true,
    }
}

/// Run `op` until it succeeds, fails permanently, or retries run out
pub(crate) async fn with_retry<T, E, F, Fut>(
    retry: &RetryConfig,
    what: &str,
    retryable: impl Fn(&E) -> bool,
    mut op: F,
) -> std::result::Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < retry.max_attempts && retryable(&e) => {
                warn!(
                    "Vault {} failed (attempt {}/{}): {}",
                    what,
                    attempt + 1,
                    retry.max_attempts,
                    e
                );
                tokio::time::sleep(retry.delay_for(attempt)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[async_trait]
impl KvClient for VaultKvClient {
    async fn list(&self, path: &str) -> std::result::Result<ListResult, BackendError> {
        let rel = relative(path);
        let result = with_retry(&self.retry, "list", is_transient, || {
            kv2::list(&self.client, &self.mount, rel)
        })
        .await;

        match result {
            Ok(keys) => {
                debug!("Listed {} entries under {}/{}", keys.len(), self.mount, rel);
                Ok(Some(keys))
            }
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, path: &str) -> std::result::Result<(), BackendError> {
        let rel = relative(path);
        with_retry(&self.retry, "delete", is_transient, || {
            kv2::delete_metadata(&self.client, &self.mount, rel)
        })
        .await
        .map_err(Into::into)
    }

    async fn write(
        &self,
        path: &str,
        data: &HashMap<String, String>,
    ) -> std::result::Result<(), BackendError> {
        let rel = relative(path);
        with_retry(&self.retry, "write", is_transient, || {
            kv2::set(&self.client, &self.mount, rel, data)
        })
        .await
        .map(|_| ())
        .map_err(Into::into)
    }
}
