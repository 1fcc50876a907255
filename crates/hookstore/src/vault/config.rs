//! Vault connection settings

use crate::security::SecureString;
use anyhow::{Context, Result};
use std::time::Duration;

/// Default KV v2 mount
pub const DEFAULT_KV_MOUNT: &str = "secret";

#[derive(Debug, Clone)]
pub struct VaultConfig {
    pub address: String,
    pub token: SecureString,
    pub namespace: Option<String>,
    /// KV v2 mount all secret paths are relative to
    pub mount: String,
    pub timeout: Duration,
    pub retry: RetryConfig,
    pub insecure_skip_verify: bool,
    /// Cap on concurrent list/delete requests during a clean; `None` is unbounded
    pub max_in_flight: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryConfig {
    /// No retries at all
    pub fn disabled() -> Self {
        Self {
            max_attempts: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        std::cmp::min(self.base_delay.saturating_mul(factor), self.max_delay)
    }
}

impl VaultConfig {
    pub fn new(address: impl Into<String>, token: impl Into<SecureString>) -> Self {
        Self {
            address: address.into(),
            token: token.into(),
            namespace: None,
            mount: DEFAULT_KV_MOUNT.to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
            insecure_skip_verify: false,
            max_in_flight: None,
        }
    }

    /// Load from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load from any variable source keyed by the environment variable names
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let address = var("VAULT_ADDR")
            .filter(|a| !a.is_empty())
            .context("VAULT_ADDR not set")?;
        let token = var("VAULT_TOKEN")
            .filter(|t| !t.is_empty())
            .context("VAULT_TOKEN not set")?;

        let mut config = Self::new(address, token);
        config.namespace = var("VAULT_NAMESPACE").filter(|n| !n.is_empty());
        if let Some(mount) = var("VAULT_KV_MOUNT").filter(|m| !m.is_empty()) {
            config.mount = mount;
        }
        if let Some(secs) = var("VAULT_TIMEOUT") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("Invalid VAULT_TIMEOUT: {}", secs))?;
            config.timeout = Duration::from_secs(secs);
        }
        config.insecure_skip_verify = var("VAULT_SKIP_VERIFY")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        if let Some(retries) = var("VAULT_MAX_RETRIES") {
            let retries: u32 = retries
                .parse()
                .with_context(|| format!("Invalid VAULT_MAX_RETRIES: {}", retries))?;
            config.retry = match retries {
                0 => RetryConfig::disabled(),
                n => RetryConfig {
                    max_attempts: n,
                    ..RetryConfig::default()
                },
            };
        }
        let max_in_flight = match var("HOOKSTORE_MAX_IN_FLIGHT") {
            Some(v) => Some(
                v.parse::<usize>()
                    .with_context(|| format!("Invalid HOOKSTORE_MAX_IN_FLIGHT: {}", v))?,
            ),
            None => None,
        };

        Ok(config.with_max_in_flight(max_in_flight))
    }

    pub fn with_max_in_flight(mut self, max_in_flight: Option<usize>) -> Self {
        self.max_in_flight = max_in_flight.filter(|n| *n > 0);
        self
    }
}
