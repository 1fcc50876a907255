//! Command implementations

pub mod clean;
pub mod prepare;
pub mod vault;
pub mod write;

use anyhow::{Context, Result};
use hookstore::VaultConfig;

use crate::cli::VaultArgs;

/// Resolve the Vault configuration from the environment, with flags taking precedence
pub(crate) fn vault_config(args: &VaultArgs) -> Result<VaultConfig> {
    vault_config_with(args, |key| std::env::var(key).ok())
}

fn vault_config_with(
    args: &VaultArgs,
    env: impl Fn(&str) -> Option<String>,
) -> Result<VaultConfig> {
    VaultConfig::from_vars(|key| args.flag_for(key).or_else(|| env(key)))
}

/// Resolve the configuration and report a helpful error when it is incomplete
pub(crate) fn require_vault_config(args: &VaultArgs) -> Result<VaultConfig> {
    vault_config(args).context(
        "Vault is not configured. Use --address/--token or set VAULT_ADDR/VAULT_TOKEN",
    )
}
