//! Landscape directory preparation

use anyhow::{Context, Result};
use hookstore::{KubeconfigStore, VaultStore};

use super::require_vault_config;
use crate::cli::{PrepareArgs, VaultArgs};
use crate::output;

pub async fn run(args: PrepareArgs, vault: &VaultArgs) -> Result<()> {
    let config = require_vault_config(vault)?;
    let store = VaultStore::from_config(&config).context("Failed to create Vault client")?;

    store.create_landscape_directory(&args.directory).await?;

    output::success(&format!(
        "Landscape directory {} ready ({} store)",
        args.directory,
        store.kind()
    ));
    Ok(())
}
