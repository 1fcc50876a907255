//! Write a kubeconfig from a Secret manifest

use anyhow::{Context, Result};
use hookstore::{KubeconfigSecret, KubeconfigStore, VaultStore};

use super::require_vault_config;
use crate::cli::{VaultArgs, WriteArgs};
use crate::output;

pub async fn run(args: WriteArgs, vault: &VaultArgs) -> Result<()> {
    let secret = load_secret(&args)?;
    if secret.kubeconfig().is_empty() {
        output::warning(&format!(
            "Secret {} carries no kubeconfig, writing an empty value",
            args.secret_file.display()
        ));
    }

    let config = require_vault_config(vault)?;
    let store = VaultStore::from_config(&config).context("Failed to create Vault client")?;

    store
        .write_kubeconfig_file(&args.path, &args.name, &secret)
        .await?;

    output::success(&format!(
        "Wrote kubeconfig {} to {}/{}",
        args.name, config.mount, args.path
    ));
    Ok(())
}

fn load_secret(args: &WriteArgs) -> Result<KubeconfigSecret> {
    let manifest = std::fs::read_to_string(&args.secret_file)
        .with_context(|| format!("Failed to read file: {:?}", args.secret_file))?;
    KubeconfigSecret::from_manifest(&manifest)
        .with_context(|| format!("Failed to parse secret manifest: {:?}", args.secret_file))
}
