//! Recursive kubeconfig cleanup

use anyhow::{Context, Result};
use hookstore::{KubeconfigStore, MemorySink, TeeSink, TracingSink, VaultStore};
use std::sync::Arc;

use super::require_vault_config;
use crate::cli::{CleanArgs, VaultArgs};
use crate::output;

pub async fn run(args: CleanArgs, vault: &VaultArgs) -> Result<()> {
    let config = require_vault_config(vault)?;
    let summary = MemorySink::new();
    let store = VaultStore::from_config(&config)
        .context("Failed to create Vault client")?
        .with_diagnostics(Arc::new(TeeSink::new(TracingSink, summary.clone())));

    let spinner = output::spinner(&format!("Cleaning kubeconfigs under {}...", args.path));
    store.clean_existing_kubeconfigs(&args.path).await?;
    spinner.finish_and_clear();

    let deleted = summary.deleted_paths();
    let failures = summary.failures();

    if args.json {
        let result = serde_json::json!({
            "path": args.path,
            "mount": config.mount,
            "deleted": deleted,
            "failures": failures.iter().map(|f| f.to_string()).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if failures.is_empty() {
        output::success(&format!(
            "Deleted {} kubeconfig(s) under {}",
            deleted.len(),
            args.path
        ));
    } else {
        output::warning(&format!(
            "Deleted {} kubeconfig(s) under {}, {} problem(s) left secrets behind",
            deleted.len(),
            args.path,
            failures.len()
        ));
        for failure in &failures {
            output::kv(failure.path(), &failure.to_string());
        }
    }

    Ok(())
}
