//! Vault connectivity check

use anyhow::{anyhow, Result};
use hookstore::VaultKvClient;

use super::require_vault_config;
use crate::cli::{TestVaultArgs, VaultArgs};
use crate::output;

pub async fn run(args: TestVaultArgs, vault: &VaultArgs) -> Result<()> {
    let config = require_vault_config(vault)?;

    output::kv("Address", &config.address);
    output::kv("Mount", &config.mount);
    output::kv("Token", &"*".repeat(8));
    println!();

    let spinner = output::spinner("Testing authentication...");
    let client = VaultKvClient::new(&config)?;
    let lookup = client.lookup_token(config.token.as_str()).await;
    spinner.finish_and_clear();

    match lookup {
        Ok(status) => {
            output::success("Vault connection successful");
            let renewable = status
                .renewable
                .map(|r| r.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            output::info(&format!(
                "Token ttl {}s, renewable: {}",
                status.ttl, renewable
            ));

            if args.json {
                let result = serde_json::json!({
                    "status": "ok",
                    "address": config.address,
                    "authenticated": true,
                    "ttl": status.ttl,
                    "renewable": status.renewable,
                });
                println!("{}", serde_json::to_string_pretty(&result)?);
            }

            Ok(())
        }
        Err(e) => {
            output::error("Vault connection failed");
            Err(anyhow!("Vault authentication failed: {}", e))
        }
    }
}
