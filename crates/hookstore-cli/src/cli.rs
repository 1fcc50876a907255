//! CLI argument parsing with clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Hookstore - kubeconfig stores for landscape sync hooks
#[derive(Parser, Debug)]
#[command(name = "hookstore")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(flatten)]
    pub vault: VaultArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Vault connection flags, shared by every command
///
/// Each flag overrides the environment variable named in its help text.
#[derive(Args, Debug, Clone, Default)]
pub struct VaultArgs {
    /// Vault address [env: VAULT_ADDR]
    #[arg(long, global = true)]
    pub address: Option<String>,

    /// Vault token [env: VAULT_TOKEN]
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Vault namespace [env: VAULT_NAMESPACE]
    #[arg(long, global = true)]
    pub namespace: Option<String>,

    /// KV v2 mount holding the kubeconfigs, default "secret" [env: VAULT_KV_MOUNT]
    #[arg(long, global = true)]
    pub mount: Option<String>,

    /// Request timeout in seconds, default 30 [env: VAULT_TIMEOUT]
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Skip TLS verification [env: VAULT_SKIP_VERIFY]
    #[arg(long, global = true)]
    pub skip_verify: bool,

    /// Retries for transient Vault failures, 0 disables, default 3 [env: VAULT_MAX_RETRIES]
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// Maximum concurrent list/delete requests during a clean, unbounded if unset [env: HOOKSTORE_MAX_IN_FLIGHT]
    #[arg(long, global = true)]
    pub max_in_flight: Option<usize>,
}

impl VaultArgs {
    /// The value given on the command line for environment variable `key`
    pub fn flag_for(&self, key: &str) -> Option<String> {
        match key {
            "VAULT_ADDR" => self.address.clone(),
            "VAULT_TOKEN" => self.token.clone(),
            "VAULT_NAMESPACE" => self.namespace.clone(),
            "VAULT_KV_MOUNT" => self.mount.clone(),
            "VAULT_TIMEOUT" => self.timeout.map(|t| t.to_string()),
            "VAULT_SKIP_VERIFY" => self.skip_verify.then(|| "true".to_string()),
            "VAULT_MAX_RETRIES" => self.max_retries.map(|r| r.to_string()),
            "HOOKSTORE_MAX_IN_FLIGHT" => self.max_in_flight.map(|n| n.to_string()),
            _ => None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Recursively delete every kubeconfig under a path
    Clean(CleanArgs),

    /// Write the kubeconfig from a Secret manifest
    Write(WriteArgs),

    /// Prepare a landscape directory
    Prepare(PrepareArgs),

    /// Test Vault connection
    TestVault(TestVaultArgs),
}

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Secret path to clean, relative to the mount
    pub path: String,

    /// Output the summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct WriteArgs {
    /// Secret path to write under, relative to the mount
    pub path: String,

    /// Key the kubeconfig is stored under
    pub name: String,

    /// Kubernetes Secret manifest (YAML or JSON) carrying the kubeconfig
    #[arg(short, long)]
    pub secret_file: PathBuf,
}

#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Landscape directory to prepare
    pub directory: String,
}

#[derive(Args, Debug)]
pub struct TestVaultArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
