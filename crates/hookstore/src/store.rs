//! Kubeconfig store contract

use crate::error::Result;
use crate::types::{KubeconfigSecret, StoreKind};
use async_trait::async_trait;

/// Capabilities every kubeconfig backend provides
///
/// Callers hold a `dyn KubeconfigStore` and never branch on the concrete
/// backend beyond what [`KubeconfigStore::kind`] reports.
#[async_trait]
pub trait KubeconfigStore: Send + Sync {
    /// Backend identifier
    fn kind(&self) -> StoreKind;

    /// Prepare the namespace that groups one landscape's kubeconfigs
    ///
    /// Backends with implicit directories succeed without doing anything.
    async fn create_landscape_directory(&self, directory: &str) -> Result<()>;

    /// Write the kubeconfig carried by `secret` under `path`, keyed by `name`
    ///
    /// The payload is written as-is; a secret without a kubeconfig produces
    /// an empty value rather than an error.
    async fn write_kubeconfig_file(
        &self,
        path: &str,
        name: &str,
        secret: &KubeconfigSecret,
    ) -> Result<()>;

    /// Delete every kubeconfig below `path`
    ///
    /// Best effort: failures during the walk go to the store's diagnostic
    /// sink, and the call returns once the whole tree has been visited.
    async fn clean_existing_kubeconfigs(&self, path: &str) -> Result<()>;
}
