//! Recursive deletion of a secret tree
//!
//! Every subdirectory found while listing gets its own task, leaves are
//! deleted in place by the branch that found them, and each branch waits for
//! the branches it spawned. Waiting at every level means the root call
//! returns only after the deepest branch is done.

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::security::sanitize_error;
use crate::types::{ChildEntry, ListResult};
use crate::vault::client::KvClient;
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use tokio::sync::{Semaphore, SemaphorePermit};
use tokio::task::JoinHandle;
use tracing::debug;

/// Walks a KV tree and deletes every leaf secret below a root path
#[derive(Clone)]
pub struct TreeCleaner {
    client: Arc<dyn KvClient>,
    sink: Arc<dyn DiagnosticSink>,
    limiter: Option<Arc<Semaphore>>,
}

impl TreeCleaner {
    pub fn new(client: Arc<dyn KvClient>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            client,
            sink,
            limiter: None,
        }
    }

    /// Cap the number of list/delete requests in flight at once
    ///
    /// Permits are held only for the duration of a single request, never
    /// while a branch waits on its children.
    pub fn with_max_in_flight(mut self, max_in_flight: Option<usize>) -> Self {
        self.limiter = max_in_flight
            .filter(|n| *n > 0)
            .map(|n| Arc::new(Semaphore::new(n)));
        self
    }

    /// Delete everything below `root`
    ///
    /// Never fails: list and delete errors are recorded on the sink and the
    /// affected branch or leaf is skipped.
    pub async fn clean(&self, root: &str) {
        self.clone().clean_branch(root.to_string()).await
    }

    fn clean_branch(self, path: String) -> BoxFuture<'static, ()> {
        async move {
            let Some(children) = self.list(&path).await else {
                return;
            };

            let mut branches: Vec<(String, JoinHandle<()>)> = Vec::new();
            for name in &children {
                match ChildEntry::classify(&path, name) {
                    ChildEntry::Directory(dir) => {
                        let handle = tokio::spawn(self.clone().clean_branch(dir.clone()));
                        branches.push((dir, handle));
                    }
                    ChildEntry::Secret(secret) => self.delete(&secret).await,
                    ChildEntry::Skip => {}
                }
            }

            for (dir, handle) in branches {
                if let Err(e) = handle.await {
                    self.sink.record(Diagnostic::BranchAborted {
                        path: dir,
                        error: e.to_string(),
                    });
                }
            }
        }
        .boxed()
    }

    /// Children of `path`, or `None` when the branch ends here
    async fn list(&self, path: &str) -> ListResult {
        let result = {
            let _permit = self.permit().await;
            self.client.list(path).await
        };

        match result {
            Ok(Some(children)) if !children.is_empty() => {
                debug!("Found {} entries under {}", children.len(), path);
                Some(children)
            }
            Ok(_) => {
                self.sink.record(Diagnostic::NoSecrets {
                    path: path.to_string(),
                });
                None
            }
            Err(e) => {
                self.sink.record(Diagnostic::ListFailed {
                    path: path.to_string(),
                    error: sanitize_error(&e.to_string()),
                });
                None
            }
        }
    }

    async fn delete(&self, path: &str) {
        let result = {
            let _permit = self.permit().await;
            self.client.delete(path).await
        };

        let diagnostic = match result {
            Ok(()) => Diagnostic::Deleted {
                path: path.to_string(),
            },
            Err(e) => Diagnostic::DeleteFailed {
                path: path.to_string(),
                error: sanitize_error(&e.to_string()),
            },
        };
        self.sink.record(diagnostic);
    }

    async fn permit(&self) -> Option<SemaphorePermit<'_>> {
        match &self.limiter {
            Some(limiter) => limiter.acquire().await.ok(),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use crate::error::BackendError;
    use async_trait::async_trait;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Mutex;

    /// Static listing table; deletes are recorded, never applied
    #[derive(Default)]
    struct TableClient {
        listings: BTreeMap<String, Vec<String>>,
        deleted: Mutex<Vec<String>>,
    }

    impl TableClient {
        fn with(mut self, path: &str, children: &[&str]) -> Self {
            self.listings.insert(
                path.to_string(),
                children.iter().map(|c| c.to_string()).collect(),
            );
            self
        }
    }

    #[async_trait]
    impl KvClient for TableClient {
        async fn list(&self, path: &str) -> Result<ListResult, BackendError> {
            Ok(self.listings.get(path).cloned())
        }

        async fn delete(&self, path: &str) -> Result<(), BackendError> {
            self.deleted.lock().unwrap().push(path.to_string());
            Ok(())
        }

        async fn write(
            &self,
            _path: &str,
            _data: &HashMap<String, String>,
        ) -> Result<(), BackendError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_skips_empty_and_separator_names() {
        let client = Arc::new(TableClient::default().with("root", &["", "/", "leaf"]));
        let sink = Arc::new(MemorySink::new());
        let cleaner = TreeCleaner::new(client.clone(), sink.clone());

        cleaner.clean("root").await;

        assert_eq!(*client.deleted.lock().unwrap(), vec!["root/leaf".to_string()]);
        assert!(sink.failures().is_empty());
    }

    #[tokio::test]
    async fn test_absent_root_records_no_secrets() {
        let client = Arc::new(TableClient::default());
        let sink = Arc::new(MemorySink::new());
        let cleaner = TreeCleaner::new(client.clone(), sink.clone());

        cleaner.clean("missing").await;

        assert!(client.deleted.lock().unwrap().is_empty());
        assert_eq!(
            sink.entries(),
            vec![Diagnostic::NoSecrets {
                path: "missing".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_limited_cleaner_still_visits_every_branch() {
        let client = Arc::new(
            TableClient::default()
                .with("root", &["a/", "b/", "top"])
                .with("root/a/", &["x", "y"])
                .with("root/b/", &["c/"])
                .with("root/b/c/", &["z"]),
        );
        let sink = Arc::new(MemorySink::new());
        let cleaner = TreeCleaner::new(client.clone(), sink.clone()).with_max_in_flight(Some(1));

        cleaner.clean("root").await;

        assert_eq!(
            sink.deleted_paths(),
            vec![
                "root/a/x".to_string(),
                "root/a/y".to_string(),
                "root/b/c/z".to_string(),
                "root/top".to_string(),
            ]
        );
    }
}
