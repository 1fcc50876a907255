//! Common test helpers for hookstore integration tests
//!
//! Provides an in-memory hierarchical KV store that behaves like a Vault KV
//! v2 metadata tree:
//! - folders are implicit and disappear once their last child is deleted
//! - every list/delete/write call is recorded for verification
//! - list and delete failures can be injected per path
//! - list calls can be delayed per path to shape branch timing

#![allow(dead_code)]

use async_trait::async_trait;
use hookstore::error::BackendError;
use hookstore::{KvClient, ListResult};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A call made against the fake store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(String),
    Delete(String),
    Write(String, HashMap<String, String>),
}

/// Normalize a secret path to the form used as a map key
pub fn key(path: &str) -> String {
    path.trim_matches('/').to_string()
}

#[derive(Default)]
pub struct FakeKv {
    /// folder key -> child names as a list call returns them
    tree: Mutex<BTreeMap<String, BTreeSet<String>>>,
    calls: Mutex<Vec<Call>>,
    /// path key -> error message
    fail_list: Mutex<HashMap<String, String>>,
    fail_delete: Mutex<HashMap<String, String>>,
    list_delays: Mutex<HashMap<String, Duration>>,
    /// Raw listings returned verbatim for the exact path listed, bypassing the tree
    raw_listings: Mutex<HashMap<String, Vec<String>>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeKv {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Create a leaf secret and all of its parent folders
    pub fn insert_secret(&self, path: &str) -> &Self {
        let full = key(path);
        let segments: Vec<&str> = full.split('/').collect();
        let mut tree = self.tree.lock().unwrap();
        for depth in 0..segments.len() {
            let parent = segments[..depth].join("/");
            let child = if depth + 1 == segments.len() {
                segments[depth].to_string()
            } else {
                format!("{}/", segments[depth])
            };
            tree.entry(parent).or_default().insert(child);
        }
        self
    }

    /// Make a folder list as present but empty
    pub fn insert_empty_folder(&self, path: &str) -> &Self {
        let full = key(path);
        let (parent, name) = match full.rsplit_once('/') {
            Some((parent, name)) => (parent.to_string(), name.to_string()),
            None => (String::new(), full.clone()),
        };
        let mut tree = self.tree.lock().unwrap();
        tree.entry(parent).or_default().insert(format!("{}/", name));
        tree.entry(full).or_default();
        self
    }

    /// Return `children` verbatim when exactly `path` is listed
    pub fn set_raw_listing(&self, path: &str, children: &[&str]) -> &Self {
        self.raw_listings.lock().unwrap().insert(
            path.to_string(),
            children.iter().map(|c| c.to_string()).collect(),
        );
        self
    }

    pub fn fail_list(&self, path: &str) -> &Self {
        let message = format!("permission denied listing {}", key(path));
        self.fail_list_with(path, &message)
    }

    pub fn fail_list_with(&self, path: &str, message: &str) -> &Self {
        self.fail_list
            .lock()
            .unwrap()
            .insert(key(path), message.to_string());
        self
    }

    pub fn fail_delete(&self, path: &str) -> &Self {
        let message = format!("permission denied deleting {}", key(path));
        self.fail_delete_with(path, &message)
    }

    pub fn fail_delete_with(&self, path: &str, message: &str) -> &Self {
        self.fail_delete
            .lock()
            .unwrap()
            .insert(key(path), message.to_string());
        self
    }

    pub fn delay_list(&self, path: &str, delay: Duration) -> &Self {
        self.list_delays.lock().unwrap().insert(key(path), delay);
        self
    }

    /// All leaf secrets still stored below `root`, sorted
    pub fn remaining_secrets(&self, root: &str) -> Vec<String> {
        let tree = self.tree.lock().unwrap();
        let mut found = Vec::new();
        let mut pending = vec![key(root)];
        while let Some(folder) = pending.pop() {
            let Some(children) = tree.get(&folder) else {
                continue;
            };
            for child in children {
                let path = if folder.is_empty() {
                    child.clone()
                } else {
                    format!("{}/{}", folder, child)
                };
                match path.strip_suffix('/') {
                    Some(dir) => pending.push(dir.to_string()),
                    None => found.push(path),
                }
            }
        }
        found.sort();
        found
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Deleted paths in the form the engine requested them, sorted
    pub fn delete_calls(&self) -> Vec<String> {
        let mut deletes: Vec<String> = self
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete(path) => Some(path),
                _ => None,
            })
            .collect();
        deletes.sort();
        deletes
    }

    pub fn list_calls(&self) -> Vec<String> {
        let mut lists: Vec<String> = self
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::List(path) => Some(path),
                _ => None,
            })
            .collect();
        lists.sort();
        lists
    }

    /// Highest number of concurrent list/delete calls observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    fn remove_secret(&self, path: &str) {
        let full = key(path);
        let mut tree = self.tree.lock().unwrap();
        let mut current = full;
        let mut name_suffix = "";
        loop {
            let (parent, name) = match current.rsplit_once('/') {
                Some((parent, name)) => (parent.to_string(), name.to_string()),
                None => (String::new(), current.clone()),
            };
            let now_empty = match tree.get_mut(&parent) {
                Some(children) => {
                    children.remove(&format!("{}{}", name, name_suffix));
                    children.is_empty()
                }
                None => false,
            };
            if !now_empty || parent.is_empty() {
                break;
            }
            tree.remove(&parent);
            current = parent;
            name_suffix = "/";
        }
    }
}

#[async_trait]
impl KvClient for FakeKv {
    async fn list(&self, path: &str) -> Result<ListResult, BackendError> {
        self.calls.lock().unwrap().push(Call::List(path.to_string()));
        let k = key(path);

        let delay = self.list_delays.lock().unwrap().get(&k).copied();
        self.enter();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        } else {
            tokio::task::yield_now().await;
        }
        self.exit();

        if let Some(message) = self.fail_list.lock().unwrap().get(&k) {
            return Err(message.clone().into());
        }
        if let Some(raw) = self.raw_listings.lock().unwrap().get(path) {
            return Ok(Some(raw.clone()));
        }

        let tree = self.tree.lock().unwrap();
        Ok(tree
            .get(&k)
            .filter(|children| !children.is_empty())
            .map(|children| children.iter().cloned().collect()))
    }

    async fn delete(&self, path: &str) -> Result<(), BackendError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Delete(path.to_string()));

        self.enter();
        tokio::task::yield_now().await;
        self.exit();

        if let Some(message) = self.fail_delete.lock().unwrap().get(&key(path)) {
            return Err(message.clone().into());
        }
        self.remove_secret(path);
        Ok(())
    }

    async fn write(
        &self,
        path: &str,
        data: &HashMap<String, String>,
    ) -> Result<(), BackendError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Write(path.to_string(), data.clone()));
        Ok(())
    }
}
