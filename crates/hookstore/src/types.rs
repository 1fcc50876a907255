//! Core types for kubeconfig stores

use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Hierarchy separator for secret paths
pub const PATH_SEPARATOR: char = '/';

/// Data key holding the kubeconfig inside a Kubernetes secret
pub const DATA_KEY_KUBECONFIG: &str = "kubeconfig";

/// Identifies a concrete store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Filesystem,
    Vault,
    S3,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Filesystem => write!(f, "filesystem"),
            StoreKind::Vault => write!(f, "vault"),
            StoreKind::S3 => write!(f, "s3"),
        }
    }
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "filesystem" => Ok(StoreKind::Filesystem),
            "vault" => Ok(StoreKind::Vault),
            "s3" => Ok(StoreKind::S3),
            other => Err(format!(
                "Unknown store kind: {}. Valid kinds: filesystem, vault, s3",
                other
            )),
        }
    }
}

/// Children of a listed path; `None` when the path is absent or empty
pub type ListResult = Option<Vec<String>>;

/// Classification of one listed child name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildEntry {
    /// Subdirectory, holding the full path to recurse into
    Directory(String),
    /// Leaf secret, holding the full path to delete
    Secret(String),
    /// Empty name or a lone separator
    Skip,
}

impl ChildEntry {
    /// Classify `name` as listed under `parent`
    pub fn classify(parent: &str, name: &str) -> Self {
        if name.is_empty() {
            return ChildEntry::Skip;
        }

        match name.strip_suffix(PATH_SEPARATOR) {
            Some("") => ChildEntry::Skip,
            Some(_) => ChildEntry::Directory(join_path(parent, name)),
            None => ChildEntry::Secret(join_path(parent, name)),
        }
    }
}

/// Append a child segment to a secret path, trimming one trailing separator
/// from the parent first
pub fn join_path(parent: &str, child: &str) -> String {
    let parent = parent.strip_suffix(PATH_SEPARATOR).unwrap_or(parent);
    format!("{}{}{}", parent, PATH_SEPARATOR, child)
}

/// Object metadata of a Kubernetes secret
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// A Kubernetes `Secret` carrying a kubeconfig
///
/// Only the fields needed to locate the kubeconfig payload are modelled.
/// `data` values are base64 on the wire and decoded on load.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubeconfigSecret {
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub metadata: SecretObjectMeta,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub secret_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_base64_map",
        serialize_with = "serialize_base64_map"
    )]
    pub data: BTreeMap<String, Vec<u8>>,
}

fn default_api_version() -> String {
    "v1".to_string()
}

fn default_kind() -> String {
    "Secret".to_string()
}

fn deserialize_base64_map<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, Vec<u8>>, D::Error>
where
    D: Deserializer<'de>,
{
    let encoded: Option<BTreeMap<String, String>> = Option::deserialize(deserializer)?;
    encoded
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| {
            STANDARD
                .decode(value.trim())
                .map(|bytes| (key.clone(), bytes))
                .map_err(|e| {
                    serde::de::Error::custom(format!(
                        "data key '{}' is not valid base64: {}",
                        key, e
                    ))
                })
        })
        .collect()
}

fn serialize_base64_map<S>(
    data: &BTreeMap<String, Vec<u8>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeMap;

    let mut map = serializer.serialize_map(Some(data.len()))?;
    for (key, value) in data {
        map.serialize_entry(key, &STANDARD.encode(value))?;
    }
    map.end()
}

impl KubeconfigSecret {
    /// Create a secret with the given name and no data
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            metadata: SecretObjectMeta {
                name: name.into(),
                namespace: None,
            },
            secret_type: None,
            data: BTreeMap::new(),
        }
    }

    /// Set the kubeconfig payload
    pub fn with_kubeconfig(mut self, kubeconfig: impl Into<Vec<u8>>) -> Self {
        self.data
            .insert(DATA_KEY_KUBECONFIG.to_string(), kubeconfig.into());
        self
    }

    /// Parse a secret manifest; YAML is a superset of JSON so both are accepted
    pub fn from_manifest(manifest: &str) -> Result<Self> {
        serde_yaml_ng::from_str(manifest).map_err(|e| Error::InvalidSecret(e.to_string()))
    }

    /// The kubeconfig payload, empty when the secret carries none
    pub fn kubeconfig(&self) -> &[u8] {
        self.data
            .get(DATA_KEY_KUBECONFIG)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl fmt::Debug for KubeconfigSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<String> = self
            .data
            .iter()
            .map(|(k, v)| format!("{}=[REDACTED {} bytes]", k, v.len()))
            .collect();
        f.debug_struct("KubeconfigSecret")
            .field("name", &self.metadata.name)
            .field("namespace", &self.metadata.namespace)
            .field("data", &keys)
            .finish()
    }
}
