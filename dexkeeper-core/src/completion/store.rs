//! Completion store backends
//!
//! The store holds one record per species identity and offers two
//! operations: a full snapshot, and a full replace of one record. It does
//! not enforce the normal/shiny lattice; [`super::CompletionEngine`] does.
//!
//! - [`MemoryStore`] - in-process map
//! - [`FileStore`] - JSON file, rewritten atomically on every change
//! - [`HttpStore`] - remote store over HTTP (`GET state`, `PUT pokemon/{name}`)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use super::{CompletionRecord, CompletionState};
use crate::error::StoreError;

/// Full store contents: `{ "caught": { apiName: { normal, shiny } } }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionSnapshot {
    #[serde(default)]
    pub caught: BTreeMap<String, CompletionRecord>,
}

impl CompletionSnapshot {
    /// Decode a snapshot body, from a file or the `state` endpoint
    pub fn from_json(content: &str) -> Result<Self, StoreError> {
        serde_json::from_str(content).map_err(|source| StoreError::Serialization { source })
    }

    /// Raw record for a species; absent records are both-false
    pub fn record(&self, api_name: &str) -> CompletionRecord {
        self.caught.get(api_name).copied().unwrap_or_default()
    }

    /// Lattice state for a species
    pub fn state(&self, api_name: &str) -> CompletionState {
        self.record(api_name).into()
    }
}

/// Trait for completion store backends
#[async_trait]
pub trait CompletionStore: Send + Sync {
    /// Read the full snapshot
    async fn snapshot(&self) -> Result<CompletionSnapshot, StoreError>;

    /// Replace one record
    async fn put(&self, api_name: &str, record: CompletionRecord) -> Result<(), StoreError>;

    /// Backend identifier for logging/debugging
    fn name(&self) -> &'static str;
}

/// In-process store
#[derive(Default)]
pub struct MemoryStore {
    caught: RwLock<BTreeMap<String, CompletionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing snapshot
    pub fn with_snapshot(snapshot: CompletionSnapshot) -> Self {
        Self {
            caught: RwLock::new(snapshot.caught),
        }
    }
}

#[async_trait]
impl CompletionStore for MemoryStore {
    async fn snapshot(&self) -> Result<CompletionSnapshot, StoreError> {
        Ok(CompletionSnapshot {
            caught: self.caught.read().await.clone(),
        })
    }

    async fn put(&self, api_name: &str, record: CompletionRecord) -> Result<(), StoreError> {
        self.caught.write().await.insert(api_name.to_string(), record);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// JSON file store
///
/// The file is read once on open (a missing file is an empty store) and
/// rewritten on every `put` by writing a temporary sibling and renaming it
/// over the target.
pub struct FileStore {
    path: PathBuf,
    caught: Mutex<BTreeMap<String, CompletionRecord>>,
}

impl FileStore {
    /// Open the store at `path`
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let caught = match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                let snapshot = CompletionSnapshot::from_json(&content)?;
                info!(
                    "Loaded completion state: {} species from {}",
                    snapshot.caught.len(),
                    path.display()
                );
                snapshot.caught
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No completion file at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        Ok(Self {
            path,
            caught: Mutex::new(caught),
        })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, caught: &BTreeMap<String, CompletionRecord>) -> Result<(), StoreError> {
        let io_error = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
            }
        }

        let snapshot = CompletionSnapshot {
            caught: caught.clone(),
        };
        let content = serde_json::to_string_pretty(&snapshot)
            .map_err(|source| StoreError::Serialization { source })?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, content).await.map_err(io_error)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_error)?;
        Ok(())
    }
}

#[async_trait]
impl CompletionStore for FileStore {
    async fn snapshot(&self) -> Result<CompletionSnapshot, StoreError> {
        Ok(CompletionSnapshot {
            caught: self.caught.lock().await.clone(),
        })
    }

    async fn put(&self, api_name: &str, record: CompletionRecord) -> Result<(), StoreError> {
        let mut caught = self.caught.lock().await;
        caught.insert(api_name.to_string(), record);
        self.persist(&caught).await
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

/// Remote store speaking the `state` / `pokemon/{name}` HTTP contract
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStore {
    pub fn new(base_url: &str, timeout_seconds: u64) -> anyhow::Result<Self> {
        use anyhow::Context;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: format!("{}/", base_url.trim_end_matches('/')),
        })
    }

    fn state_url(&self) -> String {
        format!("{}state", self.base_url)
    }

    fn record_url(&self, api_name: &str) -> String {
        format!("{}pokemon/{}", self.base_url, api_name)
    }

    fn unavailable(endpoint: &str, e: reqwest::Error) -> StoreError {
        StoreError::Unavailable {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl CompletionStore for HttpStore {
    async fn snapshot(&self) -> Result<CompletionSnapshot, StoreError> {
        let url = self.state_url();
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::unavailable(&url, e))?;

        if !response.status().is_success() {
            return Err(StoreError::Rejected {
                operation: "GET state".to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| Self::unavailable(&url, e))?;
        CompletionSnapshot::from_json(&body)
    }

    async fn put(&self, api_name: &str, record: CompletionRecord) -> Result<(), StoreError> {
        let url = self.record_url(api_name);
        let response = self
            .client
            .put(&url)
            .json(&record)
            .send()
            .await
            .map_err(|e| Self::unavailable(&url, e))?;

        if !response.status().is_success() {
            return Err(StoreError::Rejected {
                operation: format!("PUT pokemon/{api_name}"),
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
