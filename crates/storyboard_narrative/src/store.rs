//! Storyboard persistence backends.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use storyboard_core::Storyboard;
use storyboard_error::{StorageError, StorageErrorKind};
use storyboard_interface::StoryboardStore;
use tokio::sync::RwLock;

/// Process-local store, mainly for tests and the offline CLI.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoryboardStore for InMemoryStore {
    async fn set(&self, run_id: &str, blob: Vec<u8>) -> Result<(), StorageError> {
        validate_run_id(run_id)?;
        self.blobs.write().await.insert(run_id.to_string(), blob);
        Ok(())
    }

    async fn get(&self, run_id: &str) -> Result<Option<Vec<u8>>, StorageError> {
        validate_run_id(run_id)?;
        Ok(self.blobs.read().await.get(run_id).cloned())
    }

    async fn list(&self) -> Result<Vec<String>, StorageError> {
        let mut ids: Vec<String> = self.blobs.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

/// One JSON file per run: `{base_path}/{run_id}.json`.
///
/// Writes go to a temporary file that is then renamed over the target.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `base_path`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;
        tracing::info!(path = %base_path.display(), "Opened storyboard file store");
        Ok(Self { base_path })
    }

    /// Root directory.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn path_for(&self, run_id: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", run_id))
    }
}

#[async_trait]
impl StoryboardStore for FileStore {
    #[tracing::instrument(skip(self, blob), fields(size = blob.len()))]
    async fn set(&self, run_id: &str, blob: Vec<u8>) -> Result<(), StorageError> {
        validate_run_id(run_id)?;
        let path = self.path_for(run_id);
        let temp_path = path.with_extension("json.tmp");

        tokio::fs::write(&temp_path, &blob).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;
        tokio::fs::rename(&temp_path, &path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })?;

        tracing::debug!(path = %path.display(), "Saved storyboard");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn get(&self, run_id: &str) -> Result<Option<Vec<u8>>, StorageError> {
        validate_run_id(run_id)?;
        let path = self.path_for(run_id);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))),
        }
    }

    async fn list(&self) -> Result<Vec<String>, StorageError> {
        let read_error = |e: std::io::Error| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                self.base_path.display(),
                e
            )))
        };
        let mut entries = tokio::fs::read_dir(&self.base_path)
            .await
            .map_err(read_error)?;
        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(read_error)? {
            let name = entry.file_name();
            if let Some(id) = name.to_str().and_then(|n| n.strip_suffix(".json")) {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// Run ids become file names, so only `[A-Za-z0-9_-]` is accepted.
fn validate_run_id(run_id: &str) -> Result<(), StorageError> {
    let valid = !run_id.is_empty()
        && run_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::new(StorageErrorKind::InvalidKey(
            run_id.to_string(),
        )))
    }
}

/// Serialize `storyboard` as JSON and store it under its run id.
///
/// # Errors
///
/// Returns an error if serialization or the store fails.
pub async fn save_storyboard(
    store: &dyn StoryboardStore,
    storyboard: &Storyboard,
) -> Result<(), StorageError> {
    let blob = serde_json::to_vec_pretty(storyboard)?;
    store.set(storyboard.run_id(), blob).await
}

/// Load and deserialize the storyboard saved under `run_id`.
///
/// # Errors
///
/// Returns [`StorageErrorKind::NotFound`] if nothing is saved under `run_id`,
/// or an error if the blob is not a storyboard.
pub async fn load_storyboard(
    store: &dyn StoryboardStore,
    run_id: &str,
) -> Result<Storyboard, StorageError> {
    let blob = store
        .get(run_id)
        .await?
        .ok_or_else(|| StorageError::new(StorageErrorKind::NotFound(run_id.to_string())))?;
    Ok(serde_json::from_slice(&blob)?)
}
