use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{new_saved_response, newest_first};
use crate::traits::SavedResponseStore;
use crate::{CreateSavedResponse, SavedResponse, SavedResponseUpdate, StoreError};

pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "saved_responses.json".to_string());
        self.path.with_file_name(format!(".{name}.tmp"))
    }

    async fn load(&self) -> Result<Vec<SavedResponse>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(error) => Err(StoreError::Io(error)),
        }
    }

    async fn persist(&self, responses: &[SavedResponse]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let payload = serde_json::to_vec_pretty(responses)?;
        let staging = self.staging_path();
        tokio::fs::write(&staging, payload).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        debug!(path = %self.path.display(), count = responses.len(), "saved responses written");
        Ok(())
    }
}

#[async_trait]
impl SavedResponseStore for JsonFileStore {
    async fn list(&self) -> Result<Vec<SavedResponse>, StoreError> {
        let _guard = self.lock.lock().await;
        let mut listed = self.load().await?;
        listed.reverse();
        newest_first(&mut listed);
        Ok(listed)
    }

    async fn get(&self, id: &str) -> Result<Option<SavedResponse>, StoreError> {
        let _guard = self.lock.lock().await;
        let responses = self.load().await?;
        Ok(responses.into_iter().find(|response| response.id == id))
    }

    async fn create(&self, request: CreateSavedResponse) -> Result<SavedResponse, StoreError> {
        let _guard = self.lock.lock().await;
        let mut responses = self.load().await?;
        let saved = new_saved_response(request);
        responses.push(saved.clone());
        self.persist(&responses).await?;
        info!(id = %saved.id, path = %self.path.display(), "saved response created");
        Ok(saved)
    }

    async fn update(
        &self,
        id: &str,
        changes: SavedResponseUpdate,
    ) -> Result<SavedResponse, StoreError> {
        let _guard = self.lock.lock().await;
        let mut responses = self.load().await?;
        let target = responses
            .iter_mut()
            .find(|response| response.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        changes.apply_to(target);
        let updated = target.clone();
        self.persist(&responses).await?;
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut responses = self.load().await?;
        let before = responses.len();
        responses.retain(|response| response.id != id);
        if responses.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.persist(&responses).await?;
        info!(id = %id, path = %self.path.display(), "saved response deleted");
        Ok(())
    }
}
