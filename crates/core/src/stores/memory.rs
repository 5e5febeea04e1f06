use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{new_saved_response, newest_first};
use crate::traits::SavedResponseStore;
use crate::{CreateSavedResponse, SavedResponse, SavedResponseUpdate, StoreError};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    responses: RwLock<Vec<SavedResponse>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SavedResponseStore for InMemoryStore {
    async fn list(&self) -> Result<Vec<SavedResponse>, StoreError> {
        let mut listed: Vec<SavedResponse> =
            self.responses.read().await.iter().rev().cloned().collect();
        newest_first(&mut listed);
        Ok(listed)
    }

    async fn get(&self, id: &str) -> Result<Option<SavedResponse>, StoreError> {
        let responses = self.responses.read().await;
        Ok(responses.iter().find(|response| response.id == id).cloned())
    }

    async fn create(&self, request: CreateSavedResponse) -> Result<SavedResponse, StoreError> {
        let saved = new_saved_response(request);
        debug!(id = %saved.id, store = "memory", "saved response created");
        self.responses.write().await.push(saved.clone());
        Ok(saved)
    }

    async fn update(
        &self,
        id: &str,
        changes: SavedResponseUpdate,
    ) -> Result<SavedResponse, StoreError> {
        let mut responses = self.responses.write().await;
        let target = responses
            .iter_mut()
            .find(|response| response.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        changes.apply_to(target);
        Ok(target.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut responses = self.responses.write().await;
        let before = responses.len();
        responses.retain(|response| response.id != id);
        if responses.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
