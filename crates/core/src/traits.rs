use crate::{
    AskError, CreateSavedResponse, GenerationRequest, GenerationResponse, RetrievedPassage,
    SavedResponse, SavedResponseUpdate, StoreError,
};
use async_trait::async_trait;

#[async_trait]
pub trait AnswerGenerator {
    async fn generate(&self, request: &GenerationRequest)
        -> Result<GenerationResponse, AskError>;
}

#[async_trait]
pub trait KnowledgeBaseRetriever {
    fn knowledge_base_id(&self) -> &str;

    async fn retrieve(&self, query: &str, limit: usize)
        -> Result<Vec<RetrievedPassage>, AskError>;
}

#[async_trait]
pub trait SavedResponseStore {
    /// Newest first.
    async fn list(&self) -> Result<Vec<SavedResponse>, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<SavedResponse>, StoreError>;

    async fn create(&self, request: CreateSavedResponse) -> Result<SavedResponse, StoreError>;

    async fn update(
        &self,
        id: &str,
        changes: SavedResponseUpdate,
    ) -> Result<SavedResponse, StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}
