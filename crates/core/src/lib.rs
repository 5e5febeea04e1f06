pub mod career;
pub mod chunking;
pub mod context;
pub mod error;
pub mod extractor;
pub mod generator;
pub mod knowledge_base;
pub mod models;
pub mod orchestrator;
pub mod scoring;
pub mod selector;
pub mod stores;
pub mod traits;

#[cfg(test)]
mod test_support;

pub use career::{build_career_prompt, CareerAdvisor, CAREER_RESULTS};
pub use chunking::{chunk_text, clean_text, normalize_whitespace, ChunkingConfig};
pub use context::ContextSelector;
pub use error::{AskError, IngestError, StoreError};
pub use extractor::{join_pages, read_pdf, LopdfExtractor, PageText, PdfExtractor};
pub use generator::{GeneratorConfig, MessagesGenerator, DEFAULT_MODEL_ID, DEFAULT_REGION};
pub use knowledge_base::{KnowledgeBaseClient, KnowledgeBaseConfig};
pub use models::{
    AskRequest, AskResponse, CareerAdvice, CreateSavedResponse, DocumentChunk, GenerationRequest,
    GenerationResponse, PassageSource, QaOptions, RelevantChunk, RetrievedPassage, SavedResponse,
    SavedResponseUpdate, ScoredChunk, MAX_QUESTION_CHARS,
};
pub use orchestrator::{build_context, build_prompt, QuestionAnswerer};
pub use scoring::calculate_similarity;
pub use selector::search_chunks;
pub use stores::{InMemoryStore, JsonFileStore};
pub use traits::{AnswerGenerator, KnowledgeBaseRetriever, SavedResponseStore};
