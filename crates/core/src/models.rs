use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

pub const MAX_QUESTION_CHARS: usize = 500;
const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub content: String,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub content: String,
    pub score: f64,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevantChunk {
    pub content: String,
    pub score: f64,
}

impl RelevantChunk {
    pub fn preview(chunk: &ScoredChunk, max_chars: usize) -> Self {
        let head: String = chunk.content.chars().take(max_chars).collect();
        Self {
            content: format!("{head}..."),
            score: chunk.score,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AskRequest {
    pub file_name: String,
    pub pdf: Vec<u8>,
    pub question: String,
}

impl AskRequest {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.pdf.is_empty() {
            errors.push("PDF file is required".to_string());
        } else if !self.pdf.starts_with(PDF_MAGIC) {
            errors.push("File must be a PDF".to_string());
        }

        if self.question.trim().is_empty() {
            errors.push("Question is required".to_string());
        } else if self.question.chars().count() > MAX_QUESTION_CHARS {
            errors.push(format!(
                "Question must be {MAX_QUESTION_CHARS} characters or less"
            ));
        }

        errors
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    pub relevant_chunks: Vec<RelevantChunk>,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievedPassage {
    pub text: Option<String>,
    pub source: Option<String>,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassageSource {
    pub source: String,
    pub score: f64,
}

impl From<&RetrievedPassage> for PassageSource {
    fn from(passage: &RetrievedPassage) -> Self {
        Self {
            source: passage
                .source
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            score: passage.score.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerAdvice {
    pub answer: String,
    pub query: String,
    pub knowledge_base_id: String,
    pub retrieved_chunks: usize,
    pub sources: Vec<PassageSource>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedResponse {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub file_name: String,
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub user_id: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateSavedResponse {
    pub question: String,
    pub answer: String,
    pub file_name: String,
    pub tags: Option<Vec<String>>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedResponseUpdate {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub file_name: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl SavedResponseUpdate {
    pub fn apply_to(self, target: &mut SavedResponse) {
        if let Some(question) = self.question {
            target.question = question;
        }
        if let Some(answer) = self.answer {
            target.answer = answer;
        }
        if let Some(file_name) = self.file_name {
            target.file_name = file_name;
        }
        if let Some(tags) = self.tags {
            target.tags = clean_tags(tags);
        }
    }
}

pub(crate) fn clean_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

#[derive(Debug, Clone)]
pub struct QaOptions {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub min_text_chars: usize,
    pub preview_chars: usize,
    pub max_tokens: u32,
}

impl Default for QaOptions {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            top_k: 3,
            min_text_chars: 10,
            preview_chars: 200,
            max_tokens: 1_000,
        }
    }
}
