use crate::chunking::{chunk_text, clean_text, ChunkingConfig};
use crate::extractor::{LopdfExtractor, PdfExtractor};
use crate::selector::search_chunks;
use crate::{AskError, AskRequest, IngestError, QaOptions, ScoredChunk};
use tracing::debug;

pub struct ContextSelector<E = LopdfExtractor>
where
    E: PdfExtractor,
{
    extractor: E,
    options: QaOptions,
}

impl ContextSelector<LopdfExtractor> {
    pub fn new() -> Self {
        Self::with_extractor(LopdfExtractor)
    }
}

impl Default for ContextSelector<LopdfExtractor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> ContextSelector<E>
where
    E: PdfExtractor + Send + Sync,
{
    pub fn with_extractor(extractor: E) -> Self {
        Self {
            extractor,
            options: QaOptions::default(),
        }
    }

    pub fn with_options(mut self, options: QaOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &QaOptions {
        &self.options
    }

    pub fn select(&self, request: &AskRequest) -> Result<Vec<ScoredChunk>, AskError> {
        let problems = request.validate();
        if !problems.is_empty() {
            return Err(AskError::InvalidRequest(problems));
        }

        let raw = self.extractor.extract_text(&request.pdf)?;
        let text = clean_text(&raw)?;
        let chars = text.chars().count();
        if chars < self.options.min_text_chars {
            return Err(AskError::TextTooShort { chars });
        }

        let relevant = self.retrieve(&text, &request.question)?;
        if relevant.is_empty() {
            return Err(AskError::NoRelevantContent);
        }

        debug!(
            file = %request.file_name,
            text_chars = chars,
            selected = relevant.len(),
            best_score = relevant[0].score,
            "context selected"
        );
        Ok(relevant)
    }

    pub fn retrieve(&self, text: &str, question: &str) -> Result<Vec<ScoredChunk>, AskError> {
        let chunks = chunk_text(text, ChunkingConfig::from(&self.options)).map_err(|error| {
            match error {
                IngestError::InvalidChunkConfig(details) => AskError::InvalidOptions(details),
                other => AskError::Extraction(other),
            }
        })?;
        Ok(search_chunks(question, &chunks, self.options.top_k))
    }
}
