use crate::context::ContextSelector;
use crate::extractor::{LopdfExtractor, PdfExtractor};
use crate::traits::AnswerGenerator;
use crate::{AskError, AskRequest, AskResponse, GenerationRequest, QaOptions, RelevantChunk, ScoredChunk};
use tracing::info;

const PROMPT_HEADER: &str = "Based on the following context from a PDF document, please answer the question. \
If the context doesn't contain enough information to answer the question, please say so.";
pub(crate) const PROMPT_FOOTER: &str =
    "Please provide a clear and concise answer based on the context provided.";

pub struct QuestionAnswerer<G, E = LopdfExtractor>
where
    G: AnswerGenerator,
    E: PdfExtractor,
{
    generator: G,
    selector: ContextSelector<E>,
}

impl<G> QuestionAnswerer<G, LopdfExtractor>
where
    G: AnswerGenerator + Send + Sync,
{
    pub fn new(generator: G) -> Self {
        Self::with_extractor(generator, LopdfExtractor)
    }
}

impl<G, E> QuestionAnswerer<G, E>
where
    G: AnswerGenerator + Send + Sync,
    E: PdfExtractor + Send + Sync,
{
    pub fn with_extractor(generator: G, extractor: E) -> Self {
        Self {
            generator,
            selector: ContextSelector::with_extractor(extractor),
        }
    }

    pub fn with_options(mut self, options: QaOptions) -> Self {
        self.selector = self.selector.with_options(options);
        self
    }

    pub fn selector(&self) -> &ContextSelector<E> {
        &self.selector
    }

    pub async fn ask(&self, request: &AskRequest) -> Result<AskResponse, AskError> {
        let relevant = self.selector.select(request)?;
        let options = self.selector.options();

        let generation = GenerationRequest {
            prompt: build_prompt(&relevant, &request.question),
            max_tokens: options.max_tokens,
        };
        let generated = self.generator.generate(&generation).await?;

        info!(
            file = %request.file_name,
            chunks = relevant.len(),
            answer_chars = generated.text.len(),
            "question answered"
        );

        Ok(AskResponse {
            answer: generated.text,
            relevant_chunks: relevant
                .iter()
                .map(|chunk| RelevantChunk::preview(chunk, options.preview_chars))
                .collect(),
            success: true,
        })
    }
}

pub fn build_context(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_prompt(chunks: &[ScoredChunk], question: &str) -> String {
    format!(
        "{PROMPT_HEADER}\n\nContext:\n{}\n\nQuestion: {question}\n\n{PROMPT_FOOTER}",
        build_context(chunks)
    )
}
