use crate::orchestrator::PROMPT_FOOTER;
use crate::traits::{AnswerGenerator, KnowledgeBaseRetriever};
use crate::{AskError, CareerAdvice, GenerationRequest, PassageSource, RetrievedPassage};
use tracing::info;

pub const CAREER_RESULTS: usize = 5;
const CAREER_MAX_TOKENS: u32 = 1_000;
const CAREER_PROMPT_HEADER: &str =
    "Based on the following context, please answer the user's question:";

pub struct CareerAdvisor<R, G>
where
    R: KnowledgeBaseRetriever,
    G: AnswerGenerator,
{
    retriever: R,
    generator: G,
    results: usize,
}

impl<R, G> CareerAdvisor<R, G>
where
    R: KnowledgeBaseRetriever + Send + Sync,
    G: AnswerGenerator + Send + Sync,
{
    pub fn new(retriever: R, generator: G) -> Self {
        Self {
            retriever,
            generator,
            results: CAREER_RESULTS,
        }
    }

    pub fn with_results(mut self, results: usize) -> Self {
        self.results = results;
        self
    }

    pub async fn advise(&self, query: &str) -> Result<CareerAdvice, AskError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AskError::InvalidRequest(vec!["Query is required".to_string()]));
        }

        let passages = self.retriever.retrieve(query, self.results).await?;
        let generation = GenerationRequest {
            prompt: build_career_prompt(&passages, query),
            max_tokens: CAREER_MAX_TOKENS,
        };
        let generated = self.generator.generate(&generation).await?;

        info!(
            knowledge_base = self.retriever.knowledge_base_id(),
            passages = passages.len(),
            answer_chars = generated.text.len(),
            "career query answered"
        );

        Ok(CareerAdvice {
            answer: generated.text,
            query: query.to_string(),
            knowledge_base_id: self.retriever.knowledge_base_id().to_string(),
            retrieved_chunks: passages.len(),
            sources: passages.iter().map(PassageSource::from).collect(),
        })
    }
}

pub fn build_career_prompt(passages: &[RetrievedPassage], query: &str) -> String {
    let context = passages
        .iter()
        .filter_map(|passage| passage.text.as_deref())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{CAREER_PROMPT_HEADER}\n\nContext:\n{context}\n\nQuestion: {query}\n\n{PROMPT_FOOTER}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingGenerator, FakeGenerator};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeKnowledgeBase {
        passages: Vec<RetrievedPassage>,
        calls: Mutex<Vec<(String, usize)>>,
    }

    impl FakeKnowledgeBase {
        fn new(passages: Vec<RetrievedPassage>) -> Self {
            Self {
                passages,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, usize)> {
            self.calls.lock().expect("lock not poisoned").clone()
        }
    }

    #[async_trait]
    impl KnowledgeBaseRetriever for FakeKnowledgeBase {
        fn knowledge_base_id(&self) -> &str {
            "KB-TEST"
        }

        async fn retrieve(
            &self,
            query: &str,
            limit: usize,
        ) -> Result<Vec<RetrievedPassage>, AskError> {
            self.calls
                .lock()
                .expect("lock not poisoned")
                .push((query.to_string(), limit));
            Ok(self.passages.clone())
        }
    }

    struct UnreachableKnowledgeBase;

    #[async_trait]
    impl KnowledgeBaseRetriever for UnreachableKnowledgeBase {
        fn knowledge_base_id(&self) -> &str {
            "KB-DOWN"
        }

        async fn retrieve(
            &self,
            _query: &str,
            _limit: usize,
        ) -> Result<Vec<RetrievedPassage>, AskError> {
            Err(AskError::BackendResponse {
                backend: "knowledge-base".to_string(),
                details: "500 Internal Server Error: ".to_string(),
            })
        }
    }

    fn passage(text: Option<&str>, source: Option<&str>, score: Option<f64>) -> RetrievedPassage {
        RetrievedPassage {
            text: text.map(str::to_string),
            source: source.map(str::to_string),
            score,
        }
    }

    #[tokio::test]
    async fn advice_uses_retrieved_passages_as_context() {
        let advisor = CareerAdvisor::new(
            FakeKnowledgeBase::new(vec![
                passage(Some("Nurses need a licence."), Some("s3://kb/nursing.pdf"), Some(0.9)),
                passage(None, None, None),
                passage(Some("Data analysts use SQL."), None, Some(0.5)),
            ]),
            FakeGenerator::default(),
        );

        let advice = advisor
            .advise("  Which careers suit me?  ")
            .await
            .expect("advice succeeds");

        assert_eq!(advice.answer, "Try a role in data analysis.");
        assert_eq!(advice.query, "Which careers suit me?");
        assert_eq!(advice.knowledge_base_id, "KB-TEST");
        assert_eq!(advice.retrieved_chunks, 3);
        assert_eq!(
            advice.sources,
            vec![
                PassageSource {
                    source: "s3://kb/nursing.pdf".to_string(),
                    score: 0.9
                },
                PassageSource {
                    source: "Unknown".to_string(),
                    score: 0.0
                },
                PassageSource {
                    source: "Unknown".to_string(),
                    score: 0.5
                },
            ]
        );

        assert_eq!(
            advisor.retriever.calls(),
            vec![("Which careers suit me?".to_string(), 5)]
        );

        let seen = advisor.generator.seen.lock().expect("lock not poisoned");
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].max_tokens, 1_000);
        assert_eq!(
            seen[0].prompt,
            "Based on the following context, please answer the user's question:\n\n\
             Context:\nNurses need a licence.\n\nData analysts use SQL.\n\n\
             Question: Which careers suit me?\n\n\
             Please provide a clear and concise answer based on the context provided."
        );
    }

    #[tokio::test]
    async fn blank_query_is_rejected_before_retrieval() {
        let advisor = CareerAdvisor::new(FakeKnowledgeBase::new(Vec::new()), FakeGenerator::default());

        match advisor.advise("   ").await {
            Err(AskError::InvalidRequest(problems)) => {
                assert_eq!(problems, vec!["Query is required".to_string()]);
            }
            other => panic!("expected invalid request, got {other:?}"),
        }
        assert!(advisor.retriever.calls().is_empty());
        assert!(advisor.generator.prompts().is_empty());
    }

    #[tokio::test]
    async fn empty_knowledge_base_still_asks_the_model() {
        let advisor = CareerAdvisor::new(FakeKnowledgeBase::new(Vec::new()), FakeGenerator::default())
            .with_results(2);

        let advice = advisor.advise("remote jobs").await.expect("advice succeeds");
        assert_eq!(advice.retrieved_chunks, 0);
        assert!(advice.sources.is_empty());
        assert_eq!(advisor.retriever.calls(), vec![("remote jobs".to_string(), 2)]);
        assert!(advisor.generator.prompts()[0].contains("Context:\n\n\nQuestion: remote jobs"));
    }

    #[tokio::test]
    async fn collaborator_failures_are_returned_unchanged() {
        let unreachable = CareerAdvisor::new(UnreachableKnowledgeBase, FakeGenerator::default());
        assert!(matches!(
            unreachable.advise("nursing").await,
            Err(AskError::BackendResponse { .. })
        ));
        assert!(unreachable.generator.prompts().is_empty());

        let failing = CareerAdvisor::new(
            FakeKnowledgeBase::new(vec![passage(Some("text"), None, None)]),
            FailingGenerator,
        );
        assert!(matches!(
            failing.advise("nursing").await,
            Err(AskError::BackendResponse { .. })
        ));
    }
}
