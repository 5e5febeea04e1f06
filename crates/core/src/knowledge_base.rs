use crate::generator::{endpoint_url, ensure_success};
use crate::traits::KnowledgeBaseRetriever;
use crate::{AskError, RetrievedPassage};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

const BACKEND: &str = "knowledge-base";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeBaseConfig {
    pub endpoint: String,
    pub knowledge_base_id: String,
    pub api_key: Option<String>,
}

impl KnowledgeBaseConfig {
    pub fn for_region(region: &str, knowledge_base_id: &str) -> Self {
        Self {
            endpoint: format!("https://bedrock-agent-runtime.{region}.amazonaws.com"),
            knowledge_base_id: knowledge_base_id.to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveRequest<'a> {
    retrieval_query: RetrievalQuery<'a>,
    retrieval_configuration: RetrievalConfiguration,
}

#[derive(Debug, Serialize)]
struct RetrievalQuery<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrievalConfiguration {
    vector_search_configuration: VectorSearchConfiguration,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VectorSearchConfiguration {
    number_of_results: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveReply {
    #[serde(default)]
    retrieval_results: Vec<RetrievalResult>,
}

#[derive(Debug, Default, Deserialize)]
struct RetrievalResult {
    #[serde(default)]
    content: Option<ResultContent>,
    #[serde(default)]
    location: Option<ResultLocation>,
    #[serde(default)]
    score: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct ResultContent {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultLocation {
    #[serde(default)]
    s3_location: Option<S3Location>,
}

#[derive(Debug, Default, Deserialize)]
struct S3Location {
    #[serde(default)]
    uri: Option<String>,
}

impl<'a> RetrieveRequest<'a> {
    fn new(query: &'a str, limit: usize) -> Self {
        Self {
            retrieval_query: RetrievalQuery { text: query },
            retrieval_configuration: RetrievalConfiguration {
                vector_search_configuration: VectorSearchConfiguration {
                    number_of_results: limit,
                },
            },
        }
    }
}

impl From<RetrievalResult> for RetrievedPassage {
    fn from(result: RetrievalResult) -> Self {
        Self {
            text: result.content.and_then(|content| content.text),
            source: result
                .location
                .and_then(|location| location.s3_location)
                .and_then(|s3| s3.uri),
            score: result.score,
        }
    }
}

pub struct KnowledgeBaseClient {
    client: Client,
    retrieve_url: Url,
    knowledge_base_id: String,
    api_key: Option<String>,
}

impl KnowledgeBaseClient {
    pub fn new(config: KnowledgeBaseConfig) -> Result<Self, AskError> {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: KnowledgeBaseConfig, client: Client) -> Result<Self, AskError> {
        let knowledge_base_id = config.knowledge_base_id.trim().to_string();
        if knowledge_base_id.is_empty() {
            return Err(AskError::Config("knowledge base id is empty".to_string()));
        }

        Ok(Self {
            client,
            retrieve_url: endpoint_url(
                &config.endpoint,
                &["knowledgebases", knowledge_base_id.as_str(), "retrieve"],
            )?,
            knowledge_base_id,
            api_key: config.api_key,
        })
    }

    pub fn retrieve_url(&self) -> &Url {
        &self.retrieve_url
    }
}

#[async_trait]
impl KnowledgeBaseRetriever for KnowledgeBaseClient {
    fn knowledge_base_id(&self) -> &str {
        &self.knowledge_base_id
    }

    async fn retrieve(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RetrievedPassage>, AskError> {
        debug!(url = %self.retrieve_url, limit, "retrieving passages");

        let mut call = self
            .client
            .post(self.retrieve_url.clone())
            .header("accept", "application/json")
            .json(&RetrieveRequest::new(query, limit));

        if let Some(api_key) = &self.api_key {
            call = call.bearer_auth(api_key);
        }

        let response = ensure_success(BACKEND, call.send().await?).await?;
        let reply: RetrieveReply = response.json().await?;
        Ok(reply
            .retrieval_results
            .into_iter()
            .map(RetrievedPassage::from)
            .collect())
    }
}
