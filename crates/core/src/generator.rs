use crate::traits::AnswerGenerator;
use crate::{AskError, GenerationRequest, GenerationResponse};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_REGION: &str = "us-west-2";
pub const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-sonnet-20240229-v1:0";
const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";
const BACKEND: &str = "model-endpoint";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub endpoint: String,
    pub model_id: String,
    pub api_key: Option<String>,
}

impl GeneratorConfig {
    pub fn for_region(region: &str) -> Self {
        Self {
            endpoint: regional_endpoint(region),
            model_id: DEFAULT_MODEL_ID.to_string(),
            api_key: None,
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key).and_then(|value| {
                let value = value.trim().to_string();
                if value.is_empty() {
                    None
                } else {
                    Some(value)
                }
            })
        };

        let region = read("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string());
        Self {
            endpoint: read("PDF_QA_ENDPOINT").unwrap_or_else(|| regional_endpoint(&region)),
            model_id: read("PDF_QA_MODEL_ID").unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            api_key: read("PDF_QA_API_KEY"),
        }
    }
}

fn regional_endpoint(region: &str) -> String {
    format!("https://bedrock-runtime.{region}.amazonaws.com")
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    anthropic_version: &'static str,
    max_tokens: u32,
    messages: [UserMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: [TextBlock<'a>; 1],
}

#[derive(Debug, Serialize)]
struct TextBlock<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesReply {
    #[serde(default)]
    content: Vec<ReplyBlock>,
}

#[derive(Debug, Deserialize)]
struct ReplyBlock {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl<'a> MessagesRequest<'a> {
    fn new(request: &'a GenerationRequest) -> Self {
        Self {
            anthropic_version: ANTHROPIC_VERSION,
            max_tokens: request.max_tokens,
            messages: [UserMessage {
                role: "user",
                content: [TextBlock {
                    kind: "text",
                    text: &request.prompt,
                }],
            }],
        }
    }
}

fn parse_reply(reply: MessagesReply) -> Result<GenerationResponse, AskError> {
    reply
        .content
        .into_iter()
        .find(|block| block.kind == "text")
        .and_then(|block| block.text)
        .map(|text| GenerationResponse { text })
        .ok_or_else(|| AskError::BackendResponse {
            backend: BACKEND.to_string(),
            details: "reply has no text content block".to_string(),
        })
}

pub struct MessagesGenerator {
    client: Client,
    invoke_url: Url,
    api_key: Option<String>,
}

impl MessagesGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self, AskError> {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: GeneratorConfig, client: Client) -> Result<Self, AskError> {
        Ok(Self {
            client,
            invoke_url: invoke_url(&config.endpoint, &config.model_id)?,
            api_key: config.api_key,
        })
    }

    pub fn invoke_url(&self) -> &Url {
        &self.invoke_url
    }
}

fn invoke_url(endpoint: &str, model_id: &str) -> Result<Url, AskError> {
    if model_id.trim().is_empty() {
        return Err(AskError::Config("model id is empty".to_string()));
    }
    endpoint_url(endpoint, &["model", model_id, "invoke"])
}

pub(crate) fn endpoint_url(endpoint: &str, segments: &[&str]) -> Result<Url, AskError> {
    let mut url = Url::parse(endpoint)?;
    url.path_segments_mut()
        .map_err(|_| AskError::Config(format!("endpoint cannot be a base url: {endpoint}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

pub(crate) async fn ensure_success(
    backend: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, AskError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!(backend, status = %status, "endpoint rejected request");
    Err(AskError::BackendResponse {
        backend: backend.to_string(),
        details: format!("{status}: {body}"),
    })
}

#[async_trait]
impl AnswerGenerator for MessagesGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, AskError> {
        debug!(
            url = %self.invoke_url,
            prompt_chars = request.prompt.len(),
            max_tokens = request.max_tokens,
            "invoking model"
        );

        let mut call = self
            .client
            .post(self.invoke_url.clone())
            .header("content-type", "application/json")
            .header("accept", "application/json")
            .json(&MessagesRequest::new(request));

        if let Some(api_key) = &self.api_key {
            call = call.bearer_auth(api_key);
        }

        let response = ensure_success(BACKEND, call.send().await?).await?;
        let reply: MessagesReply = response.json().await?;
        parse_reply(reply)
    }
}
