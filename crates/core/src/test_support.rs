use crate::extractor::{PageText, PdfExtractor};
use crate::traits::AnswerGenerator;
use crate::{AskError, GenerationRequest, GenerationResponse, IngestError};
use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub struct FakeExtractor {
    pub text: String,
}

impl FakeExtractor {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

impl PdfExtractor for FakeExtractor {
    fn extract_pages(&self, _pdf: &[u8]) -> Result<Vec<PageText>, IngestError> {
        Ok(vec![PageText {
            number: 1,
            text: self.text.clone(),
        }])
    }
}

pub struct BrokenExtractor;

impl PdfExtractor for BrokenExtractor {
    fn extract_pages(&self, _pdf: &[u8]) -> Result<Vec<PageText>, IngestError> {
        Err(IngestError::PdfParse("xref table missing".to_string()))
    }
}

pub async fn serve_once(
    status: &'static str,
    body: &'static str,
) -> std::io::Result<(String, JoinHandle<std::io::Result<String>>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let base_url = format!("http://{}", listener.local_addr()?);

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await?;
        let request = read_request(&mut socket).await?;

        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await?;
        socket.shutdown().await?;
        Ok(request)
    });

    Ok((base_url, handle))
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> std::io::Result<String> {
    let mut raw = Vec::new();
    let mut buffer = [0u8; 4096];

    loop {
        let read = socket.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        raw.extend_from_slice(&buffer[..read]);

        let text = String::from_utf8_lossy(&raw).to_string();
        if let Some(header_end) = text.find("\r\n\r\n") {
            let expected_body = text[..header_end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if raw.len() >= header_end + 4 + expected_body {
                break;
            }
        }
    }

    Ok(String::from_utf8_lossy(&raw).to_string())
}

#[derive(Default)]
pub struct FakeGenerator {
    pub seen: std::sync::Mutex<Vec<GenerationRequest>>,
}

impl FakeGenerator {
    pub fn prompts(&self) -> Vec<String> {
        self.seen
            .lock()
            .expect("lock not poisoned")
            .iter()
            .map(|request| request.prompt.clone())
            .collect()
    }
}

#[async_trait]
impl AnswerGenerator for FakeGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, AskError> {
        self.seen
            .lock()
            .expect("lock not poisoned")
            .push(request.clone());
        Ok(GenerationResponse {
            text: "Try a role in data analysis.".to_string(),
        })
    }
}

pub struct FailingGenerator;

#[async_trait]
impl AnswerGenerator for FailingGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<GenerationResponse, AskError> {
        Err(AskError::BackendResponse {
            backend: "model-endpoint".to_string(),
            details: "503 Service Unavailable".to_string(),
        })
    }
}
