use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use pdf_qa_core::{
    read_pdf, AskRequest, CareerAdvisor, ContextSelector, CreateSavedResponse, GeneratorConfig,
    JsonFileStore, KnowledgeBaseClient, KnowledgeBaseConfig, MessagesGenerator, QaOptions,
    QuestionAnswerer, SavedResponse, SavedResponseStore, SavedResponseUpdate, ScoredChunk,
    CAREER_RESULTS, DEFAULT_MODEL_ID, DEFAULT_REGION,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pdf-qa", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Model endpoint base URL. Defaults to the regional runtime endpoint.
    #[arg(long, env = "PDF_QA_ENDPOINT")]
    endpoint: Option<String>,

    /// Region used to build the default endpoint.
    #[arg(long, env = "AWS_REGION", default_value = DEFAULT_REGION)]
    region: String,

    /// Model identifier appended to the invoke path.
    #[arg(long, env = "PDF_QA_MODEL_ID", default_value = DEFAULT_MODEL_ID)]
    model_id: String,

    /// Bearer token for the model endpoint.
    #[arg(long, env = "PDF_QA_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// JSON file holding saved answers.
    #[arg(long, env = "PDF_QA_STORE", default_value = "saved_responses.json")]
    store: PathBuf,
}

#[derive(Args)]
struct QuestionArgs {
    /// PDF to read.
    #[arg(long)]
    pdf: PathBuf,
    /// Question about the document (at most 500 characters).
    #[arg(long)]
    question: String,
    /// Number of chunks used as context.
    #[arg(long, default_value = "3")]
    top_k: usize,
    /// Words per chunk.
    #[arg(long, default_value = "500")]
    chunk_size: usize,
    /// Words shared by consecutive chunks.
    #[arg(long, default_value = "50")]
    chunk_overlap: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Answer a question about a PDF using the model endpoint.
    Ask {
        #[command(flatten)]
        input: QuestionArgs,
        /// Save the answer to the store.
        #[arg(long, default_value_t = false)]
        save: bool,
        /// Comma-separated tags for the saved answer.
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },
    /// Show the chunks that would be sent as context, without calling the model.
    Retrieve {
        #[command(flatten)]
        input: QuestionArgs,
    },
    /// Answer a career question from the knowledge base.
    Career {
        /// Career question.
        #[arg(long)]
        query: String,
        /// Knowledge base to search.
        #[arg(long, env = "PDF_QA_KNOWLEDGE_BASE_ID")]
        knowledge_base_id: String,
        /// Knowledge base endpoint base URL. Defaults to the regional agent runtime endpoint.
        #[arg(long, env = "PDF_QA_KNOWLEDGE_BASE_ENDPOINT")]
        knowledge_base_endpoint: Option<String>,
        /// Passages retrieved per query.
        #[arg(long, default_value_t = CAREER_RESULTS)]
        results: usize,
    },
    /// Manage saved answers.
    Saved {
        #[command(subcommand)]
        action: SavedAction,
    },
}

#[derive(Subcommand)]
enum SavedAction {
    /// List saved answers, newest first.
    List,
    /// Print one saved answer.
    Show {
        #[arg(long)]
        id: String,
    },
    /// Change fields of a saved answer.
    Update {
        #[arg(long)]
        id: String,
        #[arg(long)]
        question: Option<String>,
        #[arg(long)]
        answer: Option<String>,
        /// Replaces all tags. Comma-separated.
        #[arg(long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
    },
    /// Remove a saved answer.
    Delete {
        #[arg(long)]
        id: String,
    },
}

impl Cli {
    fn generator_config(&self) -> GeneratorConfig {
        let mut config = GeneratorConfig::for_region(&self.region);
        if let Some(endpoint) = self.endpoint.as_deref().map(str::trim) {
            if !endpoint.is_empty() {
                config.endpoint = endpoint.to_string();
            }
        }
        config.model_id = self.model_id.clone();
        config.api_key = self.api_key();
        config
    }

    fn knowledge_base_config(
        &self,
        knowledge_base_id: &str,
        endpoint: Option<&str>,
    ) -> KnowledgeBaseConfig {
        let mut config = KnowledgeBaseConfig::for_region(&self.region, knowledge_base_id);
        if let Some(endpoint) = endpoint.map(str::trim).filter(|value| !value.is_empty()) {
            config.endpoint = endpoint.to_string();
        }
        config.api_key = self.api_key();
        config
    }

    fn api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
    }
}

impl QuestionArgs {
    fn options(&self) -> QaOptions {
        QaOptions {
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            top_k: self.top_k,
            ..QaOptions::default()
        }
    }

    async fn request(&self) -> anyhow::Result<AskRequest> {
        let pdf = read_pdf(&self.pdf)
            .await
            .with_context(|| format!("unable to read {}", self.pdf.display()))?;
        Ok(AskRequest {
            file_name: file_name(&self.pdf),
            pdf,
            question: self.question.clone(),
        })
    }
}

async fn select_context(input: &QuestionArgs) -> anyhow::Result<(AskRequest, Vec<ScoredChunk>)> {
    let request = input.request().await?;
    let relevant = ContextSelector::new()
        .with_options(input.options())
        .select(&request)?;
    Ok((request, relevant))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_saved(saved: &SavedResponse) {
    println!(
        "[{}] saved_at={} file={}",
        saved.id,
        saved.saved_at.to_rfc3339(),
        saved.file_name
    );
    if !saved.tags.is_empty() {
        println!("  tags={}", saved.tags.join(","));
    }
    println!("  question: {}", saved.question);
    println!("  answer:\n{}", saved.answer);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "pdf-qa boot"
    );

    let store = JsonFileStore::new(&cli.store);

    match &cli.command {
        Command::Ask { input, save, tags } => {
            let generator = MessagesGenerator::new(cli.generator_config())?;
            info!(url = %generator.invoke_url(), "model endpoint configured");
            let answerer = QuestionAnswerer::new(generator).with_options(input.options());

            let request = input.request().await?;
            let response = answerer.ask(&request).await?;

            println!("answer:\n{}", response.answer);
            for chunk in &response.relevant_chunks {
                println!("score={:.4} {}", chunk.score, chunk.content);
            }

            if *save {
                let saved = store
                    .create(CreateSavedResponse {
                        question: request.question,
                        answer: response.answer,
                        file_name: request.file_name,
                        tags: Some(tags.clone()),
                    })
                    .await?;
                println!(
                    "saved as {} in {}",
                    saved.id,
                    store.path().display()
                );
            }
        }
        Command::Retrieve { input } => {
            let (request, relevant) = select_context(input).await?;

            println!("question: {}", request.question);
            for chunk in relevant {
                println!("[chunk {}] score={:.4}", chunk.index, chunk.score);
                println!("{}\n", chunk.content);
            }
        }
        Command::Career {
            query,
            knowledge_base_id,
            knowledge_base_endpoint,
            results,
        } => {
            let retriever = KnowledgeBaseClient::new(
                cli.knowledge_base_config(knowledge_base_id, knowledge_base_endpoint.as_deref()),
            )?;
            info!(url = %retriever.retrieve_url(), "knowledge base configured");
            let generator = MessagesGenerator::new(cli.generator_config())?;
            let advisor = CareerAdvisor::new(retriever, generator).with_results(*results);

            let advice = advisor.advise(query).await?;
            println!("answer:\n{}", advice.answer);
            println!(
                "knowledge_base={} retrieved_chunks={}",
                advice.knowledge_base_id, advice.retrieved_chunks
            );
            for source in &advice.sources {
                println!("score={:.4} {}", source.score, source.source);
            }
        }
        Command::Saved { action } => match action {
            SavedAction::List => {
                let saved = store.list().await?;
                if saved.is_empty() {
                    println!("no saved answers in {}", store.path().display());
                }
                for item in &saved {
                    print_saved(item);
                }
            }
            SavedAction::Show { id } => match store.get(id).await? {
                Some(saved) => print_saved(&saved),
                None => {
                    warn!(id = %id, "saved answer not found");
                    anyhow::bail!("no saved answer with id {id}");
                }
            },
            SavedAction::Update {
                id,
                question,
                answer,
                tags,
            } => {
                let updated = store
                    .update(
                        id,
                        SavedResponseUpdate {
                            question: question.clone(),
                            answer: answer.clone(),
                            file_name: None,
                            tags: tags.clone(),
                        },
                    )
                    .await?;
                print_saved(&updated);
            }
            SavedAction::Delete { id } => {
                store.delete(id).await?;
                println!("deleted {id}");
            }
        },
    }

    Ok(())
}
