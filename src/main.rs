use std::error::Error;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use compliance_adviser::adapters::ai::{MockAIProvider, OpenAICompatibleProvider};
use compliance_adviser::adapters::http::app_router;
use compliance_adviser::adapters::retrieval::{
    FastEmbedEmbedder, HashingEmbedder, IndexLoader, OllamaEmbedder, TextSplitter, VectorStoreRetriever,
};
use compliance_adviser::adapters::storage::{FileCheckpointStore, InMemoryCheckpointStore};
use compliance_adviser::application::{RunCoordinator, RunOutcome};
use compliance_adviser::config::{
    AiProvider, AppConfig, EmbeddingProvider, RetrievalConfig, StorageBackend,
};
use compliance_adviser::domain::compliance::{ComplianceDomain, RunStatus};
use compliance_adviser::domain::foundation::ThreadId;
use compliance_adviser::ports::{AIProvider, CheckpointStore, Embedder, Retriever};

#[derive(Parser)]
#[command(name = "compliance-adviser", version, about = "GDPR and AI Act compliance adviser")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API
    Serve,
    /// Chat in the terminal
    Chat {
        /// Thread to start or continue; a new one is generated if omitted
        #[arg(long)]
        thread: Option<String>,
    },
    /// Build the GDPR and AI Act indices ahead of time
    Index {
        /// Rebuild even if a persisted index exists
        #[arg(long)]
        rebuild: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => serve(&config).await,
        Command::Chat { thread } => chat(&config, thread).await,
        Command::Index { rebuild } => index(&config, rebuild).await,
    }
}

async fn serve(config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let coordinator = Arc::new(build_coordinator(config).await?);
    let app = app_router(coordinator, &config.server);
    let addr = config.server.socket_addr()?;

    info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received");
        })
        .await?;
    Ok(())
}

async fn chat(config: &AppConfig, thread: Option<String>) -> Result<(), Box<dyn Error>> {
    let coordinator = build_coordinator(config).await?;
    let thread_id = match thread {
        Some(raw) => ThreadId::new(raw)?,
        None => ThreadId::generate(),
    };

    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(format!("Thread: {} (type 'quit' to leave)\n", thread_id).as_bytes())
        .await?;

    // An existing thread interrupted mid-pipeline is finished first.
    match coordinator.state(&thread_id).await {
        Ok(state) if state.status() == RunStatus::Running => {
            let outcome = coordinator.resume(&thread_id).await?;
            print_outcome(&mut stdout, &outcome).await?;
        }
        Ok(state) if state.status() == RunStatus::Completed => {
            stdout.write_all(b"This thread has already finished.\n").await?;
            return Ok(());
        }
        _ => {}
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"User: ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if matches!(input.to_lowercase().as_str(), "quit" | "exit" | "q") {
            stdout.write_all(b"Goodbye!\n").await?;
            break;
        }
        if input.is_empty() {
            continue;
        }

        match coordinator.advance(&thread_id, Some(input)).await {
            Ok(outcome) => {
                print_outcome(&mut stdout, &outcome).await?;
                if outcome.status == RunStatus::Completed {
                    break;
                }
            }
            Err(e) if e.is_retryable() => {
                stdout
                    .write_all(format!("[error] {} (try again)\n", e).as_bytes())
                    .await?;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

async fn print_outcome(
    stdout: &mut tokio::io::Stdout,
    outcome: &RunOutcome,
) -> Result<(), Box<dyn Error>> {
    for output in &outcome.outputs {
        if output.message.content.is_empty() {
            continue;
        }
        stdout
            .write_all(format!("[{}] {}\n", output.node, output.message.content).as_bytes())
            .await?;
    }
    stdout.flush().await?;
    Ok(())
}

async fn index(config: &AppConfig, rebuild: bool) -> Result<(), Box<dyn Error>> {
    let loader = index_loader(&config.retrieval).await?;
    for domain in ComplianceDomain::ALL {
        let store = if rebuild {
            loader.build(domain).await?
        } else {
            loader.load_or_build(domain).await?
        };
        info!(
            "Index '{}' ready: {} chunks ({})",
            store.name(),
            store.len(),
            store.model()
        );
    }
    Ok(())
}

async fn build_coordinator(config: &AppConfig) -> Result<RunCoordinator, Box<dyn Error>> {
    let ai_provider: Arc<dyn AIProvider> = match config.ai.provider {
        AiProvider::OpenaiCompatible => {
            info!("Using model {} at {}", config.ai.model, config.ai.base_url);
            Arc::new(OpenAICompatibleProvider::new(config.ai.provider_config())?)
        }
        AiProvider::Mock => {
            info!("Using the mock model provider");
            Arc::new(MockAIProvider::new().with_echo())
        }
    };

    let store: Arc<dyn CheckpointStore> = match config.storage.backend {
        StorageBackend::File => {
            info!("Checkpoints stored in {:?}", config.storage.checkpoint_dir);
            Arc::new(FileCheckpointStore::new(&config.storage.checkpoint_dir))
        }
        StorageBackend::Memory => Arc::new(InMemoryCheckpointStore::new()),
    };

    let loader = index_loader(&config.retrieval).await?;
    let gdpr = retriever(&loader, ComplianceDomain::Gdpr, config.retrieval.top_k).await?;
    let ai_act = retriever(&loader, ComplianceDomain::AiAct, config.retrieval.top_k).await?;

    Ok(RunCoordinator::new(
        store,
        ai_provider,
        gdpr,
        ai_act,
        config.pipeline.max_retrieval_rounds,
    ))
}

async fn index_loader(config: &RetrievalConfig) -> Result<IndexLoader, Box<dyn Error>> {
    let embedder: Arc<dyn Embedder> = match config.embedding.provider {
        EmbeddingProvider::FastEmbed => {
            let model = config.embedding.model.clone();
            let cache_dir = config.embedding.cache_dir.clone();
            info!("Loading FastEmbed model {}", model);
            Arc::new(
                tokio::task::spawn_blocking(move || FastEmbedEmbedder::try_new(&model, cache_dir))
                    .await??,
            )
        }
        EmbeddingProvider::Ollama => Arc::new(OllamaEmbedder::new(
            config.embedding.base_url.clone(),
            config.embedding.model.clone(),
            config.embedding.timeout(),
        )?),
        EmbeddingProvider::Hashing => Arc::new(HashingEmbedder::new(config.embedding.dimension)),
    };
    Ok(IndexLoader::new(
        &config.data_dir,
        &config.index_root,
        TextSplitter::new(config.chunk_size, config.chunk_overlap),
        embedder,
    ))
}

async fn retriever(
    loader: &IndexLoader,
    domain: ComplianceDomain,
    top_k: usize,
) -> Result<Arc<dyn Retriever>, Box<dyn Error>> {
    let store = loader.load_or_build(domain).await?;
    Ok(Arc::new(
        VectorStoreRetriever::new(store, loader.embedder()).with_top_k(top_k),
    ))
}
