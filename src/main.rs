use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use jiwa_channels::CliChannel;
use jiwa_core::config::{COHERE_KEY_VAR, Config};
use jiwa_core::vault::EnvVaultProvider;
use jiwa_core::{Agent, Orchestrator, OrchestratorConfig};
use jiwa_index::{IndexBuilder, Retriever, SplitterConfig};
use jiwa_llm::cohere::CohereEmbedder;
use jiwa_llm::gemini::GeminiProvider;
use jiwa_tools::{DuckDuckGoSearch, Translator};

const LOG_FILE: &str = "jiwa.log";

#[derive(Parser)]
#[command(name = "jiwa", version, about = "Mental-health assistant backed by a local FAQ index")]
struct Cli {
    /// Configuration file; missing files fall back to defaults.
    #[arg(long, env = "JIWA_CONFIG", default_value = "config/default.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Rebuild the vector index from the FAQ CSV
    Index {
        /// CSV knowledge base (overrides `index.source`)
        #[arg(long)]
        source: Option<PathBuf>,
        /// Index directory (overrides `index.dir`)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Start an interactive chat session (default)
    Chat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Chat);
    // The chat redraws the terminal in place, so its logs go to a file.
    init_subscriber(matches!(command, Command::Chat));

    let mut config = Config::load(&cli.config)?;
    config.validate()?;
    config.resolve_secrets(&EnvVaultProvider).await?;

    match command {
        Command::Index { source, output } => run_index(&config, source, output).await,
        Command::Chat => run_chat(&config).await,
    }
}

fn init_subscriber(to_file: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let file = if to_file {
        std::fs::File::create(LOG_FILE).ok()
    } else {
        None
    };
    if let Some(file) = file {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(file)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// `None` without a key; the index builder and retriever turn that into
/// their own missing-credential errors.
fn cohere_embedder(config: &Config) -> Option<CohereEmbedder> {
    let Some(key) = config.secrets.cohere_api_key.as_ref() else {
        tracing::warn!("{COHERE_KEY_VAR} is not set");
        return None;
    };
    Some(CohereEmbedder::new(
        key.expose().to_owned(),
        config.embedding.base_url.clone(),
        config.embedding.model.clone(),
    ))
}

async fn run_index(
    config: &Config,
    source: Option<PathBuf>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let source = source.unwrap_or_else(|| config.index.source.clone());
    let output = output.unwrap_or_else(|| config.index.dir.clone());
    let embedder = cohere_embedder(config);

    let builder = IndexBuilder::new(
        &output,
        SplitterConfig {
            chunk_size: config.index.chunk_size,
            chunk_overlap: config.index.chunk_overlap,
        },
    );
    let report = builder
        .build(&source, embedder.as_ref())
        .await
        .with_context(|| format!("failed to build index from {}", source.display()))?;

    println!(
        "Indexed {} rows into {} chunks ({}-dimensional) at {}",
        report.rows,
        report.chunks,
        report.dimension,
        output.display()
    );
    Ok(())
}

async fn run_chat(config: &Config) -> anyhow::Result<()> {
    let key = config.require_gemini_key()?;
    let provider = GeminiProvider::new(
        key.expose().to_owned(),
        config.llm.base_url.clone(),
        config.llm.model.clone(),
    )
    .with_temperature(config.llm.temperature)
    .with_max_output_tokens(config.llm.max_output_tokens);

    let embedder = cohere_embedder(config);
    let retriever = Retriever::open(&config.index.dir, embedder)
        .await
        .with_context(|| {
            format!(
                "cannot open index at {} (build it with `jiwa index`)",
                config.index.dir.display()
            )
        })?;

    let web = DuckDuckGoSearch::new(
        config.search.base_url.clone(),
        config.search.region.clone(),
        config.search_timeout(),
    );
    let orchestrator =
        Orchestrator::new(provider, retriever, web).with_config(OrchestratorConfig::from(config));
    let translator = Translator::new(config.translate.base_url.clone(), config.translate_timeout());

    let mut agent = Agent::new(CliChannel::new(), orchestrator)
        .with_translator(translator)
        .with_history_dir(config.history.dir.clone())
        .with_stream_config(&config.stream);

    tracing::info!(model = %config.llm.model, index = %config.index.dir.display(), "chat session started");
    tokio::select! {
        result = agent.run() => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("interrupted"),
    }
    Ok(())
}
