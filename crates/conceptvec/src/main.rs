//! conceptvec: Analogy exploration over biomedical concept embeddings
//!
//! Loads a concept embedding store once at startup, then answers
//! free-variable analogy searches (`Q + B - C = D`) either as a one-shot
//! CLI command or over a small HTTP API.

mod config;
mod server;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use conceptvec_rationale::{OpenAiConfig, SharedRationaleBackend, create_shared_backend};
use conceptvec_search::{DEFAULT_SIMILAR, SearchOptions, most_similar, search};
use conceptvec_store::ConceptStore;

use config::Config;
use server::AppState;

#[derive(Parser)]
#[command(name = "conceptvec", about = "Free-variable analogy search over concept embeddings")]
struct Cli {
    /// Path to a config file (defaults to ./conceptvec.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP API server.
    Serve {
        /// Listen address, overriding the config file.
        #[arg(long)]
        listen: Option<String>,
    },
    /// Run a one-shot analogy search and print the result table.
    Search {
        /// Query concept id (the fixed Q operand).
        query: String,
        /// Number of (B, C) pairs to sample.
        #[arg(long)]
        n: Option<usize>,
        /// Similarity threshold for surviving rows.
        #[arg(long)]
        threshold: Option<f32>,
        /// Seed for reproducible sampling.
        #[arg(long)]
        seed: Option<u64>,
        /// Annotate the top row with a generated rationale.
        #[arg(long)]
        rationale: bool,
        /// Output format.
        #[arg(long, value_enum, default_value = "tsv")]
        format: OutputFormat,
    },
    /// List the stored concepts most similar to a query concept.
    Similar {
        /// Query concept id.
        query: String,
        /// Number of neighbors to return.
        #[arg(long, default_value_t = DEFAULT_SIMILAR)]
        top_k: usize,
    },
    /// Print the description registered for a concept id.
    Describe {
        /// Concept id to look up.
        id: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Tsv,
    Json,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

/// Load the embedding store from the configured artifacts.
fn load_store(config: &Config) -> Result<ConceptStore> {
    let start = std::time::Instant::now();
    let store = ConceptStore::load(&config.data.embeddings, &config.data.descriptions)
        .with_context(|| {
            format!(
                "Failed to load embeddings from {}",
                config.data.embeddings.display()
            )
        })?;
    info!(
        concepts = store.size(),
        dim = store.dim(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Embedding store ready"
    );
    Ok(store)
}

/// Build a rationale backend if credentials are available.
fn build_rationale_backend(config: &Config) -> Result<Option<SharedRationaleBackend>> {
    let Some(api_key) = config.rationale_api_key() else {
        return Ok(None);
    };
    let mut backend_config = OpenAiConfig::new(api_key)
        .with_model(&config.rationale.model)
        .with_timeout(Duration::from_secs(config.rationale.timeout_secs));
    if let Some(base_url) = &config.rationale.base_url {
        backend_config = backend_config.with_base_url(base_url);
    }
    Ok(Some(create_shared_backend(backend_config)?))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Serve { listen } => {
            let store = Arc::new(load_store(&config)?);
            let rationale = build_rationale_backend(&config)?;
            if rationale.is_none() {
                info!("No rationale credentials configured; use_rationale requests will degrade");
            }

            let addr: SocketAddr = listen
                .unwrap_or_else(|| config.server.listen.clone())
                .parse()
                .context("Invalid listen address")?;

            let state = Arc::new(AppState {
                store,
                rationale,
                defaults: config.search.clone(),
                rationale_timeout: Duration::from_secs(config.rationale.timeout_secs),
            });
            server::serve(addr, state).await
        }
        Command::Search {
            query,
            n,
            threshold,
            seed,
            rationale,
            format,
        } => {
            let store = load_store(&config)?;

            let mut opts = SearchOptions::default()
                .with_samples(n.unwrap_or(config.search.n))
                .with_threshold(threshold.unwrap_or(config.search.sim_threshold));
            opts.seed = seed;
            opts.rationale_timeout = Duration::from_secs(config.rationale.timeout_secs);

            if rationale {
                match build_rationale_backend(&config)? {
                    Some(backend) => opts = opts.with_rationale(backend),
                    None => anyhow::bail!(
                        "Rationale requested but no API key configured (set OPENAI_API_KEY or [rationale].api_key)"
                    ),
                }
            }

            let table = search(&store, &query, &opts)
                .await
                .map_err(|e| anyhow::anyhow!("{e}"))?;

            match format {
                OutputFormat::Tsv => print!("{}", table.to_tsv()),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&table)?),
            }
            Ok(())
        }
        Command::Similar { query, top_k } => {
            let store = load_store(&config)?;
            let neighbors =
                most_similar(&store, &query, top_k).map_err(|e| anyhow::anyhow!("{e}"))?;
            println!("Concept\tDescription\tSimilarity");
            for n in &neighbors {
                println!("{}\t{}\t{:.6}", n.id, n.description, n.similarity);
            }
            Ok(())
        }
        Command::Describe { id } => {
            let store = load_store(&config)?;
            if store.index_of(&id).is_none() {
                anyhow::bail!("Concept not found: {id}");
            }
            println!("{}", store.describe(&id));
            Ok(())
        }
    }
}
