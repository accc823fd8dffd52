//! CLI interface for the label store

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vector_label_store::config::{Config, LoggingConfig};
use vector_label_store::corpus::load_corpus_file;
use vector_label_store::Embedding;

#[derive(Parser)]
#[command(name = "labelstore")]
#[command(about = "An in-memory nearest-neighbor text store", long_about = None)]
struct Cli {
    /// TOML config file. Environment variables override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Address to bind to
        #[arg(long)]
        addr: Option<String>,
        /// Embedding dimension of the served store
        #[arg(long)]
        dimension: Option<usize>,
    },
    /// Load a JSON-lines corpus and print the texts nearest to a query
    Search {
        /// Corpus file with one {"embedding": [..], "text": ".."} per line
        #[arg(long)]
        corpus: PathBuf,
        /// Query embedding as comma-separated values (e.g., "0.1,0.0")
        #[arg(long, allow_hyphen_values = true)]
        query: String,
        /// Number of results to return
        #[arg(short, long)]
        k: Option<usize>,
        /// Drop results farther than this L2 distance
        #[arg(long)]
        max_distance: Option<f32>,
    },
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match logging.format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

fn run_search(
    corpus: PathBuf,
    query: &str,
    k: usize,
    max_distance: Option<f32>,
) -> Result<()> {
    let store = load_corpus_file(&corpus, None)?;
    let query: Embedding = query.parse()?;

    let hits = match max_distance {
        Some(max_distance) => store.search_within(query.as_slice(), k, max_distance)?,
        None => store.search_with_distances(query.as_slice(), k)?,
    };

    if hits.is_empty() {
        println!("No results found");
    } else {
        println!("Top {} results:", hits.len());
        for (i, hit) in hits.iter().enumerate() {
            println!("{}. {} (distance: {:.4})", i + 1, hit.text, hit.distance);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    init_tracing(&config.logging);

    match cli.command {
        Commands::Serve { addr, dimension } => {
            if let Some(addr) = addr {
                config.server.addr = addr;
            }
            if let Some(dimension) = dimension {
                config.store.dimension = dimension;
            }
            config.validate()?;
            vector_label_store::server::start(&config).await?;
        }
        Commands::Search {
            corpus,
            query,
            k,
            max_distance,
        } => {
            let k = k.unwrap_or(config.store.default_top_k);
            run_search(corpus, &query, k, max_distance)?;
        }
    }
    Ok(())
}
