//! Command-line entry point for the finance assistant.
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use finassist::config::Config;
use finassist::embedder::remote::RemoteEmbedder;
use finassist::extract::ocr::TesseractOcr;
use finassist::extract::process_pdf;
use finassist::index::VectorStore;
use finassist::index::gateway::{IndexGateway, IndexOutcome, content_hash};
use finassist::ledger::categorize::{KeywordClassifier, categorize_all};
use finassist::ledger::forecast::{Forecast, forecast_expenses};
use finassist::ledger::import::load_transactions;
use finassist::ledger::{Category, Transaction, category_summary};
use finassist::qa::answer::{answer_question, chat};
use finassist::qa::llm::ChatClient;

#[derive(Parser)]
#[command(name = "finassist", about = "Personal finance assistant", version)]
struct Cli {
    /// Path to the JSON config file
    #[arg(short, long, default_value = "config.json")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Categorize a CSV transaction export and print per-category spend
    Summary {
        /// Transaction CSV with Date, Amount, and Description columns
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Project future monthly expenses from a CSV transaction export
    Forecast {
        #[arg(short, long)]
        file: PathBuf,

        /// Restrict the projection to one category
        #[arg(long)]
        category: Option<String>,

        /// Number of months to project
        #[arg(short, long)]
        months: Option<usize>,
    },
    /// Extract a PDF and add its content to the vector index
    Ingest {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Ask a question about an ingested PDF
    Ask {
        /// The PDF the question is about; ingested first if not yet indexed
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long)]
        question: String,
    },
    /// Free-form chat with the financial assistant
    Chat {
        #[arg(short, long)]
        message: String,
    },
}

fn parse_category(name: &str) -> Result<Category> {
    let category = match name.to_lowercase().as_str() {
        "shopping" => Category::Shopping,
        "food" => Category::Food,
        "income" => Category::Income,
        "utilities" => Category::Utilities,
        "entertainment" => Category::Entertainment,
        "others" => Category::Others,
        other => bail!("unknown category: {other}"),
    };
    Ok(category)
}

fn load_ledger(path: &Path) -> Result<Vec<Transaction>> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut transactions = load_transactions(file)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    categorize_all(&mut transactions, &KeywordClassifier);
    Ok(transactions)
}

/// Extract and index a PDF, skipping work when its hash is already present.
fn ingest_pdf(config: &Config, store: &mut VectorStore, path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;

    let hash = content_hash(&bytes);
    if store.namespace_exists(&hash)? {
        info!("Already indexed: {}", path.display());
        return Ok(hash);
    }

    let engine = TesseractOcr::new(config.ocr.dpi, config.ocr.language.clone());
    let chunks = process_pdf(path, &engine, config.ocr.workers);

    let embedder = RemoteEmbedder::from_env(&config.model);
    let mut gateway = IndexGateway::new(store, &embedder, config.upsert_batch_size);

    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());

    let (hash, outcome) = gateway.index_document(&bytes, &source, &chunks)?;
    match outcome {
        IndexOutcome::Indexed {
            chunks,
            batches_failed,
        } => {
            println!("Indexed {chunks} chunks from {source}");
            if batches_failed > 0 {
                println!("Warning: {batches_failed} upsert batches failed");
            }
        }
        IndexOutcome::Skipped => println!("Already indexed: {source}"),
        IndexOutcome::NoContent => println!("No extractable content in {source}"),
    }
    Ok(hash)
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(&cli.config)?;
    config.validate()?;

    match cli.command {
        Commands::Summary { file } => {
            let transactions = load_ledger(&file)?;
            let summary = category_summary(&transactions);
            if summary.is_empty() {
                println!("No expenses found.");
                return Ok(());
            }
            println!("Spending by category:");
            for (category, total) in summary {
                println!("  {category:<14} {total:>12.2}");
            }
        }
        Commands::Forecast {
            file,
            category,
            months,
        } => {
            let transactions = load_ledger(&file)?;
            let category = category.as_deref().map(parse_category).transpose()?;
            let months = months.unwrap_or(config.forecast_months);

            match forecast_expenses(&transactions, category, months) {
                Forecast::InsufficientData => {
                    println!("Not enough data to forecast (need at least two months).");
                }
                Forecast::Projection(points) => {
                    println!("Projected monthly expenses:");
                    for point in points {
                        println!("  {}  {:>12.2}", point.month, point.predicted);
                    }
                }
            }
        }
        Commands::Ingest { file } => {
            let mut store = VectorStore::open(&config.db_path)?;
            ingest_pdf(&config, &mut store, &file)?;
        }
        Commands::Ask { file, question } => {
            let mut store = VectorStore::open(&config.db_path)?;
            let hash = ingest_pdf(&config, &mut store, &file)?;

            let embedder = RemoteEmbedder::from_env(&config.model);
            let client = ChatClient::from_env(&config.llm)?;

            let answer = answer_question(
                &store,
                &embedder,
                &client,
                &config.llm.answer_model,
                &hash,
                &question,
                config.top_k,
            )?;
            println!("{answer}");
        }
        Commands::Chat { message } => {
            let client = ChatClient::from_env(&config.llm)?;
            let reply = chat(&client, &config.llm.chat_model, &message)?;
            println!("{reply}");
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse())
}
