use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use feedstack::config::Config;
use feedstack::convert::{Converted, EntryExtraction, HtmlConverter, MetaSpec, RssConverter};
use feedstack::fetch::LinkFetcher;
use feedstack::pipeline::{DocumentSplitter, EmbedStage, HashEmbedder, IndexPipeline};
use feedstack::source::Source;
use feedstack::store::{DocumentStore, DuplicatePolicy, SqliteStore};

/// Get the config directory path (~/.config/feedstack/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("feedstack"))
}

#[derive(Parser, Debug)]
#[command(name = "feedstack", about = "Ingest RSS feeds and web pages into a document store")]
struct Args {
    /// Config file path (default: ~/.config/feedstack/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the database path from the config file
    #[arg(long, value_name = "FILE")]
    database: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch RSS/Atom feed URLs and index their entry text
    Rss {
        /// Feed URLs to ingest
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Fetch web page URLs and index their visible text
    Pages {
        /// Page URLs to ingest
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Print the number of documents in the store
    Count,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Pick up .env before reading configuration
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => get_config_dir()?.join("config.toml"),
    };
    let mut config = Config::load(&config_path).context("Failed to load configuration")?;
    if let Some(database) = args.database {
        config.database = database;
    }

    let store = SqliteStore::open(&config.database)
        .await
        .with_context(|| format!("Failed to open document store at {}", config.database))?;

    match args.command {
        Command::Rss { urls } => {
            let converted = convert_feeds(&config, &urls).await?;
            report_failures(&converted);
            let written = index(&config, store, converted).await?;
            println!("{} documents written", written);
        }
        Command::Pages { urls } => {
            let converted = convert_pages(&urls).await?;
            report_failures(&converted);
            let written = index(&config, store, converted).await?;
            println!("{} documents written", written);
        }
        Command::Count => {
            let count = store.count().await.context("Failed to count documents")?;
            println!("{} documents stored", count);
        }
    }

    Ok(())
}

async fn convert_feeds(config: &Config, urls: &[String]) -> Result<Converted> {
    let fetcher = LinkFetcher::default();
    let sources: Vec<Source> = fetcher
        .fetch_all(urls)
        .await
        .into_iter()
        .map(Source::from)
        .collect();

    let extraction = if config.strict_entries {
        EntryExtraction::Strict
    } else {
        EntryExtraction::Tolerant
    };
    let converter = RssConverter::with_extraction(extraction);
    Ok(converter.convert(sources, MetaSpec::None)?)
}

async fn convert_pages(urls: &[String]) -> Result<Converted> {
    let fetcher = LinkFetcher::default();
    let sources: Vec<Source> = fetcher
        .fetch_all(urls)
        .await
        .into_iter()
        .map(Source::from)
        .collect();

    Ok(HtmlConverter::new().convert(sources, MetaSpec::None)?)
}

fn report_failures(converted: &Converted) {
    for failure in &converted.failures {
        eprintln!("Skipped {}: {}", failure.source, failure.error);
    }
}

async fn index(config: &Config, store: SqliteStore, converted: Converted) -> Result<usize> {
    let policy =
        DuplicatePolicy::parse(&config.duplicate_policy).unwrap_or(DuplicatePolicy::Skip);

    let pipeline = IndexPipeline::new(store, policy)
        .add_stage(Box::new(DocumentSplitter::new(
            config.split_length,
            config.split_overlap,
        )?))
        .add_stage(Box::new(EmbedStage::new(HashEmbedder::with_dimension(
            config.embedding_dimension,
        ))));

    let written = pipeline.run(converted.documents).await?;
    Ok(written)
}
