//! recap command-line entry point.
//!
//! Thin shell over the core crate: parse generated summary text into
//! timestamped points, and save/show/list summaries in the recency
//! cache. Logging goes to stderr so stdout stays clean for piped output.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use recap_core::{AppConfig, NewRecord, PutOutcome, RecencyCache, SummaryPoint, parse};

#[derive(Parser)]
#[command(name = "recap", version, about = "Parse and cache generated transcript summaries")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse summary text into timestamped points
    Parse {
        /// File to read; stdin when omitted
        file: Option<PathBuf>,
        /// Emit points as JSON
        #[arg(long)]
        json: bool,
    },
    /// Persist summary text for a (subject, style) pair
    Save {
        /// Subject identifier (e.g. a video id)
        #[arg(long)]
        subject: String,
        /// Summary style variant
        #[arg(long, default_value = "concise")]
        style: String,
        /// Source URL of the subject
        #[arg(long)]
        url: String,
        /// Display title of the subject
        #[arg(long)]
        title: String,
        /// File to read; stdin when omitted
        file: Option<PathBuf>,
    },
    /// Print a cached summary, bumping its access stamp
    Show {
        #[arg(long)]
        subject: String,
        #[arg(long, default_value = "concise")]
        style: String,
        /// Emit points as JSON
        #[arg(long)]
        json: bool,
    },
    /// List cached summaries, most recently accessed first
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Parse { file, json } => {
            let text = read_input(file.as_deref())?;
            print_points(&parse(&text), json)
        }
        Command::Save { subject, style, url, title, file } => {
            let text = read_input(file.as_deref())?;
            let cache = open_cache().await?;
            save(&cache, subject, style, url, title, text).await
        }
        Command::Show { subject, style, json } => {
            let cache = open_cache().await?;
            let Some(record) = cache.get(&subject, &style).await else {
                bail!("no cached summary for {subject} ({style})");
            };
            if !json {
                println!("# {} <{}>\n", record.title, record.source_url);
            }
            print_points(&parse(&record.raw_text), json)
        }
        Command::List { limit } => {
            let cache = open_cache().await?;
            for record in cache.list_recent(limit).await {
                println!("{}  {}  {}  {}", record.accessed_at, record.subject_id, record.style, record.title);
            }
            Ok(())
        }
    }
}

async fn open_cache() -> Result<RecencyCache> {
    let config = AppConfig::load()?;
    RecencyCache::open(&config)
        .await
        .context("failed to open summary cache")
}

fn read_input(file: Option<&std::path::Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display())),
        None => std::io::read_to_string(std::io::stdin()).context("failed to read stdin"),
    }
}

fn print_points(points: &[SummaryPoint], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(points)?);
        return Ok(());
    }
    for point in points {
        if point.timestamp.is_empty() {
            println!("{}\n", point.text);
        } else {
            println!("[{}] {}\n", point.timestamp, point.text);
        }
    }
    Ok(())
}

async fn save(
    cache: &RecencyCache, subject: String, style: String, url: String, title: String, text: String,
) -> Result<()> {
    let points = parse(&text);
    if points.is_empty() {
        bail!("input is empty; nothing to save");
    }
    tracing::info!(points = points.len(), subject, style, "parsed summary");

    let record = NewRecord { subject_id: subject, style, source_url: url, title, raw_text: text };
    match cache.put(&record).await {
        PutOutcome::Saved => println!("saved"),
        PutOutcome::SavedWithEvictions(n) => println!("saved ({n} older summaries evicted)"),
        PutOutcome::Failed(reason) => println!("not saved: {reason}"),
    }
    Ok(())
}
