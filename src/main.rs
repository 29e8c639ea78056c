mod batch;
mod config;
mod db;
mod error;
mod export;
mod fetch;
mod matcher;
mod records;
mod sitemap;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::Config;
use export::{CsvSink, RecordSink};
use fetch::Fetcher;

#[derive(Parser)]
#[command(
    name = "cricket_sitemap_scraper",
    about = "Cricket sitemap crawler, roster matcher and page scraper"
)]
struct Cli {
    /// JSON config file (built-in defaults when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the sitemaps named by the top-level sitemap index
    Discover {
        /// Index URL (default: sitemap_index from config)
        #[arg(long)]
        index: Option<String>,
    },
    /// Crawl sitemaps and print every URL they list
    Crawl {
        /// Crawl the sitemaps found in the index instead of the configured list
        #[arg(long)]
        discover: bool,
    },
    /// Crawl sitemaps and map each roster name to its first matching URL
    Match {
        /// Crawl the sitemaps found in the index instead of the configured list
        #[arg(long)]
        discover: bool,
        /// Also store the mapping in this SQLite database
        #[arg(long)]
        sqlite: Option<PathBuf>,
    },
    /// Scrape match, team and player pages into tables
    Scrape {
        /// Write to this SQLite database instead of CSV files
        #[arg(long)]
        sqlite: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    let t0 = Instant::now();
    let config = Config::load(cli.config.as_deref())?;
    let fetcher = Fetcher::new(config.user_agent.as_deref())?;

    let result = match cli.command {
        Commands::Discover { index } => {
            let index = index.unwrap_or_else(|| config.sitemap_index.clone());
            for sitemap in sitemap::discover(&fetcher, &index).await? {
                println!("{}", sitemap);
            }
            Ok(())
        }
        Commands::Crawl { discover } => {
            let sitemaps = sitemap_list(&fetcher, &config, discover).await?;
            let crawled = sitemap::crawl(&fetcher, &sitemaps).await;
            for url in &crawled.urls {
                println!("{}", url);
            }
            println!(
                "Total URLs extracted: {} ({} of {} sitemaps failed)",
                crawled.urls.len(),
                crawled.stats.errors,
                crawled.stats.total
            );
            Ok(())
        }
        Commands::Match { discover, sqlite } => {
            let sitemaps = sitemap_list(&fetcher, &config, discover).await?;
            let mut urls = sitemap::crawl(&fetcher, &sitemaps).await.urls;
            if let Some(pattern) = config.url_filter()? {
                urls = sitemap::filter_urls(urls, &pattern);
            }
            let matches = matcher::match_entities(&urls, &config.roster);
            for m in &matches {
                println!("{}: {}", m.name, m.url);
            }
            if let Some(path) = sqlite {
                let sink = db::SqliteSink::open(&path)?;
                let saved = db::save_entity_urls(sink.connection(), &matches)?;
                println!("Saved {} matches to {}", saved, path.display());
            }
            Ok(())
        }
        Commands::Scrape { sqlite } => {
            let mut sink: Box<dyn RecordSink> = match sqlite {
                Some(path) => Box::new(db::SqliteSink::open(&path)?),
                None => Box::new(CsvSink::new(&config.output_dir)?),
            };
            scrape(&fetcher, &config, sink.as_mut()).await
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

async fn sitemap_list(fetcher: &Fetcher, config: &Config, discover: bool) -> Result<Vec<String>> {
    if discover {
        sitemap::discover(fetcher, &config.sitemap_index).await
    } else {
        Ok(config.sitemaps.clone())
    }
}

/// Build the match, team and player collections in turn and hand each to the sink.
async fn scrape(fetcher: &Fetcher, config: &Config, sink: &mut dyn RecordSink) -> Result<()> {
    for schema in records::schemas::ALL {
        let compiled = schema.compile()?;
        let urls = config.page_urls(schema.kind);
        let collection = records::collect_records(fetcher, urls, &compiled).await;
        sink.write(&collection)?;
        println!(
            "{}: {} of {} pages complete",
            schema.file_stem, collection.stats.ok, collection.stats.total
        );
    }
    tracing::info!("Data scraping and saving completed");
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
