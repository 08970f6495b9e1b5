//! nun: command-line lookup of NUN surgical procedure codes.
//!
//! Classifies a free-text procedure description into an anatomical region,
//! then ranks that region's catalog codes against the description.

mod output;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nun_core::{Catalog, Region, SearchHistory};
use nun_inference::{LookupConfig, OpenAIBackend};
use nun_search::LookupPipeline;

const DEFAULT_CATALOG: &str = "nun_catalog.json";

#[derive(Parser)]
#[command(name = "nun")]
#[command(author, version, about = "NUN surgical procedure code lookup")]
#[command(propagate_version = true)]
struct Cli {
    /// Catalog JSON file (default: $NUN_CATALOG or ./nun_catalog.json)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// TOML configuration file (default: $NUN_CONFIG, else environment)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Also write logs to this file, rotated daily
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full two-stage lookup for a description
    Search {
        /// Free-text procedure description
        description: Vec<String>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify a description into a region without ranking
    Classify {
        /// Free-text procedure description
        description: Vec<String>,
    },

    /// List the catalog codes of a region
    Candidates {
        /// Region code (MS, CO, PC, RO, PP)
        region: String,
    },

    /// Show the regions with their catalog counts
    Regions,

    /// Interactive lookup session with history
    Shell,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.log_format, cli.log_file.as_deref());

    let catalog_path = cli
        .catalog
        .clone()
        .or_else(|| std::env::var_os("NUN_CATALOG").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG));
    let catalog = Arc::new(
        Catalog::from_json_file(&catalog_path)
            .with_context(|| format!("Failed to load catalog {}", catalog_path.display()))?,
    );

    match cli.command {
        Commands::Regions => {
            println!("{}", output::render_regions(&catalog));
        }
        Commands::Candidates { region } => {
            let region: Region = region.parse()?;
            let candidates = nun_search::filter_by_region(&catalog, region);
            println!("{}", output::render_candidates(region, &candidates));
        }
        Commands::Classify { description } => {
            let pipeline = build_pipeline(catalog, cli.config.as_deref())?;
            let classification = pipeline.classify(&description.join(" ")).await?;
            println!("{}", output::render_classification(&classification));
        }
        Commands::Search { description, json } => {
            let pipeline = build_pipeline(catalog, cli.config.as_deref())?;
            let outcome = pipeline.search(&description.join(" ")).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("{}", output::render_outcome(&outcome));
            }
        }
        Commands::Shell => {
            let pipeline = build_pipeline(catalog, cli.config.as_deref())?;
            run_shell(&pipeline).await?;
        }
    }

    Ok(())
}

fn build_pipeline(catalog: Arc<Catalog>, config_path: Option<&Path>) -> anyhow::Result<LookupPipeline> {
    let config = LookupConfig::load(config_path).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    if config.backend.api_key.is_none() {
        info!(
            subsystem = "cli",
            "No API key configured, requests are sent unauthenticated"
        );
    }

    let backend = OpenAIBackend::new(config.backend.clone())
        .context("Failed to create inference backend")?;
    Ok(LookupPipeline::from_config(catalog, Arc::new(backend), &config))
}

async fn run_shell(pipeline: &LookupPipeline) -> anyhow::Result<()> {
    let mut history = SearchHistory::new();
    let stdin = io::stdin();

    println!(
        "NUN lookup: {} codes loaded. Describe a procedure, or :history, :clear, :quit.",
        pipeline.catalog().len()
    );

    loop {
        print!("nun> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match line.trim() {
            "" => continue,
            ":quit" | ":q" => break,
            ":history" => println!("{}", output::render_history(&history)),
            ":clear" => {
                history.clear();
                println!("History cleared.");
            }
            command if command.starts_with(':') => {
                println!("Unknown command {}", command);
            }
            description => match pipeline.search_with_history(description, &mut history).await {
                Ok(outcome) => println!("{}\n", output::render_outcome(&outcome)),
                Err(e) => println!("error: {}", e),
            },
        }
    }

    Ok(())
}

/// Install the subscriber; the returned guard flushes the file writer on drop.
fn init_tracing(
    format: LogFormat,
    log_file: Option<&Path>,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "nun=info".into());

    // stdout carries results; console logs go to stderr.
    let registry = tracing_subscriber::registry().with(env_filter);

    match log_file {
        Some(path) => {
            let file_dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let file_name = path
                .file_name()
                .and_then(|f| f.to_str())
                .unwrap_or("nun.log");
            let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            if format == LogFormat::Json {
                registry
                    .with(tracing_subscriber::fmt::layer().json().with_writer(non_blocking))
                    .init();
            } else {
                registry
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_writer(non_blocking)
                            .with_ansi(false),
                    )
                    .init();
            }
            Some(guard)
        }
        None => {
            if format == LogFormat::Json {
                registry
                    .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
                    .init();
            } else {
                registry
                    .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
                    .init();
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_search_words() {
        let cli = Cli::try_parse_from(["nun", "search", "fractura", "de", "cadera", "--json"])
            .unwrap();
        match cli.command {
            Commands::Search { description, json } => {
                assert_eq!(description.join(" "), "fractura de cadera");
                assert!(json);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_cli_global_options() {
        let cli = Cli::try_parse_from([
            "nun",
            "regions",
            "--catalog",
            "data/nun.json",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.catalog, Some(PathBuf::from("data/nun.json")));
        assert!(cli.log_format == LogFormat::Json);
        assert!(matches!(cli.command, Commands::Regions));
    }

    #[test]
    fn test_cli_rejects_unknown_log_format() {
        assert!(Cli::try_parse_from(["nun", "regions", "--log-format", "xml"]).is_err());
    }
}
