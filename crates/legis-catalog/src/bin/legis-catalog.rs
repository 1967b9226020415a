//! legis-catalog: command-line access to the legislative entity catalogs.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use legis_catalog::defaults::NO_RESULTS_LABEL;
use legis_catalog::structured::{build_prompt, response_schema};
use legis_catalog::{
    data_category, filter_suggestions, read_structured_response, Catalog, CatalogConfig,
    EntityType, Error, HttpSource, LoadReport, Suggestion, DATA_CATEGORIES,
};

#[derive(Parser)]
#[command(name = "legis-catalog")]
#[command(author, version, about = "Browse Câmara and Senado open-data catalogs")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every entity type with its chamber and endpoint
    Types,

    /// List the data categories offered for questions, or show one
    Categories {
        /// Category id to show
        id: Option<String>,
    },

    /// Load an entity type and print `id<TAB>name` lines
    List {
        /// Entity type key (see `types`)
        entity: EntityType,

        #[command(flatten)]
        load: LoadArgs,
    },

    /// Load an entity type and print the entries whose name contains QUERY
    Search {
        /// Entity type key (see `types`)
        entity: EntityType,

        /// Case-insensitive substring to look for
        query: String,

        #[command(flatten)]
        load: LoadArgs,
    },

    /// Print the instruction prompt for a question
    Prompt {
        /// Question about congressional data
        question: String,

        /// Print the response JSON schema instead
        #[arg(long)]
        schema: bool,
    },

    /// Render a structured answer as text
    Render {
        /// File holding the JSON answer (`-` for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Print the parsed answer as JSON instead
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct LoadArgs {
    /// Base URL override (default: the entity's chamber API)
    #[arg(long)]
    base_url: Option<String>,

    /// Page safety cap for paginated listings
    #[arg(long)]
    max_pages: Option<u32>,

    /// Print the load report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let _log_guard = init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

// Environment variables:
//   LOG_FORMAT  - "json" or "text" (default: "text")
//   LOG_FILE    - path to log file (optional, replaces stderr output)
//   RUST_LOG    - standard env filter (default: "legis_catalog=info")
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "legis_catalog=info".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    if let Some(ref path) = log_file {
        let path = std::path::Path::new(path);
        let file_dir = path.parent().unwrap_or(std::path::Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("legis-catalog.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
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
    } else {
        // stdout carries command output
        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
        None
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Types => cmd_types(),
        Commands::Categories { id } => cmd_categories(id.as_deref()),
        Commands::List { entity, load } => {
            let report = load_entity(entity, &load).await?;
            print_suggestions(&report, &report.suggestions, load.json)
        }
        Commands::Search {
            entity,
            query,
            load,
        } => {
            let report = load_entity(entity, &load).await?;
            let matches = filter_suggestions(&report.suggestions, &query);
            debug!(query = %query, matches = matches.len(), "Filtered suggestions");
            if matches.is_empty() && !load.json {
                eprintln!("{}", NO_RESULTS_LABEL);
            }
            print_suggestions(&report, &matches, load.json)
        }
        Commands::Prompt { question, schema } => {
            if schema {
                println!("{}", serde_json::to_string_pretty(&response_schema())?);
            } else {
                println!("{}", build_prompt(&question));
            }
            Ok(())
        }
        Commands::Render { input, json } => cmd_render(&input, json),
    }
}

fn cmd_types() -> anyhow::Result<()> {
    for entity in EntityType::ALL {
        let spec = entity.spec();
        let strategy = if spec.is_paginated() {
            "paginated"
        } else {
            "nested"
        };
        println!(
            "{}\t{}\t{}\t{}",
            entity,
            entity.chamber().display_name(),
            spec.endpoint,
            strategy
        );
    }
    Ok(())
}

fn cmd_categories(id: Option<&str>) -> anyhow::Result<()> {
    if let Some(id) = id {
        let category = data_category(id)
            .ok_or_else(|| Error::Config(format!("unknown data category: {}", id)))?;
        println!("{}\n{}", category.name, category.description);
        return Ok(());
    }
    for category in DATA_CATEGORIES {
        println!(
            "{}\t{}\t{}",
            category.id, category.name, category.description
        );
    }
    Ok(())
}

async fn load_entity(entity: EntityType, args: &LoadArgs) -> anyhow::Result<LoadReport> {
    let mut config = CatalogConfig::from_env();
    if let Some(max_pages) = args.max_pages {
        config.max_pages = max_pages;
    }
    config.validate()?;

    let base_url = match &args.base_url {
        Some(url) => url.clone(),
        None => config.base_url_for(entity.chamber()).to_string(),
    };

    let source = HttpSource::new(&config)?;
    let catalog = Catalog::with_config(Arc::new(source), config.loader_config());
    let report = catalog
        .load(entity, &base_url)
        .await
        .with_context(|| format!("loading {} from {}", entity, base_url))?;

    for diagnostic in &report.diagnostics {
        eprintln!("warning: {}: {}", entity, diagnostic);
    }
    Ok(report)
}

fn print_suggestions(
    report: &LoadReport,
    suggestions: &[Suggestion],
    json: bool,
) -> anyhow::Result<()> {
    if json {
        let out = serde_json::json!({
            "entity_type": report.entity_type,
            "requests": report.requests,
            "partial": report.is_partial(),
            "diagnostics": report.diagnostics,
            "suggestions": suggestions,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for s in suggestions {
            println!("{}\t{}", s.id, s.name);
        }
    }
    Ok(())
}

fn cmd_render(input: &std::path::Path, json: bool) -> anyhow::Result<()> {
    let result = if input.as_os_str() == "-" {
        read_structured_response(std::io::stdin().lock()).context("reading answer from stdin")?
    } else {
        let file = std::fs::File::open(input)
            .with_context(|| format!("opening {}", input.display()))?;
        read_structured_response(file).with_context(|| format!("reading {}", input.display()))?
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", result);
    }
    Ok(())
}
