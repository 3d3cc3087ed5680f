//! Dattebayo CLI
//!
//! Command-line front end for browsing the entity API:
//! - List a collection page by page, with search
//! - Show a single entity (and its member characters)
//! - Toggle the stored theme preference

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use dattebayo::client::{ApiClient, ClientConfig, EntitySource};
use dattebayo::config::{generate_default_config, Config, LoggingConfig};
use dattebayo::preferences::Theme;
use dattebayo::records::{normalize_owned, EntityRecord};
use dattebayo::view::{catalogue, CollectionView, DetailLoader};
use dattebayo::CacheRegistry;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "dattebayo")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Browse characters, clans, villages and more from the Dattebayo API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// API base URL (overrides config)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Extra request header in Name=Value format
    #[arg(short = 'H', long = "header", global = true)]
    pub headers: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List records of a collection
    List {
        /// Collection name (characters, clans, villages, ...)
        collection: String,
        /// Name filter
        #[arg(short, long)]
        search: Option<String>,
        /// Keep loading pages until at least this many records are shown
        #[arg(short = 'n', long)]
        count: Option<usize>,
        /// Fetch the whole collection in one unpaginated request
        #[arg(long)]
        all: bool,
    },

    /// Show a single record
    Show {
        /// Collection name
        collection: String,
        /// Record id, _id or slug
        id: String,
        /// Also resolve member characters
        #[arg(short, long)]
        expand: bool,
    },

    /// List known collections
    Collections,

    /// Show or change the theme preference
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Clone, Copy)]
pub enum ThemeAction {
    /// Print the stored theme
    Show,
    /// Switch between dark and light
    Toggle,
    /// Use the dark theme
    Dark,
    /// Use the light theme
    Light,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_logging(&config.logging)?;

    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    for header in &cli.headers {
        let (name, value) = header
            .split_once('=')
            .with_context(|| format!("Invalid header '{}', expected Name=Value", header))?;
        config
            .api
            .headers
            .insert(name.trim().to_string(), value.trim().to_string());
    }

    match cli.command {
        Commands::List {
            collection,
            search,
            count,
            all,
        } => {
            let client = Arc::new(ApiClient::new(ClientConfig::from(&config.api))?);
            let records = if all {
                let records = normalize_owned(client.fetch_all(&collection).await);
                let term = search.unwrap_or_default();
                records
                    .into_iter()
                    .filter(|r| r.matches_search(&term))
                    .collect()
            } else {
                list_paged(client, &config, &collection, search, count).await?
            };
            print_records(&records, cli.format)?;
        }

        Commands::Show {
            collection,
            id,
            expand,
        } => {
            let client: Arc<dyn EntitySource> =
                Arc::new(ApiClient::new(ClientConfig::from(&config.api))?);
            let loader = DetailLoader::new(client, CacheRegistry::new());
            let detail = if expand {
                loader.load_with_members(&collection, &id).await
            } else {
                loader.load(&collection, &id).await
            };

            if let Some(error) = &detail.error {
                anyhow::bail!("{}", error);
            }

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&detail)?),
                OutputFormat::Table => match &detail.record {
                    Some(record) => {
                        print_fields(record);
                        if !detail.members.is_empty() {
                            println!();
                            println!("Members:");
                            print_records(&detail.members, OutputFormat::Table)?;
                        }
                    }
                    None => println!("No {} found with id {}", collection, id),
                },
            }
        }

        Commands::Collections => {
            let known = catalogue::known();
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&known)?),
                OutputFormat::Table => {
                    println!("{:<16} {:<16} Description", "Key", "Title");
                    for meta in known {
                        println!("{:<16} {:<16} {}", meta.key, meta.title, meta.description);
                    }
                }
            }
        }

        Commands::Theme { action } => {
            let store = config.theme.store();
            let theme = match action.unwrap_or(ThemeAction::Show) {
                ThemeAction::Show => store.theme(),
                ThemeAction::Toggle => store.toggle_theme()?,
                ThemeAction::Dark => {
                    store.set_theme(Theme::Dark)?;
                    Theme::Dark
                }
                ThemeAction::Light => {
                    store.set_theme(Theme::Light)?;
                    Theme::Light
                }
            };
            println!("{}", theme);
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

/// Drive a collection view until `count` records are loaded or nothing is left
async fn list_paged(
    client: Arc<ApiClient>,
    config: &Config,
    collection: &str,
    search: Option<String>,
    count: Option<usize>,
) -> anyhow::Result<Vec<EntityRecord>> {
    let view = CollectionView::new(
        client,
        CacheRegistry::new(),
        collection,
        config.paging.aggregator(),
        config.paging.search_debounce(),
    );

    match search.as_deref() {
        Some(term) => view.search_now(term).await,
        None => view.load().await,
    }

    let wanted = count.unwrap_or(config.paging.initial_count);
    loop {
        let state = view.state();
        if state.items.len() >= wanted || !state.has_more {
            break;
        }
        view.show_more().await;
        if view.state().items.len() == state.items.len() {
            break;
        }
    }

    let state = view.state();
    if let Some(error) = state.error {
        anyhow::bail!("Failed to load {}: {}", collection, error);
    }
    tracing::info!(
        collection,
        records = state.items.len(),
        has_more = state.has_more,
        "Listing complete"
    );

    Ok(state.visible().into_iter().cloned().collect())
}

fn print_records(records: &[EntityRecord], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(records)?),
        OutputFormat::Table => {
            if records.is_empty() {
                println!("No items");
                return Ok(());
            }
            println!("{:<10} {:<32} Alias", "Id", "Name");
            for record in records {
                let id = record.identity().map(|(_, id)| id).unwrap_or_default();
                println!(
                    "{:<10} {:<32} {}",
                    id,
                    record.display_name().unwrap_or("-"),
                    record.alias().unwrap_or("")
                );
            }
        }
    }
    Ok(())
}

fn print_fields(record: &EntityRecord) {
    for (field, value) in record.fields() {
        let rendered = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        println!("{:<20} {}", field, rendered);
    }
}

fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dattebayo={}", config.level)));

    let writer = match &config.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path))?;
            tracing_subscriber::fmt::writer::BoxMakeWriter::new(std::sync::Mutex::new(file))
        }
        None => tracing_subscriber::fmt::writer::BoxMakeWriter::new(std::io::stderr),
    };

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(writer))
            .init();
    }

    Ok(())
}
