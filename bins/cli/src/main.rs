//! Binstore CLI
//!
//! Saves, loads, checks and deletes named objects through the configured
//! store providers.
//!
//! Usage: binstore [--provider <name>] <command>

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use binstore_core::{BlobStore, Provider, StoreRegistry};
use binstore_shared::AppConfig;

#[derive(Parser)]
#[command(name = "binstore")]
#[command(about = "Store and retrieve named binary objects")]
#[command(version)]
struct Cli {
    /// Provider to use instead of the configured default
    #[arg(short, long, env = "BINSTORE_PROVIDER", global = true)]
    provider: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save a local file under an object name
    Save {
        /// Object name, e.g. docs/readme.txt
        name: String,
        /// File to upload
        file: PathBuf,
        /// Content type; the provider default is used when omitted
        #[arg(short, long)]
        content_type: Option<String>,
    },

    /// Load an object to a file or stdout
    Load {
        /// Object name
        name: String,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check whether an object exists
    Exists {
        /// Object name
        name: String,
    },

    /// Delete an object
    Delete {
        /// Object name
        name: String,
    },

    /// List configured providers
    Providers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so `load` can stream content to stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "binstore=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let registry = StoreRegistry::from_config(&config).context("Failed to initialize store")?;

    if matches!(cli.command, Commands::Providers) {
        list_providers(&registry);
        return Ok(());
    }

    let provider = select_provider(&registry, cli.provider.as_deref())?;
    run(provider, cli.command).await
}

fn select_provider<'a>(registry: &'a StoreRegistry, name: Option<&str>) -> anyhow::Result<&'a Provider> {
    match name {
        Some(name) => registry
            .get(name)
            .with_context(|| format!("Store provider '{name}' is not configured")),
        None => Ok(registry.default_provider()),
    }
}

async fn run(provider: &Provider, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Save {
            name,
            file,
            content_type,
        } => {
            let source = File::open(&file)
                .await
                .with_context(|| format!("Failed to open {}", file.display()))?;
            provider
                .save_reader(&name, source, content_type.as_deref())
                .await?;
            info!(name = %name, file = %file.display(), "Object saved");
        }
        Commands::Load { name, output } => {
            let found = match output {
                Some(path) => {
                    let mut target = File::create(&path)
                        .await
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    let found = provider.load_to_writer(&name, &mut target).await?;
                    target.flush().await?;
                    if found.is_none() {
                        tokio::fs::remove_file(&path).await.ok();
                    }
                    found
                }
                None => {
                    let mut stdout = tokio::io::stdout();
                    let found = provider.load_to_writer(&name, &mut stdout).await?;
                    stdout.flush().await?;
                    found
                }
            };

            match found {
                Some(content_type) => info!(name = %name, %content_type, "Object loaded"),
                None => bail!("Object '{name}' not found"),
            }
        }
        Commands::Exists { name } => {
            println!("{}", provider.exists(&name).await?);
        }
        Commands::Delete { name } => {
            if provider.delete(&name).await? {
                println!("deleted");
            } else {
                println!("not found");
            }
        }
        Commands::Providers => {}
    }

    Ok(())
}

fn list_providers(registry: &StoreRegistry) {
    for name in registry.names() {
        let Some(provider) = registry.get(name) else {
            continue;
        };
        let marker = if name == registry.default_name() { "*" } else { " " };
        println!(
            "{marker} {name}\t{}\t{}",
            provider.kind().name(),
            provider.default_content_type()
        );
    }
}
