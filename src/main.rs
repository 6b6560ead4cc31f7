mod cache;
mod commands;
mod config;
mod deeplink;
mod export;
mod format;
mod geography;
mod original;
mod prism;
mod scripture;
mod search;

pub const USER_AGENT: &str = concat!("lectio/", env!("CARGO_PKG_VERSION"));

use clap::{Parser, Subcommand};
use commands::{
    DocumentArgs, DocumentsArgs, Lectio, OpenArgs, OriginalArgs, PlacesArgs, SearchArgs, WatchArgs,
};
use tokio::io::BufReader;
use tracing::info;

/// Research client for a Prism-indexed Bible corpus.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Prism API root (overrides PRISM_BASE_URL)
    #[arg(long, global = true)]
    prism_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Semantic verse search across one or more translations
    Search(SearchArgs),
    /// Interactive search: type queries line by line, results follow as you pause
    Watch(WatchArgs),
    /// List biblical places, optionally filtered by type or confidence
    Places(PlacesArgs),
    /// Show the Hebrew, Aramaic, or Greek text of a verse with word glosses
    Original(OriginalArgs),
    /// Show one Prism document by id
    Document(DocumentArgs),
    /// List Prism documents, optionally within one domain
    Documents(DocumentsArgs),
    /// Open a deep link (query, passage, translations, view)
    Open(OpenArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lectio=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let mut settings = config::Settings::from_env()?;
    if let Some(url) = cli.prism_url.as_deref() {
        settings = settings.with_base_url(url)?;
    }
    info!(base_url = %settings.base_url, "starting lectio");

    let lectio = Lectio::new(settings)?;
    let outcome = match cli.command {
        Command::Search(args) => lectio.search(args).await,
        Command::Watch(args) => {
            let stdin = BufReader::new(tokio::io::stdin());
            lectio
                .watch(args, stdin, tokio::io::stdout())
                .await
                .map(|()| String::new())
        }
        Command::Places(args) => lectio.places(args).await,
        Command::Original(args) => lectio.original(args).await,
        Command::Document(args) => lectio.document(args).await,
        Command::Documents(args) => lectio.documents(args).await,
        Command::Open(args) => lectio.open(args).await,
    };

    match outcome {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("{}", e.render());
            std::process::exit(1)
        }
    }
}
