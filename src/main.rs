//! sheetkb: knowledge-base search server
//!
//! This is the main entry point for the application.

use anyhow::{bail, Result};
use sheetkb::{
    config::{self, Settings},
    web::{create_router, AppState},
    KnowledgeBase,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

enum Command {
    Serve,
    Search(String),
}

struct Args {
    config: Option<PathBuf>,
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let Some(args) = parse_args()? else {
        return Ok(());
    };

    // Load configuration
    let settings = config::load(args.config.as_deref())?;

    // Initialize logging
    init_logging(&settings);
    info!("Starting sheetkb v{}", sheetkb::VERSION);
    info!(
        "Loaded configuration for instance: {}",
        settings.general.instance_name
    );

    match args.command {
        Command::Search(query) => run_search(&settings, &query).await,
        Command::Serve => serve(settings).await,
    }
}

fn init_logging(settings: &Settings) {
    let default = if settings.general.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn serve(settings: Settings) -> Result<()> {
    // Bind address
    let addr = SocketAddr::new(settings.server.bind_address.parse()?, settings.server.port);

    // Create application state
    let state = AppState::from_settings(settings)?;
    info!("Application state initialized");

    let app = create_router(state);

    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// One-shot search printed as JSON
async fn run_search(settings: &Settings, query: &str) -> Result<()> {
    let kb = KnowledgeBase::from_settings(settings)?;
    let response = kb.search(query).await;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Parse command-line arguments; `None` means the process should exit
fn parse_args() -> Result<Option<Args>> {
    let mut config = None;
    let mut terms = Vec::new();
    let mut search = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                return Ok(None);
            }
            "-V" | "--version" => {
                println!("sheetkb {}", sheetkb::VERSION);
                return Ok(None);
            }
            "-c" | "--config" => match args.next() {
                Some(path) => config = Some(PathBuf::from(path)),
                None => bail!("{} requires a file argument", arg),
            },
            "search" if !search => search = true,
            term if search => terms.push(term.to_string()),
            other => bail!("unknown argument: {}", other),
        }
    }

    let command = if search {
        if terms.is_empty() {
            bail!("search requires at least one term");
        }
        Command::Search(terms.join(" "))
    } else {
        Command::Serve
    };

    Ok(Some(Args { config, command }))
}

/// Print usage information
fn print_usage() {
    println!(
        r#"
sheetkb v{}
Search and cached access over a spreadsheet-backed knowledge base

USAGE:
    sheetkb [OPTIONS]                  Start the HTTP server
    sheetkb [OPTIONS] search <TERMS>   Run one search and print JSON

OPTIONS:
    -c, --config <FILE>    Path to configuration file
    -h, --help             Print help information
    -V, --version          Print version information

ENVIRONMENT VARIABLES:
    SHEETKB_SETTINGS_PATH  Path to settings.yml
    SHEETKB_DEBUG          Enable debug logging (true/false)
    SHEETKB_SPREADSHEET_ID Spreadsheet to read
    SHEETKB_API_KEY        Google Sheets API key
    SHEETKB_CACHE_TTL_MS   Cache entry lifetime in milliseconds
    SHEETKB_PORT           Server port
    SHEETKB_BIND_ADDRESS   Bind address
    RUST_LOG               Log filter, overrides SHEETKB_DEBUG
"#,
        sheetkb::VERSION
    );
}
