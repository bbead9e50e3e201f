#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for bank branch search.
//!
//! Initializes the search index and abbreviation registry once, then
//! serves the REST API (`/api/search`, `/api/location`, `/api/health`)
//! and the static frontend files.

mod config;
mod handlers;

use std::path::PathBuf;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use clap::Parser;

use bankfind_search::{
    AbbreviationRegistry, BankIndex, SearchContext, SearchIndexConfig, ingest,
};
use config::ServerConfig;

/// Command line options for the server binary.
#[derive(Parser)]
#[command(name = "bankfind_server", about = "Bank branch search API server")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Rebuild the search index from the CSV before serving
    #[arg(long)]
    reindex: bool,

    /// Build the search index and exit without serving
    #[arg(long)]
    create_index: bool,
}

/// Errors that abort server startup.
///
/// Components only propagate; deciding to exit the process is `main`'s
/// job alone.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    /// Index open failure.
    #[error("search index error: {0}")]
    Search(#[from] bankfind_search::SearchError),

    /// Index build failure.
    #[error("index build error: {0}")]
    Ingest(#[from] bankfind_search::ingest::IngestError),

    /// Abbreviation registry failure.
    #[error("abbreviation registry error: {0}")]
    Registry(#[from] bankfind_search::registry::RegistryError),
}

/// Shared application state.
pub struct AppState {
    /// Immutable search state (index reader + abbreviation registry).
    pub context: SearchContext,
    /// Server configuration.
    pub config: ServerConfig,
    /// Outbound HTTP client for the geocoding proxy.
    pub http: reqwest::Client,
}

/// Builds or opens the search index and loads the registry.
///
/// Returns `None` when `--create-index` was given: the index has been
/// built and the process should exit without serving.
fn init_search(cli: &Cli, config: &ServerConfig) -> Result<Option<SearchContext>, StartupError> {
    let index_config = SearchIndexConfig {
        index_dir: config.index_dir.display().to_string(),
        batch_size: config.batch_size,
        writer_heap_bytes: config.writer_heap_bytes,
    };

    if cli.reindex || cli.create_index || !BankIndex::is_available(&config.index_dir) {
        log::info!(
            "Creating new search index in path {}",
            config.index_dir.display()
        );
        ingest::build_index(&config.index_dir, &config.data_path, &index_config)?;
    } else {
        log::info!(
            "Opening existing index in path {}",
            config.index_dir.display()
        );
    }

    if cli.create_index {
        return Ok(None);
    }

    let index = BankIndex::open(&config.index_dir)?;

    log::info!("Loading bank abbreviations.");
    let registry = AbbreviationRegistry::load(&config.banks_list_path, &config.data_path)?;

    Ok(Some(SearchContext::new(index, registry)))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();

    let config = match ServerConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load config {}: {e}", cli.config.display());
            std::process::exit(1);
        }
    };

    let context = match init_search(&cli, &config) {
        Ok(Some(context)) => context,
        Ok(None) => {
            log::info!("Index created; exiting.");
            return Ok(());
        }
        Err(e) => {
            log::error!("Startup failed: {e}");
            std::process::exit(1);
        }
    };

    log::info!(
        "Serving {} branch records",
        context.index().num_docs()
    );

    let address = config.address.clone();
    let static_dir = config.static_dir.clone();

    let state = web::Data::new(AppState {
        context,
        config,
        http: reqwest::Client::new(),
    });

    log::info!("Starting server: http://{address}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .route("", web::get().to(handlers::index))
                    .route("/health", web::get().to(handlers::health))
                    .route("/search", web::get().to(handlers::search))
                    .route("/location", web::get().to(handlers::location)),
            )
            // Serve frontend static files (production)
            .service(Files::new("/", static_dir.clone()).index_file("index.html"))
    })
    .bind(address.as_str())?
    .run()
    .await
}
