//! HTTP Server Binary for kbsearch
//!
//! Serves lookup, search and predicate-chain requests over an existing index.
//!
//! Usage:
//!   kbsearch-http --host 0.0.0.0 --port 8080 --index ./data/basekb.tsv.index

use clap::Parser;
use kbsearch::{
    api::SearchApi,
    config::{ConfigFile, SearchConfig},
    http::start_server,
    logging::init_logging,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "kbsearch HTTP Server")]
#[command(about = "HTTP API server for kbsearch knowledge-base indexes", long_about = None)]
struct Args {
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Index directory, defaults to the configured one
    #[arg(short, long)]
    index: Option<PathBuf>,

    /// Configuration file of `setenv NAME value` lines
    #[arg(short = 'C', long)]
    config_file: Option<PathBuf>,

    /// Collapse newlines in printed values
    #[arg(long)]
    normalize_newlines: bool,

    /// Most hits a ranker collects per request
    #[arg(long)]
    search_depth: Option<usize>,

    /// Debug logging
    #[arg(short, long)]
    debug: bool,
}

fn search_config(args: &Args) -> kbsearch::Result<SearchConfig> {
    let mut config = match &args.config_file {
        Some(path) => {
            let home = path.parent().map(PathBuf::from).unwrap_or_default();
            SearchConfig::from_file(&ConfigFile::load(path, &home)?)?
        }
        None => SearchConfig::default(),
    };
    if let Some(index) = &args.index {
        config.index_directory = Some(index.clone());
    }
    config.normalize_newlines |= args.normalize_newlines;
    if let Some(depth) = args.search_depth {
        config.search_depth = depth;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(true, args.debug);

    let api = match search_config(&args).and_then(SearchApi::open) {
        Ok(api) => Arc::new(api),
        Err(e) => {
            error!("Cannot open the index: {}", e);
            std::process::exit(1);
        }
    };
    info!("Serving {} documents from {}", api.index().num_docs(), api.index().location().display());

    let addr = format!("{}:{}", args.host, args.port);

    // Set up graceful shutdown
    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install CTRL+C signal handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received, stopping server...");
    };

    // Run server with graceful shutdown
    tokio::select! {
        result = start_server(&addr, api) => {
            if let Err(e) = result {
                error!("Server error: {}", e);
                std::process::exit(1);
            }
        }
        _ = shutdown_signal => {
            info!("Server shut down gracefully");
        }
    }

    Ok(())
}
