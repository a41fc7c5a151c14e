//! Edge router for a static site.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │                 EDGE ROUTER                  │
//!   HTTP request        │  ┌──────────┐    ┌──────────────────────┐    │
//!   ────────────────────┼─▶│  http    │───▶│       routing        │    │
//!   (serve)             │  │  server  │    │ 1. canonical host    │    │
//!                       │  └──────────┘    │ 2. webfinger         │    │
//!   viewer-request      │  ┌──────────┐    │ 3. go vanity imports │    │
//!   event JSON ─────────┼─▶│  http    │───▶│ 4. pass-through      │    │
//!   (eval / check)      │  │  edge    │    └──────────┬───────────┘    │
//!                       │  └──────────┘               │                │
//!                       │        redirect / JSON / HTML / 404          │
//!                       │        or the request, untouched ──▶ static  │
//!                       │                                      files   │
//!                       │  ┌────────────────────────────────────────┐  │
//!                       │  │ config · observability · lifecycle     │  │
//!                       │  └────────────────────────────────────────┘  │
//!                       └──────────────────────────────────────────────┘
//! ```

use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use edge_router::config::{load_config, SiteConfig};
use edge_router::conformance;
use edge_router::http::handle_event;
use edge_router::lifecycle::startup;
use edge_router::observability::logging;
use edge_router::routing::SiteRouter;

#[derive(Parser)]
#[command(name = "edge-router")]
#[command(about = "Canonical host, WebFinger and Go vanity import router", long_about = None)]
struct Cli {
    /// Site configuration file (TOML).
    #[arg(short, long, env = "EDGE_ROUTER_CONFIG", default_value = "site.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve HTTP, passing unrouted requests to the static directory
    Serve {
        /// Reload routing tables when the config file changes
        #[arg(long)]
        watch: bool,
    },
    /// Route one viewer-request event (stdin by default) and print the result
    Eval {
        /// Event JSON file
        #[arg(short, long)]
        event: Option<PathBuf>,
    },
    /// Run the self-test suite derived from the configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config: SiteConfig = load_config(&cli.config)?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!(
        path = %cli.config.display(),
        canonical_host = %config.canonical_host,
        modules = config.modules.len(),
        "Configuration loaded"
    );

    match cli.command {
        Commands::Serve { watch } => {
            let watch_path = watch.then_some(cli.config.as_path());
            startup::serve(config, watch_path).await?;
        }
        Commands::Eval { event } => {
            let json = match event {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let router = SiteRouter::from_config(&config);
            let result = handle_event(&router, &json)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Check => {
            let router = SiteRouter::from_config(&config);
            let cases = conformance::suite(&config);
            let report = conformance::run_suite(&router, &cases);
            println!("{} passed, {} failed", report.passed, report.failures.len());
            for failure in &report.failures {
                println!("FAIL {}: {}", failure.name, failure.reason);
            }
            if !report.is_success() {
                return Err(format!("{} checks failed", report.failures.len()).into());
            }
        }
    }

    Ok(())
}
