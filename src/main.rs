//! `craft`: serve the application, list its routes, run the self-test or
//! build URLs for named routes.
//!
//! ```text
//! craft [--config craft.toml] serve
//! craft routes
//! craft self-test [--html] [--value 42]
//! craft url profile.show 7
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use craft_router::config::{load_config, CraftConfig};
use craft_router::http::HttpServer;
use craft_router::lifecycle::{build_router, signals, Shutdown};
use craft_router::observability::{init_logging, metrics};
use craft_router::routing::Router;

#[derive(Parser)]
#[command(name = "craft")]
#[command(about = "MVC-style router with an HTML and a JSON api route space", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the application over HTTP
    Serve,
    /// List registered routes
    Routes,
    /// Replay every route and report PASS/FAIL
    SelfTest {
        /// Render the report as an HTML table
        #[arg(long)]
        html: bool,
        /// Value substituted for every path parameter
        #[arg(long)]
        value: Option<String>,
    },
    /// Print the URL of a named route
    Url {
        name: String,
        /// Positional parameters, left to right
        params: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => CraftConfig::default(),
    };
    init_logging(&config.observability);

    let router = build_router(&config)?;

    match cli.command {
        Commands::Serve => serve(config, router).await?,
        Commands::Routes => print_routes(&router),
        Commands::SelfTest { html, value } => {
            let value = value.unwrap_or_else(|| config.self_test.value.clone());
            let report = tokio::task::spawn_blocking(move || router.self_test(&value)).await?;
            if html {
                println!("{}", report.render_html());
            } else {
                println!("{report}");
            }
            if report.failed() > 0 {
                std::process::exit(1);
            }
        }
        Commands::Url { name, params } => match router.route(&name, &params) {
            Some(url) => println!("{url}"),
            None => {
                eprintln!("Error: no route named '{name}'");
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

async fn serve(config: CraftConfig, router: Router) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        bind_address = %config.server.bind_address,
        request_timeout_secs = config.server.request_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config, Arc::new(router));
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn print_routes(router: &Router) {
    println!("{:<8} {:<9} {:<36} {:<28} NAME", "METHOD", "SPACE", "PATTERN", "HANDLER");
    for route in router.routes() {
        let name = router
            .names()
            .iter()
            .find(|(_, entry)| entry.method == route.method && entry.pattern == route.path())
            .map(|(name, _)| name)
            .unwrap_or("-");
        println!(
            "{:<8} {:<9} {:<36} {:<28} {}",
            route.method.as_str(),
            route.space.as_str(),
            route.path(),
            route.handler.to_string(),
            name
        );
    }
}
