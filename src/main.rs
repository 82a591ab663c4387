//! trisearch entry point

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use trisearch::{
    run_http, Config, Dispatcher, ModeSelection, SearchResultItem, SearchSession,
};

/// trisearch: custom, Google and Bing results side by side
#[derive(Parser, Debug)]
#[command(name = "trisearch")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server and web UI (default behavior)
    Serve {
        /// Listen port. Overrides config and the PORT variable.
        #[arg(short, long)]
        port: Option<u16>,
        /// Listen address. Overrides config.
        #[arg(long)]
        host: Option<String>,
        /// Enable JSON logging format
        #[arg(long)]
        json_logs: bool,
    },
    /// Run one search from the command line
    Search {
        /// Search query
        query: String,
        /// Relevance model (page_rank, hits, hybrid, vector)
        #[arg(short, long)]
        model: Option<String>,
        /// Clustering algorithm (kmeans, agglo)
        #[arg(long)]
        cluster: Option<String>,
        /// Query expansion method (association, metric, scalar)
        #[arg(short, long)]
        expand: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command {
        Some(Command::Serve {
            port,
            host,
            json_logs,
        }) => run_server(&args.config, port, host, json_logs).await,
        Some(Command::Search {
            query,
            model,
            cluster,
            expand,
        }) => {
            // Minimal logging for CLI commands
            tracing_subscriber::fmt()
                .with_max_level(tracing::Level::WARN)
                .with_writer(std::io::stderr)
                .init();

            let config = load_config(&args.config)?;
            run_search(config, query, model, cluster, expand, args.json).await
        }
        None => run_server(&args.config, None, None, false).await,
    }
}

fn load_config(path: &Option<String>) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };
    config.apply_env()?;
    Ok(config)
}

async fn run_server(
    config_path: &Option<String>,
    port: Option<u16>,
    host: Option<String>,
    json_logs: bool,
) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting trisearch v{}", env!("CARGO_PKG_VERSION"));

    let mut config = load_config(config_path)?;
    if let Some(p) = port {
        config.server.port = p;
    }
    if let Some(h) = host {
        config.server.host = h;
    }

    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        custom_backend = %config.custom.base_url,
        clustering = config.collaborators.clustering.is_some(),
        expansion = config.collaborators.expansion.is_some(),
        "Configuration loaded"
    );

    run_http(config).await?;
    Ok(())
}

async fn run_search(
    config: Config,
    query: String,
    model: Option<String>,
    cluster: Option<String>,
    expand: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let dispatcher = Dispatcher::from_config(&config)?;
    let mode = ModeSelection::from_params(model.as_deref(), cluster.as_deref(), expand.as_deref())?;

    let mut session = SearchSession::new();
    session.set_query(query);
    session.select(mode);

    if !session.submit(&dispatcher).await {
        if let Some(error) = session.error() {
            anyhow::bail!("{}", error);
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }

    if let Some(expanded) = session.expanded_query() {
        println!("Expanded query: {}\n", expanded);
    }
    print_panel("Custom", session.custom_results());
    print_panel("Google", session.google_results());
    print_panel("Bing", session.bing_results());

    if let Some(error) = session.error() {
        eprintln!("Error: {}", error);
    }
    Ok(())
}

fn print_panel(title: &str, items: &[SearchResultItem]) {
    println!("== {} ({} results) ==", title, items.len());
    for (i, item) in items.iter().enumerate() {
        println!("{:>3}. {}", i + 1, item.title);
        println!("     {}", item.url);
        if let Some(cluster) = &item.cluster {
            println!("     cluster: {}", cluster);
        }
        if !item.snippet.is_empty() {
            println!("     {}", item.snippet);
        }
    }
    println!();
}
