mod listings;
mod refresh;

use clap::{Parser, Subcommand};
use lapscout_client::{Browser, ListingApiClient};
use tracing_subscriber::EnvFilter;

use crate::listings::FilterArgs;
use crate::refresh::RefreshCommands;

#[derive(Debug, Parser)]
#[command(name = "lapscout")]
#[command(about = "Browse, search and price second-hand laptop listings")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract specs from a free-text description and predict a price
    Estimate {
        /// Listing description, e.g. "asus rog i7 16gb rtx 3070"
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
    },
    /// Semantic search over listings
    Find {
        query: String,
        /// Number of pages to fetch
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
        pages: u32,
    },
    /// Structured search with filters
    Filter {
        #[command(flatten)]
        filter: FilterArgs,
        /// Number of pages to fetch
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
        pages: u32,
    },
    /// Best deals by score per price
    Deals {
        /// Number of pages to fetch
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
        pages: u32,
    },
    /// List distinct values of a filter column (all columns when omitted)
    Distinct { column: Option<String> },
    /// Show new, sold and re-priced listing counts
    Counts,
    /// Backend data refresh jobs
    Refresh {
        #[command(subcommand)]
        command: RefreshCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = lapscout_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("lapscout: no command given; run `lapscout --help`");
        return Ok(());
    };

    let client = ListingApiClient::from_config(&config)?;
    tracing::debug!(base_url = %client.base_url(), env = %config.env, "client ready");

    match command {
        Commands::Estimate { description } => {
            listings::run_estimate(&Browser::new(client), &description.join(" ")).await?;
        }
        Commands::Find { query, pages } => {
            listings::run_find(&mut Browser::new(client), &query, pages).await?;
        }
        Commands::Filter { filter, pages } => {
            let mut browser = Browser::new(client);
            browser.set_filter(filter.into());
            listings::run_filter(&mut browser, pages).await?;
        }
        Commands::Deals { pages } => {
            listings::run_deals(&mut Browser::new(client), pages).await?;
        }
        Commands::Distinct { column } => {
            listings::run_distinct(&Browser::new(client), column.as_deref()).await?;
        }
        Commands::Counts => {
            let counts = client.refresh_counts().await?;
            refresh::print_counts(&counts);
        }
        Commands::Refresh { command } => {
            refresh::run_refresh(client, command, config.refresh_pages).await?;
        }
    }

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM. If a handler cannot be installed that
/// signal is ignored rather than ending the watch.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, closing refresh watch");
}
