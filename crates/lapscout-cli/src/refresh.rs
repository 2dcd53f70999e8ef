//! Refresh job command handlers.

use clap::Subcommand;
use lapscout_client::{Browser, ListingApiClient, PollerExit, RefreshPoller};
use lapscout_core::refresh::START_FAILED_MESSAGE;
use lapscout_core::{ListingCounts, RefreshStatus, RefreshTracker};

/// Sub-commands available under `refresh`.
#[derive(Debug, Subcommand)]
pub enum RefreshCommands {
    /// Show the current refresh job snapshot
    Status,
    /// Start a backend refresh job
    Start {
        /// Listing pages for the scraper to walk (defaults to LAPSCOUT_REFRESH_PAGES)
        #[arg(long)]
        pages: Option<u32>,
        /// Follow progress until the job completes
        #[arg(long)]
        watch: bool,
    },
    /// Follow a running job until it completes or Ctrl-C
    Watch,
}

/// # Errors
///
/// Returns an error if a status request fails or the backend refuses to
/// start a job.
pub(crate) async fn run_refresh(
    client: ListingApiClient,
    command: RefreshCommands,
    default_pages: u32,
) -> anyhow::Result<()> {
    match command {
        RefreshCommands::Status => {
            let status = client.refresh_status().await?;
            println!("{}", status_line(&status));
        }
        RefreshCommands::Start { pages, watch } => {
            let pages = pages.unwrap_or(default_pages);
            let mut poller = RefreshPoller::new(client.clone());
            if !poller.start(pages).await {
                let message = poller.tracker().error().unwrap_or(START_FAILED_MESSAGE);
                anyhow::bail!("{message}");
            }
            println!("refresh started ({pages} pages)");
            if watch {
                watch_job(poller, client).await;
            }
        }
        RefreshCommands::Watch => {
            let mut poller = RefreshPoller::new(client.clone());
            poller.poll_once().await;
            let idle = poller
                .tracker()
                .status()
                .filter(|s| !s.is_running())
                .map(status_line);
            if let Some(line) = idle {
                println!("{line}");
            } else {
                watch_job(poller, client).await;
            }
        }
    }
    Ok(())
}

/// Prints a progress line whenever it changes. When a job started by this
/// process completes, reloads counts and deals and prints them.
async fn watch_job(mut poller: RefreshPoller<ListingApiClient>, client: ListingApiClient) {
    let mut last_line = String::new();
    let exit = poller
        .run(
            crate::shutdown_signal(),
            |tracker| {
                let line = progress_line(tracker);
                if line != last_line {
                    println!("{line}");
                    last_line = line;
                }
            },
            || async move {
                let mut browser = Browser::new(client);
                if let Some(counts) = browser.after_refresh().await {
                    print_counts(&counts);
                }
                let top = browser.deal_results().results().iter().take(3);
                for (rank, deal) in top.enumerate() {
                    println!(
                        "deal #{}: {} {} at {:.0} DH",
                        rank + 1,
                        deal.listing.display_brand(),
                        deal.listing.model,
                        deal.listing.price
                    );
                }
            },
        )
        .await;

    if exit == PollerExit::Closed {
        println!("stopped watching; the refresh keeps running on the backend");
    }
}

pub(crate) fn print_counts(counts: &ListingCounts) {
    println!(
        "{} new, {} sold, {} price changes",
        counts.new_listings, counts.sold_listings, counts.price_changed
    );
}

fn progress_line(tracker: &RefreshTracker) -> String {
    if let Some(error) = tracker.error() {
        return format!("error: {error} (still retrying)");
    }
    match tracker.status() {
        Some(status) => status_line(status),
        None => "waiting for status\u{2026}".to_owned(),
    }
}

fn status_line(status: &RefreshStatus) -> String {
    if status.is_completed() {
        return format!(
            "completed: {} new, {} sold, {} price changes ({} scraped, {} added)",
            status.new_count,
            status.sold_count,
            status.price_changed_count,
            status.total_scraped,
            status.items_added
        );
    }
    if !status.is_running() {
        return format!("{}: {}", status.status, status.message);
    }
    let line = if status.has_parsing_phase() {
        format!(
            "parsing {:.0}% {}",
            status.parsing_progress, status.parsing_message
        )
    } else {
        format!(
            "scraping {:.0}% {}",
            status.scraping_progress, status.scraping_message
        )
    };
    let line = line.trim_end();
    if status.scraping_complete {
        format!(
            "{line} ({} new, {} sold, {} price changes, {} scraped)",
            status.new_count, status.sold_count, status.price_changed_count, status.total_scraped
        )
    } else {
        line.to_owned()
    }
}
