//! Listing browse command handlers: estimate, find, filter, deals, distinct.
//!
//! Each paginated command fetches page one, then keeps loading more while
//! the pager reports more results and the requested page count allows.

use clap::Args;
use lapscout_client::{Browser, DISTINCT_COLUMNS};
use lapscout_core::listing::spec_label;
use lapscout_core::{FetchMode, FilterState, Listing, Pager, RankedDeal, TriState};

/// Filter flags for the `filter` command. Numeric bounds are passed through
/// as typed; the backend interprets them.
#[derive(Debug, Args)]
pub struct FilterArgs {
    #[arg(long)]
    pub brand: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub cpu_family: Option<String>,
    #[arg(long)]
    pub gpu_type: Option<String>,
    /// Only new (`true`) or only used (`false`) laptops
    #[arg(long = "new")]
    pub is_new: Option<bool>,
    /// Only SSD (`true`) or only non-SSD (`false`) storage
    #[arg(long = "ssd")]
    pub is_ssd: Option<bool>,
    #[arg(long)]
    pub price_min: Option<String>,
    #[arg(long)]
    pub price_max: Option<String>,
    #[arg(long = "ram-min")]
    pub ram_gb_min: Option<String>,
    #[arg(long = "ram-max")]
    pub ram_gb_max: Option<String>,
    #[arg(long = "storage-min")]
    pub storage_gb_min: Option<String>,
    #[arg(long = "storage-max")]
    pub storage_gb_max: Option<String>,
    /// Keep listings without a price ("price on request")
    #[arg(long)]
    pub include_zero_price: bool,
    /// Backend sort key, e.g. `price` or `laptop_score`
    #[arg(long)]
    pub order_by: Option<String>,
}

impl From<FilterArgs> for FilterState {
    fn from(args: FilterArgs) -> Self {
        Self {
            brand: args.brand.unwrap_or_default(),
            city: args.city.unwrap_or_default(),
            cpu_family: args.cpu_family.unwrap_or_default(),
            gpu_type: args.gpu_type.unwrap_or_default(),
            is_new: TriState::from(args.is_new),
            is_ssd: TriState::from(args.is_ssd),
            price_min: args.price_min.unwrap_or_default(),
            price_max: args.price_max.unwrap_or_default(),
            ram_gb_min: args.ram_gb_min.unwrap_or_default(),
            ram_gb_max: args.ram_gb_max.unwrap_or_default(),
            storage_gb_min: args.storage_gb_min.unwrap_or_default(),
            storage_gb_max: args.storage_gb_max.unwrap_or_default(),
            include_zero_price: args.include_zero_price,
            order_by: args.order_by,
        }
    }
}

/// Print the extracted specs, component scores and predicted price.
///
/// # Errors
///
/// Returns an error if the estimate request fails.
pub(crate) async fn run_estimate(browser: &Browser, description: &str) -> anyhow::Result<()> {
    let Some(result) = browser.estimate(description).await? else {
        anyhow::bail!("description must not be empty");
    };

    println!(
        "Estimated price: {} DH ({} confidence, {} features found)",
        fmt_price(result.predicted_price),
        result.confidence,
        result.features_found
    );
    println!();

    println!("{:<16}VALUE", "SPEC");
    for (key, value) in &result.specs {
        println!("{:<16}{value}", spec_label(key));
    }

    let scores = result.score_rows();
    if !scores.is_empty() {
        println!();
        println!("{:<16}SCORE", "COMPONENT");
        for (component, score) in scores {
            println!("{component:<16}{score:.1}/10");
        }
    }

    Ok(())
}

/// Semantic search, `pages` pages deep at most.
///
/// # Errors
///
/// Returns an error if the query is blank or any page request fails.
pub(crate) async fn run_find(browser: &mut Browser, query: &str, pages: u32) -> anyhow::Result<()> {
    if query.trim().is_empty() {
        anyhow::bail!("search query must not be empty");
    }

    browser.find(query, FetchMode::Reset).await?;
    for _ in 1..pages {
        if !browser.find_results().can_load_more() {
            break;
        }
        browser.find(query, FetchMode::Continue).await?;
    }

    print_listings(browser.find_results(), true);
    Ok(())
}

/// Filter search with the browser's current filter state.
///
/// # Errors
///
/// Returns an error if any page request fails.
pub(crate) async fn run_filter(browser: &mut Browser, pages: u32) -> anyhow::Result<()> {
    browser.apply_filters(FetchMode::Reset).await?;
    for _ in 1..pages {
        if !browser.filter_results().can_load_more() {
            break;
        }
        browser.apply_filters(FetchMode::Continue).await?;
    }

    print_listings(browser.filter_results(), false);
    Ok(())
}

/// Best deals, ranked within each fetched page.
///
/// # Errors
///
/// Returns an error if any page request fails.
pub(crate) async fn run_deals(browser: &mut Browser, pages: u32) -> anyhow::Result<()> {
    browser.deals(FetchMode::Reset).await?;
    for _ in 1..pages {
        if !browser.deal_results().can_load_more() {
            break;
        }
        browser.deals(FetchMode::Continue).await?;
    }

    print_deals(browser.deal_results());
    Ok(())
}

/// Print distinct values for one column, or for every filter column.
///
/// # Errors
///
/// Returns an error if a single requested column cannot be loaded.
pub(crate) async fn run_distinct(browser: &Browser, column: Option<&str>) -> anyhow::Result<()> {
    if let Some(column) = column {
        if !DISTINCT_COLUMNS.contains(&column) {
            tracing::warn!(column, "not a known filter column; asking the backend anyway");
        }
        let values = browser.client().distinct_values(column).await?;
        print_values(column, &values);
        return Ok(());
    }

    for (column, values) in browser.load_distinct_values().await {
        print_values(column, &values);
    }
    Ok(())
}

fn print_values(column: &str, values: &[String]) {
    if values.is_empty() {
        println!("{column}: \u{2014}");
    } else {
        println!("{column}: {}", values.join(", "));
    }
}

fn print_listings(pager: &Pager<Listing>, with_match: bool) {
    if pager.results().is_empty() {
        println!("no laptops found");
        return;
    }

    println!(
        "{:<10}{:<24}{:<20}{:<18}{:<8}{:>12}  {:<14}NOTES",
        "BRAND", "MODEL", "CPU", "GPU", "RAM", "PRICE", "CITY"
    );
    for listing in pager.results() {
        let mut notes = Vec::new();
        if with_match {
            if let Some(score) = listing.match_score {
                notes.push(format!("{score}% match"));
            }
        }
        notes.extend(listing_badges(listing));
        print_row(listing, &notes.join(" "));
    }
    print_footer(pager);
}

fn print_deals(pager: &Pager<RankedDeal>) {
    if pager.results().is_empty() {
        println!("no deals found");
        return;
    }

    println!(
        "{:<10}{:<24}{:<20}{:<18}{:<8}{:>12}  {:<14}NOTES",
        "BRAND", "MODEL", "CPU", "GPU", "RAM", "PRICE", "CITY"
    );
    for deal in pager.results() {
        let mut notes = vec![format!("score/price {:.3}", deal.deal_score)];
        notes.extend(listing_badges(&deal.listing));
        print_row(&deal.listing, &notes.join(" "));
    }
    print_footer(pager);
}

fn print_row(listing: &Listing, notes: &str) {
    println!(
        "{:<10}{:<24}{:<20}{:<18}{:<8}{:>12}  {:<14}{}",
        truncate(&listing.display_brand(), 9),
        truncate(&listing.model, 23),
        truncate(&listing.cpu, 19),
        truncate(&listing.gpu, 17),
        truncate(&listing.ram, 7),
        format!("{} DH", fmt_price(listing.price)),
        truncate(&listing.city, 13),
        notes
    );
}

fn print_footer<T>(pager: &Pager<T>) {
    println!();
    if pager.can_load_more() {
        println!(
            "showing {} of {}; pass a larger --pages to load more",
            pager.results().len(),
            pager.total()
        );
    } else {
        println!("showing {} of {}", pager.results().len(), pager.total());
    }
}

fn listing_badges(listing: &Listing) -> Vec<String> {
    let mut badges = Vec::new();
    if let Some(pct) = listing.price_drop_percent() {
        badges.push(format!("-{pct}%"));
    }
    if listing.is_new_listing {
        badges.push("NEW".to_owned());
    }
    if listing.is_sold {
        badges.push("SOLD".to_owned());
    }
    badges
}

fn fmt_price(price: f64) -> String {
    if price > 0.0 {
        format!("{price:.0}")
    } else {
        "\u{2014}".to_owned()
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        format!("{}\u{2026}", s.chars().take(max - 1).collect::<String>())
    } else if s.is_empty() {
        "\u{2014}".to_owned()
    } else {
        s.to_owned()
    }
}
