//! Pure domain logic for the laptop listing client.
//!
//! Nothing in this crate performs I/O: the HTTP side lives in
//! `lapscout-client`, which feeds decoded payloads into the types and state
//! machines defined here.

pub mod app_config;
pub mod config;
pub mod deals;
pub mod filter;
pub mod listing;
pub mod pager;
pub mod refresh;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use deals::{rank_deals, RankedDeal};
pub use filter::{deals_query, find_query, FilterState, QueryPairs, TriState};
pub use listing::{
    DistinctValues, EstimateResult, Listing, ListingCounts, SearchPage, SpecValue,
    StartRefreshResponse,
};
pub use pager::{FetchMode, Pager, PAGE_SIZE};
pub use refresh::{PollOutcome, RefreshStatus, RefreshTracker};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
