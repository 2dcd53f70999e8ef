pub mod browse;
pub mod client;
pub mod error;
pub mod poller;

pub use browse::{Browser, DISTINCT_COLUMNS};
pub use client::{ListingApiClient, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use poller::{PollSchedule, PollerExit, RefreshPoller, StatusSource};
