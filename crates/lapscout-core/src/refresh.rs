//! Refresh-job tracking.
//!
//! A refresh job runs entirely on the backend: it scrapes listing pages, then
//! parses the new items. The client only observes it through periodic status
//! snapshots. [`RefreshTracker`] is the pure state machine behind the poller:
//! it decides the next poll interval, counts consecutive failed polls, and
//! reports when a job the client started has finished.
//!
//! The error overlay is independent of the job status. A run of failed polls
//! raises an error message but leaves the last good status in place, and
//! polling carries on regardless.

use std::time::Duration;

use serde::Deserialize;

use crate::listing::{null_as_default, StartRefreshResponse};

/// Poll interval while the backend is scraping, or idle.
pub const NORMAL_POLL_INTERVAL: Duration = Duration::from_millis(1500);

/// Poll interval once scraping is done and parsing is still running.
pub const PARSING_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Consecutive failed polls tolerated before the error message is shown.
pub const FAILURE_THRESHOLD: u32 = 10;

pub const CONNECTION_LOST_MESSAGE: &str = "Connection lost. Backend may be busy processing.";
pub const START_FAILED_MESSAGE: &str = "Failed to start refresh";

/// Snapshot from `GET /api/refresh/status`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RefreshStatus {
    /// `"idle"`, `"running"` or `"completed"`; other values are kept as-is.
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(deserialize_with = "null_as_default")]
    pub scraping_progress: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub scraping_complete: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub scraping_message: String,
    #[serde(deserialize_with = "null_as_default")]
    pub parsing_progress: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub parsing_complete: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub parsing_message: String,
    #[serde(deserialize_with = "null_as_default")]
    pub new_count: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub sold_count: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub price_changed_count: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_scraped: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub items_added: u64,
}

impl RefreshStatus {
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == "running"
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == "completed"
    }

    /// Parsing only has work to do when scraping found new items.
    #[must_use]
    pub fn has_parsing_phase(&self) -> bool {
        self.scraping_complete && self.new_count > 0
    }
}

/// What a successful poll changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Status stored; nothing else to do.
    Updated,
    /// The job this client started has just completed. Reported once per job.
    Completed,
}

#[derive(Debug, Clone, Default)]
pub struct RefreshTracker {
    status: Option<RefreshStatus>,
    failures: u32,
    error: Option<String>,
    in_flight: bool,
}

impl RefreshTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(&self) -> Option<&RefreshStatus> {
        self.status.as_ref()
    }

    #[must_use]
    pub fn consecutive_failures(&self) -> u32 {
        self.failures
    }

    /// Message to show the user, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a job started by this client is still awaiting completion.
    #[must_use]
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status.as_ref().is_some_and(RefreshStatus::is_completed)
    }

    /// Scraping has finished and parsing has not, per the last good status.
    #[must_use]
    pub fn parsing_in_progress(&self) -> bool {
        self.status
            .as_ref()
            .is_some_and(|s| s.scraping_complete && !s.parsing_complete)
    }

    /// Records a successful poll. Clears the failure overlay unconditionally.
    pub fn record_status(&mut self, status: RefreshStatus) -> PollOutcome {
        let completed = status.is_completed();
        self.status = Some(status);
        self.failures = 0;
        self.error = None;

        if completed && self.in_flight {
            self.in_flight = false;
            PollOutcome::Completed
        } else {
            PollOutcome::Updated
        }
    }

    /// Records a failed or timed-out poll. The message appears once the run
    /// of failures exceeds [`FAILURE_THRESHOLD`].
    pub fn record_failure(&mut self) {
        self.failures = self.failures.saturating_add(1);
        if self.failures > FAILURE_THRESHOLD {
            self.error = Some(CONNECTION_LOST_MESSAGE.to_owned());
        }
    }

    /// Marks a job as requested, before the start call goes out.
    pub fn begin_start(&mut self) {
        self.in_flight = true;
        self.error = None;
        self.failures = 0;
    }

    /// Applies the start endpoint's answer. A refusal (e.g. a job is already
    /// running) surfaces the backend's message and leaves nothing in flight.
    pub fn record_start_response(&mut self, response: &StartRefreshResponse) {
        if !response.started {
            self.error = Some(response.message.clone());
            self.in_flight = false;
        }
    }

    /// The start call itself failed to reach the backend.
    pub fn record_start_failure(&mut self) {
        self.error = Some(START_FAILED_MESSAGE.to_owned());
        self.in_flight = false;
    }

    /// Manual retry: forget the failure run before polling again.
    pub fn clear_error(&mut self) {
        self.error = None;
        self.failures = 0;
    }
}
