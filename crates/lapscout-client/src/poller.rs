//! Async driver for the refresh-job poller.
//!
//! [`RefreshPoller`] owns a [`RefreshTracker`] and feeds it status snapshots
//! from a [`StatusSource`]. Failed polls are retried on the next tick at the
//! same interval: there is no backoff and no give-up point. The loop ends
//! when the caller's shutdown future resolves or the job reaches
//! `completed`. Ending the loop never cancels anything on the backend.

use std::future::Future;
use std::time::Duration;

use lapscout_core::refresh::{NORMAL_POLL_INTERVAL, PARSING_POLL_INTERVAL};
use lapscout_core::{PollOutcome, RefreshStatus, RefreshTracker, StartRefreshResponse};

use crate::client::ListingApiClient;
use crate::error::ApiError;

/// Where the poller gets job snapshots and starts jobs.
pub trait StatusSource {
    fn fetch_status(&self) -> impl Future<Output = Result<RefreshStatus, ApiError>> + Send;

    fn start_job(
        &self,
        pages: u32,
    ) -> impl Future<Output = Result<StartRefreshResponse, ApiError>> + Send;
}

impl StatusSource for ListingApiClient {
    fn fetch_status(&self) -> impl Future<Output = Result<RefreshStatus, ApiError>> + Send {
        self.refresh_status()
    }

    fn start_job(
        &self,
        pages: u32,
    ) -> impl Future<Output = Result<StartRefreshResponse, ApiError>> + Send {
        self.start_refresh(pages)
    }
}

/// Delays between polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub normal: Duration,
    /// Used while parsing runs after scraping has finished.
    pub parsing: Duration,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            normal: NORMAL_POLL_INTERVAL,
            parsing: PARSING_POLL_INTERVAL,
        }
    }
}

impl PollSchedule {
    /// Delay before the next poll, from the tracker's last good status.
    #[must_use]
    pub fn interval(&self, tracker: &RefreshTracker) -> Duration {
        if tracker.parsing_in_progress() {
            self.parsing
        } else {
            self.normal
        }
    }
}

/// Why [`RefreshPoller::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerExit {
    /// The shutdown future resolved.
    Closed,
    /// The backend reported `completed`.
    Completed,
}

pub struct RefreshPoller<S> {
    source: S,
    tracker: RefreshTracker,
    schedule: PollSchedule,
}

impl<S: StatusSource> RefreshPoller<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self::with_schedule(source, PollSchedule::default())
    }

    #[must_use]
    pub fn with_schedule(source: S, schedule: PollSchedule) -> Self {
        Self {
            source,
            tracker: RefreshTracker::new(),
            schedule,
        }
    }

    #[must_use]
    pub fn tracker(&self) -> &RefreshTracker {
        &self.tracker
    }

    /// Fetches one snapshot. Returns `None` when the fetch failed; the
    /// failure is counted, logged and otherwise swallowed.
    pub async fn poll_once(&mut self) -> Option<PollOutcome> {
        match self.source.fetch_status().await {
            Ok(status) => {
                tracing::debug!(
                    status = %status.status,
                    scraping = status.scraping_progress,
                    parsing = status.parsing_progress,
                    "refresh status"
                );
                Some(self.tracker.record_status(status))
            }
            Err(e) => {
                self.tracker.record_failure();
                tracing::warn!(
                    failures = self.tracker.consecutive_failures(),
                    timeout = e.is_timeout(),
                    error = %e,
                    "refresh status check failed"
                );
                None
            }
        }
    }

    /// Requests a new refresh job. Returns whether a job is now in flight.
    ///
    /// A refusal from the backend, either as `started: false` or as an error
    /// status with a `detail`, is surfaced through the tracker's error.
    pub async fn start(&mut self, pages: u32) -> bool {
        self.tracker.begin_start();
        match self.source.start_job(pages).await {
            Ok(response) => {
                if !response.started {
                    tracing::warn!(message = %response.message, "refresh not started");
                }
                self.tracker.record_start_response(&response);
            }
            Err(ApiError::Backend { detail, .. }) => {
                tracing::warn!(message = %detail, "refresh not started");
                self.tracker.record_start_response(&StartRefreshResponse {
                    started: false,
                    message: detail,
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "refresh start request failed");
                self.tracker.record_start_failure();
            }
        }
        self.tracker.in_flight()
    }

    /// Clears the failure overlay and polls once right away.
    pub async fn retry(&mut self) -> Option<PollOutcome> {
        self.tracker.clear_error();
        self.poll_once().await
    }

    /// Polls immediately, then at the adaptive interval, until `shutdown`
    /// resolves or the job is complete.
    ///
    /// `on_update` sees the tracker after every poll, failed or not.
    /// `on_complete` runs exactly once if a job started through
    /// [`RefreshPoller::start`] finishes while the loop is running.
    pub async fn run<F, U, C, Fut>(
        &mut self,
        shutdown: F,
        mut on_update: U,
        on_complete: C,
    ) -> PollerExit
    where
        F: Future<Output = ()>,
        U: FnMut(&RefreshTracker),
        C: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut on_complete = Some(on_complete);

        loop {
            let outcome = self.poll_once().await;
            on_update(&self.tracker);

            if outcome == Some(PollOutcome::Completed) {
                tracing::info!("refresh job completed");
                if let Some(callback) = on_complete.take() {
                    callback().await;
                }
            }
            if self.tracker.is_completed() && !self.tracker.in_flight() {
                return PollerExit::Completed;
            }

            let delay = self.schedule.interval(&self.tracker);
            tokio::select! {
                () = &mut shutdown => {
                    tracing::debug!("refresh poller closed");
                    return PollerExit::Closed;
                }
                () = tokio::time::sleep(delay) => {}
            }
        }
    }
}
