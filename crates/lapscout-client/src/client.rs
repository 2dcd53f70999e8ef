//! HTTP client for the laptop listings backend.
//!
//! Wraps `reqwest` with the backend's error convention (`{"detail": "..."}`
//! on non-2xx responses) and typed response decoding. Query parameters come
//! pre-encoded from `lapscout_core::filter`; this module only attaches them.

use std::time::Duration;

use lapscout_core::filter::{deals_query, find_query};
use lapscout_core::listing::EstimateRequest;
use lapscout_core::{
    AppConfig, DistinctValues, EstimateResult, FilterState, ListingCounts, RefreshStatus,
    SearchPage, StartRefreshResponse,
};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = lapscout_core::config::DEFAULT_API_BASE_URL;

/// Shape of the backend's error bodies.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Client for the listings backend REST API.
///
/// Use [`ListingApiClient::from_config`] in the binary or
/// [`ListingApiClient::with_base_url`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct ListingApiClient {
    client: Client,
    base_url: Url,
    status_timeout: Duration,
}

impl ListingApiClient {
    /// Creates a client from loaded application config.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`ApiError::InvalidBaseUrl`] for a malformed base URL.
    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        Self::build(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
            Duration::from_secs(config.status_timeout_secs),
            &config.user_agent,
        )
    }

    /// Creates a client with a custom base URL and default timeouts.
    ///
    /// # Errors
    ///
    /// Same as [`ListingApiClient::from_config`].
    pub fn with_base_url(base_url: &str) -> Result<Self, ApiError> {
        Self::build(
            base_url,
            Duration::from_secs(30),
            Duration::from_secs(10),
            "lapscout/0.1 (listing-browser)",
        )
    }

    /// Overrides the timeout applied to refresh status checks.
    #[must_use]
    pub fn with_status_timeout(mut self, timeout: Duration) -> Self {
        self.status_timeout = timeout;
        self
    }

    fn build(
        base_url: &str,
        request_timeout: Duration,
        status_timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Normalise to exactly one trailing slash so relative endpoint paths
        // are joined under the base path instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ApiError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL cannot be used as a base".to_owned(),
            });
        }

        Ok(Self {
            client,
            base_url,
            status_timeout,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Asks the backend to extract specs from a free-text description and
    /// predict a price.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Backend`] with the backend's detail on a non-2xx status.
    /// - [`ApiError::Http`] on network failure.
    /// - [`ApiError::Deserialize`] if the body does not match [`EstimateResult`].
    pub async fn estimate(&self, description: &str) -> Result<EstimateResult, ApiError> {
        let url = self.endpoint("api/laptops/estimate", &[])?;
        let request = self
            .client
            .post(url)
            .json(&EstimateRequest { description });
        Self::send_json(request, "estimate").await
    }

    /// Semantic search. Results carry `match_score`.
    ///
    /// # Errors
    ///
    /// See [`ListingApiClient::estimate`].
    pub async fn search(&self, query: &str, offset: usize) -> Result<SearchPage, ApiError> {
        let url = self.endpoint("api/search/search", &find_query(query, offset))?;
        Self::send_json(self.client.get(url), "search").await
    }

    /// Structured filter search.
    ///
    /// # Errors
    ///
    /// See [`ListingApiClient::estimate`].
    pub async fn filter_search(
        &self,
        filter: &FilterState,
        limit: usize,
        offset: usize,
    ) -> Result<SearchPage, ApiError> {
        let url = self.endpoint("api/filter/search", &filter.to_query(limit, offset))?;
        Self::send_json(self.client.get(url), "filter search").await
    }

    /// One page of candidates for the deals view, unranked.
    ///
    /// # Errors
    ///
    /// See [`ListingApiClient::estimate`].
    pub async fn deals_page(&self, offset: usize) -> Result<SearchPage, ApiError> {
        let url = self.endpoint("api/filter/search", &deals_query(offset))?;
        Self::send_json(self.client.get(url), "deals").await
    }

    /// Distinct values of one listing column, for filter pickers.
    ///
    /// # Errors
    ///
    /// See [`ListingApiClient::estimate`].
    pub async fn distinct_values(&self, column: &str) -> Result<Vec<String>, ApiError> {
        let mut url = self.endpoint("api/filter/distinct/", &[])?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot be used as a base".to_owned(),
            })?
            .pop_if_empty()
            .push(column);
        let body: DistinctValues =
            Self::send_json(self.client.get(url), &format!("distinct({column})")).await?;
        Ok(body.values)
    }

    /// Kicks off a backend refresh job. `pages` is how many listing pages the
    /// scraper should walk. A `started: false` answer is not an error here.
    ///
    /// # Errors
    ///
    /// See [`ListingApiClient::estimate`].
    pub async fn start_refresh(&self, pages: u32) -> Result<StartRefreshResponse, ApiError> {
        let url = self.endpoint("api/refresh/start", &[("pages", pages.to_string())])?;
        Self::send_json(self.client.post(url), "refresh start").await
    }

    /// Current refresh job snapshot. Uses the shorter status timeout; a
    /// timeout surfaces as [`ApiError::Http`] like any other network failure.
    ///
    /// # Errors
    ///
    /// See [`ListingApiClient::estimate`].
    pub async fn refresh_status(&self) -> Result<RefreshStatus, ApiError> {
        let url = self.endpoint("api/refresh/status", &[])?;
        let request = self.client.get(url).timeout(self.status_timeout);
        Self::send_json(request, "refresh status").await
    }

    /// Counts of new, sold and re-priced listings since the last refresh.
    ///
    /// # Errors
    ///
    /// See [`ListingApiClient::estimate`].
    pub async fn refresh_counts(&self) -> Result<ListingCounts, ApiError> {
        let url = self.endpoint("api/refresh/counts", &[])?;
        Self::send_json(self.client.get(url), "refresh counts").await
    }

    /// Joins `path` onto the base URL and appends `query` in order.
    fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| ApiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Sends the request and decodes a 2xx body as `T`.
    ///
    /// Non-2xx bodies are checked for the backend's `detail` field; anything
    /// else becomes [`ApiError::UnknownBackend`].
    async fn send_json<T: DeserializeOwned>(
        request: RequestBuilder,
        context: &str,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), context, "backend returned error status");
            return Err(match serde_json::from_str::<ErrorBody>(&body) {
                Ok(err) => ApiError::Backend {
                    status: status.as_u16(),
                    detail: err.detail,
                },
                Err(_) => ApiError::UnknownBackend {
                    status: status.as_u16(),
                },
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
