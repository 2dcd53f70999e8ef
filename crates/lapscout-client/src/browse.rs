//! The three paginated listing surfaces plus the one-shot lookups.
//!
//! Requests are neither deduplicated nor sequence-numbered. Two overlapping
//! calls on the same surface apply in the order their responses arrive; with
//! `&mut self` on every fetch this can only happen across separate
//! `Browser` instances sharing a backend.

use std::collections::BTreeMap;

use lapscout_core::{
    rank_deals, EstimateResult, FetchMode, FilterState, Listing, ListingCounts, Pager, RankedDeal,
    PAGE_SIZE,
};

use crate::client::ListingApiClient;
use crate::error::ApiError;

/// Columns offered as pick lists in the filter form.
pub const DISTINCT_COLUMNS: [&str; 4] = ["brand", "city", "cpu_family", "gpu_type"];

pub struct Browser {
    client: ListingApiClient,
    filter: FilterState,
    find: Pager<Listing>,
    filtered: Pager<Listing>,
    deals: Pager<RankedDeal>,
}

impl Browser {
    #[must_use]
    pub fn new(client: ListingApiClient) -> Self {
        Self {
            client,
            filter: FilterState::default(),
            find: Pager::new(PAGE_SIZE),
            filtered: Pager::new(PAGE_SIZE),
            deals: Pager::new(PAGE_SIZE),
        }
    }

    #[must_use]
    pub fn client(&self) -> &ListingApiClient {
        &self.client
    }

    #[must_use]
    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: FilterState) {
        self.filter = filter;
    }

    #[must_use]
    pub fn find_results(&self) -> &Pager<Listing> {
        &self.find
    }

    #[must_use]
    pub fn filter_results(&self) -> &Pager<Listing> {
        &self.filtered
    }

    #[must_use]
    pub fn deal_results(&self) -> &Pager<RankedDeal> {
        &self.deals
    }

    /// Semantic search. A blank query does nothing.
    ///
    /// A reset clears the current results before the request goes out, so a
    /// failed reset leaves the list empty. When the backend omits `total`,
    /// the page length stands in for it.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from the search request.
    pub async fn find(&mut self, query: &str, mode: FetchMode) -> Result<(), ApiError> {
        if query.trim().is_empty() {
            return Ok(());
        }
        if mode == FetchMode::Reset {
            self.find.clear();
        }

        let offset = self.find.request_offset(mode);
        let page = self.client.search(query, offset).await?;
        let total = if page.total > 0 {
            page.total
        } else {
            page.results.len() as u64
        };
        tracing::debug!(query, offset, total, "find page");
        self.find.apply(mode, page.results, total);
        Ok(())
    }

    /// Structured search with the current filter state. On failure the
    /// previous results stay in place.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from the filter request.
    pub async fn apply_filters(&mut self, mode: FetchMode) -> Result<(), ApiError> {
        let offset = self.filtered.request_offset(mode);
        let page = self
            .client
            .filter_search(&self.filter, self.filtered.page_size(), offset)
            .await?;
        tracing::debug!(offset, total = page.total, "filter page");
        self.filtered.apply(mode, page.results, page.total);
        Ok(())
    }

    /// Best deals: one backend page, re-ranked locally by score per price.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from the deals request.
    pub async fn deals(&mut self, mode: FetchMode) -> Result<(), ApiError> {
        let offset = self.deals.request_offset(mode);
        let page = self.client.deals_page(offset).await?;
        let total = page.total;
        let ranked = rank_deals(page.results);
        tracing::debug!(offset, total, kept = ranked.len(), "deals page");
        self.deals.apply(mode, ranked, total);
        Ok(())
    }

    /// Fetches pick-list values for every filter column, one after another.
    /// A column whose request fails gets an empty list.
    pub async fn load_distinct_values(&self) -> BTreeMap<&'static str, Vec<String>> {
        let mut values = BTreeMap::new();
        for column in DISTINCT_COLUMNS {
            let column_values = match self.client.distinct_values(column).await {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(column, error = %e, "failed to load distinct values");
                    Vec::new()
                }
            };
            values.insert(column, column_values);
        }
        values
    }

    /// Price estimate for a free-text description. A blank description
    /// returns `Ok(None)` without calling the backend.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from the estimate request.
    pub async fn estimate(&self, description: &str) -> Result<Option<EstimateResult>, ApiError> {
        if description.trim().is_empty() {
            return Ok(None);
        }
        self.client.estimate(description).await.map(Some)
    }

    /// Reloads what a finished refresh invalidates: the listing counts and
    /// the first page of deals. Failures are logged, not returned.
    pub async fn after_refresh(&mut self) -> Option<ListingCounts> {
        let counts = match self.client.refresh_counts().await {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::warn!(error = %e, "failed to reload listing counts");
                None
            }
        };
        if let Err(e) = self.deals(FetchMode::Reset).await {
            tracing::warn!(error = %e, "failed to reload deals after refresh");
        }
        counts
    }
}
