//! Offset-based "load more" paging for one result list.
//!
//! Each surface keeps `(results, offset, total)`. A reset fetch replaces the
//! list and starts the offset over; a continue fetch appends the next page.
//! Nothing is cached: a reset always goes back to the network for page one.

/// Page size shared by the find, filter and deals surfaces.
pub const PAGE_SIZE: usize = 10;

/// Whether a fetch starts the list over or extends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    Reset,
    Continue,
}

#[derive(Debug, Clone)]
pub struct Pager<T> {
    results: Vec<T>,
    /// Offset to request on the next continue fetch.
    offset: usize,
    total: u64,
    page_size: usize,
}

impl<T> Default for Pager<T> {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl<T> Pager<T> {
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            results: Vec::new(),
            offset: 0,
            total: 0,
            page_size,
        }
    }

    #[must_use]
    pub fn results(&self) -> &[T] {
        &self.results
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Offset to send for a fetch in the given mode.
    #[must_use]
    pub fn request_offset(&self, mode: FetchMode) -> usize {
        match mode {
            FetchMode::Reset => 0,
            FetchMode::Continue => self.offset,
        }
    }

    /// Applies a fetched page according to `mode`.
    pub fn apply(&mut self, mode: FetchMode, page: Vec<T>, total: u64) {
        match mode {
            FetchMode::Reset => self.apply_reset(page, total),
            FetchMode::Continue => self.apply_continue(page, total),
        }
    }

    /// Replaces the list with page one.
    pub fn apply_reset(&mut self, page: Vec<T>, total: u64) {
        self.results = page;
        self.offset = self.page_size;
        self.total = total;
    }

    /// Appends the next page. The offset advances by a full page even when
    /// the backend returned fewer rows (e.g. deals after zero-price rows
    /// were dropped), so the next request never overlaps this one.
    pub fn apply_continue(&mut self, page: Vec<T>, total: u64) {
        self.results.extend(page);
        self.offset += self.page_size;
        self.total = total;
    }

    /// True exactly when `0 < results.len() < total`.
    #[must_use]
    pub fn can_load_more(&self) -> bool {
        let shown = self.results.len() as u64;
        shown > 0 && shown < self.total
    }

    /// Drops the current results; offset and total are left as they were.
    pub fn clear(&mut self) {
        self.results.clear();
    }
}
