//! Query encoding for the three listing surfaces.
//!
//! The encoder never validates: numeric bounds are carried as the raw
//! strings the user typed and the backend decides what they mean. Unset
//! fields are left out of the query entirely rather than sent empty.

use crate::pager::PAGE_SIZE;

/// Ordered query parameters, ready for `Url::query_pairs_mut`.
pub type QueryPairs = Vec<(&'static str, String)>;

/// A boolean constraint that may also be left unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TriState {
    #[default]
    Any,
    Yes,
    No,
}

impl TriState {
    fn as_param(self) -> Option<&'static str> {
        match self {
            TriState::Any => None,
            TriState::Yes => Some("true"),
            TriState::No => Some("false"),
        }
    }
}

impl From<Option<bool>> for TriState {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => TriState::Any,
            Some(true) => TriState::Yes,
            Some(false) => TriState::No,
        }
    }
}

/// Structured search constraints as entered by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub brand: String,
    pub city: String,
    pub cpu_family: String,
    pub gpu_type: String,
    pub is_new: TriState,
    pub is_ssd: TriState,
    pub price_min: String,
    pub price_max: String,
    pub ram_gb_min: String,
    pub ram_gb_max: String,
    pub storage_gb_min: String,
    pub storage_gb_max: String,
    /// Listings priced at zero are usually "price on request"; they are
    /// excluded unless this is set.
    pub include_zero_price: bool,
    pub order_by: Option<String>,
}

impl FilterState {
    /// Encodes the filter for `GET /api/filter/search`.
    ///
    /// `limit` and `offset` always lead. When zero-priced listings are not
    /// included, `price_min=1` is appended after any user-supplied
    /// `price_min`, so both may be present.
    #[must_use]
    pub fn to_query(&self, limit: usize, offset: usize) -> QueryPairs {
        let mut pairs: QueryPairs = vec![
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ];

        let text_fields: [(&'static str, &str); 4] = [
            ("brand", self.brand.as_str()),
            ("city", self.city.as_str()),
            ("cpu_family", self.cpu_family.as_str()),
            ("gpu_type", self.gpu_type.as_str()),
        ];
        push_non_empty(&mut pairs, &text_fields);

        if let Some(v) = self.is_new.as_param() {
            pairs.push(("is_new", v.to_owned()));
        }
        if let Some(v) = self.is_ssd.as_param() {
            pairs.push(("is_ssd", v.to_owned()));
        }

        let range_fields: [(&'static str, &str); 6] = [
            ("price_min", self.price_min.as_str()),
            ("price_max", self.price_max.as_str()),
            ("ram_gb_min", self.ram_gb_min.as_str()),
            ("ram_gb_max", self.ram_gb_max.as_str()),
            ("storage_gb_min", self.storage_gb_min.as_str()),
            ("storage_gb_max", self.storage_gb_max.as_str()),
        ];
        push_non_empty(&mut pairs, &range_fields);

        if !self.include_zero_price {
            pairs.push(("price_min", "1".to_owned()));
        }

        if let Some(order_by) = self.order_by.as_deref().filter(|o| !o.is_empty()) {
            pairs.push(("order_by", order_by.to_owned()));
        }

        pairs
    }
}

fn push_non_empty(pairs: &mut QueryPairs, fields: &[(&'static str, &str)]) {
    for (key, value) in fields {
        if !value.is_empty() {
            pairs.push((*key, (*value).to_owned()));
        }
    }
}

/// Encodes a semantic search for `GET /api/search/search`.
#[must_use]
pub fn find_query(query: &str, offset: usize) -> QueryPairs {
    vec![
        ("q", query.to_owned()),
        ("limit", PAGE_SIZE.to_string()),
        ("offset", offset.to_string()),
    ]
}

/// Encodes the "best deals" request. Zero-priced listings are always excluded
/// and the backend is asked for its own deal ordering.
#[must_use]
pub fn deals_query(offset: usize) -> QueryPairs {
    vec![
        ("limit", PAGE_SIZE.to_string()),
        ("offset", offset.to_string()),
        ("price_min", "1".to_owned()),
        ("order_by", "deal_score".to_owned()),
    ]
}
