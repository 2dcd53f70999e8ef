//! Decoded backend payloads.
//!
//! ## Observed shape of listing records
//!
//! The backend serialises rows straight from its listings table, so any
//! column may come back `null` for listings the parser could not fully
//! classify (e.g. `gpu: null` for integrated graphics, `city: null` for
//! listings without a location). Every field therefore decodes `null` or a
//! missing key to its default instead of failing the whole page.
//!
//! `match_score` is only present on `/api/search/search` results.
//! `last_price` is the price before the most recent drop, `null` when the
//! price never changed.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Treats JSON `null` the same as a missing key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One scraped marketplace entry for a laptop.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Listing {
    pub id: Option<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub brand: String,
    #[serde(deserialize_with = "null_as_default")]
    pub model: String,
    #[serde(deserialize_with = "null_as_default")]
    pub cpu: String,
    #[serde(deserialize_with = "null_as_default")]
    pub gpu: String,
    /// Display string as written by the seller, e.g. `"16 Go"`.
    #[serde(deserialize_with = "null_as_default")]
    pub ram: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ram_gb: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub storage: String,
    #[serde(deserialize_with = "null_as_default")]
    pub storage_gb: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub screen_size: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub refresh_rate: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub price: f64,
    pub last_price: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(deserialize_with = "null_as_default")]
    pub link: String,
    #[serde(deserialize_with = "null_as_default")]
    pub is_new: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub is_sold: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub is_new_listing: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub laptop_score: f64,
    pub match_score: Option<f64>,
}

impl Listing {
    /// Percentage drop from `last_price` to `price`, rounded to the nearest
    /// whole percent. `None` unless `last_price > price`.
    #[must_use]
    pub fn price_drop_percent(&self) -> Option<u32> {
        let last = self.last_price?;
        if last <= self.price || last <= 0.0 {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let pct = ((last - self.price) / last * 100.0).round() as u32;
        Some(pct)
    }

    /// Brand with only its first character upper-cased (`"ASUS"` → `"Asus"`).
    /// Listings without a brand show as `"Unknown"`.
    #[must_use]
    pub fn display_brand(&self) -> String {
        let lower = self.brand.trim().to_lowercase();
        let mut chars = lower.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => "Unknown".to_owned(),
        }
    }
}

/// One page of results from either search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchPage {
    #[serde(deserialize_with = "null_as_default")]
    pub results: Vec<Listing>,
    #[serde(deserialize_with = "null_as_default")]
    pub total: u64,
}

/// Response from `GET /api/filter/distinct/{column}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DistinctValues {
    #[serde(deserialize_with = "null_as_default")]
    pub values: Vec<String>,
}

/// Response from `GET /api/refresh/counts`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListingCounts {
    #[serde(deserialize_with = "null_as_default")]
    pub new_listings: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub sold_listings: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub price_changed: u64,
}

/// Response from `POST /api/refresh/start`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StartRefreshResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub started: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
}

/// Request body for `POST /api/laptops/estimate`.
#[derive(Debug, Serialize)]
pub struct EstimateRequest<'a> {
    pub description: &'a str,
}

/// A single extracted spec value. The backend mixes strings, numbers and
/// booleans in the same map.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SpecValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Null,
}

impl std::fmt::Display for SpecValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpecValue::Bool(true) => write!(f, "Yes"),
            SpecValue::Bool(false) => write!(f, "No"),
            SpecValue::Number(n) => write!(f, "{n}"),
            SpecValue::Text(s) if !s.is_empty() => write!(f, "{s}"),
            SpecValue::Text(_) | SpecValue::Null => write!(f, "\u{2014}"),
        }
    }
}

/// Response from `POST /api/laptops/estimate`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EstimateResult {
    #[serde(deserialize_with = "null_as_default")]
    pub specs: BTreeMap<String, SpecValue>,
    /// Component scores on a 0–1000 scale, keyed like `"cpu_score"`.
    #[serde(deserialize_with = "null_as_default")]
    pub scores: BTreeMap<String, f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub predicted_price: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub confidence: String,
    #[serde(deserialize_with = "null_as_default")]
    pub features_found: u32,
}

impl EstimateResult {
    /// Scores as `(component, out_of_ten)`, with the `_score` suffix dropped.
    #[must_use]
    pub fn score_rows(&self) -> Vec<(String, f64)> {
        self.scores
            .iter()
            .map(|(key, score)| (key.replace("_score", ""), score / 100.0))
            .collect()
    }
}

/// Human label for a spec key returned by the estimator.
#[must_use]
pub fn spec_label(key: &str) -> &str {
    match key {
        "brand" => "Brand",
        "model" => "Model",
        "cpu" => "Processor",
        "cpu_family" => "CPU Family",
        "ram_gb" => "RAM",
        "storage_gb" => "Storage",
        "is_ssd" => "SSD",
        "gpu" => "Graphics",
        "gpu_vram" => "VRAM",
        "screen_size" => "Screen",
        "refresh_rate" => "Refresh Rate",
        "is_new" => "Condition",
        "is_touchscreen" => "Touchscreen",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(price: f64, last_price: Option<f64>) -> Listing {
        Listing {
            price,
            last_price,
            ..Listing::default()
        }
    }

    #[test]
    fn price_drop_rounds_to_whole_percent() {
        assert_eq!(listing(4000.0, Some(5000.0)).price_drop_percent(), Some(20));
        assert_eq!(listing(2990.0, Some(3500.0)).price_drop_percent(), Some(15));
    }

    #[test]
    fn no_price_drop_when_price_rose_or_unchanged() {
        assert_eq!(listing(5000.0, Some(4000.0)).price_drop_percent(), None);
        assert_eq!(listing(5000.0, Some(5000.0)).price_drop_percent(), None);
        assert_eq!(listing(5000.0, None).price_drop_percent(), None);
    }

    #[test]
    fn display_brand_capitalises_first_letter_only() {
        let asus = Listing {
            brand: "ASUS ROG".to_owned(),
            ..Listing::default()
        };
        assert_eq!(asus.display_brand(), "Asus rog");
        assert_eq!(Listing::default().display_brand(), "Unknown");
    }

    #[test]
    fn listing_decodes_nulls_and_missing_fields() {
        let json = serde_json::json!({
            "brand": "hp",
            "gpu": null,
            "price": 4500,
            "last_price": null,
            "laptop_score": 612.5
        });
        let l: Listing = serde_json::from_value(json).expect("listing should decode");
        assert_eq!(l.brand, "hp");
        assert_eq!(l.gpu, "");
        assert!((l.price - 4500.0).abs() < f64::EPSILON);
        assert!(l.last_price.is_none());
        assert!(l.match_score.is_none());
        assert!(!l.is_sold);
    }

    #[test]
    fn search_page_tolerates_missing_results() {
        let page: SearchPage = serde_json::from_str(r#"{"total": 3}"#).unwrap();
        assert!(page.results.is_empty());
        assert_eq!(page.total, 3);
        let page: SearchPage = serde_json::from_str(r#"{"results": null}"#).unwrap();
        assert_eq!(page.total, 0);
    }

    #[test]
    fn estimate_specs_accept_mixed_value_types() {
        let json = serde_json::json!({
            "specs": {"brand": "dell", "ram_gb": 16, "is_ssd": true, "gpu": null},
            "scores": {"cpu_score": 750.0, "gpu_score": 420.0},
            "predicted_price": 6200.0,
            "confidence": "high",
            "features_found": 7
        });
        let est: EstimateResult = serde_json::from_value(json).unwrap();
        assert_eq!(est.specs["brand"].to_string(), "dell");
        assert_eq!(est.specs["ram_gb"].to_string(), "16");
        assert_eq!(est.specs["is_ssd"].to_string(), "Yes");
        assert_eq!(est.specs["gpu"].to_string(), "\u{2014}");
        assert_eq!(
            est.score_rows(),
            vec![("cpu".to_owned(), 7.5), ("gpu".to_owned(), 4.2)]
        );
    }

    #[test]
    fn estimate_with_null_maps_decodes_empty() {
        let json = serde_json::json!({
            "specs": null,
            "scores": null,
            "predicted_price": null,
            "confidence": "low"
        });
        let est: EstimateResult = serde_json::from_value(json).unwrap();
        assert!(est.specs.is_empty());
        assert!(est.score_rows().is_empty());
        assert!(est.predicted_price.abs() < f64::EPSILON);
    }

    #[test]
    fn spec_label_falls_back_to_key() {
        assert_eq!(spec_label("cpu"), "Processor");
        assert_eq!(spec_label("battery_wh"), "battery_wh");
    }
}
