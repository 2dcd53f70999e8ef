//! Client-side "best deals" ordering.
//!
//! Ranking only ever sees the page the backend returned, so the order is
//! best-within-page, not best overall. Appended pages are ranked on their
//! own and follow the earlier ones.

use crate::listing::Listing;

/// A listing paired with its `laptop_score / price` ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedDeal {
    pub listing: Listing,
    pub deal_score: f64,
}

/// Drops listings without a positive price and orders the rest by
/// `laptop_score / price`, highest first. Ties keep their backend order.
#[must_use]
pub fn rank_deals(page: Vec<Listing>) -> Vec<RankedDeal> {
    let mut ranked: Vec<RankedDeal> = page
        .into_iter()
        .filter(|l| l.price > 0.0)
        .map(|listing| RankedDeal {
            deal_score: listing.laptop_score / listing.price,
            listing,
        })
        .collect();
    ranked.sort_by(|a, b| b.deal_score.total_cmp(&a.deal_score));
    ranked
}
