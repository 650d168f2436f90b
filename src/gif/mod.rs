//! GIF search providers, response normalization and result merging.
//!
//! Each provider returns its own JSON schema; the clients in [`giphy`] and
//! [`tenor`] normalize everything into [`GifItem`] at the boundary so that
//! provider-native shapes never leak past the adapter.

pub mod giphy;
pub mod tenor;

use serde::{Deserialize, Serialize};

use crate::keys::ApiKeys;

pub use giphy::GiphyClient;
pub use tenor::TenorClient;

/// Which upstream API a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GifSource {
    Giphy,
    Tenor,
}

impl std::fmt::Display for GifSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GifSource::Giphy => write!(f, "Giphy"),
            GifSource::Tenor => write!(f, "Tenor"),
        }
    }
}

/// A single rendition of a GIF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GifImage {
    /// Direct media URL for this rendition
    pub url: String,
}

/// The renditions kept for every result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GifImages {
    /// Fixed-height preview suited for grids
    pub fixed_height: GifImage,
    /// Full-size original
    pub original: GifImage,
}

/// One normalized GIF search result. Immutable once fetched; lives for the
/// duration of a single result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GifItem {
    pub id: String,
    pub title: String,
    pub source: GifSource,
    pub images: GifImages,
    /// Canonical share URL (the original rendition)
    pub url: String,
}

/// Round-robin merge of two ordered result lists.
///
/// For index i, appends `a[i]` then `b[i]` when present, so neither provider
/// dominates the top of the grid. The output has length `a.len() + b.len()`
/// and preserves each input's internal relative order.
pub fn interleave(a: Vec<GifItem>, b: Vec<GifItem>) -> Vec<GifItem> {
    let mut merged = Vec::with_capacity(a.len() + b.len());
    let mut a = a.into_iter();
    let mut b = b.into_iter();
    loop {
        match (a.next(), b.next()) {
            (None, None) => break,
            (x, y) => {
                merged.extend(x);
                merged.extend(y);
            }
        }
    }
    merged
}

/// Queries every provider with a configured key concurrently and interleaves
/// the results.
///
/// Each provider call is independently caught: one provider failing yields an
/// empty list for that provider rather than aborting the whole search. An
/// empty merged result is therefore a "no results" outcome, never an error.
pub async fn search_all(keys: &ApiKeys, keywords: &str, limit: u32) -> Vec<GifItem> {
    let giphy = async {
        if keys.giphy.is_empty() {
            return Vec::new();
        }
        match GiphyClient::new(&keys.giphy).search(keywords, limit).await {
            Ok(items) => items,
            Err(e) => {
                log::warn!("Giphy search failed: {}", e);
                Vec::new()
            }
        }
    };
    let tenor = async {
        if keys.tenor.is_empty() {
            return Vec::new();
        }
        match TenorClient::new(&keys.tenor).search(keywords, limit).await {
            Ok(items) => items,
            Err(e) => {
                log::warn!("Tenor search failed: {}", e);
                Vec::new()
            }
        }
    };

    let (giphy_results, tenor_results) = tokio::join!(giphy, tenor);
    interleave(giphy_results, tenor_results)
}
