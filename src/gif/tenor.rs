//! Tenor v2 API client (search).
//!
//! Tenor's schema differs from Giphy's in every field name; normalization to
//! [`GifItem`] happens here so callers only ever see the internal shape.

use reqwest::Client;
use serde::Deserialize;

use super::{GifImage, GifImages, GifItem, GifSource};
use crate::error::HeyMemeError;

const BASE_URL: &str = "https://tenor.googleapis.com/v2";

/// Client for the Tenor v2 API, authenticated via a key query parameter.
pub struct TenorClient {
    /// API key for authentication
    pub api_key: String,
    /// HTTP client for making API requests
    client: Client,
}

/// Envelope for Tenor search responses
#[derive(Deserialize)]
struct TenorSearchResponse {
    #[serde(default)]
    results: Vec<TenorGif>,
}

/// A single GIF entry in Tenor's schema
#[derive(Deserialize)]
struct TenorGif {
    id: String,
    #[serde(default)]
    content_description: String,
    media_formats: TenorMediaFormats,
}

/// The media formats we keep: tinygif as the grid preview, gif as the original
#[derive(Deserialize)]
struct TenorMediaFormats {
    tinygif: TenorMedia,
    gif: TenorMedia,
}

#[derive(Deserialize)]
struct TenorMedia {
    url: String,
}

impl TenorGif {
    /// Normalizes the provider shape into the internal [`GifItem`].
    fn into_item(self) -> GifItem {
        let original_url = self.media_formats.gif.url;
        GifItem {
            id: self.id,
            title: self.content_description,
            source: GifSource::Tenor,
            images: GifImages {
                fixed_height: GifImage {
                    url: self.media_formats.tinygif.url,
                },
                original: GifImage {
                    url: original_url.clone(),
                },
            },
            url: original_url,
        }
    }
}

impl TenorClient {
    /// Creates a new Tenor client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
        }
    }

    /// Searches Tenor for GIFs matching the keywords.
    pub async fn search(&self, keywords: &str, limit: u32) -> Result<Vec<GifItem>, HeyMemeError> {
        if self.api_key.is_empty() {
            return Err(HeyMemeError::AuthError("Missing Tenor API key".to_string()));
        }

        let resp = self
            .client
            .get(format!("{}/search", BASE_URL))
            .query(&[
                ("q", keywords),
                ("key", self.api_key.as_str()),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: TenorSearchResponse = resp.json().await?;
        log::debug!("Tenor search returned {} results", body.results.len());
        Ok(body.results.into_iter().map(TenorGif::into_item).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "results": [
            {
                "id": "16989471141791455574",
                "content_description": "a dog typing on a laptop",
                "media_formats": {
                    "tinygif": {"url": "https://media.tenor.com/x/tinygif.gif"},
                    "gif": {"url": "https://media.tenor.com/x/gif.gif"}
                }
            }
        ],
        "next": "CAgQ"
    }"#;

    #[test]
    fn normalizes_search_response() {
        let body: TenorSearchResponse = serde_json::from_str(SAMPLE).unwrap();
        let items: Vec<GifItem> = body.results.into_iter().map(TenorGif::into_item).collect();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "16989471141791455574");
        assert_eq!(items[0].title, "a dog typing on a laptop");
        assert_eq!(items[0].source, GifSource::Tenor);
        assert_eq!(
            items[0].images.fixed_height.url,
            "https://media.tenor.com/x/tinygif.gif"
        );
        assert_eq!(items[0].url, "https://media.tenor.com/x/gif.gif");
    }

    #[test]
    fn missing_results_field_is_empty() {
        let body: TenorSearchResponse = serde_json::from_str(r#"{"next": ""}"#).unwrap();
        assert!(body.results.is_empty());
    }
}
