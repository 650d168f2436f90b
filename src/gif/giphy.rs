//! Giphy API client (search, trending, random).
//!
//! Covers the three endpoints the app uses: keyword search for the result
//! grid, trending for the idle grid, and tag-scoped random for chat meme
//! directives. Randomness is the provider's own; no client-side selection.

use reqwest::Client;
use serde::Deserialize;

use super::{GifImage, GifImages, GifItem, GifSource};
use crate::error::HeyMemeError;

const BASE_URL: &str = "https://api.giphy.com/v1/gifs";

/// Client for the Giphy API, authenticated via a key query parameter.
pub struct GiphyClient {
    /// API key for authentication
    pub api_key: String,
    /// HTTP client for making API requests
    client: Client,
}

/// Envelope for list-shaped Giphy responses
#[derive(Deserialize)]
struct GiphyListResponse {
    /// The result entries
    #[serde(default)]
    data: Vec<GiphyGif>,
}

/// Envelope for the random endpoint, which returns a single object
#[derive(Deserialize)]
struct GiphyRandomResponse {
    data: Option<GiphyGif>,
}

/// A single GIF entry in Giphy's schema
#[derive(Deserialize)]
struct GiphyGif {
    id: String,
    #[serde(default)]
    title: Option<String>,
    images: GiphyRenditions,
}

/// The renditions we keep from Giphy's (much larger) rendition map
#[derive(Deserialize)]
struct GiphyRenditions {
    fixed_height: GiphyRendition,
    original: GiphyRendition,
}

#[derive(Deserialize)]
struct GiphyRendition {
    url: String,
}

impl GiphyGif {
    /// Normalizes the provider shape into the internal [`GifItem`].
    fn into_item(self) -> GifItem {
        let original_url = self.images.original.url;
        GifItem {
            id: self.id,
            title: self
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Untitled GIF".to_string()),
            source: GifSource::Giphy,
            images: GifImages {
                fixed_height: GifImage {
                    url: self.images.fixed_height.url,
                },
                original: GifImage {
                    url: original_url.clone(),
                },
            },
            url: original_url,
        }
    }
}

impl GiphyClient {
    /// Creates a new Giphy client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
        }
    }

    /// Searches Giphy for GIFs matching the keywords.
    pub async fn search(&self, keywords: &str, limit: u32) -> Result<Vec<GifItem>, HeyMemeError> {
        if self.api_key.is_empty() {
            return Err(HeyMemeError::AuthError("Missing Giphy API key".to_string()));
        }

        let resp = self
            .client
            .get(format!("{}/search", BASE_URL))
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("q", keywords),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: GiphyListResponse = resp.json().await?;
        log::debug!("Giphy search returned {} results", body.data.len());
        Ok(body.data.into_iter().map(GiphyGif::into_item).collect())
    }

    /// Fetches the current trending GIFs, G-rated.
    pub async fn trending(&self, limit: u32) -> Result<Vec<GifItem>, HeyMemeError> {
        if self.api_key.is_empty() {
            return Err(HeyMemeError::AuthError("Missing Giphy API key".to_string()));
        }

        let resp = self
            .client
            .get(format!("{}/trending", BASE_URL))
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("limit", &limit.to_string()),
                ("rating", "g"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: GiphyListResponse = resp.json().await?;
        Ok(body.data.into_iter().map(GiphyGif::into_item).collect())
    }

    /// Fetches one random GIF scoped by a tag, returning its fixed-height URL.
    ///
    /// Used to attach an image to a chat message after a meme directive was
    /// extracted from the model's reply.
    pub async fn random(&self, tag: &str) -> Result<String, HeyMemeError> {
        if self.api_key.is_empty() {
            return Err(HeyMemeError::AuthError("Missing Giphy API key".to_string()));
        }

        let resp = self
            .client
            .get(format!("{}/random", BASE_URL))
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("tag", tag),
                ("rating", "g"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: GiphyRandomResponse = resp.json().await?;
        body.data
            .map(|gif| gif.images.fixed_height.url)
            .ok_or_else(|| {
                HeyMemeError::ProviderError(format!("No random GIF for tag '{}'", tag))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "data": [
            {
                "id": "xT9IgG50Fb7Mi0prBC",
                "title": "Excited Dance GIF",
                "images": {
                    "fixed_height": {"url": "https://media.giphy.com/media/xT9/200.gif"},
                    "original": {"url": "https://media.giphy.com/media/xT9/giphy.gif"}
                }
            },
            {
                "id": "l0MYt5jPR6QX5pnqM",
                "title": "",
                "images": {
                    "fixed_height": {"url": "https://media.giphy.com/media/l0M/200.gif"},
                    "original": {"url": "https://media.giphy.com/media/l0M/giphy.gif"}
                }
            }
        ],
        "meta": {"status": 200, "msg": "OK"}
    }"#;

    #[test]
    fn normalizes_search_response() {
        let body: GiphyListResponse = serde_json::from_str(SAMPLE).unwrap();
        let items: Vec<GifItem> = body.data.into_iter().map(GiphyGif::into_item).collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "xT9IgG50Fb7Mi0prBC");
        assert_eq!(items[0].title, "Excited Dance GIF");
        assert_eq!(items[0].source, GifSource::Giphy);
        assert_eq!(items[0].url, "https://media.giphy.com/media/xT9/giphy.gif");
        assert_eq!(
            items[0].images.fixed_height.url,
            "https://media.giphy.com/media/xT9/200.gif"
        );
        // Empty titles get a placeholder
        assert_eq!(items[1].title, "Untitled GIF");
    }

    #[test]
    fn random_response_extracts_fixed_height() {
        let body: GiphyRandomResponse = serde_json::from_str(
            r#"{"data": {"id": "abc", "images": {
                "fixed_height": {"url": "https://media.giphy.com/media/abc/200.gif"},
                "original": {"url": "https://media.giphy.com/media/abc/giphy.gif"}
            }}}"#,
        )
        .unwrap();
        let url = body.data.map(|g| g.images.fixed_height.url).unwrap();
        assert_eq!(url, "https://media.giphy.com/media/abc/200.gif");
    }

    #[test]
    fn empty_data_is_no_results() {
        let body: GiphyListResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(body.data.is_empty());
    }
}
