use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::errors::ProviderError;
use crate::providers::{ImageProvider, USER_AGENT};

/// Number of search hits inspected for a usable bitmap
const SEARCH_LIMIT: u32 = 5;

/// Largest image body accepted from a download
pub const MAX_DOWNLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Image search against the Wikimedia Commons (MediaWiki) API
#[derive(Debug)]
pub struct WikimediaImages {
    /// HTTP client for search and download requests
    client: Client,
    /// `api.php` endpoint
    endpoint: String,
    /// Requested thumbnail width, 0 for the original file
    thumbnail_width: u32,
}

/// Search response, `formatversion=2` layout
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub query: Option<QueryResult>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub pages: Vec<FilePage>,
}

/// One file page returned by the search generator
#[derive(Debug, Deserialize)]
pub struct FilePage {
    /// Rank within the search results
    #[serde(default)]
    pub index: u32,
    pub title: String,
    #[serde(default)]
    pub imageinfo: Vec<ImageInfo>,
}

#[derive(Debug, Deserialize)]
pub struct ImageInfo {
    /// Original file URL
    pub url: String,
    /// Scaled rendition URL, present when `iiurlwidth` was requested
    #[serde(default)]
    pub thumburl: Option<String>,
    #[serde(default)]
    pub mime: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    #[serde(default)]
    pub info: String,
}

/// The search hit selected for download
#[derive(Debug, Clone, PartialEq)]
pub struct ImageHit {
    pub title: String,
    pub download_url: String,
}

const BITMAP_MIMES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp", "image/bmp", "image/tiff"];

impl WikimediaImages {
    /// Create a new client
    pub fn new(endpoint: impl Into<String>, thumbnail_width: u32, timeout: Option<Duration>) -> Self {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Self {
            client: builder.build().unwrap_or_default(),
            endpoint: endpoint.into(),
            thumbnail_width,
        }
    }

    /// Build the search URL for a query
    pub fn search_url(&self, query: &str) -> Result<Url, ProviderError> {
        let limit = SEARCH_LIMIT.to_string();
        let width = self.thumbnail_width.to_string();
        let mut params = vec![
            ("action", "query"),
            ("format", "json"),
            ("formatversion", "2"),
            ("generator", "search"),
            ("gsrsearch", query),
            ("gsrnamespace", "6"),
            ("gsrlimit", limit.as_str()),
            ("prop", "imageinfo"),
            ("iiprop", "url|mime"),
        ];
        if self.thumbnail_width > 0 {
            params.push(("iiurlwidth", width.as_str()));
        }

        Url::parse_with_params(&self.endpoint, &params)
            .map_err(|e| ProviderError::RequestFailed(format!("invalid endpoint {}: {}", self.endpoint, e)))
    }

    async fn download(&self, url: &str) -> Result<Bytes, ProviderError> {
        let mut response = self.client.get(url)
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: format!("download of {} failed", url),
            });
        }

        if let Some(length) = response.content_length() {
            if length > MAX_DOWNLOAD_BYTES as u64 {
                return Err(too_large(url, MAX_DOWNLOAD_BYTES));
            }
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(ProviderError::from_transport)? {
            append_capped(&mut body, &chunk, MAX_DOWNLOAD_BYTES, url)?;
        }
        if body.is_empty() {
            return Err(ProviderError::ParseError(format!("empty download from {}", url)));
        }
        Ok(body.freeze())
    }
}

fn too_large(url: &str, limit: usize) -> ProviderError {
    ProviderError::RequestFailed(format!("download from {} exceeds {} bytes", url, limit))
}

/// Append a received chunk, failing once the body would pass `limit` bytes
pub fn append_capped(body: &mut BytesMut, chunk: &[u8], limit: usize, url: &str) -> Result<(), ProviderError> {
    if body.len() + chunk.len() > limit {
        return Err(too_large(url, limit));
    }
    body.extend_from_slice(chunk);
    Ok(())
}

/// Pick the best ranked bitmap (or bitmap rendition) from a search response
pub fn select_image(body: &str) -> Result<Option<ImageHit>, ProviderError> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::ParseError(e.to_string()))?;

    if let Some(error) = response.error {
        return Err(ProviderError::RequestFailed(format!("{}: {}", error.code, error.info)));
    }

    let mut pages = match response.query {
        Some(query) => query.pages,
        None => return Ok(None),
    };
    pages.sort_by_key(|p| p.index);

    let hit = pages.into_iter().find_map(|page| {
        let info = page.imageinfo.into_iter().next()?;
        let download_url = match info.thumburl {
            // Scaled renditions of SVG/PDF/TIFF are served as JPEG or PNG
            Some(thumb) => thumb,
            None if BITMAP_MIMES.contains(&info.mime.as_str()) => info.url,
            None => return None,
        };
        Some(ImageHit { title: page.title, download_url })
    });

    Ok(hit)
}

/// File name for a downloaded URL, restricted to a portable character set
pub fn file_name_for(download_url: &str) -> String {
    let last = Url::parse(download_url)
        .ok()
        .and_then(|u| u.path_segments().and_then(|mut s| s.next_back().map(str::to_string)))
        .unwrap_or_default();

    let cleaned: String = last
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();

    if cleaned.trim_matches(|c| c == '.' || c == '_').is_empty() {
        "download.img".to_string()
    } else {
        cleaned
    }
}

#[async_trait]
impl ImageProvider for WikimediaImages {
    async fn search_and_fetch_one(&self, query: &str, workspace: &Path) -> Result<bool, ProviderError> {
        let url = self.search_url(query)?;

        let response = self.client.get(url)
            .send()
            .await
            .map_err(ProviderError::from_transport)?;
        let status = response.status();
        let body = response.text().await.map_err(ProviderError::from_transport)?;
        if !status.is_success() {
            return Err(ProviderError::ApiError { status_code: status.as_u16(), message: body });
        }

        let hit = match select_image(&body)? {
            Some(hit) => hit,
            None => return Ok(false),
        };
        debug!("Wikimedia: '{}' -> {}", query, hit.title);

        let data = self.download(&hit.download_url).await?;
        let target = workspace.join(file_name_for(&hit.download_url));
        tokio::fs::write(&target, &data).await?;

        Ok(true)
    }
}
