/*!
 * Provider adapters for the external services.
 *
 * This module contains the boundary wrappers around the two external calls the
 * pipeline makes:
 * - `TranslationProvider`: translate one text into one target language
 * - `ImageProvider`: search for an image and download at most one result
 *
 * Implementations:
 * - `libretranslate`: LibreTranslate-compatible HTTP API
 * - `wikimedia`: Wikimedia Commons search API
 * - `mock`: scripted providers for tests and benchmarks
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

use crate::errors::ProviderError;

/// User agent sent by the HTTP adapters
pub const USER_AGENT: &str = concat!("polytable/", env!("CARGO_PKG_VERSION"));

/// Translation service boundary
///
/// Implementations hold no per-call state; the fan-out controller may call
/// them concurrently from many tasks.
#[async_trait]
pub trait TranslationProvider: Send + Sync + Debug {
    /// Translate `text` into `target_language`
    ///
    /// # Arguments
    /// * `text` - The source text
    /// * `target_language` - Provider identifier of the target language
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The translated text or an error
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ProviderError>;
}

/// Image search service boundary
#[async_trait]
pub trait ImageProvider: Send + Sync + Debug {
    /// Search for `query` and download the first hit into `workspace`
    ///
    /// Writes at most one file into `workspace`.
    ///
    /// # Returns
    /// * `Ok(true)` - One file was written
    /// * `Ok(false)` - Nothing matched the query, nothing was written
    async fn search_and_fetch_one(&self, query: &str, workspace: &Path) -> Result<bool, ProviderError>;
}

/// Run a provider call under an optional timeout
pub async fn with_timeout<T, F>(timeout: Option<Duration>, call: F) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| ProviderError::Timeout(limit))?,
        None => call.await,
    }
}

pub mod libretranslate;
pub mod wikimedia;
pub mod mock;
