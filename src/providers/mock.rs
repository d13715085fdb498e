/*!
 * Mock provider implementations for testing.
 *
 * This module provides scripted providers that record every call:
 * - `MockTranslator::working()` - Always succeeds with a tagged translation
 * - `MockTranslator::failing()` - Always fails with an error
 * - `MockImageProvider` - Writes a valid, corrupt or no image, or fails
 */

use async_trait::async_trait;
use image::{ImageBuffer, ImageFormat, Rgb};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{ImageProvider, TranslationProvider};

/// Behavior mode for the mock translator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a proper translation
    Working,
    /// Always fails with an error
    Failing,
}

/// Mock translator for testing the fan-out controller
#[derive(Debug, Clone)]
pub struct MockTranslator {
    /// Behavior mode
    behavior: MockBehavior,
    /// Fixed answers keyed by (text, target)
    dictionary: Arc<HashMap<(String, String), String>>,
    /// (text, target) pairs that always fail
    failures: Arc<HashSet<(String, String)>>,
    /// Simulated latency per call
    delay: Option<Duration>,
    /// Every (text, target) received, in arrival order
    calls: Arc<Mutex<Vec<(String, String)>>>,
    /// Calls currently in flight
    in_flight: Arc<AtomicUsize>,
    /// Highest number of concurrent calls observed
    peak_in_flight: Arc<AtomicUsize>,
}

impl MockTranslator {
    /// Create a new mock translator with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            dictionary: Arc::new(HashMap::new()),
            failures: Arc::new(HashSet::new()),
            delay: None,
            calls: Arc::new(Mutex::new(Vec::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a working mock translator that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing mock translator that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Answer `text` in `target` with `translation`
    pub fn with_translation(mut self, text: &str, target: &str, translation: &str) -> Self {
        Arc::make_mut(&mut self.dictionary)
            .insert((text.to_string(), target.to_string()), translation.to_string());
        self
    }

    /// Make every call for `text` in `target` fail
    pub fn fail_on(mut self, text: &str, target: &str) -> Self {
        Arc::make_mut(&mut self.failures).insert((text.to_string(), target.to_string()));
        self
    }

    /// Delay every call, so concurrent calls overlap
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// All calls made so far
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }

    /// Highest number of calls that were in flight at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Default answer for a working translator
    pub fn tagged(text: &str, target: &str) -> String {
        format!("[{}] {}", target, text)
    }
}

#[async_trait]
impl TranslationProvider for MockTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ProviderError> {
        let key = (text.to_string(), target_language.to_string());
        self.calls.lock().push(key.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let result = if self.behavior == MockBehavior::Failing || self.failures.contains(&key) {
            Err(ProviderError::ApiError {
                status_code: 500,
                message: format!("Simulated failure for '{}' -> {}", text, target_language),
            })
        } else if let Some(answer) = self.dictionary.get(&key) {
            Ok(answer.clone())
        } else {
            Ok(Self::tagged(text, target_language))
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// What the mock image provider does on each call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockImageBehavior {
    /// Writes a small valid JPEG
    Jpeg,
    /// Writes a small valid PNG
    Png,
    /// Writes bytes that do not decode as an image
    Corrupt,
    /// Finds nothing
    NotFound,
    /// Fails before writing anything
    Failing,
    /// Writes a file, then fails
    FailAfterWrite,
}

/// Mock image search provider
#[derive(Debug, Clone)]
pub struct MockImageProvider {
    /// Default behavior
    behavior: MockImageBehavior,
    /// Per-query overrides
    overrides: Arc<HashMap<String, MockImageBehavior>>,
    /// Every query received
    queries: Arc<Mutex<Vec<String>>>,
    /// Workspace directory of every call
    workspaces: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockImageProvider {
    pub fn new(behavior: MockImageBehavior) -> Self {
        Self {
            behavior,
            overrides: Arc::new(HashMap::new()),
            queries: Arc::new(Mutex::new(Vec::new())),
            workspaces: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A provider that finds a JPEG for every query
    pub fn found() -> Self {
        Self::new(MockImageBehavior::Jpeg)
    }

    /// A provider that never finds anything
    pub fn not_found() -> Self {
        Self::new(MockImageBehavior::NotFound)
    }

    /// A provider whose every call errors
    pub fn failing() -> Self {
        Self::new(MockImageBehavior::Failing)
    }

    /// Use `behavior` for `query` only
    pub fn with_query(mut self, query: &str, behavior: MockImageBehavior) -> Self {
        Arc::make_mut(&mut self.overrides).insert(query.to_string(), behavior);
        self
    }

    pub fn call_count(&self) -> usize {
        self.queries.lock().len()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }

    pub fn workspaces(&self) -> Vec<PathBuf> {
        self.workspaces.lock().clone()
    }
}

#[async_trait]
impl ImageProvider for MockImageProvider {
    async fn search_and_fetch_one(&self, query: &str, workspace: &Path) -> Result<bool, ProviderError> {
        self.queries.lock().push(query.to_string());
        self.workspaces.lock().push(workspace.to_path_buf());

        let behavior = self.overrides.get(query).copied().unwrap_or(self.behavior);
        match behavior {
            MockImageBehavior::Jpeg => {
                write_sample_image(&workspace.join("000001.jpg"), ImageFormat::Jpeg)?;
                Ok(true)
            }
            MockImageBehavior::Png => {
                write_sample_image(&workspace.join("000001.png"), ImageFormat::Png)?;
                Ok(true)
            }
            MockImageBehavior::Corrupt => {
                std::fs::write(workspace.join("000001.jpg"), b"definitely not an image")?;
                Ok(true)
            }
            MockImageBehavior::NotFound => Ok(false),
            MockImageBehavior::Failing => Err(ProviderError::ConnectionError(
                format!("Simulated search failure for '{}'", query),
            )),
            MockImageBehavior::FailAfterWrite => {
                write_sample_image(&workspace.join("000001.jpg"), ImageFormat::Jpeg)?;
                Err(ProviderError::ConnectionError(
                    format!("Simulated failure after download for '{}'", query),
                ))
            }
        }
    }
}

/// Write a tiny solid-color image in the given format
pub fn write_sample_image(path: &Path, format: ImageFormat) -> Result<(), ProviderError> {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(8, 8, Rgb([200, 30, 40]));
    img.save_with_format(path, format)
        .map_err(|e| ProviderError::Io(std::io::Error::other(e.to_string())))
}
