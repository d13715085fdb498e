/*!
 * Translation fan-out.
 *
 * Every item is translated into every configured language concurrently. A
 * failing language never fails the item: its column falls back to the item
 * text. All provider calls share one semaphore, so the number of requests in
 * flight never exceeds the configured bound no matter how many items run.
 */

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use log::{debug, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::app_config::{LanguageEntry, LanguageSet, TranslationConfig};
use crate::items::Item;
use crate::providers::{TranslationProvider, with_timeout};

use super::record::{Translation, TranslationRecord};

/// Fan-out controller over a translation provider
#[derive(Debug, Clone)]
pub struct TranslationFanOut {
    /// The provider every call goes through
    provider: Arc<dyn TranslationProvider>,

    /// Gate for provider calls in flight
    limiter: Arc<Semaphore>,

    /// Bound used for both the semaphore and item-level buffering
    max_in_flight: usize,

    /// Optional per-call timeout
    timeout: Option<Duration>,
}

impl TranslationFanOut {
    /// Create a new fan-out controller
    pub fn new(provider: Arc<dyn TranslationProvider>, max_in_flight: usize, timeout: Option<Duration>) -> Self {
        let max_in_flight = max_in_flight.max(1);
        Self {
            provider,
            limiter: Arc::new(Semaphore::new(max_in_flight)),
            max_in_flight,
            timeout,
        }
    }

    /// Create a controller sized from the translation config
    pub fn from_config(provider: Arc<dyn TranslationProvider>, config: &TranslationConfig) -> Self {
        Self::new(provider, config.concurrent_requests, config.timeout())
    }

    /// Translate one item into every language of the set
    ///
    /// All languages are issued at once and the record is built only after
    /// every attempt has finished. Exactly one attempt is made per language.
    pub async fn translate_item(&self, item: &Item, languages: &LanguageSet) -> TranslationRecord {
        let attempts = languages.iter().map(|entry| self.translate_one(item, entry));
        TranslationRecord::from_entries(join_all(attempts).await)
    }

    async fn translate_one(&self, item: &Item, entry: &LanguageEntry) -> Translation {
        let result = {
            // A closed semaphore only happens on shutdown; proceed ungated
            let _permit = self.limiter.acquire().await.ok();
            with_timeout(self.timeout, self.provider.translate(item.as_str(), &entry.target)).await
        };

        match result {
            Ok(text) => Translation {
                code: entry.code.clone(),
                text,
                fallback: false,
            },
            Err(e) => {
                warn!("Error translating '{}' to {}: {}", item, entry.target, e);
                Translation {
                    code: entry.code.clone(),
                    text: item.as_str().to_string(),
                    fallback: true,
                }
            }
        }
    }

    /// Translate every item, returning records in item order
    ///
    /// Returns once all items are done, so callers get a phase barrier.
    pub async fn translate_all<F>(
        &self,
        items: &[Item],
        languages: &LanguageSet,
        progress_callback: F,
    ) -> Vec<TranslationRecord>
    where
        F: Fn(usize, usize),
    {
        let total = items.len();
        let completed = AtomicUsize::new(0);

        let mut results = stream::iter(items.iter().enumerate())
            .map(|(index, item)| {
                let completed = &completed;
                let progress_callback = &progress_callback;
                async move {
                    let record = self.translate_item(item, languages).await;
                    debug!("Translated '{}' ({} fallbacks)", item, record.fallback_count());

                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    progress_callback(done, total);

                    (index, record)
                }
            })
            .buffer_unordered(self.max_in_flight)
            .collect::<Vec<_>>()
            .await;

        // Restore item order
        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, record)| record).collect()
    }
}
