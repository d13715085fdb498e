use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::{Config, ImageProviderKind, TranslationProviderKind};
use crate::file_utils::FileManager;
use crate::images::{AcquisitionOutcome, ImageAcquisition};
use crate::items::{self, Item};
use crate::providers::libretranslate::LibreTranslate;
use crate::providers::wikimedia::WikimediaImages;
use crate::providers::{ImageProvider, TranslationProvider};
use crate::render::{DocumentRenderer, LatexRenderer};
use crate::rows::{self, ImageAsset};
use crate::translation::{TranslationFanOut, TranslationRecord};

// @module: Application controller for table generation

/// Counts reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Items read from the items file
    pub items: usize,
    /// Language cells that fell back to the item text
    pub translation_fallbacks: usize,
    /// Images already in place and valid
    pub cached: usize,
    /// Images downloaded during this run
    pub fetched: usize,
    /// Rows rendered without an image
    pub unresolved: usize,
    /// Unresolved rows caused by a provider or I/O error
    pub failed: usize,
    /// Path of the written document
    pub output: PathBuf,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} items, {} translation fallbacks, {} cached, {} fetched, {} unresolved ({} failed)",
            self.items, self.translation_fallbacks, self.cached, self.fetched, self.unresolved, self.failed
        )
    }
}

/// Main application controller
///
/// Runs the translation phase, then the image phase, then assembles and
/// renders the table.
#[derive(Debug)]
pub struct Controller {
    // @field: App configuration
    config: Config,
    translator: Arc<dyn TranslationProvider>,
    image_provider: Arc<dyn ImageProvider>,
    skip_images: bool,
    show_progress: bool,
}

impl Controller {
    // @method: Create a controller with the HTTP providers named in the config
    pub fn with_config(config: Config) -> Result<Self> {
        let translator: Arc<dyn TranslationProvider> = match config.translation.provider {
            TranslationProviderKind::LibreTranslate => Arc::new(LibreTranslate::new(
                config.translation.endpoint.clone(),
                config.translation.api_key.clone(),
                config.translation.timeout(),
            )),
        };

        let image_provider: Arc<dyn ImageProvider> = match config.images.provider {
            ImageProviderKind::Wikimedia => Arc::new(WikimediaImages::new(
                config.images.endpoint.clone(),
                config.images.thumbnail_width,
                config.images.timeout(),
            )),
        };

        Ok(Self::with_providers(config, translator, image_provider))
    }

    /// Create a controller over caller-supplied providers
    pub fn with_providers(
        config: Config,
        translator: Arc<dyn TranslationProvider>,
        image_provider: Arc<dyn ImageProvider>,
    ) -> Self {
        Self {
            config,
            translator,
            image_provider,
            skip_images: false,
            show_progress: true,
        }
    }

    /// Render every image as unresolved without calling the image provider
    pub fn skip_images(mut self, skip: bool) -> Self {
        self.skip_images = skip;
        self
    }

    /// Toggle the progress bars
    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the whole workflow and write the document
    pub async fn run(&self) -> Result<RunSummary> {
        let start_time = std::time::Instant::now();
        self.config.validate().context("Invalid configuration")?;

        let items = items::read_items(&self.config.items_file)
            .with_context(|| format!("Failed to load items from {}", self.config.items_file))?;
        if items.is_empty() {
            warn!("No items in {}, the table will be empty", self.config.items_file);
        }

        let mut summary = RunSummary {
            items: items.len(),
            output: PathBuf::from(&self.config.output_file),
            ..RunSummary::default()
        };

        info!(
            "Translating {} items into {} languages with {}",
            items.len(),
            self.config.languages.len(),
            self.config.translation.provider.display_name()
        );
        let translations = self.translate_phase(&items).await;
        summary.translation_fallbacks = translations.values().map(|r| r.fallback_count()).sum();

        let images = if self.skip_images {
            info!("Skipping image acquisition");
            summary.unresolved = items.len();
            HashMap::new()
        } else {
            info!("Acquiring images with {}", self.config.images.provider.display_name());
            self.image_phase(&items, &mut summary).await
        };

        let rows = rows::assemble(&items, &self.config.languages, &translations, &images);

        let output = Path::new(&self.config.output_file);
        let renderer = LatexRenderer::for_output(&self.config.images.destination_dir, output)?;
        let document = renderer.render(&rows, &self.config.languages, &self.config.render)?;

        FileManager::write_to_file(output, &document)
            .with_context(|| format!("Failed to write document {}", output.display()))?;

        info!("Success: {}", output.display());
        info!("{}", summary);
        info!("Completed in {}", Self::format_duration(start_time.elapsed()));
        info!("Compile it with: lualatex {}", output.display());

        Ok(summary)
    }

    async fn translate_phase(&self, items: &[Item]) -> HashMap<Item, TranslationRecord> {
        let fanout = TranslationFanOut::from_config(Arc::clone(&self.translator), &self.config.translation);

        let progress_bar = self.progress_bar(items.len(), "items");
        progress_bar.set_message("Translating");
        let pb = progress_bar.clone();

        let records = fanout
            .translate_all(items, &self.config.languages, move |completed, _total| {
                pb.set_position(completed as u64);
            })
            .await;

        progress_bar.finish_and_clear();

        items.iter().cloned().zip(records).collect()
    }

    async fn image_phase(&self, items: &[Item], summary: &mut RunSummary) -> HashMap<Item, ImageAsset> {
        let acquisition = ImageAcquisition::from_config(Arc::clone(&self.image_provider), &self.config.images);
        let destination_dir = &self.config.images.destination_dir;

        let progress_bar = self.progress_bar(items.len(), "images");
        let mut assets = HashMap::with_capacity(items.len());

        for item in items {
            progress_bar.set_message(item.to_string());

            let asset = match acquisition.acquire(item, destination_dir).await {
                Ok(outcome) => {
                    match &outcome {
                        AcquisitionOutcome::CachedValid(_) => summary.cached += 1,
                        AcquisitionOutcome::FreshlyAcquired(_) => summary.fetched += 1,
                        AcquisitionOutcome::NotFound | AcquisitionOutcome::InvalidDownload => summary.unresolved += 1,
                    }
                    outcome.into_asset()
                }
                Err(e) => {
                    warn!("Could not acquire image for '{}': {}", item, e);
                    summary.failed += 1;
                    summary.unresolved += 1;
                    ImageAsset::Unresolved
                }
            };

            assets.insert(item.clone(), asset);
            progress_bar.inc(1);
        }

        progress_bar.finish_and_clear();

        // Only succeeds when every scratch directory is gone
        if std::fs::remove_dir(&self.config.images.workspace_dir).is_ok() {
            debug!("Removed image workspace {:?}", self.config.images.workspace_dir);
        }

        assets
    }

    fn progress_bar(&self, len: usize, unit: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new(len as u64);
        let template = format!(
            "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}}",
            unit
        );
        let style = ProgressStyle::default_bar()
            .template(&template)
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar
    }

    // Format duration in a human-readable format
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
