/*!
 * Image acquisition for a single item.
 *
 * Per item the pipeline walks CheckCache -> Fetch -> Commit:
 * - CheckCache: a valid `<item>.jpg` in the destination short-circuits with no
 *   provider call; an invalid one is deleted by the validator
 * - Fetch: one rate-limited provider call into a scratch directory owned by
 *   this acquisition
 * - Commit: the validated download is moved (or re-encoded) to `<item>.jpg`
 *
 * The scratch directory is a `TempDir`, removed on every exit path. Provider
 * and I/O errors are returned to the caller unchanged.
 */

use image::{ImageFormat, ImageReader};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use crate::app_config::ImageConfig;
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::items::Item;
use crate::providers::{ImageProvider, with_timeout};
use crate::rows::ImageAsset;

use super::rate_limit::RateLimiter;
use super::validator;

/// How an acquisition ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionOutcome {
    /// A valid file was already in place, no provider call was made
    CachedValid(PathBuf),
    /// A new file was downloaded and committed
    FreshlyAcquired(PathBuf),
    /// The provider found nothing
    NotFound,
    /// The provider returned a file that is not a usable image
    InvalidDownload,
}

impl AcquisitionOutcome {
    /// Path of the committed image, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::CachedValid(p) | Self::FreshlyAcquired(p) => Some(p),
            Self::NotFound | Self::InvalidDownload => None,
        }
    }

    pub fn into_asset(self) -> ImageAsset {
        match self {
            Self::CachedValid(p) | Self::FreshlyAcquired(p) => ImageAsset::Resolved(p),
            Self::NotFound | Self::InvalidDownload => ImageAsset::Unresolved,
        }
    }
}

/// Destination of an item's image inside `destination_dir`
pub fn destination_path(item: &Item, destination_dir: &Path) -> PathBuf {
    destination_dir.join(item.image_file_name())
}

fn file_error(e: anyhow::Error) -> AppError {
    AppError::File(format!("{:#}", e))
}

fn join_error(e: tokio::task::JoinError) -> AppError {
    AppError::Unknown(format!("image task failed: {}", e))
}

// Run image decoding off the async workers; a panicked task is an error, not a verdict
async fn run_blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(join_error)
}

/// Sequential image acquisition over an image provider
#[derive(Debug)]
pub struct ImageAcquisition {
    /// The provider every fetch goes through
    provider: Arc<dyn ImageProvider>,
    /// Parent of the per-acquisition scratch directories
    workspace_root: PathBuf,
    /// Pacing for provider calls
    limiter: RateLimiter,
    /// Optional per-call timeout
    timeout: Option<Duration>,
    /// Re-encode non-JPEG downloads
    convert_to_jpeg: bool,
}

impl ImageAcquisition {
    /// Create a pipeline with no pacing, no timeout and JPEG conversion on
    pub fn new(provider: Arc<dyn ImageProvider>, workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            workspace_root: workspace_root.into(),
            limiter: RateLimiter::unlimited(),
            timeout: None,
            convert_to_jpeg: true,
        }
    }

    /// Create a pipeline from the image config
    pub fn from_config(provider: Arc<dyn ImageProvider>, config: &ImageConfig) -> Self {
        Self::new(provider, config.workspace_dir.clone())
            .with_rate_limiter(RateLimiter::new(config.rate_limit_per_minute, config.burst))
            .with_timeout(config.timeout())
            .with_jpeg_conversion(config.convert_to_jpeg)
    }

    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_jpeg_conversion(mut self, enabled: bool) -> Self {
        self.convert_to_jpeg = enabled;
        self
    }

    /// Resolve the image of `item` into `destination_dir`
    pub async fn acquire(&self, item: &Item, destination_dir: &Path) -> Result<AcquisitionOutcome, AppError> {
        let destination = destination_path(item, destination_dir);

        // CheckCache
        if destination.exists() {
            let candidate = destination.clone();
            if run_blocking(move || validator::is_valid(&candidate)).await? {
                info!("Image for '{}' already exists and is valid, skipping download", item);
                return Ok(AcquisitionOutcome::CachedValid(destination));
            }
            info!("Image for '{}' is invalid, downloading it again", item);
        }

        // Fetch
        FileManager::ensure_dir(&self.workspace_root).map_err(file_error)?;
        let workspace = tempfile::Builder::new()
            .prefix("acquire-")
            .tempdir_in(&self.workspace_root)?;

        self.limiter.acquire().await;
        let found = with_timeout(
            self.timeout,
            self.provider.search_and_fetch_one(item.as_str(), workspace.path()),
        )
        .await?;

        if !found {
            warn!("No image found for '{}'", item);
            return Ok(AcquisitionOutcome::NotFound);
        }

        let fetched = match FileManager::list_files(workspace.path()).map_err(file_error)?.into_iter().next() {
            Some(path) => path,
            None => {
                warn!("Image provider reported a result for '{}' but wrote no file", item);
                return Ok(AcquisitionOutcome::NotFound);
            }
        };

        let candidate = fetched.clone();
        let format = match run_blocking(move || validator::inspect(&candidate)).await? {
            Ok(format) => format,
            Err(e) => {
                warn!("Downloaded image for '{}' is not usable: {}", item, e);
                return Ok(AcquisitionOutcome::InvalidDownload);
            }
        };

        // Commit
        self.commit(fetched, format, &workspace, &destination, destination_dir).await?;

        if let Err(e) = workspace.close() {
            warn!("Could not clear image workspace: {}", e);
        }

        info!("Downloaded image for '{}'", item);
        Ok(AcquisitionOutcome::FreshlyAcquired(destination))
    }

    async fn commit(
        &self,
        fetched: PathBuf,
        format: ImageFormat,
        workspace: &TempDir,
        destination: &Path,
        destination_dir: &Path,
    ) -> Result<(), AppError> {
        FileManager::ensure_dir(destination_dir).map_err(file_error)?;

        let source = if self.convert_to_jpeg && format != ImageFormat::Jpeg {
            let converted = workspace.path().join("converted.jpg");
            let target = converted.clone();
            run_blocking(move || -> Result<(), AppError> {
                let img = ImageReader::open(&fetched)?.with_guessed_format()?.decode()?;
                img.to_rgb8().save_with_format(&target, ImageFormat::Jpeg)?;
                Ok(())
            })
            .await??;
            converted
        } else {
            fetched
        };

        FileManager::move_file(&source, destination).map_err(file_error)
    }
}
