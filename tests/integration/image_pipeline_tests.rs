/*!
 * Integration tests for the image acquisition pipeline
 */

use image::ImageFormat;
use polytable::errors::AppError;
use polytable::images::validator;
use polytable::images::{AcquisitionOutcome, ImageAcquisition, destination_path};
use polytable::items::Item;
use polytable::providers::mock::{MockImageBehavior, MockImageProvider, write_sample_image};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use crate::common;

struct Fixture {
    _root: TempDir,
    destination: PathBuf,
    workspace: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let root = common::create_temp_dir().unwrap();
        let destination = root.path().join("img");
        let workspace = root.path().join("tmp_imagenes");
        fs::create_dir_all(&destination).unwrap();
        Self { _root: root, destination, workspace }
    }

    fn pipeline(&self, provider: &MockImageProvider) -> ImageAcquisition {
        ImageAcquisition::new(Arc::new(provider.clone()), &self.workspace)
    }

    fn target(&self, item: &Item) -> PathBuf {
        destination_path(item, &self.destination)
    }
}

fn item(name: &str) -> Item {
    Item::new(name).unwrap()
}

fn assert_workspace_empty(workspace: &Path) {
    assert_eq!(common::count_entries(workspace), 0, "workspace {:?} not empty", workspace);
}

/// A valid cached image is reused with no provider call
#[tokio::test]
async fn test_acquire_withValidCache_shouldNotCallProvider() {
    let fx = Fixture::new();
    let provider = MockImageProvider::found();
    let kiwi = item("kiwi");
    write_sample_image(&fx.target(&kiwi), ImageFormat::Jpeg).unwrap();

    let outcome = fx.pipeline(&provider).acquire(&kiwi, &fx.destination).await.unwrap();

    assert_eq!(outcome, AcquisitionOutcome::CachedValid(fx.target(&kiwi)));
    assert_eq!(provider.call_count(), 0);
}

/// A second acquisition after success makes zero provider calls
#[tokio::test]
async fn test_acquire_twice_shouldBeIdempotent() {
    let fx = Fixture::new();
    let provider = MockImageProvider::found();
    let pipeline = fx.pipeline(&provider);
    let tomate = item("tomate");

    let first = pipeline.acquire(&tomate, &fx.destination).await.unwrap();
    let second = pipeline.acquire(&tomate, &fx.destination).await.unwrap();

    assert_eq!(first, AcquisitionOutcome::FreshlyAcquired(fx.target(&tomate)));
    assert_eq!(second, AcquisitionOutcome::CachedValid(fx.target(&tomate)));
    assert_eq!(provider.call_count(), 1);
    assert_eq!(provider.queries(), vec!["tomate".to_string()]);
    assert!(validator::is_valid(&fx.target(&tomate)));
}

/// An invalid cached file triggers exactly one fetch and is replaced
#[tokio::test]
async fn test_acquire_withCorruptCache_shouldFetchOnceAndReplace() {
    let fx = Fixture::new();
    let provider = MockImageProvider::found();
    let manzana = item("manzana");
    fs::write(fx.target(&manzana), b"not a jpeg").unwrap();

    let outcome = fx.pipeline(&provider).acquire(&manzana, &fx.destination).await.unwrap();

    assert_eq!(outcome, AcquisitionOutcome::FreshlyAcquired(fx.target(&manzana)));
    assert_eq!(provider.call_count(), 1);
    assert_eq!(validator::inspect(&fx.target(&manzana)).unwrap(), ImageFormat::Jpeg);
}

/// The corrupt file is gone whatever the fetch outcome
#[tokio::test]
async fn test_acquire_withCorruptCache_shouldRemoveFileOnEveryOutcome() {
    let behaviors = [
        MockImageBehavior::NotFound,
        MockImageBehavior::Corrupt,
        MockImageBehavior::Failing,
        MockImageBehavior::FailAfterWrite,
    ];

    for behavior in behaviors {
        let fx = Fixture::new();
        let provider = MockImageProvider::new(behavior);
        let pera = item("pera");
        fs::write(fx.target(&pera), b"garbage").unwrap();

        let _ = fx.pipeline(&provider).acquire(&pera, &fx.destination).await;

        assert!(!fx.target(&pera).exists(), "file left behind for {:?}", behavior);
        assert_eq!(provider.call_count(), 1, "calls for {:?}", behavior);
        assert_workspace_empty(&fx.workspace);
    }
}

/// Nothing found leaves no file and no workspace residue
#[tokio::test]
async fn test_acquire_withNoResult_shouldReturnNotFound() {
    let fx = Fixture::new();
    let provider = MockImageProvider::found().with_query("kiwi", MockImageBehavior::NotFound);
    let kiwi = item("kiwi");

    let outcome = fx.pipeline(&provider).acquire(&kiwi, &fx.destination).await.unwrap();

    assert_eq!(outcome, AcquisitionOutcome::NotFound);
    assert!(outcome.path().is_none());
    assert!(!fx.target(&kiwi).exists());
    assert_workspace_empty(&fx.workspace);
}

/// A download that does not decode is discarded
#[tokio::test]
async fn test_acquire_withCorruptDownload_shouldReturnInvalidDownload() {
    let fx = Fixture::new();
    let provider = MockImageProvider::new(MockImageBehavior::Corrupt);
    let uva = item("uva");

    let outcome = fx.pipeline(&provider).acquire(&uva, &fx.destination).await.unwrap();

    assert_eq!(outcome, AcquisitionOutcome::InvalidDownload);
    assert!(!fx.target(&uva).exists());
    assert_workspace_empty(&fx.workspace);
}

/// Provider errors propagate and still clean the workspace
#[tokio::test]
async fn test_acquire_withProviderError_shouldPropagateAndClean() {
    for behavior in [MockImageBehavior::Failing, MockImageBehavior::FailAfterWrite] {
        let fx = Fixture::new();
        let provider = MockImageProvider::new(behavior);
        let limon = item("limón");

        let result = fx.pipeline(&provider).acquire(&limon, &fx.destination).await;

        assert!(matches!(result, Err(AppError::Provider(_))), "{:?}: {:?}", behavior, result);
        assert!(!fx.target(&limon).exists());
        assert_workspace_empty(&fx.workspace);
    }
}

/// Every acquisition gets its own scratch directory under the workspace root
#[tokio::test]
async fn test_acquire_shouldUseScopedWorkspaces() {
    let fx = Fixture::new();
    let provider = MockImageProvider::found();
    let pipeline = fx.pipeline(&provider);

    for name in ["a", "b"] {
        pipeline.acquire(&item(name), &fx.destination).await.unwrap();
    }

    let workspaces = provider.workspaces();
    assert_eq!(workspaces.len(), 2);
    assert_ne!(workspaces[0], workspaces[1]);
    assert!(workspaces.iter().all(|w| w.starts_with(&fx.workspace)));
    assert!(workspaces.iter().all(|w| !w.exists()));
    assert_workspace_empty(&fx.workspace);
}

/// PNG downloads are re-encoded so the committed file really is a JPEG
#[tokio::test]
async fn test_acquire_withPngDownload_shouldConvertToJpeg() {
    let fx = Fixture::new();
    let provider = MockImageProvider::new(MockImageBehavior::Png);
    let fresa = item("fresa");

    let outcome = fx.pipeline(&provider).acquire(&fresa, &fx.destination).await.unwrap();

    assert_eq!(outcome, AcquisitionOutcome::FreshlyAcquired(fx.target(&fresa)));
    assert_eq!(validator::inspect(&fx.target(&fresa)).unwrap(), ImageFormat::Jpeg);
    assert_workspace_empty(&fx.workspace);
}

#[tokio::test]
async fn test_acquire_withConversionDisabled_shouldKeepOriginalBytes() {
    let fx = Fixture::new();
    let provider = MockImageProvider::new(MockImageBehavior::Png);
    let fresa = item("fresa");

    let outcome = fx
        .pipeline(&provider)
        .with_jpeg_conversion(false)
        .acquire(&fresa, &fx.destination)
        .await
        .unwrap();

    assert!(matches!(outcome, AcquisitionOutcome::FreshlyAcquired(_)));
    assert_eq!(validator::inspect(&fx.target(&fresa)).unwrap(), ImageFormat::Png);
}

/// The destination directory is created on first commit
#[tokio::test]
async fn test_acquire_withMissingDestination_shouldCreateIt() {
    let fx = Fixture::new();
    let provider = MockImageProvider::found();
    let destination = fx.destination.join("nested");
    let higo = item("higo");

    let outcome = fx.pipeline(&provider).acquire(&higo, &destination).await.unwrap();

    assert_eq!(outcome, AcquisitionOutcome::FreshlyAcquired(destination.join("higo.jpg")));
}
