/*!
 * # polytable - multilingual picture tables
 *
 * A Rust library that turns a list of items (fruits, vegetables, anything
 * with a picture) into a table pairing each item's image with its
 * translations, rendered as a LaTeX `longtable`.
 *
 * ## Features
 *
 * - Translate every item into an ordered set of languages, concurrently
 * - Fall back to the item text when a translation fails
 * - Fetch one image per item, reusing valid images already on disk
 * - Validate cached and downloaded images, re-encoding them as JPEG
 * - Render a document that covers every item, even without an image
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `items`: Item list parsing
 * - `translation`: Per-item translation fan-out
 * - `images`: Image cache validation and acquisition
 * - `rows`: Pairing items with translations and images
 * - `render`: Document rendering
 * - `providers`: Translation and image service adapters
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod images;
pub mod items;
pub mod language_utils;
pub mod providers;
pub mod render;
pub mod rows;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::{Config, LanguageEntry, LanguageSet};
pub use app_controller::{Controller, RunSummary};
pub use errors::{AppError, ProviderError};
pub use images::{AcquisitionOutcome, ImageAcquisition};
pub use items::Item;
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use render::{DocumentRenderer, LatexRenderer};
pub use rows::{ImageAsset, Row};
pub use translation::{TranslationFanOut, TranslationRecord};
