/*!
 * Translation of items into the configured language set.
 *
 * - `fanout`: concurrent per-language fan-out with fallback to the item text
 * - `record`: the per-item translation record
 */

// Re-export main types for easier usage
pub use self::fanout::TranslationFanOut;
pub use self::record::{Translation, TranslationRecord};

// Submodules
pub mod fanout;
pub mod record;
