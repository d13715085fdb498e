/*!
 * Row assembly.
 *
 * Pairs every item with its translation record and image asset, in item
 * order. Pure: no I/O, the same inputs always give the same rows.
 */

use std::collections::HashMap;
use std::path::PathBuf;

use crate::app_config::LanguageSet;
use crate::items::Item;
use crate::translation::TranslationRecord;

/// Resolved image of an item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageAsset {
    /// Image file in place at this path
    Resolved(PathBuf),
    /// No image; the document still references the expected file
    Unresolved,
}

impl ImageAsset {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// One item's translations and image, ready to render
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub item: Item,
    pub translations: TranslationRecord,
    pub image: ImageAsset,
}

/// Build rows in item order
///
/// An item missing from `translations_by_item` gets an all-fallback record so
/// every row stays complete; one missing from `images_by_item` is unresolved.
pub fn assemble(
    items: &[Item],
    languages: &LanguageSet,
    translations_by_item: &HashMap<Item, TranslationRecord>,
    images_by_item: &HashMap<Item, ImageAsset>,
) -> Vec<Row> {
    items
        .iter()
        .map(|item| Row {
            item: item.clone(),
            translations: translations_by_item
                .get(item)
                .cloned()
                .unwrap_or_else(|| TranslationRecord::fallback(item, languages)),
            image: images_by_item
                .get(item)
                .cloned()
                .unwrap_or(ImageAsset::Unresolved),
        })
        .collect()
}
