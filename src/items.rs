/*!
 * Item source.
 *
 * Items come from a UTF-8 text file with one item per line. The item text is
 * the translation query, the image search query and the base name of the
 * image file, so it has to survive all three uses.
 */

use log::warn;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::errors::AppError;
use crate::file_utils::FileManager;

/// One named entity to translate and illustrate
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Item(String);

impl Item {
    /// Build an item, rejecting text that cannot also be a file base name
    pub fn new(text: impl Into<String>) -> Result<Self, String> {
        let text = text.into();

        if text.is_empty() {
            return Err("item cannot be empty".to_string());
        }
        if text.trim() != text {
            return Err(format!("item '{}' has leading or trailing whitespace", text));
        }
        if text == "." || text == ".." {
            return Err(format!("item '{}' is not a usable file name", text));
        }
        if let Some(c) = text.chars().find(|c| matches!(c, '/' | '\\' | '\0')) {
            return Err(format!("item '{}' contains forbidden character {:?}", text, c));
        }

        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of this item's image asset
    pub fn image_file_name(&self) -> String {
        format!("{}.jpg", self.0)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Item {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Parse item file content: trim lines, drop blanks and later duplicates
pub fn parse_items(content: &str) -> Result<Vec<Item>, AppError> {
    let mut items = Vec::new();
    let mut seen = HashSet::new();

    for (idx, line) in content.lines().enumerate() {
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        let item = Item::new(text).map_err(|reason| AppError::InvalidItem { line: idx + 1, reason })?;
        if !seen.insert(item.clone()) {
            warn!("Duplicate item '{}' on line {} ignored", item, idx + 1);
            continue;
        }
        items.push(item);
    }

    Ok(items)
}

/// Read the item list from disk
pub fn read_items<P: AsRef<Path>>(path: P) -> Result<Vec<Item>, AppError> {
    let content = FileManager::read_to_string(path.as_ref())
        .map_err(|e| AppError::File(format!("{:#}", e)))?;
    parse_items(&content)
}
