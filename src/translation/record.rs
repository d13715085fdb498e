use crate::app_config::LanguageSet;
use crate::items::Item;

/// One resolved column of a translation record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    /// Language code from the language set
    pub code: String,
    /// Translated text, or the item text when the provider failed
    pub text: String,
    /// True when `text` is the untranslated item
    pub fallback: bool,
}

/// Complete per-item mapping from language code to text
///
/// Built once per item by the fan-out controller. Entries follow language set
/// order and every configured code is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRecord {
    entries: Vec<Translation>,
}

impl TranslationRecord {
    pub fn from_entries(entries: Vec<Translation>) -> Self {
        Self { entries }
    }

    /// Record where every language falls back to the item text
    pub fn fallback(item: &Item, languages: &LanguageSet) -> Self {
        let entries = languages
            .iter()
            .map(|entry| Translation {
                code: entry.code.clone(),
                text: item.as_str().to_string(),
                fallback: true,
            })
            .collect();
        Self { entries }
    }

    /// Text for a language code
    pub fn get(&self, code: &str) -> Option<&str> {
        self.entries.iter().find(|t| t.code == code).map(|t| t.text.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Translation> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many languages fell back to the item text
    pub fn fallback_count(&self) -> usize {
        self.entries.iter().filter(|t| t.fallback).count()
    }

    /// Whether every code of `languages` has an entry
    pub fn covers(&self, languages: &LanguageSet) -> bool {
        languages.iter().all(|entry| self.get(&entry.code).is_some())
    }
}
