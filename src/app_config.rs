use anyhow::{anyhow, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::default::Default;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::language_utils;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Line-delimited list of items, one per line
    #[serde(default = "default_items_file")]
    pub items_file: String,

    /// Path of the rendered document
    #[serde(default = "default_output_file")]
    pub output_file: String,

    /// Ordered target languages, one table column each
    #[serde(default)]
    pub languages: LanguageSet,

    /// Translation provider settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Image acquisition settings
    #[serde(default)]
    pub images: ImageConfig,

    /// Document renderer settings
    #[serde(default)]
    pub render: RenderConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// One column of the output table
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LanguageEntry {
    /// Short column code, e.g. "ma"
    pub code: String,

    /// Identifier understood by the translation provider, e.g. "ar"
    pub target: String,

    /// Column header in the rendered document
    #[serde(default)]
    pub label: String,
}

impl LanguageEntry {
    pub fn new(code: impl Into<String>, target: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            target: target.into(),
            label: label.into(),
        }
    }

    /// Header label, falling back to the English name of the target language
    pub fn display_label(&self) -> String {
        if !self.label.trim().is_empty() {
            return self.label.clone();
        }
        language_utils::get_language_name(&self.target).unwrap_or_else(|_| self.code.clone())
    }
}

/// Fixed, ordered set of languages for a run
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(transparent)]
pub struct LanguageSet(Vec<LanguageEntry>);

impl LanguageSet {
    pub fn new(entries: Vec<LanguageEntry>) -> Self {
        Self(entries)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LanguageEntry> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Column codes in set order
    pub fn codes(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.code.as_str()).collect()
    }

    pub fn get(&self, code: &str) -> Option<&LanguageEntry> {
        self.0.iter().find(|e| e.code == code)
    }

    /// Check codes are unique and every target is a known ISO language
    pub fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(anyhow!("At least one language must be configured"));
        }

        let mut seen = HashSet::new();
        for entry in &self.0 {
            if entry.code.trim().is_empty() {
                return Err(anyhow!("Language code cannot be empty"));
            }
            if !seen.insert(entry.code.as_str()) {
                return Err(anyhow!("Duplicate language code: {}", entry.code));
            }
            language_utils::validate_language_code(&entry.target)
                .map_err(|e| anyhow!("Language '{}': {}", entry.code, e))?;
        }

        // Allowed, but almost always a copy-paste mistake
        for (i, a) in self.0.iter().enumerate() {
            for b in self.0.iter().skip(i + 1) {
                if language_utils::language_codes_match(&a.target, &b.target) {
                    warn!("Languages '{}' and '{}' both translate to '{}'", a.code, b.code, a.target);
                }
            }
        }

        Ok(())
    }
}

impl Default for LanguageSet {
    fn default() -> Self {
        Self(vec![
            LanguageEntry::new("es", "es", "Español"),
            LanguageEntry::new("ca", "ca", "Catalán"),
            LanguageEntry::new("en", "en", "Inglés"),
            LanguageEntry::new("fr", "fr", "Francés"),
            // No Darija target exists upstream, Arabic is the closest
            LanguageEntry::new("ma", "ar", "Marroquí"),
        ])
    }
}

impl<'a> IntoIterator for &'a LanguageSet {
    type Item = &'a LanguageEntry;
    type IntoIter = std::slice::Iter<'a, LanguageEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProviderKind {
    // @provider: LibreTranslate-compatible HTTP API
    #[default]
    LibreTranslate,
}

impl TranslationProviderKind {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::LibreTranslate => "LibreTranslate",
        }
    }
}

impl std::fmt::Display for TranslationProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LibreTranslate => write!(f, "libretranslate"),
        }
    }
}

impl std::str::FromStr for TranslationProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "libretranslate" => Ok(Self::LibreTranslate),
            _ => Err(anyhow!("Invalid translation provider: {}", s)),
        }
    }
}

/// Image search provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageProviderKind {
    // @provider: Wikimedia Commons search API
    #[default]
    Wikimedia,
}

impl ImageProviderKind {
    pub fn display_name(&self) -> &str {
        match self {
            Self::Wikimedia => "Wikimedia Commons",
        }
    }
}

impl std::fmt::Display for ImageProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wikimedia => write!(f, "wikimedia"),
        }
    }
}

impl std::str::FromStr for ImageProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "wikimedia" => Ok(Self::Wikimedia),
            _ => Err(anyhow!("Invalid image provider: {}", s)),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProviderKind,

    // @field: Service URL
    #[serde(default = "default_translation_endpoint")]
    pub endpoint: String,

    // @field: API key (empty for self-hosted instances)
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Maximum number of provider calls in flight across all items
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    /// Per-call timeout in seconds, none waits forever
    #[serde(default = "default_translation_timeout_secs")]
    pub timeout_secs: Option<u64>,
}

impl TranslationConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.filter(|s| *s > 0).map(Duration::from_secs)
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProviderKind::default(),
            endpoint: default_translation_endpoint(),
            api_key: String::new(),
            concurrent_requests: default_concurrent_requests(),
            timeout_secs: default_translation_timeout_secs(),
        }
    }
}

/// Image acquisition configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ImageConfig {
    /// Image provider to use
    #[serde(default)]
    pub provider: ImageProviderKind,

    // @field: Search API URL
    #[serde(default = "default_image_endpoint")]
    pub endpoint: String,

    /// Directory holding one `<item>.jpg` per resolved item
    #[serde(default = "default_destination_dir")]
    pub destination_dir: PathBuf,

    /// Root for per-acquisition scratch directories
    #[serde(default = "default_workspace_dir")]
    pub workspace_dir: PathBuf,

    /// Requested thumbnail width in pixels (0 downloads the original)
    #[serde(default = "default_thumbnail_width")]
    pub thumbnail_width: u32,

    /// Per-call timeout in seconds, none waits forever
    #[serde(default = "default_image_timeout_secs")]
    pub timeout_secs: Option<u64>,

    /// Image provider calls per minute (0 disables pacing)
    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: u32,

    /// Calls allowed back to back before pacing kicks in
    #[serde(default = "default_burst")]
    pub burst: u32,

    /// Re-encode non-JPEG downloads so the `.jpg` extension is truthful
    #[serde(default = "default_true")]
    pub convert_to_jpeg: bool,
}

impl ImageConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.filter(|s| *s > 0).map(Duration::from_secs)
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            provider: ImageProviderKind::default(),
            endpoint: default_image_endpoint(),
            destination_dir: default_destination_dir(),
            workspace_dir: default_workspace_dir(),
            thumbnail_width: default_thumbnail_width(),
            timeout_secs: default_image_timeout_secs(),
            rate_limit_per_minute: default_rate_limit_per_minute(),
            burst: default_burst(),
            convert_to_jpeg: true,
        }
    }
}

/// Settings consumed by the document renderer
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RenderConfig {
    /// Section title above the table
    #[serde(default = "default_title")]
    pub title: String,

    /// Header of the image column
    #[serde(default = "default_image_label")]
    pub image_label: String,

    /// Width of every embedded image, in LaTeX units
    #[serde(default = "default_image_size")]
    pub image_width: String,

    /// Height of every embedded image, in LaTeX units
    #[serde(default = "default_image_size")]
    pub image_height: String,

    /// Polyglossia default language
    #[serde(default = "default_main_language")]
    pub main_language: String,

    /// Additional polyglossia languages
    #[serde(default = "default_other_languages")]
    pub other_languages: Vec<String>,

    /// Main document font
    #[serde(default = "default_font")]
    pub main_font: String,

    /// Font for right-to-left Arabic script
    #[serde(default = "default_arabic_font")]
    pub arabic_font: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            image_label: default_image_label(),
            image_width: default_image_size(),
            image_height: default_image_size(),
            main_language: default_main_language(),
            other_languages: default_other_languages(),
            main_font: default_font(),
            arabic_font: default_arabic_font(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_items_file() -> String {
    "lista.txt".to_string()
}

fn default_output_file() -> String {
    "tabla.tex".to_string()
}

fn default_concurrent_requests() -> usize {
    8
}

fn default_translation_timeout_secs() -> Option<u64> {
    Some(30)
}

fn default_image_timeout_secs() -> Option<u64> {
    Some(60)
}

fn default_translation_endpoint() -> String {
    "https://libretranslate.com".to_string()
}

fn default_image_endpoint() -> String {
    "https://commons.wikimedia.org/w/api.php".to_string()
}

fn default_destination_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_workspace_dir() -> PathBuf {
    PathBuf::from("tmp_imagenes")
}

fn default_thumbnail_width() -> u32 {
    640
}

fn default_rate_limit_per_minute() -> u32 {
    60 // one search per second, same pace as a fixed 1s delay
}

fn default_burst() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_title() -> String {
    "Frutas y Verduras en Múltiples Idiomas".to_string()
}

fn default_image_label() -> String {
    "Imagen".to_string()
}

fn default_image_size() -> String {
    "3.5cm".to_string()
}

fn default_main_language() -> String {
    "spanish".to_string()
}

fn default_other_languages() -> Vec<String> {
    vec!["arabic".to_string()]
}

fn default_font() -> String {
    "Amiri".to_string()
}

fn default_arabic_font() -> Option<String> {
    Some("Amiri".to_string())
}

fn validate_endpoint(name: &str, endpoint: &str) -> Result<()> {
    let url = Url::parse(endpoint).map_err(|e| anyhow!("Invalid {} endpoint '{}': {}", name, endpoint, e))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(anyhow!("Invalid {} endpoint '{}': scheme must be http or https", name, endpoint));
    }
    Ok(())
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        self.languages.validate()?;

        if self.items_file.trim().is_empty() {
            return Err(anyhow!("Items file path cannot be empty"));
        }
        if self.output_file.trim().is_empty() {
            return Err(anyhow!("Output file path cannot be empty"));
        }

        if self.translation.concurrent_requests == 0 {
            return Err(anyhow!("translation.concurrent_requests must be at least 1"));
        }
        validate_endpoint("translation", &self.translation.endpoint)?;
        validate_endpoint("image", &self.images.endpoint)?;

        if self.images.destination_dir.as_os_str().is_empty() {
            return Err(anyhow!("images.destination_dir cannot be empty"));
        }
        if self.images.workspace_dir.as_os_str().is_empty() {
            return Err(anyhow!("images.workspace_dir cannot be empty"));
        }
        if self.images.rate_limit_per_minute > 0 && self.images.burst == 0 {
            return Err(anyhow!("images.burst must be at least 1 when rate limiting is enabled"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            items_file: default_items_file(),
            output_file: default_output_file(),
            languages: LanguageSet::default(),
            translation: TranslationConfig::default(),
            images: ImageConfig::default(),
            render: RenderConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
