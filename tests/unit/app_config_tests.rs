/*!
 * Tests for application configuration functionality
 */

use polytable::app_config::{
    Config, ImageProviderKind, LanguageEntry, LanguageSet, LogLevel, TranslationProviderKind,
};
use std::path::PathBuf;
use std::time::Duration;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.items_file, "lista.txt");
    assert_eq!(config.output_file, "tabla.tex");
    assert_eq!(config.languages.codes(), vec!["es", "ca", "en", "fr", "ma"]);
    assert_eq!(config.languages.get("ma").unwrap().target, "ar");
    assert_eq!(config.translation.provider, TranslationProviderKind::LibreTranslate);
    assert_eq!(config.images.provider, ImageProviderKind::Wikimedia);
    assert_eq!(config.images.workspace_dir, PathBuf::from("tmp_imagenes"));
    assert_eq!(config.images.destination_dir, PathBuf::from("."));
    assert_eq!(config.render.image_width, "3.5cm");
    assert_eq!(config.render.title, "Frutas y Verduras en Múltiples Idiomas");
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    config.translation.concurrent_requests = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.translation.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.images.endpoint = "ftp://commons.wikimedia.org".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.output_file = "  ".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.images.burst = 0;
    assert!(config.validate().is_err());
    config.images.rate_limit_per_minute = 0;
    assert!(config.validate().is_ok());
}

#[test]
fn test_languageSet_validate_withDuplicateCode_shouldFail() {
    let languages = LanguageSet::new(vec![
        LanguageEntry::new("es", "es", "Español"),
        LanguageEntry::new("es", "ca", "Catalán"),
    ]);
    assert!(languages.validate().is_err());
}

#[test]
fn test_languageSet_validate_withUnknownTarget_shouldFail() {
    let languages = LanguageSet::new(vec![LanguageEntry::new("xx", "qq", "")]);
    assert!(languages.validate().is_err());
    assert!(LanguageSet::new(vec![]).validate().is_err());
}

#[test]
fn test_languageEntry_displayLabel_withoutLabel_shouldUseLanguageName() {
    assert_eq!(LanguageEntry::new("fr", "fr", "").display_label(), "French");
    assert_eq!(LanguageEntry::new("fr", "fr", "Francés").display_label(), "Francés");
}

#[test]
fn test_config_deserialize_withPartialJson_shouldFillDefaults() {
    let json = r#"{
        "items_file": "frutas.txt",
        "languages": [
            {"code": "en", "target": "en", "label": "English"},
            {"code": "de", "target": "de"}
        ],
        "images": {"rate_limit_per_minute": 30}
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.items_file, "frutas.txt");
    assert_eq!(config.output_file, "tabla.tex");
    assert_eq!(config.languages.len(), 2);
    assert_eq!(config.languages.get("de").unwrap().label, "");
    assert_eq!(config.images.rate_limit_per_minute, 30);
    assert_eq!(config.images.burst, 1);
    assert!(config.images.convert_to_jpeg);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_serialize_shouldRoundTripLanguageOrder() {
    let config = Config::default();
    let json = serde_json::to_string_pretty(&config).unwrap();
    let reloaded: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(reloaded.languages, config.languages);
    assert_eq!(reloaded.render, config.render);
}

#[test]
fn test_timeouts_withZeroOrNone_shouldDisable() {
    let mut config = Config::default();
    assert_eq!(config.translation.timeout(), Some(Duration::from_secs(30)));

    config.translation.timeout_secs = Some(0);
    assert_eq!(config.translation.timeout(), None);

    config.images.timeout_secs = None;
    assert_eq!(config.images.timeout(), None);
}

#[test]
fn test_providerKinds_fromStr_shouldParseCaseInsensitively() {
    assert_eq!(
        "LibreTranslate".parse::<TranslationProviderKind>().unwrap(),
        TranslationProviderKind::LibreTranslate
    );
    assert_eq!("WIKIMEDIA".parse::<ImageProviderKind>().unwrap(), ImageProviderKind::Wikimedia);
    assert!("google".parse::<TranslationProviderKind>().is_err());
}
