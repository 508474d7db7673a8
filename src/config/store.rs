//! Storefront configuration loading from config.toml
//!
//! Everything the storefront used to hardcode lives here: the restaurant's names,
//! the order-number prefix, the default category list, the `WhatsApp` country code,
//! the offline cache version and the default site content. Every section is optional;
//! an empty file yields the built-in defaults.

use crate::core::site::{AboutData, ContactData, LogoData};
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Restaurant identity and storefront behaviour
    pub store: StoreSection,
    /// Deep-link settings for customer messages
    pub whatsapp: WhatsAppSection,
    /// Installable-app manifest and offline cache settings
    pub pwa: PwaSection,
    /// Content shown whenever a site document has not been saved yet
    pub content: ContentDefaults,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Full app name (manifest `name`)
    pub name: String,
    /// Short app name (manifest `short_name`)
    pub short_name: String,
    /// Name used when signing customer messages
    pub display_name: String,
    pub description: String,
    /// Prefix of generated order numbers, e.g. `ZSB` → `ZSB-4F7Q2K`
    pub order_prefix: String,
    /// Category list used until the admin saves one
    pub default_categories: Vec<String>,
    /// Directory holding the built storefront (index.html, icons, ...)
    pub static_dir: String,
    pub lang: String,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            name: "ZEQUI SMASH BURGERS".to_string(),
            short_name: "ZEQUI".to_string(),
            display_name: "Zequi Smash Burgers".to_string(),
            description: "Las mejores smash burgers artesanales. Haz tu pedido ahora.".to_string(),
            order_prefix: "ZSB".to_string(),
            default_categories: vec![
                "Burgers".to_string(),
                "Sides".to_string(),
                "Bebidas".to_string(),
            ],
            static_dir: "public".to_string(),
            lang: "es".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WhatsAppSection {
    /// Country calling code prepended to local numbers (digits only)
    pub country_code: String,
}

impl Default for WhatsAppSection {
    fn default() -> Self {
        Self {
            country_code: "593".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PwaSection {
    /// Version name of the offline cache; bump it to evict older caches
    pub cache_name: String,
    /// Paths cached when the offline worker installs
    pub static_assets: Vec<String>,
    pub theme_color: String,
    pub background_color: String,
    /// Disc colour of the generated text icon
    pub icon_accent: String,
}

impl Default for PwaSection {
    fn default() -> Self {
        Self {
            cache_name: "zequi-smash-v1".to_string(),
            static_assets: ["/", "/index.html", "/manifest.json", "/icon-192.svg", "/icon-512.svg"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            theme_color: "#050505".to_string(),
            background_color: "#050505".to_string(),
            icon_accent: "#8B0000".to_string(),
        }
    }
}

/// Defaults for the about, contact and logo documents.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContentDefaults {
    pub about: AboutData,
    pub contact: ContactData,
    pub logo: LogoData,
}

/// Loads the storefront configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A field has the wrong type
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<StoreConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text and checks the values the storefront relies on.
pub fn parse_config(contents: &str) -> Result<StoreConfig> {
    let config: StoreConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    validate(&config)?;
    Ok(config)
}

/// Loads configuration from `STOREFRONT_CONFIG`, falling back to `./config.toml`.
///
/// A missing file is not an error: the built-in defaults are used instead.
pub fn load_default_config() -> Result<StoreConfig> {
    let path = std::env::var("STOREFRONT_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    if Path::new(&path).exists() {
        load_config(&path)
    } else {
        tracing::warn!("Config file {path} not found, using built-in defaults");
        Ok(StoreConfig::default())
    }
}

fn validate(config: &StoreConfig) -> Result<()> {
    if config.store.order_prefix.trim().is_empty() {
        return Err(Error::Config {
            message: "store.order_prefix cannot be empty".to_string(),
        });
    }
    if config.store.default_categories.is_empty() {
        return Err(Error::Config {
            message: "store.default_categories needs at least one category".to_string(),
        });
    }
    let code = &config.whatsapp.country_code;
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::Config {
            message: format!("whatsapp.country_code must be digits only, got '{code}'"),
        });
    }
    if config.pwa.cache_name.trim().is_empty() {
        return Err(Error::Config {
            message: "pwa.cache_name cannot be empty".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::site::LogoMode;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.store.order_prefix, "ZSB");
        assert_eq!(
            config.store.default_categories,
            vec!["Burgers", "Sides", "Bebidas"]
        );
        assert_eq!(config.whatsapp.country_code, "593");
        assert_eq!(config.pwa.cache_name, "zequi-smash-v1");
        assert_eq!(config.content.logo.letter, "Z");
    }

    #[test]
    fn test_parse_partial_sections() {
        let toml_str = r##"
            [store]
            name = "BURGER BAR"
            default_categories = ["Combos", "Postres"]

            [pwa]
            cache_name = "burger-bar-v3"

            [content.logo]
            mode = "image"
            letter = "B"
        "##;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.store.name, "BURGER BAR");
        assert_eq!(config.store.short_name, "ZEQUI");
        assert_eq!(config.store.default_categories, vec!["Combos", "Postres"]);
        assert_eq!(config.pwa.cache_name, "burger-bar-v3");
        assert_eq!(config.pwa.theme_color, "#050505");
        assert_eq!(config.content.logo.mode, LogoMode::Image);
        assert_eq!(config.content.logo.letter, "B");
        assert_eq!(config.content.logo.tagline, "SMASH BURGERS");
    }

    #[test]
    fn test_rejects_bad_country_code() {
        let result = parse_config("[whatsapp]\ncountry_code = \"+593\"\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_rejects_empty_category_defaults() {
        let result = parse_config("[store]\ndefault_categories = []\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_rejects_invalid_toml() {
        let result = parse_config("[store\nname = ");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
