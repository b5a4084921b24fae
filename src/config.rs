use crate::i18n::{CatalogSource, SessionPolicy, SupportedLocales};
use anyhow::{bail, Context, Result};
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::warn;

static LOCALE_TAG_REGEX: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Config {
    // Locales
    pub supported_locales: Vec<String>,
    pub default_locale: String,
    pub session_policy: SessionPolicy,

    // Catalogs
    pub catalog_dir: PathBuf,
    pub auto_reload_on_each_request: bool,

    // Server
    pub port: u16,
    pub admin_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build and validate a config from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            // Locales
            supported_locales: lookup("I18N_LANGUAGES")
                .map(|v| parse_list(&v))
                .unwrap_or_else(|| vec!["en".to_string()]),
            default_locale: lookup("I18N_DEFAULT_LOCALE")
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|| "en".to_string()),
            session_policy: match lookup("I18N_REVALIDATE_SESSION") {
                Some(v) if parse_bool(&v).context("I18N_REVALIDATE_SESSION")? => {
                    SessionPolicy::Revalidate
                }
                _ => SessionPolicy::Trust,
            },

            // Catalogs
            catalog_dir: lookup("I18N_TRANSLATIONS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./translations")),
            auto_reload_on_each_request: match lookup("I18N_REFRESH_EVERY_REQUEST") {
                Some(v) => parse_bool(&v).context("I18N_REFRESH_EVERY_REQUEST")?,
                None => false,
            },

            // Server
            port: match lookup("PORT") {
                Some(v) => v
                    .trim()
                    .parse()
                    .with_context(|| format!("PORT is not a valid port: {}", v))?,
                None => 8080,
            },
            admin_api_key: lookup("ADMIN_API_KEY").filter(|v| !v.trim().is_empty()),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.supported_locales.is_empty() {
            bail!("I18N_LANGUAGES must name at least one locale");
        }
        for tag in self.supported_locales.iter().chain(std::iter::once(&self.default_locale)) {
            if !is_valid_tag(tag) {
                bail!("Invalid locale tag: '{}'", tag);
            }
        }
        if !self.supported_locales.contains(&self.default_locale) {
            warn!(
                "Default locale '{}' is not in I18N_LANGUAGES {:?}; it is only used as a fallback",
                self.default_locale, self.supported_locales
            );
        }
        if self.auto_reload_on_each_request {
            warn!("Catalogs are re-checked on every request; use only in development");
        }
        Ok(())
    }

    /// Catalog source described by this config.
    pub fn catalog_source(&self) -> CatalogSource {
        CatalogSource {
            dir: self.catalog_dir.clone(),
            supported: SupportedLocales::new(self.supported_locales.iter().cloned()),
            default_locale: self.default_locale.clone(),
            session_policy: self.session_policy,
        }
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("expected a boolean, got '{}'", other),
    }
}

fn is_valid_tag(tag: &str) -> bool {
    let regex = LOCALE_TAG_REGEX
        .get_or_init(|| Regex::new(r"^[A-Za-z]{2,3}([-_][A-Za-z0-9]{2,8})*$").unwrap());
    regex.is_match(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    // ==================== Default Tests ====================

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.supported_locales, vec!["en"]);
        assert_eq!(config.default_locale, "en");
        assert_eq!(config.catalog_dir, PathBuf::from("./translations"));
        assert!(!config.auto_reload_on_each_request);
        assert_eq!(config.session_policy, SessionPolicy::Trust);
        assert_eq!(config.port, 8080);
        assert!(config.admin_api_key.is_none());
    }

    #[test]
    fn test_full_config() {
        let config = config_from(&[
            ("I18N_LANGUAGES", "en, ru,mn ,zh"),
            ("I18N_DEFAULT_LOCALE", "ru"),
            ("I18N_TRANSLATIONS_DIR", "/srv/translations"),
            ("I18N_REFRESH_EVERY_REQUEST", "true"),
            ("I18N_REVALIDATE_SESSION", "1"),
            ("PORT", "9000"),
            ("ADMIN_API_KEY", "secret"),
        ])
        .unwrap();
        assert_eq!(config.supported_locales, vec!["en", "ru", "mn", "zh"]);
        assert_eq!(config.default_locale, "ru");
        assert!(config.auto_reload_on_each_request);
        assert_eq!(config.session_policy, SessionPolicy::Revalidate);
        assert_eq!(config.port, 9000);
        assert_eq!(config.admin_api_key.as_deref(), Some("secret"));

        let source = config.catalog_source();
        assert_eq!(source.dir, PathBuf::from("/srv/translations"));
        assert_eq!(source.supported.len(), 4);
    }

    // ==================== Validation Tests ====================

    #[test]
    fn test_rejects_empty_language_list() {
        assert!(config_from(&[("I18N_LANGUAGES", " , ")]).is_err());
    }

    #[test]
    fn test_rejects_malformed_tags() {
        assert!(config_from(&[("I18N_LANGUAGES", "en,russian!")]).is_err());
        assert!(config_from(&[("I18N_DEFAULT_LOCALE", "")]).is_err());
    }

    #[test]
    fn test_rejects_bad_bool_and_port() {
        assert!(config_from(&[("I18N_REFRESH_EVERY_REQUEST", "maybe")]).is_err());
        assert!(config_from(&[("PORT", "http")]).is_err());
    }

    #[test]
    fn test_default_outside_supported_is_allowed() {
        let config = config_from(&[("I18N_LANGUAGES", "ru,mn"), ("I18N_DEFAULT_LOCALE", "en")]).unwrap();
        assert_eq!(config.default_locale, "en");
    }

    #[test]
    fn test_blank_admin_key_is_none() {
        let config = config_from(&[("ADMIN_API_KEY", "  ")]).unwrap();
        assert!(config.admin_api_key.is_none());
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var("I18N_LANGUAGES", "en,ru");
        std::env::set_var("PORT", "8181");
        let config = Config::from_env();
        std::env::remove_var("I18N_LANGUAGES");
        std::env::remove_var("PORT");

        let config = config.unwrap();
        assert_eq!(config.supported_locales, vec!["en", "ru"]);
        assert_eq!(config.port, 8181);
    }
}
