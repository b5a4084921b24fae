//! Catalog loading and the reloadable catalog store.
//!
//! Catalogs live at `<dir>/<locale>/LC_MESSAGES/messages.po`. Loading happens
//! at startup and on explicit reload only; the request path reads the current
//! [`CatalogSet`] through a lock-free snapshot.

use crate::i18n::catalog::{Catalog, CatalogError, CatalogSet};
use crate::i18n::locale::{LocaleResolver, SessionPolicy, SupportedLocales};
use crate::i18n::metrics::LookupMetrics;
use crate::i18n::po::parse_po;
use arc_swap::ArcSwap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where catalogs come from and which locales are configured.
#[derive(Debug, Clone)]
pub struct CatalogSource {
    pub dir: PathBuf,
    pub supported: SupportedLocales,
    pub default_locale: String,
    pub session_policy: SessionPolicy,
}

impl CatalogSource {
    /// Path of the catalog file for `locale`.
    pub fn catalog_path(&self, locale: &str) -> PathBuf {
        self.dir.join(locale).join("LC_MESSAGES").join("messages.po")
    }

    /// Hash of every catalog file's path and contents.
    ///
    /// Missing files hash as absent, so creating or deleting one also changes
    /// the fingerprint.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for locale in self.supported.iter() {
            let path = self.catalog_path(locale);
            path.hash(&mut hasher);
            std::fs::read(&path).ok().hash(&mut hasher);
        }
        hasher.finish()
    }
}

/// Result of loading every configured locale.
#[derive(Debug)]
pub struct LoadOutcome {
    pub set: CatalogSet,
    /// Locales whose catalog could not be loaded, with the reason.
    pub failures: Vec<(String, CatalogError)>,
}

/// Load a single locale's catalog.
///
/// A missing file is not an error: it yields `Ok(None)` and the locale serves
/// message ids verbatim.
pub fn load_catalog(source: &CatalogSource, locale: &str) -> Result<Option<Catalog>, CatalogError> {
    let path = source.catalog_path(locale);
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No catalog for '{}' at {}", locale, path.display());
            return Ok(None);
        }
        Err(e) => return Err(CatalogError::Io { path, source: e }),
    };
    let entries = parse_po(&text, &path)?;
    Ok(Some(Catalog::from_po_entries(locale, entries)))
}

/// Load every configured locale.
///
/// A locale whose catalog fails to load is dropped from the supported set
/// with a warning; the others still load.
pub fn load_catalogs(source: &CatalogSource) -> LoadOutcome {
    if !source.dir.exists() {
        warn!(
            "Translations directory not found at {}; serving message ids",
            source.dir.display()
        );
    }

    let mut catalogs = Vec::new();
    let mut failures = Vec::new();
    for locale in source.supported.iter() {
        match load_catalog(source, locale) {
            Ok(Some(catalog)) => {
                debug!("Loaded {} entries for '{}'", catalog.len(), locale);
                catalogs.push(catalog);
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Excluding locale '{}': {}", locale, e);
                failures.push((locale.to_string(), e));
            }
        }
    }

    let excluded: Vec<String> = failures.iter().map(|(locale, _)| locale.clone()).collect();
    let resolver = LocaleResolver::new(
        source.supported.without(&excluded),
        source.default_locale.clone(),
        source.session_policy,
    );

    LoadOutcome {
        set: CatalogSet::new(resolver, catalogs),
        failures,
    }
}

/// Holds the current catalog set and swaps it atomically on reload.
///
/// Readers call [`CatalogStore::snapshot`] once per request and keep the
/// returned `Arc` for the whole request, so they see either the old or the
/// new set, never a mix.
pub struct CatalogStore {
    source: CatalogSource,
    current: ArcSwap<CatalogSet>,
    fingerprint: AtomicU64,
}

impl CatalogStore {
    /// Load catalogs from `source` and build the store.
    pub fn open(source: CatalogSource) -> Self {
        let fingerprint = source.fingerprint();
        let outcome = load_catalogs(&source);
        info!(
            "Loaded {} catalogs; serving locales: {:?}",
            outcome.set.catalogs().count(),
            outcome.set.supported().iter().collect::<Vec<_>>()
        );
        Self {
            source,
            current: ArcSwap::from_pointee(outcome.set),
            fingerprint: AtomicU64::new(fingerprint),
        }
    }

    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    /// The current catalog set.
    pub fn snapshot(&self) -> Arc<CatalogSet> {
        self.current.load_full()
    }

    /// Reload every catalog and swap the new set in.
    pub fn reload(&self) -> Arc<CatalogSet> {
        let fingerprint = self.source.fingerprint();
        let outcome = load_catalogs(&self.source);
        let set = Arc::new(outcome.set);
        self.current.store(Arc::clone(&set));
        self.fingerprint.store(fingerprint, Ordering::Release);
        LookupMetrics::global().record_reload();
        info!(
            "Reloaded catalogs ({} failures); serving locales: {:?}",
            outcome.failures.len(),
            set.supported().iter().collect::<Vec<_>>()
        );
        set
    }

    /// Reload only if any catalog file changed since the last load.
    ///
    /// Returns `true` when a reload happened.
    pub fn reload_if_changed(&self) -> bool {
        let fingerprint = self.source.fingerprint();
        if fingerprint == self.fingerprint.load(Ordering::Acquire) {
            return false;
        }
        self.reload();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_catalog(dir: &Path, locale: &str, contents: &str) -> std::io::Result<PathBuf> {
        let messages_dir = dir.join(locale).join("LC_MESSAGES");
        std::fs::create_dir_all(&messages_dir)?;
        let path = messages_dir.join("messages.po");
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    const RU_PO: &str = r#"
msgid "Just now"
msgstr "Только что"

msgctxt "action"
msgid "open"
msgstr "открыть"
"#;

    fn source(dir: &Path) -> CatalogSource {
        CatalogSource {
            dir: dir.to_path_buf(),
            supported: SupportedLocales::new(["en", "ru", "mn"]),
            default_locale: "en".to_string(),
            session_policy: SessionPolicy::Trust,
        }
    }

    // ==================== Loading Tests ====================

    #[test]
    fn test_load_catalogs_reads_available_locales() {
        let temp = TempDir::new().unwrap();
        write_catalog(temp.path(), "ru", RU_PO).unwrap();

        let outcome = load_catalogs(&source(temp.path()));
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.set.supported().len(), 3);
        assert_eq!(outcome.set.translator("ru").gettext("Just now"), "Только что");
        assert_eq!(outcome.set.translator("mn").gettext("Just now"), "Just now");
    }

    #[test]
    fn test_malformed_catalog_excludes_locale() {
        let temp = TempDir::new().unwrap();
        write_catalog(temp.path(), "ru", RU_PO).unwrap();
        write_catalog(temp.path(), "mn", "msgid \"broken\n").unwrap();

        let outcome = load_catalogs(&source(temp.path()));
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, "mn");
        assert!(matches!(outcome.failures[0].1, CatalogError::Parse { .. }));
        assert!(!outcome.set.supported().contains("mn"));
        assert!(outcome.set.supported().contains("ru"));
    }

    #[test]
    fn test_missing_directory_loads_empty_set() {
        let temp = TempDir::new().unwrap();
        let outcome = load_catalogs(&source(&temp.path().join("nope")));
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.set.catalogs().count(), 0);
    }

    // ==================== Store Tests ====================

    #[test]
    fn test_reload_swaps_whole_set() {
        let temp = TempDir::new().unwrap();
        write_catalog(temp.path(), "ru", RU_PO).unwrap();
        let store = CatalogStore::open(source(temp.path()));

        let before = store.snapshot();
        write_catalog(temp.path(), "ru", "msgid \"Just now\"\nmsgstr \"Сейчас\"\n").unwrap();
        store.reload();

        // The old snapshot is untouched.
        assert_eq!(before.translator("ru").gettext("Just now"), "Только что");
        assert_eq!(store.snapshot().translator("ru").gettext("Just now"), "Сейчас");
    }

    #[test]
    fn test_reload_if_changed() {
        let temp = TempDir::new().unwrap();
        write_catalog(temp.path(), "ru", RU_PO).unwrap();
        let store = CatalogStore::open(source(temp.path()));

        assert!(!store.reload_if_changed());

        write_catalog(temp.path(), "mn", "msgid \"Just now\"\nmsgstr \"Дөнгөж сая\"\n").unwrap();
        assert!(store.reload_if_changed());
        assert_eq!(store.snapshot().translator("mn").gettext("Just now"), "Дөнгөж сая");
        assert!(!store.reload_if_changed());
    }

    #[test]
    fn test_same_length_edit_is_detected() {
        let temp = TempDir::new().unwrap();
        write_catalog(temp.path(), "ru", "msgid \"a\"\nmsgstr \"один\"\n").unwrap();
        let store = CatalogStore::open(source(temp.path()));

        write_catalog(temp.path(), "ru", "msgid \"a\"\nmsgstr \"нуль\"\n").unwrap();
        assert!(store.reload_if_changed());
        assert_eq!(store.snapshot().translator("ru").gettext("a"), "нуль");
    }
}
