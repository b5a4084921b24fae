//! Translation catalogs.
//!
//! A [`Catalog`] holds one locale's entries keyed by (context, msgid, plural
//! category). A [`CatalogSet`] bundles every loaded catalog with the locale
//! resolver built from the locales that actually loaded; it is immutable and
//! shared as `Arc<CatalogSet>`.

use crate::i18n::locale::{LocaleResolver, SupportedLocales};
use crate::i18n::plural::{primary_subtag, PluralCategory, PluralRule};
use crate::i18n::po::PoEntry;
use crate::i18n::translator::Translator;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a catalog from disk.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

type Forms = BTreeMap<PluralCategory, String>;

/// A borrowed view of one catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryRef<'a> {
    pub context: Option<&'a str>,
    pub msgid: &'a str,
    pub category: PluralCategory,
    pub template: &'a str,
}

/// Compiled translations for one locale.
#[derive(Debug, Clone)]
pub struct Catalog {
    locale: String,
    rule: PluralRule,
    /// Entries without a `msgctxt`.
    default_context: HashMap<String, Forms>,
    /// Entries per named context.
    contexts: HashMap<String, HashMap<String, Forms>>,
    /// Plural entries: msgid -> msgid_plural.
    plural_ids: HashMap<String, String>,
}

impl Catalog {
    /// Create an empty catalog using the plural rule of `locale`.
    pub fn new(locale: &str) -> Self {
        Self {
            locale: locale.to_string(),
            rule: PluralRule::for_locale(locale),
            default_context: HashMap::new(),
            contexts: HashMap::new(),
            plural_ids: HashMap::new(),
        }
    }

    /// Build a catalog from parsed `.po` entries.
    ///
    /// The header, fuzzy entries and empty translations are skipped, matching
    /// what the gettext compiler emits. Plural forms map onto categories in the
    /// order of the locale's rule; surplus forms are dropped.
    pub fn from_po_entries(locale: &str, entries: Vec<PoEntry>) -> Self {
        let mut catalog = Self::new(locale);
        for entry in entries {
            if entry.is_header() || entry.fuzzy {
                continue;
            }
            let context = entry.context.as_deref();
            match entry.msgid_plural {
                Some(ref plural_id) => {
                    for (index, template) in entry.msgstr.iter().enumerate() {
                        if let Some(category) = catalog.rule.category_at(index) {
                            catalog.insert(context, &entry.msgid, category, template);
                        }
                    }
                    catalog
                        .plural_ids
                        .insert(entry.msgid.clone(), plural_id.clone());
                }
                None => {
                    if let Some(template) = entry.msgstr.first() {
                        catalog.insert(context, &entry.msgid, PluralCategory::Other, template);
                    }
                }
            }
        }
        catalog
    }

    /// Add a template. Empty templates are ignored.
    pub fn insert(
        &mut self,
        context: Option<&str>,
        msgid: &str,
        category: PluralCategory,
        template: &str,
    ) {
        if template.is_empty() {
            return;
        }
        let table = match context {
            None => &mut self.default_context,
            Some(ctx) => self.contexts.entry(ctx.to_string()).or_default(),
        };
        table
            .entry(msgid.to_string())
            .or_default()
            .insert(category, template.to_string());
    }

    /// Add a non-plural translation.
    pub fn insert_message(&mut self, context: Option<&str>, msgid: &str, translation: &str) {
        self.insert(context, msgid, PluralCategory::Other, translation);
    }

    /// Add a plural translation; `forms` follow the rule's category order.
    pub fn insert_plural(&mut self, msgid: &str, msgid_plural: &str, forms: &[&str]) {
        for (index, template) in forms.iter().enumerate() {
            if let Some(category) = self.rule.category_at(index) {
                self.insert(None, msgid, category, template);
            }
        }
        self.plural_ids
            .insert(msgid.to_string(), msgid_plural.to_string());
    }

    /// Exact lookup, no fallback.
    pub fn get(
        &self,
        context: Option<&str>,
        msgid: &str,
        category: PluralCategory,
    ) -> Option<&str> {
        let table = match context {
            None => &self.default_context,
            Some(ctx) => self.contexts.get(ctx)?,
        };
        table.get(msgid)?.get(&category).map(String::as_str)
    }

    /// The `msgid_plural` recorded for a plural entry.
    pub fn plural_id(&self, msgid: &str) -> Option<&str> {
        self.plural_ids.get(msgid).map(String::as_str)
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn rule(&self) -> PluralRule {
        self.rule
    }

    /// Number of stored templates.
    pub fn len(&self) -> usize {
        self.default_context.values().map(BTreeMap::len).sum::<usize>()
            + self
                .contexts
                .values()
                .flat_map(HashMap::values)
                .map(BTreeMap::len)
                .sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over every stored template.
    pub fn entries(&self) -> impl Iterator<Item = EntryRef<'_>> {
        let defaults = self
            .default_context
            .iter()
            .map(|(msgid, forms)| (None, msgid, forms));
        let named = self.contexts.iter().flat_map(|(ctx, table)| {
            table
                .iter()
                .map(move |(msgid, forms)| (Some(ctx.as_str()), msgid, forms))
        });
        defaults
            .chain(named)
            .flat_map(|(context, msgid, forms)| {
                forms.iter().map(move |(category, template)| EntryRef {
                    context,
                    msgid: msgid.as_str(),
                    category: *category,
                    template: template.as_str(),
                })
            })
    }
}

/// Every loaded catalog plus the resolver for the locales that loaded.
#[derive(Debug, Clone)]
pub struct CatalogSet {
    catalogs: HashMap<String, Catalog>,
    resolver: LocaleResolver,
}

impl CatalogSet {
    pub fn new(resolver: LocaleResolver, catalogs: Vec<Catalog>) -> Self {
        Self {
            catalogs: catalogs
                .into_iter()
                .map(|catalog| (normalize_key(catalog.locale()), catalog))
                .collect(),
            resolver,
        }
    }

    /// A set with no catalogs; every lookup renders its msgid.
    pub fn empty(resolver: LocaleResolver) -> Self {
        Self::new(resolver, Vec::new())
    }

    pub fn resolver(&self) -> &LocaleResolver {
        &self.resolver
    }

    pub fn supported(&self) -> &SupportedLocales {
        self.resolver.supported()
    }

    pub fn default_locale(&self) -> &str {
        self.resolver.default_locale()
    }

    /// The catalog for `locale`, trying the full tag then its primary subtag.
    pub fn catalog(&self, locale: &str) -> Option<&Catalog> {
        self.catalogs
            .get(&normalize_key(locale))
            .or_else(|| self.catalogs.get(&primary_subtag(locale)))
    }

    pub fn catalogs(&self) -> impl Iterator<Item = &Catalog> {
        self.catalogs.values()
    }

    /// A formatting handle for `locale`.
    ///
    /// Locales without a catalog borrow the default locale's catalog (and its
    /// plural rule). With no catalog at all, the requested locale's rule picks
    /// between the caller's literal templates.
    pub fn translator(&self, locale: &str) -> Translator<'_> {
        let catalog = self
            .catalog(locale)
            .or_else(|| self.catalog(self.default_locale()));
        Translator::new(locale, catalog)
    }
}

fn normalize_key(locale: &str) -> String {
    locale.trim().replace('_', "-").to_ascii_lowercase()
}
