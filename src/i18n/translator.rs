//! Per-request formatting handle.
//!
//! A [`Translator`] pairs the resolved locale with the catalog chosen for it.
//! Every formatting call goes through it explicitly; nothing reads ambient
//! "current locale" state. None of these methods fail: missing translations
//! degrade to fallbacks and, last of all, to the message id itself.

use crate::i18n::catalog::Catalog;
use crate::i18n::metrics::LookupMetrics;
use crate::i18n::plural::{PluralCategory, PluralRule};
use crate::i18n::time;
use chrono::{DateTime, Utc};
use regex::{Captures, Regex};
use std::sync::OnceLock;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

/// Matches the numeric placeholder forms a template may carry, plus `%%`.
pub(crate) fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX.get_or_init(|| Regex::new(r"%%|%\(\w+\)d|%d|\{count\}").unwrap())
}

/// Substitute `count` into every numeric placeholder of `template`.
///
/// Recognized placeholders are `%d`, `%(name)d` and `{count}`; `%%` renders
/// as a literal percent sign.
pub fn substitute_count(template: &str, count: u64) -> String {
    placeholder_regex()
        .replace_all(template, |caps: &Captures<'_>| {
            if &caps[0] == "%%" {
                "%".to_string()
            } else {
                count.to_string()
            }
        })
        .into_owned()
}

/// Formatting handle for one locale.
#[derive(Debug, Clone)]
pub struct Translator<'a> {
    locale: String,
    catalog: Option<&'a Catalog>,
    rule: PluralRule,
}

impl<'a> Translator<'a> {
    /// Build a handle. The plural rule follows the catalog in use, or the
    /// requested locale when there is no catalog.
    pub fn new(locale: &str, catalog: Option<&'a Catalog>) -> Self {
        let rule = catalog
            .map(Catalog::rule)
            .unwrap_or_else(|| PluralRule::for_locale(locale));
        Self {
            locale: locale.to_string(),
            catalog,
            rule,
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn rule(&self) -> PluralRule {
        self.rule
    }

    /// The category this handle would pick for `count`.
    pub fn select_category(&self, count: u64) -> PluralCategory {
        self.rule.select(count)
    }

    fn find(&self, context: Option<&str>, msgid: &str, category: PluralCategory) -> Option<&'a str> {
        self.catalog?.get(context, msgid, category)
    }

    /// Translate `msgid` within `context`.
    ///
    /// Falls back to the entry without context, then to `msgid` itself.
    ///
    /// # Example
    /// ```
    /// use market_i18n::i18n::{Catalog, Translator};
    ///
    /// let mut ru = Catalog::new("ru");
    /// ru.insert_message(Some("store_status"), "open", "открыт");
    /// ru.insert_message(Some("action"), "open", "открыть");
    ///
    /// let t = Translator::new("ru", Some(&ru));
    /// assert_eq!(t.lookup("store_status", "open"), "открыт");
    /// assert_eq!(t.lookup("action", "open"), "открыть");
    /// assert_eq!(t.lookup("action", "close"), "close");
    /// ```
    pub fn lookup(&self, context: &str, msgid: &str) -> String {
        let metrics = LookupMetrics::global();
        if let Some(found) = self.find(Some(context), msgid, PluralCategory::Other) {
            metrics.record_hit();
            return found.to_string();
        }
        if let Some(found) = self.find(None, msgid, PluralCategory::Other) {
            metrics.record_fallback();
            return found.to_string();
        }
        metrics.record_miss();
        msgid.to_string()
    }

    /// Translate `msgid` in the default context.
    pub fn gettext(&self, msgid: &str) -> String {
        let metrics = LookupMetrics::global();
        match self.find(None, msgid, PluralCategory::Other) {
            Some(found) => {
                metrics.record_hit();
                found.to_string()
            }
            None => {
                metrics.record_miss();
                msgid.to_string()
            }
        }
    }

    /// Render a count with the plural form for this locale.
    ///
    /// `singular` is also the catalog key. Resolution order: the entry for the
    /// selected category, the entry for `other`, then the caller's templates
    /// (`singular` for a count of one, `plural` otherwise).
    ///
    /// # Example
    /// ```
    /// use market_i18n::i18n::{Catalog, Translator};
    ///
    /// let mut ru = Catalog::new("ru");
    /// ru.insert_plural("%d item", "%d items", &["%d товар", "%d товара", "%d товаров"]);
    ///
    /// let t = Translator::new("ru", Some(&ru));
    /// assert_eq!(t.pluralize("%d item", "%d items", 21), "21 товар");
    /// assert_eq!(t.pluralize("%d item", "%d items", 3), "3 товара");
    /// assert_eq!(t.pluralize("%d item", "%d items", 11), "11 товаров");
    /// ```
    pub fn pluralize(&self, singular: &str, plural: &str, count: u64) -> String {
        let metrics = LookupMetrics::global();
        let category = self.rule.select(count);

        let template = if let Some(found) = self.find(None, singular, category) {
            metrics.record_hit();
            found
        } else if let Some(found) = self.find(None, singular, PluralCategory::Other) {
            metrics.record_fallback();
            found
        } else {
            metrics.record_miss();
            if count == 1 {
                singular
            } else {
                plural
            }
        };

        substitute_count(template, count)
    }

    /// "5 products"
    pub fn format_product_count(&self, count: u64) -> String {
        self.pluralize("%(count)d product", "%(count)d products", count)
    }

    /// "3 deliveries"
    pub fn format_delivery_count(&self, count: u64) -> String {
        self.pluralize("%(count)d delivery", "%(count)d deliveries", count)
    }

    /// "2 returns"
    pub fn format_return_count(&self, count: u64) -> String {
        self.pluralize("%(count)d return", "%(count)d returns", count)
    }

    /// "10 items"
    pub fn format_item_count(&self, count: u64) -> String {
        self.pluralize("%(count)d item", "%(count)d items", count)
    }

    /// Relative time such as "2 hours ago". See [`time::time_ago`].
    pub fn time_ago(&self, target: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
        time::time_ago(self, target, now)
    }
}
