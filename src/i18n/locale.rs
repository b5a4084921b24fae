//! Locale resolution: picks the active locale for one request.
//!
//! Precedence, first match wins:
//!
//! 1. Explicit override (`?lang=ru`), when it names a supported locale.
//!    The caller is asked to persist it into the session.
//! 2. Sticky session value from an earlier override.
//! 3. `Accept-Language` negotiation against the supported locales.
//! 4. The configured default locale.
//!
//! Resolution never fails and never touches storage itself: the session write
//! comes back as data in [`Resolution::session_write`].

use crate::i18n::plural::primary_subtag;
use serde::Serialize;
use tracing::debug;

/// Session key under which an explicitly chosen locale is remembered.
pub const SESSION_LOCALE_KEY: &str = "lang";

/// Locale used when the configured default is empty.
const FALLBACK_LOCALE: &str = "en";

/// Ordered set of locales the application serves.
///
/// Order is the configured order and breaks negotiation ties (a `*` wildcard
/// selects the first entry). Duplicates are dropped on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedLocales {
    locales: Vec<String>,
}

impl SupportedLocales {
    pub fn new<I, S>(locales: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for locale in locales {
            let locale = locale.into().trim().to_string();
            if locale.is_empty() {
                continue;
            }
            if !unique.iter().any(|known| normalize(known) == normalize(&locale)) {
                unique.push(locale);
            }
        }
        Self { locales: unique }
    }

    /// Membership test: case-insensitive, `_` equals `-`.
    pub fn contains(&self, locale: &str) -> bool {
        self.canonical(locale).is_some()
    }

    /// The configured spelling of `locale` (`"RU"` -> `"ru"`), if supported.
    pub fn canonical(&self, locale: &str) -> Option<&str> {
        let wanted = normalize(locale);
        self.locales
            .iter()
            .find(|known| normalize(known) == wanted)
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.locales.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.locales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }

    /// Copy of this set with the given locales removed.
    pub fn without(&self, excluded: &[String]) -> Self {
        Self {
            locales: self
                .locales
                .iter()
                .filter(|locale| !excluded.contains(*locale))
                .cloned()
                .collect(),
        }
    }

    /// Find the best supported locale for an ordered preference list.
    ///
    /// A first pass over every preference looks for an exact tag match
    /// (case-insensitive, `_` equals `-`); only if none matches does a second
    /// pass compare primary subtags, so `en-US` negotiates against `en` and
    /// `zh` against `zh-CN`. Preferences with a weight of zero or less never
    /// match.
    pub fn negotiate(&self, preferences: &[LanguagePreference]) -> Option<&str> {
        let acceptable: Vec<&LanguagePreference> =
            preferences.iter().filter(|pref| pref.weight > 0.0).collect();

        for pref in &acceptable {
            if pref.tag.trim() == "*" {
                if let Some(first) = self.locales.first() {
                    return Some(first.as_str());
                }
                continue;
            }
            let wanted = normalize(&pref.tag);
            if let Some(found) = self.locales.iter().find(|known| normalize(known) == wanted) {
                return Some(found.as_str());
            }
        }

        for pref in &acceptable {
            let wanted = primary_subtag(&pref.tag);
            if wanted.is_empty() || wanted == "*" {
                continue;
            }
            if let Some(found) = self
                .locales
                .iter()
                .find(|known| primary_subtag(known) == wanted)
            {
                return Some(found.as_str());
            }
        }

        None
    }
}

/// One entry of an `Accept-Language` list.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguagePreference {
    pub tag: String,
    pub weight: f32,
}

impl LanguagePreference {
    pub fn new(tag: impl Into<String>, weight: f32) -> Self {
        Self {
            tag: tag.into(),
            weight,
        }
    }
}

/// Parse an `Accept-Language` header into preferences, highest weight first.
///
/// Entries keep their header order among equal weights. Entries with an
/// unparsable `q` value are dropped.
///
/// # Example
/// ```
/// use market_i18n::i18n::parse_accept_language;
///
/// let prefs = parse_accept_language("ru;q=0.8, en-US, mn;q=0.9");
/// let tags: Vec<&str> = prefs.iter().map(|p| p.tag.as_str()).collect();
/// assert_eq!(tags, vec!["en-US", "mn", "ru"]);
/// ```
pub fn parse_accept_language(header: &str) -> Vec<LanguagePreference> {
    let mut preferences: Vec<LanguagePreference> = header
        .split(',')
        .filter_map(|item| {
            let mut parts = item.split(';');
            let tag = parts.next()?.trim();
            if tag.is_empty() {
                return None;
            }

            let mut weight = 1.0f32;
            for param in parts {
                if let Some((key, value)) = param.split_once('=') {
                    if key.trim().eq_ignore_ascii_case("q") {
                        weight = value.trim().parse::<f32>().ok().filter(|q| q.is_finite())?;
                    }
                }
            }
            Some(LanguagePreference::new(tag, weight.clamp(0.0, 1.0)))
        })
        .collect();

    // sort_by is stable, so equal weights keep header order.
    preferences.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    preferences
}

/// What to do with a sticky session locale that is no longer supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPolicy {
    /// Use the stored value as-is; it was validated when it was written.
    #[default]
    Trust,
    /// Ignore stored values outside the supported set and keep resolving.
    Revalidate,
}

/// The request-scoped inputs to resolution.
#[derive(Debug, Clone, Default)]
pub struct RequestSignals {
    /// Explicit override, usually the `lang` query parameter.
    pub override_param: Option<String>,
    /// Value stored in the session under [`SESSION_LOCALE_KEY`].
    pub session_locale: Option<String>,
    /// Browser preferences, highest weight first.
    pub accepted_languages: Vec<LanguagePreference>,
}

/// Which tier produced the locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocaleSource {
    Override,
    Session,
    AcceptLanguage,
    Default,
}

/// Instruction for the caller to persist a value into the sticky session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionWrite {
    pub key: &'static str,
    pub value: String,
}

/// Outcome of resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub locale: String,
    pub source: LocaleSource,
    pub session_write: Option<SessionWrite>,
}

/// Resolves the active locale for a request.
#[derive(Debug, Clone)]
pub struct LocaleResolver {
    supported: SupportedLocales,
    default_locale: String,
    session_policy: SessionPolicy,
}

impl LocaleResolver {
    pub fn new(
        supported: SupportedLocales,
        default_locale: impl Into<String>,
        session_policy: SessionPolicy,
    ) -> Self {
        let default_locale = default_locale.into().trim().to_string();
        Self {
            supported,
            default_locale: if default_locale.is_empty() {
                FALLBACK_LOCALE.to_string()
            } else {
                default_locale
            },
            session_policy,
        }
    }

    pub fn supported(&self) -> &SupportedLocales {
        &self.supported
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// Run the four-tier resolution.
    pub fn resolve(&self, signals: &RequestSignals) -> Resolution {
        if let Some(requested) = signals.override_param.as_deref() {
            if let Some(locale) = self.supported.canonical(requested) {
                debug!("Locale set from override parameter: {}", locale);
                return Resolution {
                    locale: locale.to_string(),
                    source: LocaleSource::Override,
                    session_write: Some(SessionWrite {
                        key: SESSION_LOCALE_KEY,
                        value: locale.to_string(),
                    }),
                };
            }
            debug!("Ignoring unsupported locale override: {:?}", requested);
        }

        if let Some(stored) = signals.session_locale.as_deref().filter(|s| !s.is_empty()) {
            let accepted = match self.session_policy {
                SessionPolicy::Trust => Some(stored),
                SessionPolicy::Revalidate => self.supported.canonical(stored),
            };
            if let Some(locale) = accepted {
                debug!("Locale from session: {}", locale);
                return Resolution {
                    locale: locale.to_string(),
                    source: LocaleSource::Session,
                    session_write: None,
                };
            }
            debug!("Session locale {:?} is no longer supported", stored);
        }

        if let Some(best) = self.supported.negotiate(&signals.accepted_languages) {
            debug!("Locale from Accept-Language header: {}", best);
            return Resolution {
                locale: best.to_string(),
                source: LocaleSource::AcceptLanguage,
                session_write: None,
            };
        }

        debug!("Falling back to default locale '{}'", self.default_locale);
        Resolution {
            locale: self.default_locale.clone(),
            source: LocaleSource::Default,
            session_write: None,
        }
    }
}

/// Resolve a locale without building a [`LocaleResolver`] first.
pub fn resolve_locale(
    signals: &RequestSignals,
    supported: &SupportedLocales,
    default_locale: &str,
    session_policy: SessionPolicy,
) -> Resolution {
    LocaleResolver::new(supported.clone(), default_locale, session_policy).resolve(signals)
}

fn normalize(tag: &str) -> String {
    tag.trim().replace('_', "-").to_ascii_lowercase()
}
