//! Internationalization (i18n) core.
//!
//! Per request, a locale is resolved from competing signals and all
//! count-sensitive and context-sensitive text is rendered through an explicit
//! [`Translator`] handle. Nothing on the request path blocks or does I/O.
//!
//! # Architecture
//!
//! - `locale`: 4-tier locale resolution and `Accept-Language` negotiation
//! - `plural`: cardinal plural rules (count -> category)
//! - `po`: gettext `.po` parser
//! - `catalog`: per-locale translation catalogs and the shared catalog set
//! - `loader`: catalog loading and the atomically reloadable store
//! - `translator`: contextual lookup and plural rendering
//! - `time`: relative timestamps ("3 days ago") and recency checks
//! - `values`: seam for locale-aware number/date/currency rendering
//! - `validator`: catalog quality validation
//! - `metrics`: lookup observability
//!
//! # Example
//!
//! ```rust,ignore
//! use market_i18n::i18n::{CatalogStore, RequestSignals, parse_accept_language};
//!
//! let store = CatalogStore::open(source);
//! let catalogs = store.snapshot();
//!
//! let resolution = catalogs.resolver().resolve(&RequestSignals {
//!     override_param: None,
//!     session_locale: None,
//!     accepted_languages: parse_accept_language("ru-RU,ru;q=0.9"),
//! });
//!
//! let t = catalogs.translator(&resolution.locale);
//! t.format_product_count(5);        // "5 продуктов"
//! t.lookup("action", "open");       // "открыть"
//! ```

mod catalog;
mod loader;
mod locale;
mod metrics;
mod plural;
mod po;
mod time;
mod translator;
mod validator;
mod values;

pub use catalog::{Catalog, CatalogError, CatalogSet, EntryRef};
pub use loader::{load_catalog, load_catalogs, CatalogSource, CatalogStore, LoadOutcome};
pub use locale::{
    parse_accept_language, resolve_locale, LanguagePreference, LocaleResolver, LocaleSource,
    RequestSignals, Resolution, SessionPolicy, SessionWrite, SupportedLocales, SESSION_LOCALE_KEY,
};
pub use metrics::{LookupMetrics, MetricsReport};
pub use plural::{select_category, PluralCategory, PluralRule};
pub use po::{parse_po, PoEntry};
pub use time::{
    assume_utc, elapsed_seconds, format_timestamp, is_recent, TimeBucket, DEFAULT_TIMESTAMP_FORMAT,
};
pub use translator::{substitute_count, Translator};
pub use validator::{CatalogValidator, ValidationReport};
pub use values::{
    format_delivery_date, format_order_datetime, format_percentage, format_price,
    format_short_date, format_time_only, format_weight, FormatValue, InvariantFormatter,
    ValueFormatter,
};
