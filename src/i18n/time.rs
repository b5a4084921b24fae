//! Relative timestamps ("3 days ago") and recency checks.
//!
//! Months and years use fixed 30-day and 365-day divisors. Timestamps without
//! an offset are taken as UTC; no local timezone is ever inferred.

use crate::i18n::translator::Translator;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};

pub const SECONDS_PER_MINUTE: i64 = 60;
pub const SECONDS_PER_HOUR: i64 = 3_600;
pub const SECONDS_PER_DAY: i64 = 86_400;
pub const SECONDS_PER_WEEK: i64 = 604_800;
pub const SECONDS_PER_MONTH: i64 = 2_592_000;
pub const SECONDS_PER_YEAR: i64 = 31_536_000;

/// Default pattern for [`format_timestamp`].
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Message id rendered for an absent timestamp.
pub const UNKNOWN_MSGID: &str = "Unknown";

/// Message id rendered for anything under a minute old (or in the future).
pub const JUST_NOW_MSGID: &str = "Just now";

/// Coarse age of a timestamp with the count for its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBucket {
    JustNow,
    Minutes(u64),
    Hours(u64),
    Days(u64),
    Weeks(u64),
    Months(u64),
    Years(u64),
}

impl TimeBucket {
    /// Pick the bucket for an elapsed time in seconds.
    ///
    /// Negative elapsed time (a target in the future) is `JustNow`.
    pub fn from_elapsed(elapsed_seconds: i64) -> TimeBucket {
        let count = |divisor: i64| (elapsed_seconds / divisor) as u64;
        if elapsed_seconds < SECONDS_PER_MINUTE {
            TimeBucket::JustNow
        } else if elapsed_seconds < SECONDS_PER_HOUR {
            TimeBucket::Minutes(count(SECONDS_PER_MINUTE))
        } else if elapsed_seconds < SECONDS_PER_DAY {
            TimeBucket::Hours(count(SECONDS_PER_HOUR))
        } else if elapsed_seconds < SECONDS_PER_WEEK {
            TimeBucket::Days(count(SECONDS_PER_DAY))
        } else if elapsed_seconds < SECONDS_PER_MONTH {
            TimeBucket::Weeks(count(SECONDS_PER_WEEK))
        } else if elapsed_seconds < SECONDS_PER_YEAR {
            TimeBucket::Months(count(SECONDS_PER_MONTH))
        } else {
            TimeBucket::Years(count(SECONDS_PER_YEAR))
        }
    }

    /// Singular/plural message ids for this bucket, `None` for `JustNow`.
    pub fn templates(&self) -> Option<(&'static str, &'static str)> {
        match self {
            TimeBucket::JustNow => None,
            TimeBucket::Minutes(_) => Some(("%(num)d minute ago", "%(num)d minutes ago")),
            TimeBucket::Hours(_) => Some(("%(num)d hour ago", "%(num)d hours ago")),
            TimeBucket::Days(_) => Some(("%(num)d day ago", "%(num)d days ago")),
            TimeBucket::Weeks(_) => Some(("%(num)d week ago", "%(num)d weeks ago")),
            TimeBucket::Months(_) => Some(("%(num)d month ago", "%(num)d months ago")),
            TimeBucket::Years(_) => Some(("%(num)d year ago", "%(num)d years ago")),
        }
    }

    pub fn count(&self) -> Option<u64> {
        match *self {
            TimeBucket::JustNow => None,
            TimeBucket::Minutes(n)
            | TimeBucket::Hours(n)
            | TimeBucket::Days(n)
            | TimeBucket::Weeks(n)
            | TimeBucket::Months(n)
            | TimeBucket::Years(n) => Some(n),
        }
    }
}

/// Treat an offset-less timestamp as UTC.
pub fn assume_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    naive.and_utc()
}

/// Whole seconds from `target` to `now`; negative when `target` is later.
pub fn elapsed_seconds(target: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    now.signed_duration_since(target).num_seconds()
}

/// Render how long ago `target` was, relative to `now`.
pub fn time_ago(translator: &Translator<'_>, target: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(target) = target else {
        return translator.gettext(UNKNOWN_MSGID);
    };

    let bucket = TimeBucket::from_elapsed(elapsed_seconds(target, now));
    match (bucket.templates(), bucket.count()) {
        (Some((singular, plural)), Some(count)) => translator.pluralize(singular, plural, count),
        _ => translator.gettext(JUST_NOW_MSGID),
    }
}

/// Whether `target` lies less than `threshold_days` days before `now`.
///
/// There is no lower bound: a future `target` counts as recent. An absent
/// target is never recent.
pub fn is_recent(target: Option<DateTime<Utc>>, now: DateTime<Utc>, threshold_days: u32) -> bool {
    match target {
        Some(target) => now.signed_duration_since(target) < Duration::days(i64::from(threshold_days)),
        None => false,
    }
}

/// Format `target` with an strftime `pattern`, not locale-aware.
///
/// Returns an empty string for an absent target or an invalid pattern.
pub fn format_timestamp(target: Option<DateTime<Utc>>, pattern: &str) -> String {
    let Some(target) = target else {
        return String::new();
    };
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return String::new();
    }
    target.format_with_items(items.iter()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::catalog::Catalog;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn ago(seconds: i64) -> Option<DateTime<Utc>> {
        Some(now() - Duration::seconds(seconds))
    }

    fn english() -> Translator<'static> {
        Translator::new("en", None)
    }

    // ==================== Bucket Tests ====================

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(TimeBucket::from_elapsed(0), TimeBucket::JustNow);
        assert_eq!(TimeBucket::from_elapsed(59), TimeBucket::JustNow);
        assert_eq!(TimeBucket::from_elapsed(60), TimeBucket::Minutes(1));
        assert_eq!(TimeBucket::from_elapsed(3_599), TimeBucket::Minutes(59));
        assert_eq!(TimeBucket::from_elapsed(3_600), TimeBucket::Hours(1));
        assert_eq!(TimeBucket::from_elapsed(86_399), TimeBucket::Hours(23));
        assert_eq!(TimeBucket::from_elapsed(86_400), TimeBucket::Days(1));
        assert_eq!(TimeBucket::from_elapsed(604_799), TimeBucket::Days(6));
        assert_eq!(TimeBucket::from_elapsed(604_800), TimeBucket::Weeks(1));
        assert_eq!(TimeBucket::from_elapsed(2_591_999), TimeBucket::Weeks(4));
        assert_eq!(TimeBucket::from_elapsed(2_592_000), TimeBucket::Months(1));
        assert_eq!(TimeBucket::from_elapsed(31_535_999), TimeBucket::Months(12));
        assert_eq!(TimeBucket::from_elapsed(31_536_000), TimeBucket::Years(1));
        assert_eq!(TimeBucket::from_elapsed(3 * 31_536_000), TimeBucket::Years(3));
    }

    #[test]
    fn test_future_is_just_now() {
        assert_eq!(TimeBucket::from_elapsed(-1), TimeBucket::JustNow);
        assert_eq!(TimeBucket::from_elapsed(-10 * SECONDS_PER_YEAR), TimeBucket::JustNow);
        assert_eq!(english().time_ago(ago(-7_200), now()), "Just now");
    }

    // ==================== time_ago Tests ====================

    #[test]
    fn test_time_ago_english_boundaries() {
        let t = english();
        assert_eq!(t.time_ago(ago(59), now()), "Just now");
        assert_eq!(t.time_ago(ago(60), now()), "1 minute ago");
        assert_eq!(t.time_ago(ago(3_599), now()), "59 minutes ago");
        assert_eq!(t.time_ago(ago(3_600), now()), "1 hour ago");
        assert_eq!(t.time_ago(ago(86_399), now()), "23 hours ago");
        assert_eq!(t.time_ago(ago(86_400), now()), "1 day ago");
        assert_eq!(t.time_ago(ago(2 * SECONDS_PER_WEEK), now()), "2 weeks ago");
        assert_eq!(t.time_ago(ago(SECONDS_PER_MONTH), now()), "1 month ago");
        assert_eq!(t.time_ago(ago(2 * SECONDS_PER_YEAR), now()), "2 years ago");
    }

    #[test]
    fn test_time_ago_absent_target() {
        assert_eq!(english().time_ago(None, now()), "Unknown");
    }

    #[test]
    fn test_time_ago_russian_plurals() {
        let mut catalog = Catalog::new("ru");
        catalog.insert_plural(
            "%(num)d minute ago",
            "%(num)d minutes ago",
            &["%(num)d минуту назад", "%(num)d минуты назад", "%(num)d минут назад"],
        );
        catalog.insert_message(None, JUST_NOW_MSGID, "Только что");
        let t = Translator::new("ru", Some(&catalog));

        assert_eq!(t.time_ago(ago(60), now()), "1 минуту назад");
        assert_eq!(t.time_ago(ago(3 * 60), now()), "3 минуты назад");
        assert_eq!(t.time_ago(ago(11 * 60), now()), "11 минут назад");
        assert_eq!(t.time_ago(ago(21 * 60), now()), "21 минуту назад");
        assert_eq!(t.time_ago(ago(5), now()), "Только что");
        // No hour entries: caller templates.
        assert_eq!(t.time_ago(ago(2 * 3_600), now()), "2 hours ago");
    }

    #[test]
    fn test_naive_timestamp_is_utc() {
        let naive = now().naive_utc() - Duration::minutes(5);
        assert_eq!(english().time_ago(Some(assume_utc(naive)), now()), "5 minutes ago");
    }

    // ==================== is_recent Tests ====================

    #[test]
    fn test_is_recent_thresholds() {
        assert!(is_recent(ago(3 * SECONDS_PER_DAY), now(), 7));
        assert!(!is_recent(ago(10 * SECONDS_PER_DAY), now(), 7));
        assert!(!is_recent(ago(2 * SECONDS_PER_DAY), now(), 1));
        assert!(!is_recent(ago(7 * SECONDS_PER_DAY), now(), 7));
        assert!(is_recent(ago(7 * SECONDS_PER_DAY - 1), now(), 7));
    }

    #[test]
    fn test_is_recent_future_and_absent() {
        assert!(is_recent(ago(-30 * SECONDS_PER_DAY), now(), 7));
        assert!(is_recent(ago(-1), now(), 0));
        assert!(!is_recent(None, now(), 7));
    }

    // ==================== format_timestamp Tests ====================

    #[test]
    fn test_format_timestamp() {
        let dt = Utc.with_ymd_and_hms(2023, 12, 25, 14, 30, 0).unwrap();
        assert_eq!(format_timestamp(Some(dt), DEFAULT_TIMESTAMP_FORMAT), "2023-12-25 14:30");
        assert_eq!(format_timestamp(Some(dt), "%d/%m/%Y"), "25/12/2023");
        assert_eq!(format_timestamp(None, DEFAULT_TIMESTAMP_FORMAT), "");
        assert_eq!(format_timestamp(Some(dt), "%Q"), "");
    }
}
