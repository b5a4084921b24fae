//! Plural rules: mapping a cardinal count to a plural category.
//!
//! Each locale is served by one of three rules. The rule also fixes the order
//! in which a catalog's `msgstr[n]` forms map onto categories.

use std::fmt;

/// Grammatical plural category selected by a count.
///
/// Only `One`, `Few`, `Many` and `Other` are produced by the rules below;
/// `Zero` and `Two` exist so catalogs can name them without failing to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PluralCategory {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl PluralCategory {
    /// Get the CLDR tag for this category (e.g., "one", "few").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::One => "one",
            Self::Two => "two",
            Self::Few => "few",
            Self::Many => "many",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for PluralCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cardinal plural rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralRule {
    /// English-like: 1 is `one`, everything else is `other`.
    OneOther,
    /// Russian, Ukrainian, Belarusian: `one` / `few` / `many`.
    EastSlavic,
    /// No inflection by count: always `other`.
    Invariant,
}

impl PluralRule {
    /// Get the rule for a locale tag. Unknown locales get [`PluralRule::OneOther`].
    pub fn for_locale(locale: &str) -> PluralRule {
        match primary_subtag(locale).as_str() {
            "ru" | "uk" | "be" => PluralRule::EastSlavic,
            "zh" | "mn" | "ja" | "ko" | "vi" | "th" | "id" | "ms" => PluralRule::Invariant,
            _ => PluralRule::OneOther,
        }
    }

    /// Select the category for a count.
    pub fn select(&self, count: u64) -> PluralCategory {
        match self {
            PluralRule::OneOther => {
                if count == 1 {
                    PluralCategory::One
                } else {
                    PluralCategory::Other
                }
            }
            PluralRule::EastSlavic => {
                let (mod10, mod100) = (count % 10, count % 100);
                if mod10 == 1 && mod100 != 11 {
                    PluralCategory::One
                } else if (2..=4).contains(&mod10) && !(12..=14).contains(&mod100) {
                    PluralCategory::Few
                } else {
                    PluralCategory::Many
                }
            }
            PluralRule::Invariant => PluralCategory::Other,
        }
    }

    /// Categories this rule produces, in `msgstr[n]` index order.
    pub fn categories(&self) -> &'static [PluralCategory] {
        match self {
            PluralRule::OneOther => &[PluralCategory::One, PluralCategory::Other],
            PluralRule::EastSlavic => &[
                PluralCategory::One,
                PluralCategory::Few,
                PluralCategory::Many,
            ],
            PluralRule::Invariant => &[PluralCategory::Other],
        }
    }

    /// Map a `msgstr[index]` position to its category.
    ///
    /// Indices past the rule's last category return `None` (extra forms are
    /// ignored at load time).
    pub fn category_at(&self, index: usize) -> Option<PluralCategory> {
        self.categories().get(index).copied()
    }
}

/// Select the plural category for `count` in `locale`.
pub fn select_category(locale: &str, count: u64) -> PluralCategory {
    PluralRule::for_locale(locale).select(count)
}

/// Lowercased primary language subtag (`"ru-RU"` -> `"ru"`, `"zh_Hans"` -> `"zh"`).
pub(crate) fn primary_subtag(locale: &str) -> String {
    locale
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ==================== Rule Lookup Tests ====================

    #[test]
    fn test_rule_for_known_locales() {
        assert_eq!(PluralRule::for_locale("en"), PluralRule::OneOther);
        assert_eq!(PluralRule::for_locale("ru"), PluralRule::EastSlavic);
        assert_eq!(PluralRule::for_locale("ru-RU"), PluralRule::EastSlavic);
        assert_eq!(PluralRule::for_locale("mn"), PluralRule::Invariant);
        assert_eq!(PluralRule::for_locale("zh_CN"), PluralRule::Invariant);
    }

    #[test]
    fn test_unknown_locale_uses_default_rule() {
        assert_eq!(PluralRule::for_locale("xx"), PluralRule::OneOther);
        assert_eq!(PluralRule::for_locale(""), PluralRule::OneOther);
        assert_eq!(select_category("xx", 1), PluralCategory::One);
        assert_eq!(select_category("xx", 2), PluralCategory::Other);
    }

    // ==================== Category Selection Tests ====================

    #[test]
    fn test_russian_categories() {
        for n in [1, 21, 31] {
            assert_eq!(select_category("ru", n), PluralCategory::One, "n = {}", n);
        }
        for n in [2, 3, 4, 22, 23, 24] {
            assert_eq!(select_category("ru", n), PluralCategory::Few, "n = {}", n);
        }
        for n in [5, 11, 12, 13, 14, 25] {
            assert_eq!(select_category("ru", n), PluralCategory::Many, "n = {}", n);
        }
    }

    #[test]
    fn test_russian_zero_and_hundreds() {
        assert_eq!(select_category("ru", 0), PluralCategory::Many);
        assert_eq!(select_category("ru", 101), PluralCategory::One);
        assert_eq!(select_category("ru", 111), PluralCategory::Many);
        assert_eq!(select_category("ru", 112), PluralCategory::Many);
        assert_eq!(select_category("ru", 122), PluralCategory::Few);
    }

    #[test]
    fn test_english_categories() {
        assert_eq!(select_category("en", 1), PluralCategory::One);
        for n in [0, 2, 5, 11, 21, 101] {
            assert_eq!(select_category("en", n), PluralCategory::Other, "n = {}", n);
        }
    }

    #[test]
    fn test_invariant_categories() {
        for n in [0, 1, 2, 5, 21] {
            assert_eq!(select_category("mn", n), PluralCategory::Other);
            assert_eq!(select_category("zh", n), PluralCategory::Other);
        }
    }

    // ==================== Index Mapping Tests ====================

    #[test]
    fn test_category_at_follows_msgstr_order() {
        let rule = PluralRule::EastSlavic;
        assert_eq!(rule.category_at(0), Some(PluralCategory::One));
        assert_eq!(rule.category_at(1), Some(PluralCategory::Few));
        assert_eq!(rule.category_at(2), Some(PluralCategory::Many));
        assert_eq!(rule.category_at(3), None);
        assert_eq!(PluralRule::Invariant.category_at(0), Some(PluralCategory::Other));
    }

    #[test]
    fn test_category_display() {
        assert_eq!(PluralCategory::Few.to_string(), "few");
        assert_eq!(PluralCategory::Other.as_str(), "other");
    }

    proptest! {
        #[test]
        fn prop_selected_category_is_declared_by_rule(n in 0u64..1_000_000) {
            for rule in [PluralRule::OneOther, PluralRule::EastSlavic, PluralRule::Invariant] {
                prop_assert!(rule.categories().contains(&rule.select(n)));
            }
        }

        #[test]
        fn prop_east_slavic_depends_on_last_two_digits(n in 0u64..1_000_000) {
            prop_assert_eq!(
                PluralRule::EastSlavic.select(n),
                PluralRule::EastSlavic.select(n % 100 + 100)
            );
        }
    }
}
