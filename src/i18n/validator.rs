//! Catalog quality validation.
//!
//! Checks loaded catalogs for translations that would render wrong at runtime:
//! a dropped or invented count placeholder, or a plural entry missing a form
//! its locale's rule can select.

use crate::i18n::catalog::{Catalog, CatalogSet};
use crate::i18n::plural::PluralCategory;
use crate::i18n::translator::placeholder_regex;
use std::collections::BTreeSet;

/// Validation report containing errors and warnings about catalogs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Problems that produce wrong output
    pub errors: Vec<String>,

    /// Problems that degrade to a fallback
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Create a new empty validation report
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Check if the report has any errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check if the report has any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if the report is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for catalog quality.
pub struct CatalogValidator;

impl CatalogValidator {
    /// Validate every catalog in a set.
    pub fn validate(set: &CatalogSet) -> ValidationReport {
        let mut report = ValidationReport::new();
        let mut catalogs: Vec<&Catalog> = set.catalogs().collect();
        catalogs.sort_by(|a, b| a.locale().cmp(b.locale()));
        for catalog in catalogs {
            Self::validate_catalog(catalog, &mut report);
        }
        report
    }

    /// Validate one catalog, appending findings to `report`.
    pub fn validate_catalog(catalog: &Catalog, report: &mut ValidationReport) {
        let locale = catalog.locale();
        let mut entries: Vec<_> = catalog.entries().collect();
        entries.sort_by(|a, b| (a.context, a.msgid, a.category).cmp(&(b.context, b.msgid, b.category)));

        let mut plural_msgids = BTreeSet::new();
        for entry in &entries {
            let expected = Self::has_placeholder(entry.msgid)
                || catalog
                    .plural_id(entry.msgid)
                    .is_some_and(Self::has_placeholder);
            let found = Self::has_placeholder(entry.template);
            if expected != found {
                report.errors.push(format!(
                    "[{}] {}'{}' ({}): placeholder {} in translation '{}'",
                    locale,
                    context_label(entry.context),
                    entry.msgid,
                    entry.category,
                    if expected { "missing" } else { "unexpected" },
                    entry.template
                ));
            }
            if entry.context.is_none() && catalog.plural_id(entry.msgid).is_some() {
                plural_msgids.insert(entry.msgid);
            }
        }

        for msgid in plural_msgids {
            let missing: Vec<PluralCategory> = catalog
                .rule()
                .categories()
                .iter()
                .copied()
                .filter(|category| catalog.get(None, msgid, *category).is_none())
                .collect();
            if !missing.is_empty() {
                let names: Vec<&str> = missing.iter().map(PluralCategory::as_str).collect();
                report.warnings.push(format!(
                    "[{}] '{}': missing plural forms {}",
                    locale,
                    msgid,
                    names.join(", ")
                ));
            }
        }
    }

    /// Whether `text` carries a numeric placeholder (`%%` does not count).
    fn has_placeholder(text: &str) -> bool {
        placeholder_regex()
            .find_iter(text)
            .any(|m| m.as_str() != "%%")
    }
}

fn context_label(context: Option<&str>) -> String {
    context.map(|ctx| format!("{}|", ctx)).unwrap_or_default()
}
