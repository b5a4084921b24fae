//! Locale-aware value rendering seam.
//!
//! Number, currency and calendar formatting per locale needs CLDR data, which
//! this crate does not carry. Callers plug a formatting library in behind
//! [`ValueFormatter`]; [`InvariantFormatter`] is the language-neutral default.

use chrono::{DateTime, NaiveDate, Utc};

/// A value to render for a locale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormatValue<'a> {
    Number(f64),
    /// Fraction, `0.85` renders as 85%.
    Percent(f64),
    Currency { amount: f64, currency: &'a str },
    MediumDate(NaiveDate),
    ShortDate(NaiveDate),
    DateTime(DateTime<Utc>),
    Time(DateTime<Utc>),
}

/// External formatting collaborator.
pub trait ValueFormatter: Send + Sync {
    fn format(&self, value: &FormatValue<'_>, locale: &str) -> String;
}

/// Renders every locale the same way: ISO dates, `.` decimals, no grouping.
#[derive(Debug, Default, Clone, Copy)]
pub struct InvariantFormatter;

impl ValueFormatter for InvariantFormatter {
    fn format(&self, value: &FormatValue<'_>, _locale: &str) -> String {
        match *value {
            FormatValue::Number(n) => n.to_string(),
            FormatValue::Percent(fraction) => format!("{}%", (fraction * 100.0).round()),
            FormatValue::Currency { amount, currency } => format!("{:.2} {}", amount, currency),
            FormatValue::MediumDate(date) => date.format("%Y-%m-%d").to_string(),
            FormatValue::ShortDate(date) => date.format("%y-%m-%d").to_string(),
            FormatValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
            FormatValue::Time(dt) => dt.format("%H:%M").to_string(),
        }
    }
}

fn render(formatter: &dyn ValueFormatter, value: Option<FormatValue<'_>>, locale: &str) -> String {
    value
        .map(|value| formatter.format(&value, locale))
        .unwrap_or_default()
}

pub fn format_price(formatter: &dyn ValueFormatter, locale: &str, amount: Option<f64>, currency: &str) -> String {
    render(formatter, amount.map(|amount| FormatValue::Currency { amount, currency }), locale)
}

pub fn format_weight(formatter: &dyn ValueFormatter, locale: &str, weight: Option<f64>) -> String {
    render(formatter, weight.map(FormatValue::Number), locale)
}

/// `value` is a fraction: pass `0.85` for 85%.
pub fn format_percentage(formatter: &dyn ValueFormatter, locale: &str, value: Option<f64>) -> String {
    render(formatter, value.map(FormatValue::Percent), locale)
}

pub fn format_delivery_date(formatter: &dyn ValueFormatter, locale: &str, date: Option<NaiveDate>) -> String {
    render(formatter, date.map(FormatValue::MediumDate), locale)
}

pub fn format_short_date(formatter: &dyn ValueFormatter, locale: &str, date: Option<NaiveDate>) -> String {
    render(formatter, date.map(FormatValue::ShortDate), locale)
}

pub fn format_order_datetime(formatter: &dyn ValueFormatter, locale: &str, dt: Option<DateTime<Utc>>) -> String {
    render(formatter, dt.map(FormatValue::DateTime), locale)
}

pub fn format_time_only(formatter: &dyn ValueFormatter, locale: &str, dt: Option<DateTime<Utc>>) -> String {
    render(formatter, dt.map(FormatValue::Time), locale)
}
