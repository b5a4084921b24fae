//! Lookup metrics and observability.
//!
//! Counts how translation lookups were satisfied: directly from a catalog,
//! through a fallback, or not at all (the message id was rendered).

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Global lookup metrics singleton.
pub struct LookupMetrics {
    /// Lookups answered by the exact catalog entry
    hits: AtomicUsize,

    /// Lookups answered by a fallback (default context, `other` category,
    /// or the caller's literal template)
    fallbacks: AtomicUsize,

    /// Lookups that rendered the message id or caller template verbatim
    misses: AtomicUsize,

    /// Number of completed catalog reloads
    reloads: AtomicUsize,
}

/// Global metrics instance (initialized lazily)
static METRICS: OnceLock<LookupMetrics> = OnceLock::new();

impl LookupMetrics {
    /// Get the global lookup metrics instance.
    pub fn global() -> &'static LookupMetrics {
        METRICS.get_or_init(|| LookupMetrics {
            hits: AtomicUsize::new(0),
            fallbacks: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
            reloads: AtomicUsize::new(0),
        })
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reload(&self) {
        self.reloads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn fallbacks(&self) -> usize {
        self.fallbacks.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn reloads(&self) -> usize {
        self.reloads.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.hits();
        let fallbacks = self.fallbacks();
        let misses = self.misses();
        let total = hits + fallbacks + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            hits,
            fallbacks,
            misses,
            hit_rate,
            reloads: self.reloads(),
        }
    }
}

/// Snapshot of lookup statistics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub hits: usize,
    pub fallbacks: usize,
    pub misses: usize,

    /// Exact hits as a percentage of all lookups (0-100)
    pub hit_rate: f64,

    pub reloads: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> LookupMetrics {
        LookupMetrics {
            hits: AtomicUsize::new(0),
            fallbacks: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
            reloads: AtomicUsize::new(0),
        }
    }

    // ==================== Counter Tests ====================

    #[test]
    fn test_counters_increment() {
        let metrics = fresh();
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_fallback();
        metrics.record_miss();
        metrics.record_reload();

        assert_eq!(metrics.hits(), 2);
        assert_eq!(metrics.fallbacks(), 1);
        assert_eq!(metrics.misses(), 1);
        assert_eq!(metrics.reloads(), 1);
    }

    #[test]
    fn test_global_is_singleton() {
        assert!(std::ptr::eq(LookupMetrics::global(), LookupMetrics::global()));
    }

    // ==================== Report Tests ====================

    #[test]
    fn test_report_empty() {
        let report = fresh().report();
        assert_eq!(report.hits, 0);
        assert_eq!(report.hit_rate, 0.0);
    }

    #[test]
    fn test_report_hit_rate() {
        let metrics = fresh();
        for _ in 0..3 {
            metrics.record_hit();
        }
        metrics.record_miss();

        let report = metrics.report();
        assert_eq!(report.hit_rate, 75.0);
        assert_eq!(report.misses, 1);
    }

    #[test]
    fn test_report_serializes() {
        let json = serde_json::to_value(fresh().report()).unwrap();
        assert_eq!(json["hits"], 0);
        assert!(json.get("hit_rate").is_some());
    }
}
