use prometheus::{Encoder, IntCounter, Opts, Registry, TextEncoder};
use std::sync::Arc;

#[derive(Clone)]
pub struct Metrics {
    pub full_scans: IntCounter,
    pub incremental_flushes: IntCounter,
    pub fallbacks: IntCounter,
    pub rows_matched: IntCounter,
    pub results_emitted: IntCounter,
    registry: Arc<Registry>,
}

fn counter(registry: &Registry, name: &str, help: &str) -> prometheus::Result<IntCounter> {
    let counter = IntCounter::with_opts(Opts::new(name, help))?;
    registry.register(Box::new(counter.clone()))?;
    Ok(counter)
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();
        Ok(Metrics {
            full_scans: counter(&registry, "full_scans", "Number of full table scans")?,
            incremental_flushes: counter(
                &registry,
                "incremental_flushes",
                "Number of pending-edit flushes applied without a rescan",
            )?,
            fallbacks: counter(
                &registry,
                "fallbacks",
                "Number of flushes that fell back to a full scan",
            )?,
            rows_matched: counter(&registry, "rows_matched", "Number of rows evaluated")?,
            results_emitted: counter(
                &registry,
                "results_emitted",
                "Number of cell results produced",
            )?,
            registry: Arc::new(registry),
        })
    }

    pub fn gather(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if encoder.encode(&metric_families, &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_lists_counters() {
        let metrics = Metrics::new().unwrap();
        metrics.full_scans.inc();
        metrics.rows_matched.inc_by(3);
        let text = metrics.gather();
        assert!(text.contains("full_scans 1"));
        assert!(text.contains("rows_matched 3"));
        assert!(text.contains("fallbacks 0"));
    }
}
