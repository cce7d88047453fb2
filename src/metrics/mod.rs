// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for the order repository
// ============================================================================
//
// Tracks:
// - Orders created and pages served
// - Store operation latency per operation
// - Store failures by operation and error kind
// - Rejected requests by reason
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub orders_created: IntCounter,
    pub pages_served: IntCounter,
    pub orders_listed: IntCounter,
    pub store_operation_duration: HistogramVec,
    pub store_errors: IntCounterVec,
    pub requests_rejected: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let orders_created = IntCounter::new("orders_created_total", "Total orders persisted")?;
        registry.register(Box::new(orders_created.clone()))?;

        let pages_served =
            IntCounter::new("order_pages_served_total", "Total order pages returned")?;
        registry.register(Box::new(pages_served.clone()))?;

        let orders_listed = IntCounter::new(
            "orders_listed_total",
            "Total orders returned across all pages",
        )?;
        registry.register(Box::new(orders_listed.clone()))?;

        let store_operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "order_store_operation_duration_seconds",
                "Order store call duration",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["operation"],
        )?;
        registry.register(Box::new(store_operation_duration.clone()))?;

        let store_errors = IntCounterVec::new(
            Opts::new("order_store_errors_total", "Order store failures"),
            &["operation", "kind"],
        )?;
        registry.register(Box::new(store_errors.clone()))?;

        let requests_rejected = IntCounterVec::new(
            Opts::new(
                "order_requests_rejected_total",
                "Requests rejected before reaching the store",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(requests_rejected.clone()))?;

        Ok(Self {
            registry,
            orders_created,
            pages_served,
            orders_listed,
            store_operation_duration,
            store_errors,
            requests_rejected,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_store_call(&self, operation: &str, duration_secs: f64) {
        self.store_operation_duration
            .with_label_values(&[operation])
            .observe(duration_secs);
    }

    pub fn record_store_error(&self, operation: &str, kind: &str) {
        self.store_errors.with_label_values(&[operation, kind]).inc();
    }

    pub fn record_rejection(&self, reason: &str) {
        self.requests_rejected.with_label_values(&[reason]).inc();
    }

    pub fn record_page(&self, order_count: usize) {
        self.pages_served.inc();
        self.orders_listed.inc_by(order_count as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        metrics.orders_created.inc();
        assert!(!metrics.registry().gather().is_empty());
    }

    #[test]
    fn test_record_page() {
        let metrics = Metrics::new().unwrap();
        metrics.record_page(10);
        metrics.record_page(5);

        assert_eq!(metrics.pages_served.get(), 2);
        assert_eq!(metrics.orders_listed.get(), 15);
    }

    #[test]
    fn test_record_store_error() {
        let metrics = Metrics::new().unwrap();
        metrics.record_store_error("put", "throttled");
        metrics.record_store_error("put", "throttled");
        metrics.record_store_error("scan", "unavailable");

        assert_eq!(
            metrics.store_errors.with_label_values(&["put", "throttled"]).get(),
            2
        );

        let gathered = metrics.registry().gather();
        let errors = gathered
            .iter()
            .find(|m| m.name() == "order_store_errors_total")
            .unwrap();
        assert_eq!(errors.metric.len(), 2);
    }

    #[test]
    fn test_record_store_call() {
        let metrics = Metrics::new().unwrap();
        metrics.record_store_call("put", 0.02);

        let histogram = metrics.store_operation_duration.with_label_values(&["put"]);
        assert_eq!(histogram.get_sample_count(), 1);
    }
}
