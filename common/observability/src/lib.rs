use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct CancellationMetrics {
    pub registry: Registry,
    pub cancel_events_total: IntCounterVec,
    pub cancel_errors_total: IntCounterVec,
}

impl CancellationMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let cancel_events_total = IntCounterVec::new(
            Opts::new(
                "order_cancel_events_total",
                "Order cancel events handled, grouped by outcome"
            ),
            &["outcome"]
        )?;
        let cancel_errors_total = IntCounterVec::new(
            Opts::new(
                "order_cancel_errors_total",
                "Order cancel events that ended in a domain error, grouped by kind"
            ),
            &["kind"]
        )?;
        registry.register(Box::new(cancel_events_total.clone()))?;
        registry.register(Box::new(cancel_errors_total.clone()))?;
        Ok(CancellationMetrics { registry, cancel_events_total, cancel_errors_total })
    }

    pub fn record_outcome(&self, outcome: &str) {
        self.cancel_events_total.with_label_values(&[outcome]).inc();
    }

    pub fn record_error(&self, kind: &str) {
        self.cancel_events_total.with_label_values(&["error"]).inc();
        self.cancel_errors_total.with_label_values(&[kind]).inc();
    }

    /// Prometheus text exposition of everything in the registry.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
