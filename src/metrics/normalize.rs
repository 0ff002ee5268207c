//! Normalize Phase Metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

/// Metrics collection for the Normalize phase
pub struct NormalizeMetrics;

impl NormalizeMetrics {
    pub fn record_normalized(source_id: &str) {
        ::metrics::counter!(phase_metric!(counter, "normalize", "records_normalized"), "source" => source_id.to_string())
            .increment(1);
    }

    /// Record a game left out of the output because its ending was unknown
    pub fn record_dropped(source_id: &str) {
        ::metrics::counter!(phase_metric!(counter, "normalize", "records_dropped"), "source" => source_id.to_string())
            .increment(1);
    }

    pub fn record_unclassified_ending(source_id: &str) {
        ::metrics::counter!(phase_metric!(counter, "normalize", "unclassified_endings"), "source" => source_id.to_string())
            .increment(1);
    }

    pub fn record_error(source_id: &str, error_type: &str) {
        ::metrics::counter!(
            phase_metric!(counter, "normalize", "errors"),
            "source" => source_id.to_string(),
            "error_type" => error_type.to_string()
        )
        .increment(1);
    }

    pub fn record_duration(duration_secs: f64) {
        ::metrics::histogram!(phase_metric!(histogram, "normalize", "duration_seconds"))
            .record(duration_secs);
    }
}

impl PhaseMetrics for NormalizeMetrics {
    fn register_metrics() {
        use metrics::{counter, histogram};

        let _ = counter!(phase_metric!(counter, "normalize", "records_normalized"));
        let _ = counter!(phase_metric!(counter, "normalize", "records_dropped"));
        let _ = counter!(phase_metric!(counter, "normalize", "unclassified_endings"));
        let _ = counter!(phase_metric!(counter, "normalize", "errors"));
        let _ = histogram!(phase_metric!(histogram, "normalize", "duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "normalize"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "normalize", "records_normalized"),
                metric_type: MetricType::Counter,
                help: "Games that came out of derivation as normalized records",
                labels: vec!["source"],
            },
            MetricDoc {
                name: phase_metric!(counter, "normalize", "records_dropped"),
                metric_type: MetricType::Counter,
                help: "Games dropped because their ending could not be classified",
                labels: vec!["source"],
            },
            MetricDoc {
                name: phase_metric!(counter, "normalize", "unclassified_endings"),
                metric_type: MetricType::Counter,
                help: "Games whose ending matched no known phrase",
                labels: vec!["source"],
            },
            MetricDoc {
                name: phase_metric!(counter, "normalize", "errors"),
                metric_type: MetricType::Counter,
                help: "Games that failed derivation",
                labels: vec!["source", "error_type"],
            },
            MetricDoc {
                name: phase_metric!(histogram, "normalize", "duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Time spent deriving fields for one game",
                labels: vec![],
            },
        ]
    }
}
