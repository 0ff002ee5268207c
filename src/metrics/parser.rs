//! Parser Phase Metrics
//!
//! Payloads parsed, games extracted, and units that failed to decode.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

/// Metrics collection for the Parser phase
pub struct ParserMetrics;

impl ParserMetrics {
    /// Record a successfully parsed payload
    pub fn record_parse_success(source_id: &str, games_produced: usize, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "parser", "payloads_processed"), "source" => source_id.to_string())
            .increment(1);
        ::metrics::counter!(phase_metric!(counter, "parser", "games_produced"), "source" => source_id.to_string())
            .increment(games_produced as u64);
        ::metrics::histogram!(phase_metric!(histogram, "parser", "duration_seconds"))
            .record(duration_secs);
    }

    /// Record a payload that could not be parsed at all
    pub fn record_parse_error(source_id: &str, error_type: &str) {
        ::metrics::counter!(
            phase_metric!(counter, "parser", "errors"),
            "source" => source_id.to_string(),
            "error_type" => error_type.to_string()
        )
        .increment(1);
    }

    /// Record a single unit inside a payload that failed to decode
    pub fn record_record_error(source_id: &str, error_type: &str) {
        ::metrics::counter!(
            phase_metric!(counter, "parser", "record_errors"),
            "source" => source_id.to_string(),
            "error_type" => error_type.to_string()
        )
        .increment(1);
    }
}

impl PhaseMetrics for ParserMetrics {
    fn register_metrics() {
        use metrics::{counter, histogram};

        // Pre-register all metrics (bind to placeholders to satisfy must_use)
        let _ = counter!(phase_metric!(counter, "parser", "payloads_processed"));
        let _ = counter!(phase_metric!(counter, "parser", "games_produced"));
        let _ = counter!(phase_metric!(counter, "parser", "errors"));
        let _ = counter!(phase_metric!(counter, "parser", "record_errors"));
        let _ = histogram!(phase_metric!(histogram, "parser", "duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "parser"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "parser", "payloads_processed"),
                metric_type: MetricType::Counter,
                help: "Total number of raw payloads parsed",
                labels: vec!["source"],
            },
            MetricDoc {
                name: phase_metric!(counter, "parser", "games_produced"),
                metric_type: MetricType::Counter,
                help: "Total number of games extracted from payloads",
                labels: vec!["source"],
            },
            MetricDoc {
                name: phase_metric!(counter, "parser", "errors"),
                metric_type: MetricType::Counter,
                help: "Total number of payloads that failed to parse",
                labels: vec!["source", "error_type"],
            },
            MetricDoc {
                name: phase_metric!(counter, "parser", "record_errors"),
                metric_type: MetricType::Counter,
                help: "Total number of individual records that failed to decode",
                labels: vec!["source", "error_type"],
            },
            MetricDoc {
                name: phase_metric!(histogram, "parser", "duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Time spent parsing one payload",
                labels: vec![],
            },
        ]
    }
}
