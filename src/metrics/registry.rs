//! Registration of all phase metrics, with conflict detection

use crate::metrics::{MetricDoc, PhaseMetrics};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Register all metrics from all phases, returning how many distinct metrics exist
pub fn register_all_metrics() -> usize {
    let mut all_metrics = HashMap::new();

    register_phase_metrics::<super::parser::ParserMetrics>(&mut all_metrics);
    register_phase_metrics::<super::normalize::NormalizeMetrics>(&mut all_metrics);

    info!(
        "Registered {} total metrics across all phases",
        all_metrics.len()
    );
    for doc in all_metrics.values() {
        debug!(
            "metric {} [{}] {:?}: {}",
            doc.name,
            extract_phase_from_metric_name(doc.name),
            doc.metric_type,
            doc.help
        );
    }
    all_metrics.len()
}

/// Register metrics for a specific phase and detect conflicts
fn register_phase_metrics<T: PhaseMetrics>(all_metrics: &mut HashMap<&'static str, MetricDoc>) {
    T::register_metrics();
    let phase_name = T::phase_name();

    for doc in T::metrics_documentation() {
        if all_metrics.contains_key(doc.name) {
            warn!(
                "Metric name conflict detected: '{}' redefined by phase '{}'",
                doc.name, phase_name
            );
        } else {
            all_metrics.insert(doc.name, doc);
        }
    }
}

/// Extract phase name from metric name (e.g., "chess_parser_errors_total" -> "parser")
fn extract_phase_from_metric_name(metric_name: &str) -> &str {
    if let Some(stripped) = metric_name.strip_prefix("chess_") {
        if let Some(next_underscore) = stripped.find('_') {
            return &stripped[..next_underscore];
        }
    }
    "unknown"
}
