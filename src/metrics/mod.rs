//! Metrics for the normalization pipeline
//!
//! Each pipeline phase defines its own metrics in a dedicated submodule, ensuring
//! clear ownership and preventing naming conflicts. Only the `metrics` facade is
//! used here; an embedding application decides which recorder (if any) to install.

pub mod normalize;
pub mod parser;
pub mod registry;

pub use normalize::NormalizeMetrics;
pub use parser::ParserMetrics;
pub use registry::register_all_metrics;

/// Trait for phase-specific metrics collections
pub trait PhaseMetrics {
    /// Register all metrics for this phase
    fn register_metrics();

    /// Get the phase name for prefixing metrics
    fn phase_name() -> &'static str;

    /// Get documentation for all metrics in this phase
    fn metrics_documentation() -> Vec<MetricDoc>;
}

/// Documentation for a single metric
#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
    pub labels: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Histogram,
}

/// Naming convention: chess_{phase}_{metric_name}[_total]
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("chess_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("chess_", $phase, "_", $name)
    };
}

pub(crate) use phase_metric;
