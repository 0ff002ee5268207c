// Normalization pipeline: parsing, classification, and field derivation

pub mod pipeline;
pub mod processing;

// Re-export key types and functions from each stage
pub use pipeline::{Pipeline, PipelineResult};
pub use processing::{classify, normalize, parser};
