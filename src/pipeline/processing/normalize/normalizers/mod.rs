// Base trait and utilities for source-specific normalizers
pub mod base;

// Individual normalizer implementations
pub mod chesscom;
pub mod lichess;

// Re-export the main components
pub use base::{MetricsNormalizer, NormalizerUtils, SourceNormalizer};
pub use chesscom::ChesscomNormalizer;
pub use lichess::LichessNormalizer;
