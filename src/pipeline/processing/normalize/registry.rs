use std::collections::HashMap;

use super::normalizers::{ChesscomNormalizer, LichessNormalizer, MetricsNormalizer, SourceNormalizer};
use super::{NormalizeContext, NormalizedRecord};
use crate::constants::{CHESSCOM_INTERNAL, LICHESS_INTERNAL};
use crate::error::{NormalizeError, Result};
use crate::pipeline::processing::parser::ParsedGame;

/// Registry for source-specific normalization strategies
pub struct NormalizationRegistry {
    normalizers: HashMap<String, Box<dyn SourceNormalizer>>,
}

impl NormalizationRegistry {
    /// Create a new normalization registry with the built-in normalizers
    pub fn new() -> Self {
        let mut normalizers: HashMap<String, Box<dyn SourceNormalizer>> = HashMap::new();

        normalizers.insert(
            CHESSCOM_INTERNAL.to_string(),
            Box::new(MetricsNormalizer::new(ChesscomNormalizer::new())),
        );
        normalizers.insert(
            LICHESS_INTERNAL.to_string(),
            Box::new(MetricsNormalizer::new(LichessNormalizer::new())),
        );

        Self { normalizers }
    }

    /// Register a normalizer for a specific source
    pub fn register(&mut self, source_id: String, normalizer: Box<dyn SourceNormalizer>) {
        self.normalizers.insert(source_id, normalizer);
    }

    /// Get the appropriate normalizer for a source
    pub fn get_normalizer(&self, source_id: &str) -> Option<&dyn SourceNormalizer> {
        self.normalizers.get(source_id).map(|n| n.as_ref())
    }

    /// Normalize a game using the normalizer registered for its source
    pub fn normalize(&self, game: ParsedGame, ctx: &NormalizeContext) -> Result<Option<NormalizedRecord>> {
        match self.get_normalizer(&game.source_id) {
            Some(normalizer) => normalizer.normalize(game, ctx),
            None => Err(NormalizeError::UnknownSource(game.source_id)),
        }
    }

    /// List all registered source IDs
    pub fn list_sources(&self) -> Vec<&str> {
        self.normalizers.keys().map(|k| k.as_str()).collect()
    }
}

impl Default for NormalizationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::parser::GameMeta;
    use crate::types::TagMap;

    #[test]
    fn test_registry_has_built_in_normalizers() {
        let registry = NormalizationRegistry::new();

        let sources = registry.list_sources();
        assert!(sources.contains(&"chess.com"));
        assert!(sources.contains(&"lichess.org"));
        assert_eq!(
            registry.get_normalizer("lichess.org").map(|n| n.name()),
            Some("lichess Export Normalizer")
        );
    }

    #[test]
    fn test_registry_returns_error_for_unknown_source() {
        let registry = NormalizationRegistry::new();

        let game = ParsedGame {
            source_id: "fics".to_string(),
            record_path: "$".to_string(),
            tags: TagMap::new(),
            meta: GameMeta::default(),
        };

        let result = registry.normalize(game, &NormalizeContext::new("me"));
        assert!(matches!(result, Err(NormalizeError::UnknownSource(s)) if s == "fics"));
    }
}
