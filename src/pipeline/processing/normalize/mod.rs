use serde::{Deserialize, Serialize};

use crate::pipeline::processing::classify::LocalZone;
use crate::types::{TagMap, TagValue};

pub mod normalizers;
pub mod registry;

pub use normalizers::{ChesscomNormalizer, LichessNormalizer, MetricsNormalizer, SourceNormalizer};
pub use registry::NormalizationRegistry;

/// What to do with a game whose ending matches no known phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnclassifiedEnding {
    /// Keep the record with `ending` set to null
    #[default]
    Keep,
    /// Leave the record out of the output
    Drop,
}

/// Per-run settings threaded through every normalization call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeContext {
    /// Username of the player whose archive is being normalized
    pub identity: String,
    pub zone: LocalZone,
    pub unclassified_ending: UnclassifiedEnding,
}

impl NormalizeContext {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            zone: LocalZone::default(),
            unclassified_ending: UnclassifiedEnding::default(),
        }
    }

    pub fn with_zone(mut self, zone: LocalZone) -> Self {
        self.zone = zone;
        self
    }

    pub fn with_unclassified_ending(mut self, policy: UnclassifiedEnding) -> Self {
        self.unclassified_ending = policy;
        self
    }

    /// Whether `player` is the archived account (usernames compare case-insensitively)
    pub fn is_identity(&self, player: &str) -> bool {
        player.eq_ignore_ascii_case(&self.identity)
    }
}

/// A game after full field derivation. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    #[serde(skip)]
    source_id: String,
    #[serde(flatten)]
    tags: TagMap,
}

impl NormalizedRecord {
    pub(crate) fn new(source_id: impl Into<String>, tags: TagMap) -> Self {
        Self {
            source_id: source_id.into(),
            tags,
        }
    }

    /// Internal id of the source the game came from
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn tags(&self) -> &TagMap {
        &self.tags
    }

    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.tags.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.tags.get_str(key)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.tags.get(key).and_then(TagValue::as_i64)
    }

    pub fn into_tags(self) -> TagMap {
        self.tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_identity_is_case_insensitive() {
        let ctx = NormalizeContext::new("SeanySeanD");
        assert!(ctx.is_identity("seanyseand"));
        assert!(!ctx.is_identity("someone_else"));
    }

    #[test]
    fn test_record_serializes_as_flat_tags() {
        let mut tags = TagMap::new();
        tags.insert("result", "win");
        tags.insert("nmoves", 24i64);
        let record = NormalizedRecord::new("chess.com", tags);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, serde_json::json!({"result": "win", "nmoves": 24}));
        assert_eq!(record.source_id(), "chess.com");
        assert_eq!(record.get_i64("nmoves"), Some(24));
    }

    #[test]
    fn test_unclassified_policy_deserializes_lowercase() {
        let policy: UnclassifiedEnding = serde_json::from_str("\"drop\"").unwrap();
        assert_eq!(policy, UnclassifiedEnding::Drop);
        assert_eq!(UnclassifiedEnding::default(), UnclassifiedEnding::Keep);
    }
}
