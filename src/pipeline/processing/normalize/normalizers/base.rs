use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{NormalizeError, Result};
use crate::metrics::NormalizeMetrics;
use crate::pipeline::processing::classify::{classify_time_control, utc_to_local, EndingClassifier};
use crate::pipeline::processing::normalize::{NormalizeContext, NormalizedRecord, UnclassifiedEnding};
use crate::pipeline::processing::parser::ParsedGame;
use crate::types::TagMap;

static MOVE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\.").expect("move number pattern is valid"));

/// Base trait for source-specific normalizers
pub trait SourceNormalizer: Send + Sync {
    /// Derive all normalized fields for one game.
    ///
    /// `Ok(None)` means the game was deliberately left out of the output.
    fn normalize(&self, game: ParsedGame, ctx: &NormalizeContext) -> Result<Option<NormalizedRecord>>;

    /// Get the source ID this normalizer handles
    fn source_id(&self) -> &str;

    /// Get a human-readable name for this normalizer
    fn name(&self) -> &str;
}

/// A wrapper that adds metrics to any normalizer implementation
pub struct MetricsNormalizer<N: SourceNormalizer> {
    inner: N,
}

impl<N: SourceNormalizer> MetricsNormalizer<N> {
    pub fn new(inner: N) -> Self {
        Self { inner }
    }
}

impl<N: SourceNormalizer> SourceNormalizer for MetricsNormalizer<N> {
    fn normalize(&self, game: ParsedGame, ctx: &NormalizeContext) -> Result<Option<NormalizedRecord>> {
        let start_time = std::time::Instant::now();
        let source_id = self.inner.source_id();

        let outcome = self.inner.normalize(game, ctx);
        NormalizeMetrics::record_duration(start_time.elapsed().as_secs_f64());
        match &outcome {
            Ok(Some(_)) => NormalizeMetrics::record_normalized(source_id),
            Ok(None) => NormalizeMetrics::record_dropped(source_id),
            Err(e) => NormalizeMetrics::record_error(source_id, e.kind()),
        }
        outcome
    }

    fn source_id(&self) -> &str {
        self.inner.source_id()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Derivation steps shared by every source
pub struct NormalizerUtils;

impl NormalizerUtils {
    /// Add `localdate`/`localtime` from the `utcdate`/`utctime` tags
    pub fn insert_local_time(tags: &mut TagMap, ctx: &NormalizeContext) -> Result<()> {
        let (date, time) = utc_to_local(tags.require("utcdate")?, tags.require("utctime")?, &ctx.zone)?;
        tags.insert("localdate", date);
        tags.insert("localtime", time);
        Ok(())
    }

    /// Add `timecategory`/`increment` from the `timecontrol` tag
    pub fn insert_time_control(tags: &mut TagMap) -> Result<()> {
        let (category, increment) = classify_time_control(tags.require("timecontrol")?)?;
        tags.insert("timecategory", category.as_str());
        tags.insert("increment", increment.as_str());
        Ok(())
    }

    /// Number of non-empty segments between move-number tokens
    pub fn count_moves(moves: &str) -> i64 {
        MOVE_NUMBER
            .split(moves)
            .filter(|segment| !segment.trim().is_empty())
            .count() as i64
    }

    /// Add `nmoves` from the cleaned `moves` tag
    pub fn insert_move_count(tags: &mut TagMap) -> Result<()> {
        let count = Self::count_moves(tags.require("moves")?);
        tags.insert("nmoves", count);
        Ok(())
    }

    pub fn parse_rating(tags: &TagMap, field: &str) -> Result<i64> {
        let raw = tags.require(field)?;
        raw.trim().parse().map_err(|_| NormalizeError::InvalidRating {
            field: field.to_string(),
            value: raw.to_string(),
        })
    }

    /// `own - opponent` for two rating tags; a difference outside `i64` is an
    /// invalid rating, not a panic
    pub fn rating_diff(tags: &TagMap, own: &str, opponent: &str) -> Result<i64> {
        let own_rating = Self::parse_rating(tags, own)?;
        let opponent_rating = Self::parse_rating(tags, opponent)?;
        own_rating
            .checked_sub(opponent_rating)
            .ok_or_else(|| NormalizeError::InvalidRating {
                field: own.to_string(),
                value: format!("{} - {}", own_rating, opponent_rating),
            })
    }

    /// Classify `text`, record the ending and decide, per the context policy,
    /// whether the game stays in the output. Returns `false` when it should be dropped.
    pub fn apply_ending(
        tags: &mut TagMap,
        classifier: &dyn EndingClassifier,
        text: &str,
        ctx: &NormalizeContext,
        source_id: &str,
        record_path: &str,
    ) -> bool {
        let ending = classifier.classify(text);
        tags.insert("ending", ending.map(|e| e.as_str()));
        if ending.is_some() {
            return true;
        }

        NormalizeMetrics::record_unclassified_ending(source_id);
        debug!(
            source = source_id,
            record_path,
            classifier = classifier.name(),
            policy = ?ctx.unclassified_ending,
            "ending could not be classified"
        );
        ctx.unclassified_ending == UnclassifiedEnding::Keep
    }
}
