use tracing::debug;

use super::base::{NormalizerUtils, SourceNormalizer};
use crate::constants::LICHESS_INTERNAL;
use crate::error::{NormalizeError, Result};
use crate::pipeline::processing::classify::FinalCommentClassifier;
use crate::pipeline::processing::normalize::{NormalizeContext, NormalizedRecord};
use crate::pipeline::processing::parser::{clean_lichess_moves, ParsedGame};
use crate::types::{Outcome, TagMap, TagValue};

/// Normalizer for lichess NDJSON exports
pub struct LichessNormalizer {
    classifier: FinalCommentClassifier,
}

impl LichessNormalizer {
    pub fn new() -> Self {
        Self {
            classifier: FinalCommentClassifier,
        }
    }

    /// Result for the archived player from the export's `winner` field
    fn outcome(tags: &TagMap, winner: Option<&str>, ctx: &NormalizeContext) -> Result<Outcome> {
        let winning_side = match winner {
            Some("white") => "white",
            Some("black") => "black",
            _ => return Ok(Outcome::Draw),
        };
        if ctx.is_identity(tags.require(winning_side)?) {
            Ok(Outcome::Win)
        } else {
            Ok(Outcome::Loss)
        }
    }

    /// The archived player's rating change, when lichess reported one
    fn rating_diff(tags: &TagMap, ctx: &NormalizeContext) -> Result<Option<i64>> {
        let field = if ctx.is_identity(tags.require("white")?) {
            "whiteratingdiff"
        } else {
            "blackratingdiff"
        };
        match tags.get_str(field) {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| NormalizeError::InvalidRating {
                    field: field.to_string(),
                    value: raw.to_string(),
                }),
            None => Ok(None),
        }
    }
}

impl Default for LichessNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceNormalizer for LichessNormalizer {
    fn normalize(&self, game: ParsedGame, ctx: &NormalizeContext) -> Result<Option<NormalizedRecord>> {
        let ParsedGame {
            source_id,
            record_path,
            mut tags,
            meta,
        } = game;

        NormalizerUtils::insert_local_time(&mut tags, ctx)?;

        let game_id = meta.id.ok_or_else(|| NormalizeError::MissingField("id".to_string()))?;
        tags.insert("game_id", game_id);
        let position = meta
            .last_fen
            .ok_or_else(|| NormalizeError::MissingField("lastFen".to_string()))?;
        tags.insert("currentposition", position);

        // The ending lives in the last comment, so classify before stripping comments
        let raw_moves = tags.require("moves")?.to_string();
        let keep = NormalizerUtils::apply_ending(
            &mut tags,
            &self.classifier,
            &raw_moves,
            ctx,
            &source_id,
            &record_path,
        );
        tags.insert("moves", clean_lichess_moves(&raw_moves));

        let outcome = Self::outcome(&tags, meta.winner.as_deref(), ctx)?;
        tags.insert("result", outcome.as_str());

        let elodiff: TagValue = Self::rating_diff(&tags, ctx)?.into();
        tags.insert("elodiff", elodiff);

        NormalizerUtils::insert_time_control(&mut tags)?;
        NormalizerUtils::insert_move_count(&mut tags)?;

        if !keep {
            debug!(
                record_path = %record_path,
                status = meta.status.as_deref().unwrap_or("unknown"),
                "dropping game with unclassified ending"
            );
            return Ok(None);
        }
        Ok(Some(NormalizedRecord::new(source_id, tags)))
    }

    fn source_id(&self) -> &str {
        LICHESS_INTERNAL
    }

    fn name(&self) -> &str {
        "lichess Export Normalizer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::classify::LocalZone;
    use crate::pipeline::processing::normalize::UnclassifiedEnding;
    use crate::pipeline::processing::parser::{extract_tags, GameMeta};

    fn game(white: &str, black: &str, winner: Option<&str>, narration: Option<&str>) -> ParsedGame {
        let narration = narration.map(|n| format!(" {{ {n} }}")).unwrap_or_default();
        let pgn = format!(
            "[Site \"https://lichess.org/q7ZvsdUF\"]\n[White \"{white}\"]\n[Black \"{black}\"]\n\
             [WhiteRatingDiff \"+6\"]\n[BlackRatingDiff \"-5\"]\n[TimeControl \"300+0\"]\n\
             [UTCDate \"2023.01.15\"]\n[UTCTime \"18:00:00\"]\n\n\
             1. e4 {{ [%eval 0.3] }} 1... e5 2. Nf3 Nc6{narration} 1-0"
        );
        ParsedGame {
            source_id: LICHESS_INTERNAL.to_string(),
            record_path: "$.lines[0]".to_string(),
            tags: extract_tags(&pgn),
            meta: GameMeta {
                id: Some("q7ZvsdUF".to_string()),
                last_fen: Some("8/8/8/8/8/8/8/8 w - - 0 1".to_string()),
                winner: winner.map(str::to_string),
                status: None,
            },
        }
    }

    fn ctx() -> NormalizeContext {
        NormalizeContext::new("seanyseand").with_zone(LocalZone::parse("America/New_York").unwrap())
    }

    #[test]
    fn test_white_win_by_resignation() {
        let record = LichessNormalizer::new()
            .normalize(game("seanyseand", "opponent", Some("white"), Some("Black resigns.")), &ctx())
            .unwrap()
            .unwrap();

        assert_eq!(record.get_str("result"), Some("win"));
        assert_eq!(record.get_str("ending"), Some("resignation"));
        assert_eq!(record.get_i64("elodiff"), Some(6));
        assert_eq!(record.get_str("game_id"), Some("q7ZvsdUF"));
        assert_eq!(record.get_str("currentposition"), Some("8/8/8/8/8/8/8/8 w - - 0 1"));
        assert_eq!(record.get_str("localtime"), Some("13:00:00"));
        assert_eq!(record.get_str("timecategory"), Some("blitz"));
        assert_eq!(record.get_str("increment"), Some("no"));
        assert!(!record.get_str("moves").unwrap().contains('{'));
    }

    #[test]
    fn test_black_loss_uses_black_rating_diff() {
        let record = LichessNormalizer::new()
            .normalize(game("opponent", "seanyseand", Some("white"), Some("White wins on time.")), &ctx())
            .unwrap()
            .unwrap();

        assert_eq!(record.get_str("result"), Some("loss"));
        assert_eq!(record.get_str("ending"), Some("time"));
        assert_eq!(record.get_i64("elodiff"), Some(-5));
    }

    #[test]
    fn test_missing_winner_is_draw() {
        let record = LichessNormalizer::new()
            .normalize(game("seanyseand", "opponent", None, Some("Draw by threefold repetition.")), &ctx())
            .unwrap()
            .unwrap();
        assert_eq!(record.get_str("result"), Some("draw"));
        assert_eq!(record.get_str("ending"), Some("draw"));
    }

    #[test]
    fn test_missing_rating_diff_is_null() {
        let mut g = game("seanyseand", "opponent", Some("black"), Some("White resigns."));
        g.tags.remove("whiteratingdiff");
        let record = LichessNormalizer::new().normalize(g, &ctx()).unwrap().unwrap();
        assert!(record.get("elodiff").unwrap().is_null());
        assert_eq!(record.get_str("result"), Some("loss"));
    }

    #[test]
    fn test_no_narration_follows_policy() {
        // the only comment left is an engine eval, which is not an ending
        let kept = LichessNormalizer::new()
            .normalize(game("seanyseand", "opponent", None, None), &ctx())
            .unwrap()
            .unwrap();
        assert!(kept.get("ending").unwrap().is_null());

        let dropping = ctx().with_unclassified_ending(UnclassifiedEnding::Drop);
        assert!(LichessNormalizer::new()
            .normalize(game("seanyseand", "opponent", None, None), &dropping)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_missing_id_is_an_error() {
        let mut g = game("seanyseand", "opponent", None, None);
        g.meta.id = None;
        let err = LichessNormalizer::new().normalize(g, &ctx()).unwrap_err();
        assert!(matches!(err, NormalizeError::MissingField(f) if f == "id"));
    }
}
