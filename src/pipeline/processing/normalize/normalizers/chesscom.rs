use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::base::{NormalizerUtils, SourceNormalizer};
use crate::constants::CHESSCOM_INTERNAL;
use crate::error::{NormalizeError, Result};
use crate::pipeline::processing::classify::TerminationPhraseClassifier;
use crate::pipeline::processing::normalize::{NormalizeContext, NormalizedRecord};
use crate::pipeline::processing::parser::ParsedGame;

/// Trailing numeric id of a game URL such as `https://www.chess.com/game/live/81234567`
static GAME_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r".+/(\d+)").expect("game id pattern is valid"));

/// Normalizer for chess.com archive games
pub struct ChesscomNormalizer {
    classifier: TerminationPhraseClassifier,
}

impl ChesscomNormalizer {
    pub fn new() -> Self {
        Self {
            classifier: TerminationPhraseClassifier,
        }
    }

    pub fn extract_game_id(link: &str) -> Result<String> {
        GAME_ID
            .captures(link)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| NormalizeError::InvalidGameId(link.to_string()))
    }
}

impl Default for ChesscomNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceNormalizer for ChesscomNormalizer {
    fn normalize(&self, game: ParsedGame, ctx: &NormalizeContext) -> Result<Option<NormalizedRecord>> {
        let ParsedGame {
            source_id,
            record_path,
            mut tags,
            ..
        } = game;

        NormalizerUtils::insert_local_time(&mut tags, ctx)?;

        let game_id = Self::extract_game_id(tags.require("link")?)?;
        tags.insert("game_id", game_id);

        let termination = tags.require("termination")?.to_string();
        let outcome = TerminationPhraseClassifier::outcome(&termination, &ctx.identity);
        tags.insert("result", outcome.as_str());
        let keep = NormalizerUtils::apply_ending(
            &mut tags,
            &self.classifier,
            &termination,
            ctx,
            &source_id,
            &record_path,
        );

        let elodiff = if ctx.is_identity(tags.require("white")?) {
            NormalizerUtils::rating_diff(&tags, "whiteelo", "blackelo")?
        } else {
            NormalizerUtils::rating_diff(&tags, "blackelo", "whiteelo")?
        };
        tags.insert("elodiff", elodiff);

        NormalizerUtils::insert_time_control(&mut tags)?;
        NormalizerUtils::insert_move_count(&mut tags)?;

        if let Some(site) = tags.get_str("site") {
            let site = site.to_lowercase();
            tags.insert("site", site);
        }

        if !keep {
            debug!(record_path = %record_path, "dropping game with unclassified ending");
            return Ok(None);
        }
        Ok(Some(NormalizedRecord::new(source_id, tags)))
    }

    fn source_id(&self) -> &str {
        CHESSCOM_INTERNAL
    }

    fn name(&self) -> &str {
        "chess.com Archive Normalizer"
    }
}
