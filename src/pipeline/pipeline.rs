use serde::Serialize;
use std::io::Write;
use tracing::{debug, info, instrument, warn};

use crate::constants::{CHESSCOM_INTERNAL, LICHESS_INTERNAL};
use crate::error::{NormalizeError, Result};
use crate::pipeline::processing::normalize::{NormalizationRegistry, NormalizeContext, NormalizedRecord};
use crate::pipeline::processing::parser::{
    ChesscomPgnParser, LichessGame, LichessNdjsonParser, MetricsParser, ParseBatch, ParsedGame, Parser,
    RecordFailure,
};

/// Result of a complete pipeline run over one payload
#[derive(Debug, Serialize)]
pub struct PipelineResult {
    pub source_id: String,
    /// Units found in the payload, including ones that failed
    pub total_games: usize,
    pub records: Vec<NormalizedRecord>,
    /// Games left out because their ending could not be classified
    pub dropped: usize,
    pub errors: Vec<String>,
}

pub struct Pipeline {
    registry: NormalizationRegistry,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::with_registry(NormalizationRegistry::new())
    }

    pub fn with_registry(registry: NormalizationRegistry) -> Self {
        Self { registry }
    }

    /// Parser for a source's raw payload format
    pub fn parser_for(source_id: &str) -> Result<Box<dyn Parser>> {
        match source_id {
            CHESSCOM_INTERNAL => Ok(Box::new(MetricsParser::new(ChesscomPgnParser::new(source_id)))),
            LICHESS_INTERNAL => Ok(Box::new(MetricsParser::new(LichessNdjsonParser::new(source_id)))),
            other => Err(NormalizeError::UnknownSource(other.to_string())),
        }
    }

    /// Parse and normalize one raw payload from `source_id`.
    ///
    /// Only an unknown source fails the whole run; every per-game failure is
    /// logged and reported in [`PipelineResult::errors`].
    #[instrument(skip(self, bytes, ctx), fields(bytes_len = bytes.len()))]
    pub fn run(&self, source_id: &str, bytes: &[u8], ctx: &NormalizeContext) -> Result<PipelineResult> {
        let parser = Self::parser_for(source_id)?;
        let batch = parser.parse(bytes)?;
        Ok(self.normalize_batch(source_id, batch, ctx))
    }

    /// Normalize a chess.com multi-game PGN blob
    pub fn run_chesscom(&self, blob: &str, ctx: &NormalizeContext) -> Result<PipelineResult> {
        self.run(CHESSCOM_INTERNAL, blob.as_bytes(), ctx)
    }

    /// Normalize already-decoded lichess export records
    pub fn run_lichess_records(&self, records: Vec<LichessGame>, ctx: &NormalizeContext) -> PipelineResult {
        let games = LichessNdjsonParser::new(LICHESS_INTERNAL).games_from_records(records);
        self.normalize_batch(
            LICHESS_INTERNAL,
            ParseBatch {
                games,
                failures: Vec::new(),
            },
            ctx,
        )
    }

    fn normalize_batch(&self, source_id: &str, batch: ParseBatch, ctx: &NormalizeContext) -> PipelineResult {
        let total_games = batch.games.len() + batch.failures.len();
        info!("Normalizing {} games from {}", total_games, source_id);

        let mut errors: Vec<String> = batch.failures.iter().map(describe_failure).collect();
        let mut records = Vec::new();
        let mut dropped = 0;

        for game in batch.games {
            let record_path = game.record_path.clone();
            match self.normalize_game(game, ctx) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {
                    debug!("Dropped {} (unclassified ending)", record_path);
                    dropped += 1;
                }
                Err(e) => {
                    warn!("Normalization failed for {}: {}", record_path, e);
                    errors.push(format!("{}: {}", record_path, e));
                }
            }
        }

        info!(
            "Normalized {} games ({} dropped, {} errors)",
            records.len(),
            dropped,
            errors.len()
        );

        PipelineResult {
            source_id: source_id.to_string(),
            total_games,
            records,
            dropped,
            errors,
        }
    }

    fn normalize_game(&self, game: ParsedGame, ctx: &NormalizeContext) -> Result<Option<NormalizedRecord>> {
        self.registry.normalize(game, ctx)
    }

    /// Write records as newline-delimited JSON
    pub fn write_ndjson<W: Write>(records: &[NormalizedRecord], mut writer: W) -> Result<()> {
        for record in records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn describe_failure(failure: &RecordFailure) -> String {
    format!("{}: {}", failure.record_path, failure.error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::classify::LocalZone;

    fn ctx() -> NormalizeContext {
        NormalizeContext::new("alice").with_zone(LocalZone::parse("UTC").unwrap())
    }

    const GOOD: &str = "[White \"alice\"]\n[Black \"bob\"]\n[WhiteElo \"1200\"]\n[BlackElo \"1250\"]\n\
        [TimeControl \"600\"]\n[UTCDate \"2024.03.01\"]\n[UTCTime \"09:15:00\"]\n\
        [Termination \"alice won by resignation\"]\n[Link \"https://www.chess.com/game/live/101\"]\n\n\
        1. e4 {[%clk 0:09:59]} 1... e5 {[%clk 0:09:58]} 1-0";

    #[test]
    fn test_run_keeps_going_past_bad_games() {
        let broken = "[White \"alice\"]\n\n1. e4";
        let blob = format!("{}\n\n\n{}\n\n\n", GOOD, broken);

        let result = Pipeline::new().run_chesscom(&blob, &ctx()).unwrap();

        assert_eq!(result.total_games, 2);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("$.games[1]"));
        assert_eq!(result.records[0].get_i64("elodiff"), Some(-50));
        assert_eq!(result.records[0].get_str("timecategory"), Some("rapid"));
    }

    #[test]
    fn test_unknown_source_fails_the_run() {
        let err = Pipeline::new().run("fics", b"", &ctx()).unwrap_err();
        assert!(matches!(err, NormalizeError::UnknownSource(_)));
    }

    #[test]
    fn test_write_ndjson() {
        let result = Pipeline::new().run_chesscom(GOOD, &ctx()).unwrap();
        let mut out = Vec::new();
        Pipeline::write_ndjson(&result.records, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(value["result"], "win");
        assert_eq!(value["game_id"], "101");
    }
}
