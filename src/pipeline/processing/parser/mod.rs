use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{GAME_SEPARATOR, HEADER_BOUNDARY};
use crate::error::{NormalizeError, Result};
use crate::metrics::ParserMetrics;
use crate::types::TagMap;

pub mod chesscom;
pub mod lichess;

pub use chesscom::{clean_chesscom_moves, ChesscomPgnParser};
pub use lichess::{clean_lichess_moves, LichessGame, LichessNdjsonParser};

/// `[Key "Value"]` with a bare alphabetic key and an unescaped, non-empty value
static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\[([A-Za-z]+)\s"([^"]+)"\]"#).expect("tag pattern is valid"));

/// Structured fields that travel next to the PGN text in some sources
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameMeta {
    pub id: Option<String>,
    pub last_fen: Option<String>,
    pub winner: Option<String>,
    pub status: Option<String>,
}

/// One game after tag extraction, ready for field derivation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedGame {
    pub source_id: String,
    /// Position of the game within the payload, for log lines and error reports
    pub record_path: String,
    pub tags: TagMap,
    pub meta: GameMeta,
}

/// A unit of the payload that could not be turned into a [`ParsedGame`]
#[derive(Debug)]
pub struct RecordFailure {
    pub record_path: String,
    pub error: NormalizeError,
}

/// Everything a parser got out of one payload
#[derive(Debug, Default)]
pub struct ParseBatch {
    pub games: Vec<ParsedGame>,
    pub failures: Vec<RecordFailure>,
}

pub trait Parser {
    fn parse(&self, bytes: &[u8]) -> Result<ParseBatch>;

    fn source_id(&self) -> &str;
}

/// A wrapper that adds metrics to any parser implementation
pub struct MetricsParser<P: Parser> {
    inner: P,
}

impl<P: Parser> MetricsParser<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

impl<P: Parser> Parser for MetricsParser<P> {
    fn parse(&self, bytes: &[u8]) -> Result<ParseBatch> {
        let start_time = std::time::Instant::now();
        let source_id = self.inner.source_id();

        match self.inner.parse(bytes) {
            Ok(batch) => {
                ParserMetrics::record_parse_success(
                    source_id,
                    batch.games.len(),
                    start_time.elapsed().as_secs_f64(),
                );
                for failure in &batch.failures {
                    ParserMetrics::record_record_error(source_id, failure.error.kind());
                }
                Ok(batch)
            }
            Err(e) => {
                ParserMetrics::record_parse_error(source_id, e.kind());
                Err(e)
            }
        }
    }

    fn source_id(&self) -> &str {
        self.inner.source_id()
    }
}

/// Split a multi-game PGN blob into per-game units, in order, dropping empty ones
pub fn split_games(blob: &str) -> Vec<&str> {
    blob.split(GAME_SEPARATOR)
        .filter(|unit| !unit.trim().is_empty())
        .collect()
}

/// Build the tag mapping for one game: every `[Key "Value"]` pair under its
/// lower-cased key, plus `moves` holding the trimmed text after the header.
pub fn extract_tags(unit: &str) -> TagMap {
    let mut tags = TagMap::new();
    for caps in TAG_PATTERN.captures_iter(unit) {
        tags.insert(caps[1].to_lowercase(), &caps[2]);
    }

    let moves = match unit.find(HEADER_BOUNDARY) {
        Some(idx) => &unit[idx + HEADER_BOUNDARY.len()..],
        None => unit,
    };
    tags.insert("moves", moves.trim());
    tags
}
