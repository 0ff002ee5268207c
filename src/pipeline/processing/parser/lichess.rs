use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{extract_tags, GameMeta, ParseBatch, ParsedGame, Parser, RecordFailure};
use crate::error::Result;

static INLINE_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[^{}]+\}").expect("comment pattern is valid"));

static MOVE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\.").expect("move number pattern is valid"));

/// Remove `{...}` comments and put a space in front of every move number
pub fn clean_lichess_moves(moves: &str) -> String {
    let without_comments = INLINE_COMMENT.replace_all(moves, "");
    MOVE_NUMBER
        .replace_all(&without_comments, " $0")
        .trim()
        .to_string()
}

/// One line of a lichess game export requested with `pgnInJson`, `literate`
/// and `lastFen` enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LichessGame {
    pub id: String,
    pub pgn: String,
    #[serde(rename = "lastFen")]
    pub last_fen: String,
    /// `white` or `black`; absent for draws
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl LichessGame {
    fn into_parsed(self, source_id: &str, record_path: String) -> ParsedGame {
        // Move text stays raw here: the ending is read from its final comment
        // before the normalizer cleans it.
        let tags = extract_tags(&self.pgn);
        ParsedGame {
            source_id: source_id.to_string(),
            record_path,
            tags,
            meta: GameMeta {
                id: Some(self.id),
                last_fen: Some(self.last_fen),
                winner: self.winner,
                status: self.status,
            },
        }
    }
}

/// Parses lichess NDJSON exports, one game object per line
pub struct LichessNdjsonParser {
    pub source_id: String,
}

impl LichessNdjsonParser {
    pub fn new(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
        }
    }

    /// Turn already-decoded records into parsed games
    pub fn games_from_records<I>(&self, records: I) -> Vec<ParsedGame>
    where
        I: IntoIterator<Item = LichessGame>,
    {
        records
            .into_iter()
            .enumerate()
            .map(|(idx, game)| game.into_parsed(&self.source_id, format!("$.records[{}]", idx)))
            .collect()
    }
}

impl Parser for LichessNdjsonParser {
    fn parse(&self, bytes: &[u8]) -> Result<ParseBatch> {
        debug!("LichessNdjsonParser: start bytes_len={}", bytes.len());
        let body = String::from_utf8_lossy(bytes);
        let mut batch = ParseBatch::default();

        for (idx, line) in body.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record_path = format!("$.lines[{}]", idx);
            match serde_json::from_str::<LichessGame>(line) {
                Ok(game) => batch.games.push(game.into_parsed(&self.source_id, record_path)),
                Err(e) => {
                    warn!("LichessNdjsonParser: skipping undecodable line {}: {}", idx, e);
                    batch.failures.push(RecordFailure {
                        record_path,
                        error: e.into(),
                    });
                }
            }
        }

        info!(
            "LichessNdjsonParser: extracted games={} failures={}",
            batch.games.len(),
            batch.failures.len()
        );
        Ok(batch)
    }

    fn source_id(&self) -> &str {
        &self.source_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NormalizeError;
    use serde_json::json;

    #[test]
    fn test_clean_strips_comments_and_spaces_move_numbers() {
        let raw = "1.e4 { [%eval 0.2] } e5 2.Nf3 { Black resigns. } 1-0";
        assert_eq!(clean_lichess_moves(raw), "1.e4  e5  2.Nf3  1-0");
    }

    #[test]
    fn test_clean_keeps_already_spaced_text() {
        assert_eq!(clean_lichess_moves("1. e4 e5 2. Nf3"), "1. e4 e5  2. Nf3");
    }

    #[test]
    fn test_parse_ndjson_lines() {
        let line = json!({
            "id": "q7ZvsdUF",
            "pgn": "[White \"alice\"]\n[Black \"bob\"]\n\n1. e4 e5 { Black resigns. } 1-0\n",
            "lastFen": "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2",
            "winner": "white",
            "status": "resign"
        })
        .to_string();
        let payload = format!("{}\n\nnot json\n", line);

        let batch = LichessNdjsonParser::new("lichess.org").parse(payload.as_bytes()).unwrap();

        assert_eq!(batch.games.len(), 1);
        let game = &batch.games[0];
        assert_eq!(game.meta.id.as_deref(), Some("q7ZvsdUF"));
        assert_eq!(game.meta.winner.as_deref(), Some("white"));
        // raw move text keeps its comments for ending classification
        assert_eq!(game.tags.get_str("moves"), Some("1. e4 e5 { Black resigns. } 1-0"));

        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].record_path, "$.lines[2]");
        assert!(matches!(batch.failures[0].error, NormalizeError::Json(_)));
    }

    #[test]
    fn test_games_from_records_indexes_in_order() {
        let parser = LichessNdjsonParser::new("lichess.org");
        let records = vec![
            LichessGame {
                id: "a".into(),
                pgn: "[White \"x\"]\n\n1. e4".into(),
                last_fen: "fen".into(),
                winner: None,
                status: None,
            },
            LichessGame {
                id: "b".into(),
                pgn: "[White \"y\"]\n\n1. d4".into(),
                last_fen: "fen".into(),
                winner: Some("black".into()),
                status: None,
            },
        ];
        let games = parser.games_from_records(records);
        assert_eq!(games.len(), 2);
        assert_eq!(games[1].record_path, "$.records[1]");
        assert_eq!(games[1].tags.get_str("white"), Some("y"));
    }
}
