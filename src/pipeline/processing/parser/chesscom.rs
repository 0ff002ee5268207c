use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use super::{extract_tags, split_games, GameMeta, ParseBatch, ParsedGame, Parser};
use crate::error::Result;

/// `{[%clk 0:02:59.9]}` style clock annotations
static CLOCK_ANNOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\S+ \S+\}").expect("clock pattern is valid"));

/// ` 12... ` markers chess.com writes before a black reply
static BLACK_ELLIPSIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s\d+\.\.\.\s").expect("ellipsis pattern is valid"));

/// Strip clock annotations and black-move ellipsis markers from chess.com move text
pub fn clean_chesscom_moves(moves: &str) -> String {
    let without_clocks = CLOCK_ANNOTATION.replace_all(moves, "");
    BLACK_ELLIPSIS.replace_all(&without_clocks, "").into_owned()
}

/// Parses a chess.com monthly archive: plain PGN, games separated by two blank lines
pub struct ChesscomPgnParser {
    pub source_id: String,
}

impl ChesscomPgnParser {
    pub fn new(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
        }
    }
}

impl Parser for ChesscomPgnParser {
    fn parse(&self, bytes: &[u8]) -> Result<ParseBatch> {
        debug!("ChesscomPgnParser: start bytes_len={}", bytes.len());
        let blob = String::from_utf8_lossy(bytes);
        let mut batch = ParseBatch::default();

        for (idx, unit) in split_games(&blob).into_iter().enumerate() {
            let mut tags = extract_tags(unit);
            if let Some(moves) = tags.get_str("moves") {
                let cleaned = clean_chesscom_moves(moves);
                tags.insert("moves", cleaned);
            }
            debug!("ChesscomPgnParser: game {} tags={}", idx, tags.len());
            batch.games.push(ParsedGame {
                source_id: self.source_id.clone(),
                record_path: format!("$.games[{}]", idx),
                tags,
                meta: GameMeta::default(),
            });
        }

        info!("ChesscomPgnParser: extracted games={}", batch.games.len());
        Ok(batch)
    }

    fn source_id(&self) -> &str {
        &self.source_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_removes_clocks_and_ellipsis() {
        let raw = "1. e4 {[%clk 0:02:59.9]} 1... e5 {[%clk 0:02:58.1]} 2. Nf3 {[%clk 0:02:57]} 2... Nc6 {[%clk 0:02:55]} 1-0";
        // removed annotations leave their surrounding spaces behind
        assert_eq!(clean_chesscom_moves(raw), "1. e4 e5  2. Nf3 Nc6  1-0");
    }

    #[test]
    fn test_clean_leaves_plain_moves_alone() {
        assert_eq!(clean_chesscom_moves("1. d4 d5 2. c4"), "1. d4 d5 2. c4");
    }

    #[test]
    fn test_parse_archive() {
        let archive = "[White \"alice\"]\n[Black \"bob\"]\n\n1. e4 {[%clk 0:01:00]} 1... e5 {[%clk 0:01:00]} 1-0\n\n\n[White \"carol\"]\n[Black \"alice\"]\n\n1. d4 {[%clk 0:01:00]} 0-1\n\n\n";
        let batch = ChesscomPgnParser::new("chess.com").parse(archive.as_bytes()).unwrap();

        assert_eq!(batch.games.len(), 2);
        assert!(batch.failures.is_empty());
        assert_eq!(batch.games[0].tags.get_str("moves"), Some("1. e4 e5  1-0"));
        assert_eq!(batch.games[1].tags.get_str("white"), Some("carol"));
        assert_eq!(batch.games[1].record_path, "$.games[1]");
        assert_eq!(batch.games[1].source_id, "chess.com");
    }
}
