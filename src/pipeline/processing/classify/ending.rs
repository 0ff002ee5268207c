use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{Ending, Outcome};

static INLINE_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]+)\}").expect("inline comment pattern is valid"));

/// Maps some source-specific description of how a game finished onto the
/// shared [`Ending`] vocabulary.
pub trait EndingClassifier: Send + Sync {
    /// Returns `None` when the text does not describe a known ending
    fn classify(&self, text: &str) -> Option<Ending>;

    fn name(&self) -> &'static str;
}

/// Reads chess.com `Termination` sentences such as
/// `"alice won by checkmate"` or `"Game drawn by repetition"`.
pub struct TerminationPhraseClassifier;

impl TerminationPhraseClassifier {
    /// Result of the game for `identity`, judged by who the sentence is about
    pub fn outcome(termination: &str, identity: &str) -> Outcome {
        match termination.split_whitespace().next() {
            Some(subject) if subject.eq_ignore_ascii_case(identity) => Outcome::Win,
            Some("Game") => Outcome::Draw,
            _ => Outcome::Loss,
        }
    }
}

impl EndingClassifier for TerminationPhraseClassifier {
    fn classify(&self, termination: &str) -> Option<Ending> {
        let words: Vec<&str> = termination.split_whitespace().collect();
        if words.len() < 2 {
            return None;
        }
        let phrase = words[words.len() - 2..].join(" ");

        match phrase.as_str() {
            "by checkmate" => Some(Ending::Checkmate),
            "by resignation" => Some(Ending::Resignation),
            "on time" => Some(Ending::Time),
            "by repetition" | "insufficient material" | "by agreement" | "50-move rule" => {
                Some(Ending::Draw)
            }
            "by stalemate" => Some(Ending::Stalemate),
            "game abandoned" => Some(Ending::Abandoned),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        "termination_phrase"
    }
}

/// Reads the narration lichess appends as the last `{...}` comment of a
/// literate PGN, e.g. `{ Black resigns. }`.
pub struct FinalCommentClassifier;

impl FinalCommentClassifier {
    /// Body of the last inline comment in the move text, if any
    pub fn last_comment(moves: &str) -> Option<&str> {
        INLINE_COMMENT
            .captures_iter(moves)
            .last()
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

impl EndingClassifier for FinalCommentClassifier {
    fn classify(&self, moves: &str) -> Option<Ending> {
        let comment = Self::last_comment(moves)?;

        // First match wins
        if comment.contains("resigns") {
            Some(Ending::Resignation)
        } else if comment.contains("checkmate") {
            Some(Ending::Checkmate)
        } else if comment.contains("left") {
            Some(Ending::Abandoned)
        } else if comment.contains("on time") {
            Some(Ending::Time)
        } else if comment.contains("stalemate") {
            Some(Ending::Stalemate)
        } else if comment.to_lowercase().contains("draw") {
            Some(Ending::Draw)
        } else {
            None
        }
    }

    fn name(&self) -> &'static str {
        "final_comment"
    }
}
