//! Field classifiers shared by the per-source normalizers

pub mod ending;
pub mod time_control;
pub mod timezone;

pub use ending::{EndingClassifier, FinalCommentClassifier, TerminationPhraseClassifier};
pub use time_control::classify_time_control;
pub use timezone::{parse_utc, utc_to_local, LocalZone};
