/// Source name constants to ensure consistency across the codebase
/// These constants define the mapping between user-friendly source names and internal ids

// User-friendly source names (used in CLI)
pub const CHESSCOM_SOURCE: &str = "chesscom";
pub const LICHESS_SOURCE: &str = "lichess";

// Internal source ids (stamped on parsed games and normalized records)
pub const CHESSCOM_INTERNAL: &str = "chess.com";
pub const LICHESS_INTERNAL: &str = "lichess.org";

/// Separator between games in a chess.com monthly PGN archive
pub const GAME_SEPARATOR: &str = "\n\n\n";

/// Boundary between the tag header and the move text of one game
pub const HEADER_BOUNDARY: &str = "\n\n";

/// Convert user-friendly source name to internal id
pub fn source_name_to_internal(source_name: &str) -> String {
    match source_name {
        CHESSCOM_SOURCE => CHESSCOM_INTERNAL.to_string(),
        LICHESS_SOURCE => LICHESS_INTERNAL.to_string(),
        other => other.to_string(),
    }
}

/// Get all supported user-friendly source names
pub fn get_supported_sources() -> Vec<&'static str> {
    vec![CHESSCOM_SOURCE, LICHESS_SOURCE]
}
