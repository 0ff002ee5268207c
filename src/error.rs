use thiserror::Error;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid UTC date/time '{date} {time}': {reason}")]
    InvalidDateTime {
        date: String,
        time: String,
        reason: String,
    },

    #[error("Invalid time control: {0}")]
    InvalidTimeControl(String),

    #[error("Could not extract game id from link: {0}")]
    InvalidGameId(String),

    #[error("Invalid rating in field '{field}': {value}")]
    InvalidRating { field: String, value: String },

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No normalizer registered for source: {0}")]
    UnknownSource(String),
}

impl NormalizeError {
    /// Short label used for metrics and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            NormalizeError::MissingField(_) => "missing_field",
            NormalizeError::InvalidDateTime { .. } => "invalid_datetime",
            NormalizeError::InvalidTimeControl(_) => "invalid_time_control",
            NormalizeError::InvalidGameId(_) => "invalid_game_id",
            NormalizeError::InvalidRating { .. } => "invalid_rating",
            NormalizeError::Json(_) => "json",
            NormalizeError::Toml(_) => "toml",
            NormalizeError::Io(_) => "io",
            NormalizeError::Config(_) => "config",
            NormalizeError::UnknownSource(_) => "unknown_source",
        }
    }
}

pub type Result<T> = std::result::Result<T, NormalizeError>;
