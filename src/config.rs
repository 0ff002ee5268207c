use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{NormalizeError, Result};
use crate::pipeline::processing::classify::LocalZone;
use crate::pipeline::processing::normalize::{NormalizeContext, UnclassifiedEnding};

pub const IDENTITY_ENV: &str = "CHESS_IDENTITY";
pub const TIMEZONE_ENV: &str = "CHESS_TIMEZONE";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// Username whose games are being archived
    pub identity: String,
    /// IANA zone for local date/time fields; the system zone when unset
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub unclassified_ending: UnclassifiedEnding,
}

impl Config {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            timezone: None,
            unclassified_ending: UnclassifiedEnding::default(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_content = fs::read_to_string(path).map_err(|e| {
            NormalizeError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&config_content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply `CHESS_IDENTITY` / `CHESS_TIMEZONE` from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup; empty values are ignored
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(identity) = non_empty(IDENTITY_ENV) {
            self.identity = identity;
        }
        if let Some(timezone) = non_empty(TIMEZONE_ENV) {
            self.timezone = Some(timezone);
        }
        self
    }

    pub fn zone(&self) -> Result<LocalZone> {
        match self.timezone.as_deref() {
            Some(name) => LocalZone::parse(name),
            None => Ok(LocalZone::System),
        }
    }

    /// Validate and build the context every normalization call receives
    pub fn context(&self) -> Result<NormalizeContext> {
        let identity = self.identity.trim();
        if identity.is_empty() {
            return Err(NormalizeError::Config("identity must not be empty".to_string()));
        }
        Ok(NormalizeContext::new(identity)
            .with_zone(self.zone()?)
            .with_unclassified_ending(self.unclassified_ending))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_from_toml_defaults() {
        let config = Config::from_toml_str("identity = \"seanyseand\"\n").unwrap();
        assert_eq!(config.identity, "seanyseand");
        assert_eq!(config.timezone, None);
        assert_eq!(config.unclassified_ending, UnclassifiedEnding::Keep);
        assert_eq!(config.context().unwrap().zone, LocalZone::System);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "identity = \"alice\"\ntimezone = \"Europe/Berlin\"\nunclassified_ending = \"drop\""
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        let ctx = config.context().unwrap();
        assert_eq!(ctx.identity, "alice");
        assert_eq!(ctx.zone.to_string(), "Europe/Berlin");
        assert_eq!(ctx.unclassified_ending, UnclassifiedEnding::Drop);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, NormalizeError::Config(_)));
    }

    #[test]
    fn test_missing_identity_is_toml_error() {
        assert!(matches!(
            Config::from_toml_str("timezone = \"UTC\""),
            Err(NormalizeError::Toml(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [(IDENTITY_ENV, "bob"), (TIMEZONE_ENV, "")].into_iter().collect();
        let config = Config::new("alice").with_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.identity, "bob");
        assert_eq!(config.timezone, None);
    }

    #[test]
    fn test_context_rejects_bad_values() {
        assert!(Config::new("  ").context().is_err());
        let mut config = Config::new("alice");
        config.timezone = Some("Not/AZone".to_string());
        assert!(matches!(config.context(), Err(NormalizeError::Config(_))));
    }
}
