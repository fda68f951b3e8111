use crate::StoreError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// When stored entries expire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "ExpiryConfig", into = "ExpiryConfig")]
pub enum Expiry {
    /// Entries live until removed
    #[default]
    Never,
    /// Entries live as long as the process; requires a non-persistent backend
    Session,
    /// Entries expire this many milliseconds after the store is created
    After(u64),
}

/// Expiry as written in TOML: `"never"`, `"session"` or milliseconds
///
/// A millisecond count of zero or less means no expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ExpiryConfig {
    Keyword(String),
    Millis(i64),
}

impl TryFrom<ExpiryConfig> for Expiry {
    type Error = String;

    fn try_from(config: ExpiryConfig) -> Result<Self, Self::Error> {
        match config {
            ExpiryConfig::Keyword(word) => match word.to_lowercase().as_str() {
                "never" => Ok(Expiry::Never),
                "session" => Ok(Expiry::Session),
                _ => Err(format!("unknown expiry '{}'", word)),
            },
            ExpiryConfig::Millis(ms) if ms > 0 => Ok(Expiry::After(ms as u64)),
            ExpiryConfig::Millis(_) => Ok(Expiry::Never),
        }
    }
}

impl From<Expiry> for ExpiryConfig {
    fn from(expiry: Expiry) -> Self {
        match expiry {
            Expiry::Never => ExpiryConfig::Keyword("never".to_string()),
            Expiry::Session => ExpiryConfig::Keyword("session".to_string()),
            Expiry::After(ms) => ExpiryConfig::Millis(i64::try_from(ms).unwrap_or(i64::MAX)),
        }
    }
}

/// Settings a [`Store`](crate::Store) is opened with
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub expires: Expiry,
}

impl StoreSettings {
    pub fn new(expires: Expiry) -> Self {
        StoreSettings { expires }
    }

    /// Parse settings from a TOML string
    pub fn parse(toml: &str) -> Result<Self, StoreError> {
        toml::from_str(toml).map_err(|e| StoreError::InvalidSettings(e.to_string()))
    }

    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| StoreError::Io {
            error: e,
            path: path.to_path_buf(),
        })?;
        Self::parse(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_expiry() {
        assert_eq!(StoreSettings::parse("").unwrap().expires, Expiry::Never);
        assert_eq!(
            StoreSettings::parse("expires = \"session\"").unwrap().expires,
            Expiry::Session
        );
        assert_eq!(
            StoreSettings::parse("expires = 5000").unwrap().expires,
            Expiry::After(5000)
        );
        assert_eq!(
            StoreSettings::parse("expires = -3").unwrap().expires,
            Expiry::Never
        );
    }

    #[test]
    fn test_unknown_keyword() {
        let err = StoreSettings::parse("expires = \"tomorrow\"").unwrap_err();
        assert!(matches!(err, StoreError::InvalidSettings(_)));
    }

    #[test]
    fn test_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.toml");
        std::fs::write(&path, "expires = 250\n").unwrap();
        assert_eq!(StoreSettings::load(&path).unwrap().expires, Expiry::After(250));

        let missing = StoreSettings::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, StoreError::Io { .. }));
    }
}
