//! Analytics configuration file.
//!
//! # Responsibility
//! - Load `AnalyticsConfig` from TOML with per-field defaults.
//! - Validate locale tags, log level and log directory before use.
//!
//! # Invariants
//! - A missing field never fails parsing; it takes its default.
//! - A loaded config has already passed `validate`.

use crate::logging::{default_log_level, normalize_level};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

static LOCALE_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z]{2,3}(-[A-Za-z0-9]{2,8})*$").expect("valid locale tag regex")
});

/// Runtime settings shared by the CLI and embedding callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// SQLite planning database.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Locale used when the requested translation is missing.
    #[serde(default = "default_locale")]
    pub default_locale: String,

    #[serde(default = "default_level")]
    pub log_level: String,

    /// File logging is off when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            default_locale: default_locale(),
            log_level: default_level(),
            log_dir: None,
        }
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from("stratplan.db")
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_level() -> String {
    default_log_level().to_string()
}

impl AnalyticsConfig {
    /// Reads and validates the TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parses and validates TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_locale(&self.default_locale) {
            return Err(ConfigError::InvalidLocale(self.default_locale.clone()));
        }
        normalize_level(&self.log_level)
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))?;
        if let Some(dir) = &self.log_dir {
            if dir.as_os_str().is_empty() || !dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir.clone()));
            }
        }
        Ok(())
    }
}

/// True for BCP-47-like tags such as `en`, `ar`, `en-US`, `zh-Hant-TW`.
pub fn is_valid_locale(tag: &str) -> bool {
    LOCALE_TAG_RE.is_match(tag)
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    InvalidLocale(String),
    InvalidLogLevel(String),
    /// `log_dir` must be absolute.
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config file: {err}"),
            Self::InvalidLocale(tag) => write!(f, "invalid locale tag `{tag}`"),
            Self::InvalidLogLevel(level) => write!(f, "invalid log level `{level}`"),
            Self::RelativeLogDir(dir) => write!(
                f,
                "log_dir must be an absolute path, got `{}`",
                dir.display()
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{is_valid_locale, AnalyticsConfig, ConfigError};
    use std::path::PathBuf;

    #[test]
    fn empty_file_uses_defaults() {
        let config = AnalyticsConfig::from_toml_str("").unwrap();
        assert_eq!(config, AnalyticsConfig::default());
        assert_eq!(config.default_locale, "en");
        assert_eq!(config.database_path, PathBuf::from("stratplan.db"));
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn explicit_fields_override_defaults() {
        let config = AnalyticsConfig::from_toml_str(
            r#"
            database_path = "/var/lib/stratplan/plan.db"
            default_locale = "ar"
            log_level = "warn"
            log_dir = "/var/log/stratplan"
            "#,
        )
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/var/lib/stratplan/plan.db"));
        assert_eq!(config.default_locale, "ar");
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/stratplan")));
    }

    #[test]
    fn invalid_locale_is_rejected() {
        let err = AnalyticsConfig::from_toml_str(r#"default_locale = "english!""#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLocale(tag) if tag == "english!"));
    }

    #[test]
    fn invalid_log_level_is_rejected() {
        let err = AnalyticsConfig::from_toml_str(r#"log_level = "loud""#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogLevel(_)));
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        let err = AnalyticsConfig::from_toml_str(r#"log_dir = "logs/dev""#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::RelativeLogDir(ref dir) if dir == &PathBuf::from("logs/dev")
        ));

        let err = AnalyticsConfig::from_toml_str(r#"log_dir = """#).unwrap_err();
        assert!(matches!(err, ConfigError::RelativeLogDir(_)));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = AnalyticsConfig::from_toml_str("default_locale = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn locale_tags() {
        for tag in ["en", "ar", "en-US", "zh-Hant-TW", "fil"] {
            assert!(is_valid_locale(tag), "{tag}");
        }
        for tag in ["", "e", "en_US", "en-", "english"] {
            assert!(!is_valid_locale(tag), "{tag}");
        }
    }
}
