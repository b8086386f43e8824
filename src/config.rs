use chrono::Duration;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has an invalid value: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub session_ttl_minutes: i64,
    pub max_upload_bytes: usize,
    pub currency_label: String,
    pub static_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            session_ttl_minutes: 60,
            max_upload_bytes: 10 * 1024 * 1024, // 10MB
            currency_label: "PLN".to_string(),
            static_dir: PathBuf::from("static"),
        }
    }
}

impl Config {
    /// Read settings from the process environment (after `.env` is loaded).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let session_ttl_minutes = parse_or(&lookup, "SESSION_TTL_MINUTES", defaults.session_ttl_minutes)?;
        if session_ttl_minutes <= 0 || Duration::try_minutes(session_ttl_minutes).is_none() {
            return Err(ConfigError::Invalid {
                key: "SESSION_TTL_MINUTES",
                value: session_ttl_minutes.to_string(),
            });
        }
        let max_upload_mb: usize = parse_or(&lookup, "MAX_UPLOAD_MB", 10)?;
        let max_upload_bytes = max_upload_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| ConfigError::Invalid {
                key: "MAX_UPLOAD_MB",
                value: max_upload_mb.to_string(),
            })?;

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            session_ttl_minutes,
            max_upload_bytes,
            currency_label: lookup("CURRENCY_LABEL").unwrap_or(defaults.currency_label),
            static_dir: lookup("STATIC_DIR").map(PathBuf::from).unwrap_or(defaults.static_dir),
        })
    }

    /// Idle time after which a session is dropped. Falls back to the default
    /// when the field was set by hand to something out of range.
    pub fn session_ttl(&self) -> Duration {
        Duration::try_minutes(self.session_ttl_minutes)
            .filter(|ttl| *ttl > Duration::zero())
            .unwrap_or_else(|| Duration::minutes(Self::default().session_ttl_minutes))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.session_ttl_minutes, 60);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.currency_label, "PLN");
        assert_eq!(config.static_dir, PathBuf::from("static"));
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("SESSION_TTL_MINUTES", "5"),
            ("MAX_UPLOAD_MB", "1"),
            ("CURRENCY_LABEL", "EUR"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.session_ttl_minutes, 5);
        assert_eq!(config.max_upload_bytes, 1024 * 1024);
        assert_eq!(config.currency_label, "EUR");
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "PORT",
                value: "eighty".to_string()
            }
        );
        assert!(config_from(&[("SESSION_TTL_MINUTES", "0")]).is_err());
    }

    #[test]
    fn rejects_values_that_overflow() {
        let huge_ttl = i64::MAX.to_string();
        let err = config_from(&[("SESSION_TTL_MINUTES", huge_ttl.as_str())]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "SESSION_TTL_MINUTES",
                value: huge_ttl.clone()
            }
        );

        let huge_upload = usize::MAX.to_string();
        let err = config_from(&[("MAX_UPLOAD_MB", huge_upload.as_str())]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "MAX_UPLOAD_MB", .. }));
    }

    #[test]
    fn session_ttl_stays_in_range() {
        let config = Config {
            session_ttl_minutes: i64::MAX,
            ..Config::default()
        };
        assert_eq!(config.session_ttl(), Duration::minutes(60));
        assert_eq!(Config::default().session_ttl(), Duration::minutes(60));
    }
}
