//! Service configuration parsed from environment variables.

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SIDE2_EXPORT_BASENAME: &str = "survey_data";
pub const DEFAULT_SIDE1_EXPORT_BASENAME: &str = "survey_scan";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
pub const DEFAULT_MAX_OCCURRENCES: i64 = 200;
pub const DEFAULT_SCAN_MAX_TOKENS: u32 = 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// CSV filename prefix for manual-entry exports.
    pub side2_export_basename: String,
    /// CSV filename prefix for scan exports.
    pub side1_export_basename: String,
    /// Request body cap for image uploads.
    pub max_upload_bytes: usize,
    /// Largest Q1 count accepted over HTTP.
    pub max_occurrences: i64,
    /// Output token cap for one survey scan.
    pub scan_max_tokens: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            side2_export_basename: DEFAULT_SIDE2_EXPORT_BASENAME.into(),
            side1_export_basename: DEFAULT_SIDE1_EXPORT_BASENAME.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_occurrences: DEFAULT_MAX_OCCURRENCES,
            scan_max_tokens: DEFAULT_SCAN_MAX_TOKENS,
        }
    }
}

impl AppConfig {
    /// Build config from environment variables.
    ///
    /// - `PORT`: default 3000
    /// - `SIDE2_EXPORT_BASENAME`: default `survey_data`
    /// - `SIDE1_EXPORT_BASENAME`: default `survey_scan`
    /// - `MAX_UPLOAD_BYTES`: default 20 MiB
    /// - `MAX_OCCURRENCES`: default 200
    /// - `SCAN_MAX_TOKENS`: default 1024
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();
        Ok(Self {
            port: parse_or(get("PORT"), "PORT", defaults.port)?,
            side2_export_basename: get("SIDE2_EXPORT_BASENAME").unwrap_or(defaults.side2_export_basename),
            side1_export_basename: get("SIDE1_EXPORT_BASENAME").unwrap_or(defaults.side1_export_basename),
            max_upload_bytes: parse_or(get("MAX_UPLOAD_BYTES"), "MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            max_occurrences: parse_or(get("MAX_OCCURRENCES"), "MAX_OCCURRENCES", defaults.max_occurrences)?,
            scan_max_tokens: parse_or(get("SCAN_MAX_TOKENS"), "SCAN_MAX_TOKENS", defaults.scan_max_tokens)?,
        })
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
