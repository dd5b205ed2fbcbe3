use std::path::Path;
use std::time::Duration;

use notepad_editor_core::SuggestionSettings;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// Overrides `endpoint`.
pub const ENV_SUGGEST_URL: &str = "NOTEPAD_SUGGEST_URL";
/// Overrides `debounce_ms`.
pub const ENV_DEBOUNCE_MS: &str = "NOTEPAD_DEBOUNCE_MS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
    /// Base URL of the completion service. Lookups go to `{endpoint}/suggest`.
    pub endpoint: String,
    /// Per-request timeout.
    pub timeout_ms: u64,
    /// Quiet period after typing before a lookup is sent.
    pub debounce_ms: u64,
    /// Shortest typed prefix that is looked up.
    pub min_prefix_len: usize,
    /// Most suggestions shown at once.
    pub max_items: usize,
}

impl Default for SuggestConfig {
    /// Defaults match the development service on `localhost:8080`.
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080".to_owned(),
            timeout_ms: 2000,
            debounce_ms: 200,
            min_prefix_len: 2,
            max_items: 5,
        }
    }
}

impl SuggestConfig {
    /// Load from a `.json` or `.toml` file, picked by extension. Missing
    /// fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(path, &text)?;
        debug!(path = %path.display(), endpoint = %config.endpoint, "loaded suggestion config");
        Ok(config)
    }

    fn parse(path: &Path, text: &str) -> Result<Self, ConfigError> {
        let config: Self = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(text).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            }),
            Some("toml") => toml::from_str(text).map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            }),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }?;
        config.validate(path)?;
        Ok(config)
    }

    /// `max_items = 0` would never show a suggestion. A `min_prefix_len` of 0
    /// is accepted; empty prefixes are never looked up regardless.
    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        if self.max_items == 0 {
            return Err(ConfigError::Invalid {
                path: path.to_path_buf(),
                field: "max_items",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Apply `NOTEPAD_SUGGEST_URL` and `NOTEPAD_DEBOUNCE_MS` from the process
    /// environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup(ENV_SUGGEST_URL).filter(|url| !url.is_empty()) {
            self.endpoint = url;
        }
        if let Some(value) = lookup(ENV_DEBOUNCE_MS) {
            self.debounce_ms = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_DEBOUNCE_MS,
                value,
            })?;
        }
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The part of the config the editor core consumes.
    pub fn settings(&self) -> SuggestionSettings {
        SuggestionSettings {
            debounce: Duration::from_millis(self.debounce_ms),
            min_prefix_len: self.min_prefix_len,
            max_items: self.max_items,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_defaults_match_editor_defaults() {
        let config = SuggestConfig::default();
        assert_eq!(config.endpoint, "http://localhost:8080");
        assert_eq!(config.settings(), SuggestionSettings::default());
        assert_eq!(config.timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_parse_toml_with_partial_fields() {
        let config = SuggestConfig::parse(
            Path::new("notepad.toml"),
            "endpoint = \"http://dict.internal:9000\"\nmax_items = 3\n",
        )
        .unwrap();
        assert_eq!(config.endpoint, "http://dict.internal:9000");
        assert_eq!(config.max_items, 3);
        assert_eq!(config.debounce_ms, 200);
    }

    #[test]
    fn test_parse_json() {
        let config =
            SuggestConfig::parse(Path::new("notepad.json"), r#"{"debounce_ms": 350}"#).unwrap();
        assert_eq!(config.settings().debounce, Duration::from_millis(350));
    }

    #[test]
    fn test_zero_max_items_is_rejected() {
        let err =
            SuggestConfig::parse(Path::new("notepad.toml"), "max_items = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "max_items", .. }));

        let err = SuggestConfig::parse(Path::new("notepad.json"), r#"{"max_items": 0}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "max_items", .. }));
    }

    #[test]
    fn test_zero_min_prefix_is_accepted() {
        let config =
            SuggestConfig::parse(Path::new("notepad.toml"), "min_prefix_len = 0\n").unwrap();
        assert_eq!(config.settings().min_prefix_len, 0);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let err = SuggestConfig::parse(Path::new("notepad.yaml"), "").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_overrides() {
        let env = HashMap::from([
            (ENV_SUGGEST_URL, "http://127.0.0.1:8181".to_string()),
            (ENV_DEBOUNCE_MS, " 75 ".to_string()),
        ]);
        let config = SuggestConfig::default()
            .with_overrides(|var| env.get(var).cloned())
            .unwrap();
        assert_eq!(config.endpoint, "http://127.0.0.1:8181");
        assert_eq!(config.debounce_ms, 75);
    }

    #[test]
    fn test_bad_debounce_override() {
        let err = SuggestConfig::default()
            .with_overrides(|var| (var == ENV_DEBOUNCE_MS).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { value, .. } if value == "soon"));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = SuggestConfig::load("/nonexistent/notepad.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/notepad.toml"));
    }
}
