use crate::domain::chart::SurfaceSize;
use crate::domain::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// Host-supplied engine settings. Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartConfig {
    /// Prefix for `GET {base_url}/series`.
    pub base_url: String,
    pub poll_interval_ms: u32,
    pub fetch_timeout_ms: u32,
    pub resize_debounce_ms: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("/api"),
            poll_interval_ms: 10_000,
            fetch_timeout_ms: 15_000,
            resize_debounce_ms: 150,
            width: 800,
            height: 500,
        }
    }
}

impl ChartConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ConfigError::InvalidSetting(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidSetting("pollIntervalMs must be positive".into()));
        }
        if self.fetch_timeout_ms == 0 {
            return Err(ConfigError::InvalidSetting("fetchTimeoutMs must be positive".into()));
        }
        if self.initial_size().is_empty() {
            return Err(ConfigError::InvalidSetting(format!(
                "surface size {} must be non-empty",
                self.initial_size()
            )));
        }
        Ok(())
    }

    pub fn initial_size(&self) -> SurfaceSize {
        SurfaceSize::new(self.width, self.height)
    }

    /// Endpoint URL without the query string.
    pub fn series_url(&self) -> String {
        format!("{}/series", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        assert_eq!(ChartConfig::from_json("{}").unwrap(), ChartConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = ChartConfig::from_json(r#"{"baseUrl":"https://x.test/","pollIntervalMs":5000}"#)
            .unwrap();
        assert_eq!(config.poll_interval_ms, 5000);
        assert_eq!(config.fetch_timeout_ms, 15_000);
        assert_eq!(config.series_url(), "https://x.test/series");
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(matches!(
            ChartConfig::from_json(r#"{"pollIntervalMs":0}"#),
            Err(ConfigError::InvalidSetting(_))
        ));
        assert!(ChartConfig::from_json("not json").is_err());
    }
}
