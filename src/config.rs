//! Runtime configuration for the chart engine.
//!
//! Every field has a default, so an empty object is a valid configuration.

use crate::domain::chart::ChartConfig;
use crate::domain::errors::ConfigurationError;
use crate::domain::market_data::{TrendBasis, ViewWindow};
use crate::time_utils::{local_offset, offset_from_minutes};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const MAX_TICKS: usize = 24;
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub refresh_interval_secs: u32,
    pub default_window_hours: i64,
    pub x_ticks: usize,
    pub y_ticks: usize,
    pub trend_basis: TrendBasis,
    /// Offset applied to naive service timestamps.
    pub server_utc_offset_minutes: i32,
    /// Offset for axis labels; `None` follows the viewer's local zone.
    pub display_utc_offset_minutes: Option<i32>,
    pub chart: ChartConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            refresh_interval_secs: 60,
            default_window_hours: 24,
            x_ticks: 6,
            y_ticks: 5,
            trend_basis: TrendBasis::Timestamp,
            server_utc_offset_minutes: 0,
            display_utc_offset_minutes: None,
            chart: ChartConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let config: AppConfig =
            serde_json::from_str(json).map_err(|e| ConfigurationError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JS object; `undefined` and `null` mean all defaults.
    pub fn from_js(value: &wasm_bindgen::JsValue) -> Result<Self, ConfigurationError> {
        use gloo::utils::format::JsValueSerdeExt;

        if value.is_undefined() || value.is_null() {
            return Ok(Self::default());
        }
        let config: AppConfig = value.into_serde().map_err(|e| ConfigurationError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.api_base_url.trim().is_empty() {
            return Err(invalid("api_base_url", "must not be empty"));
        }
        if self.refresh_interval_secs == 0 {
            return Err(invalid("refresh_interval_secs", "must be positive"));
        }
        ViewWindow::new(self.default_window_hours)
            .map_err(|e| invalid("default_window_hours", e.to_string()))?;
        for (name, ticks) in [("x_ticks", self.x_ticks), ("y_ticks", self.y_ticks)] {
            if ticks > MAX_TICKS {
                return Err(invalid(name, format!("at most {MAX_TICKS} ticks")));
            }
        }
        if self.server_utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(invalid("server_utc_offset_minutes", "must be within +/-14h"));
        }
        if self.display_utc_offset_minutes.is_some_and(|m| m.abs() > MAX_OFFSET_MINUTES) {
            return Err(invalid("display_utc_offset_minutes", "must be within +/-14h"));
        }
        self.chart.validate().map_err(|e| invalid("chart", e.to_string()))?;
        Ok(())
    }

    pub fn default_window(&self) -> ViewWindow {
        ViewWindow::new(self.default_window_hours).unwrap_or_default()
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.refresh_interval_secs))
    }

    pub fn server_offset(&self) -> FixedOffset {
        offset_from_minutes(self.server_utc_offset_minutes)
    }

    pub fn display_offset(&self) -> FixedOffset {
        self.display_utc_offset_minutes.map_or_else(local_offset, offset_from_minutes)
    }

    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigurationError {
    ConfigurationError::InvalidParameter { name, reason: reason.into() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.refresh_interval(), Duration::from_secs(60));
        assert_eq!(config.default_window().hours(), 24);
    }

    #[test]
    fn partial_overrides_keep_other_defaults() {
        let config = AppConfig::from_json(
            r#"{"api_base_url":"http://prices.local/","trend_basis":"sample_index","chart":{"width":1000}}"#,
        )
        .unwrap();
        assert_eq!(config.base_url(), "http://prices.local");
        assert_eq!(config.trend_basis, TrendBasis::SampleIndex);
        assert_eq!(config.chart.width, 1000.0);
        assert_eq!(config.chart.height, 450.0);
    }

    #[test]
    fn axis_labels_do_not_follow_the_server_offset() {
        let config =
            AppConfig::from_json(r#"{"server_utc_offset_minutes":60,"display_utc_offset_minutes":-300}"#).unwrap();
        assert_eq!(config.server_offset().local_minus_utc(), 3600);
        assert_eq!(config.display_offset().local_minus_utc(), -5 * 3600);

        let local = AppConfig::from_json(r#"{"server_utc_offset_minutes":60}"#).unwrap();
        assert_eq!(local.display_offset(), local_offset());
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            AppConfig::from_json(r#"{"default_window_hours":30}"#),
            Err(ConfigurationError::InvalidParameter { name: "default_window_hours", .. })
        ));
        assert!(matches!(
            AppConfig::from_json(r#"{"refresh_interval_secs":0}"#),
            Err(ConfigurationError::InvalidParameter { name: "refresh_interval_secs", .. })
        ));
        assert!(matches!(
            AppConfig::from_json(r#"{"chart":{"width":50}}"#),
            Err(ConfigurationError::InvalidParameter { name: "chart", .. })
        ));
        assert!(matches!(
            AppConfig::from_json(r#"{"display_utc_offset_minutes":900}"#),
            Err(ConfigurationError::InvalidParameter { name: "display_utc_offset_minutes", .. })
        ));
        assert!(matches!(AppConfig::from_json("[1,"), Err(ConfigurationError::Parse(_))));
    }
}
