use chrono::{FixedOffset, Local, Offset};
use serde::Deserialize;
use std::time::Duration;

/// Environment variables kept from the original deployment, applied last
const ENV_OVERRIDES: [(&str, &str); 4] = [
    ("feed.base_url", "CONSENTIUM_BASE_URL"),
    ("feed.receive_key", "CONSENTIUM_RECEIVE_KEY"),
    ("feed.board_key", "CONSENTIUM_BOARD_KEY"),
    ("advisory.api_key", "GEMINI_API_KEY"),
];

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub feed: FeedSettings,
    #[serde(default)]
    pub polling: PollingSettings,
    #[serde(default)]
    pub advisory: AdvisorySettings,
    #[serde(default)]
    pub quality: QualitySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedSettings {
    pub base_url: Option<String>,
    pub receive_key: Option<String>,
    pub board_key: Option<String>,
    #[serde(default = "default_feed_timeout")]
    pub timeout_secs: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            receive_key: None,
            board_key: None,
            timeout_secs: default_feed_timeout(),
        }
    }
}

/// Fully specified feed location. Only exists when every credential is set.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEndpoint {
    pub base_url: String,
    pub receive_key: String,
    pub board_key: String,
}

impl FeedSettings {
    /// The single point deciding whether the feed runs in disabled mode.
    pub fn endpoint(&self) -> Option<FeedEndpoint> {
        Some(FeedEndpoint {
            base_url: non_blank(&self.base_url)?.trim_end_matches('/').to_string(),
            receive_key: non_blank(&self.receive_key)?.to_string(),
            board_key: non_blank(&self.board_key)?.to_string(),
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollingSettings {
    #[serde(default = "default_live_interval")]
    pub live_interval_secs: u64,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    #[serde(default = "default_advisory_cooldown")]
    pub advisory_cooldown_secs: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            live_interval_secs: default_live_interval(),
            history_capacity: default_history_capacity(),
            advisory_cooldown_secs: default_advisory_cooldown(),
        }
    }
}

impl PollingSettings {
    pub fn live_interval(&self) -> Duration {
        Duration::from_secs(self.live_interval_secs.max(1))
    }

    pub fn advisory_cooldown(&self) -> Duration {
        Duration::from_secs(self.advisory_cooldown_secs)
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryMode {
    #[default]
    Recommendations,
    Forecast,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdvisorySettings {
    pub api_key: Option<String>,
    #[serde(default = "default_advisory_base_url")]
    pub base_url: String,
    #[serde(default = "default_advisory_model")]
    pub model: String,
    #[serde(default = "default_advisory_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub mode: AdvisoryMode,
    #[serde(default = "default_forecast_window")]
    pub forecast_window: usize,
}

impl Default for AdvisorySettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_advisory_base_url(),
            model: default_advisory_model(),
            timeout_secs: default_advisory_timeout(),
            mode: AdvisoryMode::default(),
            forecast_window: default_forecast_window(),
        }
    }
}

impl AdvisorySettings {
    /// API key if one is configured; `None` means advisory calls are disabled.
    pub fn api_key(&self) -> Option<&str> {
        non_blank(&self.api_key)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct QualitySettings {
    #[serde(default)]
    pub ph_aware: bool,
    pub utc_offset_minutes: Option<i32>,
}

impl QualitySettings {
    /// Offset used to render reading times. Falls back to the host's current
    /// offset, resolved once.
    pub fn display_offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .and_then(|minutes| FixedOffset::east_opt(minutes.saturating_mul(60)))
            .unwrap_or_else(|| Local::now().offset().fix())
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_feed_timeout() -> u64 {
    10
}

fn default_live_interval() -> u64 {
    5
}

fn default_history_capacity() -> usize {
    crate::domain::history::DEFAULT_CAPACITY
}

fn default_advisory_cooldown() -> u64 {
    240
}

fn default_advisory_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_advisory_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_advisory_timeout() -> u64 {
    30
}

fn default_forecast_window() -> usize {
    12
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Loads `config/monitor.*` (optional), then `AQUASENSE__*` environment
/// variables, then the legacy provider variables.
pub fn load_config() -> anyhow::Result<AppConfig> {
    let mut builder = config::Config::builder()
        .add_source(config::File::with_name("config/monitor").required(false))
        .add_source(
            config::Environment::with_prefix("AQUASENSE")
                .separator("__")
                .try_parsing(true),
        );

    for (key, var) in ENV_OVERRIDES {
        builder = builder.set_override_option(key, std::env::var(var).ok())?;
    }

    Ok(builder.build()?.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse("");

        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.polling.live_interval(), Duration::from_secs(5));
        assert_eq!(config.polling.history_capacity, 50);
        assert_eq!(config.polling.advisory_cooldown(), Duration::from_secs(240));
        assert_eq!(config.advisory.model, "gemini-2.5-flash");
        assert_eq!(config.advisory.mode, AdvisoryMode::Recommendations);
        assert!(config.advisory.api_key().is_none());
        assert!(!config.quality.ph_aware);
        assert!(config.feed.endpoint().is_none());
    }

    #[test]
    fn test_feed_endpoint_requires_every_credential() {
        let config = parse(
            r#"
            [feed]
            base_url = "https://api.example.com/v2/"
            receive_key = "rk"
            board_key = "bk"
            "#,
        );
        assert_eq!(
            config.feed.endpoint(),
            Some(FeedEndpoint {
                base_url: "https://api.example.com/v2".to_string(),
                receive_key: "rk".to_string(),
                board_key: "bk".to_string(),
            })
        );

        let config = parse(
            r#"
            [feed]
            base_url = "https://api.example.com"
            receive_key = "rk"
            board_key = "   "
            "#,
        );
        assert!(config.feed.endpoint().is_none());
    }

    #[test]
    fn test_sections_override_defaults() {
        let config = parse(
            r#"
            [polling]
            live_interval_secs = 2
            history_capacity = 10

            [advisory]
            api_key = "key"
            mode = "forecast"
            forecast_window = 6

            [quality]
            ph_aware = true
            utc_offset_minutes = 330
            "#,
        );

        assert_eq!(config.polling.live_interval(), Duration::from_secs(2));
        assert_eq!(config.polling.history_capacity, 10);
        assert_eq!(config.advisory.api_key(), Some("key"));
        assert_eq!(config.advisory.mode, AdvisoryMode::Forecast);
        assert_eq!(config.advisory.forecast_window, 6);
        assert!(config.quality.ph_aware);
        assert_eq!(
            config.quality.display_offset(),
            FixedOffset::east_opt(330 * 60).unwrap()
        );
    }
}
