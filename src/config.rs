use std::{str::FromStr, time::Duration};

use serde::Deserialize;
use thiserror::Error;

use crate::framework::ChannelId;

#[derive(Deserialize, Clone)]
pub struct DemoConfig {
    pub channel_id: String,
    pub prompt: String,
    #[serde(default)]
    pub reactions: Vec<String>,
    #[serde(default)]
    pub data: Vec<String>,
}

impl DemoConfig {
    pub fn channel_id(&self) -> Result<ChannelId, ConfigError> {
        ChannelId::from_str(self.channel_id.as_str())
            .map_err(|_| ConfigError::InvalidChannelId(self.channel_id.clone()))
    }
}

#[derive(Deserialize, Clone)]
pub struct Config {
    pub discord_token: String,
    #[serde(default = "default_timed_message_delay_seconds")]
    pub timed_message_delay_seconds: u64,
    pub log_filter: Option<String>,
    pub demo: Option<DemoConfig>,
}

fn default_timed_message_delay_seconds() -> u64 {
    60
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("missing Discord token")]
    MissingToken,
    #[error("invalid channel ID: {0}")]
    InvalidChannelId(String),
}

impl Config {
    pub fn load(config_contents: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(config_contents)?;

        if config.discord_token.trim().is_empty() {
            return Err(ConfigError::MissingToken)
        }

        if let Some(demo) = &config.demo {
            demo.channel_id()?;
        }

        Ok(config)
    }

    pub fn timed_message_delay(&self) -> Duration {
        Duration::from_secs(self.timed_message_delay_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_minimal_config_with_defaults() {
        let config = Config::load(r#"discord_token = "abc""#).unwrap();

        assert_eq!(config.discord_token, "abc");
        assert_eq!(config.timed_message_delay(), Duration::from_secs(60));
        assert!(config.log_filter.is_none());
        assert!(config.demo.is_none());
    }

    #[test]
    fn loads_demo_section() {
        let config = Config::load(
            r#"
            discord_token = "abc"
            timed_message_delay_seconds = 5
            log_filter = "debug"

            [demo]
            channel_id = "1234567890"
            prompt = "Pick one"
            reactions = ["👍", "👎"]
            "#,
        )
        .unwrap();

        assert_eq!(config.timed_message_delay(), Duration::from_secs(5));
        assert_eq!(config.log_filter.as_deref(), Some("debug"));

        let demo = config.demo.unwrap();
        assert_eq!(demo.channel_id().unwrap(), ChannelId::new(1234567890));
        assert_eq!(demo.reactions, vec!["👍", "👎"]);
        assert!(demo.data.is_empty());
    }

    #[test]
    fn rejects_empty_token() {
        assert!(matches!(
            Config::load(r#"discord_token = "  ""#),
            Err(ConfigError::MissingToken)
        ));
    }

    #[test]
    fn rejects_bad_channel_id() {
        let result = Config::load(
            r#"
            discord_token = "abc"

            [demo]
            channel_id = "general"
            prompt = "hi"
            "#,
        );

        assert!(matches!(result, Err(ConfigError::InvalidChannelId(id)) if id == "general"));
    }

    #[test]
    fn reports_parse_errors() {
        assert!(matches!(Config::load("discord_token = "), Err(ConfigError::Parse(_))));
    }
}
