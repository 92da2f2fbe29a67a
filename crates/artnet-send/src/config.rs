//! Sender configuration file

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use artnet_engine::codec::MAX_CHANNELS;
use artnet_engine::ArtNetSettings;
use serde::{Deserialize, Serialize};

use crate::logging_setup::LogConfig;
use crate::pattern::Pattern;

/// Top-level `artnet-send` configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    pub artnet: ArtNetSettings,
    pub output: OutputConfig,
    pub log: LogConfig,
}

/// What to send and how often
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Send passes per second
    pub rate_hz: u32,
    /// Stop after this many seconds; run until killed when absent
    pub duration_secs: Option<f64>,
    /// Channels per universe
    pub channels: usize,
    /// Port-Addresses to drive; the configured base universe when empty
    pub universes: Vec<u16>,
    pub pattern: Pattern,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            rate_hz: 40,
            duration_secs: Some(10.0),
            channels: 512,
            universes: Vec::new(),
            pattern: Pattern::default(),
        }
    }
}

impl OutputConfig {
    /// Reject values the send loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.rate_hz == 0 {
            bail!("output.rate_hz must be at least 1");
        }
        if !(1..=MAX_CHANNELS).contains(&self.channels) {
            bail!(
                "output.channels must be 1-{}, got {}",
                MAX_CHANNELS,
                self.channels
            );
        }
        if let Some(secs) = self.duration_secs {
            if !secs.is_finite() || secs < 0.0 || Duration::try_from_secs_f64(secs).is_err() {
                bail!(
                    "output.duration_secs must be a finite, non-negative number of seconds, got {}",
                    secs
                );
            }
        }
        Ok(())
    }
}

impl SenderConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&source).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: SenderConfig = toml::from_str(
            r#"
            [artnet]
            bind_address = "10.0.0.5"
            port = 6454
            universe = 2
            broadcast_address = "10.255.255.255"

            [output]
            rate_hz = 30
            channels = 24
            universes = [1, 2, 258]
            pattern = "fade"

            [log]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.artnet.universe, 2);
        assert_eq!(config.output.rate_hz, 30);
        assert_eq!(config.output.universes, vec![1, 2, 258]);
        assert_eq!(config.output.pattern, Pattern::Fade);
        assert_eq!(config.output.duration_secs, Some(10.0));
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_output_validation() {
        assert!(OutputConfig::default().validate().is_ok());

        let rejected = [
            OutputConfig { rate_hz: 0, ..Default::default() },
            OutputConfig { channels: 0, ..Default::default() },
            OutputConfig { channels: 513, ..Default::default() },
            OutputConfig { duration_secs: Some(f64::INFINITY), ..Default::default() },
            OutputConfig { duration_secs: Some(f64::NAN), ..Default::default() },
            OutputConfig { duration_secs: Some(-1.0), ..Default::default() },
            OutputConfig { duration_secs: Some(1e300), ..Default::default() },
        ];
        for output in &rejected {
            assert!(output.validate().is_err(), "accepted {:?}", output);
        }

        let forever = OutputConfig { duration_secs: None, ..Default::default() };
        assert!(forever.validate().is_ok());
    }

    #[test]
    fn test_infinite_duration_from_toml_is_rejected() {
        let config: SenderConfig = toml::from_str("[output]\nduration_secs = inf").unwrap();
        assert!(config.output.validate().is_err());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: SenderConfig = toml::from_str("").unwrap();
        assert_eq!(config, SenderConfig::default());
        assert!(config.artnet.validate().is_ok());
    }
}
