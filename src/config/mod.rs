//! Configuration management.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::product::Bsx8Polarity;
use crate::protocol::MAX_PAYLOAD_SIZE;

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Framing configuration.
    #[serde(default)]
    pub protocol: ProtocolConfig,

    /// Product identification configuration.
    #[serde(default)]
    pub product: ProductConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("Failed to read config: {e}")))?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| Error::Config(format!("Failed to write config: {e}")))?;

        Ok(())
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.protocol.stx_count == 0 {
            return Err(Error::InvalidConfig(
                "Frames need at least one STX byte".into(),
            ));
        }

        if self.protocol.max_payload == 0 || self.protocol.max_payload > MAX_PAYLOAD_SIZE {
            return Err(Error::InvalidConfig(format!(
                "max_payload must be between 1 and {MAX_PAYLOAD_SIZE}, got {}",
                self.protocol.max_payload
            )));
        }

        Ok(())
    }
}

/// Framing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Reject frames whose CRC does not match.
    #[serde(default = "default_verify_crc")]
    pub verify_crc: bool,

    /// Wakeup bytes sent before each frame.
    #[serde(default = "default_wakeup_count")]
    pub wakeup_count: u8,

    /// STX bytes sent before each frame.
    #[serde(default = "default_stx_count")]
    pub stx_count: u8,

    /// Largest accepted payload.
    #[serde(default = "default_max_payload")]
    pub max_payload: usize,

    /// Skip junk and malformed frames instead of failing.
    #[serde(default = "default_resync")]
    pub resync: bool,
}

fn default_verify_crc() -> bool {
    true
}
fn default_wakeup_count() -> u8 {
    1
}
fn default_stx_count() -> u8 {
    1
}
fn default_max_payload() -> usize {
    MAX_PAYLOAD_SIZE
}
fn default_resync() -> bool {
    true
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            verify_crc: default_verify_crc(),
            wakeup_count: default_wakeup_count(),
            stx_count: default_stx_count(),
            max_payload: default_max_payload(),
            resync: default_resync(),
        }
    }
}

/// Product identification configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductConfig {
    /// UART1 polarity separating `Bsm8` from `Bsf8`.
    #[serde(default)]
    pub bsx8_polarity: Bsx8Polarity,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (text or json).
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Enable colored output.
    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}
fn default_color() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            color: default_color(),
        }
    }
}

/// Initialize logging.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        subscriber
            .with(fmt::layer().json())
            .try_init()
            .map_err(|e| Error::Config(format!("Failed to init logging: {e}")))?;
    } else {
        subscriber
            .with(fmt::layer().with_ansi(config.color))
            .try_init()
            .map_err(|e| Error::Config(format!("Failed to init logging: {e}")))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.protocol.verify_crc);
        assert_eq!(config.protocol.stx_count, 1);
        assert_eq!(config.protocol.max_payload, 255);
        assert_eq!(config.product.bsx8_polarity, Bsx8Polarity::UsbMeansMaster);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = Config::from_toml(
            r#"
            [protocol]
            wakeup_count = 2

            [product]
            bsx8_polarity = "usb-means-srr"
            "#,
        )
        .unwrap();
        assert_eq!(config.protocol.wakeup_count, 2);
        assert!(config.protocol.resync);
        assert_eq!(config.product.bsx8_polarity, Bsx8Polarity::UsbMeansSrr);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_validate() {
        assert!(matches!(
            Config::from_toml("[protocol]\nstx_count = 0\n"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(Config::from_toml("[protocol]\nmax_payload = 300\n").is_err());
        assert!(matches!(
            Config::from_toml("[product]\nbsx8_polarity = \"sideways\"\n"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sportident.toml");

        let mut config = Config::default();
        config.protocol.verify_crc = false;
        config.logging.format = "json".into();
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
        assert!(Config::load(dir.path().join("missing.toml")).is_err());
    }
}
