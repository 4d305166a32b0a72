//! Registration timing configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::network::Network;

/// Default time the wallet has to sign, in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 300_000;

/// Default delay between registration checks, in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;

/// Default countdown granularity, in milliseconds
pub const DEFAULT_COUNTDOWN_TICK_MS: u64 = 1_000;

/// Default pause in `verifying` before reporting completion, in milliseconds
pub const DEFAULT_FEEDBACK_DELAY_MS: u64 = 500;

/// Timing and network settings for [`KeyRegistration`](super::KeyRegistration)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationConfig {
    /// Network the signing URI targets
    pub network: Network,
    /// Total time from entering `waiting` until the attempt times out
    pub timeout_ms: u64,
    /// Delay between registration checks
    pub poll_interval_ms: u64,
    /// Countdown update interval
    pub countdown_tick_ms: u64,
    /// Pause in `verifying` before `complete`
    pub feedback_delay_ms: u64,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            countdown_tick_ms: DEFAULT_COUNTDOWN_TICK_MS,
            feedback_delay_ms: DEFAULT_FEEDBACK_DELAY_MS,
        }
    }
}

impl RegistrationConfig {
    /// Defaults for a network
    pub fn for_network(network: Network) -> Self {
        Self {
            network,
            ..Self::default()
        }
    }

    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("invalid registration config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the state machine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(Error::Config("timeout_ms must be positive".into()));
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::Config("poll_interval_ms must be positive".into()));
        }
        if self.countdown_tick_ms == 0 {
            return Err(Error::Config("countdown_tick_ms must be positive".into()));
        }
        if self.countdown_tick_ms > self.timeout_ms {
            return Err(Error::Config(
                "countdown_tick_ms must not exceed timeout_ms".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub(crate) fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub(crate) fn countdown_tick(&self) -> Duration {
        Duration::from_millis(self.countdown_tick_ms)
    }

    pub(crate) fn feedback_delay(&self) -> Duration {
        Duration::from_millis(self.feedback_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RegistrationConfig::default();
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.timeout_ms, 300_000);
        assert_eq!(config.poll_interval_ms, 5_000);
        assert_eq!(config.countdown_tick_ms, 1_000);
        assert_eq!(config.feedback_delay_ms, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            RegistrationConfig::from_json(r#"{"network": "mainnet", "timeout_ms": 60000}"#).unwrap();
        assert_eq!(config.network, Network::Mainnet);
        assert_eq!(config.timeout_ms, 60_000);
        assert_eq!(config.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
    }

    #[test]
    fn test_invalid_configs() {
        assert!(matches!(
            RegistrationConfig::from_json(r#"{"poll_interval_ms": 0}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            RegistrationConfig::from_json(r#"{"timeout_ms": 500, "countdown_tick_ms": 1000}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            RegistrationConfig::from_json(r#"{"network": "regtest"}"#),
            Err(Error::Config(_))
        ));
        assert!(RegistrationConfig::from_json("not json").is_err());
    }
}
