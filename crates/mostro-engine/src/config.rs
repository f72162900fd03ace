use mostro_common::Network;
use mostro_safety::Limits;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MostroInstance {
    pub name: String,
    pub pubkey: String,
    pub relays: Vec<String>,
}

/// Typed mirror of the configuration file (§3 "Configuration", §6
/// "Configuration file"). Validated eagerly on load rather than lazily at
/// first use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub mostro_pubkey: String,
    pub relays: Vec<String>,
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default = "default_price_api")]
    pub price_api: String,
    #[serde(default = "default_max_premium_deviation")]
    pub max_premium_deviation: f64,
    #[serde(default)]
    pub mostro_instances: Option<Vec<MostroInstance>>,
}

fn default_price_api() -> String {
    "https://price.mostro.network/api".to_string()
}

fn default_max_premium_deviation() -> f64 {
    5.0
}

impl Config {
    pub fn from_json(raw: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), EngineError> {
        if self.mostro_pubkey.is_empty() || hex::decode(&self.mostro_pubkey).map(|b| b.len()) != Ok(32) {
            return Err(EngineError::ConfigInvalid(
                "mostro_pubkey must be 32-byte hex".to_string(),
            ));
        }
        if self.relays.is_empty() {
            return Err(EngineError::ConfigInvalid(
                "relays list must not be empty".to_string(),
            ));
        }
        for relay in &self.relays {
            if !(relay.starts_with("ws://") || relay.starts_with("wss://")) {
                return Err(EngineError::ConfigInvalid(format!(
                    "relay URL {relay} is not a websocket URL"
                )));
            }
        }
        Ok(())
    }
}
