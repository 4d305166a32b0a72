//! # Network Selection
//!
//! Dash network identifiers and the constants that differ between them.
//!
//! | Network | URI code | WIF prefix |
//! |---------|----------|------------|
//! | mainnet | `m`      | `0xCC`     |
//! | testnet | `t`      | `0xEF`     |
//! | devnet  | `d`      | `0xEF`     |

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// WIF version byte for mainnet private keys
pub const MAINNET_WIF_PREFIX: u8 = 0xCC;

/// WIF version byte for testnet (and devnet) private keys
pub const TESTNET_WIF_PREFIX: u8 = 0xEF;

/// A Dash network
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Production network
    Mainnet,
    /// Public test network
    #[default]
    Testnet,
    /// Developer networks (share testnet key prefixes)
    Devnet,
}

impl Network {
    /// Single-character code used in the `n=` URI parameter
    pub fn uri_code(&self) -> &'static str {
        match self {
            Network::Mainnet => "m",
            Network::Testnet => "t",
            Network::Devnet => "d",
        }
    }

    /// Parse a `n=` URI parameter value
    pub fn from_uri_code(code: &str) -> Option<Self> {
        match code {
            "m" => Some(Network::Mainnet),
            "t" => Some(Network::Testnet),
            "d" => Some(Network::Devnet),
            _ => None,
        }
    }

    /// WIF version byte expected for private keys on this network
    pub fn wif_prefix(&self) -> u8 {
        match self {
            Network::Mainnet => MAINNET_WIF_PREFIX,
            Network::Testnet | Network::Devnet => TESTNET_WIF_PREFIX,
        }
    }

    /// Lowercase network name
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "m" => Ok(Network::Mainnet),
            "testnet" | "t" => Ok(Network::Testnet),
            "devnet" | "d" => Ok(Network::Devnet),
            other => Err(Error::Config(format!("unknown network '{}'", other))),
        }
    }
}
