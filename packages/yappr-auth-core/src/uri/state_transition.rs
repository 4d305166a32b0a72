//! # State Transition Request
//!
//! The `dash-st:` URI an app shows to have the wallet sign and broadcast a
//! pre-built state transition.
//!
//! ```text
//! dash-st:<base58(transition bytes)>?n=<m|t|d>&v=1&t=<type code>
//! ```
//!
//! The transition bytes are opaque here; the wallet decodes them.

use super::{reject, Rejection, UriParts, PROTOCOL_VERSION};
use crate::error::{Error, Result};
use crate::network::Network;

/// URI scheme prefix, including the colon
pub const STATE_TRANSITION_SCHEME: &str = "dash-st:";

/// Kind of state transition being requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionType {
    /// Add or disable identity keys
    IdentityUpdate,
}

impl TransitionType {
    /// Code used in the `t=` parameter
    pub fn code(&self) -> &'static str {
        match self {
            TransitionType::IdentityUpdate => "iu",
        }
    }

    /// Parse a `t=` parameter value
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "iu" => Some(TransitionType::IdentityUpdate),
            _ => None,
        }
    }
}

/// A request for the wallet to sign a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransitionRequest {
    /// Serialized unsigned transition
    pub transition_bytes: Vec<u8>,
    /// Kind of transition
    pub transition_type: TransitionType,
    /// Network the transition is for
    pub network: Network,
}

impl StateTransitionRequest {
    /// Wrap pre-serialized transition bytes
    pub fn new(transition_bytes: Vec<u8>, transition_type: TransitionType, network: Network) -> Self {
        Self {
            transition_bytes,
            transition_type,
            network,
        }
    }

    /// Build the `dash-st:` URI
    ///
    /// Fails with `Validation` if there are no transition bytes.
    pub fn build_uri(&self) -> Result<String> {
        if self.transition_bytes.is_empty() {
            return Err(Error::Validation("transition bytes are empty".into()));
        }

        Ok(format!(
            "{}{}?n={}&v={}&t={}",
            STATE_TRANSITION_SCHEME,
            bs58::encode(&self.transition_bytes).into_string(),
            self.network.uri_code(),
            PROTOCOL_VERSION,
            self.transition_type.code()
        ))
    }

    /// Parse a scanned `dash-st:` URI
    ///
    /// Total: anything but a well-formed version 1 request yields `None`.
    pub fn parse_uri(uri: &str) -> Option<Self> {
        reject(STATE_TRANSITION_SCHEME, Self::parse_inner(uri))
    }

    pub(crate) fn parse_inner(uri: &str) -> std::result::Result<Self, Rejection> {
        let parts = UriParts::split(uri, STATE_TRANSITION_SCHEME)?;
        let network = parts.network()?;
        parts.check_version()?;

        let code = parts.param("t").ok_or("missing transition type parameter")?;
        let transition_type = TransitionType::from_code(code).ok_or("unknown transition type")?;

        Ok(Self {
            transition_bytes: parts.payload,
            transition_type,
            network,
        })
    }
}
