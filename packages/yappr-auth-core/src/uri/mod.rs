//! # Protocol URIs
//!
//! QR-code URIs exchanged between the app and the wallet.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          URI SCHEMES                                    │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  dash-key:<base58>?n=<m|t|d>&v=1                                       │
//! │      Login key request (app → wallet)                                  │
//! │                                                                         │
//! │  dash-st:<base58>?n=<m|t|d>&v=1&t=iu                                   │
//! │      State transition signing request (app → wallet)                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Builders validate and return `Result`. Parsers take whatever a camera
//! scanned, so they never fail loudly: every rejection is `None` plus a
//! `debug` log with the reason. Tools that want the reason use
//! `str::parse::<ProtocolUri>()`, which reports it as `Error::InvalidUri`.

mod key_exchange;
mod state_transition;

pub use key_exchange::{KeyExchangeRequest, KEY_EXCHANGE_SCHEME, MAX_LABEL_LEN, MIN_KEY_EXCHANGE_PAYLOAD};
pub use state_transition::{StateTransitionRequest, TransitionType, STATE_TRANSITION_SCHEME};

use crate::error::Error;
use crate::network::Network;

/// The only protocol version either scheme accepts
pub const PROTOCOL_VERSION: u8 = 1;

/// Why a scanned URI was rejected
pub(crate) type Rejection = &'static str;

/// Either kind of protocol URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolUri {
    /// A `dash-key:` login request
    KeyExchange(KeyExchangeRequest, Network),
    /// A `dash-st:` signing request
    StateTransition(StateTransitionRequest),
}

impl ProtocolUri {
    /// Parse a URI of either scheme
    pub fn parse(uri: &str) -> Option<Self> {
        let scheme = uri.split_once(':').map_or("", |(scheme, _)| scheme);
        reject(scheme, Self::dispatch(uri))
    }

    fn dispatch(uri: &str) -> Result<Self, Rejection> {
        if uri.starts_with(KEY_EXCHANGE_SCHEME) {
            KeyExchangeRequest::parse_inner(uri)
                .map(|(request, network)| ProtocolUri::KeyExchange(request, network))
        } else if uri.starts_with(STATE_TRANSITION_SCHEME) {
            StateTransitionRequest::parse_inner(uri).map(ProtocolUri::StateTransition)
        } else {
            Err("unknown scheme")
        }
    }
}

impl std::str::FromStr for ProtocolUri {
    type Err = Error;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        Self::dispatch(s).map_err(|reason| Error::InvalidUri(reason.into()))
    }
}

/// A URI split into its Base58 payload and query parameters
pub(crate) struct UriParts<'a> {
    pub payload: Vec<u8>,
    params: Vec<(&'a str, &'a str)>,
}

impl<'a> UriParts<'a> {
    /// Split `<scheme><base58>?<query>` and decode the payload
    pub fn split(uri: &'a str, scheme: &str) -> Result<Self, Rejection> {
        let rest = uri.strip_prefix(scheme).ok_or("unknown scheme")?;
        let (payload, query) = rest.split_once('?').ok_or("missing query parameters")?;

        if payload.is_empty() {
            return Err("empty payload");
        }
        let payload = bs58::decode(payload)
            .into_vec()
            .map_err(|_| "payload is not Base58")?;

        let params = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
            .collect();

        Ok(Self { payload, params })
    }

    /// First value of a query parameter
    pub fn param(&self, name: &str) -> Option<&'a str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    /// The `n=` parameter
    pub fn network(&self) -> Result<Network, Rejection> {
        let code = self.param("n").ok_or("missing network parameter")?;
        Network::from_uri_code(code).ok_or("unknown network code")
    }

    /// Require `v=` to be exactly the supported version
    pub fn check_version(&self) -> Result<(), Rejection> {
        let version = self.param("v").ok_or("missing version parameter")?;
        if version == PROTOCOL_VERSION.to_string() {
            Ok(())
        } else {
            Err("unsupported protocol version")
        }
    }
}

/// Log a rejection and turn it into `None`
pub(crate) fn reject<T>(scheme: &str, result: Result<T, Rejection>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(reason) => {
            tracing::debug!(scheme, reason, "Rejected URI");
            None
        }
    }
}
