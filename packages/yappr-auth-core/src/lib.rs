//! # Yappr Auth Core
//!
//! Wallet-to-app key exchange and remote key registration for Dash Platform
//! identities. The app never holds the identity's master keys: it receives
//! a login key from the user's wallet over a QR code, derives its own
//! purpose keys from it, and asks the wallet to sign the transition that
//! registers them.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        YAPPR AUTH CORE MODULES                          │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌──────────────────┐   ┌──────────────────┐   ┌──────────────────┐    │
//! │  │      login       │   │   registration   │   │       uri        │    │
//! │  │                  │   │                  │   │                  │    │
//! │  │ - LoginSession   │   │ - state machine  │   │ - dash-key:      │    │
//! │  │ - complete_login │   │ - countdown/poll │   │ - dash-st:       │    │
//! │  └────────┬─────────┘   └────────┬─────────┘   └────────┬─────────┘    │
//! │           │                      │                      │              │
//! │           └──────────────────────┼──────────────────────┘              │
//! │                                  │                                      │
//! │  ┌──────────────────┐   ┌────────┴─────────┐   ┌──────────────────┐    │
//! │  │     identity     │   │      crypto      │   │       wif        │    │
//! │  │                  │   │                  │   │                  │    │
//! │  │ - key model      │   │ - secp256k1 ECDH │   │ - Base58Check    │    │
//! │  │ - key matcher    │   │ - AES-256-GCM    │   │ - network prefix │    │
//! │  │ - derived check  │   │ - HKDF chains    │   │                  │    │
//! │  └──────────────────┘   └──────────────────┘   └──────────────────┘    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`network`] - Dash network selection
//! - [`crypto`] - Keys, ECDH, AEAD and key derivation
//! - [`wif`] - Wallet Import Format codec
//! - [`uri`] - `dash-key:` and `dash-st:` URI codecs
//! - [`identity`] - Identity key model, matching and classification
//! - [`login`] - The login key exchange
//! - [`registration`] - The key registration state machine
//!
//! ## Collaborators
//!
//! Network access is delegated to the host through three traits:
//! [`IdentityLookup`], [`TransitionBuilder`] and [`RegistrationCheck`].
//! Their retry policy is the host's business.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod crypto;
pub mod error;
pub mod identity;
pub mod login;
pub mod network;
pub mod registration;
pub mod uri;
pub mod wif;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use crypto::{DerivedKey, EphemeralKeyPair, LoginKey, PrivateKey, SharedSecret, WalletResponse};
pub use error::{Error, ErrorReport, Result};
pub use identity::{IdentityId, IdentityLookup, IdentityPublicKeyInfo, IdentityRecord};
pub use login::{complete_login, LoginOutcome, LoginSession};
pub use network::Network;
pub use registration::{
    KeyRegistration, Phase, RegistrationCheck, RegistrationConfig, RegistrationResult,
    RegistrationState, TransitionBuilder,
};
pub use uri::{KeyExchangeRequest, ProtocolUri, StateTransitionRequest, TransitionType};

/// Crate version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
