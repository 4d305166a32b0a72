//! Observable state of a key registration.

use crate::crypto::CompressedPublicKey;
use crate::error::{Error, ErrorReport};

/// Where the current attempt is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Nothing in progress
    #[default]
    Idle,
    /// Building the unsigned transition
    Building,
    /// URI shown, waiting for the wallet to sign
    Waiting,
    /// Keys found on chain, holding before completion
    Verifying,
    /// Keys registered
    Complete,
    /// Build failed or timed out
    Error,
}

impl Phase {
    /// Lowercase phase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Building => "building",
            Phase::Waiting => "waiting",
            Phase::Verifying => "verifying",
            Phase::Complete => "complete",
            Phase::Error => "error",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a completed registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationResult {
    /// Key id assigned to the auth key
    pub auth_key_id: u32,
    /// Key id assigned to the encryption key
    pub encryption_key_id: u32,
    /// Registered auth public key
    pub auth_public_key: CompressedPublicKey,
    /// Registered encryption public key
    pub encryption_public_key: CompressedPublicKey,
}

/// Snapshot published to observers on every change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationState {
    /// Current phase
    pub phase: Phase,
    /// `dash-st:` signing URI, set from `waiting` on
    pub uri: Option<String>,
    /// Time left before the attempt times out
    pub remaining_ms: Option<u64>,
    /// Why the attempt failed, in `error`
    pub error: Option<ErrorReport>,
    /// Registered key ids, in `complete`
    pub result: Option<RegistrationResult>,
}

impl RegistrationState {
    pub(crate) fn building() -> Self {
        Self {
            phase: Phase::Building,
            ..Self::default()
        }
    }

    pub(crate) fn failed(err: &Error) -> Self {
        Self {
            phase: Phase::Error,
            error: Some(err.into()),
            ..Self::default()
        }
    }
}
