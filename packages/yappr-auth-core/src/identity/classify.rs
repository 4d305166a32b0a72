//! Derived-vs-external classification of on-chain keys.
//!
//! Answers "was this identity's key derived from our auth key, or added by
//! some other wallet?" by re-deriving and comparing every time. Nothing is
//! cached, so the answer always reflects the chain.

use super::matcher::key_data_matches;
use super::{IdentityId, IdentityLookup, KeyPurpose};
use crate::crypto::{derive_encryption_key_from_auth, hash160};
use crate::error::Result;

/// Where an on-chain key came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Matches the key derived from the auth key
    Derived,
    /// Some other key
    External,
}

/// Classify an identity's keys of `purpose` against a candidate auth key
///
/// Returns `None` when the identity does not exist or has no enabled key
/// with that purpose. Otherwise derives the encryption key from
/// `auth_private_key` (the auth-key chain) and reports `Derived` if any such
/// key carries its public key, `External` if none does.
pub async fn determine_key_type(
    auth_private_key: &[u8],
    identity_id: &IdentityId,
    purpose: KeyPurpose,
    lookup: &dyn IdentityLookup,
) -> Result<Option<KeyKind>> {
    let Some(identity) = lookup.get_identity(identity_id).await? else {
        tracing::debug!(identity = %identity_id, "Identity not found while classifying keys");
        return Ok(None);
    };

    let candidates: Vec<_> = identity.enabled_keys_with_purpose(purpose).collect();
    if candidates.is_empty() {
        return Ok(None);
    }

    let derived = derive_encryption_key_from_auth(auth_private_key, &identity_id.to_base58())?;
    let public_key = derived.public_key()?;
    let key_hash = hash160(&public_key);

    let kind = if candidates
        .iter()
        .any(|key| key_data_matches(key, &public_key, &key_hash))
    {
        KeyKind::Derived
    } else {
        KeyKind::External
    };

    tracing::debug!(identity = %identity_id, ?purpose, ?kind, "Classified identity key");
    Ok(Some(kind))
}
