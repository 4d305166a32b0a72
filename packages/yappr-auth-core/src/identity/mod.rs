//! # Identity Module
//!
//! Read-only model of on-chain identities and their public keys, plus the
//! logic that ties local private keys to them.
//!
//! ## Identity Keys
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        IDENTITY PUBLIC KEY                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  id              u32, unique within the identity                       │
//! │  type            how `data` encodes the key                            │
//! │                    0 ECDSA_SECP256K1  → 33-byte compressed point       │
//! │                    1 BLS12_381        → 48-byte point                  │
//! │                    2 ECDSA_HASH160    → 20-byte hash160                │
//! │                    3 BIP13_SCRIPT_HASH                                  │
//! │                    4 EDDSA_25519_HASH160                                │
//! │  purpose         authentication, encryption, transfer, ...             │
//! │  security level  master, critical, high, medium                        │
//! │  disabled at     set once the key has been revoked                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identities are fetched through the [`IdentityLookup`] collaborator; this
//! crate never talks to the network itself.

mod classify;
mod id;
mod matcher;

pub use classify::{determine_key_type, KeyKind};
pub use id::{IdentityId, IDENTITY_ID_SIZE};
pub use matcher::{find_matching_key, find_matching_key_for_private_key, MatchedKey};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How an identity key's `data` is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum KeyType {
    /// Raw compressed secp256k1 public key
    EcdsaSecp256k1,
    /// BLS12-381 public key
    Bls12_381,
    /// hash160 of a compressed secp256k1 public key
    EcdsaHash160,
    /// BIP13 script hash
    Bip13ScriptHash,
    /// hash160 of an Ed25519 public key
    EddsaHash160,
}

/// What an identity key may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum KeyPurpose {
    /// Signing state transitions and logging in
    Authentication,
    /// Encrypting data for others to read
    Encryption,
    /// Decrypting data sent to the identity
    Decryption,
    /// Moving credits
    Transfer,
    /// Platform system operations
    System,
    /// Governance voting
    Voting,
    /// Masternode owner operations
    Owner,
}

/// How much an identity key is trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SecurityLevel {
    /// Can add and disable other keys
    Master,
    /// Critical operations
    Critical,
    /// Everyday signing
    High,
    /// Low-value operations
    Medium,
}

macro_rules! u8_codes {
    ($ty:ident, $what:literal, { $($code:literal => $variant:ident),+ $(,)? }) => {
        impl TryFrom<u8> for $ty {
            type Error = Error;

            fn try_from(code: u8) -> Result<Self> {
                match code {
                    $($code => Ok($ty::$variant),)+
                    other => Err(Error::Validation(format!("unknown {} {}", $what, other))),
                }
            }
        }

        impl From<$ty> for u8 {
            fn from(value: $ty) -> u8 {
                match value {
                    $($ty::$variant => $code,)+
                }
            }
        }
    };
}

u8_codes!(KeyType, "key type", {
    0 => EcdsaSecp256k1,
    1 => Bls12_381,
    2 => EcdsaHash160,
    3 => Bip13ScriptHash,
    4 => EddsaHash160,
});

u8_codes!(KeyPurpose, "key purpose", {
    0 => Authentication,
    1 => Encryption,
    2 => Decryption,
    3 => Transfer,
    4 => System,
    5 => Voting,
    6 => Owner,
});

u8_codes!(SecurityLevel, "security level", {
    0 => Master,
    1 => Critical,
    2 => High,
    3 => Medium,
});

/// A public key registered on an identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityPublicKeyInfo {
    /// Key id within the identity
    pub id: u32,
    /// Encoding of `data`
    #[serde(rename = "type")]
    pub key_type: KeyType,
    /// Permitted use
    pub purpose: KeyPurpose,
    /// Trust level
    pub security_level: SecurityLevel,
    /// Key material in the encoding named by `key_type`
    pub data: Vec<u8>,
    /// When the key was disabled, if it has been
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled_at: Option<u64>,
}

impl IdentityPublicKeyInfo {
    /// Whether the key is still usable
    pub fn is_enabled(&self) -> bool {
        self.disabled_at.is_none()
    }
}

/// The parts of an on-chain identity this crate reads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRecord {
    /// Every key ever registered, including disabled ones
    pub public_keys: Vec<IdentityPublicKeyInfo>,
}

impl IdentityRecord {
    /// Enabled keys with the given purpose
    pub fn enabled_keys_with_purpose(
        &self,
        purpose: KeyPurpose,
    ) -> impl Iterator<Item = &IdentityPublicKeyInfo> {
        self.public_keys
            .iter()
            .filter(move |key| key.purpose == purpose && key.is_enabled())
    }
}

/// Source of on-chain identity records
///
/// Owned by the host application; retry and backoff are its concern.
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    /// Fetch an identity, or `None` if it does not exist
    async fn get_identity(&self, identity_id: &IdentityId) -> Result<Option<IdentityRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_roundtrip() {
        for code in 0u8..=4 {
            assert_eq!(u8::from(KeyType::try_from(code).unwrap()), code);
        }
        for code in 0u8..=6 {
            assert_eq!(u8::from(KeyPurpose::try_from(code).unwrap()), code);
        }
        for code in 0u8..=3 {
            assert_eq!(u8::from(SecurityLevel::try_from(code).unwrap()), code);
        }

        assert!(KeyType::try_from(5).is_err());
        assert!(KeyPurpose::try_from(7).is_err());
        assert!(SecurityLevel::try_from(4).is_err());
    }

    #[test]
    fn test_public_key_json() {
        let json = r#"{
            "id": 2,
            "type": 2,
            "purpose": 1,
            "securityLevel": 3,
            "data": [1, 2, 3],
            "disabledAt": 1700000000000
        }"#;

        let key: IdentityPublicKeyInfo = serde_json::from_str(json).unwrap();
        assert_eq!(key.id, 2);
        assert_eq!(key.key_type, KeyType::EcdsaHash160);
        assert_eq!(key.purpose, KeyPurpose::Encryption);
        assert_eq!(key.security_level, SecurityLevel::Medium);
        assert!(!key.is_enabled());

        let bad = json.replace("\"type\": 2", "\"type\": 9");
        assert!(serde_json::from_str::<IdentityPublicKeyInfo>(&bad).is_err());
    }

    #[test]
    fn test_enabled_keys_with_purpose() {
        let key = |id, purpose, disabled_at| IdentityPublicKeyInfo {
            id,
            key_type: KeyType::EcdsaSecp256k1,
            purpose,
            security_level: SecurityLevel::High,
            data: vec![0x02; 33],
            disabled_at,
        };

        let record = IdentityRecord {
            public_keys: vec![
                key(0, KeyPurpose::Authentication, None),
                key(1, KeyPurpose::Encryption, Some(5)),
                key(2, KeyPurpose::Encryption, None),
            ],
        };

        let ids: Vec<u32> = record
            .enabled_keys_with_purpose(KeyPurpose::Encryption)
            .map(|key| key.id)
            .collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_security_level_ordering() {
        assert!(SecurityLevel::Master < SecurityLevel::High);
    }
}
