//! # Identity Key Matcher
//!
//! Finds which on-chain key (if any) a private key controls.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            MATCHING                                     │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  WIF ──decode──► private key ──► compressed public key (33 B)          │
//! │   │                                     │                               │
//! │   └─ wrong network? → no match          └──► hash160 (20 B)            │
//! │                                                                         │
//! │  for each enabled on-chain key, in order:                              │
//! │    ECDSA_SECP256K1  data == public key   → match                       │
//! │    ECDSA_HASH160    data == hash160      → match                       │
//! │    anything else    skipped                                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Comparisons are not constant-time. Every compared value is derivable
//! from the key the caller already holds.

use super::{IdentityPublicKeyInfo, KeyPurpose, KeyType, SecurityLevel};
use crate::crypto::{hash160, CompressedPublicKey, PrivateKey};
use crate::error::Result;
use crate::network::Network;
use crate::wif;

/// The on-chain key a private key corresponds to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedKey {
    /// Key id within the identity
    pub key_id: u32,
    /// Security level of the matched key
    pub security_level: SecurityLevel,
    /// Purpose of the matched key
    pub purpose: KeyPurpose,
    /// Compressed public key of the private key that matched
    pub public_key: CompressedPublicKey,
}

/// Find the identity key controlled by a WIF-encoded private key
///
/// A WIF for another network yields `Ok(None)`, exactly like a key that
/// matches nothing. A malformed WIF is an `InvalidWif` error.
pub fn find_matching_key(
    wif: &str,
    identity_public_keys: &[IdentityPublicKeyInfo],
    network: Network,
) -> Result<Option<MatchedKey>> {
    let decoded = wif::decode(wif)?;

    if !wif::validate_network(decoded.network_prefix, network) {
        tracing::debug!(
            prefix = decoded.network_prefix,
            network = %network,
            "WIF is for a different network; treating as no match"
        );
        return Ok(None);
    }

    Ok(find_matching_key_for_private_key(
        &decoded.private_key,
        identity_public_keys,
    ))
}

/// Find the identity key controlled by an already-decoded private key
pub fn find_matching_key_for_private_key(
    private_key: &PrivateKey,
    identity_public_keys: &[IdentityPublicKeyInfo],
) -> Option<MatchedKey> {
    let public_key = private_key.public_key();
    let key_hash = hash160(&public_key);

    identity_public_keys
        .iter()
        .filter(|key| key.is_enabled())
        .find(|key| key_data_matches(key, &public_key, &key_hash))
        .map(|key| MatchedKey {
            key_id: key.id,
            security_level: key.security_level,
            purpose: key.purpose,
            public_key,
        })
}

/// Whether an on-chain key's data encodes the given public key
pub(crate) fn key_data_matches(
    key: &IdentityPublicKeyInfo,
    public_key: &CompressedPublicKey,
    key_hash: &[u8; 20],
) -> bool {
    match key.key_type {
        KeyType::EcdsaSecp256k1 => key.data.as_slice() == public_key.as_slice(),
        KeyType::EcdsaHash160 => key.data.as_slice() == key_hash.as_slice(),
        KeyType::Bls12_381 | KeyType::Bip13ScriptHash | KeyType::EddsaHash160 => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn private_key(n: u8) -> PrivateKey {
        let mut bytes = [0u8; 32];
        bytes[31] = n;
        PrivateKey::from_bytes(&bytes).unwrap()
    }

    /// Key 1 is the raw public key of scalar 1; key 2 is the hash160 of
    /// scalar 2's public key.
    fn identity_keys() -> Vec<IdentityPublicKeyInfo> {
        vec![
            IdentityPublicKeyInfo {
                id: 1,
                key_type: KeyType::EcdsaSecp256k1,
                purpose: KeyPurpose::Authentication,
                security_level: SecurityLevel::Master,
                data: hex::decode(
                    "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
                )
                .unwrap(),
                disabled_at: None,
            },
            IdentityPublicKeyInfo {
                id: 2,
                key_type: KeyType::EcdsaHash160,
                purpose: KeyPurpose::Encryption,
                security_level: SecurityLevel::Medium,
                data: hex::decode("06afd46bcdfd22ef94ac122aa11f241244a37ecc").unwrap(),
                disabled_at: None,
            },
        ]
    }

    fn testnet_wif(n: u8) -> String {
        wif::encode(&private_key(n), true, Network::Testnet)
    }

    #[test]
    fn test_matches_raw_public_key() {
        let matched = find_matching_key(&testnet_wif(1), &identity_keys(), Network::Testnet)
            .unwrap()
            .unwrap();

        assert_eq!(matched.key_id, 1);
        assert_eq!(matched.security_level, SecurityLevel::Master);
        assert_eq!(matched.purpose, KeyPurpose::Authentication);
        assert_eq!(matched.public_key, private_key(1).public_key());
    }

    #[test]
    fn test_matches_hash160() {
        let matched = find_matching_key(&testnet_wif(2), &identity_keys(), Network::Testnet)
            .unwrap()
            .unwrap();

        assert_eq!(matched.key_id, 2);
        assert_eq!(matched.purpose, KeyPurpose::Encryption);
    }

    #[test]
    fn test_unrelated_key_is_none() {
        let matched =
            find_matching_key(&testnet_wif(3), &identity_keys(), Network::Testnet).unwrap();
        assert!(matched.is_none());
    }

    #[test]
    fn test_network_mismatch_is_none() {
        let matched =
            find_matching_key(&testnet_wif(1), &identity_keys(), Network::Mainnet).unwrap();
        assert!(matched.is_none());
    }

    #[test]
    fn test_malformed_wif_is_error() {
        assert!(matches!(
            find_matching_key("not-a-wif", &identity_keys(), Network::Testnet),
            Err(Error::InvalidWif(_))
        ));
    }

    #[test]
    fn test_disabled_key_skipped() {
        let mut keys = identity_keys();
        keys[0].disabled_at = Some(1);

        assert!(find_matching_key_for_private_key(&private_key(1), &keys).is_none());
        assert!(find_matching_key_for_private_key(&private_key(2), &keys).is_some());
    }

    #[test]
    fn test_first_match_wins() {
        let mut keys = identity_keys();
        let mut duplicate = keys[0].clone();
        duplicate.id = 7;
        keys.push(duplicate);

        let matched = find_matching_key_for_private_key(&private_key(1), &keys).unwrap();
        assert_eq!(matched.key_id, 1);
    }

    #[test]
    fn test_unsupported_types_never_match() {
        let mut keys = identity_keys();
        keys[0].key_type = KeyType::Bls12_381;
        assert!(find_matching_key_for_private_key(&private_key(1), &keys).is_none());
    }
}
