//! # Wallet Import Format
//!
//! Base58Check encoding of secp256k1 private keys.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          WIF PAYLOAD                                    │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Uncompressed (33 bytes):  prefix(1) ‖ key(32)                         │
//! │  Compressed   (34 bytes):  prefix(1) ‖ key(32) ‖ 0x01                  │
//! │                                                                         │
//! │  + 4-byte double-SHA256 checksum, then Base58                          │
//! │                                                                         │
//! │  prefix: 0xCC mainnet, 0xEF testnet/devnet                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use zeroize::Zeroizing;

use crate::crypto::{PrivateKey, PRIVATE_KEY_SIZE};
use crate::error::{Error, Result};
use crate::network::Network;

const UNCOMPRESSED_LEN: usize = 1 + PRIVATE_KEY_SIZE;
const COMPRESSED_LEN: usize = UNCOMPRESSED_LEN + 1;
const COMPRESSION_FLAG: u8 = 0x01;

/// A decoded WIF
#[derive(Debug, Clone)]
pub struct DecodedWif {
    /// The private key
    pub private_key: PrivateKey,
    /// Whether the key is marked for compressed public key use
    pub compressed: bool,
    /// Network version byte
    pub network_prefix: u8,
}

/// Decode a WIF string
///
/// Fails with `InvalidWif` on a bad Base58Check checksum, a payload that is
/// neither 33 bytes nor 34 bytes ending in `0x01`, or a key outside the
/// curve order. The network prefix is returned as-is; check it with
/// [`validate_network`].
pub fn decode(wif: &str) -> Result<DecodedWif> {
    let payload = Zeroizing::new(
        bs58::decode(wif.trim())
            .with_check(None)
            .into_vec()
            .map_err(|e| Error::InvalidWif(format!("Base58Check decoding failed: {}", e)))?,
    );

    let compressed = match payload.len() {
        UNCOMPRESSED_LEN => false,
        COMPRESSED_LEN if payload[COMPRESSED_LEN - 1] == COMPRESSION_FLAG => true,
        COMPRESSED_LEN => {
            return Err(Error::InvalidWif(format!(
                "compression flag must be 0x01, got 0x{:02x}",
                payload[COMPRESSED_LEN - 1]
            )))
        }
        other => {
            return Err(Error::InvalidWif(format!(
                "decoded length must be {} or {} bytes, got {}",
                UNCOMPRESSED_LEN, COMPRESSED_LEN, other
            )))
        }
    };

    let private_key = PrivateKey::from_bytes(&payload[1..UNCOMPRESSED_LEN])
        .map_err(|e| Error::InvalidWif(e.to_string()))?;

    Ok(DecodedWif {
        private_key,
        compressed,
        network_prefix: payload[0],
    })
}

/// Check a WIF prefix against the one expected for a network
pub fn validate_network(prefix: u8, expected: Network) -> bool {
    prefix == expected.wif_prefix()
}

/// Encode a private key as WIF for a network
pub fn encode(private_key: &PrivateKey, compressed: bool, network: Network) -> String {
    let mut payload = Zeroizing::new(Vec::with_capacity(COMPRESSED_LEN));
    payload.push(network.wif_prefix());
    payload.extend_from_slice(private_key.to_bytes().as_slice());
    if compressed {
        payload.push(COMPRESSION_FLAG);
    }

    bs58::encode(payload.as_slice()).with_check().into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TESTNET_ONE: &str = "cMahea7zqjxrtgAbB7LSGbcQUr1uX1ojuat9jZodMN87JcbXMTcA";
    const MAINNET_ONE: &str = "XBHddvWWiMu3nZhhpTXBQWJMmdz5JNKJD85b9fgKAckCT2coW3Y4";
    const TESTNET_ONE_UNCOMPRESSED: &str = "91avARGdfge8E4tZfYLoxeJ5sGBdNJQH4kvjJoQFacbgwmaKkrx";

    fn one() -> PrivateKey {
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        PrivateKey::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn test_decode_testnet() {
        let decoded = decode(TESTNET_ONE).unwrap();

        assert!(decoded.compressed);
        assert_eq!(decoded.network_prefix, 0xEF);
        assert_eq!(decoded.private_key.public_key(), one().public_key());

        assert!(validate_network(decoded.network_prefix, Network::Testnet));
        assert!(validate_network(decoded.network_prefix, Network::Devnet));
        assert!(!validate_network(decoded.network_prefix, Network::Mainnet));
    }

    #[test]
    fn test_decode_mainnet() {
        let decoded = decode(MAINNET_ONE).unwrap();
        assert_eq!(decoded.network_prefix, 0xCC);
        assert!(validate_network(decoded.network_prefix, Network::Mainnet));
        assert!(!validate_network(decoded.network_prefix, Network::Testnet));
    }

    #[test]
    fn test_decode_uncompressed() {
        let decoded = decode(TESTNET_ONE_UNCOMPRESSED).unwrap();
        assert!(!decoded.compressed);
        assert_eq!(decoded.network_prefix, 0xEF);
    }

    #[test]
    fn test_encode_matches_known_strings() {
        assert_eq!(encode(&one(), true, Network::Testnet), TESTNET_ONE);
        assert_eq!(encode(&one(), true, Network::Mainnet), MAINNET_ONE);
        assert_eq!(encode(&one(), false, Network::Testnet), TESTNET_ONE_UNCOMPRESSED);
    }

    #[test]
    fn test_corrupted_checksum() {
        let mut corrupted = TESTNET_ONE.to_string();
        corrupted.pop();
        corrupted.push('B');

        let err = decode(&corrupted).unwrap_err();
        assert!(matches!(err, Error::InvalidWif(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_bad_lengths_and_flags() {
        // 32-byte payload (prefix + 31 key bytes)
        let short = bs58::encode([0xEFu8; 32]).with_check().into_string();
        assert!(matches!(decode(&short), Err(Error::InvalidWif(_))));

        let mut bad_flag = vec![0xEFu8];
        bad_flag.extend_from_slice(&one().to_bytes()[..]);
        bad_flag.push(0x02);
        let bad_flag = bs58::encode(bad_flag).with_check().into_string();
        assert!(matches!(decode(&bad_flag), Err(Error::InvalidWif(_))));

        assert!(matches!(decode(""), Err(Error::InvalidWif(_))));
        assert!(matches!(decode("0OIl"), Err(Error::InvalidWif(_))));
    }

    #[test]
    fn test_zero_key_rejected() {
        let mut payload = vec![0xEFu8];
        payload.extend_from_slice(&[0u8; 32]);
        let wif = bs58::encode(payload).with_check().into_string();
        assert!(matches!(decode(&wif), Err(Error::InvalidWif(_))));
    }
}
