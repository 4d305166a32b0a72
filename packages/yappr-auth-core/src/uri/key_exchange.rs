//! # Key Exchange Request
//!
//! The `dash-key:` URI an app shows to ask a wallet for a login key.
//!
//! ## Payload Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   KEY EXCHANGE PAYLOAD (71-135 bytes)                   │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  offset  size  field                                                    │
//! │  ──────  ────  ─────────────────────────────────────────                │
//! │     0      1   version (0x01)                                           │
//! │     1     33   app ephemeral public key (compressed)                    │
//! │    34     32   contract id                                              │
//! │    66      4   key index (u32, little-endian)                           │
//! │    70      1   label length L (0-64)                                    │
//! │    71      L   label (UTF-8)                                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use super::{reject, Rejection, UriParts, PROTOCOL_VERSION};
use crate::crypto::{has_compressed_prefix, CompressedPublicKey, PUBLIC_KEY_SIZE};
use crate::error::{Error, Result};
use crate::network::Network;

/// URI scheme prefix, including the colon
pub const KEY_EXCHANGE_SCHEME: &str = "dash-key:";

/// Longest label in UTF-8 bytes
pub const MAX_LABEL_LEN: usize = 64;

/// Size of a payload with an empty label
pub const MIN_KEY_EXCHANGE_PAYLOAD: usize = 1 + PUBLIC_KEY_SIZE + 32 + 4 + 1;

/// A request for the wallet to send a login key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyExchangeRequest {
    /// The app's ephemeral public key for this attempt
    pub app_ephemeral_pub_key: CompressedPublicKey,
    /// Data contract the login key is scoped to
    pub contract_id: [u8; 32],
    /// Which login key of the contract to derive
    pub key_index: u32,
    /// Human-readable label shown by the wallet
    pub label: String,
}

impl KeyExchangeRequest {
    /// Build a request, validating the label and public key
    pub fn new(
        app_ephemeral_pub_key: CompressedPublicKey,
        contract_id: [u8; 32],
        key_index: u32,
        label: impl Into<String>,
    ) -> Result<Self> {
        let request = Self {
            app_ephemeral_pub_key,
            contract_id,
            key_index,
            label: label.into(),
        };
        request.validate()?;
        Ok(request)
    }

    fn validate(&self) -> Result<()> {
        if !has_compressed_prefix(&self.app_ephemeral_pub_key) {
            return Err(Error::Validation(
                "ephemeral public key must be compressed (0x02/0x03 prefix)".into(),
            ));
        }
        if self.label.len() > MAX_LABEL_LEN {
            return Err(Error::Validation(format!(
                "label is {} bytes, maximum is {}",
                self.label.len(),
                MAX_LABEL_LEN
            )));
        }
        Ok(())
    }

    /// Serialize to the binary payload
    pub fn serialize(&self) -> Result<Vec<u8>> {
        self.validate()?;

        let label = self.label.as_bytes();
        let mut out = Vec::with_capacity(MIN_KEY_EXCHANGE_PAYLOAD + label.len());
        out.push(PROTOCOL_VERSION);
        out.extend_from_slice(&self.app_ephemeral_pub_key);
        out.extend_from_slice(&self.contract_id);
        out.extend_from_slice(&self.key_index.to_le_bytes());
        // validate() bounds the label to 64 bytes
        out.push(label.len() as u8);
        out.extend_from_slice(label);
        Ok(out)
    }

    /// Build the `dash-key:` URI for a network
    pub fn build_uri(&self, network: Network) -> Result<String> {
        let payload = self.serialize()?;
        Ok(format!(
            "{}{}?n={}&v={}",
            KEY_EXCHANGE_SCHEME,
            bs58::encode(payload).into_string(),
            network.uri_code(),
            PROTOCOL_VERSION
        ))
    }

    /// Parse a scanned `dash-key:` URI
    ///
    /// Total: any input that is not a well-formed version 1 request yields
    /// `None`.
    pub fn parse_uri(uri: &str) -> Option<(Self, Network)> {
        reject(KEY_EXCHANGE_SCHEME, Self::parse_inner(uri))
    }

    pub(crate) fn parse_inner(uri: &str) -> std::result::Result<(Self, Network), Rejection> {
        let parts = UriParts::split(uri, KEY_EXCHANGE_SCHEME)?;
        let network = parts.network()?;
        parts.check_version()?;

        Ok((Self::deserialize(&parts.payload)?, network))
    }

    fn deserialize(payload: &[u8]) -> std::result::Result<Self, Rejection> {
        if payload.len() < MIN_KEY_EXCHANGE_PAYLOAD {
            return Err("payload shorter than 71 bytes");
        }
        if payload[0] != PROTOCOL_VERSION {
            return Err("unsupported payload version");
        }

        let (pubkey, rest) = payload[1..].split_at(PUBLIC_KEY_SIZE);
        let (contract_id, rest) = rest.split_at(32);
        let (key_index, rest) = rest.split_at(4);
        let (label_len, label) = rest.split_at(1);

        if !has_compressed_prefix(pubkey) {
            return Err("ephemeral public key is not compressed");
        }

        let label_len = usize::from(label_len[0]);
        if label_len > MAX_LABEL_LEN {
            return Err("label longer than 64 bytes");
        }
        if label.len() != label_len {
            return Err("label length prefix does not match payload");
        }
        let label = std::str::from_utf8(label).map_err(|_| "label is not UTF-8")?;

        let mut app_ephemeral_pub_key = [0u8; PUBLIC_KEY_SIZE];
        app_ephemeral_pub_key.copy_from_slice(pubkey);
        let mut contract = [0u8; 32];
        contract.copy_from_slice(contract_id);
        let mut index = [0u8; 4];
        index.copy_from_slice(key_index);

        Ok(Self {
            app_ephemeral_pub_key,
            contract_id: contract,
            key_index: u32::from_le_bytes(index),
            label: label.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn request(label: &str) -> KeyExchangeRequest {
        let mut pubkey = [0x11u8; 33];
        pubkey[0] = 0x02;
        KeyExchangeRequest::new(pubkey, [0xAB; 32], 0x0102_0304, label).unwrap()
    }

    #[test]
    fn test_serialize_layout() {
        let bytes = request("yappr").serialize().unwrap();

        assert_eq!(bytes.len(), 71 + 5);
        assert_eq!(bytes[0], 1);
        assert_eq!(bytes[1], 0x02);
        assert_eq!(&bytes[34..66], &[0xAB; 32]);
        assert_eq!(&bytes[66..70], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(bytes[70], 5);
        assert_eq!(&bytes[71..], b"yappr");
    }

    #[test]
    fn test_uri_shape() {
        let uri = request("").build_uri(Network::Mainnet).unwrap();
        assert!(uri.starts_with("dash-key:"));
        assert!(uri.ends_with("?n=m&v=1"));
    }

    #[test]
    fn test_roundtrip_every_network() {
        for network in [Network::Mainnet, Network::Testnet, Network::Devnet] {
            let original = request("Login to Yappr");
            let uri = original.build_uri(network).unwrap();
            assert_eq!(KeyExchangeRequest::parse_uri(&uri), Some((original, network)));
        }
    }

    #[test]
    fn test_label_limits() {
        assert!(KeyExchangeRequest::new([0x02; 33], [0; 32], 0, "a".repeat(64)).is_ok());

        let err = KeyExchangeRequest::new([0x02; 33], [0; 32], 0, "a".repeat(65)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        // 22 four-byte characters: 22 chars but 88 bytes
        assert!(KeyExchangeRequest::new([0x02; 33], [0; 32], 0, "😀".repeat(22)).is_err());
    }

    #[test]
    fn test_oversized_label_caught_at_serialize() {
        let mut req = request("ok");
        req.label = "x".repeat(65);
        assert!(matches!(req.serialize(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_rejects_uncompressed_prefix() {
        assert!(KeyExchangeRequest::new([0x04; 33], [0; 32], 0, "").is_err());
    }

    fn uri_with_payload(payload: &[u8], query: &str) -> String {
        format!("dash-key:{}?{}", bs58::encode(payload).into_string(), query)
    }

    #[test]
    fn test_parse_rejections() {
        let good = request("label").serialize().unwrap();

        // Empty, wrong scheme, no query, missing params
        assert!(KeyExchangeRequest::parse_uri("").is_none());
        assert!(KeyExchangeRequest::parse_uri(&uri_with_payload(&good, "n=t&v=1").replace("dash-key:", "dash-st:")).is_none());
        assert!(KeyExchangeRequest::parse_uri(&format!("dash-key:{}", bs58::encode(&good).into_string())).is_none());
        assert!(KeyExchangeRequest::parse_uri(&uri_with_payload(&good, "v=1")).is_none());
        assert!(KeyExchangeRequest::parse_uri(&uri_with_payload(&good, "n=t")).is_none());

        // Bad network, bad version
        assert!(KeyExchangeRequest::parse_uri(&uri_with_payload(&good, "n=x&v=1")).is_none());
        assert!(KeyExchangeRequest::parse_uri(&uri_with_payload(&good, "n=t&v=2")).is_none());

        // Non-Base58
        assert!(KeyExchangeRequest::parse_uri("dash-key:0OIl?n=t&v=1").is_none());

        // Truncated
        assert!(KeyExchangeRequest::parse_uri(&uri_with_payload(&good[..70], "n=t&v=1")).is_none());

        // Label length prefix disagrees with the payload
        let mut long_prefix = good.clone();
        long_prefix[70] = 6;
        assert!(KeyExchangeRequest::parse_uri(&uri_with_payload(&long_prefix, "n=t&v=1")).is_none());
        let mut trailing = good.clone();
        trailing.push(b'!');
        assert!(KeyExchangeRequest::parse_uri(&uri_with_payload(&trailing, "n=t&v=1")).is_none());

        // Payload version byte
        let mut bad_version = good.clone();
        bad_version[0] = 2;
        assert!(KeyExchangeRequest::parse_uri(&uri_with_payload(&bad_version, "n=t&v=1")).is_none());

        // Invalid UTF-8 label
        let mut bad_utf8 = good;
        bad_utf8[71] = 0xFF;
        assert!(KeyExchangeRequest::parse_uri(&uri_with_payload(&bad_utf8, "n=t&v=1")).is_none());
    }

    #[test]
    fn test_params_in_any_order() {
        let original = request("x");
        let payload = original.serialize().unwrap();
        let parsed = KeyExchangeRequest::parse_uri(&uri_with_payload(&payload, "v=1&n=d")).unwrap();
        assert_eq!(parsed, (original, Network::Devnet));
    }

    fn arb_network() -> impl Strategy<Value = Network> {
        prop_oneof![
            Just(Network::Mainnet),
            Just(Network::Testnet),
            Just(Network::Devnet),
        ]
    }

    fn arb_request() -> impl Strategy<Value = KeyExchangeRequest> {
        (
            prop_oneof![Just(0x02u8), Just(0x03u8)],
            any::<[u8; 32]>(),
            any::<[u8; 32]>(),
            any::<u32>(),
            "[a-zA-Z0-9 éß😀-]{0,16}",
        )
            .prop_map(|(prefix, x, contract_id, key_index, label)| {
                let mut app_ephemeral_pub_key = [0u8; 33];
                app_ephemeral_pub_key[0] = prefix;
                app_ephemeral_pub_key[1..].copy_from_slice(&x);
                KeyExchangeRequest {
                    app_ephemeral_pub_key,
                    contract_id,
                    key_index,
                    label,
                }
            })
    }

    proptest! {
        #[test]
        fn prop_uri_roundtrip(request in arb_request(), network in arb_network()) {
            let uri = request.build_uri(network).unwrap();
            prop_assert_eq!(KeyExchangeRequest::parse_uri(&uri), Some((request, network)));
        }

        #[test]
        fn prop_parse_is_total(input in ".*") {
            let _ = KeyExchangeRequest::parse_uri(&input);
            let _ = KeyExchangeRequest::parse_uri(&format!("dash-key:{}", input));
        }

        #[test]
        fn prop_truncated_payload_rejected(request in arb_request(), cut in 0usize..71) {
            let payload = request.serialize().unwrap();
            let uri = uri_with_payload(&payload[..cut.min(payload.len())], "n=t&v=1");
            prop_assert!(KeyExchangeRequest::parse_uri(&uri).is_none());
        }
    }
}
