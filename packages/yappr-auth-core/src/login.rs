//! # Login Flow
//!
//! The app side of the wallet key exchange, from QR code to identity keys.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            LOGIN FLOW                                   │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  App                                         Wallet                    │
//! │  ───                                         ──────                    │
//! │  LoginSession::new()                                                   │
//! │    ephemeral key pair                                                  │
//! │    dash-key: URI  ───────── QR code ────────►                          │
//! │                                              ECDH, encrypt login key   │
//! │                   ◄──── WalletResponse ─────                           │
//! │  LoginSession::open()                                                  │
//! │    ECDH → shared secret → AES-GCM → LoginKey                           │
//! │                                                                         │
//! │  complete_login()                                                      │
//! │    LoginKey → auth key, encryption key                                 │
//! │    identity lookup → which keys are already on chain?                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::crypto::{
    decrypt_login_key, derive_auth_key, derive_encryption_key, DerivedKey, EphemeralKeyPair,
    LoginKey, WalletResponse,
};
use crate::error::{Error, Result};
use crate::identity::{find_matching_key, IdentityId, IdentityLookup, MatchedKey};
use crate::network::Network;
use crate::uri::KeyExchangeRequest;
use crate::wif;

/// One login attempt, from URI display until the wallet answers
///
/// Holds the ephemeral private key. [`open`](Self::open) consumes the
/// session, so the key cannot be used for a second exchange.
#[derive(Debug)]
pub struct LoginSession {
    ephemeral: EphemeralKeyPair,
    request: KeyExchangeRequest,
    network: Network,
    uri: String,
}

impl LoginSession {
    /// Start a session with a fresh ephemeral key
    pub fn new(
        contract_id: [u8; 32],
        key_index: u32,
        label: impl Into<String>,
        network: Network,
    ) -> Result<Self> {
        let ephemeral = EphemeralKeyPair::generate();
        let request =
            KeyExchangeRequest::new(*ephemeral.public_key(), contract_id, key_index, label)?;
        let uri = request.build_uri(network)?;

        tracing::info!(
            network = %network,
            key_index,
            ephemeral_key = %hex::encode(ephemeral.public_key()),
            "Created login session"
        );

        Ok(Self {
            ephemeral,
            request,
            network,
            uri,
        })
    }

    /// The `dash-key:` URI to show as a QR code
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The request encoded in the URI
    pub fn request(&self) -> &KeyExchangeRequest {
        &self.request
    }

    /// Network the session was created for
    pub fn network(&self) -> Network {
        self.network
    }

    /// Decrypt the wallet's login key, ending the session
    pub fn open(self, response: &WalletResponse) -> Result<LoginKey> {
        let shared = self.ephemeral.agree(&response.wallet_ephemeral_pub_key)?;
        let login_key = decrypt_login_key(&response.encrypted_payload, &shared)?;

        tracing::info!("Received login key from wallet");
        Ok(login_key)
    }
}

/// Keys derived at login and their on-chain status
#[derive(Debug)]
pub struct LoginOutcome {
    /// Identity the keys belong to
    pub identity_id: IdentityId,
    /// Authentication key derived from the login key
    pub auth_key: DerivedKey,
    /// Encryption key derived from the login key
    pub encryption_key: DerivedKey,
    /// On-chain key matching `auth_key`, if registered
    pub auth_match: Option<MatchedKey>,
    /// On-chain key matching `encryption_key`, if registered
    pub encryption_match: Option<MatchedKey>,
}

impl LoginOutcome {
    /// Whether either derived key still has to be added to the identity
    pub fn needs_key_registration(&self) -> bool {
        self.auth_match.is_none() || self.encryption_match.is_none()
    }
}

/// Derive the identity keys from a login key and check them against chain
///
/// Fails with `IdentityNotFound` if the identity does not exist.
pub async fn complete_login(
    login_key: &LoginKey,
    identity_id: &IdentityId,
    lookup: &dyn IdentityLookup,
    network: Network,
) -> Result<LoginOutcome> {
    let auth_key = derive_auth_key(login_key.as_bytes(), identity_id.as_bytes())?;
    let encryption_key = derive_encryption_key(login_key.as_bytes(), identity_id.as_bytes())?;

    let identity = lookup
        .get_identity(identity_id)
        .await?
        .ok_or_else(|| Error::IdentityNotFound(identity_id.to_string()))?;

    let matches = |key: &DerivedKey| -> Result<Option<MatchedKey>> {
        let encoded = zeroize::Zeroizing::new(wif::encode(&key.to_private_key()?, true, network));
        find_matching_key(&encoded, &identity.public_keys, network)
    };
    let auth_match = matches(&auth_key)?;
    let encryption_match = matches(&encryption_key)?;

    let outcome = LoginOutcome {
        identity_id: *identity_id,
        auth_key,
        encryption_key,
        auth_match,
        encryption_match,
    };

    tracing::info!(
        identity = %identity_id,
        auth_key_id = ?outcome.auth_match.as_ref().map(|m| m.key_id),
        encryption_key_id = ?outcome.encryption_match.as_ref().map(|m| m.key_id),
        needs_registration = outcome.needs_key_registration(),
        "Completed login"
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{derive_shared_secret, encrypt_login_key, PrivateKey};
    use crate::identity::{
        IdentityPublicKeyInfo, IdentityRecord, KeyPurpose, KeyType, SecurityLevel,
    };
    use async_trait::async_trait;

    struct FixedLookup(Option<IdentityRecord>);

    #[async_trait]
    impl IdentityLookup for FixedLookup {
        async fn get_identity(&self, _identity_id: &IdentityId) -> Result<Option<IdentityRecord>> {
            Ok(self.0.clone())
        }
    }

    fn identity_id() -> IdentityId {
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        IdentityId::from_bytes(bytes)
    }

    /// Plays the wallet: scans the URI and answers with an encrypted login key
    fn wallet_answer(uri: &str, login_key: &LoginKey) -> WalletResponse {
        let (request, _) = KeyExchangeRequest::parse_uri(uri).unwrap();
        let wallet_key = PrivateKey::generate();
        let shared = derive_shared_secret(&wallet_key, &request.app_ephemeral_pub_key).unwrap();
        let payload = encrypt_login_key(login_key, &shared).unwrap();
        WalletResponse::from_parts(&wallet_key.public_key(), payload).unwrap()
    }

    #[test]
    fn test_session_roundtrip() {
        let session = LoginSession::new([7u8; 32], 0, "Yappr", Network::Testnet).unwrap();
        assert!(session.uri().starts_with("dash-key:"));
        assert!(session.uri().ends_with("?n=t&v=1"));
        assert_eq!(session.request().label, "Yappr");

        let login_key = LoginKey::from_bytes(&[0x42u8; 32]).unwrap();
        let response = wallet_answer(session.uri(), &login_key);

        let received = session.open(&response).unwrap();
        assert_eq!(received.as_bytes(), login_key.as_bytes());
    }

    #[test]
    fn test_response_for_other_session_fails() {
        let first = LoginSession::new([7u8; 32], 0, "", Network::Testnet).unwrap();
        let second = LoginSession::new([7u8; 32], 0, "", Network::Testnet).unwrap();

        let login_key = LoginKey::from_bytes(&[0x42u8; 32]).unwrap();
        let response = wallet_answer(first.uri(), &login_key);

        assert!(matches!(
            second.open(&response),
            Err(Error::DecryptionFailed(_))
        ));
    }

    #[test]
    fn test_oversized_label_rejected_before_any_work() {
        let err = LoginSession::new([0u8; 32], 0, "x".repeat(65), Network::Testnet).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_complete_login_with_registered_auth_key() {
        let login_key = LoginKey::from_bytes(&[0x42u8; 32]).unwrap();
        let lookup = FixedLookup(Some(IdentityRecord {
            public_keys: vec![IdentityPublicKeyInfo {
                id: 4,
                key_type: KeyType::EcdsaSecp256k1,
                purpose: KeyPurpose::Authentication,
                security_level: SecurityLevel::High,
                data: hex::decode(
                    "03f7eaea7870789370efc86bcb3df0f64eeda5d0759b6524403e7f54ddda5a72b3",
                )
                .unwrap(),
                disabled_at: None,
            }],
        }));

        let outcome = complete_login(&login_key, &identity_id(), &lookup, Network::Testnet)
            .await
            .unwrap();

        assert_eq!(
            hex::encode(outcome.auth_key.as_bytes()),
            "55a82e815de93c5196be1a19d4170f28db5cf3515be907abbec1283d40ca27cf"
        );
        assert_eq!(
            hex::encode(outcome.encryption_key.as_bytes()),
            "9afaf0c17a375c3c49d17ea5950dc55b47551c9430e70e5c5c5a6815659993b4"
        );
        assert_eq!(outcome.auth_match.as_ref().map(|m| m.key_id), Some(4));
        assert!(outcome.encryption_match.is_none());
        assert!(outcome.needs_key_registration());
    }

    #[tokio::test]
    async fn test_complete_login_hash160_keys() {
        let login_key = LoginKey::from_bytes(&[0x42u8; 32]).unwrap();
        let id = identity_id();
        let enc_pub = derive_encryption_key(login_key.as_bytes(), id.as_bytes())
            .unwrap()
            .public_key()
            .unwrap();

        let lookup = FixedLookup(Some(IdentityRecord {
            public_keys: vec![
                IdentityPublicKeyInfo {
                    id: 1,
                    key_type: KeyType::EcdsaHash160,
                    purpose: KeyPurpose::Authentication,
                    security_level: SecurityLevel::High,
                    data: hex::decode("91fc6f63f8eab7c2dbef2ccf18079b4e4f234e6e").unwrap(),
                    disabled_at: None,
                },
                IdentityPublicKeyInfo {
                    id: 2,
                    key_type: KeyType::EcdsaSecp256k1,
                    purpose: KeyPurpose::Encryption,
                    security_level: SecurityLevel::Medium,
                    data: enc_pub.to_vec(),
                    disabled_at: None,
                },
            ],
        }));

        let outcome = complete_login(&login_key, &id, &lookup, Network::Mainnet)
            .await
            .unwrap();

        assert_eq!(outcome.auth_match.map(|m| m.key_id), Some(1));
        assert_eq!(outcome.encryption_match.map(|m| m.key_id), Some(2));
    }

    #[tokio::test]
    async fn test_complete_login_unknown_identity() {
        let login_key = LoginKey::from_bytes(&[0x42u8; 32]).unwrap();
        let err = complete_login(&login_key, &identity_id(), &FixedLookup(None), Network::Testnet)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::IdentityNotFound(_)));
    }
}
