//! # Login Key Encryption
//!
//! AES-256-GCM wrapping of the login key sent from wallet to app.
//!
//! ## Payload Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    ENCRYPTED PAYLOAD (≥ 44 bytes)                       │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │   0          12                                   len-16        len    │
//! │   ┌──────────┬──────────────────────────────────────┬────────────┐     │
//! │   │  Nonce   │         Ciphertext                   │    Tag     │     │
//! │   │ 12 bytes │   (32 bytes for a login key)         │  16 bytes  │     │
//! │   └──────────┴──────────────────────────────────────┴────────────┘     │
//! │                                                                         │
//! │   Key: the 32-byte ECDH shared secret   AAD: none                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce as AesNonce,
};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::crypto::kdf::{LoginKey, SECRET_SIZE};
use crate::crypto::keys::{parse_public_key, CompressedPublicKey, PUBLIC_KEY_SIZE};
use crate::error::{Error, Result};

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

/// Smallest payload that can hold a nonce, a 16-byte block and a tag
pub const MIN_PAYLOAD_SIZE: usize = NONCE_SIZE + 16 + TAG_SIZE;

/// A single-use symmetric key produced by the ECDH step
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret([u8; 32]);

impl SharedSecret {
    /// Wrap raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.0))
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

/// What the wallet sends back after scanning a `dash-key:` URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletResponse {
    /// The wallet's one-shot public key for this exchange
    pub wallet_ephemeral_pub_key: CompressedPublicKey,
    /// `nonce ‖ ciphertext ‖ tag`
    pub encrypted_payload: Vec<u8>,
}

impl WalletResponse {
    /// Validate and assemble a response from its wire parts
    ///
    /// The public key must be a 33-byte point on the curve and the payload
    /// at least [`MIN_PAYLOAD_SIZE`] bytes.
    pub fn from_parts(wallet_ephemeral_pub_key: &[u8], encrypted_payload: Vec<u8>) -> Result<Self> {
        parse_public_key(wallet_ephemeral_pub_key)?;
        check_payload_len(&encrypted_payload)?;

        let mut key = [0u8; PUBLIC_KEY_SIZE];
        key.copy_from_slice(wallet_ephemeral_pub_key);

        Ok(Self {
            wallet_ephemeral_pub_key: key,
            encrypted_payload,
        })
    }
}

fn check_payload_len(payload: &[u8]) -> Result<()> {
    if payload.len() < MIN_PAYLOAD_SIZE {
        return Err(Error::MalformedPayload(format!(
            "encrypted payload must be at least {} bytes, got {}",
            MIN_PAYLOAD_SIZE,
            payload.len()
        )));
    }
    Ok(())
}

/// Decrypt the login key from a wallet payload
///
/// ## Errors
///
/// - `MalformedPayload` if the payload is shorter than 44 bytes
/// - `DecryptionFailed` if the tag does not verify (wrong shared secret or
///   tampering) or the plaintext is not exactly 32 bytes
///
/// A decryption failure is final for this exchange; retrying with the same
/// inputs cannot succeed.
pub fn decrypt_login_key(payload: &[u8], shared_secret: &SharedSecret) -> Result<LoginKey> {
    check_payload_len(payload)?;

    let (nonce, ciphertext) = payload.split_at(NONCE_SIZE);
    let plaintext = Zeroizing::new(
        shared_secret
            .cipher()
            .decrypt(AesNonce::from_slice(nonce), ciphertext)
            .map_err(|_| {
                tracing::warn!("Login key decryption failed: authentication tag mismatch");
                Error::DecryptionFailed("authentication tag mismatch".into())
            })?,
    );

    if plaintext.len() != SECRET_SIZE {
        return Err(Error::DecryptionFailed(format!(
            "decrypted login key is {} bytes, expected {}",
            plaintext.len(),
            SECRET_SIZE
        )));
    }

    LoginKey::from_bytes(&plaintext)
}

/// Encrypt a login key under a shared secret with a fresh random nonce
///
/// This is the wallet's half of the exchange; the app only decrypts.
pub fn encrypt_login_key(login_key: &LoginKey, shared_secret: &SharedSecret) -> Result<Vec<u8>> {
    let mut nonce = [0u8; NONCE_SIZE];
    rand::rngs::OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|_| Error::RngFailed)?;

    let ciphertext = shared_secret
        .cipher()
        .encrypt(AesNonce::from_slice(&nonce), login_key.as_bytes().as_slice())
        .map_err(|e| Error::EncryptionFailed(e.to_string()))?;

    let mut payload = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    payload.extend_from_slice(&nonce);
    payload.extend_from_slice(&ciphertext);
    Ok(payload)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(byte: u8) -> SharedSecret {
        SharedSecret::from_bytes([byte; 32])
    }

    fn login_key() -> LoginKey {
        LoginKey::from_bytes(&[0x42u8; 32]).unwrap()
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let shared = secret(7);
        let payload = encrypt_login_key(&login_key(), &shared).unwrap();

        assert_eq!(payload.len(), NONCE_SIZE + 32 + TAG_SIZE);

        let decrypted = decrypt_login_key(&payload, &shared).unwrap();
        assert_eq!(decrypted.as_bytes(), login_key().as_bytes());
    }

    #[test]
    fn test_wrong_secret_fails() {
        let payload = encrypt_login_key(&login_key(), &secret(7)).unwrap();
        let err = decrypt_login_key(&payload, &secret(8)).unwrap_err();
        assert!(matches!(err, Error::DecryptionFailed(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_any_bit_flip_fails() {
        let shared = secret(7);
        let payload = encrypt_login_key(&login_key(), &shared).unwrap();

        // Nonce, first ciphertext byte, last ciphertext byte, tag
        for index in [0, NONCE_SIZE, NONCE_SIZE + 31, payload.len() - 1] {
            let mut tampered = payload.clone();
            tampered[index] ^= 0x01;
            assert!(matches!(
                decrypt_login_key(&tampered, &shared),
                Err(Error::DecryptionFailed(_))
            ));
        }
    }

    #[test]
    fn test_short_payload_rejected() {
        let err = decrypt_login_key(&[0u8; MIN_PAYLOAD_SIZE - 1], &secret(1)).unwrap_err();
        assert!(matches!(err, Error::MalformedPayload(_)));
    }

    #[test]
    fn test_wrong_plaintext_length_rejected() {
        let shared = secret(3);
        let nonce = [9u8; NONCE_SIZE];
        let ciphertext = shared
            .cipher()
            .encrypt(AesNonce::from_slice(&nonce), [1u8; 16].as_slice())
            .unwrap();
        let mut payload = nonce.to_vec();
        payload.extend_from_slice(&ciphertext);

        assert_eq!(payload.len(), MIN_PAYLOAD_SIZE);
        assert!(matches!(
            decrypt_login_key(&payload, &shared),
            Err(Error::DecryptionFailed(_))
        ));
    }

    #[test]
    fn test_wallet_response_from_parts() {
        let pubkey = crate::crypto::PrivateKey::generate().public_key();

        assert!(WalletResponse::from_parts(&pubkey, vec![0u8; 60]).is_ok());
        assert!(matches!(
            WalletResponse::from_parts(&pubkey, vec![0u8; 43]),
            Err(Error::MalformedPayload(_))
        ));
        assert!(matches!(
            WalletResponse::from_parts(&pubkey[..32], vec![0u8; 60]),
            Err(Error::InvalidKey(_))
        ));

        let mut compact = pubkey;
        compact[0] = 0x05;
        assert!(matches!(
            WalletResponse::from_parts(&compact, vec![0u8; 60]),
            Err(Error::InvalidKey(_))
        ));
    }

    #[test]
    fn test_shared_secret_zeroize() {
        let mut shared = secret(5);
        shared.zeroize();
        assert_eq!(shared.as_bytes(), &[0u8; 32]);
    }
}
