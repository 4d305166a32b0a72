//! # ECDH Key Agreement
//!
//! secp256k1 Diffie-Hellman between the app's ephemeral key and the
//! wallet's ephemeral key.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       SHARED SECRET DERIVATION                          │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  self private × peer public  →  point (x, y)                           │
//! │                                        │                                │
//! │                            keep x only (32 bytes)                       │
//! │                                        │                                │
//! │  HKDF-SHA256(ikm=x, salt="dash-key-exchange/v1", info="")             │
//! │                                        │                                │
//! │                                        ▼                                │
//! │                          Shared Secret (32 bytes)                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Dropping the y-coordinate means both parities of the peer key agree on
//! the same secret. Wallets compute it the same way, so this must not change.

use k256::ecdh::diffie_hellman;
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::encryption::SharedSecret;
use crate::crypto::hash::hkdf_sha256;
use crate::crypto::keys::{parse_public_key, CompressedPublicKey, PrivateKey};
use crate::error::Result;

/// HKDF salt for the key-exchange shared secret
pub const PROTOCOL_SALT: &[u8] = b"dash-key-exchange/v1";

/// A one-shot key pair for a single exchange
///
/// The private half is zeroized on drop, or earlier with
/// [`Zeroize::zeroize`]. Never reuse a pair across exchanges.
#[derive(Debug, Zeroize)]
pub struct EphemeralKeyPair {
    private_key: PrivateKey,
    public_key: CompressedPublicKey,
}

impl EphemeralKeyPair {
    /// Generate a fresh pair from the OS random source
    pub fn generate() -> Self {
        let private_key = PrivateKey::generate();
        let public_key = private_key.public_key();
        Self {
            private_key,
            public_key,
        }
    }

    /// The private half
    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    /// The compressed public half, sent to the peer
    pub fn public_key(&self) -> &CompressedPublicKey {
        &self.public_key
    }

    /// Agree on a shared secret with the peer, consuming this pair
    pub fn agree(mut self, peer_public_key: &[u8]) -> Result<SharedSecret> {
        let shared = derive_shared_secret(&self.private_key, peer_public_key);
        self.zeroize();
        shared
    }
}

/// Derive the 32-byte shared secret with a peer's compressed public key
///
/// Fails with `InvalidKey` if the peer key is not a 33-byte compressed
/// curve point or our key has been wiped.
pub fn derive_shared_secret(self_private: &PrivateKey, peer_public: &[u8]) -> Result<SharedSecret> {
    let peer = parse_public_key(peer_public)?;
    let secret = self_private.to_secret()?;

    let point = diffie_hellman(secret.to_nonzero_scalar(), peer.as_affine());
    let mut x = Zeroizing::new([0u8; 32]);
    x.copy_from_slice(point.raw_secret_bytes());

    let okm = hkdf_sha256(x.as_slice(), Some(PROTOCOL_SALT), &[])?;
    Ok(SharedSecret::from_bytes(okm))
}
