//! # Key Derivation
//!
//! Deterministic derivation of purpose-specific identity keys.
//!
//! ## Two Chains
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      LOGIN KEY CHAIN (a)                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Login Key (32 bytes, delivered by the wallet)                         │
//! │        │                                                                │
//! │        ├──► HKDF(salt=identity id bytes, info="auth")       → Auth Key  │
//! │        │                                                                │
//! │        └──► HKDF(salt=identity id bytes, info="encryption") → Enc Key   │
//! │                                                                         │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                      AUTH KEY CHAIN (b)                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Auth Private Key (32 bytes, already held by the app)                  │
//! │        │                                                                │
//! │        └──► HKDF(salt=SHA256(identity id string),                      │
//! │                  info="yappr/encryption-key/v1")              → Enc Key │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The chains salt differently on purpose: chain (a) uses the raw 32 id
//! bytes, chain (b) the SHA-256 of the Base58 id string. Both are released
//! protocols; unifying them would change the keys existing wallets derive.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::hash::{hkdf_sha256, sha256};
use crate::crypto::keys::{CompressedPublicKey, PrivateKey};
use crate::error::{Error, Result};

/// HKDF info strings
///
/// Changing any of these changes every key derived with it.
pub mod domain {
    /// Chain (a): authentication key from the login key
    pub const AUTH_KEY: &[u8] = b"auth";

    /// Chain (a): encryption key from the login key
    pub const ENCRYPTION_KEY: &[u8] = b"encryption";

    /// Chain (b): encryption key from an existing auth private key
    pub const AUTH_DERIVED_ENCRYPTION_KEY: &[u8] = b"yappr/encryption-key/v1";
}

/// Size of login keys, derived keys and identity ids
pub const SECRET_SIZE: usize = 32;

/// The 32-byte root secret delivered by the wallet
///
/// Held only for as long as it takes to derive the identity keys.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct LoginKey([u8; SECRET_SIZE]);

impl LoginKey {
    /// Create from raw bytes, which must be exactly 32 long
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self(exact_32(bytes)?))
    }

    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8; SECRET_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for LoginKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("LoginKey(<redacted>)")
    }
}

/// A purpose-specific private key produced by HKDF
///
/// Regenerable from its inputs, so it is never persisted.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; SECRET_SIZE]);

impl DerivedKey {
    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8; SECRET_SIZE] {
        &self.0
    }

    /// Interpret as a secp256k1 private key
    pub fn to_private_key(&self) -> Result<PrivateKey> {
        PrivateKey::from_bytes(&self.0)
    }

    /// Compressed public key of this key
    pub fn public_key(&self) -> Result<CompressedPublicKey> {
        Ok(self.to_private_key()?.public_key())
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey(<redacted>)")
    }
}

fn exact_32(bytes: &[u8]) -> Result<[u8; SECRET_SIZE]> {
    bytes.try_into().map_err(|_| Error::InvalidInputLength {
        expected: SECRET_SIZE,
        got: bytes.len(),
    })
}

fn derive(ikm: &[u8], salt: &[u8], info: &[u8]) -> Result<DerivedKey> {
    let ikm = exact_32(ikm)?;
    let salt = exact_32(salt)?;
    let mut okm = hkdf_sha256(&ikm, Some(&salt), info)?;
    let key = DerivedKey(okm);
    okm.zeroize();
    Ok(key)
}

/// Chain (a): authentication key from a login key
///
/// Both inputs must be exactly 32 bytes.
pub fn derive_auth_key(login_key: &[u8], identity_id_bytes: &[u8]) -> Result<DerivedKey> {
    derive(login_key, identity_id_bytes, domain::AUTH_KEY)
}

/// Chain (a): encryption key from a login key
///
/// Both inputs must be exactly 32 bytes.
pub fn derive_encryption_key(login_key: &[u8], identity_id_bytes: &[u8]) -> Result<DerivedKey> {
    derive(login_key, identity_id_bytes, domain::ENCRYPTION_KEY)
}

/// Chain (b): encryption key from an existing auth private key
///
/// Lets an app that only holds the auth key bootstrap its encryption key
/// without a second wallet round-trip. `identity_id` is the Base58 string
/// form of the identity id; its SHA-256 is the salt.
pub fn derive_encryption_key_from_auth(
    auth_private_key: &[u8],
    identity_id: &str,
) -> Result<DerivedKey> {
    let salt = sha256(identity_id.as_bytes());
    derive(auth_private_key, &salt, domain::AUTH_DERIVED_ENCRYPTION_KEY)
}

// ============================================================================
// TESTS
// ============================================================================
