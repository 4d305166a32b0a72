//! # Key Management
//!
//! secp256k1 private keys and compressed public keys.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          KEY FORMATS                                    │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  PrivateKey            32 bytes, big-endian scalar in [1, n-1]         │
//! │                        zeroized on drop, never logged                  │
//! │                                                                         │
//! │  Compressed public     33 bytes: 0x02|0x03 parity ‖ x-coordinate       │
//! │  key                                                                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{PublicKey, SecretKey};
use rand::rngs::OsRng;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{Error, Result};

/// Size of a private key in bytes
pub const PRIVATE_KEY_SIZE: usize = 32;

/// Size of a compressed public key in bytes
pub const PUBLIC_KEY_SIZE: usize = 33;

/// A compressed secp256k1 public key
pub type CompressedPublicKey = [u8; PUBLIC_KEY_SIZE];

/// A secp256k1 private key
///
/// Zeroized on drop. Call [`Zeroize::zeroize`] to wipe it in place once
/// consumed; a wiped key can no longer agree on secrets.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    bytes: [u8; PRIVATE_KEY_SIZE],
    public: CompressedPublicKey,
}

impl PrivateKey {
    /// Generate a random private key from the OS random source
    pub fn generate() -> Self {
        Self::from_secret(&SecretKey::random(&mut OsRng))
    }

    /// Create from 32 raw bytes
    ///
    /// Fails with `InvalidInputLength` for any other length and with
    /// `InvalidKey` for zero or out-of-range scalars.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PRIVATE_KEY_SIZE {
            return Err(Error::InvalidInputLength {
                expected: PRIVATE_KEY_SIZE,
                got: bytes.len(),
            });
        }

        let secret = SecretKey::from_slice(bytes)
            .map_err(|_| Error::InvalidKey("scalar is zero or not below the curve order".into()))?;

        Ok(Self::from_secret(&secret))
    }

    fn from_secret(secret: &SecretKey) -> Self {
        let mut field = secret.to_bytes();
        let mut bytes = [0u8; PRIVATE_KEY_SIZE];
        bytes.copy_from_slice(&field);
        field.as_mut_slice().zeroize();
        Self {
            bytes,
            public: compress(&secret.public_key()),
        }
    }

    /// Copy out the raw scalar bytes in a zeroizing buffer
    pub fn to_bytes(&self) -> Zeroizing<[u8; PRIVATE_KEY_SIZE]> {
        Zeroizing::new(self.bytes)
    }

    /// Compressed public key for this private key
    ///
    /// All zeros once the key has been wiped.
    pub fn public_key(&self) -> CompressedPublicKey {
        self.public
    }

    /// Whether [`Zeroize::zeroize`] has wiped this key
    pub fn is_wiped(&self) -> bool {
        self.bytes.iter().all(|b| *b == 0)
    }

    /// Rebuild the curve scalar for one operation
    pub(crate) fn to_secret(&self) -> Result<SecretKey> {
        SecretKey::from_slice(&self.bytes)
            .map_err(|_| Error::InvalidKey("private key has been wiped".into()))
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// Parse a 33-byte compressed public key
///
/// Only the `0x02`/`0x03` SEC1 forms are accepted. Uncompressed and
/// compact encodings are rejected: every key on this protocol's wire is
/// compressed.
pub fn parse_public_key(bytes: &[u8]) -> Result<PublicKey> {
    if bytes.len() != PUBLIC_KEY_SIZE {
        return Err(Error::InvalidKey(format!(
            "expected {} byte compressed public key, got {} bytes",
            PUBLIC_KEY_SIZE,
            bytes.len()
        )));
    }
    if !has_compressed_prefix(bytes) {
        return Err(Error::InvalidKey(format!(
            "prefix 0x{:02x} is not a compressed point",
            bytes[0]
        )));
    }

    PublicKey::from_sec1_bytes(bytes)
        .map_err(|_| Error::InvalidKey("bytes are not a point on secp256k1".into()))
}

/// Check that bytes carry a compressed-point prefix without decoding the point
pub fn has_compressed_prefix(bytes: &[u8]) -> bool {
    bytes.len() == PUBLIC_KEY_SIZE && matches!(bytes[0], 0x02 | 0x03)
}

fn compress(public: &PublicKey) -> CompressedPublicKey {
    let encoded = public.to_encoded_point(true);
    let mut out = [0u8; PUBLIC_KEY_SIZE];
    out.copy_from_slice(encoded.as_bytes());
    out
}
