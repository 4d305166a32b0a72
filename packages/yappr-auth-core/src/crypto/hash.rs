//! Hash and HKDF helpers shared by the codecs and derivation chains.

use hkdf::Hkdf;
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// SHA-256 digest
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// RIPEMD160(SHA-256(data)), the 20-byte key hash used by hash160 identity keys
pub fn hash160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(sha256(data)).into()
}

/// HKDF-SHA256 with a 32-byte output
///
/// `salt` of `None` uses the RFC 5869 default (a zero-filled block).
pub fn hkdf_sha256(ikm: &[u8], salt: Option<&[u8]>, info: &[u8]) -> Result<[u8; 32]> {
    let hkdf = Hkdf::<Sha256>::new(salt, ikm);

    let mut okm = [0u8; 32];
    hkdf.expand(info, &mut okm)
        .map_err(|_| Error::KeyDerivationFailed("HKDF expansion failed".into()))?;

    Ok(okm)
}
