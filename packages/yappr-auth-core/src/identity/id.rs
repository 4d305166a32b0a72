//! Identity identifiers.
//!
//! An identity id is 32 raw bytes. Its canonical string form is plain
//! Base58 (no checksum), e.g. `11111111111111111111111111111112` for the
//! id whose last byte is `0x01`.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Size of an identity id in bytes
pub const IDENTITY_ID_SIZE: usize = 32;

/// A 32-byte on-chain identity identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdentityId([u8; IDENTITY_ID_SIZE]);

impl IdentityId {
    /// Wrap raw id bytes
    pub fn from_bytes(bytes: [u8; IDENTITY_ID_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, which must be exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; IDENTITY_ID_SIZE] =
            bytes.try_into().map_err(|_| Error::InvalidInputLength {
                expected: IDENTITY_ID_SIZE,
                got: bytes.len(),
            })?;
        Ok(Self(bytes))
    }

    /// Parse the Base58 string form
    pub fn parse(s: &str) -> Result<Self> {
        let decoded = bs58::decode(s)
            .into_vec()
            .map_err(|e| Error::Validation(format!("identity id is not Base58: {}", e)))?;

        Self::from_slice(&decoded)
    }

    /// Raw id bytes
    pub fn as_bytes(&self) -> &[u8; IDENTITY_ID_SIZE] {
        &self.0
    }

    /// Base58 string form
    pub fn to_base58(&self) -> String {
        bs58::encode(&self.0).into_string()
    }
}

impl std::fmt::Display for IdentityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl std::fmt::Debug for IdentityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "IdentityId({})", self.to_base58())
    }
}

impl std::str::FromStr for IdentityId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for IdentityId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<IdentityId> for String {
    fn from(id: IdentityId) -> Self {
        id.to_base58()
    }
}
