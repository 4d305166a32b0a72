//! # Cryptography Module
//!
//! Primitives for the wallet key exchange and identity key derivation.
//!
//! ## Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CRYPTOGRAPHIC ARCHITECTURE                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  KEY EXCHANGE (login)                                                  │
//! │  ────────────────────                                                   │
//! │  App ephemeral key × Wallet ephemeral key  (secp256k1 ECDH)            │
//! │        → x-coordinate → HKDF-SHA256 → Shared Secret                    │
//! │        → AES-256-GCM decrypt → Login Key                               │
//! │                                                                         │
//! │  KEY DERIVATION                                                        │
//! │  ──────────────                                                         │
//! │  Login Key ──HKDF──► Auth Key, Encryption Key                          │
//! │  Auth Key  ──HKDF──► Encryption Key (bootstrap path)                   │
//! │                                                                         │
//! │  KEY MATCHING                                                          │
//! │  ────────────                                                           │
//! │  Private Key → compressed public key (33 B) → hash160 (20 B)           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! | Algorithm | Purpose |
//! |-----------|---------|
//! | secp256k1 ECDH | Ephemeral key agreement with the wallet |
//! | HKDF-SHA256 | Shared secret and sub-key derivation |
//! | AES-256-GCM | Login key transport |
//! | SHA-256 + RIPEMD160 | hash160 identity keys |
//!
//! Every secret type here zeroizes on drop and redacts itself in `Debug`.

mod ecdh;
mod encryption;
mod hash;
pub mod kdf;
mod keys;

pub use ecdh::{derive_shared_secret, EphemeralKeyPair, PROTOCOL_SALT};
pub use encryption::{
    decrypt_login_key, encrypt_login_key, SharedSecret, WalletResponse, MIN_PAYLOAD_SIZE,
    NONCE_SIZE, TAG_SIZE,
};
pub use hash::{hash160, hkdf_sha256, sha256};
pub use kdf::{
    derive_auth_key, derive_encryption_key, derive_encryption_key_from_auth, DerivedKey,
    LoginKey,
};
pub use keys::{
    has_compressed_prefix, parse_public_key, CompressedPublicKey, PrivateKey, PRIVATE_KEY_SIZE,
    PUBLIC_KEY_SIZE,
};
