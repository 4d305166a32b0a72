//! External collaborators the registration flow depends on.
//!
//! Both are supplied by the host at construction time so the state machine
//! can run against fakes in tests.

use async_trait::async_trait;

use crate::crypto::CompressedPublicKey;
use crate::error::Result;
use crate::identity::IdentityId;

/// Input to the unsigned-transition builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransitionRequest {
    /// Identity receiving the keys
    pub identity_id: IdentityId,
    /// Public key of the auth key to add
    pub auth_public_key: CompressedPublicKey,
    /// Public key of the encryption key to add
    pub encryption_public_key: CompressedPublicKey,
}

/// An identity-update transition ready for the wallet to sign
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltTransition {
    /// Serialized unsigned transition
    pub transition_bytes: Vec<u8>,
    /// Key id the auth key will get
    pub auth_key_id: u32,
    /// Key id the encryption key will get
    pub encryption_key_id: u32,
}

/// Builds the unsigned identity-update transition
#[async_trait]
pub trait TransitionBuilder: Send + Sync {
    /// Build a transition adding both keys to the identity
    async fn build(&self, request: &UnsignedTransitionRequest) -> Result<BuiltTransition>;
}

/// Checks whether the wallet has broadcast the signed transition
#[async_trait]
pub trait RegistrationCheck: Send + Sync {
    /// `true` once both keys are on the identity
    async fn check_keys_registered(
        &self,
        identity_id: &IdentityId,
        auth_public_key: &CompressedPublicKey,
        encryption_public_key: &CompressedPublicKey,
    ) -> Result<bool>;
}
