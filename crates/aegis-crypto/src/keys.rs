//! Derived key types.

use crate::{constants::*, errors::*, paserk};
use ed25519_dalek::{SigningKey, VerifyingKey};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Ed25519 signing key pair derived from a seed's `sign` subkey
#[derive(Clone)]
pub struct SigningKeyPair {
    /// Private signing key (32 bytes)
    private_key: SigningKey,
    /// Public verification key (32 bytes)
    public_key: VerifyingKey,
}

impl SigningKeyPair {
    /// Expand a 32-byte Ed25519 secret seed into a key pair
    pub fn from_seed(seed: &[u8; DERIVED_KEY_SIZE]) -> Self {
        let private_key = SigningKey::from_bytes(seed);
        let public_key = private_key.verifying_key();

        Self {
            private_key,
            public_key,
        }
    }

    /// Get the public key bytes
    pub fn public_key_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.public_key.to_bytes()
    }

    /// Get a reference to the private key
    ///
    /// # Security
    ///
    /// Use with extreme caution. Never log or persist.
    pub fn private_key(&self) -> &SigningKey {
        &self.private_key
    }

    /// Get a reference to the public key
    pub fn public_key(&self) -> &VerifyingKey {
        &self.public_key
    }

    /// `k4.pid.` id of the public half
    pub fn pid(&self) -> String {
        paserk::pid(&self.public_key)
    }
}

impl fmt::Debug for SigningKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeyPair")
            .field("pid", &self.pid())
            .finish_non_exhaustive()
    }
}

/// Parse a 32-byte Ed25519 public key
pub fn public_key_from_bytes(bytes: &[u8]) -> Result<VerifyingKey> {
    let array: [u8; PUBLIC_KEY_SIZE] =
        bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyFormat {
                expected: PUBLIC_KEY_SIZE,
                actual: bytes.len(),
            })?;
    VerifyingKey::from_bytes(&array).map_err(|_| CryptoError::InvalidKeyFormat {
        expected: PUBLIC_KEY_SIZE,
        actual: bytes.len(),
    })
}

/// PASETO v4.local symmetric key derived from a seed's `encrypt` subkey
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; SYMMETRIC_KEY_SIZE]);

impl SymmetricKey {
    /// Wrap raw key bytes
    pub fn from_bytes(bytes: [u8; SYMMETRIC_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw key bytes.
    ///
    /// # Security
    ///
    /// Never log or persist.
    pub fn as_bytes(&self) -> &[u8; SYMMETRIC_KEY_SIZE] {
        &self.0
    }

    /// `k4.lid.` id of this key
    pub fn lid(&self) -> String {
        paserk::lid(self)
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("lid", &self.lid())
            .finish_non_exhaustive()
    }
}
