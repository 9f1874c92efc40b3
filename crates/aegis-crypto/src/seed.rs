//! Tenant seeds.

use crate::{constants::*, errors::*, utils::generate_random_bytes};
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// KDF purpose tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPurpose {
    /// Ed25519 signing key pair
    Sign,
    /// PASETO v4.local symmetric key
    Encrypt,
}

impl KeyPurpose {
    /// Purpose string mixed into the Argon2id salt
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyPurpose::Sign => PURPOSE_SIGN,
            KeyPurpose::Encrypt => PURPOSE_ENCRYPT,
        }
    }
}

/// A 48-byte tenant seed: 16-byte salt ‖ 32-byte key material.
///
/// Seeds are immutable once parsed. Only derived subkeys and their ids are
/// ever observable; `Debug` never prints the bytes.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; SEED_SIZE]);

impl Seed {
    /// Parse a seed from raw bytes.
    ///
    /// # Errors
    ///
    /// `CryptoError::InvalidKeyFormat` unless `bytes` is exactly 48 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let array: [u8; SEED_SIZE] =
            bytes
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyFormat {
                    expected: SEED_SIZE,
                    actual: bytes.len(),
                })?;
        Ok(Self(array))
    }

    /// Generate a fresh random seed
    pub fn generate() -> Result<Self> {
        Ok(Self(generate_random_bytes::<SEED_SIZE>()?))
    }

    /// Salt prefix (first 16 bytes)
    pub fn salt(&self) -> &[u8] {
        &self.0[..SEED_SALT_SIZE]
    }

    /// Key material suffix (last 32 bytes)
    pub fn key_material(&self) -> &[u8] {
        &self.0[SEED_SALT_SIZE..]
    }

    /// Raw seed bytes.
    ///
    /// # Security
    ///
    /// Never log or persist these bytes outside the secret store.
    pub fn as_bytes(&self) -> &[u8; SEED_SIZE] {
        &self.0
    }
}

impl PartialEq for Seed {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for Seed {}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(..)")
    }
}
