//! Sizes, purpose strings and KDF parameters.
//!
//! All values here are part of the wire/derivation contract. Changing any of
//! them changes every derived key and key id.

/// Size of a tenant seed in bytes (salt ‖ key material)
pub const SEED_SIZE: usize = 48;

/// Size of the salt prefix of a seed
pub const SEED_SALT_SIZE: usize = 16;

/// Size of the key material suffix of a seed
pub const SEED_KEY_SIZE: usize = 32;

/// Size of every derived subkey
pub const DERIVED_KEY_SIZE: usize = 32;

/// Size of Ed25519 public keys
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of Ed25519 signatures
pub const SIGNATURE_SIZE: usize = 64;

/// Size of PASETO v4.local symmetric keys
pub const SYMMETRIC_KEY_SIZE: usize = 32;

/// Size of the random nonce prefixed to v4.local payloads
pub const LOCAL_NONCE_SIZE: usize = 32;

/// Size of the BLAKE2b authentication tag suffixed to v4.local payloads
pub const LOCAL_TAG_SIZE: usize = 32;

/// Digest size for PASERK key ids (BLAKE2b-264, 44 base64url characters)
pub const KEY_ID_HASH_SIZE: usize = 33;

/// KDF purpose for the Ed25519 signing subkey
pub const PURPOSE_SIGN: &str = "sign";

/// KDF purpose for the v4.local symmetric subkey
pub const PURPOSE_ENCRYPT: &str = "encrypt";

/// Argon2id parameters for seed derivation
pub mod argon2_params {
    use crate::errors::{CryptoError, Result};
    use argon2::{Params, Version};

    /// Memory cost: 64 MiB
    pub const MEMORY_COST: u32 = 64 * 1024;

    /// Time cost: 1 iteration
    pub const TIME_COST: u32 = 1;

    /// Parallelism: 4 lanes
    pub const PARALLELISM: u32 = 4;

    /// Output length: 32 bytes
    pub const OUTPUT_LENGTH: usize = super::DERIVED_KEY_SIZE;

    /// Get Argon2id parameters
    pub fn get_params() -> Result<Params> {
        Params::new(MEMORY_COST, TIME_COST, PARALLELISM, Some(OUTPUT_LENGTH))
            .map_err(|e| CryptoError::KeyDerivationFailed(e.to_string()))
    }

    /// Argon2 version
    pub const VERSION: Version = Version::V0x13;
}
