//! Purpose-bound subkey derivation from tenant seeds.
//!
//! `subkey = Argon2id(key_material, salt ‖ purpose)` with the fixed
//! parameters in [`crate::constants::argon2_params`]. The same seed and
//! purpose always produce the same subkey, so old and new seeds can coexist
//! during a rotation window.

use crate::{constants::*, errors::*, keys::*, seed::*};
use argon2::{Algorithm, Argon2};
use zeroize::Zeroizing;

/// Derive a 32-byte subkey for `purpose`.
///
/// CPU and memory bound (64 MiB); async callers should run it on a blocking
/// thread.
pub fn derive(seed: &Seed, purpose: KeyPurpose) -> Result<Zeroizing<[u8; DERIVED_KEY_SIZE]>> {
    let tag = purpose.as_str().as_bytes();
    let mut salt = Vec::with_capacity(SEED_SALT_SIZE + tag.len());
    salt.extend_from_slice(seed.salt());
    salt.extend_from_slice(tag);

    let argon2 = Argon2::new(
        Algorithm::Argon2id,
        argon2_params::VERSION,
        argon2_params::get_params()?,
    );

    let mut output = Zeroizing::new([0u8; DERIVED_KEY_SIZE]);
    argon2
        .hash_password_into(seed.key_material(), &salt, &mut output[..])
        .map_err(|e| CryptoError::KeyDerivationFailed(e.to_string()))?;

    Ok(output)
}

/// Derive the tenant's Ed25519 signing key pair
pub fn derive_signing_key_pair(seed: &Seed) -> Result<SigningKeyPair> {
    let subkey = derive(seed, KeyPurpose::Sign)?;
    Ok(SigningKeyPair::from_seed(&subkey))
}

/// Derive the tenant's v4.local symmetric key
pub fn derive_symmetric_key(seed: &Seed) -> Result<SymmetricKey> {
    let subkey = derive(seed, KeyPurpose::Encrypt)?;
    Ok(SymmetricKey::from_bytes(*subkey))
}
