//! # aegis-crypto
//!
//! Cryptographic primitives for the aegis token core.
//!
//! - Tenant [`Seed`]s (16-byte salt ‖ 32-byte key material) and the Argon2id
//!   KDF that turns a seed plus a purpose string into a 32-byte subkey
//! - Ed25519 signing key pairs and PASETO v4.local symmetric keys derived
//!   from those subkeys
//! - PASERK-style key identifiers (`k4.pid.`, `k4.lid.`, `k4.sid.`)
//! - The PASETO v4 `public` and `local` protocols
//!
//! ## Security Properties
//!
//! - Seeds and derived secret keys are zeroized on drop
//! - Seeds never appear in `Debug` output
//! - Tag comparison is constant time
//! - No unsafe code

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constants;
pub mod derivation;
pub mod errors;
pub mod keys;
pub mod paserk;
pub mod paseto;
pub mod seed;
pub mod utils;

pub use constants::*;
pub use derivation::*;
pub use errors::{CryptoError, Result};
pub use keys::*;
pub use paserk::*;
pub use seed::*;
pub use utils::*;
