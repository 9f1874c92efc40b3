//! # aegis-tokens
//!
//! The four token kinds of the platform and everything needed to move them
//! over the wire:
//!
//! - [`Token`]: user (UAT), service (SAT), client (CAT) and challenge tokens
//! - [`Signer`] / [`Verifier`]: PASETO v4.public under per-tenant Ed25519 keys
//! - [`Encryptor`] / [`Decryptor`]: PASETO v4.local under per-tenant
//!   symmetric keys, used for the encrypted UAT subject
//! - [`Interpreter`]: turn a bearer string into a verified, decrypted token
//! - [`Issuer`]: mint short-lived client access tokens

pub mod claims;
mod cryptor;
pub mod errors;
mod interpreter;
mod issuer;
mod registry;
mod signer;
pub mod token;
pub mod types;
mod verifier;
pub mod wire;


pub use claims::*;
pub use cryptor::{Decryptor, Encryptor};
pub use errors::*;
pub use interpreter::Interpreter;
pub use issuer::Issuer;
pub use signer::Signer;
pub use token::*;
pub use types::*;
pub use verifier::{signing_public_keys, Verifier};
