//! # aegis-keys
//!
//! Per-tenant key distribution with hot rotation.
//!
//! A [`KeySource`] returns the raw seeds of a tenant id. The [`KeyStore`]
//! caches them, collapses concurrent cold fetches into one call and pushes
//! rotations to subscribers through a [`Watcher`]. Every set it hands out
//! carries a generation, so subscribers holding a [`KeySlot`] keep the newest
//! rotation even when derivations finish out of order. The [`PublicKeyCache`]
//! keeps derived public keys with an expiry and refreshes them in the
//! background before they go stale.

pub mod config;
pub mod errors;
mod keyset;
mod loader;
mod pubkey;
mod source;
mod store;
mod watcher;


pub use config::*;
pub use errors::*;
pub use keyset::{KeySet, KeySlot};
pub use loader::{derive_blocking, SeedLoader};
pub use pubkey::{KeysCallback, PublicKeyCache, PublicKeyLoader};
pub use source::*;
pub use store::KeyStore;
pub use watcher::*;
