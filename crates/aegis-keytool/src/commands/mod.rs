/*!
 * Command implementations
 */

pub mod check;
pub mod keys;
pub mod tokens;

use crate::{config::Config, source::DirSource};
use aegis_keys::KeyStore;
use aegis_tokens::{signing_public_keys, Interpreter};
use anyhow::{Context, Result};
use std::sync::Arc;

pub(crate) fn create_store(config: &Config) -> KeyStore {
    KeyStore::new(
        Arc::new(DirSource::new(&config.keys_dir)),
        config.store.clone(),
    )
}

/// One store serves both signing and encryption seeds
pub(crate) fn create_interpreter(config: &Config, store: KeyStore) -> Result<Interpreter> {
    let public_keys = signing_public_keys(store.clone(), config.public_keys.clone())
        .context("public key cache settings")?;
    Ok(Interpreter::new(public_keys, store))
}
