//! Test helpers for token flows.

use crate::*;
use aegis_crypto::{SEED_KEY_SIZE, SEED_SALT_SIZE, SEED_SIZE};
use aegis_keys::{FnSource, KeyError, KeyStore, PublicKeyCacheConfig, StaticSource, StoreConfig};
use futures::FutureExt;
use std::{collections::HashMap, sync::Arc, time::Duration};

/// 48-byte seed with a zero salt and key material filled with `fill`
pub fn create_test_raw_seed(fill: u8) -> Vec<u8> {
    let mut raw = vec![0u8; SEED_SIZE];
    raw[SEED_SALT_SIZE..].copy_from_slice(&[fill; SEED_KEY_SIZE]);
    raw
}

/// Store serving `keys` for every id
pub fn create_test_store(keys: Vec<Vec<u8>>) -> KeyStore {
    KeyStore::new(Arc::new(StaticSource::new(keys)), StoreConfig::default())
}

/// Store serving a per-id key list; unknown ids are not found
pub fn create_test_tenant_store(tenants: &[(&str, Vec<Vec<u8>>)]) -> KeyStore {
    let tenants: Arc<HashMap<String, Vec<Vec<u8>>>> = Arc::new(
        tenants
            .iter()
            .map(|(id, keys)| (id.to_string(), keys.clone()))
            .collect(),
    );
    let source = FnSource::new(move |id| {
        let tenants = Arc::clone(&tenants);
        async move { tenants.get(&id).cloned().ok_or(KeyError::NotFound(id)) }.boxed()
    });
    KeyStore::new(Arc::new(source), StoreConfig::default())
}

pub fn create_test_interpreter(sign_store: KeyStore, encrypt_store: KeyStore) -> Interpreter {
    Interpreter::new(
        signing_public_keys(sign_store, PublicKeyCacheConfig::default()).unwrap(),
        encrypt_store,
    )
}

pub fn create_test_claims(client_id: &str, audience: &str) -> Claims {
    Claims::builder()
        .issuer("aegis")
        .client_id(client_id)
        .audience(audience)
        .expires_in(Duration::from_secs(900))
        .build()
        .unwrap()
}
