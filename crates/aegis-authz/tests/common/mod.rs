use aegis_keys::{FnSource, KeyError, KeyStore, StoreConfig};
use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};
use futures::FutureExt;
use serde_json::{json, Value};
use std::{collections::HashMap, sync::Arc};
use tokio::{net::TcpListener, sync::Mutex};

/// Tenant seeds: zero salt, key material filled with `fill`
pub fn seed(fill: u8) -> Vec<u8> {
    let mut raw = vec![0u8; 48];
    raw[16..].fill(fill);
    raw
}

/// Key store over a fixed tenant table
pub fn tenant_store(tenants: &[(&str, Vec<Vec<u8>>)]) -> KeyStore {
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

pub type Seen = Arc<Mutex<Vec<(String, Value)>>>;

/// Authorization service permitting `owner` for user `u1` only
pub async fn start_authz() -> (String, Seen) {
    async fn handle(
        State(seen): State<Seen>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let bearer = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let permitted = body["subject_id"] == "u1" && body["relation"] == "owner";
        seen.lock().await.push((bearer, body));
        Json(json!({ "permitted": permitted }))
    }

    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/auth/check", post(handle))
        .with_state(Arc::clone(&seen));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), seen)
}
