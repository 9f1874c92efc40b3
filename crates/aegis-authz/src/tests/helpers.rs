//! Mock authorization service and token fixtures.

use crate::*;
use aegis_keys::{KeyStore, StaticSource, StoreConfig};
use aegis_tokens::{
    Claims, Issuer, ServiceAccessToken, Token, UserAccessToken, UserInfo,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use std::{sync::Arc, time::Duration};
use tokio::{net::TcpListener, sync::Mutex};

/// One request as seen by the mock service
#[derive(Debug, Clone)]
pub struct Recorded {
    pub authorization: Option<String>,
    pub request: CheckRequest,
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    body: String,
    delay: Duration,
    recorded: Arc<Mutex<Vec<Recorded>>>,
}

pub struct MockAuthz {
    pub endpoint: String,
    pub recorded: Arc<Mutex<Vec<Recorded>>>,
}

async fn handle_check(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(request): Json<CheckRequest>,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.recorded.lock().await.push(Recorded {
        authorization,
        request,
    });

    tokio::time::sleep(state.delay).await;
    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body,
    )
}

/// Serve `/auth/check` on an ephemeral port, always answering `status` + `body`
pub async fn create_test_authz(status: StatusCode, body: &str) -> MockAuthz {
    create_test_authz_with_delay(status, body, Duration::ZERO).await
}

pub async fn create_test_authz_with_delay(
    status: StatusCode,
    body: &str,
    delay: Duration,
) -> MockAuthz {
    let recorded = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        status,
        body: body.to_string(),
        delay,
        recorded: Arc::clone(&recorded),
    };
    let app = Router::new()
        .route(CHECK_PATH, post(handle_check))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockAuthz {
        endpoint: format!("http://{addr}"),
        recorded,
    }
}

/// Store serving one fixed seed for every id
pub fn create_test_store() -> KeyStore {
    KeyStore::new(
        Arc::new(StaticSource::new(vec![vec![7u8; 48]])),
        StoreConfig::default(),
    )
}

pub fn create_test_checker(store: KeyStore, endpoint: &str) -> Checker {
    Checker::new(CheckerConfig::new(endpoint), Arc::new(Issuer::new(store))).unwrap()
}

fn create_test_claims() -> Claims {
    Claims::builder()
        .issuer("aegis")
        .client_id("app-1")
        .audience("svc-1")
        .expires_in(Duration::from_secs(900))
        .build()
        .unwrap()
}

/// UAT for `svc-1` from `app-1` with user `u1` attached
pub fn create_test_user_token() -> Token {
    Token::User(UserAccessToken::new(
        create_test_claims(),
        "openid",
        Some(UserInfo::new("u1")),
    ))
}

pub fn create_test_service_token() -> Token {
    Token::Service(ServiceAccessToken::new(create_test_claims(), "read"))
}
