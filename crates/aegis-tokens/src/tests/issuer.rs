//! Client access token issuance.

use super::helpers::*;
use crate::*;
use std::sync::Arc;

#[tokio::test]
async fn test_issued_cat_verifies_for_caller() {
    let store = create_test_tenant_store(&[("svc-1", vec![create_test_raw_seed(7)])]);
    let issuer = Issuer::new(store.clone());
    let interpreter = create_test_interpreter(store, create_test_store(vec![]));

    let wire = issuer.issue("svc-1").await.unwrap();
    let Token::Client(cat) = interpreter.interpret(&wire).await.unwrap() else {
        panic!("expected client access token");
    };

    let claims = cat.claims();
    assert_eq!(cat.client_id(), "svc-1");
    assert_eq!(claims.issuer, "svc-1");
    assert_eq!(claims.subject.as_deref(), Some("svc-1"));
    assert_eq!(claims.audience, CAT_AUDIENCE);
    assert!(claims.client_id.is_none());
    assert!(claims.ttl() <= chrono::Duration::from_std(CAT_MAX_TTL).unwrap());
}

#[tokio::test]
async fn test_issued_cat_footer_names_caller_key() {
    let store = create_test_tenant_store(&[("svc-1", vec![create_test_raw_seed(7)])]);
    let issuer = Issuer::new(store.clone());
    let signer = Signer::new(store, "svc-1").await;

    let wire = issuer.issue("svc-1").await.unwrap();
    assert_eq!(wire::extract_kid(&wire).unwrap(), Some(signer.kid().await.unwrap()));
}

#[tokio::test]
async fn test_issue_with_custom_audience() {
    let store = create_test_store(vec![create_test_raw_seed(7)]);
    let issuer = Issuer::new(store.clone()).with_audience("authz-eu");
    assert_eq!(issuer.audience(), "authz-eu");

    let wire = issuer.issue("svc-1").await.unwrap();
    let verifier = Verifier::new(
        signing_public_keys(store, aegis_keys::PublicKeyCacheConfig::default()).unwrap(),
        "svc-1",
    );
    let token = verifier.verify_as(&wire, TokenKind::Client).await.unwrap();
    assert_eq!(token.audience(), "authz-eu");
}

#[tokio::test]
async fn test_issue_for_unknown_caller_fails() {
    let store = create_test_tenant_store(&[("svc-1", vec![create_test_raw_seed(7)])]);
    let issuer = Issuer::new(store);

    let err = issuer.issue("svc-404").await.unwrap_err();
    assert!(matches!(err, TokenError::Key(aegis_keys::KeyError::NotFound(_))));
}

#[tokio::test]
async fn test_concurrent_issue_shares_signer() {
    let store = create_test_store(vec![create_test_raw_seed(7)]);
    let issuer = Arc::new(Issuer::new(store.clone()));
    let interpreter = create_test_interpreter(store.clone(), store);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let issuer = Arc::clone(&issuer);
            tokio::spawn(async move { issuer.issue("svc-1").await })
        })
        .collect();

    let mut jtis = Vec::new();
    for handle in handles {
        let wire = handle.await.unwrap().unwrap();
        let token = interpreter.verify(&wire).await.unwrap();
        jtis.push(token.claims().jti.clone());
    }
    jtis.sort();
    jtis.dedup();
    assert_eq!(jtis.len(), 8);
}
