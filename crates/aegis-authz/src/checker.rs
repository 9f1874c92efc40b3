//! Relationship checks against the authorization service.

use crate::{config::CheckerConfig, errors::*, types::*};
use aegis_tokens::{Issuer, Token};
use reqwest::StatusCode;
use std::sync::Arc;
use tracing::{debug, warn};

/// Asks the authorization service whether a token's subject holds a relation
pub struct Checker {
    config: CheckerConfig,
    issuer: Arc<Issuer>,
    http: reqwest::Client,
}

impl Checker {
    pub fn new(config: CheckerConfig, issuer: Arc<Issuer>) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            config,
            issuer,
            http,
        })
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Check `relation` on (`object_type`, `object_id`) for the subject of `token`.
    ///
    /// The subject is the user of a user access token with user info
    /// attached, otherwise the token's client. The call is authenticated
    /// with a CAT issued for the token's audience and is never retried.
    pub async fn check(
        &self,
        token: &Token,
        relation: &str,
        object_type: &str,
        object_id: &str,
    ) -> Result<bool> {
        let request = subject_of(token).into_request(relation, object_type, object_id);
        let cat = self.issuer.issue(token.audience()).await?;

        debug!(
            subject_type = %request.subject_type,
            relation,
            object_type,
            audience = token.audience(),
            "Checking relation"
        );

        let response = self
            .http
            .post(self.config.check_url())
            .bearer_auth(cat)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        match status {
            StatusCode::OK => {
                let body: CheckResponse = serde_json::from_slice(&bytes).map_err(|e| {
                    AuthzError::CheckFailed {
                        status: status.as_u16(),
                        message: format!("invalid response body: {e}"),
                    }
                })?;
                Ok(body.permitted)
            }
            StatusCode::UNAUTHORIZED => {
                let reason = parse_reason(&bytes);
                warn!(audience = token.audience(), reason = %reason, "Client access token rejected");
                Err(AuthzError::CatRejected(reason))
            }
            _ => Err(AuthzError::CheckFailed {
                status: status.as_u16(),
                message: parse_reason(&bytes),
            }),
        }
    }
}

struct Subject<'a> {
    kind: &'static str,
    id: &'a str,
}

impl Subject<'_> {
    fn into_request(self, relation: &str, object_type: &str, object_id: &str) -> CheckRequest {
        CheckRequest {
            subject_type: self.kind.to_string(),
            subject_id: self.id.to_string(),
            relation: relation.to_string(),
            object_type: object_type.to_string(),
            object_id: object_id.to_string(),
        }
    }
}

fn subject_of(token: &Token) -> Subject<'_> {
    match token {
        Token::User(uat) => match uat.user() {
            Some(user) => Subject {
                kind: SUBJECT_TYPE_USER,
                id: &user.sub,
            },
            None => Subject {
                kind: SUBJECT_TYPE_APP,
                id: token.client_id(),
            },
        },
        _ => Subject {
            kind: SUBJECT_TYPE_APP,
            id: token.client_id(),
        },
    }
}

/// Error text of a non-200 body; bodies that are not JSON are passed through
fn parse_reason(bytes: &[u8]) -> String {
    match serde_json::from_slice::<CheckResponse>(bytes) {
        Ok(body) => body.reason(),
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}
