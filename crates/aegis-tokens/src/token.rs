//! The four token kinds and their claim mapping.
//!
//! | kind      | `cli` | `sub`                 | `typ` | other             |
//! |-----------|-------|-----------------------|-------|-------------------|
//! | UAT       | yes   | encrypted user info   |       | `scope`           |
//! | SAT       | yes   |                       |       | `scope`           |
//! | CAT       |       | client id (== `iss`)  |       |                   |
//! | Challenge | yes   | verified principal    | yes   | `biz` (optional)  |

use crate::{claims::*, errors::*, types::*};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Upper bound on a client access token's lifetime
pub const CAT_MAX_TTL: Duration = Duration::from_secs(5 * 60);

/// Audience of client access tokens: the authorization service itself
pub const CAT_AUDIENCE: &str = "aegis";

/// A parsed or buildable token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    User(UserAccessToken),
    Service(ServiceAccessToken),
    Client(ClientAccessToken),
    Challenge(ChallengeToken),
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::User(_) => TokenKind::User,
            Token::Service(_) => TokenKind::Service,
            Token::Client(_) => TokenKind::Client,
            Token::Challenge(_) => TokenKind::Challenge,
        }
    }

    pub fn claims(&self) -> &Claims {
        match self {
            Token::User(t) => &t.claims,
            Token::Service(t) => &t.claims,
            Token::Client(t) => &t.claims,
            Token::Challenge(t) => &t.claims,
        }
    }

    /// `cli`, or `sub` for a client access token
    pub fn client_id(&self) -> &str {
        let claims = self.claims();
        match self {
            Token::Client(_) => claims.subject.as_deref(),
            _ => claims.client_id.as_deref(),
        }
        .unwrap_or_default()
    }

    pub fn audience(&self) -> &str {
        &self.claims().audience
    }

    pub fn is_expired(&self) -> bool {
        self.claims().is_expired_at(Utc::now())
    }

    /// Classify and parse wire claims
    pub fn from_raw(raw: RawClaims) -> Result<Self> {
        let kind = TokenKind::discriminate(&raw)?;
        Self::parse(raw, kind)
    }

    /// Parse wire claims as `expected`
    pub fn parse(raw: RawClaims, expected: TokenKind) -> Result<Self> {
        let found = TokenKind::discriminate(&raw)?;
        if found != expected {
            return Err(TokenError::UnsupportedTokenType { expected, found });
        }

        let claims = Claims::from_raw(&raw)?;
        match found {
            TokenKind::User => {
                require_str(&claims.client_id, "cli")?;
                require_str(&claims.subject, "sub")?;
                Ok(Token::User(UserAccessToken {
                    claims,
                    scope: raw.scope.ok_or(TokenError::MissingClaims("scope"))?,
                    user: None,
                }))
            }
            TokenKind::Service => {
                require_str(&claims.client_id, "cli")?;
                Ok(Token::Service(ServiceAccessToken {
                    claims,
                    scope: raw.scope.ok_or(TokenError::MissingClaims("scope"))?,
                }))
            }
            TokenKind::Client => {
                let subject = require_str(&claims.subject, "sub")?;
                if subject != claims.issuer {
                    return Err(TokenError::Malformed(
                        "client access token issuer must equal subject".into(),
                    ));
                }
                Ok(Token::Client(ClientAccessToken { claims }))
            }
            TokenKind::Challenge => {
                require_str(&claims.client_id, "cli")?;
                require_str(&claims.subject, "sub")?;
                Ok(Token::Challenge(ChallengeToken {
                    claims,
                    channel: raw.typ.ok_or(TokenError::MissingClaims("typ"))?,
                    biz: raw.biz,
                }))
            }
        }
    }

    /// Wire claims for signing.
    ///
    /// A user access token must be sealed first so its `sub` carries the
    /// encrypted user info.
    pub fn to_raw(&self) -> Result<RawClaims> {
        let mut raw = self.claims().to_raw();
        match self {
            Token::User(t) => {
                require_str(&t.claims.client_id, "cli")?;
                require_str(&t.claims.subject, "sub")?;
                raw.scope = Some(t.scope.clone());
            }
            Token::Service(t) => {
                require_str(&t.claims.client_id, "cli")?;
                raw.sub = None;
                raw.scope = Some(t.scope.clone());
            }
            Token::Client(_) => {
                raw.cli = None;
            }
            Token::Challenge(t) => {
                require_str(&t.claims.client_id, "cli")?;
                raw.typ = Some(t.channel.clone());
                raw.biz = t.biz.clone();
            }
        }
        Ok(raw)
    }
}

fn require_str<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(TokenError::MissingClaims(name))
}

impl TokenKind {
    /// `typ` ⇒ challenge; `cli` with `sub` ⇒ user; `cli` alone ⇒ service;
    /// neither ⇒ client, which needs `sub`.
    pub fn discriminate(raw: &RawClaims) -> Result<Self> {
        if raw.typ.is_some() {
            return Ok(TokenKind::Challenge);
        }
        match (raw.cli.is_some(), raw.sub.is_some()) {
            (true, true) => Ok(TokenKind::User),
            (true, false) => Ok(TokenKind::Service),
            (false, true) => Ok(TokenKind::Client),
            (false, false) => Err(TokenError::MissingClaims("sub")),
        }
    }
}

/// User access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccessToken {
    pub(crate) claims: Claims,
    scope: String,
    pub(crate) user: Option<UserInfo>,
}

impl UserAccessToken {
    /// `user` is filtered by `scope` before it is stored
    pub fn new(claims: Claims, scope: impl Into<String>, user: Option<UserInfo>) -> Self {
        let scope = scope.into();
        let user = user.map(|user| user.filter_by_scope(&scope));
        Self {
            claims: Claims {
                subject: None,
                ..claims
            },
            scope,
            user,
        }
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn has_scope(&self, wanted: &str) -> bool {
        has_scope(&self.scope, wanted)
    }

    /// Decrypted user info, if known
    pub fn user(&self) -> Option<&UserInfo> {
        self.user.as_ref()
    }

    /// Encrypted user info as carried in `sub`
    pub fn encrypted_subject(&self) -> Option<&str> {
        self.claims.subject.as_deref()
    }

    /// Whether the user info has been encrypted into `sub`
    pub fn is_sealed(&self) -> bool {
        self.claims.subject.is_some()
    }

    /// Use a user info payload the caller already encrypted for the
    /// audience. It is carried as is, without scope filtering.
    pub fn with_encrypted_subject(mut self, sealed: impl Into<String>) -> Self {
        self.set_encrypted_subject(sealed.into());
        self
    }

    pub(crate) fn set_encrypted_subject(&mut self, sealed: String) {
        self.claims.subject = Some(sealed);
    }

    pub(crate) fn attach_user(&mut self, user: UserInfo) {
        self.user = Some(user);
    }
}

/// Service access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAccessToken {
    claims: Claims,
    scope: String,
}

impl ServiceAccessToken {
    pub fn new(claims: Claims, scope: impl Into<String>) -> Self {
        Self {
            claims: Claims {
                subject: None,
                ..claims
            },
            scope: scope.into(),
        }
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn has_scope(&self, wanted: &str) -> bool {
        has_scope(&self.scope, wanted)
    }
}

/// Client access token, self-issued by a caller for the authorization
/// service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAccessToken {
    claims: Claims,
}

impl ClientAccessToken {
    /// `iss = sub = client_id`; `ttl` must be non-zero and at most
    /// [`CAT_MAX_TTL`]
    pub fn new(client_id: &str, audience: &str, ttl: Duration) -> Result<Self> {
        Self::new_at(client_id, audience, ttl, Utc::now())
    }

    pub fn new_at(
        client_id: &str,
        audience: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        if ttl.is_zero() || ttl > CAT_MAX_TTL {
            return Err(TokenError::InvalidTtl {
                ttl,
                max: CAT_MAX_TTL,
            });
        }

        let claims = Claims::builder()
            .issuer(client_id)
            .subject(client_id)
            .audience(audience)
            .expires_in(ttl)
            .build_at(now)?;
        Ok(Self { claims })
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn client_id(&self) -> &str {
        &self.claims.issuer
    }
}

/// Proof that a principal completed one verification step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeToken {
    claims: Claims,
    channel: ChannelType,
    biz: Option<String>,
}

impl ChallengeToken {
    /// `principal` becomes `sub`: an email, phone number, user id or
    /// credential id depending on `channel`
    pub fn new(
        claims: Claims,
        principal: impl Into<String>,
        channel: ChannelType,
        biz: Option<String>,
    ) -> Self {
        Self {
            claims: Claims {
                subject: Some(principal.into()),
                ..claims
            },
            channel,
            biz,
        }
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn principal(&self) -> &str {
        self.claims.subject.as_deref().unwrap_or_default()
    }

    pub fn channel(&self) -> &ChannelType {
        &self.channel
    }

    pub fn biz(&self) -> Option<&str> {
        self.biz.as_deref()
    }
}
