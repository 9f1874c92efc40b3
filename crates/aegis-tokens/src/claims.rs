//! Registered and wire claims.

use crate::{errors::*, types::ChannelType};
use aegis_crypto::generate_random_bytes;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Claims shared by every token kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    /// `iss`
    pub issuer: String,
    /// `cli`, absent on client access tokens
    pub client_id: Option<String>,
    /// `aud`
    pub audience: String,
    /// `sub`; for a user access token this is the encrypted user info
    pub subject: Option<String>,
    /// `iat`
    pub issued_at: DateTime<Utc>,
    /// `nbf`
    pub not_before: DateTime<Utc>,
    /// `exp`
    pub expires_at: DateTime<Utc>,
    /// `jti`
    pub jti: String,
}

impl Claims {
    pub fn builder() -> ClaimsBuilder {
        ClaimsBuilder::default()
    }

    /// Whether `exp` has passed at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Lifetime between `iat` and `exp`
    pub fn ttl(&self) -> chrono::Duration {
        self.expires_at - self.issued_at
    }

    pub(crate) fn from_raw(raw: &RawClaims) -> Result<Self> {
        Ok(Self {
            issuer: require(&raw.iss, "iss")?.clone(),
            client_id: raw.cli.clone(),
            audience: require(&raw.aud, "aud")?.clone(),
            subject: raw.sub.clone(),
            issued_at: *require(&raw.iat, "iat")?,
            not_before: raw.nbf.or(raw.iat).ok_or(TokenError::MissingClaims("nbf"))?,
            expires_at: *require(&raw.exp, "exp")?,
            jti: raw.jti.clone().unwrap_or_default(),
        })
    }

    pub(crate) fn to_raw(&self) -> RawClaims {
        RawClaims {
            iss: Some(self.issuer.clone()),
            aud: Some(self.audience.clone()),
            sub: self.subject.clone(),
            cli: self.client_id.clone(),
            exp: Some(self.expires_at),
            iat: Some(self.issued_at),
            nbf: Some(self.not_before),
            jti: Some(self.jti.clone()),
            ..Default::default()
        }
    }
}

fn require<'a, T>(value: &'a Option<T>, name: &'static str) -> Result<&'a T> {
    value.as_ref().ok_or(TokenError::MissingClaims(name))
}

/// Builder stamping `iat`, `nbf`, `exp` and a fresh `jti`
#[derive(Debug, Clone, Default)]
pub struct ClaimsBuilder {
    issuer: Option<String>,
    client_id: Option<String>,
    audience: Option<String>,
    subject: Option<String>,
    expires_in: Option<Duration>,
}

impl ClaimsBuilder {
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn expires_in(mut self, expires_in: Duration) -> Self {
        self.expires_in = Some(expires_in);
        self
    }

    pub fn build(self) -> Result<Claims> {
        self.build_at(Utc::now())
    }

    /// Build with `iat = nbf = now`, truncated to whole seconds
    pub fn build_at(self, now: DateTime<Utc>) -> Result<Claims> {
        let issuer = non_empty(self.issuer, "iss")?;
        let audience = non_empty(self.audience, "aud")?;
        let expires_in = self.expires_in.ok_or(TokenError::MissingClaims("exp"))?;
        let lifetime = chrono::Duration::from_std(expires_in).map_err(|_| TokenError::InvalidTtl {
            ttl: expires_in,
            max: Duration::MAX,
        })?;

        let now = now.trunc_subsecs(0);
        Ok(Claims {
            issuer,
            client_id: self.client_id,
            audience,
            subject: self.subject,
            issued_at: now,
            not_before: now,
            expires_at: now + lifetime,
            jti: generate_jti()?,
        })
    }
}

fn non_empty(value: Option<String>, name: &'static str) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(TokenError::MissingClaims(name))
}

/// 16 random bytes, hex encoded
pub fn generate_jti() -> Result<String> {
    Ok(hex::encode(generate_random_bytes::<16>()?))
}

/// Claims exactly as they appear in a token payload.
///
/// Every field is optional so a payload can be inspected before its kind is
/// known. Times are RFC 3339 strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cli: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<ChannelType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biz: Option<String>,
}

impl RawClaims {
    /// Client the token belongs to: `cli`, or `sub` for client access tokens
    pub fn client_id(&self) -> Option<&str> {
        match (&self.cli, &self.typ) {
            (Some(cli), _) => Some(cli.as_str()),
            (None, None) => self.sub.as_deref(),
            (None, Some(_)) => None,
        }
        .filter(|id| !id.is_empty())
    }

    /// Non-empty audience
    pub fn audience(&self) -> Option<&str> {
        self.aud.as_deref().filter(|aud| !aud.is_empty())
    }
}
