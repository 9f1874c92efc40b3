//! Token kinds, challenge channels, scopes and user info.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// User access token
    #[serde(rename = "uat")]
    User,
    /// Service (machine-to-machine) access token
    #[serde(rename = "sat")]
    Service,
    /// Client access token, self-issued by a caller
    #[serde(rename = "cat")]
    Client,
    /// Proof of one completed verification step
    #[serde(rename = "challenge")]
    Challenge,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::User => "uat",
            TokenKind::Service => "sat",
            TokenKind::Client => "cat",
            TokenKind::Challenge => "challenge",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verification channel recorded in a challenge token's `typ` claim
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChannelType {
    Captcha,
    EmailOtp,
    Totp,
    SmsOtp,
    TgOtp,
    WebAuthn,
    WechatMp,
    AlipayMp,
    /// A channel this build does not know yet
    Other(String),
}

impl ChannelType {
    pub fn as_str(&self) -> &str {
        match self {
            ChannelType::Captcha => "captcha",
            ChannelType::EmailOtp => "email_otp",
            ChannelType::Totp => "totp",
            ChannelType::SmsOtp => "sms_otp",
            ChannelType::TgOtp => "tg_otp",
            ChannelType::WebAuthn => "webauthn",
            ChannelType::WechatMp => "wechat-mp",
            ChannelType::AlipayMp => "alipay-mp",
            ChannelType::Other(other) => other,
        }
    }

    /// OTP, TOTP and WebAuthn: the channel proves possession of a factor
    pub fn is_verification(&self) -> bool {
        matches!(
            self,
            ChannelType::EmailOtp
                | ChannelType::Totp
                | ChannelType::SmsOtp
                | ChannelType::TgOtp
                | ChannelType::WebAuthn
        )
    }

    /// Mini-program code exchange
    pub fn is_exchange(&self) -> bool {
        matches!(self, ChannelType::WechatMp | ChannelType::AlipayMp)
    }

    /// Channels that send a code and must sit behind a captcha
    pub fn requires_captcha(&self) -> bool {
        matches!(self, ChannelType::EmailOtp | ChannelType::SmsOtp)
    }
}

impl From<&str> for ChannelType {
    fn from(value: &str) -> Self {
        match value {
            "captcha" => ChannelType::Captcha,
            "email_otp" => ChannelType::EmailOtp,
            "totp" => ChannelType::Totp,
            "sms_otp" => ChannelType::SmsOtp,
            "tg_otp" => ChannelType::TgOtp,
            "webauthn" => ChannelType::WebAuthn,
            "wechat-mp" => ChannelType::WechatMp,
            "alipay-mp" => ChannelType::AlipayMp,
            other => ChannelType::Other(other.to_string()),
        }
    }
}

impl From<String> for ChannelType {
    fn from(value: String) -> Self {
        ChannelType::from(value.as_str())
    }
}

impl From<ChannelType> for String {
    fn from(value: ChannelType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Well-known scope values
pub mod scope {
    pub const OPENID: &str = "openid";
    pub const PROFILE: &str = "profile";
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "phone";
}

/// Whether the space separated `scopes` contains `wanted`
pub fn has_scope(scopes: &str, wanted: &str) -> bool {
    scopes.split_whitespace().any(|s| s == wanted)
}

/// User identity carried, encrypted, inside a user access token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// External user identifier
    pub sub: String,
    /// Internal user identifier, never exposed to clients
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl UserInfo {
    pub fn new(sub: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            ..Default::default()
        }
    }

    /// Keep only the fields `scopes` grants; `sub` and `uid` always stay
    pub fn filter_by_scope(mut self, scopes: &str) -> Self {
        if !has_scope(scopes, scope::PROFILE) {
            self.nickname = None;
            self.picture = None;
        }
        if !has_scope(scopes, scope::EMAIL) {
            self.email = None;
        }
        if !has_scope(scopes, scope::PHONE) {
            self.phone = None;
        }
        self
    }
}
