//! Check protocol bodies.

use serde::{Deserialize, Serialize};

pub const SUBJECT_TYPE_USER: &str = "user";
pub const SUBJECT_TYPE_APP: &str = "app";

/// Path of the check endpoint, relative to the configured base URL
pub const CHECK_PATH: &str = "/auth/check";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRequest {
    /// `user` or `app`
    pub subject_type: String,
    /// User subject or client id
    pub subject_id: String,
    pub relation: String,
    pub object_type: String,
    pub object_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    #[serde(default)]
    pub permitted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckResponse {
    /// Best description of a failure: `message`, then `error`
    pub fn reason(&self) -> String {
        self.message
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or_default()
    }
}
