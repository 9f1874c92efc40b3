//! # aegis-authz
//!
//! Client for the relationship-check protocol: "does this subject hold
//! `relation` on (`object_type`, `object_id`)?".
//!
//! Each check is authenticated with a fresh client access token minted by an
//! [`aegis_tokens::Issuer`] for the service that received the token being
//! checked. A rejected credential ([`AuthzError::CatRejected`]) is reported
//! apart from a denied permission (`Ok(false)`).

pub mod config;
pub mod errors;
pub mod types;

mod checker;


pub use checker::Checker;
pub use config::CheckerConfig;
pub use errors::*;
pub use types::*;
