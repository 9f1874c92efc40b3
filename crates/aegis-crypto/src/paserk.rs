//! PASERK v4 key identifiers.
//!
//! ```text
//! paserk = prefix ‖ base64url(exported_key)      e.g. "k4.public." ‖ ...
//! d      = BLAKE2b-264(header ‖ paserk)
//! id     = header ‖ base64url(d)                 e.g. "k4.pid." ‖ 44 chars
//! ```
//!
//! Ids only tag which key in a rotation set produced a token. They are never
//! a security boundary: a token still has to verify or decrypt under real key
//! material.

use crate::{keys::*, utils::base64_url_encode};
use blake2::{digest::consts::U33, Blake2b, Digest};
use ed25519_dalek::VerifyingKey;

/// Key id header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyHeader {
    /// Asymmetric public key id
    Pid,
    /// Symmetric key id
    Lid,
    /// Asymmetric secret key id
    Sid,
}

impl KeyHeader {
    /// Id prefix, e.g. `k4.pid.`
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyHeader::Pid => "k4.pid.",
            KeyHeader::Lid => "k4.lid.",
            KeyHeader::Sid => "k4.sid.",
        }
    }

    /// Prefix of the serialized key the id is computed over
    pub fn paserk_prefix(&self) -> &'static str {
        match self {
            KeyHeader::Pid => "k4.public.",
            KeyHeader::Lid => "k4.local.",
            KeyHeader::Sid => "k4.secret.",
        }
    }

    /// Header of an id string, if it carries one
    pub fn of(id: &str) -> Option<Self> {
        [KeyHeader::Pid, KeyHeader::Lid, KeyHeader::Sid]
            .into_iter()
            .find(|header| id.starts_with(header.as_str()))
    }
}

/// Compute the id of an exported key under `header`
pub fn compute_id(header: KeyHeader, exported_key: &[u8]) -> String {
    let paserk = format!("{}{}", header.paserk_prefix(), base64_url_encode(exported_key));
    let digest = Blake2b::<U33>::new()
        .chain_update(header.as_str().as_bytes())
        .chain_update(paserk.as_bytes())
        .finalize();
    format!("{}{}", header.as_str(), base64_url_encode(&digest))
}

/// `k4.pid.` id of an Ed25519 public key
pub fn pid(public_key: &VerifyingKey) -> String {
    compute_id(KeyHeader::Pid, public_key.as_bytes())
}

/// `k4.lid.` id of a symmetric key
pub fn lid(key: &SymmetricKey) -> String {
    compute_id(KeyHeader::Lid, key.as_bytes())
}

/// `k4.sid.` id of a signing key pair (exported as secret ‖ public)
pub fn sid(key_pair: &SigningKeyPair) -> String {
    let exported = zeroize::Zeroizing::new(key_pair.private_key().to_keypair_bytes());
    compute_id(KeyHeader::Sid, &exported[..])
}
