//! PASETO v4 `public` and `local` protocols over [`pasetors`].
//!
//! Tokens look like `v4.<purpose>.<payload>[.<footer>]`, every segment after
//! the header base64url encoded without padding. The footer is authenticated
//! but not encrypted. Implicit assertions are always empty, and payloads are
//! UTF-8 (JSON in practice) as PASETO requires.

use crate::{constants::*, errors::*, keys::*};
use ed25519_dalek::VerifyingKey;
use pasetors::{
    errors::Error as PasetoError,
    keys::{AsymmetricPublicKey, AsymmetricSecretKey, SymmetricKey as LocalKey},
    token::UntrustedToken,
    version4::{LocalToken, PublicToken, V4},
    Local, Public,
};
use zeroize::Zeroizing;

/// Header of asymmetric signed tokens
pub const V4_PUBLIC: &str = "v4.public.";

/// Header of symmetric encrypted tokens
pub const V4_LOCAL: &str = "v4.local.";

/// Decoded segments of a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenParts {
    /// Signed message of a public token, or ciphertext (without nonce and tag)
    /// of a local token
    pub body: Vec<u8>,
    /// Decoded footer segment (empty when absent)
    pub footer: Vec<u8>,
}

/// Split a token carrying `header` into its decoded body and footer.
///
/// Nothing is verified; use only to pick key material.
pub fn split(token: &str, header: &str) -> Result<TokenParts> {
    match header {
        V4_PUBLIC => {
            let untrusted = UntrustedToken::<Public, V4>::try_from(token).map_err(malformed)?;
            Ok(TokenParts {
                body: untrusted.untrusted_payload().to_vec(),
                footer: untrusted.untrusted_footer().to_vec(),
            })
        }
        V4_LOCAL => {
            let untrusted = UntrustedToken::<Local, V4>::try_from(token).map_err(malformed)?;
            Ok(TokenParts {
                body: untrusted.untrusted_payload().to_vec(),
                footer: untrusted.untrusted_footer().to_vec(),
            })
        }
        other => Err(CryptoError::InvalidToken(format!(
            "unsupported header {other:?}"
        ))),
    }
}

/// Sign `message` as a `v4.public` token
pub fn sign(key_pair: &SigningKeyPair, message: &[u8], footer: &[u8]) -> Result<String> {
    let keypair_bytes = Zeroizing::new(key_pair.private_key().to_keypair_bytes());
    let secret = AsymmetricSecretKey::<V4>::from(&keypair_bytes[..]).map_err(|_| {
        CryptoError::InvalidKeyFormat {
            expected: 2 * DERIVED_KEY_SIZE,
            actual: keypair_bytes.len(),
        }
    })?;

    PublicToken::sign(&secret, message, Some(footer), None).map_err(malformed)
}

/// Verify a `v4.public` token and return its message.
///
/// The footer found in the token is the one authenticated.
pub fn verify(public_key: &VerifyingKey, token: &str) -> Result<Vec<u8>> {
    let untrusted = UntrustedToken::<Public, V4>::try_from(token).map_err(malformed)?;
    let public = AsymmetricPublicKey::<V4>::from(public_key.as_bytes()).map_err(|_| {
        CryptoError::InvalidKeyFormat {
            expected: PUBLIC_KEY_SIZE,
            actual: public_key.as_bytes().len(),
        }
    })?;

    let trusted = PublicToken::verify(&public, &untrusted, None, None).map_err(|e| match e {
        PasetoError::TokenValidation => CryptoError::SignatureVerificationFailed,
        other => malformed(other),
    })?;
    Ok(trusted.payload().as_bytes().to_vec())
}

/// Encrypt `message` as a `v4.local` token with a fresh random nonce
pub fn encrypt(key: &SymmetricKey, message: &[u8], footer: &[u8]) -> Result<String> {
    LocalToken::encrypt(&local_key(key)?, message, Some(footer), None).map_err(|e| match e {
        PasetoError::Csprng => CryptoError::RandomGenerationFailed(e.to_string()),
        other => malformed(other),
    })
}

/// Decrypt a `v4.local` token.
///
/// The tag is checked before any plaintext is produced, so a failure never
/// yields partial data.
pub fn decrypt(key: &SymmetricKey, token: &str) -> Result<Vec<u8>> {
    let untrusted = UntrustedToken::<Local, V4>::try_from(token).map_err(malformed)?;

    let trusted = LocalToken::decrypt(&local_key(key)?, &untrusted, None, None).map_err(|e| {
        match e {
            PasetoError::TokenValidation => {
                CryptoError::DecryptionFailed("authentication tag mismatch".to_string())
            }
            other => CryptoError::DecryptionFailed(other.to_string()),
        }
    })?;
    Ok(trusted.payload().as_bytes().to_vec())
}

fn local_key(key: &SymmetricKey) -> Result<LocalKey<V4>> {
    LocalKey::<V4>::from(key.as_bytes()).map_err(|_| CryptoError::InvalidKeyFormat {
        expected: SYMMETRIC_KEY_SIZE,
        actual: key.as_bytes().len(),
    })
}

fn malformed(e: PasetoError) -> CryptoError {
    CryptoError::InvalidToken(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::*;

    // Official PASETO v4 test vectors (4-E-*, 4-S-*, 4-F-*)
    const VECTOR_LOCAL_KEY: &str =
        "707172737475767778797a7b7c7d7e7f808182838485868788898a8b8c8d8e8f";
    const VECTOR_SECRET_SEED: &str =
        "b4cbfb43df4ce210727d953e4a713307fa19bb7d9f85041438d9e11b942a3774";
    const VECTOR_PUBLIC_KEY: &str =
        "1eb9dbbbbc047c03fd70604e0071f0987e16b28b757225c11f00415d0e20b1a2";
    const VECTOR_FOOTER: &str = r#"{"kid":"zVhMiPBP9fRf2snEcT7gFTioeA9COcNy9DfgL1W60haN"}"#;
    const SECRET_MESSAGE: &str =
        r#"{"data":"this is a secret message","exp":"2022-01-01T00:00:00+00:00"}"#;
    const HIDDEN_MESSAGE: &str =
        r#"{"data":"this is a hidden message","exp":"2022-01-01T00:00:00+00:00"}"#;
    const SIGNED_MESSAGE: &str =
        r#"{"data":"this is a signed message","exp":"2022-01-01T00:00:00+00:00"}"#;

    fn create_test_symmetric_key() -> SymmetricKey {
        SymmetricKey::from_bytes([0x70; 32])
    }

    fn create_vector_local_key() -> SymmetricKey {
        let bytes: [u8; 32] = hex::decode(VECTOR_LOCAL_KEY).unwrap().try_into().unwrap();
        SymmetricKey::from_bytes(bytes)
    }

    fn create_vector_key_pair() -> SigningKeyPair {
        let seed: [u8; 32] = hex::decode(VECTOR_SECRET_SEED).unwrap().try_into().unwrap();
        SigningKeyPair::from_seed(&seed)
    }

    #[test]
    fn test_local_vectors_decrypt() {
        let key = create_vector_local_key();
        let vectors = [
            (
                "4-E-1",
                "v4.local.AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAQAr68PS4AXe7If_ZgesdkUMvSwscFlAl1pk5HC0e8kApeaqMfGo_7OpBnwJOAbY9V7WU6abu74MmcUE8YWAiaArVI8XJ5hOb_4v9RmDkneN0S92dx0OW4pgy7omxgf3S8c3LlQg",
                SECRET_MESSAGE,
                "",
            ),
            (
                "4-E-2",
                "v4.local.AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAQAr68PS4AXe7If_ZgesdkUMvS2csCgglvpk5HC0e8kApeaqMfGo_7OpBnwJOAbY9V7WU6abu74MmcUE8YWAiaArVI8XIemu9chy3WVKvRBfg6t8wwYHK0ArLxxfZP73W_vfwt5A",
                HIDDEN_MESSAGE,
                "",
            ),
            (
                "4-E-3",
                "v4.local.32VIErrEkmY4JVILovbmfPXKW9wT1OdQepjMTC_MOtjA4kiqw7_tcaOM5GNEcnTxl60WkwMsYXw6FSNb_UdJPXjpzm0KW9ojM5f4O2mRvE2IcweP-PRdoHjd5-RHCiExR1IK6t6-tyebyWG6Ov7kKvBdkrrAJ837lKP3iDag2hzUPHuMKA",
                SECRET_MESSAGE,
                "",
            ),
            (
                "4-E-4",
                "v4.local.32VIErrEkmY4JVILovbmfPXKW9wT1OdQepjMTC_MOtjA4kiqw7_tcaOM5GNEcnTxl60WiA8rd3wgFSNb_UdJPXjpzm0KW9ojM5f4O2mRvE2IcweP-PRdoHjd5-RHCiExR1IK6t4gt6TiLm55vIH8c_lGxxZpE3AWlH4WTR0v45nsWoU3gQ",
                HIDDEN_MESSAGE,
                "",
            ),
            (
                "4-E-5",
                "v4.local.32VIErrEkmY4JVILovbmfPXKW9wT1OdQepjMTC_MOtjA4kiqw7_tcaOM5GNEcnTxl60WkwMsYXw6FSNb_UdJPXjpzm0KW9ojM5f4O2mRvE2IcweP-PRdoHjd5-RHCiExR1IK6t4x-RMNXtQNbz7FvFZ_G-lFpk5RG3EOrwDL6CgDqcerSQ.eyJraWQiOiJ6VmhNaVBCUDlmUmYyc25FY1Q3Z0ZUaW9lQTlDT2NOeTlEZmdMMVc2MGhhTiJ9",
                SECRET_MESSAGE,
                VECTOR_FOOTER,
            ),
            (
                "4-E-6",
                "v4.local.32VIErrEkmY4JVILovbmfPXKW9wT1OdQepjMTC_MOtjA4kiqw7_tcaOM5GNEcnTxl60WiA8rd3wgFSNb_UdJPXjpzm0KW9ojM5f4O2mRvE2IcweP-PRdoHjd5-RHCiExR1IK6t6pWSA5HX2wjb3P-xLQg5K5feUCX4P2fpVK3ZLWFbMSxQ.eyJraWQiOiJ6VmhNaVBCUDlmUmYyc25FY1Q3Z0ZUaW9lQTlDT2NOeTlEZmdMMVc2MGhhTiJ9",
                HIDDEN_MESSAGE,
                VECTOR_FOOTER,
            ),
        ];

        for (name, token, payload, footer) in vectors {
            assert_eq!(
                decrypt(&key, token).unwrap(),
                payload.as_bytes().to_vec(),
                "{name}"
            );
            assert_eq!(
                split(token, V4_LOCAL).unwrap().footer,
                footer.as_bytes().to_vec(),
                "{name}"
            );
        }
    }

    #[test]
    fn test_public_vectors_sign_and_verify() {
        let pair = create_vector_key_pair();
        assert_eq!(
            hex::encode(pair.public_key_bytes()),
            VECTOR_PUBLIC_KEY
        );

        let vectors = [
            (
                "4-S-1",
                "v4.public.eyJkYXRhIjoidGhpcyBpcyBhIHNpZ25lZCBtZXNzYWdlIiwiZXhwIjoiMjAyMi0wMS0wMVQwMDowMDowMCswMDowMCJ9bg_XBBzds8lTZShVlwwKSgeKpLT3yukTw6JUz3W4h_ExsQV-P0V54zemZDcAxFaSeef1QlXEFtkqxT1ciiQEDA",
                "",
            ),
            (
                "4-S-2",
                "v4.public.eyJkYXRhIjoidGhpcyBpcyBhIHNpZ25lZCBtZXNzYWdlIiwiZXhwIjoiMjAyMi0wMS0wMVQwMDowMDowMCswMDowMCJ9v3Jt8mx_TdM2ceTGoqwrh4yDFn0XsHvvV_D0DtwQxVrJEBMl0F2caAdgnpKlt4p7xBnx1HcO-SPo8FPp214HDw.eyJraWQiOiJ6VmhNaVBCUDlmUmYyc25FY1Q3Z0ZUaW9lQTlDT2NOeTlEZmdMMVc2MGhhTiJ9",
                VECTOR_FOOTER,
            ),
        ];

        for (name, token, footer) in vectors {
            let signed = sign(&pair, SIGNED_MESSAGE.as_bytes(), footer.as_bytes()).unwrap();
            assert_eq!(signed, token, "{name}");
            assert_eq!(
                verify(pair.public_key(), token).unwrap(),
                SIGNED_MESSAGE.as_bytes().to_vec(),
                "{name}"
            );
        }
    }

    #[test]
    fn test_failure_vectors_are_rejected() {
        let key = create_vector_local_key();
        let pair = create_vector_key_pair();

        // 4-F-1: a local token handed to public verification
        let local = "v4.local.vngXfCISbnKgiP6VWGuOSlYrFYU300fy9ijW33rznDYgxHNPwWluAY2Bgb0z54CUs6aYYkIJ-bOOOmJHPuX_34Agt_IPlNdGDpRdGNnBz2MpWJvB3cttheEc1uyCEYltj7wBQQYX.YXJiaXRyYXJ5LXN0cmluZy10aGF0LWlzbid0LWpzb24";
        assert!(matches!(
            verify(pair.public_key(), local),
            Err(CryptoError::InvalidToken(_))
        ));

        // 4-F-2: a public token handed to local decryption
        let public = "v4.public.eyJpbnZhbGlkIjoidGhpcyBzaG91bGQgbmV2ZXIgZGVjb2RlIn22Sp4gjCaUw0c7EH84ZSm_jN_Qr41MrgLNu5LIBCzUr1pn3Z-Wukg9h3ceplWigpoHaTLcwxj0NsI1vjTh67YB.eyJraWQiOiJ6VmhNaVBCUDlmUmYyc25FY1Q3Z0ZUaW9lQTlDT2NOeTlEZmdMMVc2MGhhTiJ9";
        assert!(decrypt(&key, public).is_err());

        // 4-F-3: version 3 token
        let v3 = "v3.local.23e_2PiqpQBPvRFKzB0zHhjmxK3sKo2grFZRRLM-U7L0a8uHxuF9RlVz3Ic6WmdUUWTxCaYycwWV1yM8gKbZB2JhygDMKvHQ7eBf8GtF0r3K0Q_gF1PXOxcOgztak1eD1dPe9rLVMSgR0nHJXeIGYVuVrVoLWQ.YXJiaXRyYXJ5LXN0cmluZy10aGF0LWlzbid0LWpzb24";
        assert!(decrypt(&key, v3).is_err());

        // 4-F-4: last tag byte flipped
        let tampered = "v4.local.AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAQAr68PS4AXe7If_ZgesdkUMvSwscFlAl1pk5HC0e8kApeaqMfGo_7OpBnwJOAbY9V7WU6abu74MmcUE8YWAiaArVI8XJ5hOb_4v9RmDkneN0S92dx0OW4pgy7omxgf3S8c3LlQh";
        assert!(matches!(
            decrypt(&key, tampered),
            Err(CryptoError::DecryptionFailed(_))
        ));

        // 4-F-5: padded base64
        let padded = "v4.local.32VIErrEkmY4JVILovbmfPXKW9wT1OdQepjMTC_MOtjA4kiqw7_tcaOM5GNEcnTxl60WkwMsYXw6FSNb_UdJPXjpzm0KW9ojM5f4O2mRvE2IcweP-PRdoHjd5-RHCiExR1IK6t4x-RMNXtQNbz7FvFZ_G-lFpk5RG3EOrwDL6CgDqcerSQ==.eyJraWQiOiJ6VmhNaVBCUDlmUmYyc25FY1Q3Z0ZUaW9lQTlDT2NOeTlEZmdMMVc2MGhhTiJ9";
        assert!(decrypt(&key, padded).is_err());
    }

    #[test]
    fn test_public_round_trip_with_footer() {
        let pair = SigningKeyPair::from_seed(&[3u8; 32]);
        let token = sign(&pair, br#"{"data":"x"}"#, br#"{"kid":"k"}"#).unwrap();

        assert!(token.starts_with(V4_PUBLIC));
        assert_eq!(token.split('.').count(), 4);
        assert_eq!(
            verify(pair.public_key(), &token).unwrap(),
            br#"{"data":"x"}"#.to_vec()
        );
    }

    #[test]
    fn test_public_without_footer_has_three_segments() {
        let pair = SigningKeyPair::from_seed(&[3u8; 32]);
        let token = sign(&pair, b"{}", b"").unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert!(verify(pair.public_key(), &token).is_ok());
    }

    #[test]
    fn test_public_rejects_wrong_key() {
        let pair = SigningKeyPair::from_seed(&[3u8; 32]);
        let other = SigningKeyPair::from_seed(&[4u8; 32]);
        let token = sign(&pair, b"{}", b"").unwrap();
        assert_eq!(
            verify(other.public_key(), &token),
            Err(CryptoError::SignatureVerificationFailed)
        );
    }

    #[test]
    fn test_public_footer_is_authenticated() {
        let pair = SigningKeyPair::from_seed(&[3u8; 32]);
        let token = sign(&pair, b"{}", br#"{"kid":"a"}"#).unwrap();
        let body = token.split('.').nth(2).unwrap();
        let forged = format!(
            "{V4_PUBLIC}{body}.{}",
            base64_url_encode(br#"{"kid":"b"}"#)
        );
        assert_eq!(
            verify(pair.public_key(), &forged),
            Err(CryptoError::SignatureVerificationFailed)
        );
    }

    #[test]
    fn test_public_rejects_local_header() {
        let pair = SigningKeyPair::from_seed(&[3u8; 32]);
        let token = sign(&pair, b"{}", b"").unwrap().replacen("public", "local", 1);
        assert!(matches!(
            verify(pair.public_key(), &token),
            Err(CryptoError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_sign_rejects_empty_message() {
        let pair = SigningKeyPair::from_seed(&[3u8; 32]);
        assert!(matches!(
            sign(&pair, b"", b""),
            Err(CryptoError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_local_round_trip() {
        let key = create_test_symmetric_key();
        let token = encrypt(&key, b"secret payload", br#"{"kid":"k"}"#).unwrap();

        assert!(token.starts_with(V4_LOCAL));
        assert!(!token.contains("secret"));
        assert_eq!(decrypt(&key, &token).unwrap(), b"secret payload".to_vec());
    }

    #[test]
    fn test_local_nonce_is_fresh() {
        let key = create_test_symmetric_key();
        let a = encrypt(&key, b"same", b"").unwrap();
        let b = encrypt(&key, b"same", b"").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_local_rejects_wrong_key() {
        let token = encrypt(&create_test_symmetric_key(), b"m", b"").unwrap();
        let other = SymmetricKey::from_bytes([0x71; 32]);
        assert!(matches!(
            decrypt(&other, &token),
            Err(CryptoError::DecryptionFailed(_))
        ));
    }

    #[test]
    fn test_local_rejects_tampered_ciphertext() {
        let key = create_test_symmetric_key();
        let token = encrypt(&key, b"hello world", b"").unwrap();
        let mut body = base64_url_decode(token.strip_prefix(V4_LOCAL).unwrap()).unwrap();
        body[LOCAL_NONCE_SIZE] ^= 0x01;
        let tampered = format!("{V4_LOCAL}{}", base64_url_encode(&body));

        assert!(matches!(
            decrypt(&key, &tampered),
            Err(CryptoError::DecryptionFailed(_))
        ));
    }

    #[test]
    fn test_split_strips_signature_from_public_body() {
        let pair = SigningKeyPair::from_seed(&[3u8; 32]);
        let token = sign(&pair, br#"{"a":1}"#, br#"{"kid":"k"}"#).unwrap();
        let parts = split(&token, V4_PUBLIC).unwrap();
        assert_eq!(parts.body, br#"{"a":1}"#.to_vec());
        assert_eq!(parts.footer, br#"{"kid":"k"}"#.to_vec());
    }

    #[test]
    fn test_split_rejects_malformed() {
        assert!(split("v4.public.", V4_PUBLIC).is_err());
        assert!(split("v3.public.abc", V4_PUBLIC).is_err());
        assert!(split("v4.public.abc.def.ghi", V4_PUBLIC).is_err());
        assert!(split("v4.public.@@@", V4_PUBLIC).is_err());
        assert!(split("v4.public.abc", "v2.public.").is_err());
    }
}
