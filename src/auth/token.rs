//! HMAC-SHA256 session tokens: a base64url payload of `user_id.expires_at`
//! plus an HMAC tag, constant-time compared on verification. Grounded in
//! the teacher's `security::cloaking` HMAC usage and its `hmac`/`sha2`
//! dependencies; the library-provided token flow from the original is not
//! ported (resolved Open Question, C11).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub user_id: String,
    pub expires_at: i64,
}

fn sign(payload_b64: &str, secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts a key of any size");
    mac.update(payload_b64.as_bytes());
    URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
}

/// Produce a time-bounded opaque token for `user_id`.
pub fn issue(user_id: &str, secret: &str, lifetime_seconds: u64) -> String {
    let expires_at = Utc::now().timestamp() + lifetime_seconds as i64;
    let payload_raw = format!("{user_id}.{expires_at}");
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload_raw.as_bytes());
    let tag = sign(&payload_b64, secret);
    format!("{payload_b64}.{tag}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Malformed,
    BadSignature,
    Expired,
}

/// Validate `token` against `secret`, rejecting missing, malformed,
/// tampered, or expired tokens.
pub fn validate(token: &str, secret: &str) -> Result<SessionClaims, TokenError> {
    let (payload_b64, tag) = token.split_once('.').ok_or(TokenError::Malformed)?;

    let expected_tag = sign(payload_b64, secret);
    if expected_tag.as_bytes().ct_eq(tag.as_bytes()).unwrap_u8() != 1 {
        return Err(TokenError::BadSignature);
    }

    let payload_raw = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| TokenError::Malformed)?;
    let payload_str = String::from_utf8(payload_raw).map_err(|_| TokenError::Malformed)?;
    let (user_id, expires_at) = payload_str.rsplit_once('.').ok_or(TokenError::Malformed)?;
    let expires_at: i64 = expires_at.parse().map_err(|_| TokenError::Malformed)?;

    if expires_at < Utc::now().timestamp() {
        return Err(TokenError::Expired);
    }

    Ok(SessionClaims {
        user_id: user_id.to_string(),
        expires_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn issued_token_validates_with_the_same_secret() {
        let token = issue("hero", SECRET, 3600);
        let claims = validate(&token, SECRET).unwrap();
        assert_eq!(claims.user_id, "hero");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue("hero", SECRET, 3600);
        assert_eq!(validate(&token, "other-secret").unwrap_err(), TokenError::BadSignature);
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue("hero", SECRET, 0);
        std::thread::sleep(std::time::Duration::from_millis(1100));
        assert_eq!(validate(&token, SECRET).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn malformed_token_is_rejected() {
        assert_eq!(validate("not-a-token", SECRET).unwrap_err(), TokenError::Malformed);
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let token = issue("hero", SECRET, 3600);
        let (_, tag) = token.split_once('.').unwrap();
        let forged = format!("{}.{tag}", URL_SAFE_NO_PAD.encode(b"villain.9999999999"));
        assert_eq!(validate(&forged, SECRET).unwrap_err(), TokenError::BadSignature);
    }
}
