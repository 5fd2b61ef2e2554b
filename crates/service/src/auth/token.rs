//! Verification tokens (signed JWT) and opaque access-token keys.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};

use super::errors::AuthError;

/// Purpose tag carried by tokens mailed at sign-up.
pub const EMAIL_CONFIRMATION: &str = "email_confirmation";

/// Bytes of entropy in an access-token key; the key is their hex encoding.
const ACCESS_KEY_BYTES: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationClaims {
    /// Username of the account to confirm.
    pub user: String,
    pub exp: i64,
    #[serde(rename = "type")]
    pub token_type: String,
}

pub fn issue_verification_token(username: &str, secret: &str, ttl: Duration) -> Result<String, AuthError> {
    let claims = VerificationClaims {
        user: username.to_string(),
        exp: (Utc::now() + ttl).timestamp(),
        token_type: EMAIL_CONFIRMATION.to_string(),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AuthError::TokenError(e.to_string()))
}

/// Check signature, expiry and purpose of a verification token.
pub fn decode_verification_token(token: &str, secret: &str) -> Result<VerificationClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    // Expired means expired: no grace period past `exp`.
    validation.leeway = 0;
    let data = decode::<VerificationClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::InvalidToken("Verification link has expired.".into()),
            _ => AuthError::InvalidToken("Invalid token".into()),
        })?;
    if data.claims.token_type != EMAIL_CONFIRMATION {
        return Err(AuthError::InvalidToken("Invalid token".into()));
    }
    Ok(data.claims)
}

/// Fresh 40-character lowercase hex key for an access token.
pub fn generate_access_key() -> String {
    let mut bytes = [0u8; ACCESS_KEY_BYTES];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_token_round_trip() {
        let token = issue_verification_token("pablo", "secret", Duration::days(3)).unwrap();
        let claims = decode_verification_token(&token, "secret").unwrap();
        assert_eq!(claims.user, "pablo");
        assert_eq!(claims.token_type, EMAIL_CONFIRMATION);
        let expected = (Utc::now() + Duration::days(3)).timestamp();
        assert!((claims.exp - expected).abs() <= 5);
    }

    #[test]
    fn expired_token_rejected() {
        let token = issue_verification_token("pablo", "secret", Duration::days(-1)).unwrap();
        match decode_verification_token(&token, "secret") {
            Err(AuthError::InvalidToken(msg)) => assert_eq!(msg, "Verification link has expired."),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn recently_expired_token_rejected() {
        let token = issue_verification_token("pablo", "secret", Duration::seconds(-30)).unwrap();
        match decode_verification_token(&token, "secret") {
            Err(AuthError::InvalidToken(msg)) => assert_eq!(msg, "Verification link has expired."),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn foreign_secret_rejected() {
        let token = issue_verification_token("pablo", "secret", Duration::days(3)).unwrap();
        match decode_verification_token(&token, "other-secret") {
            Err(AuthError::InvalidToken(msg)) => assert_eq!(msg, "Invalid token"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn wrong_purpose_rejected() {
        let claims = VerificationClaims {
            user: "pablo".into(),
            exp: (Utc::now() + Duration::days(1)).timestamp(),
            token_type: "password_reset".into(),
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"secret")).unwrap();
        assert!(matches!(decode_verification_token(&token, "secret"), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn garbage_rejected() {
        assert!(matches!(decode_verification_token("not.a.jwt", "secret"), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn access_keys_are_hex_and_distinct() {
        let a = generate_access_key();
        let b = generate_access_key();
        assert_eq!(a.len(), 40);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(a, b);
    }
}
