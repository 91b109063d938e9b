use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by the backend's access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map(|exp| exp <= now).unwrap_or(false)
    }
}

/// Read the claims without verifying the signature.
///
/// The client never holds the signing secret. The result is informational only;
/// the server stays the authority on whether a token is accepted.
pub fn peek_claims(token: &str) -> Option<TokenClaims> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    #[test]
    fn test_peek_claims_ignores_signature() {
        let claims = TokenClaims {
            sub: Some("alice".to_string()),
            exp: Some(1_900_000_000),
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"server-secret")).unwrap();

        let peeked = peek_claims(&token).unwrap();
        assert_eq!(peeked, claims);
        assert_eq!(peeked.expires_at().unwrap().timestamp(), 1_900_000_000);
    }

    #[test]
    fn test_expiry_check() {
        let claims = TokenClaims { sub: None, exp: Some(1_000) };
        assert!(claims.is_expired_at(Utc.timestamp_opt(2_000, 0).unwrap()));
        assert!(!claims.is_expired_at(Utc.timestamp_opt(500, 0).unwrap()));
    }

    #[test]
    fn test_opaque_token_has_no_claims() {
        assert_eq!(peek_claims("T1"), None);
    }
}
