//! Access and refresh token issuing
//!
//! HS256-signed JWTs carrying the user identifier. Access and refresh
//! tokens share the signing key but carry a `token_use` claim so one can
//! never be replayed as the other.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthSettings;

const TOKEN_USE_ACCESS: &str = "access";
const TOKEN_USE_REFRESH: &str = "refresh";

/// Token issuing and validation errors
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Token is not valid for this use")]
    WrongTokenUse,
    #[error("JWT secret must not be empty")]
    EmptySecret,
}

/// Signed claims carried by both token kinds
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub token_use: String,
}

/// Freshly issued access/refresh pair
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues and validates token pairs for authenticated users
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(settings: &AuthSettings) -> Result<Self, TokenError> {
        if settings.jwt_secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }

        Ok(TokenIssuer {
            encoding: EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
            access_ttl: Duration::minutes(settings.access_token_minutes),
            refresh_ttl: Duration::days(settings.refresh_token_days),
        })
    }

    /// Issue a fresh access/refresh pair for a user
    pub fn issue_pair(&self, user_id: &str) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue(user_id, TOKEN_USE_ACCESS, self.access_ttl)?,
            refresh_token: self.issue(user_id, TOKEN_USE_REFRESH, self.refresh_ttl)?,
        })
    }

    /// Validate an access token and return the user identifier
    pub fn verify_access(&self, token: &str) -> Result<String, TokenError> {
        self.decode_use(token, TOKEN_USE_ACCESS)
    }

    /// Validate a refresh token and return the user identifier
    pub fn verify_refresh(&self, token: &str) -> Result<String, TokenError> {
        self.decode_use(token, TOKEN_USE_REFRESH)
    }

    fn issue(&self, user_id: &str, token_use: &str, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            token_use: token_use.to_string(),
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding,
        )?)
    }

    fn decode_use(&self, token: &str, expected_use: &str) -> Result<String, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding, &validation)?;

        if data.claims.token_use != expected_use {
            return Err(TokenError::WrongTokenUse);
        }

        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&AuthSettings {
            jwt_secret: "test-secret-at-least-this-long".to_string(),
            access_token_minutes: 15,
            refresh_token_days: 7,
        })
        .unwrap()
    }

    #[test]
    fn empty_secret_is_rejected() {
        let err = TokenIssuer::new(&AuthSettings {
            jwt_secret: String::new(),
            access_token_minutes: 15,
            refresh_token_days: 7,
        })
        .unwrap_err();
        assert!(matches!(err, TokenError::EmptySecret));
    }

    #[test]
    fn pair_round_trips_user_id() {
        let issuer = issuer();
        let pair = issuer.issue_pair("alice").unwrap();

        assert!(!pair.access_token.is_empty());
        assert!(!pair.refresh_token.is_empty());
        assert_eq!(issuer.verify_access(&pair.access_token).unwrap(), "alice");
        assert_eq!(issuer.verify_refresh(&pair.refresh_token).unwrap(), "alice");
    }

    #[test]
    fn access_token_is_not_a_refresh_token() {
        let issuer = issuer();
        let pair = issuer.issue_pair("alice").unwrap();

        assert!(matches!(
            issuer.verify_refresh(&pair.access_token),
            Err(TokenError::WrongTokenUse)
        ));
        assert!(matches!(
            issuer.verify_access(&pair.refresh_token),
            Err(TokenError::WrongTokenUse)
        ));
    }

    #[test]
    fn tampered_token_fails_validation() {
        let issuer = issuer();
        let pair = issuer.issue_pair("alice").unwrap();

        let mut tampered = pair.refresh_token.clone();
        tampered.pop();
        tampered.push('x');
        assert!(matches!(
            issuer.verify_refresh(&tampered),
            Err(TokenError::Jwt(_))
        ));
    }

    #[test]
    fn foreign_signature_fails_validation() {
        let pair = issuer().issue_pair("alice").unwrap();

        let other = TokenIssuer::new(&AuthSettings {
            jwt_secret: "a-different-secret-entirely".to_string(),
            access_token_minutes: 15,
            refresh_token_days: 7,
        })
        .unwrap();
        assert!(other.verify_refresh(&pair.refresh_token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        // Negative lifetime puts exp well past the default validation leeway.
        let issuer = TokenIssuer::new(&AuthSettings {
            jwt_secret: "test-secret-at-least-this-long".to_string(),
            access_token_minutes: -10,
            refresh_token_days: 7,
        })
        .unwrap();

        let pair = issuer.issue_pair("alice").unwrap();
        assert!(issuer.verify_access(&pair.access_token).is_err());
    }

    #[test]
    fn token_pair_serializes_camel_case() {
        let pair = issuer().issue_pair("alice").unwrap();
        let json = serde_json::to_value(&pair).unwrap();
        assert!(json.get("accessToken").is_some());
        assert!(json.get("refreshToken").is_some());
    }
}
