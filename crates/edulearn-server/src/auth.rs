use chrono::{Duration, Utc};
use edulearn_model::login::TokenPair;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::Display;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub(crate) enum AuthError {
    #[error("Token is invalid or expired")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),
    #[error("Token has the wrong type, expected {0}")]
    WrongTokenType(TokenType),
    #[error("Failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl AuthError {
    pub(crate) fn is_expired(&self) -> bool {
        matches!(self, Self::InvalidToken(error) if matches!(error.kind(), ErrorKind::ExpiredSignature))
    }
}

#[derive(Serialize, Deserialize, Display, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub(crate) enum TokenType {
    Access,
    Refresh,
}

#[derive(Serialize, Deserialize, Debug)]
pub(crate) struct Claims {
    pub sub: Uuid,
    // issued at
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
    pub token_type: TokenType,
}

/// Signs and validates the HS256 bearer tokens.
#[derive(Clone)]
pub(crate) struct TokenConfig {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("access_lifetime", &self.access_lifetime)
            .field("refresh_lifetime", &self.refresh_lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenConfig {
    pub(crate) fn new(secret: &str, access_minutes: i64, refresh_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_lifetime: Duration::minutes(access_minutes),
            refresh_lifetime: Duration::days(refresh_days),
        }
    }

    fn lifetime(&self, token_type: TokenType) -> Duration {
        match token_type {
            TokenType::Access => self.access_lifetime,
            TokenType::Refresh => self.refresh_lifetime,
        }
    }

    pub(crate) fn issue(&self, user_id: Uuid, token_type: TokenType) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + self.lifetime(token_type)).timestamp(),
            jti: Uuid::new_v4(),
            token_type,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(AuthError::Signing)
    }

    pub(crate) fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access: self.issue(user_id, TokenType::Access)?,
            refresh: self.issue(user_id, TokenType::Refresh)?,
        })
    }

    /// Checks signature and expiry, and the token type when one is expected.
    pub(crate) fn validate(&self, token: &str, expected: Option<TokenType>) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(AuthError::InvalidToken)?
            .claims;
        match expected {
            Some(expected) if expected != claims.token_type => Err(AuthError::WrongTokenType(expected)),
            _ => Ok(claims),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_validate() {
        let config = TokenConfig::new("secret", 60, 1);
        let user_id = Uuid::new_v4();
        let pair = config.issue_pair(user_id).unwrap();

        let claims = config.validate(&pair.access, Some(TokenType::Access)).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.exp - claims.iat, 3600);

        let claims = config.validate(&pair.refresh, Some(TokenType::Refresh)).unwrap();
        assert_eq!(claims.exp - claims.iat, 86400);
        assert!(config.validate(&pair.refresh, None).is_ok());
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let config = TokenConfig::new("secret", 60, 1);
        let access = config.issue(Uuid::new_v4(), TokenType::Access).unwrap();
        assert!(matches!(
            config.validate(&access, Some(TokenType::Refresh)),
            Err(AuthError::WrongTokenType(TokenType::Refresh))
        ));
        assert_eq!(TokenType::Access.to_string(), "access");
        assert_eq!(
            AuthError::WrongTokenType(TokenType::Refresh).to_string(),
            "Token has the wrong type, expected refresh"
        );
    }

    #[test]
    fn test_foreign_and_expired_tokens() {
        let config = TokenConfig::new("secret", 60, 1);
        let other = TokenConfig::new("other", 60, 1);
        let token = other.issue(Uuid::new_v4(), TokenType::Access).unwrap();
        assert!(config.validate(&token, None).is_err());
        assert!(config.validate("not a token", None).is_err());

        let expired = TokenConfig::new("secret", -5, 1);
        let token = expired.issue(Uuid::new_v4(), TokenType::Access).unwrap();
        let error = config.validate(&token, None).unwrap_err();
        assert!(error.is_expired());
    }
}
