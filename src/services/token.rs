//! Access and refresh token handling.
//!
//! Access tokens are short-lived HS256 JWTs carrying identity and role
//! claims. Refresh tokens are opaque random strings stored on the user
//! row; they are rotated on every refresh.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::JwtConfig;

/// Errors specific to token handling.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username.
    pub sub: String,

    pub email: String,

    /// Unique token id.
    pub jti: String,

    #[serde(default)]
    pub roles: Vec<String>,

    pub iss: String,

    pub aud: String,

    /// Expiry as a UTC timestamp.
    pub exp: i64,
}

/// A signed access token plus the expiry baked into it.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct TokenService {
    config: JwtConfig,
}

impl TokenService {
    #[must_use]
    pub const fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    pub fn generate_access_token(
        &self,
        username: &str,
        email: &str,
        jti: &str,
        roles: Vec<String>,
    ) -> Result<IssuedToken, TokenError> {
        let expires_at = Utc::now() + Duration::minutes(self.config.access_token_validity_minutes);

        let claims = Claims {
            sub: username.to_string(),
            email: email.to_string(),
            jti: jti.to_string(),
            roles,
            iss: self.config.valid_issuer.clone(),
            aud: self.config.valid_audience.clone(),
            exp: expires_at.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_bytes()),
        )?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Opaque refresh token: 32 random bytes as a 64-char hex string.
    #[must_use]
    pub fn generate_refresh_token() -> String {
        use rand::Rng;

        let mut rng = rand::rng();
        let bytes: [u8; 32] = rng.random();

        bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
            use std::fmt::Write;
            let _ = write!(acc, "{b:02x}");
            acc
        })
    }

    /// Full validation for authenticating requests: signature, issuer,
    /// audience and lifetime, with zero clock-skew leeway.
    pub fn decode_token(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key(), &self.validation(true))?;

        Ok(data.claims)
    }

    /// Decode an access token WITHOUT checking its lifetime. Signature,
    /// issuer and audience are still enforced. Used by the refresh flow
    /// to recover the identity claimed by an expired token.
    pub fn decode_expired_token(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key(), &self.validation(false))?;

        Ok(data.claims)
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.config.secret.as_bytes())
    }

    fn validation(&self, validate_lifetime: bool) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = validate_lifetime;
        validation.set_issuer(&[&self.config.valid_issuer]);
        validation.set_audience(&[&self.config.valid_audience]);
        validation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> TokenService {
        TokenService::new(JwtConfig {
            secret: "unit-test-secret".to_string(),
            valid_issuer: "http://issuer".to_string(),
            valid_audience: "http://audience".to_string(),
            access_token_validity_minutes: 30,
            refresh_token_validity_minutes: 1440,
        })
    }

    #[test]
    fn access_token_round_trips_claims() {
        let service = test_service();
        let issued = service
            .generate_access_token(
                "alice",
                "alice@example.com",
                "jti-1",
                vec!["ADMIN".to_string()],
            )
            .unwrap();

        let claims = service.decode_token(&issued.token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.jti, "jti-1");
        assert_eq!(claims.roles, vec!["ADMIN".to_string()]);
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn expired_token_fails_full_validation_but_decodes_for_refresh() {
        let service = test_service();

        let claims = Claims {
            sub: "alice".to_string(),
            email: "alice@example.com".to_string(),
            jti: "jti-2".to_string(),
            roles: vec![],
            iss: "http://issuer".to_string(),
            aud: "http://audience".to_string(),
            exp: (Utc::now() - Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("unit-test-secret".as_bytes()),
        )
        .unwrap();

        assert!(service.decode_token(&token).is_err());

        let recovered = service.decode_expired_token(&token).unwrap();
        assert_eq!(recovered.sub, "alice");
    }

    #[test]
    fn wrong_issuer_is_rejected_even_without_lifetime_check() {
        let service = test_service();

        let claims = Claims {
            sub: "alice".to_string(),
            email: "alice@example.com".to_string(),
            jti: "jti-3".to_string(),
            roles: vec![],
            iss: "http://someone-else".to_string(),
            aud: "http://audience".to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("unit-test-secret".as_bytes()),
        )
        .unwrap();

        assert!(service.decode_expired_token(&token).is_err());
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let service = test_service();
        let issued = service
            .generate_access_token("alice", "alice@example.com", "jti-4", vec![])
            .unwrap();

        let mut tampered = issued.token.clone();
        tampered.pop();
        tampered.push('x');

        assert!(service.decode_expired_token(&tampered).is_err());
    }

    #[test]
    fn refresh_tokens_are_unique_hex() {
        let first = TokenService::generate_refresh_token();
        let second = TokenService::generate_refresh_token();

        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, second);
    }
}
