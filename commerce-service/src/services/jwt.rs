use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::JwtConfig;

/// Claim keys owned by the token service. Caller-supplied claims may not
/// shadow them.
const RESERVED_CLAIMS: [&str; 3] = ["sub", "iat", "exp"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
    #[error("claim key collides with reserved field: {0}")]
    ReservedClaim(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        }
    }
}

/// Decoded access-token payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Issues and verifies signed, time-bounded bearer tokens. Pure computation:
/// validity is determined by signature and expiry alone, never by a store.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    access_expires_minutes: i64,
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Result<Self, anyhow::Error> {
        let algorithm: Algorithm = config
            .algorithm
            .parse()
            .map_err(|_| anyhow::anyhow!("Unsupported JWT algorithm: {}", config.algorithm))?;

        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(anyhow::anyhow!(
                "JWT algorithm {} requires key material this service does not load; use an HMAC variant",
                config.algorithm
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            algorithm,
            access_expires_minutes: config.access_expires_minutes,
        })
    }

    /// Issue a token for `subject`, merging `claims` into the payload.
    /// Claim keys colliding with `sub`/`iat`/`exp` are rejected.
    pub fn issue(&self, subject: &str, claims: &Map<String, Value>) -> Result<String, TokenError> {
        for key in claims.keys() {
            if RESERVED_CLAIMS.contains(&key.as_str()) {
                return Err(TokenError::ReservedClaim(key.clone()));
            }
        }

        let now = Utc::now();
        let exp = now + Duration::minutes(self.access_expires_minutes);

        let mut payload = Map::new();
        payload.insert("sub".to_string(), Value::String(subject.to_string()));
        payload.insert("iat".to_string(), Value::from(now.timestamp()));
        payload.insert("exp".to_string(), Value::from(exp.timestamp()));
        for (key, value) in claims {
            payload.insert(key.clone(), value.clone());
        }

        let token = encode(
            &Header::new(self.algorithm),
            &Value::Object(payload),
            &self.encoding_key,
        )?;

        Ok(token)
    }

    /// Verify signature and expiry, returning the decoded claims.
    pub fn verify(&self, token: &str) -> Result<AccessTokenClaims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;

        let token_data = decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)?;

        Ok(token_data.claims)
    }

    pub fn access_expires_minutes(&self) -> i64 {
        self.access_expires_minutes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str, algorithm: &str, minutes: i64) -> TokenService {
        TokenService::new(&JwtConfig {
            secret: secret.to_string(),
            algorithm: algorithm.to_string(),
            access_expires_minutes: minutes,
        })
        .expect("Failed to create token service")
    }

    fn claims_for(email: &str, role: &str) -> Map<String, Value> {
        let mut claims = Map::new();
        claims.insert("email".to_string(), Value::String(email.to_string()));
        claims.insert("role".to_string(), Value::String(role.to_string()));
        claims
    }

    #[test]
    fn issue_then_verify_roundtrips_subject_and_claims() {
        let tokens = service("test-secret", "HS256", 60);

        let token = tokens
            .issue("user-123", &claims_for("test@example.com", "customer"))
            .expect("Failed to issue token");

        let claims = tokens.verify(&token).expect("Failed to verify token");
        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.email.as_deref(), Some("test@example.com"));
        assert_eq!(claims.role.as_deref(), Some("customer"));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn verify_rejects_expired_token() {
        // Negative TTL puts exp well behind the validation leeway.
        let tokens = service("test-secret", "HS256", -10);

        let token = tokens
            .issue("user-123", &Map::new())
            .expect("Failed to issue token");

        assert_eq!(tokens.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn verify_rejects_token_signed_with_different_secret() {
        let issuer = service("secret-a", "HS256", 60);
        let verifier = service("secret-b", "HS256", 60);

        let token = issuer
            .issue("user-123", &Map::new())
            .expect("Failed to issue token");

        assert_eq!(verifier.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn verify_rejects_algorithm_mismatch() {
        let issuer = service("test-secret", "HS256", 60);
        let verifier = service("test-secret", "HS384", 60);

        let token = issuer
            .issue("user-123", &Map::new())
            .expect("Failed to issue token");

        assert_eq!(verifier.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn verify_rejects_malformed_token() {
        let tokens = service("test-secret", "HS256", 60);
        assert_eq!(tokens.verify("not-a-jwt"), Err(TokenError::Invalid));
    }

    #[test]
    fn issue_rejects_reserved_claim_keys() {
        let tokens = service("test-secret", "HS256", 60);

        for reserved in ["sub", "iat", "exp"] {
            let mut claims = Map::new();
            claims.insert(reserved.to_string(), Value::String("forged".to_string()));
            assert_eq!(
                tokens.issue("user-123", &claims),
                Err(TokenError::ReservedClaim(reserved.to_string()))
            );
        }
    }

    #[test]
    fn new_rejects_non_hmac_algorithm() {
        let result = TokenService::new(&JwtConfig {
            secret: "test-secret".to_string(),
            algorithm: "RS256".to_string(),
            access_expires_minutes: 60,
        });
        assert!(result.is_err());
    }
}
