//! JWT token generation and validation
//! Stateless bearer tokens carrying identity plus a snapshot of authorities

use crate::{config::AppConfig, error::AppError};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Separator used for the `authorities` claim
pub const AUTHORITY_SEPARATOR: char = ',';

/// Minimum HS256 secret length in bytes
const MIN_SECRET_LEN: usize = 32;

/// JWT claims as they travel on the wire
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Issuer
    pub iss: String,

    /// Subject (username)
    pub sub: String,

    /// Authorities joined by `,`
    pub authorities: String,

    /// Issued at
    pub iat: i64,

    /// Not before
    pub nbf: i64,

    /// Expiration
    pub exp: i64,

    /// JWT ID (unique token identifier)
    pub jti: String,
}

/// Verified token contents handed to the request gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedClaims {
    pub subject: String,
    pub authorities: BTreeSet<String>,
    pub token_id: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl From<Claims> for DecodedClaims {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
            authorities: split_authorities(&claims.authorities),
            token_id: claims.jti,
            issued_at: claims.iat,
            expires_at: claims.exp,
        }
    }
}

/// Join an authority set into the claim representation
pub fn join_authorities(authorities: &BTreeSet<String>) -> String {
    authorities
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(&AUTHORITY_SEPARATOR.to_string())
}

/// Whether `authority` survives the join/split round trip unchanged:
/// non-empty, no separator, no surrounding whitespace
pub fn is_encodable_authority(authority: &str) -> bool {
    !authority.is_empty()
        && authority.trim() == authority
        && !authority.contains(AUTHORITY_SEPARATOR)
}

/// Split the claim representation back into a set, dropping empty entries
pub fn split_authorities(raw: &str) -> BTreeSet<String> {
    raw.split(AUTHORITY_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// JWT service
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl_secs: u64,
}

impl JwtService {
    /// Create JWT service from raw parts
    pub fn new(secret: &str, issuer: impl Into<String>, ttl_secs: u64) -> Result<Self, AppError> {
        // Ensure secret is at least 32 bytes for HS256
        if secret.len() < MIN_SECRET_LEN {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }

        let issuer = issuer.into();
        if issuer.trim().is_empty() {
            return Err(AppError::Config("JWT issuer must not be empty".to_string()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            ttl_secs,
        })
    }

    /// Create JWT service from config
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(
            config.security.jwt_secret.expose_secret(),
            config.security.jwt_issuer.clone(),
            config.security.token_ttl_secs,
        )
    }

    /// Issue a token for `subject` that is valid from now
    pub fn issue(&self, subject: &str, authorities: &BTreeSet<String>) -> Result<String, AppError> {
        self.issue_at(subject, authorities, Utc::now())
    }

    /// Issue a token with an explicit issuance instant
    pub fn issue_at(
        &self,
        subject: &str,
        authorities: &BTreeSet<String>,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AppError> {
        if let Some(bad) = authorities.iter().find(|a| !is_encodable_authority(a)) {
            tracing::error!(subject = %subject, authority = %bad, "Refusing to encode authority");
            return Err(AppError::Internal(format!(
                "authority '{}' cannot be encoded in a token",
                bad
            )));
        }

        let expiration = issued_at + Duration::seconds(self.ttl_secs as i64);

        let claims = Claims {
            iss: self.issuer.clone(),
            sub: subject.to_string(),
            authorities: join_authorities(authorities),
            iat: issued_at.timestamp(),
            nbf: issued_at.timestamp(),
            exp: expiration.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode token: {:?}", e);
            AppError::Internal(format!("Failed to encode token: {}", e))
        })
    }

    /// Verify a token against the configured issuer
    pub fn verify(&self, token: &str) -> Result<DecodedClaims, AppError> {
        self.verify_for_issuer(token, &self.issuer)
    }

    /// Verify signature, issuer and the nbf/exp window (no leeway)
    pub fn verify_for_issuer(
        &self,
        token: &str,
        expected_issuer: &str,
    ) -> Result<DecodedClaims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[expected_issuer]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "sub"]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!("Token validation failed: {:?}", e);
            AppError::InvalidToken(e.to_string())
        })?;

        Ok(data.claims.into())
    }
}
