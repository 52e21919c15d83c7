//! # JWT Verification
//!
//! HS256 bearer tokens signed with a shared secret.
//!
//! - Stateless validation (no lookup)
//! - Signature and expiry are always checked
//! - Issuer and audience are checked when configured

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::config::TokenConfig;
use super::errors::{AuthError, AuthResult};

/// Decoded token claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Expiration timestamp (Unix epoch seconds)
    pub exp: i64,

    /// Issued at timestamp (Unix epoch seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Every other claim, including `iss` and `aud`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    pub fn new(sub: impl Into<String>, exp: DateTime<Utc>) -> Self {
        Self {
            sub: sub.into(),
            exp: exp.timestamp(),
            iat: Some(Utc::now().timestamp()),
            extra: Map::new(),
        }
    }

    pub fn with_claim(mut self, name: impl Into<String>, value: Value) -> Self {
        self.extra.insert(name.into(), value);
        self
    }
}

/// Identity attached to a request after verification
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub subject: String,
    pub expires_at: DateTime<Utc>,
    /// Full decoded payload, or its validated form when an identity
    /// schema is in use
    pub payload: Value,
}

impl Identity {
    /// Builds an identity from verified claims
    pub fn from_claims(claims: &Claims) -> AuthResult<Self> {
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or(AuthError::MalformedToken)?;
        let payload = serde_json::to_value(claims).map_err(|_| AuthError::MalformedToken)?;

        Ok(Self {
            subject: claims.sub.clone(),
            expires_at,
            payload,
        })
    }

    /// Looks up a single claim in the payload
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }
}

/// Verifies (and, for tooling, signs) bearer tokens
#[derive(Clone)]
pub struct JwtVerifier {
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    /// Create a verifier from explicit configuration
    pub fn new(config: TokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_secs;
        match &config.issuer {
            Some(issuer) => validation.set_issuer(&[issuer]),
            None => validation.iss = None,
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self {
            config,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Validate a token and extract its claims
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => AuthError::WrongAudience,
                _ => AuthError::MalformedToken,
            }
        })?;

        Ok(data.claims)
    }

    /// Sign claims with the configured secret, filling in issuer and
    /// audience when configured
    pub fn sign(&self, claims: &Claims) -> AuthResult<String> {
        let mut claims = claims.clone();
        if let Some(issuer) = &self.config.issuer {
            claims
                .extra
                .entry("iss")
                .or_insert_with(|| Value::String(issuer.clone()));
        }
        if let Some(audience) = &self.config.audience {
            claims
                .extra
                .entry("aud")
                .or_insert_with(|| Value::String(audience.clone()));
        }

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AuthError::TokenGenerationFailed)
    }
}
