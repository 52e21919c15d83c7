//! Token verification configuration
//!
//! Loaded once at startup and handed to [`JwtVerifier`](super::JwtVerifier)
//! explicitly.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Shared-secret token configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// HMAC secret (256-bit minimum recommended)
    pub secret: String,

    /// Required `iss` claim, when set
    #[serde(default)]
    pub issuer: Option<String>,

    /// Required `aud` claim, when set
    #[serde(default)]
    pub audience: Option<String>,

    /// Clock skew tolerated on `exp` (default: 60)
    #[serde(default = "default_leeway_secs")]
    pub leeway_secs: u64,
}

fn default_leeway_secs() -> u64 {
    60
}

impl TokenConfig {
    /// Config with the given secret and no issuer/audience requirement
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: None,
            audience: None,
            leeway_secs: default_leeway_secs(),
        }
    }

    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn leeway_secs(mut self, secs: u64) -> Self {
        self.leeway_secs = secs;
        self
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}
