//! # Auth Errors
//!
//! Failures of bearer-token verification. Every variant short-circuits
//! the request as unauthorized.

use thiserror::Error;

use crate::validation::ValidationError;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Token verification errors
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // ==================
    // Header Errors
    // ==================

    /// No `Authorization` header on the request
    #[error("Missing bearer credential")]
    MissingCredential,

    /// Header present but not `Bearer <token>`
    #[error("Malformed authorization header")]
    MalformedHeader,

    // ==================
    // JWT Errors
    // ==================

    /// Token could not be decoded
    #[error("Malformed token")]
    MalformedToken,

    /// Token has expired
    #[error("Token expired")]
    TokenExpired,

    /// Signature does not match the shared secret
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Issuer or audience claim does not match configuration
    #[error("Token not issued for this service")]
    WrongAudience,

    // ==================
    // Identity Errors
    // ==================

    /// Decoded payload failed the identity schema
    #[error("Token payload rejected: {0}")]
    IdentityRejected(ValidationError),

    // ==================
    // Internal Errors
    // ==================

    /// Token signing failed
    #[error("Internal error: token generation failed")]
    TokenGenerationFailed,
}

impl AuthError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::TokenGenerationFailed => 500,
            _ => 401,
        }
    }

    /// Stable code for response bodies and logs
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "MISSING_CREDENTIAL",
            AuthError::MalformedHeader => "MALFORMED_HEADER",
            AuthError::MalformedToken => "MALFORMED_TOKEN",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::InvalidSignature => "INVALID_SIGNATURE",
            AuthError::WrongAudience => "WRONG_AUDIENCE",
            AuthError::IdentityRejected(_) => "IDENTITY_REJECTED",
            AuthError::TokenGenerationFailed => "TOKEN_GENERATION_FAILED",
        }
    }

    /// Returns whether this error is the caller's fault
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_failures_are_unauthorized() {
        assert_eq!(AuthError::MissingCredential.status_code(), 401);
        assert_eq!(AuthError::TokenExpired.status_code(), 401);
        assert_eq!(AuthError::InvalidSignature.status_code(), 401);
        assert_eq!(AuthError::TokenGenerationFailed.status_code(), 500);
    }

    #[test]
    fn test_error_messages_do_not_leak_token() {
        let err = AuthError::InvalidSignature;
        assert!(!err.to_string().contains("secret"));
        assert!(err.is_client_error());
    }
}
