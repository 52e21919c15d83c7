//! Bearer token middleware
//!
//! Reads `Authorization: Bearer <token>`, verifies it and attaches the
//! resulting identity to the request. Any failure answers 401 without
//! running the rest of the chain.

use crate::auth::{AuthError, AuthResult, Identity, JwtVerifier};
use crate::observability::{log_event_with_fields, Event};
use crate::schema::Schema;
use crate::validation::Validator;

use super::pipeline::{BoxFuture, Middleware, Next};
use super::request::{Request, Response};

const BEARER_PREFIX: &str = "Bearer ";

/// Token authentication stage
pub struct TokenAuth {
    verifier: JwtVerifier,
    /// Optional shape check over the decoded payload
    identity_schema: Option<Schema>,
    validator: Validator,
}

impl TokenAuth {
    pub fn new(verifier: JwtVerifier) -> Self {
        Self {
            verifier,
            identity_schema: None,
            validator: Validator::new(),
        }
    }

    /// Validate the decoded payload against `schema` before accepting it
    pub fn with_identity_schema(mut self, schema: Schema) -> Self {
        self.identity_schema = Some(schema);
        self
    }

    /// Validator used for the identity schema
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    /// Runs the full check for one request
    pub fn authenticate(&self, req: &Request) -> AuthResult<Identity> {
        let header = req
            .header("authorization")
            .ok_or(AuthError::MissingCredential)?;
        let token = extract_bearer(header)?;

        let claims = self.verifier.verify(token)?;
        let mut identity = Identity::from_claims(&claims)?;

        if let Some(schema) = &self.identity_schema {
            identity.payload = self
                .validator
                .parse(schema, &identity.payload)
                .map_err(AuthError::IdentityRejected)?;
        }

        Ok(identity)
    }
}

/// Strips the scheme from an authorization header value
pub fn extract_bearer(header: &str) -> AuthResult<&str> {
    let token = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::MalformedHeader)?
        .trim();
    if token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }
    Ok(token)
}

impl Middleware for TokenAuth {
    fn process<'a>(&'a self, req: &'a mut Request, next: Next<'a>) -> BoxFuture<'a> {
        Box::pin(async move {
            let request_id = req.request_id.to_string();

            match self.authenticate(req) {
                Ok(identity) => {
                    log_event_with_fields(
                        Event::AuthAccepted,
                        &[
                            ("request_id", request_id.as_str()),
                            ("subject", identity.subject.as_str()),
                        ],
                    );
                    req.identity = Some(identity);
                    next.run(req).await
                }
                Err(err) => {
                    let reason = err.to_string();
                    log_event_with_fields(
                        Event::AuthRejected,
                        &[
                            ("request_id", request_id.as_str()),
                            ("code", err.code()),
                            ("reason", reason.as_str()),
                        ],
                    );
                    rejection(&err)
                }
            }
        })
    }
}

fn rejection(err: &AuthError) -> Response {
    let mut response = Response::error(err.status_code(), err.code(), err.to_string());
    if let AuthError::IdentityRejected(validation) = err {
        if let Ok(details) = serde_json::to_value(validation) {
            response.body["details"] = details;
        }
    }
    response
}
