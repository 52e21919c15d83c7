//! Token Middleware Tests
//!
//! Bearer-token verification in front of a handler:
//! - Valid tokens reach the handler with the identity attached
//! - Every rejection is a 401 and the handler never runs
//! - Configuration is passed explicitly per verifier

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{Duration, Utc};
use schemaguard::auth::{Claims, JwtVerifier, TokenConfig};
use schemaguard::middleware::{FnHandler, Pipeline, Request, Response, TokenAuth};
use schemaguard::schema::Schema;
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn config() -> TokenConfig {
    TokenConfig::with_secret("integration-secret")
        .issuer("schemaguard-tests")
        .audience("profiles")
        .leeway_secs(0)
}

fn token(config: TokenConfig, sub: &str, ttl: Duration) -> String {
    JwtVerifier::new(config)
        .sign(&Claims::new(sub, Utc::now() + ttl).with_claim("scope", json!("profile:write")))
        .unwrap()
}

fn pipeline(auth: TokenAuth) -> (Pipeline, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let pipeline = Pipeline::new(FnHandler(move |req: &Request| {
        counter.fetch_add(1, Ordering::SeqCst);
        match &req.identity {
            Some(identity) => Response::ok(json!({
                "subject": identity.subject,
                "scope": identity.claim("scope"),
            })),
            None => Response::error(500, "NO_IDENTITY", "identity missing"),
        }
    }))
    .with_middleware(auth);
    (pipeline, calls)
}

// =============================================================================
// Acceptance Tests
// =============================================================================

#[tokio::test]
async fn test_valid_token_attaches_identity() {
    let (pipeline, calls) = pipeline(TokenAuth::new(JwtVerifier::new(config())));
    let req = Request::default().with_bearer(&token(config(), "user-42", Duration::minutes(5)));

    let resp = pipeline.execute(req).await;

    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, json!({"subject": "user-42", "scope": "profile:write"}));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_lowercase_header_name_accepted() {
    let (pipeline, _calls) = pipeline(TokenAuth::new(JwtVerifier::new(config())));
    let value = format!("Bearer {}", token(config(), "user-42", Duration::minutes(5)));

    let resp = pipeline
        .execute(Request::default().with_header("authorization", value))
        .await;

    assert_eq!(resp.status, 200);
}

// =============================================================================
// Rejection Tests
// =============================================================================

#[tokio::test]
async fn test_rejections_never_reach_handler() {
    let (pipeline, calls) = pipeline(TokenAuth::new(JwtVerifier::new(config())));

    let other_audience = config().audience("billing");
    let other_secret = TokenConfig::with_secret("not-the-secret")
        .issuer("schemaguard-tests")
        .audience("profiles");

    let cases = vec![
        (Request::default(), "MISSING_CREDENTIAL"),
        (
            Request::default().with_header("Authorization", "Token abc"),
            "MALFORMED_HEADER",
        ),
        (Request::default().with_bearer("not.a.jwt"), "MALFORMED_TOKEN"),
        (
            Request::default().with_bearer(&token(config(), "u", Duration::minutes(-5))),
            "TOKEN_EXPIRED",
        ),
        (
            Request::default().with_bearer(&token(other_secret, "u", Duration::minutes(5))),
            "INVALID_SIGNATURE",
        ),
        (
            Request::default().with_bearer(&token(other_audience, "u", Duration::minutes(5))),
            "WRONG_AUDIENCE",
        ),
    ];

    for (req, expected) in cases {
        let resp = pipeline.execute(req).await;
        assert_eq!(resp.status, 401, "case {}", expected);
        assert_eq!(resp.body["error"], expected);
        assert!(resp.body["message"].is_string());
    }

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_identity_schema_enforced() {
    let identity = Schema::object()
        .field("sub", Schema::string().pattern("^user-").build().unwrap())
        .field("scope", Schema::enumeration(["profile:read", "profile:write"]).unwrap())
        .build()
        .unwrap();
    let (pipeline, calls) =
        pipeline(TokenAuth::new(JwtVerifier::new(config())).with_identity_schema(identity));

    let accepted = pipeline
        .execute(Request::default().with_bearer(&token(config(), "user-7", Duration::minutes(5))))
        .await;
    let rejected = pipeline
        .execute(Request::default().with_bearer(&token(config(), "svc-7", Duration::minutes(5))))
        .await;

    assert_eq!(accepted.status, 200);
    assert_eq!(rejected.status, 401);
    assert_eq!(rejected.body["error"], "IDENTITY_REJECTED");
    assert_eq!(rejected.body["details"][0]["path"], json!(["sub"]));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_verifiers_do_not_share_configuration() {
    let (strict, _) = pipeline(TokenAuth::new(JwtVerifier::new(config())));
    let relaxed_config = TokenConfig::with_secret("integration-secret");
    let relaxed = Pipeline::new(FnHandler(|_req: &Request| Response::ok(json!({}))))
        .with_middleware(TokenAuth::new(JwtVerifier::new(relaxed_config.clone())));

    let bare = token(relaxed_config, "user-1", Duration::minutes(5));

    assert_eq!(relaxed.execute(Request::default().with_bearer(&bare)).await.status, 200);
    assert_eq!(strict.execute(Request::default().with_bearer(&bare)).await.status, 401);
}
