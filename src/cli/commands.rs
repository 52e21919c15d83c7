//! CLI command implementations
//!
//! Commands print their result as one JSON document on stdout; log lines
//! go to stderr. Failures after printing (rejected input, rejected token)
//! still return an error so the process exits non-zero.

use std::io::{self, Write};
use std::path::Path;

use serde_json::{json, Value};

use crate::auth::JwtVerifier;
use crate::config::AppConfig;
use crate::middleware::{FnHandler, Pipeline, Request, Response, TokenAuth};
use crate::observability::{log_event_with_fields, Event, Logger};
use crate::schema::{load_schema_file, SchemaRegistry};
use crate::validation::{safe_parse, ValidationResult};

use super::args::Command;
use super::errors::{CliError, CliErrorCode, CliResult};
use super::io::{read_input, write_json, write_json_to};

/// Dispatch a parsed command
pub fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::Check { schema, input } => check(&schema, &input),
        Command::Verify {
            config,
            token,
            identity_schema,
        } => verify(&config, &token, identity_schema.as_deref()),
        Command::Schemas { config } => schemas(&config),
    }
}

/// `check`: validate one document against one schema file
pub fn check(schema_path: &Path, input_path: &Path) -> CliResult<()> {
    let mut stdout = io::stdout();
    check_to(schema_path, input_path, &mut stdout)
}

/// `check` writing its result to `out`
pub fn check_to<W: Write>(schema_path: &Path, input_path: &Path, out: &mut W) -> CliResult<()> {
    let schema = load_schema_file(schema_path)?;
    let input = read_input(input_path)?;

    let result = safe_parse(&schema, &input);
    write_json_to(out, &result)?;
    out.flush()?;

    let outcome = check_outcome(&result);
    let status = if outcome.is_ok() { "ok" } else { "fail" };
    log_event_with_fields(
        Event::CommandComplete,
        &[("command", "check"), ("status", status)],
    );
    outcome
}

fn check_outcome(result: &ValidationResult) -> CliResult<()> {
    if result.is_ok() {
        return Ok(());
    }

    let count = result.errors().len().to_string();
    log_event_with_fields(Event::ValidationFailed, &[("errors", count.as_str())]);
    Err(CliError::validation_failed(result.errors().len()))
}

/// `verify`: run a token through the auth middleware and print the identity
pub fn verify(config_path: &Path, token: &str, identity_schema: Option<&Path>) -> CliResult<()> {
    let config = AppConfig::load(config_path)?;
    Logger::set_min_severity(config.log_level);
    log_event_with_fields(
        Event::ConfigLoaded,
        &[("path", config_path.display().to_string().as_str())],
    );

    let response = verify_token(&config, token, identity_schema)?;
    write_json(&response.body)?;

    let status = response.status.to_string();
    log_event_with_fields(
        Event::CommandComplete,
        &[("command", "verify"), ("status", status.as_str())],
    );

    if response.is_success() {
        Ok(())
    } else {
        let code = response.body["error"].as_str().unwrap_or("UNAUTHORIZED");
        Err(CliError::new(
            CliErrorCode::AuthFailed,
            format!("token rejected: {}", code),
        ))
    }
}

/// Runs the token through a single-stage pipeline and returns its response
pub fn verify_token(
    config: &AppConfig,
    token: &str,
    identity_schema: Option<&Path>,
) -> CliResult<Response> {
    let mut auth = TokenAuth::new(JwtVerifier::new(config.token.clone()));
    if let Some(path) = identity_schema {
        auth = auth.with_identity_schema(load_schema_file(path)?);
    }

    let pipeline = Pipeline::new(FnHandler(identity_response)).with_middleware(auth);
    let request = Request::default().with_bearer(token);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    Ok(runtime.block_on(pipeline.execute(request)))
}

fn identity_response(req: &Request) -> Response {
    match &req.identity {
        Some(identity) => Response::ok(json!({
            "subject": identity.subject,
            "expires_at": identity.expires_at.to_rfc3339(),
            "claims": identity.payload,
        })),
        None => Response::unauthorized("MISSING_CREDENTIAL", "No identity attached"),
    }
}

/// `schemas`: load the configured schema directory and list what it holds
pub fn schemas(config_path: &Path) -> CliResult<()> {
    let mut stdout = io::stdout();
    schemas_to(config_path, &mut stdout)
}

/// `schemas` writing its listing to `out`
pub fn schemas_to<W: Write>(config_path: &Path, out: &mut W) -> CliResult<()> {
    let config = AppConfig::load(config_path)?;
    Logger::set_min_severity(config.log_level);

    let registry = load_registry(&config.schema_dir)?;
    let names: Vec<Value> = registry
        .names()
        .into_iter()
        .map(|name| {
            let kind = registry.get(name).map(|s| s.type_name()).unwrap_or("unknown");
            json!({ "name": name, "type": kind })
        })
        .collect();

    write_json_to(
        out,
        &json!({
            "schema_dir": registry.schema_dir().display().to_string(),
            "schemas": names,
        }),
    )?;
    out.flush()?;

    log_event_with_fields(Event::CommandComplete, &[("command", "schemas")]);
    Ok(())
}

fn load_registry(dir: &Path) -> CliResult<SchemaRegistry> {
    let mut registry = SchemaRegistry::new(dir);
    registry.load_all()?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Claims, TokenConfig};
    use crate::observability::{LogStream, Severity};
    use chrono::{Duration, Utc};
    use std::fs;
    use tempfile::TempDir;

    fn app_config(secret: &str) -> AppConfig {
        AppConfig::from_json(&json!({ "token": { "secret": secret } }).to_string()).unwrap()
    }

    fn sign(secret: &str, ttl: Duration) -> String {
        JwtVerifier::new(TokenConfig::with_secret(secret))
            .sign(&Claims::new("cli-user", Utc::now() + ttl))
            .unwrap()
    }

    #[test]
    fn test_verify_token_accepts_valid() {
        let config = app_config("cli-secret");
        let response = verify_token(&config, &sign("cli-secret", Duration::hours(1)), None).unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body["subject"], "cli-user");
    }

    #[test]
    fn test_verify_token_rejects_wrong_secret() {
        let config = app_config("cli-secret");
        let response = verify_token(&config, &sign("other", Duration::hours(1)), None).unwrap();

        assert_eq!(response.status, 401);
        assert_eq!(response.body["error"], "INVALID_SIGNATURE");
    }

    #[test]
    fn test_verify_token_with_identity_schema() {
        let dir = TempDir::new().unwrap();
        let schema_path = dir.path().join("identity.json");
        fs::write(
            &schema_path,
            r#"{"type": "object", "fields": {"sub": {"type": "string"}, "org": {"type": "string"}}}"#,
        )
        .unwrap();

        let config = app_config("cli-secret");
        let response = verify_token(
            &config,
            &sign("cli-secret", Duration::hours(1)),
            Some(&schema_path),
        )
        .unwrap();

        assert_eq!(response.status, 401);
        assert_eq!(response.body["error"], "IDENTITY_REJECTED");
    }

    #[test]
    fn test_check_outcome() {
        let ok = safe_parse(&crate::schema::Schema::boolean(), &json!(true));
        assert!(check_outcome(&ok).is_ok());

        let fail = safe_parse(&crate::schema::Schema::boolean(), &json!("yes"));
        let err = check_outcome(&fail).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ValidationFailed);
    }

    /// Parses `buf` as a stream of JSON documents
    fn documents(buf: &[u8]) -> Vec<Value> {
        serde_json::Deserializer::from_slice(buf)
            .into_iter::<Value>()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_check_prints_exactly_one_document() {
        let dir = TempDir::new().unwrap();
        let schema_path = dir.path().join("age.json");
        let input_path = dir.path().join("input.json");
        fs::write(
            &schema_path,
            r#"{"type": "object", "fields": {"age": {"type": "number", "min": 18}}}"#,
        )
        .unwrap();
        fs::write(&input_path, r#"{"age": 20}"#).unwrap();

        let mut out = Vec::new();
        check_to(&schema_path, &input_path, &mut out).unwrap();

        let docs = documents(&out);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0], json!({"status": "ok", "value": {"age": 20}}));
    }

    #[test]
    fn test_failed_check_still_prints_one_document() {
        let dir = TempDir::new().unwrap();
        let schema_path = dir.path().join("age.json");
        let input_path = dir.path().join("input.json");
        fs::write(&schema_path, r#"{"type": "number", "min": 18}"#).unwrap();
        fs::write(&input_path, "15").unwrap();

        let mut out = Vec::new();
        let err = check_to(&schema_path, &input_path, &mut out).unwrap_err();

        assert_eq!(err.code(), &CliErrorCode::ValidationFailed);
        let docs = documents(&out);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["status"], "fail");
    }

    #[test]
    fn test_schemas_prints_exactly_one_document() {
        let dir = TempDir::new().unwrap();
        let schema_dir = dir.path().join("schemas");
        fs::create_dir(&schema_dir).unwrap();
        fs::write(schema_dir.join("flag.json"), r#"{"type": "boolean"}"#).unwrap();
        let config_path = dir.path().join("schemaguard.json");
        fs::write(
            &config_path,
            json!({"token": {"secret": "s"}, "schema_dir": schema_dir}).to_string(),
        )
        .unwrap();

        let mut out = Vec::new();
        schemas_to(&config_path, &mut out).unwrap();

        let docs = documents(&out);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["schemas"], json!([{"name": "flag", "type": "boolean"}]));
    }

    #[test]
    fn test_cli_logging_stays_off_stdout() {
        Logger::reserve_stdout();
        assert_eq!(Logger::stream_for(Severity::Info), LogStream::Stderr);
    }

    #[test]
    fn test_check_rejects_bad_schema_file() {
        let dir = TempDir::new().unwrap();
        let schema_path = dir.path().join("bad.json");
        fs::write(&schema_path, r#"{"type": "number", "min": 10, "max": 1}"#).unwrap();

        let err = check(&schema_path, Path::new("-")).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::SchemaError);
    }
}
