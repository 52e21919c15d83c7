//! Validation engine
//!
//! One recursive pass over the schema tree, leaves first:
//! - defaults are resolved for absent input, then validated like input
//! - every violated constraint on a value is reported, not only the first
//! - sibling fields and array elements are validated independently
//! - refinements only run on structurally valid candidates
//!
//! The engine performs no I/O and does not log.

use std::sync::{Arc, LazyLock};

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use url::Url;

use crate::schema::{
    ArrayRules, NumberCheck, NumberRules, ObjectRules, Schema, SchemaKind, StringCheck,
    StringFormat, StringRules, UnknownKeys,
};

use super::clock::{Clock, DefaultClock, SharedClock};
use super::errors::{ErrorCode, FieldError, FieldPath, ValidationError};
use super::result::ValidationResult;

/// `Ok(None)` means the value is absent and must be omitted from the output
type Outcome = Result<Option<Value>, Vec<FieldError>>;

/// Evaluates schemas against untyped input.
///
/// Holds no per-call state; one validator can serve any number of
/// concurrent calls.
#[derive(Clone)]
pub struct Validator {
    clock: Arc<SharedClock>,
}

impl Validator {
    /// Validator backed by the system clock
    pub fn new() -> Self {
        Self {
            clock: Arc::new(DefaultClock),
        }
    }

    /// Validator whose default producers read `clock`
    pub fn with_clock(clock: impl Clock + Send + Sync + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
        }
    }

    /// Non-throwing mode: always returns the discriminated result
    pub fn safe_parse(&self, schema: &Schema, input: &Value) -> ValidationResult {
        match self.check(schema, Some(input), &FieldPath::root()) {
            Ok(value) => ValidationResult::ok(value.unwrap_or(Value::Null)),
            Err(errors) => ValidationResult::fail(errors),
        }
    }

    /// Throwing mode: the validated value, or one aggregate error
    /// carrying every failure
    pub fn parse(&self, schema: &Schema, input: &Value) -> Result<Value, ValidationError> {
        self.safe_parse(schema, input).into_result()
    }

    /// Validates, then deserializes the validated value into `T`
    pub fn parse_as<T: DeserializeOwned>(
        &self,
        schema: &Schema,
        input: &Value,
    ) -> Result<T, ValidationError> {
        let value = self.parse(schema, input)?;
        serde_json::from_value(value).map_err(|e| {
            ValidationError::single(FieldError::new(
                FieldPath::root(),
                ErrorCode::TypeMismatch,
                format!("Validated value does not fit the target type: {}", e),
            ))
        })
    }

    fn check(&self, schema: &Schema, input: Option<&Value>, path: &FieldPath) -> Outcome {
        match schema.kind() {
            SchemaKind::Default { inner, default } => match input {
                Some(value) => self.check(inner, Some(value), path),
                None => {
                    let resolved = default.resolve(self.clock.as_ref());
                    self.check(inner, Some(&resolved), path)
                }
            },
            SchemaKind::Optional(inner) => match input {
                Some(value) => self.check(inner, Some(value), path),
                // A wrapped default still fills absent input
                None if inner.has_default() => self.check(inner, None, path),
                None => Ok(None),
            },
            SchemaKind::Nullable(inner) => match input {
                Some(Value::Null) => Ok(Some(Value::Null)),
                other => self.check(inner, other, path),
            },
            SchemaKind::Refined { inner, refinements } => {
                let candidate = self.check(inner, input, path)?;
                if let Some(value) = &candidate {
                    let errors: Vec<FieldError> = refinements
                        .iter()
                        .filter_map(|refinement| refinement.check(value, path))
                        .collect();
                    if !errors.is_empty() {
                        return Err(errors);
                    }
                }
                Ok(candidate)
            }
            SchemaKind::String(rules) => {
                check_string(rules, present(input, path)?, path).map(Some)
            }
            SchemaKind::Number(rules) => {
                check_number(rules, present(input, path)?, path).map(Some)
            }
            SchemaKind::Boolean => {
                let value = present(input, path)?;
                if value.is_boolean() {
                    Ok(Some(value.clone()))
                } else {
                    Err(vec![mismatch(path, "boolean", value)])
                }
            }
            SchemaKind::Date => check_date(present(input, path)?, path).map(Some),
            SchemaKind::Enum(members) => {
                check_enum(members, present(input, path)?, path).map(Some)
            }
            SchemaKind::Object(rules) => {
                let value = present(input, path)?;
                self.check_object(rules, value, path).map(Some)
            }
            SchemaKind::Array(rules) => {
                let value = present(input, path)?;
                self.check_array(rules, value, path).map(Some)
            }
        }
    }

    fn check_object(
        &self,
        rules: &ObjectRules,
        value: &Value,
        path: &FieldPath,
    ) -> Result<Value, Vec<FieldError>> {
        let obj = value
            .as_object()
            .ok_or_else(|| vec![mismatch(path, "object", value)])?;

        let mut output = Map::new();
        let mut errors = Vec::new();

        for (name, field_schema) in &rules.fields {
            match self.check(field_schema, obj.get(name), &path.child(name.as_str())) {
                Ok(Some(validated)) => {
                    output.insert(name.clone(), validated);
                }
                Ok(None) => {}
                Err(field_errors) => errors.extend(field_errors),
            }
        }

        for (key, extra) in obj {
            if rules.declares(key) {
                continue;
            }
            match rules.unknown_keys {
                UnknownKeys::Strip => {}
                UnknownKeys::Strict => errors.push(FieldError::unrecognized_key(path, key)),
                UnknownKeys::Passthrough => {
                    output.insert(key.clone(), extra.clone());
                }
            }
        }

        if errors.is_empty() {
            Ok(Value::Object(output))
        } else {
            Err(errors)
        }
    }

    fn check_array(
        &self,
        rules: &ArrayRules,
        value: &Value,
        path: &FieldPath,
    ) -> Result<Value, Vec<FieldError>> {
        let items = value
            .as_array()
            .ok_or_else(|| vec![mismatch(path, "array", value)])?;

        let mut errors = Vec::new();
        if let Some(min) = rules.min_length {
            if items.len() < min {
                errors.push(FieldError::constraint(
                    path,
                    format!("Array must contain at least {} element(s)", min),
                ));
            }
        }
        if let Some(max) = rules.max_length {
            if items.len() > max {
                errors.push(FieldError::constraint(
                    path,
                    format!("Array must contain at most {} element(s)", max),
                ));
            }
        }

        let mut output = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match self.check(&rules.element, Some(item), &path.child(i)) {
                Ok(Some(validated)) => output.push(validated),
                Ok(None) => {}
                Err(item_errors) => errors.extend(item_errors),
            }
        }

        if errors.is_empty() {
            Ok(Value::Array(output))
        } else {
            Err(errors)
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

fn present<'v>(input: Option<&'v Value>, path: &FieldPath) -> Result<&'v Value, Vec<FieldError>> {
    input.ok_or_else(|| vec![FieldError::required(path)])
}

fn check_string(
    rules: &StringRules,
    value: &Value,
    path: &FieldPath,
) -> Result<Value, Vec<FieldError>> {
    let s = value
        .as_str()
        .ok_or_else(|| vec![mismatch(path, "string", value)])?;
    let len = s.chars().count();

    let errors: Vec<FieldError> = rules
        .checks
        .iter()
        .filter_map(|check| match check {
            StringCheck::MinLength(n) if len < *n => Some(FieldError::constraint(
                path,
                format!("String must contain at least {} character(s)", n),
            )),
            StringCheck::MaxLength(n) if len > *n => Some(FieldError::constraint(
                path,
                format!("String must contain at most {} character(s)", n),
            )),
            StringCheck::Length(n) if len != *n => Some(FieldError::constraint(
                path,
                format!("String must contain exactly {} character(s)", n),
            )),
            StringCheck::Pattern(re) if !re.is_match(s) => Some(FieldError::constraint(
                path,
                format!("String must match pattern {}", re.as_str()),
            )),
            StringCheck::Format(format) if !matches_format(*format, s) => Some(
                FieldError::constraint(path, format!("Invalid {}", format)),
            ),
            _ => None,
        })
        .collect();

    if errors.is_empty() {
        Ok(value.clone())
    } else {
        Err(errors)
    }
}

fn matches_format(format: StringFormat, s: &str) -> bool {
    match format {
        StringFormat::Email => is_email(s),
        StringFormat::Uuid => uuid::Uuid::parse_str(s).is_ok(),
        StringFormat::Url => is_http_url(s),
        StringFormat::DateTime => DateTime::parse_from_rfc3339(s).is_ok(),
    }
}

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
    )
    .expect("email pattern is valid")
});

fn is_email(s: &str) -> bool {
    EMAIL_REGEX.is_match(s)
}

/// Absolute `http`/`https` URL with a non-empty host
fn is_http_url(s: &str) -> bool {
    match Url::parse(s) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().map_or(false, |host| !host.is_empty())
        }
        Err(_) => false,
    }
}

fn check_number(
    rules: &NumberRules,
    value: &Value,
    path: &FieldPath,
) -> Result<Value, Vec<FieldError>> {
    let Some(n) = value.as_f64() else {
        return Err(vec![mismatch(path, "number", value)]);
    };
    let is_integer = value.is_i64() || value.is_u64() || n.fract() == 0.0;

    let errors: Vec<FieldError> = rules
        .checks
        .iter()
        .filter_map(|check| match check {
            NumberCheck::Min(min) if n < *min => Some(FieldError::constraint(
                path,
                format!("Number must be greater than or equal to {}", min),
            )),
            NumberCheck::Max(max) if n > *max => Some(FieldError::constraint(
                path,
                format!("Number must be less than or equal to {}", max),
            )),
            NumberCheck::Integer if !is_integer => {
                Some(FieldError::constraint(path, "Expected integer, received float"))
            }
            NumberCheck::Positive if n <= 0.0 => {
                Some(FieldError::constraint(path, "Number must be greater than 0"))
            }
            NumberCheck::NonNegative if n < 0.0 => Some(FieldError::constraint(
                path,
                "Number must be greater than or equal to 0",
            )),
            NumberCheck::MultipleOf(step) if !is_multiple(n, *step) => Some(
                FieldError::constraint(path, format!("Number must be a multiple of {}", step)),
            ),
            _ => None,
        })
        .collect();

    if errors.is_empty() {
        Ok(value.clone())
    } else {
        Err(errors)
    }
}

fn is_multiple(n: f64, step: f64) -> bool {
    let quotient = n / step;
    (quotient - quotient.round()).abs() < 1e-9
}

/// Dates are normalized to RFC 3339 UTC so a validated value re-validates
fn check_date(value: &Value, path: &FieldPath) -> Result<Value, Vec<FieldError>> {
    let s = value
        .as_str()
        .ok_or_else(|| vec![mismatch(path, "date", value)])?;
    let parsed = DateTime::parse_from_rfc3339(s).map_err(|_| {
        vec![FieldError::new(
            path.clone(),
            ErrorCode::TypeMismatch,
            "Invalid date",
        )]
    })?;
    let utc: DateTime<Utc> = parsed.with_timezone(&Utc);
    Ok(Value::String(utc.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
}

fn check_enum(members: &[String], value: &Value, path: &FieldPath) -> Result<Value, Vec<FieldError>> {
    let s = value
        .as_str()
        .ok_or_else(|| vec![mismatch(path, "string", value)])?;
    if members.iter().any(|m| m == s) {
        Ok(value.clone())
    } else {
        Err(vec![FieldError::constraint(
            path,
            format!(
                "Invalid enum value. Expected {}, received '{}'",
                members
                    .iter()
                    .map(|m| format!("'{}'", m))
                    .collect::<Vec<_>>()
                    .join(" | "),
                s
            ),
        )])
    }
}

fn mismatch(path: &FieldPath, expected: &str, actual: &Value) -> FieldError {
    FieldError::type_mismatch(path, expected, json_type_name(actual))
}

/// Returns the JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if is_whole(n) => "integer",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_whole(n: &Number) -> bool {
    n.is_i64() || n.is_u64()
}
