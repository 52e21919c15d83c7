//! Schema builders
//!
//! Builders record constraints in call order. Contradictions are
//! reported by `build()`, so a misconfigured schema fails at startup
//! instead of at the first validation call.

use std::collections::HashSet;

use regex::Regex;

use super::errors::{SchemaError, SchemaResult};
use super::types::{
    ArrayRules, NumberCheck, NumberRules, ObjectRules, Schema, SchemaKind, StringCheck,
    StringFormat, StringRules, UnknownKeys,
};

impl Schema {
    /// String schema builder
    pub fn string() -> StringSchemaBuilder {
        StringSchemaBuilder::default()
    }

    /// Number schema builder
    pub fn number() -> NumberSchemaBuilder {
        NumberSchemaBuilder::default()
    }

    /// Object schema builder
    pub fn object() -> ObjectSchemaBuilder {
        ObjectSchemaBuilder::default()
    }

    /// Array schema builder over `element`
    pub fn array(element: Schema) -> ArraySchemaBuilder {
        ArraySchemaBuilder {
            element,
            min_length: None,
            max_length: None,
        }
    }

    /// Enum over a closed set of string members
    ///
    /// # Errors
    ///
    /// Empty member set or duplicate members.
    pub fn enumeration<I, S>(members: I) -> SchemaResult<Schema>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members: Vec<String> = members.into_iter().map(Into::into).collect();
        if members.is_empty() {
            return Err(SchemaError::misconfigured("enum must have at least one member"));
        }

        let mut seen = HashSet::new();
        for member in &members {
            if !seen.insert(member.as_str()) {
                return Err(SchemaError::misconfigured(format!(
                    "enum member '{}' is declared twice",
                    member
                )));
            }
        }

        Ok(Schema::from_kind(SchemaKind::Enum(members)))
    }
}

/// Builder for string schemas
#[derive(Debug, Default)]
pub struct StringSchemaBuilder {
    checks: Vec<StringCheck>,
    /// First construction error, surfaced by `build()`
    error: Option<SchemaError>,
}

impl StringSchemaBuilder {
    pub fn min_length(mut self, n: usize) -> Self {
        self.checks.push(StringCheck::MinLength(n));
        self
    }

    pub fn max_length(mut self, n: usize) -> Self {
        self.checks.push(StringCheck::MaxLength(n));
        self
    }

    /// Exact length
    pub fn length(mut self, n: usize) -> Self {
        self.checks.push(StringCheck::Length(n));
        self
    }

    /// Regular expression the whole value must match somewhere
    pub fn pattern(mut self, pattern: &str) -> Self {
        match Regex::new(pattern) {
            Ok(re) => self.checks.push(StringCheck::Pattern(re)),
            Err(e) => {
                if self.error.is_none() {
                    self.error = Some(SchemaError::misconfigured(format!(
                        "invalid pattern '{}': {}",
                        pattern, e
                    )));
                }
            }
        }
        self
    }

    pub fn format(mut self, format: StringFormat) -> Self {
        self.checks.push(StringCheck::Format(format));
        self
    }

    pub fn email(self) -> Self {
        self.format(StringFormat::Email)
    }

    pub fn uuid(self) -> Self {
        self.format(StringFormat::Uuid)
    }

    pub fn url(self) -> Self {
        self.format(StringFormat::Url)
    }

    pub fn datetime(self) -> Self {
        self.format(StringFormat::DateTime)
    }

    pub fn build(self) -> SchemaResult<Schema> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let mut min = 0usize;
        let mut max = usize::MAX;
        for check in &self.checks {
            match check {
                StringCheck::MinLength(n) => min = min.max(*n),
                StringCheck::MaxLength(n) => max = max.min(*n),
                StringCheck::Length(n) => {
                    min = min.max(*n);
                    max = max.min(*n);
                }
                StringCheck::Pattern(_) | StringCheck::Format(_) => {}
            }
        }
        if min > max {
            return Err(SchemaError::inverted_bounds("string length", min, max));
        }

        Ok(Schema::from_kind(SchemaKind::String(StringRules {
            checks: self.checks,
        })))
    }
}

/// Builder for number schemas
#[derive(Debug, Default)]
pub struct NumberSchemaBuilder {
    checks: Vec<NumberCheck>,
}

impl NumberSchemaBuilder {
    /// Inclusive lower bound
    pub fn min(mut self, min: f64) -> Self {
        self.checks.push(NumberCheck::Min(min));
        self
    }

    /// Inclusive upper bound
    pub fn max(mut self, max: f64) -> Self {
        self.checks.push(NumberCheck::Max(max));
        self
    }

    pub fn integer(mut self) -> Self {
        self.checks.push(NumberCheck::Integer);
        self
    }

    pub fn positive(mut self) -> Self {
        self.checks.push(NumberCheck::Positive);
        self
    }

    pub fn non_negative(mut self) -> Self {
        self.checks.push(NumberCheck::NonNegative);
        self
    }

    pub fn multiple_of(mut self, step: f64) -> Self {
        self.checks.push(NumberCheck::MultipleOf(step));
        self
    }

    pub fn build(self) -> SchemaResult<Schema> {
        let mut min = f64::NEG_INFINITY;
        let mut max = f64::INFINITY;
        for check in &self.checks {
            match check {
                NumberCheck::Min(n) | NumberCheck::Max(n) if !n.is_finite() => {
                    return Err(SchemaError::misconfigured(format!(
                        "numeric bound {} is not finite",
                        n
                    )));
                }
                NumberCheck::Min(n) => min = min.max(*n),
                NumberCheck::Max(n) => max = max.min(*n),
                NumberCheck::MultipleOf(step) if !(step.is_finite() && *step > 0.0) => {
                    return Err(SchemaError::misconfigured(format!(
                        "multiple_of step {} must be a positive finite number",
                        step
                    )));
                }
                _ => {}
            }
        }
        if min > max {
            return Err(SchemaError::inverted_bounds("number", min, max));
        }

        Ok(Schema::from_kind(SchemaKind::Number(NumberRules {
            checks: self.checks,
        })))
    }
}

/// Builder for object schemas
#[derive(Debug, Default)]
pub struct ObjectSchemaBuilder {
    fields: Vec<(String, Schema)>,
    unknown_keys: UnknownKeys,
}

impl ObjectSchemaBuilder {
    /// Declares a field. Fields are validated in declaration order.
    pub fn field(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.fields.push((name.into(), schema));
        self
    }

    /// Reject undeclared input keys
    pub fn strict(mut self) -> Self {
        self.unknown_keys = UnknownKeys::Strict;
        self
    }

    /// Keep undeclared input keys in the output
    pub fn passthrough(mut self) -> Self {
        self.unknown_keys = UnknownKeys::Passthrough;
        self
    }

    pub fn unknown_keys(mut self, policy: UnknownKeys) -> Self {
        self.unknown_keys = policy;
        self
    }

    pub fn build(self) -> SchemaResult<Schema> {
        let mut seen = HashSet::new();
        for (name, _) in &self.fields {
            if !seen.insert(name.as_str()) {
                return Err(SchemaError::misconfigured(format!(
                    "object field '{}' is declared twice",
                    name
                )));
            }
        }

        Ok(Schema::from_kind(SchemaKind::Object(ObjectRules {
            fields: self.fields,
            unknown_keys: self.unknown_keys,
        })))
    }
}

/// Builder for array schemas
#[derive(Debug)]
pub struct ArraySchemaBuilder {
    element: Schema,
    min_length: Option<usize>,
    max_length: Option<usize>,
}

impl ArraySchemaBuilder {
    pub fn min_length(mut self, n: usize) -> Self {
        self.min_length = Some(n);
        self
    }

    pub fn max_length(mut self, n: usize) -> Self {
        self.max_length = Some(n);
        self
    }

    /// At least one element
    pub fn nonempty(self) -> Self {
        self.min_length(1)
    }

    pub fn build(self) -> SchemaResult<Schema> {
        if let (Some(min), Some(max)) = (self.min_length, self.max_length) {
            if min > max {
                return Err(SchemaError::inverted_bounds("array length", min, max));
            }
        }

        Ok(Schema::from_kind(SchemaKind::Array(ArrayRules {
            element: self.element,
            min_length: self.min_length,
            max_length: self.max_length,
        })))
    }
}
