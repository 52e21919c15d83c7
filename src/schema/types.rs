//! Schema node definitions
//!
//! A [`Schema`] is a shared handle to an immutable constraint node.
//! Combinators wrap an existing handle in a new node and never touch the
//! node they wrap, so one schema can be reused inside any number of
//! parents. Nodes can only reference nodes that already exist, which
//! makes every schema tree acyclic by construction.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use crate::validation::{Clock, FieldError, FieldPath, PathSegment};

/// Shared, immutable schema handle
#[derive(Debug, Clone)]
pub struct Schema {
    node: Arc<SchemaKind>,
}

/// The constraint a schema node expresses
#[derive(Debug)]
pub enum SchemaKind {
    String(StringRules),
    Number(NumberRules),
    Boolean,
    /// RFC 3339 timestamp string
    Date,
    /// Closed set of string members
    Enum(Vec<String>),
    Object(ObjectRules),
    Array(ArrayRules),
    /// Absent input succeeds with an absent value
    Optional(Schema),
    /// `null` input succeeds with `null`
    Nullable(Schema),
    /// Absent input is replaced with a resolved default
    Default { inner: Schema, default: DefaultValue },
    /// Predicates run after `inner` validates structurally
    Refined {
        inner: Schema,
        refinements: Vec<Refinement>,
    },
}

impl Schema {
    pub(crate) fn from_kind(kind: SchemaKind) -> Self {
        Self {
            node: Arc::new(kind),
        }
    }

    /// Returns the node this handle points at
    pub fn kind(&self) -> &SchemaKind {
        &self.node
    }

    /// Boolean schema
    pub fn boolean() -> Self {
        Self::from_kind(SchemaKind::Boolean)
    }

    /// Date schema accepting RFC 3339 strings
    pub fn date() -> Self {
        Self::from_kind(SchemaKind::Date)
    }

    /// Wraps this schema so absent input is accepted
    pub fn optional(self) -> Self {
        Self::from_kind(SchemaKind::Optional(self))
    }

    /// Wraps this schema so `null` is accepted
    pub fn nullable(self) -> Self {
        Self::from_kind(SchemaKind::Nullable(self))
    }

    /// Wraps this schema with a fallback for absent input.
    ///
    /// The resolved default is validated against this schema like any
    /// other input.
    pub fn with_default(self, default: impl Into<DefaultValue>) -> Self {
        Self::from_kind(SchemaKind::Default {
            inner: self,
            default: default.into(),
        })
    }

    /// Attaches a refinement.
    ///
    /// Refinements attached to the same schema run in attachment order
    /// and all of their failures are reported together.
    pub fn refine(self, refinement: Refinement) -> Self {
        match self.kind() {
            SchemaKind::Refined { inner, refinements } => {
                let mut refinements = refinements.clone();
                refinements.push(refinement);
                Self::from_kind(SchemaKind::Refined {
                    inner: inner.clone(),
                    refinements,
                })
            }
            _ => Self::from_kind(SchemaKind::Refined {
                inner: self,
                refinements: vec![refinement],
            }),
        }
    }

    /// Short kind name used in messages
    pub fn type_name(&self) -> &'static str {
        match self.kind() {
            SchemaKind::String(_) => "string",
            SchemaKind::Number(rules) if rules.is_integer() => "integer",
            SchemaKind::Number(_) => "number",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Date => "date",
            SchemaKind::Enum(_) => "enum",
            SchemaKind::Object(_) => "object",
            SchemaKind::Array(_) => "array",
            SchemaKind::Optional(inner)
            | SchemaKind::Nullable(inner)
            | SchemaKind::Default { inner, .. }
            | SchemaKind::Refined { inner, .. } => inner.type_name(),
        }
    }

    /// Whether absent input can succeed against this schema
    pub fn accepts_absent(&self) -> bool {
        match self.kind() {
            SchemaKind::Optional(_) | SchemaKind::Default { .. } => true,
            SchemaKind::Nullable(inner) | SchemaKind::Refined { inner, .. } => {
                inner.accepts_absent()
            }
            _ => false,
        }
    }

    /// Whether a default sits anywhere under this node's wrappers
    pub fn has_default(&self) -> bool {
        match self.kind() {
            SchemaKind::Default { .. } => true,
            SchemaKind::Optional(inner)
            | SchemaKind::Nullable(inner)
            | SchemaKind::Refined { inner, .. } => inner.has_default(),
            _ => false,
        }
    }
}

/// Well-known string formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    Email,
    Uuid,
    /// Absolute http(s) URL
    Url,
    /// RFC 3339 timestamp
    DateTime,
}

impl StringFormat {
    pub fn name(&self) -> &'static str {
        match self {
            StringFormat::Email => "email",
            StringFormat::Uuid => "uuid",
            StringFormat::Url => "url",
            StringFormat::DateTime => "datetime",
        }
    }
}

impl fmt::Display for StringFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single string constraint
#[derive(Debug, Clone)]
pub enum StringCheck {
    MinLength(usize),
    MaxLength(usize),
    Length(usize),
    Pattern(Regex),
    Format(StringFormat),
}

/// String constraints in declaration order
#[derive(Debug, Clone, Default)]
pub struct StringRules {
    pub checks: Vec<StringCheck>,
}

/// A single numeric constraint
#[derive(Debug, Clone, PartialEq)]
pub enum NumberCheck {
    Min(f64),
    Max(f64),
    Integer,
    /// Strictly greater than zero
    Positive,
    NonNegative,
    MultipleOf(f64),
}

/// Numeric constraints in declaration order
#[derive(Debug, Clone, Default)]
pub struct NumberRules {
    pub checks: Vec<NumberCheck>,
}

impl NumberRules {
    pub fn is_integer(&self) -> bool {
        self.checks.contains(&NumberCheck::Integer)
    }
}

/// Policy for input keys not declared on an object schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownKeys {
    /// Drop them from the output
    #[default]
    Strip,
    /// Report each one as `unrecognized_key`
    Strict,
    /// Copy them to the output unchecked
    Passthrough,
}

/// Object field map in declaration order
#[derive(Debug, Clone)]
pub struct ObjectRules {
    pub fields: Vec<(String, Schema)>,
    pub unknown_keys: UnknownKeys,
}

impl ObjectRules {
    pub fn field(&self, name: &str) -> Option<&Schema> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, schema)| schema)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

/// Array element schema and length bounds
#[derive(Debug, Clone)]
pub struct ArrayRules {
    pub element: Schema,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

type Producer = dyn Fn(&dyn Clock) -> Value + Send + Sync;

/// Fallback used when input is absent.
///
/// A producer is invoked on every validation call that needs it; its
/// result is never cached.
#[derive(Clone)]
pub enum DefaultValue {
    Literal(Value),
    Producer(Arc<Producer>),
}

impl DefaultValue {
    pub fn literal(value: impl Into<Value>) -> Self {
        DefaultValue::Literal(value.into())
    }

    pub fn producer<F>(f: F) -> Self
    where
        F: Fn(&dyn Clock) -> Value + Send + Sync + 'static,
    {
        DefaultValue::Producer(Arc::new(f))
    }

    /// Current clock time as an RFC 3339 string
    pub fn now() -> Self {
        Self::producer(|clock| Value::String(clock.utc().to_rfc3339()))
    }

    pub fn resolve(&self, clock: &dyn Clock) -> Value {
        match self {
            DefaultValue::Literal(value) => value.clone(),
            DefaultValue::Producer(produce) => produce(clock),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            DefaultValue::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

impl From<Value> for DefaultValue {
    fn from(value: Value) -> Self {
        DefaultValue::Literal(value)
    }
}

type Predicate = dyn Fn(&Value) -> bool + Send + Sync;

/// Predicate evaluated against a structurally valid candidate
#[derive(Clone)]
pub struct Refinement {
    message: String,
    /// Relative to the refined schema's location
    path: FieldPath,
    predicate: Arc<Predicate>,
}

impl Refinement {
    /// Failure is reported at the refined value itself
    pub fn new<F>(message: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            path: FieldPath::root(),
            predicate: Arc::new(predicate),
        }
    }

    /// Reports failures at `path` below the refined value
    pub fn at<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        self.path = path.into_iter().collect();
        self
    }

    /// Two fields of an object must hold equal values. Reported at `right`.
    pub fn fields_match(left: impl Into<String>, right: impl Into<String>) -> Self {
        let left = left.into();
        let right = right.into();
        let message = format!("'{}' must match '{}'", right, left);
        let (l, r) = (left.clone(), right.clone());
        Self::new(message, move |value| value.get(&l) == value.get(&r)).at([right])
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Runs the predicate, producing an error located under `base` on failure
    pub fn check(&self, value: &Value, base: &FieldPath) -> Option<FieldError> {
        if (self.predicate)(value) {
            None
        } else {
            Some(FieldError::refinement(base.join(&self.path), &self.message))
        }
    }
}

impl fmt::Debug for Refinement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Refinement")
            .field("message", &self.message)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{DefaultClock, ErrorCode};
    use serde_json::json;

    #[test]
    fn test_wrapping_does_not_mutate_inner() {
        let base = Schema::boolean();
        let optional = base.clone().optional();

        assert!(matches!(base.kind(), SchemaKind::Boolean));
        assert!(matches!(optional.kind(), SchemaKind::Optional(_)));
        assert!(!base.accepts_absent());
        assert!(optional.accepts_absent());
    }

    #[test]
    fn test_refine_accumulates_on_same_node() {
        let schema = Schema::boolean()
            .refine(Refinement::new("a", |_| true))
            .refine(Refinement::new("b", |_| true));

        match schema.kind() {
            SchemaKind::Refined { refinements, .. } => {
                let messages: Vec<_> = refinements.iter().map(|r| r.message()).collect();
                assert_eq!(messages, vec!["a", "b"]);
            }
            other => panic!("expected refined node, got {:?}", other),
        }
    }

    #[test]
    fn test_refine_leaves_original_refined_schema_untouched() {
        let first = Schema::boolean().refine(Refinement::new("a", |_| true));
        let _second = first.clone().refine(Refinement::new("b", |_| true));

        match first.kind() {
            SchemaKind::Refined { refinements, .. } => assert_eq!(refinements.len(), 1),
            other => panic!("expected refined node, got {:?}", other),
        }
    }

    #[test]
    fn test_has_default_sees_through_wrappers() {
        assert!(Schema::boolean().with_default(json!(true)).optional().has_default());
        assert!(Schema::boolean()
            .with_default(json!(true))
            .nullable()
            .refine(Refinement::new("a", |_| true))
            .has_default());
        assert!(!Schema::boolean().optional().has_default());
    }

    #[test]
    fn test_type_name_sees_through_wrappers() {
        let schema = Schema::date().nullable().optional();
        assert_eq!(schema.type_name(), "date");
    }

    #[test]
    fn test_literal_default_resolves_to_itself() {
        let default = DefaultValue::literal("light");
        assert_eq!(default.resolve(&DefaultClock), json!("light"));
    }

    #[test]
    fn test_fields_match_reports_at_right_field() {
        let refinement = Refinement::fields_match("password", "confirmPassword");
        let base = FieldPath::root().child("signup");

        let ok = json!({"password": "x", "confirmPassword": "x"});
        assert!(refinement.check(&ok, &base).is_none());

        let bad = json!({"password": "x", "confirmPassword": "y"});
        let err = refinement.check(&bad, &base).unwrap();
        assert_eq!(err.code, ErrorCode::RefinementFailed);
        assert_eq!(err.path.to_string(), "signup.confirmPassword");
    }
}
