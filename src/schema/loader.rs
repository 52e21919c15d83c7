//! Declarative schema files
//!
//! Schemas may be declared as JSON and compiled into [`Schema`] values at
//! startup:
//!
//! ```json
//! {
//!   "type": "object",
//!   "unknown_keys": "strict",
//!   "fields": {
//!     "username": { "type": "string", "min_length": 3, "pattern": "^[a-zA-Z0-9_]+$" },
//!     "age": { "type": "number", "integer": true, "min": 18, "max": 120, "optional": true },
//!     "theme": { "type": "enum", "members": ["light", "dark"], "default": "light" }
//!   },
//!   "refine": [{ "fields_match": ["password", "confirmPassword"] }]
//! }
//! ```
//!
//! A registry loads every `*.json` file in a directory, keyed by file
//! stem. Any malformed file aborts the load.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::observability::{log_event_with_fields, Event};

use super::errors::{SchemaError, SchemaResult};
use super::types::{DefaultValue, Refinement, Schema, StringFormat, UnknownKeys};

/// A schema as declared in a file
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaSpec {
    #[serde(flatten)]
    pub kind: TypeSpec,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub nullable: bool,
    /// Literal fallback for absent input. An explicit `null` is a
    /// `Some(Value::Null)` default, not a missing one.
    #[serde(default, deserialize_with = "declared_value")]
    pub default: Option<Value>,
    /// Fallback to the current time for absent input
    #[serde(default)]
    pub default_now: bool,
    #[serde(default)]
    pub refine: Vec<RefineSpec>,
}

/// Kind-specific part of a declared schema
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TypeSpec {
    String {
        #[serde(default)]
        min_length: Option<usize>,
        #[serde(default)]
        max_length: Option<usize>,
        #[serde(default)]
        length: Option<usize>,
        #[serde(default)]
        pattern: Option<String>,
        #[serde(default)]
        format: Option<FormatSpec>,
    },
    Number {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
        #[serde(default)]
        integer: bool,
        #[serde(default)]
        positive: bool,
        #[serde(default)]
        non_negative: bool,
        #[serde(default)]
        multiple_of: Option<f64>,
    },
    Boolean,
    Date,
    Enum {
        members: Vec<String>,
    },
    Object {
        #[serde(deserialize_with = "ordered_fields")]
        fields: Vec<(String, SchemaSpec)>,
        #[serde(default)]
        unknown_keys: UnknownKeysSpec,
    },
    Array {
        items: Box<SchemaSpec>,
        #[serde(default)]
        min_length: Option<usize>,
        #[serde(default)]
        max_length: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatSpec {
    Email,
    Uuid,
    Url,
    Datetime,
}

impl From<FormatSpec> for StringFormat {
    fn from(spec: FormatSpec) -> Self {
        match spec {
            FormatSpec::Email => StringFormat::Email,
            FormatSpec::Uuid => StringFormat::Uuid,
            FormatSpec::Url => StringFormat::Url,
            FormatSpec::Datetime => StringFormat::DateTime,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownKeysSpec {
    #[default]
    Strip,
    Strict,
    Passthrough,
}

impl From<UnknownKeysSpec> for UnknownKeys {
    fn from(spec: UnknownKeysSpec) -> Self {
        match spec {
            UnknownKeysSpec::Strip => UnknownKeys::Strip,
            UnknownKeysSpec::Strict => UnknownKeys::Strict,
            UnknownKeysSpec::Passthrough => UnknownKeys::Passthrough,
        }
    }
}

/// Declared refinement
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefineSpec {
    /// `[left, right]`: both fields must hold equal values
    FieldsMatch([String; 2]),
}

impl RefineSpec {
    fn compile(&self) -> Refinement {
        match self {
            RefineSpec::FieldsMatch([left, right]) => Refinement::fields_match(left, right),
        }
    }
}

/// Any present value, `null` included
fn declared_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Keeps object fields in file order
fn ordered_fields<'de, D>(deserializer: D) -> Result<Vec<(String, SchemaSpec)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct FieldsVisitor;

    impl<'de> Visitor<'de> for FieldsVisitor {
        type Value = Vec<(String, SchemaSpec)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of field names to schemas")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut fields = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, spec)) = map.next_entry::<String, SchemaSpec>()? {
                fields.push((name, spec));
            }
            Ok(fields)
        }
    }

    deserializer.deserialize_map(FieldsVisitor)
}

impl SchemaSpec {
    /// Parses a declaration from JSON text
    pub fn from_json(text: &str) -> SchemaResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| SchemaError::misconfigured(format!("invalid schema declaration: {}", e)))
    }

    /// Compiles the declaration into a schema.
    ///
    /// Wrappers are applied innermost first: refinements, nullable,
    /// optional, default. A default therefore always fills absent input.
    pub fn compile(&self) -> SchemaResult<Schema> {
        let mut schema = self.kind.compile()?;

        for refinement in &self.refine {
            schema = schema.refine(refinement.compile());
        }
        if self.nullable {
            schema = schema.nullable();
        }
        if self.optional {
            schema = schema.optional();
        }
        match (&self.default, self.default_now) {
            (Some(_), true) => {
                return Err(SchemaError::misconfigured(
                    "'default' and 'default_now' are mutually exclusive",
                ))
            }
            (Some(value), false) => schema = schema.with_default(DefaultValue::literal(value.clone())),
            (None, true) => schema = schema.with_default(DefaultValue::now()),
            (None, false) => {}
        }
        Ok(schema)
    }
}

impl TypeSpec {
    fn compile(&self) -> SchemaResult<Schema> {
        match self {
            TypeSpec::String {
                min_length,
                max_length,
                length,
                pattern,
                format,
            } => {
                let mut builder = Schema::string();
                if let Some(n) = min_length {
                    builder = builder.min_length(*n);
                }
                if let Some(n) = max_length {
                    builder = builder.max_length(*n);
                }
                if let Some(n) = length {
                    builder = builder.length(*n);
                }
                if let Some(p) = pattern {
                    builder = builder.pattern(p);
                }
                if let Some(f) = format {
                    builder = builder.format((*f).into());
                }
                builder.build()
            }
            TypeSpec::Number {
                min,
                max,
                integer,
                positive,
                non_negative,
                multiple_of,
            } => {
                let mut builder = Schema::number();
                if *integer {
                    builder = builder.integer();
                }
                if *positive {
                    builder = builder.positive();
                }
                if *non_negative {
                    builder = builder.non_negative();
                }
                if let Some(n) = min {
                    builder = builder.min(*n);
                }
                if let Some(n) = max {
                    builder = builder.max(*n);
                }
                if let Some(step) = multiple_of {
                    builder = builder.multiple_of(*step);
                }
                builder.build()
            }
            TypeSpec::Boolean => Ok(Schema::boolean()),
            TypeSpec::Date => Ok(Schema::date()),
            TypeSpec::Enum { members } => Schema::enumeration(members.iter().cloned()),
            TypeSpec::Object {
                fields,
                unknown_keys,
            } => {
                let mut builder = Schema::object().unknown_keys((*unknown_keys).into());
                for (name, spec) in fields {
                    let field = spec.compile().map_err(|e| {
                        SchemaError::misconfigured(format!("field '{}': {}", name, e.message()))
                    })?;
                    builder = builder.field(name.clone(), field);
                }
                builder.build()
            }
            TypeSpec::Array {
                items,
                min_length,
                max_length,
            } => {
                let mut builder = Schema::array(items.compile()?);
                if let Some(n) = min_length {
                    builder = builder.min_length(*n);
                }
                if let Some(n) = max_length {
                    builder = builder.max_length(*n);
                }
                builder.build()
            }
        }
    }
}

/// Loads a single schema file
pub fn load_schema_file(path: &Path) -> SchemaResult<Schema> {
    let content = fs::read_to_string(path).map_err(|e| {
        SchemaError::file_invalid(path.display().to_string(), format!("Failed to read file: {}", e))
    })?;

    let spec: SchemaSpec = serde_json::from_str(&content).map_err(|e| {
        SchemaError::file_invalid(path.display().to_string(), format!("Invalid JSON: {}", e))
    })?;

    spec.compile()
        .map_err(|e| e.in_file(path.display().to_string()))
}

/// Named schemas loaded from a directory of `*.json` files
pub struct SchemaRegistry {
    schema_dir: PathBuf,
    schemas: HashMap<String, Schema>,
}

impl SchemaRegistry {
    /// Creates an empty registry reading from `schema_dir`
    pub fn new(schema_dir: impl Into<PathBuf>) -> Self {
        Self {
            schema_dir: schema_dir.into(),
            schemas: HashMap::new(),
        }
    }

    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Loads every `*.json` file in the schema directory.
    ///
    /// Returns the number of schemas loaded. A missing directory loads
    /// nothing; any unreadable or misconfigured file fails the load.
    pub fn load_all(&mut self) -> SchemaResult<usize> {
        if !self.schema_dir.exists() {
            return Ok(0);
        }

        let entries = fs::read_dir(&self.schema_dir).map_err(|e| {
            SchemaError::file_invalid(
                self.schema_dir.display().to_string(),
                format!("Failed to read schema directory: {}", e),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::file_invalid(
                    self.schema_dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }
        // Directory order is platform dependent
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            let shown = path.display().to_string();
            let schema = load_schema_file(&path).map_err(|e| {
                log_event_with_fields(
                    Event::SchemaRejected,
                    &[("path", shown.as_str()), ("reason", e.message())],
                );
                e
            })?;
            self.register(name, schema)?;
            loaded += 1;
        }

        let count = loaded.to_string();
        let dir = self.schema_dir.display().to_string();
        log_event_with_fields(
            Event::SchemasLoaded,
            &[("count", count.as_str()), ("dir", dir.as_str())],
        );

        Ok(loaded)
    }

    /// Registers a schema under `name`. Names are never overwritten.
    pub fn register(&mut self, name: impl Into<String>, schema: Schema) -> SchemaResult<()> {
        let name = name.into();
        if self.schemas.contains_key(&name) {
            return Err(SchemaError::duplicate(name));
        }
        self.schemas.insert(name, schema);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
