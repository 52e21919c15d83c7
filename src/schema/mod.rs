//! Schema subsystem
//!
//! Immutable, composable descriptions of the shape a value must have.
//!
//! # Design Principles
//!
//! - Schemas are built once and shared across calls and threads
//! - Combinators wrap, they never mutate
//! - Contradictory constraints fail at build time, not at validation time
//! - Schemas may also be declared in JSON files and compiled at startup

mod builder;
mod errors;
mod loader;
mod types;

pub use builder::{ArraySchemaBuilder, NumberSchemaBuilder, ObjectSchemaBuilder, StringSchemaBuilder};
pub use errors::{SchemaError, SchemaErrorCode, SchemaResult};
pub use loader::{
    load_schema_file, FormatSpec, RefineSpec, SchemaRegistry, SchemaSpec, TypeSpec, UnknownKeysSpec,
};
pub use types::{
    ArrayRules, DefaultValue, NumberCheck, NumberRules, ObjectRules, Refinement, Schema,
    SchemaKind, StringCheck, StringFormat, StringRules, UnknownKeys,
};
