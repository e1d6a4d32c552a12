//! Source connector exposing the public PokeAPI (<https://pokeapi.co>) as a
//! paginated, schema-described table provider.

mod prelude;

pub mod base;
pub mod error;
pub mod ops;

// Flat re-exports: the public API surface
pub use base::json_schema::{JsonSchemaBuilder, ToJsonSchemaOptions};
pub use base::schema::{
    ArraySchema, EnrichedValueType, FieldName, FieldSchema, StructSchema, ValueType,
};
pub use error::ConfigError;
pub use ops::interface::{
    IngestionType, SourceConnector, SourceOffset, TableMetadata, TableName, TableOptions, TableRead,
};
pub use ops::sources::pokeapi::PokeApiConnector;
