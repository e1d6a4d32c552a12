pub mod json_schema;
pub mod schema;
