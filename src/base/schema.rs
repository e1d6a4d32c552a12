use crate::prelude::*;

use itertools::Itertools;
use std::fmt;

pub type FieldName = String;

/// Type of a single value in a table record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ValueType {
    Str,
    Bool,
    Int64,
    Float64,
    /// Arbitrary JSON value without declared structure.
    Json,
    Struct(StructSchema),
    Array(ArraySchema),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructSchema {
    pub fields: Vec<FieldSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl StructSchema {
    pub fn new(fields: Vec<FieldSchema>) -> Self {
        Self {
            fields,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArraySchema {
    pub element: Box<EnrichedValueType>,
}

impl ArraySchema {
    pub fn new(element: EnrichedValueType) -> Self {
        Self {
            element: Box::new(element),
        }
    }
}

/// A value type with the attributes attached to it, e.g. nullability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedValueType {
    #[serde(rename = "type")]
    pub typ: ValueType,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,
}

impl EnrichedValueType {
    pub fn new(typ: ValueType) -> Self {
        Self {
            typ,
            nullable: false,
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}

/// A named field within a struct schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: FieldName,
    #[serde(flatten)]
    pub value_type: EnrichedValueType,
}

impl FieldSchema {
    pub fn new(name: impl Into<FieldName>, value_type: EnrichedValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Str => write!(f, "Str"),
            ValueType::Bool => write!(f, "Bool"),
            ValueType::Int64 => write!(f, "Int64"),
            ValueType::Float64 => write!(f, "Float64"),
            ValueType::Json => write!(f, "Json"),
            ValueType::Struct(s) => write!(f, "Struct({s})"),
            ValueType::Array(s) => write!(f, "[{}]", s.element),
        }
    }
}

impl fmt::Display for StructSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.fields
                .iter()
                .map(|field| format!("{}: {}", field.name, field.value_type))
                .join(", ")
        )
    }
}

impl fmt::Display for EnrichedValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.typ)?;
        if self.nullable {
            write!(f, "?")?;
        }
        Ok(())
    }
}
