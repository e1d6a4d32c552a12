use super::schema;
use schemars::schema::{
    ArrayValidation, InstanceType, Metadata, ObjectValidation, Schema, SchemaObject, SingleOrVec,
};

pub struct ToJsonSchemaOptions {
    /// If true, mark all fields as required.
    /// Use union type (with `null`) for nullable fields instead.
    /// Some downstream consumers reject the schema if a field is not required.
    pub fields_always_required: bool,
}

pub struct JsonSchemaBuilder {
    options: ToJsonSchemaOptions,
}

impl JsonSchemaBuilder {
    pub fn new(options: ToJsonSchemaOptions) -> Self {
        Self { options }
    }

    fn for_struct_schema(&mut self, struct_schema: &schema::StructSchema) -> SchemaObject {
        SchemaObject {
            metadata: Some(Box::new(Metadata {
                description: struct_schema.description.clone(),
                ..Default::default()
            })),
            instance_type: Some(SingleOrVec::Single(Box::new(InstanceType::Object))),
            object: Some(Box::new(ObjectValidation {
                properties: struct_schema
                    .fields
                    .iter()
                    .map(|f| {
                        let mut schema = self.for_enriched_value_type(&f.value_type);
                        if self.options.fields_always_required && f.value_type.nullable {
                            if let Some(instance_type) = &mut schema.instance_type {
                                let mut types = match instance_type {
                                    SingleOrVec::Single(t) => vec![**t],
                                    SingleOrVec::Vec(t) => std::mem::take(t),
                                };
                                types.push(InstanceType::Null);
                                *instance_type = SingleOrVec::Vec(types);
                            }
                        }
                        (f.name.to_string(), schema.into())
                    })
                    .collect(),
                required: struct_schema
                    .fields
                    .iter()
                    .filter(|&f| self.options.fields_always_required || !f.value_type.nullable)
                    .map(|f| f.name.to_string())
                    .collect(),
                additional_properties: Some(Schema::Bool(false).into()),
                ..Default::default()
            })),
            ..Default::default()
        }
    }

    fn for_value_type(&mut self, value_type: &schema::ValueType) -> SchemaObject {
        let mut schema = SchemaObject::default();
        match value_type {
            schema::ValueType::Str => {
                schema.instance_type = Some(SingleOrVec::Single(Box::new(InstanceType::String)));
            }
            schema::ValueType::Bool => {
                schema.instance_type = Some(SingleOrVec::Single(Box::new(InstanceType::Boolean)));
            }
            schema::ValueType::Int64 => {
                schema.instance_type = Some(SingleOrVec::Single(Box::new(InstanceType::Integer)));
            }
            schema::ValueType::Float64 => {
                schema.instance_type = Some(SingleOrVec::Single(Box::new(InstanceType::Number)));
            }
            schema::ValueType::Json => {
                // Can be any value. No type constraint.
            }
            schema::ValueType::Struct(s) => {
                schema = self.for_struct_schema(s);
            }
            schema::ValueType::Array(s) => {
                schema.instance_type = Some(SingleOrVec::Single(Box::new(InstanceType::Array)));
                schema.array = Some(Box::new(ArrayValidation {
                    items: Some(SingleOrVec::Single(Box::new(
                        self.for_enriched_value_type(&s.element).into(),
                    ))),
                    ..Default::default()
                }));
            }
        }
        schema
    }

    pub fn for_enriched_value_type(
        &mut self,
        enriched_value_type: &schema::EnrichedValueType,
    ) -> SchemaObject {
        self.for_value_type(&enriched_value_type.typ)
    }
}
