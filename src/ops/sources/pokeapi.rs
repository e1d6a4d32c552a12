use crate::prelude::*;

use crate::base::schema::{ArraySchema, EnrichedValueType, FieldSchema, StructSchema, ValueType};
use crate::ops::interface::*;
use async_stream::stream;
use std::time::Duration;

/// Source connector for the public PokeAPI (<https://pokeapi.co>).
/// The API is unauthenticated, so no connection options are required.
pub struct PokeApiConnector {
    client: reqwest::Client,
    base_url: String,
}

impl PokeApiConnector {
    const BASE_URL: &'static str = "https://pokeapi.co/api/v2";
    const TABLE_NAME: &'static str = "pokemon";
    /// Highest pokemon id the API serves, as of the Gen 9 catalog.
    const MAX_POKEMON_ID: i64 = 1025;
    /// Number of records covered by one read window.
    const BATCH_SIZE: i64 = 50;
    const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new() -> Result<Self> {
        Self::with_base_url(Self::BASE_URL)
    }

    /// Point the connector at a different endpoint, e.g. a local stub or a
    /// caching proxy.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Self::FETCH_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn ensure_known_table(&self, table_name: &str) -> Result<()> {
        if table_name != Self::TABLE_NAME {
            config_bail!("Unknown table: {table_name}");
        }
        Ok(())
    }

    async fn fetch_pokemon(
        client: &reqwest::Client,
        base_url: &str,
        id: i64,
    ) -> Result<serde_json::Value> {
        let url = format!("{}/pokemon/{}/", base_url, id);
        let response = client.get(&url).send().await?;
        if !response.status().is_success() {
            bail!("PokeAPI returned {} for {}", response.status(), url);
        }
        Ok(response.json::<serde_json::Value>().await?)
    }
}

#[async_trait]
impl SourceConnector for PokeApiConnector {
    fn list_tables(&self) -> Vec<TableName> {
        vec![Self::TABLE_NAME.to_string()]
    }

    async fn get_table_schema(
        &self,
        table_name: &str,
        _options: &TableOptions,
    ) -> Result<EnrichedValueType> {
        self.ensure_known_table(table_name)?;
        Ok(pokemon_schema())
    }

    async fn read_table_metadata(
        &self,
        table_name: &str,
        _options: &TableOptions,
    ) -> Result<TableMetadata> {
        self.ensure_known_table(table_name)?;
        Ok(TableMetadata {
            primary_keys: vec!["id".to_string()],
            ingestion_type: IngestionType::Snapshot,
        })
    }

    async fn read_table(
        &self,
        table_name: &str,
        start_offset: Option<SourceOffset>,
        _options: &TableOptions,
    ) -> Result<TableRead<'async_trait>> {
        self.ensure_known_table(table_name)?;

        let first_id = start_offset
            .map_or(0, |offset| offset.last_id)
            .saturating_add(1);
        if first_id > Self::MAX_POKEMON_ID {
            // Past the end of the catalog. Leave the offset untouched.
            return Ok(TableRead {
                records: stream::empty().boxed(),
                next_offset: start_offset,
            });
        }

        let last_id = (first_id + Self::BATCH_SIZE - 1).min(Self::MAX_POKEMON_ID);
        debug!("Reading pokemon ids {} to {}", first_id, last_id);

        // The stream captures owned state only; it holds no borrow of the
        // connector while the caller drives it.
        let client = self.client.clone();
        let base_url = self.base_url.clone();
        let records = stream! {
            for id in first_id..=last_id {
                match Self::fetch_pokemon(&client, &base_url, id).await {
                    Ok(record) => yield record,
                    Err(err) => warn!("Failed to fetch pokemon {}, skipping: {:#}", id, err),
                }
            }
        }
        .boxed();

        Ok(TableRead {
            records,
            next_offset: Some(SourceOffset { last_id }),
        })
    }
}

fn field(name: &str, typ: ValueType) -> FieldSchema {
    FieldSchema::new(name, EnrichedValueType::new(typ).with_nullable(true))
}

fn struct_of(fields: Vec<FieldSchema>) -> ValueType {
    ValueType::Struct(StructSchema::new(fields))
}

fn array_of(element: ValueType) -> ValueType {
    ValueType::Array(ArraySchema::new(
        EnrichedValueType::new(element).with_nullable(true),
    ))
}

/// A `{name, url}` reference to another API resource. Recurs throughout the
/// pokemon payload.
fn named_resource() -> ValueType {
    struct_of(vec![
        field("name", ValueType::Str),
        field("url", ValueType::Str),
    ])
}

fn pokemon_schema() -> EnrichedValueType {
    let ability = struct_of(vec![
        field("is_hidden", ValueType::Bool),
        field("slot", ValueType::Int64),
        field("ability", named_resource()),
    ]);
    let type_slot = struct_of(vec![
        field("slot", ValueType::Int64),
        field("type", named_resource()),
    ]);
    let stat = struct_of(vec![
        field("stat", named_resource()),
        field("effort", ValueType::Int64),
        field("base_stat", ValueType::Int64),
    ]);
    let move_version = struct_of(vec![
        field("move_learn_method", named_resource()),
        field("version_group", named_resource()),
        field("level_learned_at", ValueType::Int64),
    ]);
    let pokemon_move = struct_of(vec![
        field("move", named_resource()),
        field("version_group_details", array_of(move_version)),
    ]);
    let held_item_version = struct_of(vec![
        field("version", named_resource()),
        field("rarity", ValueType::Int64),
    ]);
    let held_item = struct_of(vec![
        field("item", named_resource()),
        field("version_details", array_of(held_item_version)),
    ]);
    let game_index = struct_of(vec![
        field("game_index", ValueType::Int64),
        field("version", named_resource()),
    ]);
    let sprites = struct_of(vec![
        field("front_default", ValueType::Str),
        field("front_shiny", ValueType::Str),
        field("front_female", ValueType::Str),
        field("front_shiny_female", ValueType::Str),
        field("back_default", ValueType::Str),
        field("back_shiny", ValueType::Str),
        field("back_female", ValueType::Str),
        field("back_shiny_female", ValueType::Str),
    ]);
    let cries = struct_of(vec![
        field("latest", ValueType::Str),
        field("legacy", ValueType::Str),
    ]);

    EnrichedValueType::new(struct_of(vec![
        // `id` is the primary key and the only non-nullable field.
        FieldSchema::new("id", EnrichedValueType::new(ValueType::Int64)),
        field("name", ValueType::Str),
        field("base_experience", ValueType::Int64),
        field("height", ValueType::Int64),
        field("is_default", ValueType::Bool),
        field("order", ValueType::Int64),
        field("weight", ValueType::Int64),
        field("abilities", array_of(ability)),
        field("forms", array_of(named_resource())),
        field("game_indices", array_of(game_index)),
        field("held_items", array_of(held_item)),
        field("location_area_encounters", ValueType::Str),
        field("moves", array_of(pokemon_move)),
        field("sprites", sprites),
        field("cries", cries),
        field("species", named_resource()),
        field("stats", array_of(stat)),
        field("types", array_of(type_slot)),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    fn connector() -> PokeApiConnector {
        // Unroutable port: offset arithmetic must not touch the network.
        PokeApiConnector::with_base_url("http://127.0.0.1:1").unwrap()
    }

    fn options() -> TableOptions {
        TableOptions::new()
    }

    fn field_type<'a>(schema: &'a StructSchema, name: &str) -> &'a EnrichedValueType {
        &schema
            .fields
            .iter()
            .find(|f| f.name == name)
            .unwrap_or_else(|| panic!("missing field {name}"))
            .value_type
    }

    #[test]
    fn test_list_tables() {
        assert_eq!(connector().list_tables(), vec!["pokemon".to_string()]);
    }

    #[tokio::test]
    async fn test_schema_top_level_fields() {
        let schema = connector()
            .get_table_schema("pokemon", &options())
            .await
            .unwrap();
        assert!(!schema.nullable);
        let ValueType::Struct(root) = &schema.typ else {
            panic!("pokemon schema must be a struct, got {schema}");
        };

        let names: Vec<&str> = root.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "id",
                "name",
                "base_experience",
                "height",
                "is_default",
                "order",
                "weight",
                "abilities",
                "forms",
                "game_indices",
                "held_items",
                "location_area_encounters",
                "moves",
                "sprites",
                "cries",
                "species",
                "stats",
                "types",
            ]
        );

        for field in &root.fields {
            if field.name == "id" {
                assert!(!field.value_type.nullable, "id must be non-nullable");
                assert_eq!(field.value_type.typ, ValueType::Int64);
            } else {
                assert!(
                    field.value_type.nullable,
                    "field {} must be nullable",
                    field.name
                );
            }
        }
    }

    #[tokio::test]
    async fn test_schema_nested_shapes() {
        let schema = connector()
            .get_table_schema("pokemon", &options())
            .await
            .unwrap();
        let ValueType::Struct(root) = &schema.typ else {
            panic!("pokemon schema must be a struct");
        };

        let abilities = field_type(root, "abilities");
        let ValueType::Array(array) = &abilities.typ else {
            panic!("abilities must be an array");
        };
        let ValueType::Struct(ability) = &array.element.typ else {
            panic!("abilities elements must be structs");
        };
        assert_eq!(ability.fields.len(), 3);
        assert_eq!(
            field_type(ability, "ability").to_string(),
            "Struct(name: Str?, url: Str?)?"
        );

        let ValueType::Struct(sprites) = &field_type(root, "sprites").typ else {
            panic!("sprites must be a struct");
        };
        assert_eq!(sprites.fields.len(), 8);

        let ValueType::Struct(cries) = &field_type(root, "cries").typ else {
            panic!("cries must be a struct");
        };
        assert_eq!(cries.fields.len(), 2);

        assert_eq!(
            field_type(root, "species").to_string(),
            "Struct(name: Str?, url: Str?)?"
        );
    }

    #[tokio::test]
    async fn test_read_table_metadata() {
        let metadata = connector()
            .read_table_metadata("pokemon", &options())
            .await
            .unwrap();
        assert_eq!(metadata.primary_keys, vec!["id".to_string()]);
        assert_eq!(metadata.ingestion_type, IngestionType::Snapshot);
    }

    #[tokio::test]
    async fn test_unknown_table_is_config_error() {
        let connector = connector();
        let opts = options();

        let err = connector
            .get_table_schema("berries", &opts)
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
        assert!(err.to_string().contains("berries"));

        let err = connector
            .read_table_metadata("berries", &opts)
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());

        let err = connector.read_table("berries", None, &opts).await.unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }

    #[tokio::test]
    async fn test_first_window_offset() {
        let connector = connector();
        let opts = options();
        let read = connector.read_table("pokemon", None, &opts).await.unwrap();
        assert_eq!(read.next_offset, Some(SourceOffset { last_id: 50 }));
    }

    #[tokio::test]
    async fn test_mid_window_offset() {
        let connector = connector();
        let opts = options();
        let read = connector
            .read_table("pokemon", Some(SourceOffset { last_id: 120 }), &opts)
            .await
            .unwrap();
        assert_eq!(read.next_offset, Some(SourceOffset { last_id: 170 }));
    }

    #[tokio::test]
    async fn test_final_window_is_clamped() {
        let connector = connector();
        let opts = options();
        let read = connector
            .read_table("pokemon", Some(SourceOffset { last_id: 1000 }), &opts)
            .await
            .unwrap();
        assert_eq!(read.next_offset, Some(SourceOffset { last_id: 1025 }));
    }

    #[tokio::test]
    async fn test_exhausted_offset_is_echoed() {
        let connector = connector();
        let opts = options();

        let mut read = connector
            .read_table("pokemon", Some(SourceOffset { last_id: 1025 }), &opts)
            .await
            .unwrap();
        assert_eq!(read.next_offset, Some(SourceOffset { last_id: 1025 }));
        assert_eq!(read.records.next().await, None);

        let read = connector
            .read_table("pokemon", Some(SourceOffset { last_id: 4000 }), &opts)
            .await
            .unwrap();
        assert_eq!(read.next_offset, Some(SourceOffset { last_id: 4000 }));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_skips_records_but_advances() {
        let connector = connector();
        let opts = options();
        let mut read = connector
            .read_table("pokemon", Some(SourceOffset { last_id: 1023 }), &opts)
            .await
            .unwrap();
        assert_eq!(read.next_offset, Some(SourceOffset { last_id: 1025 }));
        // Both fetches fail with connection refused; the stream just ends.
        assert_eq!(read.records.next().await, None);
    }
}
