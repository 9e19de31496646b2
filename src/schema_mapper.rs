use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Declared type information for a parameter, body, or response payload.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeReference {
    /// A primitive type name such as `"string"` or `"integer"`
    Primitive(String),
    /// A structural type identified by name, optionally with an explicit field list
    Named {
        /// Declared type name (e.g., "User")
        name: String,
        /// Explicit fields; `None` keeps the placeholder schema
        fields: Option<Vec<Field>>,
    },
    /// An array whose items are described by the inner reference
    Array(Box<TypeReference>),
}

/// A single field of a [`TypeReference::Named`] reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Property name as it appears in the schema
    pub name: String,
    /// Type of the property
    pub type_ref: TypeReference,
    /// Whether the property is listed under `required`
    pub required: bool,
}

impl TypeReference {
    /// Create a primitive type reference
    pub fn primitive(name: impl Into<String>) -> Self {
        TypeReference::Primitive(name.into())
    }

    /// Create a named reference without fields (placeholder schema)
    pub fn named(name: impl Into<String>) -> Self {
        TypeReference::Named {
            name: name.into(),
            fields: None,
        }
    }

    /// Create a named reference with an explicit field list
    pub fn named_with_fields(name: impl Into<String>, fields: Vec<Field>) -> Self {
        TypeReference::Named {
            name: name.into(),
            fields: Some(fields),
        }
    }

    /// Create an array reference
    pub fn array(items: TypeReference) -> Self {
        TypeReference::Array(Box::new(items))
    }
}

impl Field {
    /// Create a new Field
    pub fn new(name: impl Into<String>, type_ref: TypeReference, required: bool) -> Self {
        Self {
            name: name.into(),
            type_ref,
            required,
        }
    }
}

/// OpenAPI Schema definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// The type of the schema (string, integer, object, array, etc.)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Format hint for primitive types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Human readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Properties for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,
    /// Required property names for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Allowed values
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    /// Reference to a schema under `components.schemas`
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Schema {
    /// A schema with only `type` set
    pub fn of_type(schema_type: &str) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            ..Default::default()
        }
    }

    /// A `$ref` schema pointing into `components.schemas`
    pub fn reference(name: &str) -> Self {
        Self {
            reference: Some(format!("#/components/schemas/{}", name)),
            ..Default::default()
        }
    }
}

/// Schema mapper - converts declared type references to OpenAPI schemas.
///
/// By default every schema is inlined at the point of use. With hoisting
/// enabled, named references that carry an explicit field list are stored
/// once and returned as `$ref` schemas; collect them with
/// [`SchemaMapper::into_schemas`].
#[derive(Debug, Default)]
pub struct SchemaMapper {
    hoist: bool,
    schemas: BTreeMap<String, Schema>,
}

impl SchemaMapper {
    /// Create a mapper that inlines every schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mapper that hoists expanded named schemas into components
    pub fn hoisting() -> Self {
        Self {
            hoist: true,
            schemas: BTreeMap::new(),
        }
    }

    /// Map a type reference to a schema
    pub fn map(&mut self, type_ref: &TypeReference) -> Schema {
        match type_ref {
            TypeReference::Primitive(name) => primitive_schema(name),
            TypeReference::Array(items) => Schema {
                schema_type: Some("array".to_string()),
                items: Some(Box::new(self.map(items))),
                ..Default::default()
            },
            TypeReference::Named { name, fields: None } => {
                debug!("No fields known for {}, using placeholder schema", name);
                placeholder_schema(name)
            }
            TypeReference::Named {
                name,
                fields: Some(fields),
            } => {
                let schema = self.expand_fields(fields);
                if self.hoist {
                    let key = self.component_key(name, schema);
                    Schema::reference(&key)
                } else {
                    schema
                }
            }
        }
    }

    /// Find or claim the components key for `schema`.
    ///
    /// Distinct shapes sharing a type name get numbered keys (`Item2`, ...).
    fn component_key(&mut self, name: &str, schema: Schema) -> String {
        let mut key = name.to_string();
        let mut suffix = 1;
        while let Some(existing) = self.schemas.get(&key) {
            if *existing == schema {
                return key;
            }
            suffix += 1;
            key = format!("{}{}", name, suffix);
        }

        if suffix > 1 {
            warn!(
                "Schema {} conflicts with an earlier definition, hoisting as {}",
                name, key
            );
        } else {
            debug!("Hoisting schema {} into components", name);
        }
        self.schemas.insert(key.clone(), schema);
        key
    }

    /// Map an optional type reference and merge enum values into the result.
    ///
    /// A missing reference resolves to `{type: string}`.
    pub fn map_with_enum(
        &mut self,
        type_ref: Option<&TypeReference>,
        enum_values: Option<&[Value]>,
    ) -> Schema {
        let mut schema = match type_ref {
            Some(type_ref) => self.map(type_ref),
            None => Schema::of_type("string"),
        };
        if let Some(values) = enum_values {
            schema.enum_values = Some(values.to_vec());
        }
        schema
    }

    /// Schemas hoisted so far, keyed by type name
    pub fn schemas(&self) -> &BTreeMap<String, Schema> {
        &self.schemas
    }

    /// Consume the mapper, returning the hoisted schemas
    pub fn into_schemas(self) -> BTreeMap<String, Schema> {
        self.schemas
    }

    fn expand_fields(&mut self, fields: &[Field]) -> Schema {
        let mut properties = BTreeMap::new();
        let mut required = Vec::new();

        for field in fields {
            let property = self.map(&field.type_ref);
            properties.insert(field.name.clone(), property);
            if field.required {
                required.push(field.name.clone());
            }
        }

        Schema {
            schema_type: Some("object".to_string()),
            properties: Some(properties),
            required: if required.is_empty() {
                None
            } else {
                Some(required)
            },
            ..Default::default()
        }
    }
}

/// Convert a primitive type name to a schema, falling back to `string`
fn primitive_schema(name: &str) -> Schema {
    match name {
        "string" | "number" | "integer" | "boolean" | "object" => Schema::of_type(name),
        "array" => Schema {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(Schema::of_type("string"))),
            ..Default::default()
        },
        other => {
            debug!("Unknown type reference: {}, falling back to string", other);
            Schema::of_type("string")
        }
    }
}

fn placeholder_schema(name: &str) -> Schema {
    Schema {
        schema_type: Some("object".to_string()),
        description: Some(format!("Schema for {}", name)),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_primitive_types() {
        let mut mapper = SchemaMapper::new();
        for name in ["string", "number", "integer", "boolean", "object"] {
            let schema = mapper.map(&TypeReference::primitive(name));
            assert_eq!(schema.schema_type.as_deref(), Some(name));
            assert!(schema.items.is_none());
        }
    }

    #[test]
    fn test_array_defaults_items_to_string() {
        let mut mapper = SchemaMapper::new();
        let schema = mapper.map(&TypeReference::primitive("array"));

        assert_eq!(schema.schema_type.as_deref(), Some("array"));
        assert_eq!(schema.items, Some(Box::new(Schema::of_type("string"))));
    }

    #[test]
    fn test_unknown_primitive_falls_back_to_string() {
        let mut mapper = SchemaMapper::new();
        let schema = mapper.map(&TypeReference::primitive("uuid"));
        assert_eq!(schema, Schema::of_type("string"));
    }

    #[test]
    fn test_named_without_fields_is_placeholder() {
        let mut mapper = SchemaMapper::new();
        let schema = mapper.map(&TypeReference::named("User"));

        assert_eq!(schema.schema_type.as_deref(), Some("object"));
        assert_eq!(schema.description.as_deref(), Some("Schema for User"));
        assert!(schema.properties.is_none());
    }

    #[test]
    fn test_named_with_fields_expands_properties() {
        let mut mapper = SchemaMapper::new();
        let user = TypeReference::named_with_fields(
            "User",
            vec![
                Field::new("id", TypeReference::primitive("integer"), true),
                Field::new("nickname", TypeReference::primitive("string"), false),
                Field::new(
                    "roles",
                    TypeReference::array(TypeReference::primitive("string")),
                    true,
                ),
            ],
        );

        let schema = mapper.map(&user);
        let properties = schema.properties.unwrap();

        assert_eq!(properties.len(), 3);
        assert_eq!(properties["id"], Schema::of_type("integer"));
        assert_eq!(properties["roles"].schema_type.as_deref(), Some("array"));
        assert_eq!(
            schema.required,
            Some(vec!["id".to_string(), "roles".to_string()])
        );
        assert!(mapper.schemas().is_empty());
    }

    #[test]
    fn test_hoisting_returns_reference() {
        let mut mapper = SchemaMapper::hoisting();
        let user = TypeReference::named_with_fields(
            "User",
            vec![Field::new("id", TypeReference::primitive("integer"), true)],
        );

        let first = mapper.map(&user);
        let second = mapper.map(&user);

        assert_eq!(first.reference.as_deref(), Some("#/components/schemas/User"));
        assert_eq!(first, second);

        let schemas = mapper.into_schemas();
        assert_eq!(schemas.len(), 1);
        assert!(schemas["User"].properties.is_some());
    }

    #[test]
    fn test_hoisting_same_name_different_shapes() {
        let mut mapper = SchemaMapper::hoisting();
        let shop_item = TypeReference::named_with_fields(
            "Item",
            vec![Field::new("sku", TypeReference::primitive("string"), true)],
        );
        let parcel_item = TypeReference::named_with_fields(
            "Item",
            vec![Field::new("weight", TypeReference::primitive("number"), true)],
        );

        let first = mapper.map(&shop_item);
        let second = mapper.map(&parcel_item);
        let again = mapper.map(&parcel_item);

        assert_eq!(first.reference.as_deref(), Some("#/components/schemas/Item"));
        assert_eq!(second.reference.as_deref(), Some("#/components/schemas/Item2"));
        assert_eq!(again, second);

        let schemas = mapper.into_schemas();
        assert_eq!(schemas.len(), 2);
        assert!(schemas["Item"].properties.as_ref().unwrap().contains_key("sku"));
        assert!(schemas["Item2"].properties.as_ref().unwrap().contains_key("weight"));
    }

    #[test]
    fn test_hoisting_keeps_placeholders_inline() {
        let mut mapper = SchemaMapper::hoisting();
        let schema = mapper.map(&TypeReference::named("Opaque"));

        assert!(schema.reference.is_none());
        assert!(mapper.schemas().is_empty());
    }

    #[test]
    fn test_enum_values_merged_after_mapping() {
        let mut mapper = SchemaMapper::new();
        let values = vec![json!("asc"), json!("desc")];
        let schema =
            mapper.map_with_enum(Some(&TypeReference::primitive("string")), Some(&values));

        assert_eq!(schema.schema_type.as_deref(), Some("string"));
        assert_eq!(schema.enum_values, Some(values));
    }

    #[test]
    fn test_missing_reference_defaults_to_string() {
        let mut mapper = SchemaMapper::new();
        let schema = mapper.map_with_enum(None, None);
        assert_eq!(schema, Schema::of_type("string"));
    }
}
