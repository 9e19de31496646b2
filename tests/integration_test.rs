use openapi_from_annotations::{
    config::{BehaviorOptions, GenerationConfig},
    discovery::{discover_inputs, Discovery},
    metadata::HttpMethod,
    openapi_builder::{generate, OpenApiDocument, Server},
    serializer::{serialize_json, serialize_yaml},
    store::MetadataStore,
    validator,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

/// Helper function to create a temporary test project
fn create_test_project(files: Vec<(&str, &str)>) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    for (path, content) in files {
        let file_path = temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write test file");
    }

    temp_dir
}

fn fixture_project() -> TempDir {
    create_test_project(vec![
        ("src/handlers/users.rs", include_str!("fixtures/user_api.rs")),
        ("src/handlers/orders.rs", include_str!("fixtures/order_api.rs")),
        ("src/main.rs", "fn main() {}"),
    ])
}

fn discover_project(temp_dir: &TempDir, store: &mut MetadataStore) -> Discovery {
    discover_inputs(&[temp_dir.path().to_path_buf()], store).expect("Failed to discover handlers")
}

fn generate_project(config: &GenerationConfig) -> OpenApiDocument {
    let temp_dir = fixture_project();
    let mut store = MetadataStore::new();
    let discovery = discover_project(&temp_dir, &mut store);
    generate(config, &store, &discovery.handlers)
}

#[test]
fn test_discovery_finds_annotated_handlers() {
    let temp_dir = fixture_project();
    let mut store = MetadataStore::new();

    let discovery = discover_project(&temp_dir, &mut store);

    // orders.rs sorts before users.rs
    let names: Vec<&str> = discovery.handlers.iter().map(|h| h.name()).collect();
    assert_eq!(
        names,
        vec![
            "fetch_order",
            "export_orders",
            "update_order_status",
            "get_user_handler",
            "list_users_handler",
            "create_user_handler",
            "delete_user_handler",
        ]
    );

    // The response with an unknown key is skipped
    assert_eq!(discovery.warnings.len(), 1);
    assert!(discovery.warnings[0].contains("update_order_status"));
}

#[test]
fn test_end_to_end_paths() {
    let document = generate_project(&GenerationConfig::new("Shop API", "1.2.0"));

    let paths: Vec<&str> = document.paths.keys().map(String::as_str).collect();
    assert_eq!(
        paths,
        vec![
            "/create-user",
            "/export-orders",
            "/get-user",
            "/list-users",
            "/orders/{orderId}",
            "/users/{userId}",
        ]
    );

    let orders = &document.paths["/orders/{orderId}"];
    assert!(orders.operation(HttpMethod::Get).is_some());
    assert!(orders.operation(HttpMethod::Put).is_some());
    assert!(document.paths["/create-user"].post.is_some());
    assert!(document.paths["/users/{userId}"].delete.is_some());
}

#[test]
fn test_end_to_end_get_user_operation() {
    let document = generate_project(&GenerationConfig::new("Shop API", "1.2.0"));
    let json: serde_json::Value =
        serde_json::from_str(&serialize_json(&document).unwrap()).unwrap();

    let operation = &json["paths"]["/get-user"]["get"];
    assert_eq!(operation["summary"], "Get user by ID");
    assert_eq!(operation["tags"], json!(["users"]));
    assert_eq!(
        operation["parameters"],
        json!([{
            "name": "userId",
            "in": "path",
            "description": "User ID",
            "required": true,
            "schema": {"type": "string"}
        }])
    );
    assert_eq!(
        operation["responses"]["200"]["content"]["application/json"]["schema"],
        json!({
            "type": "object",
            "properties": {
                "emailAddress": {"type": "string"},
                "id": {"type": "string"},
                "name": {"type": "string"},
                "profile": {"type": "object", "description": "Schema for Profile"},
                "roles": {"type": "array", "items": {"type": "string"}}
            },
            "required": ["id", "name", "roles", "profile"]
        })
    );
    assert_eq!(
        operation["responses"]["404"],
        json!({"description": "User not found"})
    );
}

#[test]
fn test_end_to_end_queries_body_and_security() {
    let document = generate_project(&GenerationConfig::new("Shop API", "1.2.0"));

    let list = document.paths["/list-users"].get.as_ref().unwrap();
    assert_eq!(list.operation_id.as_deref(), Some("listUsers"));
    assert_eq!(list.tags, vec!["users"]);
    let parameters = list.parameters.as_ref().unwrap();
    assert_eq!(parameters.len(), 2);
    assert_eq!(parameters[0].name, "page");
    assert_eq!(parameters[0].location, "query");
    assert!(!parameters[0].required);
    assert_eq!(parameters[0].example, Some(json!(1)));
    assert_eq!(
        parameters[1].schema.enum_values,
        Some(vec![json!("asc"), json!("desc")])
    );

    let create = document.paths["/create-user"].post.as_ref().unwrap();
    let body = create.request_body.as_ref().unwrap();
    assert_eq!(body.required, Some(true));
    let media = &body.content["application/json"];
    assert_eq!(media.example, Some(json!({"name": "Ada", "age": 36})));
    assert_eq!(
        media.schema.required,
        Some(vec!["name".to_string(), "age".to_string()])
    );
    assert_eq!(create.responses["400"].description, "Response 400");
    assert_eq!(
        serde_json::to_value(&create.security).unwrap(),
        json!([{"bearerAuth": []}])
    );

    let delete = document.paths["/users/{userId}"].delete.as_ref().unwrap();
    assert_eq!(delete.deprecated, Some(true));
    assert_eq!(
        serde_json::to_value(&delete.security).unwrap(),
        json!([{"X-Api-Key": []}])
    );

    // Security schemes stay out of components unless asked for
    assert!(document.components.security_schemes.is_none());
}

#[test]
fn test_end_to_end_orders() {
    let document = generate_project(&GenerationConfig::new("Shop API", "1.2.0"));

    let update = document.paths["/orders/{orderId}"].put.as_ref().unwrap();
    assert_eq!(update.responses.len(), 1);
    assert_eq!(update.responses["200"].description, "Updated again");

    let export = document.paths["/export-orders"].get.as_ref().unwrap();
    let content = export.responses["200"].content.as_ref().unwrap();
    assert!(content.contains_key("text/csv"));
    assert!(!content.contains_key("application/json"));

    let tags = document.tags.as_ref().unwrap();
    let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["orders", "users"]);
    assert_eq!(
        tags[0].external_docs.as_ref().unwrap().url,
        "https://docs.example.com/orders"
    );
    assert_eq!(tags[1].description.as_deref(), Some("User management"));
}

#[test]
fn test_helpers_without_annotations_are_absent() {
    let document = generate_project(&GenerationConfig::new("Shop API", "1.2.0"));

    assert!(!document.paths.contains_key("/format-user-name"));
    assert!(!document.paths.contains_key("/recalculate"));
}

#[test]
fn test_hoisted_schemas_and_security_schemes() {
    let config = GenerationConfig::new("Shop API", "1.2.0").with_options(BehaviorOptions {
        hoist_schemas: true,
        emit_security_schemes: true,
        strict: false,
    });
    let document = generate_project(&config);

    let schemas = document.components.schemas.as_ref().unwrap();
    let names: Vec<&str> = schemas.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["NewUser", "Order", "User"]);

    let get_user = document.paths["/get-user"].get.as_ref().unwrap();
    let schema = &get_user.responses["200"].content.as_ref().unwrap()["application/json"].schema;
    assert_eq!(schema.reference.as_deref(), Some("#/components/schemas/User"));

    let schemes = document.components.security_schemes.as_ref().unwrap();
    assert_eq!(schemes["bearerAuth"].scheme.as_deref(), Some("bearer"));
    assert_eq!(schemes["X-Api-Key"].location.as_deref(), Some("header"));
}

#[test]
fn test_base_path_and_servers() {
    let config = GenerationConfig::new("Shop API", "1.2.0")
        .with_base_path("/api/v1")
        .with_server(Server {
            url: "https://shop.example.com".to_string(),
            description: None,
        });
    let document = generate_project(&config);

    assert!(document.paths.contains_key("/api/v1/get-user"));
    assert!(document.paths.contains_key("/api/v1/orders/{orderId}"));
    assert_eq!(document.servers.as_ref().unwrap()[0].url, "https://shop.example.com");
}

#[test]
fn test_fixture_document_validates() {
    let document = generate_project(&GenerationConfig::new("Shop API", "1.2.0"));

    let issues = validator::validate(&document);
    assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
}

#[test]
fn test_json_and_yaml_outputs_agree() {
    let document = generate_project(&GenerationConfig::new("Shop API", "1.2.0"));

    let from_json: OpenApiDocument =
        serde_json::from_str(&serialize_json(&document).unwrap()).unwrap();
    let from_yaml: OpenApiDocument =
        serde_yaml::from_str(&serialize_yaml(&document).unwrap()).unwrap();

    assert_eq!(from_json, document);
    assert_eq!(from_yaml, document);
}

#[test]
fn test_broken_file_does_not_stop_generation() {
    let temp_dir = create_test_project(vec![
        ("src/a.rs", "fn broken( {"),
        ("src/b.rs", include_str!("fixtures/user_api.rs")),
    ]);
    let mut store = MetadataStore::new();

    let discovery = discover_project(&temp_dir, &mut store);
    let document = generate(
        &GenerationConfig::new("Users", "1.0.0"),
        &store,
        &discovery.handlers,
    );

    assert_eq!(document.paths.len(), 4);
    assert!(discovery.warnings.iter().any(|w| w.contains("a.rs")));
}

#[test]
fn test_hoisting_keeps_same_named_structs_apart() {
    let temp_dir = create_test_project(vec![
        (
            "src/a_shop.rs",
            r#"
            pub struct Item { pub sku: String }

            #[api_operation(summary = "Get shop item")]
            #[api_response(status = 200, schema = "Item")]
            pub fn get_shop_item() {}
            "#,
        ),
        (
            "src/b_parcels.rs",
            r#"
            pub struct Item { pub weight: f64 }

            #[api_operation(summary = "Get parcel item")]
            #[api_response(status = 200, schema = "Item")]
            pub fn get_parcel_item() {}
            "#,
        ),
    ]);
    let mut store = MetadataStore::new();
    let discovery = discover_project(&temp_dir, &mut store);
    let config = GenerationConfig::new("Items", "1.0.0").with_options(BehaviorOptions {
        hoist_schemas: true,
        ..Default::default()
    });

    let document = generate(&config, &store, &discovery.handlers);
    let json: serde_json::Value =
        serde_json::from_str(&serialize_json(&document).unwrap()).unwrap();

    assert_eq!(
        json["paths"]["/get-parcel-item"]["get"]["responses"]["200"]["content"]
            ["application/json"]["schema"],
        json!({"$ref": "#/components/schemas/Item2"})
    );
    assert_eq!(
        json["components"]["schemas"]["Item"]["properties"],
        json!({"sku": {"type": "string"}})
    );
    assert_eq!(
        json["components"]["schemas"]["Item2"]["properties"],
        json!({"weight": {"type": "number"}})
    );
}
