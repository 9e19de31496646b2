use crate::config::GenerationConfig;
use crate::inference::resolve_route;
use crate::metadata::{
    BodyMetadata, Handler, HandlerMetadata, HttpMethod, OperationMetadata, ParameterMetadata,
    ResponseMetadata, SecurityMetadata, TagMetadata,
};
use crate::schema_mapper::{Schema, SchemaMapper};
use crate::store::{self, MetadataStore};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Security requirement: scheme name -> required scopes
pub type SecurityRequirement = BTreeMap<String, Vec<String>>;

/// OpenAPI document builder.
///
/// Turns handler metadata into path items one handler at a time, then
/// assembles the final document with [`OpenApiBuilder::build`].
pub struct OpenApiBuilder<'a> {
    config: &'a GenerationConfig,
    /// Paths collection (URL path -> PathItem)
    paths: BTreeMap<String, PathItem>,
    mapper: SchemaMapper,
    /// Tag definitions contributed by handler tag metadata
    handler_tags: Vec<Tag>,
    security_schemes: BTreeMap<String, SecurityScheme>,
}

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
}

impl Info {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            description: None,
            terms_of_service: None,
            contact: None,
            license: None,
        }
    }
}

impl Default for Info {
    fn default() -> Self {
        Self::new("Generated API", "1.0.0")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// OpenAPI Server object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI Tag object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
}

/// OpenAPI External Documentation object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalDocs {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI PathItem object - represents all operations for a single path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
}

impl PathItem {
    /// Operation recorded under `method`
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
        }
    }

    /// All operations with their methods, in get/post/put/delete/patch order
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        [
            (HttpMethod::Get, &self.get),
            (HttpMethod::Post, &self.post),
            (HttpMethod::Put, &self.put),
            (HttpMethod::Delete, &self.delete),
            (HttpMethod::Patch, &self.patch),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
    }

    fn set(&mut self, method: HttpMethod, operation: Operation) {
        let slot = match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Patch => &mut self.patch,
        };
        if slot.is_some() {
            debug!("Replacing existing {} operation", method);
        }
        *slot = Some(operation);
    }
}

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Path parameters followed by query parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Responses keyed by stringified status code
    pub responses: BTreeMap<String, Response>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// Parameter location (path or query)
    #[serde(rename = "in")]
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    pub schema: Schema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    pub content: BTreeMap<String, MediaType>,
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: Schema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, Header>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<BTreeMap<String, MediaType>>,
}

/// OpenAPI Header object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schema: Schema,
}

/// OpenAPI Security Scheme object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
}

/// OpenAPI Components object; empty unless hoisting options are enabled
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schemas: Option<BTreeMap<String, Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_schemes: Option<BTreeMap<String, SecurityScheme>>,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    pub info: Info,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,
    pub paths: BTreeMap<String, PathItem>,
    #[serde(default)]
    pub components: Components,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
}

/// Assemble a document from `handlers`, in order, reading their metadata from `store`.
///
/// Handlers without operation metadata are skipped. When two handlers
/// resolve to the same path and method, the later one wins.
pub fn generate(
    config: &GenerationConfig,
    store: &MetadataStore,
    handlers: &[Handler],
) -> OpenApiDocument {
    let mut builder = OpenApiBuilder::new(config);
    for handler in handlers {
        builder.add_handler(handler, &store.aggregate(handler.id()));
    }
    builder.build()
}

/// [`generate`] against the process-wide store.
///
/// This locks [`store::global`] for the duration of the call. The lock is not
/// reentrant: a caller still holding a guard from [`store::global`] on the same
/// thread deadlocks, so drop it first (or call [`generate`] with that guard).
pub fn generate_from_global(config: &GenerationConfig, handlers: &[Handler]) -> OpenApiDocument {
    let store = store::global();
    generate(config, &store, handlers)
}

impl<'a> OpenApiBuilder<'a> {
    pub fn new(config: &'a GenerationConfig) -> Self {
        debug!("Initializing OpenApiBuilder for {}", config.info.title);
        let mapper = if config.options.hoist_schemas {
            SchemaMapper::hoisting()
        } else {
            SchemaMapper::new()
        };
        Self {
            config,
            paths: BTreeMap::new(),
            mapper,
            handler_tags: Vec::new(),
            security_schemes: BTreeMap::new(),
        }
    }

    /// Add one handler's operation to the document.
    ///
    /// Returns `false` when the handler has no operation metadata and was skipped.
    pub fn add_handler(&mut self, handler: &Handler, metadata: &HandlerMetadata) -> bool {
        let Some(operation_meta) = &metadata.operation else {
            debug!("Skipping {}: no operation metadata", handler.name());
            return false;
        };

        let (path, method) = resolve_route(handler.name(), metadata.route.as_ref());
        let path = self.prefix_base_path(&path);
        debug!("Adding handler {}: {} {}", handler.name(), method, path);

        let operation = self.build_operation(operation_meta, metadata);
        self.collect_tags(&metadata.tags);

        self.paths.entry(path).or_default().set(method, operation);
        true
    }

    fn build_operation(
        &mut self,
        operation_meta: &OperationMetadata,
        metadata: &HandlerMetadata,
    ) -> Operation {
        let mut tags = operation_meta.tags.clone();
        for tag in &metadata.tags {
            if !tags.contains(&tag.name) {
                tags.push(tag.name.clone());
            }
        }

        let parameters: Vec<Parameter> = metadata
            .params
            .iter()
            .chain(metadata.queries.iter())
            .map(|p| self.build_parameter(p))
            .collect();

        let request_body = metadata.body.as_ref().map(|b| self.build_request_body(b));
        let responses = self.build_responses(&metadata.responses);
        let security = self.build_security(&metadata.security);

        Operation {
            tags,
            summary: operation_meta.summary.clone(),
            description: operation_meta.description.clone(),
            operation_id: operation_meta.operation_id.clone(),
            parameters: if parameters.is_empty() {
                None
            } else {
                Some(parameters)
            },
            request_body,
            responses,
            deprecated: operation_meta.deprecated,
            security,
        }
    }

    fn build_parameter(&mut self, param: &ParameterMetadata) -> Parameter {
        let schema = self
            .mapper
            .map_with_enum(param.type_ref.as_ref(), param.enum_values.as_deref());
        Parameter {
            name: param.name.clone(),
            location: param.location.as_str().to_string(),
            description: param.description.clone(),
            required: param.required,
            deprecated: param.deprecated,
            schema,
            example: present(&param.example),
        }
    }

    fn build_request_body(&mut self, body: &BodyMetadata) -> RequestBody {
        let schema = match &body.type_ref {
            Some(type_ref) => self.mapper.map(type_ref),
            None => Schema::of_type("object"),
        };
        RequestBody {
            description: body.description.clone(),
            required: body.required,
            content: json_content(schema, present(&body.example)),
        }
    }

    fn build_responses(&mut self, responses: &[ResponseMetadata]) -> BTreeMap<String, Response> {
        let mut built = BTreeMap::new();

        if responses.is_empty() {
            built.insert(
                "200".to_string(),
                Response {
                    description: "Successful response".to_string(),
                    headers: None,
                    content: None,
                },
            );
            return built;
        }

        for response in responses {
            let key = response.status.to_string();
            if built.contains_key(&key) {
                debug!("Ignoring duplicate response for status {}", key);
                continue;
            }
            let response = self.build_response(response);
            built.insert(key, response);
        }
        built
    }

    fn build_response(&mut self, response: &ResponseMetadata) -> Response {
        let content = if let Some(explicit) = &response.content {
            let mut content = BTreeMap::new();
            for (media_type, type_ref) in explicit {
                let schema = self.mapper.map(type_ref);
                content.insert(
                    media_type.clone(),
                    MediaType {
                        schema,
                        example: present(&response.example),
                    },
                );
            }
            Some(content)
        } else {
            response.type_ref.as_ref().map(|type_ref| {
                let schema = self.mapper.map(type_ref);
                json_content(schema, present(&response.example))
            })
        };

        let headers = response.headers.as_ref().map(|headers| {
            headers
                .iter()
                .map(|(name, header)| {
                    let schema = self.mapper.map_with_enum(header.type_ref.as_ref(), None);
                    (
                        name.clone(),
                        Header {
                            description: header.description.clone(),
                            schema,
                        },
                    )
                })
                .collect()
        });

        Response {
            description: response
                .description
                .clone()
                .unwrap_or_else(|| format!("Response {}", response.status)),
            headers,
            content,
        }
    }

    fn build_security(&mut self, security: &[SecurityMetadata]) -> Option<Vec<SecurityRequirement>> {
        if security.is_empty() {
            return None;
        }

        let mut requirements = Vec::with_capacity(security.len());
        for entry in security {
            let name = entry.scheme_name().to_string();
            if self.config.options.emit_security_schemes {
                self.security_schemes
                    .entry(name.clone())
                    .or_insert_with(|| SecurityScheme {
                        scheme_type: entry.scheme_type.as_str().to_string(),
                        name: entry.name.clone(),
                        location: entry.location.clone(),
                        scheme: entry.scheme.clone(),
                    });
            }
            let mut requirement = SecurityRequirement::new();
            requirement.insert(name, entry.scopes.clone().unwrap_or_default());
            requirements.push(requirement);
        }
        Some(requirements)
    }

    fn collect_tags(&mut self, tags: &[TagMetadata]) {
        for tag in tags {
            let configured = self
                .config
                .tags
                .as_ref()
                .is_some_and(|t| t.iter().any(|c| c.name == tag.name));
            let seen = self.handler_tags.iter().any(|t| t.name == tag.name);
            if configured || seen {
                continue;
            }
            self.handler_tags.push(Tag {
                name: tag.name.clone(),
                description: tag.description.clone(),
                external_docs: tag.external_docs_url.as_ref().map(|url| ExternalDocs {
                    url: url.clone(),
                    description: None,
                }),
            });
        }
    }

    fn prefix_base_path(&self, path: &str) -> String {
        match self.config.base_path.as_deref().map(|b| b.trim_end_matches('/')) {
            Some(base) if !base.is_empty() => {
                let base = base.trim_start_matches('/');
                format!("/{}/{}", base, path.trim_start_matches('/'))
                    .trim_end_matches('/')
                    .to_string()
            }
            _ => path.to_string(),
        }
    }

    /// Build the final OpenAPI document
    pub fn build(self) -> OpenApiDocument {
        debug!("Building final OpenAPI document with {} paths", self.paths.len());

        let schemas = self.mapper.into_schemas();
        let components = Components {
            schemas: if schemas.is_empty() { None } else { Some(schemas) },
            security_schemes: if self.security_schemes.is_empty() {
                None
            } else {
                Some(self.security_schemes)
            },
        };

        let mut tags = self.config.tags.clone();
        if !self.handler_tags.is_empty() {
            tags.get_or_insert_with(Vec::new).extend(self.handler_tags);
        }

        OpenApiDocument {
            openapi: "3.0.0".to_string(),
            info: self.config.info.clone(),
            servers: self.config.servers.clone(),
            paths: self.paths,
            components,
            security: self.config.security.clone(),
            tags,
            external_docs: self.config.external_docs.clone(),
        }
    }
}

/// Examples holding JSON `null` are left out
fn present(example: &Option<Value>) -> Option<Value> {
    example.clone().filter(|v| !v.is_null())
}

fn json_content(schema: Schema, example: Option<Value>) -> BTreeMap<String, MediaType> {
    let mut content = BTreeMap::new();
    content.insert(
        "application/json".to_string(),
        MediaType { schema, example },
    );
    content
}
