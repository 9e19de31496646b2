//! Annotation application layer.
//!
//! Each annotation turns one options value into one metadata record and
//! commits it to a [`MetadataStore`]. Singular kinds (operation, body, route)
//! overwrite what was there; collection kinds (response, param, query,
//! security, tag) append and keep duplicates.
//!
//! # Example
//!
//! ```
//! use openapi_from_annotations::annotations::{ApiOperation, ApiParam, ApiResponse};
//! use openapi_from_annotations::schema_mapper::TypeReference;
//! use openapi_from_annotations::store::MetadataStore;
//!
//! let mut store = MetadataStore::new();
//! let handler = store.register("getUserHandler");
//!
//! store
//!     .annotate(&handler)
//!     .operation(ApiOperation::new("Get user by ID"))
//!     .param(ApiParam::new("userId").type_ref(TypeReference::primitive("string")))
//!     .response(ApiResponse::new(200).type_ref(TypeReference::primitive("object")))
//!     .response(ApiResponse::new(404).description("User not found"));
//!
//! assert_eq!(store.responses(handler.id()).len(), 2);
//! ```

use crate::metadata::{
    BodyMetadata, Handler, HandlerId, HeaderMetadata, HttpMethod, OperationMetadata,
    ParameterLocation, ParameterMetadata, ResponseMetadata, RouteMetadata, SecurityMetadata,
    SecuritySchemeType, SequenceKind, TagMetadata,
};
use crate::schema_mapper::TypeReference;
use crate::store::MetadataStore;
use log::debug;
use serde_json::Value;
use std::collections::BTreeMap;

/// Options for the operation annotation
#[derive(Debug, Clone, Default)]
pub struct ApiOperation {
    pub summary: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub operation_id: Option<String>,
    pub deprecated: Option<bool>,
}

impl ApiOperation {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = Some(deprecated);
        self
    }
}

/// Options shared by the path parameter and query parameter annotations.
///
/// Leaving `required` unset picks the location default: `true` for path
/// parameters, `false` for query parameters.
#[derive(Debug, Clone, Default)]
pub struct ApiParam {
    pub name: String,
    pub description: Option<String>,
    pub required: Option<bool>,
    pub type_ref: Option<TypeReference>,
    pub example: Option<Value>,
    pub enum_values: Option<Vec<Value>>,
    pub deprecated: Option<bool>,
}

impl ApiParam {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn type_ref(mut self, type_ref: TypeReference) -> Self {
        self.type_ref = Some(type_ref);
        self
    }

    /// A JSON `null` clears the example
    pub fn example(mut self, example: Value) -> Self {
        self.example = Some(example).filter(|v| !v.is_null());
        self
    }

    pub fn enum_values(mut self, values: Vec<Value>) -> Self {
        self.enum_values = Some(values);
        self
    }

    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = Some(deprecated);
        self
    }
}

/// Options for the request body annotation
#[derive(Debug, Clone, Default)]
pub struct ApiBody {
    pub description: Option<String>,
    pub type_ref: Option<TypeReference>,
    pub required: Option<bool>,
    pub example: Option<Value>,
}

impl ApiBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn type_ref(mut self, type_ref: TypeReference) -> Self {
        self.type_ref = Some(type_ref);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    /// A JSON `null` clears the example
    pub fn example(mut self, example: Value) -> Self {
        self.example = Some(example).filter(|v| !v.is_null());
        self
    }
}

/// Options for the response annotation
#[derive(Debug, Clone, Default)]
pub struct ApiResponse {
    pub status: u16,
    pub description: Option<String>,
    pub type_ref: Option<TypeReference>,
    pub example: Option<Value>,
    pub headers: Option<BTreeMap<String, HeaderMetadata>>,
    pub content: Option<BTreeMap<String, TypeReference>>,
}

impl ApiResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn type_ref(mut self, type_ref: TypeReference) -> Self {
        self.type_ref = Some(type_ref);
        self
    }

    /// A JSON `null` clears the example
    pub fn example(mut self, example: Value) -> Self {
        self.example = Some(example).filter(|v| !v.is_null());
        self
    }

    /// Document a response header
    pub fn header(
        mut self,
        name: impl Into<String>,
        description: Option<String>,
        type_ref: Option<TypeReference>,
    ) -> Self {
        self.headers.get_or_insert_with(BTreeMap::new).insert(
            name.into(),
            HeaderMetadata {
                description,
                type_ref,
            },
        );
        self
    }

    /// Declare the payload for an explicit media type
    pub fn content(mut self, media_type: impl Into<String>, type_ref: TypeReference) -> Self {
        self.content
            .get_or_insert_with(BTreeMap::new)
            .insert(media_type.into(), type_ref);
        self
    }
}

/// Options for the security annotation
#[derive(Debug, Clone)]
pub struct ApiSecurity {
    pub scheme_type: SecuritySchemeType,
    pub name: Option<String>,
    pub location: Option<String>,
    pub scheme: Option<String>,
    pub scopes: Option<Vec<String>>,
}

impl ApiSecurity {
    pub fn new(scheme_type: SecuritySchemeType) -> Self {
        Self {
            scheme_type,
            name: None,
            location: None,
            scheme: None,
            scopes: None,
        }
    }

    /// HTTP bearer authentication
    pub fn bearer() -> Self {
        Self::new(SecuritySchemeType::Http).scheme("bearer")
    }

    /// API key read from `location` (`header`, `query` or `cookie`)
    pub fn api_key(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self::new(SecuritySchemeType::ApiKey)
            .name(name)
            .location(location)
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    pub fn scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = Some(scopes);
        self
    }
}

/// Options for the tag annotation
#[derive(Debug, Clone, Default)]
pub struct ApiTag {
    pub name: String,
    pub description: Option<String>,
    pub external_docs_url: Option<String>,
}

impl ApiTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn external_docs_url(mut self, url: impl Into<String>) -> Self {
        self.external_docs_url = Some(url.into());
        self
    }
}

/// Explicit route override. Unset parts fall back to name inference.
#[derive(Debug, Clone, Default)]
pub struct ApiRoute {
    pub method: Option<HttpMethod>,
    pub path: Option<String>,
}

impl ApiRoute {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Applies annotations for one handler to a store
pub struct Annotator<'a> {
    store: &'a mut MetadataStore,
    handler: HandlerId,
}

impl MetadataStore {
    /// Start applying annotations to `handler`
    pub fn annotate(&mut self, handler: &Handler) -> Annotator<'_> {
        Annotator {
            store: self,
            handler: handler.id(),
        }
    }
}

impl Annotator<'_> {
    pub fn operation(&mut self, options: ApiOperation) -> &mut Self {
        debug!("{}: operation \"{}\"", self.handler, options.summary);
        self.store.set_operation(
            self.handler,
            OperationMetadata {
                handler: self.handler,
                summary: options.summary,
                description: options.description,
                tags: options.tags,
                operation_id: options.operation_id,
                deprecated: options.deprecated,
            },
        );
        self
    }

    /// Path parameter; `required` defaults to `true`
    pub fn param(&mut self, options: ApiParam) -> &mut Self {
        let sequence = self.store.next_sequence(SequenceKind::Param);
        debug!("{}: path param {} (#{})", self.handler, options.name, sequence);
        let metadata = parameter(options, ParameterLocation::Path, true, sequence);
        self.store.add_param(self.handler, metadata);
        self
    }

    /// Query parameter; `required` defaults to `false`
    pub fn query(&mut self, options: ApiParam) -> &mut Self {
        let sequence = self.store.next_sequence(SequenceKind::Query);
        debug!("{}: query param {} (#{})", self.handler, options.name, sequence);
        let metadata = parameter(options, ParameterLocation::Query, false, sequence);
        self.store.add_query(self.handler, metadata);
        self
    }

    pub fn body(&mut self, options: ApiBody) -> &mut Self {
        debug!("{}: request body", self.handler);
        self.store.set_body(
            self.handler,
            BodyMetadata {
                description: options.description,
                type_ref: options.type_ref,
                required: options.required,
                example: options.example,
            },
        );
        self
    }

    pub fn response(&mut self, options: ApiResponse) -> &mut Self {
        let sequence = self.store.next_sequence(SequenceKind::Response);
        debug!("{}: response {} (#{})", self.handler, options.status, sequence);
        self.store.add_response(
            self.handler,
            ResponseMetadata {
                status: options.status,
                description: options.description,
                type_ref: options.type_ref,
                example: options.example,
                headers: options.headers,
                content: options.content,
                sequence,
            },
        );
        self
    }

    pub fn security(&mut self, options: ApiSecurity) -> &mut Self {
        let sequence = self.store.next_sequence(SequenceKind::Security);
        debug!(
            "{}: security {} (#{})",
            self.handler,
            options.scheme_type.as_str(),
            sequence
        );
        self.store.add_security(
            self.handler,
            SecurityMetadata {
                scheme_type: options.scheme_type,
                name: options.name,
                location: options.location,
                scheme: options.scheme,
                scopes: options.scopes,
                sequence,
            },
        );
        self
    }

    pub fn tag(&mut self, options: ApiTag) -> &mut Self {
        let sequence = self.store.next_sequence(SequenceKind::Tag);
        debug!("{}: tag {} (#{})", self.handler, options.name, sequence);
        self.store.add_tag(
            self.handler,
            TagMetadata {
                name: options.name,
                description: options.description,
                external_docs_url: options.external_docs_url,
                sequence,
            },
        );
        self
    }

    pub fn route(&mut self, options: ApiRoute) -> &mut Self {
        debug!("{}: explicit route {:?} {:?}", self.handler, options.method, options.path);
        self.store.set_route(
            self.handler,
            RouteMetadata {
                method: options.method,
                path: options.path,
            },
        );
        self
    }
}

fn parameter(
    options: ApiParam,
    location: ParameterLocation,
    default_required: bool,
    sequence: u64,
) -> ParameterMetadata {
    ParameterMetadata {
        name: options.name,
        description: options.description,
        required: options.required.unwrap_or(default_required),
        type_ref: options.type_ref,
        example: options.example,
        enum_values: options.enum_values,
        deprecated: options.deprecated,
        location,
        sequence,
    }
}
