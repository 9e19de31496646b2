//! Documentation metadata records attached to request handlers.
//!
//! Every record here is produced by the annotation layer and owned by the
//! [`MetadataStore`](crate::store::MetadataStore). Handlers themselves hold no
//! back-reference; they are identified by the [`HandlerId`] token handed out
//! at registration.

use crate::schema_mapper::TypeReference;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Stable identity of a registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(pub(crate) u64);

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "handler#{}", self.0)
    }
}

/// A registered request handler: its identity token plus its declared name.
///
/// The declared name feeds the path and method inference heuristics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Handler {
    id: HandlerId,
    name: String,
}

impl Handler {
    pub(crate) fn new(id: HandlerId, name: String) -> Self {
        Self { id, name }
    }

    /// The registration token
    pub fn id(&self) -> HandlerId {
        self.id
    }

    /// The handler's declared name (e.g., "getUserHandler")
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// HTTP methods an operation can be recorded under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    /// HTTP GET method
    Get,
    /// HTTP POST method
    Post,
    /// HTTP PUT method
    Put,
    /// HTTP DELETE method
    Delete,
    /// HTTP PATCH method
    Patch,
}

impl HttpMethod {
    /// Lower-case method name as used for path item keys
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "get" => Ok(HttpMethod::Get),
            "post" => Ok(HttpMethod::Post),
            "put" => Ok(HttpMethod::Put),
            "delete" => Ok(HttpMethod::Delete),
            "patch" => Ok(HttpMethod::Patch),
            other => Err(format!("unsupported HTTP method: {}", other)),
        }
    }
}

/// Where a parameter value is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterLocation {
    /// Path segment (e.g., `/users/{userId}`)
    Path,
    /// Query string (e.g., `?page=1`)
    Query,
}

impl ParameterLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
        }
    }
}

/// Security scheme categories recognised by OpenAPI 3.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecuritySchemeType {
    #[serde(rename = "apiKey")]
    ApiKey,
    #[serde(rename = "http")]
    Http,
    #[serde(rename = "oauth2")]
    OAuth2,
    #[serde(rename = "openIdConnect")]
    OpenIdConnect,
}

impl SecuritySchemeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecuritySchemeType::ApiKey => "apiKey",
            SecuritySchemeType::Http => "http",
            SecuritySchemeType::OAuth2 => "oauth2",
            SecuritySchemeType::OpenIdConnect => "openIdConnect",
        }
    }
}

impl FromStr for SecuritySchemeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apiKey" => Ok(SecuritySchemeType::ApiKey),
            "http" => Ok(SecuritySchemeType::Http),
            "oauth2" => Ok(SecuritySchemeType::OAuth2),
            "openIdConnect" => Ok(SecuritySchemeType::OpenIdConnect),
            other => Err(format!("unknown security scheme type: {}", other)),
        }
    }
}

/// Collection kinds that carry a sequence index.
///
/// Each kind owns an independent counter in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceKind {
    Response,
    Param,
    Query,
    Security,
    Tag,
}

impl SequenceKind {
    pub const ALL: [SequenceKind; 5] = [
        SequenceKind::Response,
        SequenceKind::Param,
        SequenceKind::Query,
        SequenceKind::Security,
        SequenceKind::Tag,
    ];
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationMetadata {
    pub handler: HandlerId,
    pub summary: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub operation_id: Option<String>,
    pub deprecated: Option<bool>,
}

/// One documented response header.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderMetadata {
    pub description: Option<String>,
    pub type_ref: Option<TypeReference>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseMetadata {
    pub status: u16,
    pub description: Option<String>,
    pub type_ref: Option<TypeReference>,
    pub example: Option<Value>,
    pub headers: Option<BTreeMap<String, HeaderMetadata>>,
    /// Explicit media type -> payload type; takes precedence over `type_ref`
    pub content: Option<BTreeMap<String, TypeReference>>,
    pub sequence: u64,
}

/// A path or query parameter. The store keeps the two locations in
/// separate collections with separate counters.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterMetadata {
    pub name: String,
    pub description: Option<String>,
    pub required: bool,
    pub type_ref: Option<TypeReference>,
    pub example: Option<Value>,
    pub enum_values: Option<Vec<Value>>,
    pub deprecated: Option<bool>,
    pub location: ParameterLocation,
    pub sequence: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BodyMetadata {
    pub description: Option<String>,
    pub type_ref: Option<TypeReference>,
    pub required: Option<bool>,
    pub example: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SecurityMetadata {
    pub scheme_type: SecuritySchemeType,
    pub name: Option<String>,
    /// For `apiKey` schemes: `header`, `query` or `cookie`
    pub location: Option<String>,
    /// For `http` schemes: `bearer`, `basic`, ...
    pub scheme: Option<String>,
    pub scopes: Option<Vec<String>>,
    pub sequence: u64,
}

impl SecurityMetadata {
    /// Key used for this scheme in security requirements and components
    pub fn scheme_name(&self) -> &str {
        self.name
            .as_deref()
            .unwrap_or_else(|| self.scheme_type.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TagMetadata {
    pub name: String,
    pub description: Option<String>,
    pub external_docs_url: Option<String>,
    pub sequence: u64,
}

/// Explicit route for a handler, overriding name-based inference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteMetadata {
    pub method: Option<HttpMethod>,
    pub path: Option<String>,
}

/// Everything recorded for one handler, as consumed by the assembler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandlerMetadata {
    pub operation: Option<OperationMetadata>,
    pub params: Vec<ParameterMetadata>,
    pub queries: Vec<ParameterMetadata>,
    pub body: Option<BodyMetadata>,
    pub responses: Vec<ResponseMetadata>,
    pub security: Vec<SecurityMetadata>,
    pub tags: Vec<TagMetadata>,
    pub route: Option<RouteMetadata>,
}

impl HandlerMetadata {
    /// First response recorded for `status`, if any
    pub fn response(&self, status: u16) -> Option<&ResponseMetadata> {
        self.responses.iter().find(|r| r.status == status)
    }
}
