//! Annotation-driven OpenAPI 3.0 document generation.
//!
//! Handlers are registered with a [`store::MetadataStore`] and described by
//! annotations (operation, parameters, body, responses, security, tags and an
//! optional explicit route). The assembler then walks the handlers and
//! produces an [`openapi_builder::OpenApiDocument`], inferring path and
//! method from the handler name whenever no route is given.
//!
//! # Architecture
//!
//! 1. [`metadata`] - Metadata records and handler identity
//! 2. [`store`] - Per-handler side table with ordered sequence counters
//! 3. [`annotations`] - Options types and the [`annotations::Annotator`] that commits them
//! 4. [`inference`] - Path and method heuristics from handler names
//! 5. [`schema_mapper`] - Type references to OpenAPI schemas
//! 6. [`openapi_builder`] - Document assembly
//! 7. [`validator`] - Structural checks on an assembled document
//! 8. [`serializer`] - JSON and YAML output
//!
//! Source discovery ([`scanner`], [`parser`], [`discovery`]) reads
//! `#[api_*]` attributes out of Rust files, and [`cli`] ties everything
//! together for the command-line tool.
//!
//! # Example Usage
//!
//! ```
//! use openapi_from_annotations::annotations::{ApiOperation, ApiParam, ApiResponse};
//! use openapi_from_annotations::config::GenerationConfig;
//! use openapi_from_annotations::openapi_builder::generate;
//! use openapi_from_annotations::schema_mapper::TypeReference;
//! use openapi_from_annotations::serializer::serialize_yaml;
//! use openapi_from_annotations::store::MetadataStore;
//!
//! let mut store = MetadataStore::new();
//! let get_user = store.register("getUserHandler");
//! let helper = store.register("formatName");
//!
//! store
//!     .annotate(&get_user)
//!     .operation(ApiOperation::new("Get user by ID"))
//!     .param(ApiParam::new("userId").type_ref(TypeReference::primitive("string")))
//!     .response(ApiResponse::new(200).type_ref(TypeReference::primitive("object")))
//!     .response(ApiResponse::new(404).description("User not found"));
//!
//! let config = GenerationConfig::new("User API", "1.0.0");
//! let document = generate(&config, &store, &[get_user, helper]);
//!
//! assert_eq!(document.paths.len(), 1);
//! assert!(document.paths.contains_key("/get-user"));
//! println!("{}", serialize_yaml(&document).unwrap());
//! ```

pub mod annotations;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod inference;
pub mod metadata;
pub mod openapi_builder;
pub mod parser;
pub mod scanner;
pub mod schema_mapper;
pub mod serializer;
pub mod store;
pub mod validator;
