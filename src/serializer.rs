//! Serialization module for converting OpenAPI documents to YAML or JSON format.
//!
//! Formatting is a pure step over an assembled [`OpenApiDocument`]; writing
//! the text to disk is kept separate in [`write_to_file`].

use crate::error::Result;
use crate::openapi_builder::OpenApiDocument;
use anyhow::Context;
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes an OpenAPI document to YAML format.
///
/// # Errors
///
/// Returns [`Error::SerializationError`](crate::error::Error::SerializationError)
/// if serialization fails.
pub fn serialize_yaml(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to YAML");
    Ok(serde_yaml::to_string(doc)?)
}

/// Serializes an OpenAPI document to pretty-printed JSON.
///
/// # Example
///
/// ```
/// use openapi_from_annotations::config::GenerationConfig;
/// use openapi_from_annotations::openapi_builder::generate;
/// use openapi_from_annotations::serializer::serialize_json;
/// use openapi_from_annotations::store::MetadataStore;
///
/// let doc = generate(&GenerationConfig::new("Pets", "1.0.0"), &MetadataStore::new(), &[]);
/// let json = serialize_json(&doc).unwrap();
/// assert!(json.contains("\"openapi\": \"3.0.0\""));
/// ```
pub fn serialize_json(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to JSON");
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Writes string content to a file, creating parent directories as needed.
pub fn write_to_file(content: &str, path: &Path) -> anyhow::Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
