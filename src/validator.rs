//! Optional post-assembly shape checks.
//!
//! Assembly is lenient and never rejects input; this pass reports the
//! problems OpenAPI tooling would trip over. It is not a meta-schema
//! validator.

use crate::error::{Error, Result};
use crate::openapi_builder::OpenApiDocument;
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt;

/// One problem found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Where the problem is, e.g. `paths./users/{id}.get`
    pub location: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Collect every shape issue in `document`
pub fn validate(document: &OpenApiDocument) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut issue = |location: String, message: &str| {
        issues.push(ValidationIssue {
            location,
            message: message.to_string(),
        })
    };

    if document.info.title.trim().is_empty() {
        issue("info.title".to_string(), "title must not be empty");
    }
    if document.info.version.trim().is_empty() {
        issue("info.version".to_string(), "version must not be empty");
    }

    let mut operation_ids: HashMap<&str, String> = HashMap::new();

    for (path, item) in &document.paths {
        if !path.starts_with('/') {
            issue(format!("paths.{}", path), "path must start with '/'");
        }
        let placeholders = template_placeholders(path);

        for (method, operation) in item.operations() {
            let location = format!("paths.{}.{}", path, method.as_str());

            if operation.summary.trim().is_empty() {
                issue(location.clone(), "summary must not be empty");
            }
            if operation.responses.is_empty() {
                issue(location.clone(), "operation must declare at least one response");
            }

            let path_params: Vec<_> = operation
                .parameters
                .iter()
                .flatten()
                .filter(|p| p.location == "path")
                .collect();

            for param in &path_params {
                if !param.required {
                    issue(
                        format!("{}.parameters.{}", location, param.name),
                        "path parameters must be required",
                    );
                }
            }
            for placeholder in &placeholders {
                if !path_params.iter().any(|p| p.name == *placeholder) {
                    issue(
                        location.clone(),
                        &format!("path placeholder {{{}}} has no matching parameter", placeholder),
                    );
                }
            }

            if let Some(id) = operation.operation_id.as_deref() {
                if let Some(previous) = operation_ids.get(id) {
                    issue(
                        location.clone(),
                        &format!("operationId '{}' already used at {}", id, previous),
                    );
                } else {
                    operation_ids.insert(id, location.clone());
                }
            }
        }
    }

    debug!("Validation found {} issues", issues.len());
    issues
}

/// Fail with [`Error::ValidationFailed`] when `document` has any issue
pub fn ensure_valid(document: &OpenApiDocument) -> Result<()> {
    let issues = validate(document);
    if issues.is_empty() {
        return Ok(());
    }
    for issue in &issues {
        warn!("{}", issue);
    }
    Err(Error::ValidationFailed(
        issues.iter().map(ToString::to_string).collect(),
    ))
}

fn template_placeholders(path: &str) -> Vec<&str> {
    path.split('/')
        .filter_map(|segment| segment.strip_prefix('{')?.strip_suffix('}'))
        .collect()
}
