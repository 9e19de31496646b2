//! Handler discovery from annotated Rust source.
//!
//! Any function or `impl` method carrying at least one `api_*` attribute is a
//! handler. Handlers are registered in source order (files in scan order,
//! items in declaration order) and their attributes are applied top to bottom,
//! so attribute order is the order collection kinds come out in.

pub mod attributes;
pub mod types;

use crate::annotations::Annotator;
use crate::metadata::Handler;
use crate::parser::{AstParser, ParsedFile};
use crate::scanner::FileScanner;
use crate::store::MetadataStore;
use anyhow::Result;
use attributes::{annotation_name, parse_annotation, Annotation};
use log::{debug, info, warn};
use std::path::PathBuf;
use syn::visit::{self, Visit};
use syn::{Attribute, ImplItemFn, ItemFn};
use types::StructIndex;

/// Outcome of a discovery pass
#[derive(Debug, Default)]
pub struct Discovery {
    /// Handlers in registration order
    pub handlers: Vec<Handler>,
    /// Problems that were skipped over (bad files, malformed attributes)
    pub warnings: Vec<String>,
}

/// An annotated function found in a syntax tree
struct AnnotatedFn<'ast> {
    name: String,
    attrs: &'ast [Attribute],
}

#[derive(Default)]
struct HandlerVisitor<'ast> {
    found: Vec<AnnotatedFn<'ast>>,
}

impl<'ast> HandlerVisitor<'ast> {
    fn record(&mut self, ident: &syn::Ident, attrs: &'ast [Attribute]) {
        if attrs.iter().any(|attr| annotation_name(attr).is_some()) {
            self.found.push(AnnotatedFn {
                name: ident.to_string(),
                attrs,
            });
        }
    }
}

impl<'ast> Visit<'ast> for HandlerVisitor<'ast> {
    fn visit_item_fn(&mut self, node: &'ast ItemFn) {
        self.record(&node.sig.ident, &node.attrs);
        visit::visit_item_fn(self, node);
    }

    fn visit_impl_item_fn(&mut self, node: &'ast ImplItemFn) {
        self.record(&node.sig.ident, &node.attrs);
        visit::visit_impl_item_fn(self, node);
    }
}

/// Register every annotated handler in `files` with `store`
pub fn discover(files: &[ParsedFile], store: &mut MetadataStore) -> Discovery {
    let mut discovery = Discovery::default();

    for file in files {
        let types = StructIndex::from_file(&file.syntax_tree);
        let mut visitor = HandlerVisitor::default();
        visitor.visit_file(&file.syntax_tree);

        debug!(
            "{}: {} annotated functions",
            file.path.display(),
            visitor.found.len()
        );

        for found in visitor.found {
            let handler = store.register(found.name);
            let mut annotator = store.annotate(&handler);

            for attr in found.attrs {
                match parse_annotation(attr, &types) {
                    Ok(Some(annotation)) => apply(&mut annotator, annotation),
                    Ok(None) => {}
                    Err(e) => {
                        let warning = format!(
                            "{}: skipping malformed attribute on {}: {}",
                            file.path.display(),
                            handler.name(),
                            e
                        );
                        warn!("{}", warning);
                        discovery.warnings.push(warning);
                    }
                }
            }

            discovery.handlers.push(handler);
        }
    }

    info!("Discovered {} handlers", discovery.handlers.len());
    discovery
}

/// Scan `inputs`, parse every Rust file found and discover its handlers.
///
/// Unreadable or unparsable files become warnings rather than errors.
pub fn discover_inputs(inputs: &[PathBuf], store: &mut MetadataStore) -> Result<Discovery> {
    let scan = FileScanner::new(inputs.to_vec()).scan()?;
    info!("Found {} Rust files", scan.rust_files.len());

    let mut warnings = scan.warnings;
    let mut parsed = Vec::new();
    for result in AstParser::parse_files(&scan.rust_files) {
        match result {
            Ok(file) => parsed.push(file),
            Err(e) => warnings.push(format!("{:#}", e)),
        }
    }

    let mut discovery = discover(&parsed, store);
    warnings.append(&mut discovery.warnings);
    discovery.warnings = warnings;
    Ok(discovery)
}

fn apply(annotator: &mut Annotator<'_>, annotation: Annotation) {
    match annotation {
        Annotation::Operation(options) => annotator.operation(options),
        Annotation::Param(options) => annotator.param(options),
        Annotation::Query(options) => annotator.query(options),
        Annotation::Body(options) => annotator.body(options),
        Annotation::Response(options) => annotator.response(options),
        Annotation::Security(options) => annotator.security(options),
        Annotation::Tag(options) => annotator.tag(options),
        Annotation::Route(options) => annotator.route(options),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{HttpMethod, ParameterLocation};
    use crate::schema_mapper::TypeReference;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn parse(source: &str) -> ParsedFile {
        AstParser::parse_source(Path::new("src/handlers.rs"), source).unwrap()
    }

    #[test]
    fn test_discovers_annotated_functions_only() {
        let file = parse(
            r#"
            #[api_operation(summary = "List users")]
            pub async fn list_users() {}

            pub fn helper() {}

            #[inline]
            pub fn not_a_handler() {}
            "#,
        );
        let mut store = MetadataStore::new();

        let discovery = discover(&[file], &mut store);

        let names: Vec<&str> = discovery.handlers.iter().map(|h| h.name()).collect();
        assert_eq!(names, vec!["list_users"]);
        assert!(discovery.warnings.is_empty());
    }

    #[test]
    fn test_applies_attributes_in_order() {
        let file = parse(
            r#"
            #[api_operation(summary = "Get user by ID", tags("users"))]
            #[api_param(name = "userId", type = "string", description = "User ID")]
            #[api_response(status = 500, description = "Boom")]
            #[api_response(status = 200, schema = "User")]
            #[api_response(status = 404, description = "User not found")]
            pub async fn get_user_handler() {}

            pub struct User {
                pub id: String,
            }
            "#,
        );
        let mut store = MetadataStore::new();

        let discovery = discover(&[file], &mut store);
        let handler = &discovery.handlers[0];

        let statuses: Vec<u16> = store
            .responses(handler.id())
            .iter()
            .map(|r| r.status)
            .collect();
        assert_eq!(statuses, vec![500, 200, 404]);

        let params = store.params(handler.id());
        assert_eq!(params[0].name, "userId");
        assert_eq!(params[0].location, ParameterLocation::Path);
        assert!(params[0].required);

        let ok = store.response(handler.id(), 200).unwrap();
        assert!(matches!(
            &ok.type_ref,
            Some(TypeReference::Named { name, fields: Some(fields) }) if name == "User" && fields.len() == 1
        ));
    }

    #[test]
    fn test_impl_methods_are_handlers() {
        let file = parse(
            r#"
            pub struct Api;

            impl Api {
                #[api_operation(summary = "Create order")]
                #[api_route(method = "post", path = "/orders")]
                pub fn create_order(&self) {}
            }
            "#,
        );
        let mut store = MetadataStore::new();

        let discovery = discover(&[file], &mut store);
        let handler = &discovery.handlers[0];

        assert_eq!(handler.name(), "create_order");
        let route = store.route(handler.id()).unwrap();
        assert_eq!(route.method, Some(HttpMethod::Post));
    }

    #[test]
    fn test_malformed_attribute_is_skipped() {
        let file = parse(
            r#"
            #[api_operation(summary = "Get item")]
            #[api_response(description = "missing status")]
            #[api_response(status = 200)]
            pub fn get_item() {}
            "#,
        );
        let mut store = MetadataStore::new();

        let discovery = discover(&[file], &mut store);
        let handler = &discovery.handlers[0];

        assert_eq!(discovery.warnings.len(), 1);
        assert!(discovery.warnings[0].contains("get_item"));
        assert_eq!(store.responses(handler.id()).len(), 1);
        assert_eq!(store.operation(handler.id()).unwrap().summary, "Get item");
    }

    #[test]
    fn test_handler_with_only_malformed_attributes_is_registered_empty() {
        let file = parse(
            r#"
            #[api_operation(description = "no summary")]
            pub fn broken() {}
            "#,
        );
        let mut store = MetadataStore::new();

        let discovery = discover(&[file], &mut store);

        assert_eq!(discovery.handlers.len(), 1);
        assert!(!store.has_any_metadata(discovery.handlers[0].id()));
    }

    #[test]
    fn test_discover_inputs_collects_parse_warnings() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(
            root.join("a_users.rs"),
            r#"
            #[api_operation(summary = "List users")]
            pub fn list_users() {}
            "#,
        )
        .unwrap();
        fs::write(
            root.join("b_orders.rs"),
            r#"
            #[api_operation(summary = "Delete order")]
            pub fn delete_order() {}
            "#,
        )
        .unwrap();
        fs::write(root.join("c_broken.rs"), "fn broken( {").unwrap();

        let mut store = MetadataStore::new();
        let discovery = discover_inputs(&[root.to_path_buf()], &mut store).unwrap();

        let names: Vec<&str> = discovery.handlers.iter().map(|h| h.name()).collect();
        assert_eq!(names, vec!["list_users", "delete_order"]);
        assert_eq!(discovery.warnings.len(), 1);
        assert!(discovery.warnings[0].contains("c_broken.rs"));
    }
}
