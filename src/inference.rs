//! Naming-convention heuristics for handlers without an explicit route.
//!
//! Both functions look at the handler's declared name only.

use crate::metadata::{HttpMethod, RouteMetadata};

/// Method keywords in precedence order; the first rule with a matching
/// substring wins.
const METHOD_RULES: [(&[&str], HttpMethod); 5] = [
    (&["get", "list", "find"], HttpMethod::Get),
    (&["post", "create"], HttpMethod::Post),
    (&["put", "update"], HttpMethod::Put),
    (&["delete", "remove"], HttpMethod::Delete),
    (&["patch"], HttpMethod::Patch),
];

/// Derive a URL path from a handler name.
///
/// `getUserHandler` and `get_user_handler` both become `/get-user`.
pub fn infer_path(handler_name: &str) -> String {
    let stem = handler_name
        .strip_suffix("Handler")
        .or_else(|| handler_name.strip_suffix("_handler"))
        .unwrap_or(handler_name);

    let mut kebab = String::with_capacity(stem.len() + 4);
    for c in stem.chars() {
        if c.is_uppercase() {
            kebab.push('-');
            kebab.extend(c.to_lowercase());
        } else if c == '_' {
            kebab.push('-');
        } else {
            kebab.push(c);
        }
    }

    format!("/{}", kebab.trim_start_matches('-'))
}

/// Derive an HTTP method from a handler name, defaulting to GET
pub fn infer_method(handler_name: &str) -> HttpMethod {
    let lower = handler_name.to_lowercase();
    METHOD_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, method)| *method)
        .unwrap_or(HttpMethod::Get)
}

/// Resolve the path and method for a handler, preferring explicit route
/// metadata and inferring whatever it leaves unset
pub fn resolve_route(handler_name: &str, route: Option<&RouteMetadata>) -> (String, HttpMethod) {
    let path = route
        .and_then(|r| r.path.clone())
        .unwrap_or_else(|| infer_path(handler_name));
    let method = route
        .and_then(|r| r.method)
        .unwrap_or_else(|| infer_method(handler_name));
    (path, method)
}
