//! Parsing of the `api_*` handler attributes into annotation options.

use super::types::StructIndex;
use crate::annotations::{
    ApiBody, ApiOperation, ApiParam, ApiResponse, ApiRoute, ApiSecurity, ApiTag,
};
use crate::metadata::{HttpMethod, SecuritySchemeType};
use crate::schema_mapper::TypeReference;
use serde_json::Value;
use syn::meta::ParseNestedMeta;
use syn::punctuated::Punctuated;
use syn::{Attribute, Lit, LitStr, Token};

/// One parsed handler attribute
#[derive(Debug, Clone)]
pub enum Annotation {
    Operation(ApiOperation),
    Param(ApiParam),
    Query(ApiParam),
    Body(ApiBody),
    Response(ApiResponse),
    Security(ApiSecurity),
    Tag(ApiTag),
    Route(ApiRoute),
}

const ANNOTATION_NAMES: [&str; 8] = [
    "api_operation",
    "api_param",
    "api_query",
    "api_body",
    "api_response",
    "api_security",
    "api_tag",
    "api_route",
];

/// Name of the annotation if `attr` is one of ours.
///
/// Matches on the last path segment so `#[openapi::api_param(..)]` also works.
pub fn annotation_name(attr: &Attribute) -> Option<&'static str> {
    let segment = attr.path().segments.last()?;
    ANNOTATION_NAMES
        .iter()
        .copied()
        .find(|name| segment.ident == *name)
}

/// Parse one attribute. `Ok(None)` means the attribute is not an annotation.
pub fn parse_annotation(attr: &Attribute, types: &StructIndex) -> syn::Result<Option<Annotation>> {
    let Some(name) = annotation_name(attr) else {
        return Ok(None);
    };

    let annotation = match name {
        "api_operation" => Annotation::Operation(parse_operation(attr)?),
        "api_param" => Annotation::Param(parse_param(attr, types)?),
        "api_query" => Annotation::Query(parse_param(attr, types)?),
        "api_body" => Annotation::Body(parse_body(attr, types)?),
        "api_response" => Annotation::Response(parse_response(attr, types)?),
        "api_security" => Annotation::Security(parse_security(attr)?),
        "api_tag" => Annotation::Tag(parse_tag(attr)?),
        _ => Annotation::Route(parse_route(attr)?),
    };

    Ok(Some(annotation))
}

fn parse_operation(attr: &Attribute) -> syn::Result<ApiOperation> {
    let mut summary = None;
    let mut options = ApiOperation::default();

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("summary") {
            summary = Some(string_value(&meta)?);
        } else if meta.path.is_ident("description") {
            options.description = Some(string_value(&meta)?);
        } else if meta.path.is_ident("operation_id") {
            options.operation_id = Some(string_value(&meta)?);
        } else if meta.path.is_ident("deprecated") {
            options.deprecated = Some(flag_value(&meta)?);
        } else if meta.path.is_ident("tags") {
            options.tags = string_list(&meta)?;
        } else {
            return Err(meta.error("unsupported api_operation key"));
        }
        Ok(())
    })?;

    options.summary =
        summary.ok_or_else(|| syn::Error::new_spanned(attr, "api_operation requires `summary`"))?;
    Ok(options)
}

fn parse_param(attr: &Attribute, types: &StructIndex) -> syn::Result<ApiParam> {
    let mut name = None;
    let mut options = ApiParam::default();

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("name") {
            name = Some(string_value(&meta)?);
        } else if meta.path.is_ident("type") {
            options.type_ref = Some(TypeReference::primitive(string_value(&meta)?));
        } else if meta.path.is_ident("schema") {
            options.type_ref = Some(types.resolve(&string_value(&meta)?));
        } else if meta.path.is_ident("description") {
            options.description = Some(string_value(&meta)?);
        } else if meta.path.is_ident("required") {
            options.required = Some(flag_value(&meta)?);
        } else if meta.path.is_ident("example") {
            options.example = example_value(&meta)?;
        } else if meta.path.is_ident("enum_values") {
            options.enum_values = Some(literal_list(&meta)?);
        } else if meta.path.is_ident("deprecated") {
            options.deprecated = Some(flag_value(&meta)?);
        } else {
            return Err(meta.error("unsupported parameter key"));
        }
        Ok(())
    })?;

    options.name =
        name.ok_or_else(|| syn::Error::new_spanned(attr, "parameter annotations require `name`"))?;
    Ok(options)
}

fn parse_body(attr: &Attribute, types: &StructIndex) -> syn::Result<ApiBody> {
    let mut options = ApiBody::default();

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("type") {
            options.type_ref = Some(TypeReference::primitive(string_value(&meta)?));
        } else if meta.path.is_ident("schema") {
            options.type_ref = Some(types.resolve(&string_value(&meta)?));
        } else if meta.path.is_ident("description") {
            options.description = Some(string_value(&meta)?);
        } else if meta.path.is_ident("required") {
            options.required = Some(flag_value(&meta)?);
        } else if meta.path.is_ident("example") {
            options.example = example_value(&meta)?;
        } else {
            return Err(meta.error("unsupported api_body key"));
        }
        Ok(())
    })?;

    Ok(options)
}

fn parse_response(attr: &Attribute, types: &StructIndex) -> syn::Result<ApiResponse> {
    let mut status = None;
    let mut content_type = None;
    let mut options = ApiResponse::default();

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("status") {
            let lit: syn::LitInt = meta.value()?.parse()?;
            status = Some(lit.base10_parse::<u16>()?);
        } else if meta.path.is_ident("type") {
            options.type_ref = Some(TypeReference::primitive(string_value(&meta)?));
        } else if meta.path.is_ident("schema") {
            options.type_ref = Some(types.resolve(&string_value(&meta)?));
        } else if meta.path.is_ident("description") {
            options.description = Some(string_value(&meta)?);
        } else if meta.path.is_ident("example") {
            options.example = example_value(&meta)?;
        } else if meta.path.is_ident("content_type") {
            content_type = Some(string_value(&meta)?);
        } else {
            return Err(meta.error("unsupported api_response key"));
        }
        Ok(())
    })?;

    options.status =
        status.ok_or_else(|| syn::Error::new_spanned(attr, "api_response requires `status`"))?;

    // A custom media type moves the payload out of the JSON default
    if let Some(media_type) = content_type {
        let type_ref = options
            .type_ref
            .take()
            .unwrap_or_else(|| TypeReference::primitive("string"));
        options = options.content(media_type, type_ref);
    }

    Ok(options)
}

fn parse_security(attr: &Attribute) -> syn::Result<ApiSecurity> {
    let mut scheme_type = None;
    let mut name = None;
    let mut location = None;
    let mut scheme = None;
    let mut scopes = None;

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("scheme_type") {
            let lit: LitStr = meta.value()?.parse()?;
            let parsed = lit
                .value()
                .parse::<SecuritySchemeType>()
                .map_err(|e| syn::Error::new(lit.span(), e))?;
            scheme_type = Some(parsed);
        } else if meta.path.is_ident("name") {
            name = Some(string_value(&meta)?);
        } else if meta.path.is_ident("location") {
            location = Some(string_value(&meta)?);
        } else if meta.path.is_ident("scheme") {
            scheme = Some(string_value(&meta)?);
        } else if meta.path.is_ident("scopes") {
            scopes = Some(string_list(&meta)?);
        } else {
            return Err(meta.error("unsupported api_security key"));
        }
        Ok(())
    })?;

    let scheme_type = scheme_type
        .ok_or_else(|| syn::Error::new_spanned(attr, "api_security requires `scheme_type`"))?;

    Ok(ApiSecurity {
        scheme_type,
        name,
        location,
        scheme,
        scopes,
    })
}

fn parse_tag(attr: &Attribute) -> syn::Result<ApiTag> {
    let mut name = None;
    let mut options = ApiTag::default();

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("name") {
            name = Some(string_value(&meta)?);
        } else if meta.path.is_ident("description") {
            options.description = Some(string_value(&meta)?);
        } else if meta.path.is_ident("external_docs_url") {
            options.external_docs_url = Some(string_value(&meta)?);
        } else {
            return Err(meta.error("unsupported api_tag key"));
        }
        Ok(())
    })?;

    options.name = name.ok_or_else(|| syn::Error::new_spanned(attr, "api_tag requires `name`"))?;
    Ok(options)
}

fn parse_route(attr: &Attribute) -> syn::Result<ApiRoute> {
    let mut options = ApiRoute::default();

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("method") {
            let lit: LitStr = meta.value()?.parse()?;
            let method = lit
                .value()
                .parse::<HttpMethod>()
                .map_err(|e| syn::Error::new(lit.span(), e))?;
            options.method = Some(method);
        } else if meta.path.is_ident("path") {
            options.path = Some(string_value(&meta)?);
        } else {
            return Err(meta.error("unsupported api_route key"));
        }
        Ok(())
    })?;

    Ok(options)
}

fn string_value(meta: &ParseNestedMeta) -> syn::Result<String> {
    let lit: LitStr = meta.value()?.parse()?;
    Ok(lit.value())
}

/// Bare `key` means true; `key = bool` is explicit
fn flag_value(meta: &ParseNestedMeta) -> syn::Result<bool> {
    if meta.input.peek(Token![=]) {
        let lit: syn::LitBool = meta.value()?.parse()?;
        Ok(lit.value)
    } else {
        Ok(true)
    }
}

fn string_list(meta: &ParseNestedMeta) -> syn::Result<Vec<String>> {
    let content;
    syn::parenthesized!(content in meta.input);
    let items = Punctuated::<LitStr, Token![,]>::parse_terminated(&content)?;
    Ok(items.iter().map(LitStr::value).collect())
}

fn literal_list(meta: &ParseNestedMeta) -> syn::Result<Vec<Value>> {
    let content;
    syn::parenthesized!(content in meta.input);
    let items = Punctuated::<Lit, Token![,]>::parse_terminated(&content)?;
    items.iter().map(literal_value).collect()
}

/// String examples holding a JSON object or array become structured values;
/// any other string stays a string. `None` for a JSON `null`.
fn example_value(meta: &ParseNestedMeta) -> syn::Result<Option<Value>> {
    let lit: Lit = meta.value()?.parse()?;
    let value = match &lit {
        Lit::Str(s) => {
            let text = s.value();
            let trimmed = text.trim_start();
            if trimmed.starts_with('{') || trimmed.starts_with('[') {
                serde_json::from_str(&text).unwrap_or(Value::String(text))
            } else {
                Value::String(text)
            }
        }
        other => literal_value(other)?,
    };
    Ok(Some(value).filter(|v| !v.is_null()))
}

fn literal_value(lit: &Lit) -> syn::Result<Value> {
    match lit {
        Lit::Str(s) => Ok(Value::String(s.value())),
        Lit::Int(i) => Ok(Value::from(i.base10_parse::<i64>()?)),
        Lit::Float(f) => {
            let number = serde_json::Number::from_f64(f.base10_parse::<f64>()?)
                .ok_or_else(|| syn::Error::new(f.span(), "non-finite number"))?;
            Ok(Value::Number(number))
        }
        Lit::Bool(b) => Ok(Value::Bool(b.value)),
        other => Err(syn::Error::new(other.span(), "unsupported literal")),
    }
}
