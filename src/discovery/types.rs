//! Struct lookup for `schema = "..."` references found in handler attributes.
//!
//! Only structs defined in the same file as the handler are expanded; any
//! other name stays a field-less placeholder reference.

use crate::schema_mapper::{Field, TypeReference};
use log::debug;
use std::collections::HashMap;
use syn::visit::Visit;
use syn::{GenericArgument, ItemStruct, PathArguments, Token, Type};

/// Index of the structs declared in one parsed file
pub struct StructIndex<'ast> {
    structs: HashMap<String, &'ast ItemStruct>,
}

/// Serde attributes that change a field's schema
#[derive(Debug, Default, PartialEq)]
struct SerdeAttributes {
    rename: Option<String>,
    skip: bool,
}

impl<'ast> StructIndex<'ast> {
    /// Collect every struct declared in `file`, including inside inline modules
    pub fn from_file(file: &'ast syn::File) -> Self {
        let mut index = Self {
            structs: HashMap::new(),
        };
        index.visit_file(file);
        debug!("Indexed {} structs", index.structs.len());
        index
    }

    /// Resolve a named reference, expanding its fields when the struct is known.
    ///
    /// Expansion is one level deep: named field types stay placeholders.
    pub fn resolve(&self, name: &str) -> TypeReference {
        let Some(item) = self.structs.get(name) else {
            return TypeReference::named(name);
        };

        let syn::Fields::Named(named) = &item.fields else {
            return TypeReference::named(name);
        };

        let mut fields = Vec::new();
        for field in &named.named {
            let serde_attrs = parse_serde_attributes(&field.attrs);
            if serde_attrs.skip {
                continue;
            }
            let Some(ident) = &field.ident else { continue };
            let field_name = serde_attrs.rename.unwrap_or_else(|| ident.to_string());
            let (type_ref, optional) = map_type(&field.ty);
            fields.push(Field::new(field_name, type_ref, !optional));
        }

        TypeReference::named_with_fields(name, fields)
    }
}

impl<'ast> Visit<'ast> for StructIndex<'ast> {
    fn visit_item_struct(&mut self, item: &'ast ItemStruct) {
        self.structs.insert(item.ident.to_string(), item);
    }
}

/// Map a Rust field type; the flag is true for `Option<T>`
fn map_type(ty: &Type) -> (TypeReference, bool) {
    match ty {
        Type::Reference(reference) => map_type(&reference.elem),
        Type::Paren(paren) => map_type(&paren.elem),
        Type::Array(array) => (array_of(&array.elem), false),
        Type::Slice(slice) => (array_of(&slice.elem), false),
        Type::Path(type_path) => {
            let Some(segment) = type_path.path.segments.last() else {
                return (TypeReference::primitive("object"), false);
            };
            let ident = segment.ident.to_string();
            let inner = first_type_argument(&segment.arguments);

            match (ident.as_str(), inner) {
                ("Option", Some(inner)) => (map_type(inner).0, true),
                ("Box" | "Arc" | "Rc", Some(inner)) => map_type(inner),
                ("Vec" | "VecDeque" | "HashSet" | "BTreeSet", Some(inner)) => {
                    (array_of(inner), false)
                }
                ("HashMap" | "BTreeMap", _) => (TypeReference::primitive("object"), false),
                _ => (map_scalar(&ident), false),
            }
        }
        _ => (TypeReference::primitive("object"), false),
    }
}

fn array_of(elem: &Type) -> TypeReference {
    TypeReference::array(map_type(elem).0)
}

fn map_scalar(ident: &str) -> TypeReference {
    match ident {
        "String" | "str" | "char" => TypeReference::primitive("string"),
        "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
        | "u128" | "usize" => TypeReference::primitive("integer"),
        "f32" | "f64" => TypeReference::primitive("number"),
        "bool" => TypeReference::primitive("boolean"),
        other => TypeReference::named(other),
    }
}

fn first_type_argument(arguments: &PathArguments) -> Option<&Type> {
    let PathArguments::AngleBracketed(args) = arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    })
}

fn parse_serde_attributes(attrs: &[syn::Attribute]) -> SerdeAttributes {
    let mut serde_attrs = SerdeAttributes::default();

    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        let parsed = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let value: syn::LitStr = meta.value()?.parse()?;
                serde_attrs.rename = Some(value.value());
            } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                serde_attrs.skip = true;
            } else if meta.input.peek(Token![=]) {
                meta.value()?.parse::<syn::Expr>()?;
            } else if meta.input.peek(syn::token::Paren) {
                meta.parse_nested_meta(|inner| {
                    if inner.input.peek(Token![=]) {
                        inner.value()?.parse::<syn::Expr>()?;
                    }
                    Ok(())
                })?;
            }
            Ok(())
        });
        if let Err(e) = parsed {
            debug!("Ignoring unreadable serde attribute: {}", e);
        }
    }

    serde_attrs
}
