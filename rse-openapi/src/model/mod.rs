//! Typed OpenAPI 3.0 nodes.
//!
//! Every node projects itself into a canonical JSON object through
//! [`Projection`]: unset fields are dropped, the node's required fields are
//! always emitted, and internal field names are renamed to their wire names.
//! Object keys come out sorted, so two structurally equal nodes always
//! produce the same bytes.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Implements `serde::Serialize` for nodes by serializing their projection.
macro_rules! serialize_via_projection {
    ($($ty:ty),* $(,)?) => {
        $(
            impl serde::Serialize for $ty {
                fn serialize<S>(&self, serializer: S) -> ::core::result::Result<S::Ok, S::Error>
                where
                    S: serde::Serializer,
                {
                    serde::Serialize::serialize(
                        &$crate::model::Projection::project(self),
                        serializer,
                    )
                }
            }
        )*
    };
}

mod content;
mod document;
mod info;
mod operation;
mod reference;
mod schema;
mod security;

pub use content::{Encoding, Example, Header, Link, MediaType};
pub use document::{Components, Document, Path, Paths, SpecFormat, OPENAPI_VERSION};
pub use info::{Contact, ExternalDocumentation, Info, License, Server, ServerVariable, Tag};
pub use operation::{
    Callback, HttpMethod, OperationProps, Parameter, ParameterLocation, ParseHttpMethodError,
    PathOperation, RequestBody, Response, Responses, StatusKey,
};
pub use reference::{ComponentKind, RefOr, Reference, ENCLOSING_SCHEMA_POINTER};
pub use schema::{DataType, Schema, SchemaBuilder, StringFormat};
pub use security::{
    ApiKeyLocation, OAuthFlow, OAuthFlows, SecurityRequirement, SecurityScheme,
    SecuritySchemeBuilder, SecurityType,
};

/// Canonical JSON view of a document node.
pub trait Projection {
    /// `(internal name, value)` pairs; unset fields are `Value::Null`.
    fn fields(&self) -> Vec<(&'static str, Value)>;

    /// Fields emitted even when empty.
    fn required_fields(&self) -> &'static [&'static str] {
        &[]
    }

    /// Internal name to wire name.
    fn renamed_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[]
    }

    fn project(&self) -> Value {
        project_fields(self.fields(), self.required_fields(), self.renamed_fields())
    }
}

impl<T: Projection + ?Sized> Projection for Box<T> {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        (**self).fields()
    }

    fn required_fields(&self) -> &'static [&'static str] {
        (**self).required_fields()
    }

    fn renamed_fields(&self) -> &'static [(&'static str, &'static str)] {
        (**self).renamed_fields()
    }

    fn project(&self) -> Value {
        (**self).project()
    }
}

pub(crate) fn project_fields(
    fields: Vec<(&'static str, Value)>,
    required: &[&str],
    renamed: &[(&str, &str)],
) -> Value {
    let mut out = BTreeMap::new();
    for (name, value) in fields {
        if is_absent(&value) && !required.contains(&name) {
            continue;
        }
        let wire = renamed
            .iter()
            .find(|(internal, _)| *internal == name)
            .map_or(name, |(_, wire)| *wire);
        out.insert(wire.to_string(), value);
    }
    Value::Object(out.into_iter().collect::<Map<String, Value>>())
}

fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

// ── Field helpers ───────────────────────────────────────────────────────

pub(crate) fn text(value: &Option<String>) -> Value {
    value.as_deref().map_or(Value::Null, Value::from)
}

/// `false` flags are treated as unset.
pub(crate) fn flag(value: bool) -> Value {
    if value {
        Value::Bool(true)
    } else {
        Value::Null
    }
}

pub(crate) fn opt_bool(value: Option<bool>) -> Value {
    value.map_or(Value::Null, Value::Bool)
}

pub(crate) fn opt_u64(value: Option<u64>) -> Value {
    value.map_or(Value::Null, Value::from)
}

/// Integral floats are written as JSON integers.
pub(crate) fn number(value: Option<f64>) -> Value {
    match value {
        Some(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => Value::from(n as i64),
        Some(n) => Value::from(n),
        None => Value::Null,
    }
}

pub(crate) fn raw(value: &Option<Value>) -> Value {
    value.clone().unwrap_or(Value::Null)
}

pub(crate) fn strings(values: &[String]) -> Value {
    Value::Array(values.iter().cloned().map(Value::from).collect())
}

pub(crate) fn node<P: Projection>(value: &Option<P>) -> Value {
    value.as_ref().map_or(Value::Null, Projection::project)
}

pub(crate) fn nodes<P: Projection>(values: &[P]) -> Value {
    Value::Array(values.iter().map(Projection::project).collect())
}

pub(crate) fn node_map<P: Projection>(values: &BTreeMap<String, P>) -> Value {
    Value::Object(
        values
            .iter()
            .map(|(key, value)| (key.clone(), value.project()))
            .collect(),
    )
}
