use super::{Projection, Response, Schema};
use super::{Parameter, RequestBody};
use serde_json::Value;

/// Pointer the enclosing-schema sentinel projects to before it is resolved.
pub const ENCLOSING_SCHEMA_POINTER: &str = "#/components/schemas/{self}";

/// Sections of `components` a reference can point into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Schemas,
    Responses,
    Parameters,
    Examples,
    RequestBodies,
    Headers,
    SecuritySchemes,
    Links,
    Callbacks,
}

impl ComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Schemas => "schemas",
            ComponentKind::Responses => "responses",
            ComponentKind::Parameters => "parameters",
            ComponentKind::Examples => "examples",
            ComponentKind::RequestBodies => "requestBodies",
            ComponentKind::Headers => "headers",
            ComponentKind::SecuritySchemes => "securitySchemes",
            ComponentKind::Links => "links",
            ComponentKind::Callbacks => "callbacks",
        }
    }
}

/// A `$ref` node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reference {
    /// `#/components/<kind>/<name>`.
    Component { kind: ComponentKind, name: String },
    /// Any other pointer, passed through verbatim.
    Pointer(String),
    /// The schema currently being synthesized. Rewritten to a component
    /// reference once that schema has its registered name.
    Enclosing,
    /// An outer schema still being synthesized, by synthesis token. Nested
    /// schemas holding it are rewritten when that schema is registered.
    Pending(u64),
}

impl Reference {
    pub fn schema(name: impl Into<String>) -> Self {
        Reference::Component {
            kind: ComponentKind::Schemas,
            name: name.into(),
        }
    }

    pub fn component(kind: ComponentKind, name: impl Into<String>) -> Self {
        Reference::Component {
            kind,
            name: name.into(),
        }
    }

    pub fn pointer(&self) -> String {
        match self {
            Reference::Component { kind, name } => {
                format!("#/components/{}/{name}", kind.as_str())
            }
            Reference::Pointer(pointer) => pointer.clone(),
            Reference::Enclosing => ENCLOSING_SCHEMA_POINTER.to_string(),
            Reference::Pending(token) => format!("#/components/schemas/{{pending:{token}}}"),
        }
    }

    /// Last pointer segment, if the reference names a component.
    pub fn name(&self) -> Option<&str> {
        match self {
            Reference::Component { name, .. } => Some(name),
            Reference::Pointer(pointer) => pointer.rsplit('/').next(),
            Reference::Enclosing | Reference::Pending(_) => None,
        }
    }

    pub fn is_enclosing(&self) -> bool {
        matches!(self, Reference::Enclosing)
    }

    pub(crate) fn resolve_enclosing(&mut self, name: &str) {
        if self.is_enclosing() {
            *self = Reference::schema(name);
        }
    }
}

impl Projection for Reference {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![("reference", Value::String(self.pointer()))]
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["reference"]
    }

    fn renamed_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[("reference", "$ref")]
    }
}

/// Either an inline node or a `$ref` to one.
#[derive(Debug, Clone, PartialEq)]
pub enum RefOr<T> {
    Ref(Reference),
    Item(T),
}

impl<T> RefOr<T> {
    pub fn as_item(&self) -> Option<&T> {
        match self {
            RefOr::Item(item) => Some(item),
            RefOr::Ref(_) => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            RefOr::Ref(reference) => Some(reference),
            RefOr::Item(_) => None,
        }
    }
}

impl<T: Projection> Projection for RefOr<T> {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        match self {
            RefOr::Ref(reference) => reference.fields(),
            RefOr::Item(item) => item.fields(),
        }
    }

    fn required_fields(&self) -> &'static [&'static str] {
        match self {
            RefOr::Ref(reference) => reference.required_fields(),
            RefOr::Item(item) => item.required_fields(),
        }
    }

    fn renamed_fields(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            RefOr::Ref(reference) => reference.renamed_fields(),
            RefOr::Item(item) => item.renamed_fields(),
        }
    }

    fn project(&self) -> Value {
        match self {
            RefOr::Ref(reference) => reference.project(),
            RefOr::Item(item) => item.project(),
        }
    }
}

impl<T: Projection> serde::Serialize for RefOr<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serde::Serialize::serialize(&self.project(), serializer)
    }
}

impl<T> From<Reference> for RefOr<T> {
    fn from(reference: Reference) -> Self {
        RefOr::Ref(reference)
    }
}

macro_rules! ref_or_from_item {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for RefOr<$ty> {
                fn from(item: $ty) -> Self {
                    RefOr::Item(item)
                }
            }
        )*
    };
}

ref_or_from_item!(Schema, Response, RequestBody, Parameter);

serialize_via_projection!(Reference);
