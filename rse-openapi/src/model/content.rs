use super::{flag, node, node_map, opt_bool, raw, text, Projection, RefOr, Schema, Server};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Schema and examples for one content type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaType {
    pub schema: Option<RefOr<Schema>>,
    pub example: Option<Value>,
    pub examples: BTreeMap<String, RefOr<Example>>,
    pub encoding: BTreeMap<String, Encoding>,
}

impl MediaType {
    pub fn new(schema: impl Into<RefOr<Schema>>) -> Self {
        Self {
            schema: Some(schema.into()),
            ..Self::default()
        }
    }
}

impl Projection for MediaType {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("schema", node(&self.schema)),
            ("example", raw(&self.example)),
            ("examples", node_map(&self.examples)),
            ("encoding", node_map(&self.encoding)),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Example {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub value: Option<Value>,
    pub external_value: Option<String>,
}

impl Projection for Example {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("summary", text(&self.summary)),
            ("description", text(&self.description)),
            ("value", raw(&self.value)),
            ("external_value", text(&self.external_value)),
        ]
    }

    fn renamed_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[("external_value", "externalValue")]
    }
}

/// A response or encoding header. Same shape as a parameter without
/// `name` and `in`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    pub description: Option<String>,
    pub required: bool,
    pub deprecated: bool,
    pub allow_empty_value: bool,
    pub schema: Option<RefOr<Schema>>,
}

impl Projection for Header {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("description", text(&self.description)),
            ("required", flag(self.required)),
            ("deprecated", flag(self.deprecated)),
            ("allow_empty_value", flag(self.allow_empty_value)),
            ("schema", node(&self.schema)),
        ]
    }

    fn renamed_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[("allow_empty_value", "allowEmptyValue")]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Encoding {
    pub content_type: Option<String>,
    pub headers: BTreeMap<String, RefOr<Header>>,
    pub style: Option<String>,
    pub explode: Option<bool>,
    pub allow_reserved: bool,
}

impl Projection for Encoding {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("content_type", text(&self.content_type)),
            ("headers", node_map(&self.headers)),
            ("style", text(&self.style)),
            ("explode", opt_bool(self.explode)),
            ("allow_reserved", flag(self.allow_reserved)),
        ]
    }

    fn renamed_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("content_type", "contentType"),
            ("allow_reserved", "allowReserved"),
        ]
    }
}

/// A design-time link between a response and another operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Link {
    pub operation_ref: Option<String>,
    pub operation_id: Option<String>,
    pub parameters: BTreeMap<String, Value>,
    pub request_body: Option<Value>,
    pub description: Option<String>,
    pub server: Option<Server>,
}

impl Projection for Link {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        let parameters: Map<String, Value> = self
            .parameters
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        vec![
            ("operation_ref", text(&self.operation_ref)),
            ("operation_id", text(&self.operation_id)),
            ("parameters", Value::Object(parameters)),
            ("request_body", raw(&self.request_body)),
            ("description", text(&self.description)),
            ("server", node(&self.server)),
        ]
    }

    fn renamed_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("operation_ref", "operationRef"),
            ("operation_id", "operationId"),
            ("request_body", "requestBody"),
        ]
    }
}

serialize_via_projection!(MediaType, Example, Header, Encoding, Link);
