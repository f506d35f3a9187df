use super::{
    flag, node, node_map, nodes, opt_bool, raw, strings, text, ExternalDocumentation, Header,
    Link, MediaType, Path, Projection, RefOr, Schema, SecurityRequirement, Server,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ── HTTP methods ────────────────────────────────────────────────────────

/// Operation keys of a path item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseHttpMethodError(String);

impl fmt::Display for ParseHttpMethodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown HTTP method: {}", self.0)
    }
}

impl std::error::Error for ParseHttpMethodError {}

impl FromStr for HttpMethod {
    type Err = ParseHttpMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseHttpMethodError(s.to_string()))
    }
}

// ── Parameters ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParameterLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Cookie => "cookie",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub location: ParameterLocation,
    pub description: Option<String>,
    pub required: bool,
    pub deprecated: bool,
    pub allow_empty_value: bool,
    pub style: Option<String>,
    pub explode: Option<bool>,
    pub allow_reserved: bool,
    pub schema: Option<RefOr<Schema>>,
    pub example: Option<Value>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, location: ParameterLocation) -> Self {
        Self {
            name: name.into(),
            location,
            description: None,
            required: false,
            deprecated: false,
            allow_empty_value: false,
            style: None,
            explode: None,
            allow_reserved: false,
            schema: None,
            example: None,
        }
    }

    /// Path parameters are always required.
    pub fn path(name: impl Into<String>, schema: impl Into<RefOr<Schema>>) -> Self {
        Self {
            required: true,
            schema: Some(schema.into()),
            ..Self::new(name, ParameterLocation::Path)
        }
    }

    pub fn query(name: impl Into<String>, schema: impl Into<RefOr<Schema>>) -> Self {
        Self {
            schema: Some(schema.into()),
            ..Self::new(name, ParameterLocation::Query)
        }
    }

    pub fn header(name: impl Into<String>, schema: impl Into<RefOr<Schema>>) -> Self {
        Self {
            schema: Some(schema.into()),
            ..Self::new(name, ParameterLocation::Header)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

impl Projection for Parameter {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("name", Value::from(self.name.as_str())),
            ("input_from", Value::from(self.location.as_str())),
            ("description", text(&self.description)),
            ("required", flag(self.required)),
            ("deprecated", flag(self.deprecated)),
            ("allow_empty", flag(self.allow_empty_value)),
            ("style", text(&self.style)),
            ("explode", opt_bool(self.explode)),
            ("allow_reserved", flag(self.allow_reserved)),
            ("schema", node(&self.schema)),
            ("example", raw(&self.example)),
        ]
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["name", "input_from"]
    }

    fn renamed_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("input_from", "in"),
            ("allow_empty", "allowEmptyValue"),
            ("allow_reserved", "allowReserved"),
        ]
    }
}

// ── Bodies and responses ────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestBody {
    pub description: Option<String>,
    pub content: BTreeMap<String, MediaType>,
    pub required: bool,
}

impl RequestBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(mut self, content_type: impl Into<String>, media: MediaType) -> Self {
        self.content.insert(content_type.into(), media);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

impl Projection for RequestBody {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("description", text(&self.description)),
            ("content", node_map(&self.content)),
            ("required", flag(self.required)),
        ]
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["content"]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    pub description: String,
    pub headers: BTreeMap<String, RefOr<Header>>,
    pub content: BTreeMap<String, MediaType>,
    pub links: BTreeMap<String, RefOr<Link>>,
}

impl Response {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_content(mut self, content_type: impl Into<String>, media: MediaType) -> Self {
        self.content.insert(content_type.into(), media);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, header: Header) -> Self {
        self.headers.insert(name.into(), RefOr::Item(header));
        self
    }
}

impl Projection for Response {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("description", Value::from(self.description.as_str())),
            ("headers", node_map(&self.headers)),
            ("content", node_map(&self.content)),
            ("links", node_map(&self.links)),
        ]
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["description"]
    }
}

/// Key of a response map entry: a status code or `default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatusKey {
    Default,
    Code(u16),
}

impl fmt::Display for StatusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusKey::Default => f.write_str("default"),
            StatusKey::Code(code) => write!(f, "{code}"),
        }
    }
}

impl From<u16> for StatusKey {
    fn from(code: u16) -> Self {
        StatusKey::Code(code)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Responses(BTreeMap<StatusKey, RefOr<Response>>);

impl Responses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: StatusKey, response: impl Into<RefOr<Response>>) -> Self {
        self.insert(key, response);
        self
    }

    /// Replaces any response already declared for the key.
    pub fn insert(&mut self, key: StatusKey, response: impl Into<RefOr<Response>>) {
        self.0.insert(key, response.into());
    }

    pub fn get(&self, key: StatusKey) -> Option<&RefOr<Response>> {
        self.0.get(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StatusKey, &RefOr<Response>)> {
        self.0.iter()
    }
}

impl Projection for Responses {
    // Keys are status codes, so the whole object is built in `project`.
    fn fields(&self) -> Vec<(&'static str, Value)> {
        Vec::new()
    }

    fn project(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(key, response)| (key.to_string(), response.project()))
                .collect(),
        )
    }
}

/// Runtime expression to the path item describing the callback request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Callback(pub BTreeMap<String, Path>);

impl Projection for Callback {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        Vec::new()
    }

    fn project(&self) -> Value {
        node_map(&self.0)
    }
}

// ── Operations ──────────────────────────────────────────────────────────

/// Operation metadata attached to a handler method.
///
/// Every field is optional; [`OperationProps::merge`] lets a later bag
/// override the fields it sets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationProps {
    pub tags: Option<Vec<String>>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub external_docs: Option<ExternalDocumentation>,
    pub operation_id: Option<String>,
    pub parameters: Option<Vec<RefOr<Parameter>>>,
    pub callbacks: Option<BTreeMap<String, RefOr<Callback>>>,
    pub deprecated: Option<bool>,
    pub security: Option<Vec<SecurityRequirement>>,
    pub servers: Option<Vec<Server>>,
}

impl OperationProps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.get_or_insert_with(Vec::new).push(tag.into());
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn external_docs(mut self, docs: ExternalDocumentation) -> Self {
        self.external_docs = Some(docs);
        self
    }

    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.operation_id = Some(id.into());
        self
    }

    pub fn parameter(mut self, parameter: impl Into<RefOr<Parameter>>) -> Self {
        self.parameters
            .get_or_insert_with(Vec::new)
            .push(parameter.into());
        self
    }

    pub fn callback(mut self, name: impl Into<String>, callback: Callback) -> Self {
        self.callbacks
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), RefOr::Item(callback));
        self
    }

    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = Some(deprecated);
        self
    }

    pub fn security(mut self, requirement: SecurityRequirement) -> Self {
        self.security
            .get_or_insert_with(Vec::new)
            .push(requirement);
        self
    }

    pub fn server(mut self, server: Server) -> Self {
        self.servers.get_or_insert_with(Vec::new).push(server);
        self
    }

    /// Overwrites every field `other` sets.
    pub fn merge(&mut self, other: OperationProps) {
        fn take<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        take(&mut self.tags, other.tags);
        take(&mut self.summary, other.summary);
        take(&mut self.description, other.description);
        take(&mut self.external_docs, other.external_docs);
        take(&mut self.operation_id, other.operation_id);
        take(&mut self.parameters, other.parameters);
        take(&mut self.callbacks, other.callbacks);
        take(&mut self.deprecated, other.deprecated);
        take(&mut self.security, other.security);
        take(&mut self.servers, other.servers);
    }
}

/// A single API operation on a path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathOperation {
    pub responses: Responses,
    pub tags: Vec<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub external_docs: Option<ExternalDocumentation>,
    pub operation_id: Option<String>,
    pub parameters: Vec<RefOr<Parameter>>,
    pub request_body: Option<RefOr<RequestBody>>,
    pub callbacks: BTreeMap<String, RefOr<Callback>>,
    pub deprecated: bool,
    pub security: Vec<SecurityRequirement>,
    pub servers: Vec<Server>,
}

impl PathOperation {
    pub fn new(responses: Responses) -> Self {
        Self {
            responses,
            ..Self::default()
        }
    }

    pub fn from_parts(
        responses: Responses,
        request_body: Option<RefOr<RequestBody>>,
        props: OperationProps,
    ) -> Self {
        Self {
            responses,
            request_body,
            tags: props.tags.unwrap_or_default(),
            summary: props.summary,
            description: props.description,
            external_docs: props.external_docs,
            operation_id: props.operation_id,
            parameters: props.parameters.unwrap_or_default(),
            callbacks: props.callbacks.unwrap_or_default(),
            deprecated: props.deprecated.unwrap_or(false),
            security: props.security.unwrap_or_default(),
            servers: props.servers.unwrap_or_default(),
        }
    }
}

impl Projection for PathOperation {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("responses", self.responses.project()),
            ("tags", strings(&self.tags)),
            ("summary", text(&self.summary)),
            ("description", text(&self.description)),
            ("external_docs", node(&self.external_docs)),
            ("operation_id", text(&self.operation_id)),
            ("parameters", nodes(&self.parameters)),
            ("request_body", node(&self.request_body)),
            ("callbacks", node_map(&self.callbacks)),
            ("deprecated", flag(self.deprecated)),
            ("security", nodes(&self.security)),
            ("servers", nodes(&self.servers)),
        ]
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["responses"]
    }

    fn renamed_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("external_docs", "externalDocs"),
            ("operation_id", "operationId"),
            ("request_body", "requestBody"),
        ]
    }
}

serialize_via_projection!(
    Parameter,
    RequestBody,
    Response,
    Responses,
    Callback,
    PathOperation
);
