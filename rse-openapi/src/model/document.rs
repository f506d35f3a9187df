use super::{
    node, node_map, nodes, text, Callback, Example, ExternalDocumentation, Header, HttpMethod,
    Info, Link, Parameter, PathOperation, Projection, RefOr, RequestBody, Response, Schema,
    SecurityRequirement, SecurityScheme, Server, Tag,
};
use crate::error::Result;
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Version string written to the `openapi` field.
pub const OPENAPI_VERSION: &str = "3.0.0";

/// Operations available on a single URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    pub operations: BTreeMap<HttpMethod, PathOperation>,
    pub reference: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub servers: Vec<Server>,
    pub parameters: Vec<RefOr<Parameter>>,
}

impl Path {
    pub fn operation(&self, method: HttpMethod) -> Option<&PathOperation> {
        self.operations.get(&method)
    }
}

impl Projection for Path {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("reference", text(&self.reference)),
            ("summary", text(&self.summary)),
            ("description", text(&self.description)),
            ("servers", nodes(&self.servers)),
            ("parameters", nodes(&self.parameters)),
        ]
    }

    fn renamed_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[("reference", "$ref")]
    }

    fn project(&self) -> Value {
        let mut out = super::project_fields(self.fields(), &[], self.renamed_fields());
        if let Value::Object(map) = &mut out {
            for (method, operation) in &self.operations {
                map.insert(method.as_str().to_string(), operation.project());
            }
        }
        out
    }
}

/// URL to path item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paths(BTreeMap<String, Path>);

impl Paths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<&Path> {
        self.0.get(url)
    }

    pub fn entry(&mut self, url: impl Into<String>) -> &mut Path {
        self.0.entry(url.into()).or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Path)> {
        self.0.iter()
    }
}

impl Projection for Paths {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        Vec::new()
    }

    fn project(&self) -> Value {
        node_map(&self.0)
    }
}

/// Reusable objects referenced from the rest of the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Components {
    pub schemas: BTreeMap<String, Schema>,
    pub responses: BTreeMap<String, RefOr<Response>>,
    pub parameters: BTreeMap<String, RefOr<Parameter>>,
    pub examples: BTreeMap<String, RefOr<Example>>,
    pub request_bodies: BTreeMap<String, RefOr<RequestBody>>,
    pub headers: BTreeMap<String, RefOr<Header>>,
    pub security_schemes: BTreeMap<String, SecurityScheme>,
    pub links: BTreeMap<String, RefOr<Link>>,
    pub callbacks: BTreeMap<String, RefOr<Callback>>,
}

impl Projection for Components {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("schemas", node_map(&self.schemas)),
            ("responses", node_map(&self.responses)),
            ("parameters", node_map(&self.parameters)),
            ("examples", node_map(&self.examples)),
            ("request_bodies", node_map(&self.request_bodies)),
            ("headers", node_map(&self.headers)),
            ("security_schemes", node_map(&self.security_schemes)),
            ("links", node_map(&self.links)),
            ("callbacks", node_map(&self.callbacks)),
        ]
    }

    fn renamed_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("request_bodies", "requestBodies"),
            ("security_schemes", "securitySchemes"),
        ]
    }
}

/// Output encodings of a rendered document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpecFormat {
    #[default]
    Json,
    Yaml,
}

impl FromStr for SpecFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(SpecFormat::Json),
            "yaml" | "yml" => Ok(SpecFormat::Yaml),
            other => Err(format!("unknown spec format '{other}'")),
        }
    }
}

/// The root OpenAPI object.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub openapi: String,
    pub info: Info,
    pub paths: Paths,
    pub servers: Vec<Server>,
    pub components: Option<Components>,
    pub security: Vec<SecurityRequirement>,
    pub tags: Vec<Tag>,
    pub external_docs: Option<ExternalDocumentation>,
}

impl Document {
    pub fn new(info: Info) -> Self {
        Self {
            openapi: OPENAPI_VERSION.to_string(),
            info,
            paths: Paths::new(),
            servers: Vec::new(),
            components: None,
            security: Vec::new(),
            tags: Vec::new(),
            external_docs: None,
        }
    }

    /// Compact JSON with sorted keys.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.project())?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.project())?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.project())?)
    }

    pub fn to_string_as(&self, format: SpecFormat) -> Result<String> {
        match format {
            SpecFormat::Json => self.to_json(),
            SpecFormat::Yaml => self.to_yaml(),
        }
    }
}

impl Projection for Document {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("openapi", Value::from(self.openapi.as_str())),
            ("info", self.info.project()),
            ("paths", self.paths.project()),
            ("servers", nodes(&self.servers)),
            ("components", node(&self.components)),
            ("security", nodes(&self.security)),
            ("tags", nodes(&self.tags)),
            ("external_docs", node(&self.external_docs)),
        ]
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["openapi", "info", "paths"]
    }

    fn renamed_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[("external_docs", "externalDocs")]
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Info::default())
    }
}

serialize_via_projection!(Path, Paths, Components, Document);
