use super::{node, node_map, strings, text, Projection};
use serde_json::Value;
use std::collections::BTreeMap;

/// API metadata: the `info` section of the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Info {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
    pub terms_of_service: Option<String>,
    pub contact: Option<Contact>,
    pub license: Option<License>,
}

impl Info {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_terms_of_service(mut self, url: impl Into<String>) -> Self {
        self.terms_of_service = Some(url.into());
        self
    }

    pub fn with_contact(mut self, contact: Contact) -> Self {
        self.contact = Some(contact);
        self
    }

    pub fn with_license(mut self, license: License) -> Self {
        self.license = Some(license);
        self
    }
}

impl Projection for Info {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("title", Value::from(self.title.as_str())),
            ("version", Value::from(self.version.as_str())),
            ("description", text(&self.description)),
            ("terms_of_service", text(&self.terms_of_service)),
            ("contact", node(&self.contact)),
            ("api_license", node(&self.license)),
        ]
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["title", "version"]
    }

    fn renamed_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("terms_of_service", "termsOfService"),
            ("api_license", "license"),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contact {
    pub name: Option<String>,
    pub url: Option<String>,
    pub email: Option<String>,
}

impl Projection for Contact {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("name", text(&self.name)),
            ("url", text(&self.url)),
            ("email", text(&self.email)),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct License {
    pub name: String,
    pub url: Option<String>,
}

impl License {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

impl Projection for License {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("name", Value::from(self.name.as_str())),
            ("url", text(&self.url)),
        ]
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["name"]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalDocumentation {
    pub url: String,
    pub description: Option<String>,
}

impl ExternalDocumentation {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            description: None,
        }
    }
}

impl Projection for ExternalDocumentation {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("url", Value::from(self.url.as_str())),
            ("description", text(&self.description)),
        ]
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["url"]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tag {
    pub name: String,
    pub description: Option<String>,
    pub external_docs: Option<ExternalDocumentation>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Projection for Tag {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("name", Value::from(self.name.as_str())),
            ("description", text(&self.description)),
            ("external_docs", node(&self.external_docs)),
        ]
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["name"]
    }

    fn renamed_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[("external_docs", "externalDocs")]
    }
}

/// A substitution variable for a server URL template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerVariable {
    pub default: String,
    pub enumeration: Vec<String>,
    pub description: Option<String>,
}

impl Projection for ServerVariable {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("default", Value::from(self.default.as_str())),
            ("enumeration", strings(&self.enumeration)),
            ("description", text(&self.description)),
        ]
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["default"]
    }

    fn renamed_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[("enumeration", "enum")]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Server {
    pub url: String,
    pub description: Option<String>,
    pub variables: BTreeMap<String, ServerVariable>,
}

impl Server {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, variable: ServerVariable) -> Self {
        self.variables.insert(name.into(), variable);
        self
    }
}

impl Projection for Server {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("url", Value::from(self.url.as_str())),
            ("description", text(&self.description)),
            ("variables", node_map(&self.variables)),
        ]
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["url"]
    }
}

serialize_via_projection!(Info, Contact, License, ExternalDocumentation, Tag, ServerVariable, Server);
