use super::{node, text, Projection};
use crate::error::{OpenApiError, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecurityType {
    ApiKey,
    Http,
    OAuth2,
    OpenIdConnect,
}

impl SecurityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityType::ApiKey => "apiKey",
            SecurityType::Http => "http",
            SecurityType::OAuth2 => "oauth2",
            SecurityType::OpenIdConnect => "openIdConnect",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiKeyLocation {
    Query,
    Header,
    Cookie,
}

impl ApiKeyLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKeyLocation::Query => "query",
            ApiKeyLocation::Header => "header",
            ApiKeyLocation::Cookie => "cookie",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OAuthFlow {
    pub authorization_url: Option<String>,
    pub token_url: Option<String>,
    pub refresh_url: Option<String>,
    pub scopes: BTreeMap<String, String>,
}

impl OAuthFlow {
    pub fn with_scope(mut self, scope: impl Into<String>, description: impl Into<String>) -> Self {
        self.scopes.insert(scope.into(), description.into());
        self
    }
}

impl Projection for OAuthFlow {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        let scopes: Map<String, Value> = self
            .scopes
            .iter()
            .map(|(scope, description)| (scope.clone(), Value::from(description.as_str())))
            .collect();
        vec![
            ("authorization_url", text(&self.authorization_url)),
            ("token_url", text(&self.token_url)),
            ("refresh_url", text(&self.refresh_url)),
            ("scopes", Value::Object(scopes)),
        ]
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["scopes"]
    }

    fn renamed_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("authorization_url", "authorizationUrl"),
            ("token_url", "tokenUrl"),
            ("refresh_url", "refreshUrl"),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OAuthFlows {
    pub implicit: Option<OAuthFlow>,
    pub password: Option<OAuthFlow>,
    pub client_credentials: Option<OAuthFlow>,
    pub authorization_code: Option<OAuthFlow>,
}

impl Projection for OAuthFlows {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("implicit", node(&self.implicit)),
            ("password", node(&self.password)),
            ("client_credentials", node(&self.client_credentials)),
            ("authorization_code", node(&self.authorization_code)),
        ]
    }

    fn renamed_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("client_credentials", "clientCredentials"),
            ("authorization_code", "authorizationCode"),
        ]
    }
}

/// A security scheme declared under `components.securitySchemes`.
///
/// Built only through [`SecuritySchemeBuilder::build`] (or the infallible
/// shortcuts below), which rejects schemes missing the fields their type
/// requires.
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityScheme {
    security_type: SecurityType,
    description: Option<String>,
    name: Option<String>,
    location: Option<ApiKeyLocation>,
    scheme: Option<String>,
    bearer_format: Option<String>,
    flows: Option<OAuthFlows>,
    open_id_connect_url: Option<String>,
}

impl SecurityScheme {
    pub fn builder(security_type: SecurityType) -> SecuritySchemeBuilder {
        SecuritySchemeBuilder {
            scheme: SecurityScheme {
                security_type,
                description: None,
                name: None,
                location: None,
                scheme: None,
                bearer_format: None,
                flows: None,
                open_id_connect_url: None,
            },
        }
    }

    pub fn api_key(name: impl Into<String>, location: ApiKeyLocation) -> Self {
        let mut scheme = Self::builder(SecurityType::ApiKey).scheme;
        scheme.name = Some(name.into());
        scheme.location = Some(location);
        scheme
    }

    pub fn http(scheme_name: impl Into<String>) -> Self {
        let mut scheme = Self::builder(SecurityType::Http).scheme;
        scheme.scheme = Some(scheme_name.into());
        scheme
    }

    pub fn bearer(bearer_format: impl Into<String>) -> Self {
        let mut scheme = Self::http("bearer");
        scheme.bearer_format = Some(bearer_format.into());
        scheme
    }

    pub fn oauth2(flows: OAuthFlows) -> Self {
        let mut scheme = Self::builder(SecurityType::OAuth2).scheme;
        scheme.flows = Some(flows);
        scheme
    }

    pub fn open_id_connect(url: impl Into<String>) -> Self {
        let mut scheme = Self::builder(SecurityType::OpenIdConnect).scheme;
        scheme.open_id_connect_url = Some(url.into());
        scheme
    }

    pub fn security_type(&self) -> SecurityType {
        self.security_type
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        match self.security_type {
            SecurityType::ApiKey => {
                if self.name.is_none() {
                    missing.push("name");
                }
                if self.location.is_none() {
                    missing.push("in");
                }
            }
            SecurityType::Http => {
                if self.scheme.is_none() {
                    missing.push("scheme");
                }
            }
            SecurityType::OAuth2 => {
                if self.flows.is_none() {
                    missing.push("flows");
                }
            }
            SecurityType::OpenIdConnect => {
                if self.open_id_connect_url.is_none() {
                    missing.push("openIdConnectUrl");
                }
            }
        }
        missing
    }
}

pub struct SecuritySchemeBuilder {
    scheme: SecurityScheme,
}

impl SecuritySchemeBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.scheme.description = Some(description.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.scheme.name = Some(name.into());
        self
    }

    pub fn location(mut self, location: ApiKeyLocation) -> Self {
        self.scheme.location = Some(location);
        self
    }

    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme.scheme = Some(scheme.into());
        self
    }

    pub fn bearer_format(mut self, format: impl Into<String>) -> Self {
        self.scheme.bearer_format = Some(format.into());
        self
    }

    pub fn flows(mut self, flows: OAuthFlows) -> Self {
        self.scheme.flows = Some(flows);
        self
    }

    pub fn open_id_connect_url(mut self, url: impl Into<String>) -> Self {
        self.scheme.open_id_connect_url = Some(url.into());
        self
    }

    pub fn build(self) -> Result<SecurityScheme> {
        let missing = self.scheme.missing_fields();
        if missing.is_empty() {
            Ok(self.scheme)
        } else {
            Err(OpenApiError::InvalidSecurityScheme {
                scheme_type: self.scheme.security_type.as_str(),
                missing,
            })
        }
    }
}

impl Projection for SecurityScheme {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("security_type", Value::from(self.security_type.as_str())),
            ("description", text(&self.description)),
            ("name", text(&self.name)),
            (
                "location",
                self.location
                    .map_or(Value::Null, |location| Value::from(location.as_str())),
            ),
            ("scheme", text(&self.scheme)),
            ("bearer_format", text(&self.bearer_format)),
            ("flows", node(&self.flows)),
            ("open_id_connect_url", text(&self.open_id_connect_url)),
        ]
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["security_type"]
    }

    fn renamed_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("security_type", "type"),
            ("location", "in"),
            ("bearer_format", "bearerFormat"),
            ("open_id_connect_url", "openIdConnectUrl"),
        ]
    }
}

/// Scheme name to required scopes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecurityRequirement(BTreeMap<String, Vec<String>>);

impl SecurityRequirement {
    pub fn new<I, S>(scheme: impl Into<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::default().and(scheme, scopes)
    }

    pub fn and<I, S>(mut self, scheme: impl Into<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .insert(scheme.into(), scopes.into_iter().map(Into::into).collect());
        self
    }
}

impl Projection for SecurityRequirement {
    // Keys are scheme names, so the whole object is built in `project`.
    fn fields(&self) -> Vec<(&'static str, Value)> {
        Vec::new()
    }

    fn project(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(scheme, scopes)| (scheme.clone(), super::strings(scopes)))
                .collect(),
        )
    }
}

serialize_via_projection!(OAuthFlow, OAuthFlows, SecurityScheme, SecurityRequirement);
