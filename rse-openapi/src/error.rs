use std::fmt;

/// Errors raised while building or serializing an OpenAPI document.
///
/// Every variant is a configuration error: it surfaces during application
/// startup (schema registration, annotation, first render) and is meant to
/// be propagated to the host rather than recovered from.
#[derive(Debug)]
pub enum OpenApiError {
    /// A schema carries facets its declared type set does not accept.
    InvalidSchema {
        facets: Vec<&'static str>,
        requires: &'static str,
    },
    /// A security scheme is missing fields its type requires.
    InvalidSecurityScheme {
        scheme_type: &'static str,
        missing: Vec<&'static str>,
    },
    /// A URL placeholder names a converter with no OpenAPI mapping.
    UnknownUrlType { url: String, token: String },
    /// A URL pattern could not be tokenized.
    MalformedUrl { url: String, reason: &'static str },
    /// Every numbered variant of a schema name is already taken.
    NamesExhausted { name: String },
    /// The document could not be written as JSON or YAML.
    Serialize(String),
}

impl fmt::Display for OpenApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenApiError::InvalidSchema { facets, requires } => write!(
                f,
                "Schema facet(s) {} can only be used with {requires} schemas",
                facets.join(", ")
            ),
            OpenApiError::InvalidSecurityScheme {
                scheme_type,
                missing,
            } => write!(
                f,
                "Security scheme of type '{scheme_type}' requires: {}",
                missing.join(", ")
            ),
            OpenApiError::UnknownUrlType { url, token } => {
                write!(f, "Unknown path parameter type '{token}' in url '{url}'")
            }
            OpenApiError::MalformedUrl { url, reason } => {
                write!(f, "Malformed url '{url}': {reason}")
            }
            OpenApiError::NamesExhausted { name } => {
                write!(f, "No free schema name left for '{name}'")
            }
            OpenApiError::Serialize(msg) => write!(f, "Document serialization error: {msg}"),
        }
    }
}

impl std::error::Error for OpenApiError {}

impl From<serde_json::Error> for OpenApiError {
    fn from(err: serde_json::Error) -> Self {
        OpenApiError::Serialize(err.to_string())
    }
}

impl From<serde_yaml::Error> for OpenApiError {
    fn from(err: serde_yaml::Error) -> Self {
        OpenApiError::Serialize(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OpenApiError>;
