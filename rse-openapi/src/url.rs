use crate::error::{OpenApiError, Result};
use crate::model::{DataType, Parameter, Schema, StringFormat};

/// A route pattern rewritten to OpenAPI `{name}` syntax, plus the path
/// parameters its placeholders declare.
#[derive(Debug, Clone, PartialEq)]
pub struct UrlTemplate {
    pub url: String,
    pub parameters: Vec<Parameter>,
}

/// Parses a framework route pattern such as `/items/<int:id>`.
///
/// Every `<type:name>` or `<name>` placeholder becomes a required path
/// parameter, in order of appearance. Converter arguments
/// (`<string(length=2):code>`) are ignored.
pub fn parse_url(pattern: &str) -> Result<UrlTemplate> {
    let mut url = String::with_capacity(pattern.len());
    let mut parameters = Vec::new();
    let mut rest = pattern;

    while let Some(start) = rest.find('<') {
        url.push_str(&rest[..start]);
        let placeholder_start = &rest[start + 1..];
        let end = placeholder_start
            .find('>')
            .ok_or_else(|| OpenApiError::MalformedUrl {
                url: pattern.to_string(),
                reason: "unterminated placeholder",
            })?;
        let placeholder = &placeholder_start[..end];

        let (name, schema) = parse_placeholder(pattern, placeholder)?;
        url.push('{');
        url.push_str(name);
        url.push('}');
        parameters.push(Parameter::path(name, schema).with_description(name));

        rest = &placeholder_start[end + 1..];
    }
    url.push_str(rest);

    Ok(UrlTemplate { url, parameters })
}

fn parse_placeholder<'a>(pattern: &str, placeholder: &'a str) -> Result<(&'a str, Schema)> {
    let (converter, name) = match placeholder.rsplit_once(':') {
        Some((converter, name)) => (Some(converter.trim()), name.trim()),
        None => (None, placeholder.trim()),
    };
    if name.is_empty() || name.contains('<') {
        return Err(OpenApiError::MalformedUrl {
            url: pattern.to_string(),
            reason: "placeholder without a name",
        });
    }

    let schema = match converter {
        None => Schema::of(DataType::String),
        Some(converter) => {
            let token = converter
                .find('(')
                .map_or(converter, |args| &converter[..args])
                .trim();
            path_schema(token).ok_or_else(|| OpenApiError::UnknownUrlType {
                url: pattern.to_string(),
                token: token.to_string(),
            })?
        }
    };
    Ok((name, schema))
}

fn path_schema(token: &str) -> Option<Schema> {
    let schema = match token {
        "int" => Schema::of(DataType::Integer),
        "float" => Schema::of(DataType::Number),
        "string" | "path" | "any" => Schema::of(DataType::String),
        "uuid" => Schema {
            format: Some(StringFormat::Uuid.into()),
            ..Schema::of(DataType::String)
        },
        _ => return None,
    };
    Some(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ParameterLocation, RefOr};

    fn schema_of(parameter: &Parameter) -> &Schema {
        parameter
            .schema
            .as_ref()
            .and_then(RefOr::as_item)
            .expect("inline schema")
    }

    #[test]
    fn typed_placeholder() {
        let template = parse_url("/items/<int:id>").unwrap();
        assert_eq!(template.url, "/items/{id}");
        assert_eq!(template.parameters.len(), 1);

        let id = &template.parameters[0];
        assert_eq!(id.name, "id");
        assert_eq!(id.location, ParameterLocation::Path);
        assert!(id.required);
        assert_eq!(id.description.as_deref(), Some("id"));
        assert_eq!(schema_of(id).data_type, vec![DataType::Integer]);
    }

    #[test]
    fn untyped_placeholder_defaults_to_string() {
        let template = parse_url("/users/<name>/posts").unwrap();
        assert_eq!(template.url, "/users/{name}/posts");
        assert_eq!(
            schema_of(&template.parameters[0]).data_type,
            vec![DataType::String]
        );
    }

    #[test]
    fn several_placeholders_keep_order() {
        let template = parse_url("/a/<uuid:org>/b/<float:ratio>/<path:rest>").unwrap();
        assert_eq!(template.url, "/a/{org}/b/{ratio}/{rest}");
        let names: Vec<_> = template.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["org", "ratio", "rest"]);
        assert_eq!(
            schema_of(&template.parameters[0]).format.as_deref(),
            Some("uuid")
        );
        assert_eq!(
            schema_of(&template.parameters[1]).data_type,
            vec![DataType::Number]
        );
    }

    #[test]
    fn converter_arguments_are_ignored() {
        let template = parse_url("/lang/<string(length=2):code>").unwrap();
        assert_eq!(template.url, "/lang/{code}");
        assert_eq!(
            schema_of(&template.parameters[0]).data_type,
            vec![DataType::String]
        );
    }

    #[test]
    fn static_url_is_unchanged() {
        let template = parse_url("/health").unwrap();
        assert_eq!(template.url, "/health");
        assert!(template.parameters.is_empty());
    }

    #[test]
    fn unknown_type_is_an_error() {
        let err = parse_url("/x/<color:c>").unwrap_err();
        assert!(matches!(err, OpenApiError::UnknownUrlType { ref token, .. } if token == "color"));
    }

    #[test]
    fn unterminated_placeholder_is_an_error() {
        assert!(matches!(
            parse_url("/x/<int:id"),
            Err(OpenApiError::MalformedUrl { .. })
        ));
        assert!(matches!(
            parse_url("/x/<int:>"),
            Err(OpenApiError::MalformedUrl { .. })
        ));
    }
}
