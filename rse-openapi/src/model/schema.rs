use super::{
    flag, nodes, number, opt_bool, opt_u64, project_fields, raw, text, Projection, RefOr, Reference,
};
use crate::error::{OpenApiError, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// JSON Schema primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataType {
    Boolean,
    Object,
    Array,
    Number,
    String,
    Integer,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Boolean => "boolean",
            DataType::Object => "object",
            DataType::Array => "array",
            DataType::Number => "number",
            DataType::String => "string",
            DataType::Integer => "integer",
        }
    }

    /// Type-specific facets this type accepts (internal names).
    fn facets(&self) -> &'static [&'static str] {
        match self {
            DataType::String => &["pattern", "min_length", "max_length", "format"],
            DataType::Integer | DataType::Number => &[
                "multiple_of",
                "maximum",
                "exclusive_maximum",
                "minimum",
                "exclusive_minimum",
                "format",
            ],
            DataType::Object => &[
                "properties",
                "additional_properties",
                "required_properties",
                "dependencies",
                "min_properties",
                "max_properties",
            ],
            DataType::Array => &["items", "min_items", "max_items", "unique_items"],
            DataType::Boolean => &[],
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common `format` hints for string schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringFormat {
    Date,
    DateTime,
    Time,
    Email,
    Uri,
    Uuid,
    Hostname,
    Ipv4,
    Ipv6,
    Byte,
    Binary,
    Password,
}

impl StringFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            StringFormat::Date => "date",
            StringFormat::DateTime => "date-time",
            StringFormat::Time => "time",
            StringFormat::Email => "email",
            StringFormat::Uri => "uri",
            StringFormat::Uuid => "uuid",
            StringFormat::Hostname => "hostname",
            StringFormat::Ipv4 => "ipv4",
            StringFormat::Ipv6 => "ipv6",
            StringFormat::Byte => "byte",
            StringFormat::Binary => "binary",
            StringFormat::Password => "password",
        }
    }
}

impl From<StringFormat> for String {
    fn from(format: StringFormat) -> Self {
        format.as_str().to_string()
    }
}

/// Facets emitted whatever the declared type set.
const GENERIC_FIELDS: &[&str] = &[
    "data_type",
    "title",
    "description",
    "default",
    "examples",
    "enumeration",
    "nullable",
    "read_only",
    "write_only",
    "deprecated",
    "all_of",
    "any_of",
    "one_of",
    "not",
];

/// A schema object.
///
/// Fields are public so hand-built schemas can be written with struct
/// update syntax. Construct schemas with facets through [`SchemaBuilder`],
/// which checks each facet against the declared type set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub data_type: Vec<DataType>,
    // numeric
    pub multiple_of: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_maximum: bool,
    pub minimum: Option<f64>,
    pub exclusive_minimum: bool,
    // string
    pub pattern: Option<String>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub format: Option<String>,
    // object
    pub properties: BTreeMap<String, RefOr<Schema>>,
    pub additional_properties: Option<bool>,
    pub required_properties: Vec<String>,
    pub dependencies: BTreeMap<String, Vec<String>>,
    pub min_properties: Option<u64>,
    pub max_properties: Option<u64>,
    // array
    pub items: Option<Box<RefOr<Schema>>>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub unique_items: bool,
    // generic
    pub title: Option<String>,
    pub description: Option<String>,
    pub default: Option<Value>,
    pub examples: Vec<Value>,
    pub enumeration: Vec<Value>,
    pub nullable: bool,
    pub read_only: bool,
    pub write_only: bool,
    pub deprecated: bool,
    // combinations
    pub all_of: Vec<RefOr<Schema>>,
    pub any_of: Vec<RefOr<Schema>>,
    pub one_of: Vec<RefOr<Schema>>,
    pub not: Option<Box<RefOr<Schema>>>,
}

impl Schema {
    /// A plain schema of one type, without facets.
    pub fn of(data_type: DataType) -> Self {
        Self {
            data_type: vec![data_type],
            ..Self::default()
        }
    }

    pub fn builder(data_type: DataType) -> SchemaBuilder {
        SchemaBuilder {
            schema: Self::of(data_type),
        }
    }

    pub fn builder_for(data_types: impl IntoIterator<Item = DataType>) -> SchemaBuilder {
        SchemaBuilder {
            schema: Self {
                data_type: data_types.into_iter().collect(),
                ..Self::default()
            },
        }
    }

    /// A builder for a schema with no declared type.
    pub fn untyped() -> SchemaBuilder {
        SchemaBuilder {
            schema: Self::default(),
        }
    }

    pub fn all_of(schemas: impl IntoIterator<Item = RefOr<Schema>>) -> Self {
        Self {
            all_of: schemas.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn any_of(schemas: impl IntoIterator<Item = RefOr<Schema>>) -> Self {
        Self {
            any_of: schemas.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn one_of(schemas: impl IntoIterator<Item = RefOr<Schema>>) -> Self {
        Self {
            one_of: schemas.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn has_type(&self, data_type: DataType) -> bool {
        self.data_type.contains(&data_type)
    }

    pub fn is_untyped(&self) -> bool {
        self.data_type.is_empty()
    }

    /// Checks type-conditional facets against the declared type set.
    pub fn validate(&self) -> Result<()> {
        if self.is_untyped() {
            return Ok(());
        }

        let numeric: Vec<&'static str> = [
            ("multipleOf", self.multiple_of.is_some()),
            ("maximum", self.maximum.is_some()),
            ("exclusiveMaximum", self.exclusive_maximum),
            ("minimum", self.minimum.is_some()),
            ("exclusiveMinimum", self.exclusive_minimum),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect();
        if !numeric.is_empty()
            && !self.has_type(DataType::Number)
            && !self.has_type(DataType::Integer)
        {
            return Err(OpenApiError::InvalidSchema {
                facets: numeric,
                requires: "number or integer",
            });
        }

        let string: Vec<&'static str> = [
            ("pattern", self.pattern.is_some()),
            ("minLength", self.min_length.is_some()),
            ("maxLength", self.max_length.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect();
        if !string.is_empty() && !self.has_type(DataType::String) {
            return Err(OpenApiError::InvalidSchema {
                facets: string,
                requires: "string",
            });
        }

        Ok(())
    }

    /// Rewrites every enclosing-schema sentinel under this schema to
    /// `#/components/schemas/{name}`.
    pub(crate) fn resolve_enclosing(&mut self, name: &str) {
        self.visit_references_mut(&mut |reference| reference.resolve_enclosing(name));
    }

    /// Calls `visit` on every reference in the schema tree, depth first.
    pub(crate) fn visit_references_mut(&mut self, visit: &mut dyn FnMut(&mut Reference)) {
        let children = self
            .properties
            .values_mut()
            .chain(self.items.as_deref_mut())
            .chain(self.not.as_deref_mut())
            .chain(self.all_of.iter_mut())
            .chain(self.any_of.iter_mut())
            .chain(self.one_of.iter_mut());
        for child in children {
            match child {
                RefOr::Ref(reference) => visit(reference),
                RefOr::Item(inline) => inline.visit_references_mut(visit),
            }
        }
    }

    /// Tokens of outer schemas this schema still waits on.
    pub(crate) fn pending_tokens(&self) -> Vec<u64> {
        let mut tokens = Vec::new();
        self.clone().visit_references_mut(&mut |reference| {
            if let Reference::Pending(token) = reference {
                if !tokens.contains(token) {
                    tokens.push(*token);
                }
            }
        });
        tokens
    }

    fn accepts(&self, field: &str) -> bool {
        GENERIC_FIELDS.contains(&field)
            || self.is_untyped()
            || self.data_type.iter().any(|t| t.facets().contains(&field))
    }
}

impl Projection for Schema {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        let data_type = match self.data_type.as_slice() {
            [] => Value::Null,
            [single] => Value::from(single.as_str()),
            many => Value::Array(many.iter().map(|t| Value::from(t.as_str())).collect()),
        };
        let properties: Map<String, Value> = self
            .properties
            .iter()
            .map(|(name, schema)| (name.clone(), schema.project()))
            .collect();
        let dependencies: Map<String, Value> = self
            .dependencies
            .iter()
            .map(|(name, deps)| (name.clone(), super::strings(deps)))
            .collect();

        vec![
            ("data_type", data_type),
            ("multiple_of", number(self.multiple_of)),
            ("maximum", number(self.maximum)),
            ("exclusive_maximum", flag(self.exclusive_maximum)),
            ("minimum", number(self.minimum)),
            ("exclusive_minimum", flag(self.exclusive_minimum)),
            ("pattern", text(&self.pattern)),
            ("min_length", opt_u64(self.min_length)),
            ("max_length", opt_u64(self.max_length)),
            ("format", text(&self.format)),
            ("properties", Value::Object(properties)),
            ("additional_properties", opt_bool(self.additional_properties)),
            ("required_properties", super::strings(&self.required_properties)),
            ("dependencies", Value::Object(dependencies)),
            ("min_properties", opt_u64(self.min_properties)),
            ("max_properties", opt_u64(self.max_properties)),
            (
                "items",
                self.items.as_ref().map_or(Value::Null, |items| items.project()),
            ),
            ("min_items", opt_u64(self.min_items)),
            ("max_items", opt_u64(self.max_items)),
            ("unique_items", flag(self.unique_items)),
            ("title", text(&self.title)),
            ("description", text(&self.description)),
            ("default", raw(&self.default)),
            ("examples", Value::Array(self.examples.clone())),
            ("enumeration", Value::Array(self.enumeration.clone())),
            ("nullable", flag(self.nullable)),
            ("read_only", flag(self.read_only)),
            ("write_only", flag(self.write_only)),
            ("deprecated", flag(self.deprecated)),
            ("all_of", nodes(&self.all_of)),
            ("any_of", nodes(&self.any_of)),
            ("one_of", nodes(&self.one_of)),
            (
                "not",
                self.not.as_ref().map_or(Value::Null, |not| not.project()),
            ),
        ]
    }

    fn renamed_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("data_type", "type"),
            ("multiple_of", "multipleOf"),
            ("exclusive_maximum", "exclusiveMaximum"),
            ("exclusive_minimum", "exclusiveMinimum"),
            ("min_length", "minLength"),
            ("max_length", "maxLength"),
            ("additional_properties", "additionalProperties"),
            ("required_properties", "required"),
            ("min_properties", "minProperties"),
            ("max_properties", "maxProperties"),
            ("min_items", "minItems"),
            ("max_items", "maxItems"),
            ("unique_items", "uniqueItems"),
            ("enumeration", "enum"),
            ("read_only", "readOnly"),
            ("write_only", "writeOnly"),
            ("all_of", "allOf"),
            ("any_of", "anyOf"),
            ("one_of", "oneOf"),
        ]
    }

    fn project(&self) -> Value {
        let fields = self
            .fields()
            .into_iter()
            .filter(|(name, _)| self.accepts(name))
            .collect();
        project_fields(fields, self.required_fields(), self.renamed_fields())
    }
}

serialize_via_projection!(Schema);

/// Fluent constructor for [`Schema`]; [`SchemaBuilder::build`] rejects
/// facets the declared type set does not accept.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn multiple_of(mut self, value: f64) -> Self {
        self.schema.multiple_of = Some(value);
        self
    }

    pub fn minimum(mut self, value: f64) -> Self {
        self.schema.minimum = Some(value);
        self
    }

    pub fn maximum(mut self, value: f64) -> Self {
        self.schema.maximum = Some(value);
        self
    }

    pub fn exclusive_minimum(mut self, exclusive: bool) -> Self {
        self.schema.exclusive_minimum = exclusive;
        self
    }

    pub fn exclusive_maximum(mut self, exclusive: bool) -> Self {
        self.schema.exclusive_maximum = exclusive;
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.schema.pattern = Some(pattern.into());
        self
    }

    pub fn min_length(mut self, length: u64) -> Self {
        self.schema.min_length = Some(length);
        self
    }

    pub fn max_length(mut self, length: u64) -> Self {
        self.schema.max_length = Some(length);
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.schema.format = Some(format.into());
        self
    }

    pub fn property(mut self, name: impl Into<String>, schema: impl Into<RefOr<Schema>>) -> Self {
        self.schema.properties.insert(name.into(), schema.into());
        self
    }

    pub fn required(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.schema.required_properties.contains(&name) {
            self.schema.required_properties.push(name);
        }
        self
    }

    pub fn additional_properties(mut self, allowed: bool) -> Self {
        self.schema.additional_properties = Some(allowed);
        self
    }

    pub fn dependency<I, S>(mut self, name: impl Into<String>, requires: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schema
            .dependencies
            .insert(name.into(), requires.into_iter().map(Into::into).collect());
        self
    }

    pub fn min_properties(mut self, count: u64) -> Self {
        self.schema.min_properties = Some(count);
        self
    }

    pub fn max_properties(mut self, count: u64) -> Self {
        self.schema.max_properties = Some(count);
        self
    }

    pub fn items(mut self, schema: impl Into<RefOr<Schema>>) -> Self {
        self.schema.items = Some(Box::new(schema.into()));
        self
    }

    pub fn min_items(mut self, count: u64) -> Self {
        self.schema.min_items = Some(count);
        self
    }

    pub fn max_items(mut self, count: u64) -> Self {
        self.schema.max_items = Some(count);
        self
    }

    pub fn unique_items(mut self, unique: bool) -> Self {
        self.schema.unique_items = unique;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.schema.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.schema.description = Some(description.into());
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.schema.default = Some(value);
        self
    }

    pub fn example(mut self, value: Value) -> Self {
        self.schema.examples.push(value);
        self
    }

    pub fn enumeration(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.schema.enumeration = values.into_iter().collect();
        self
    }

    /// Stored as a one-element `enum`.
    pub fn constant(mut self, value: Value) -> Self {
        self.schema.enumeration = vec![value];
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.schema.nullable = nullable;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.schema.read_only = read_only;
        self
    }

    pub fn write_only(mut self, write_only: bool) -> Self {
        self.schema.write_only = write_only;
        self
    }

    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.schema.deprecated = deprecated;
        self
    }

    pub fn not(mut self, schema: impl Into<RefOr<Schema>>) -> Self {
        self.schema.not = Some(Box::new(schema.into()));
        self
    }

    pub fn build(self) -> Result<Schema> {
        self.schema.validate()?;
        Ok(self.schema)
    }
}
