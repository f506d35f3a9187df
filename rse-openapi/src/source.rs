//! The field-introspection contract consumed by the schema synthesizer.
//!
//! A validation library exposes its schemas through [`SchemaSource`]: an
//! ordered list of named [`FieldDescriptor`]s plus a type name. The crate
//! ships two sources, the declarative [`ObjectSchema`] and the
//! schemars-backed [`JsonSchemaSource`](crate::JsonSchemaSource).

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Declared kind of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String,
    Raw,
    Url,
    Date,
    DateTime,
    Time,
    Uuid,
    Email,
    Integer,
    Float,
    Decimal,
    Number,
    Boolean,
    Nested,
    Dict,
    /// Homogeneous list of the wrapped element kind.
    List(Box<FieldKind>),
    /// A kind with no OpenAPI mapping; synthesized as an untyped schema.
    Other(String),
}

impl FieldKind {
    pub fn list_of(element: FieldKind) -> Self {
        FieldKind::List(Box::new(element))
    }

    pub fn element(&self) -> Option<&FieldKind> {
        match self {
            FieldKind::List(element) => Some(element),
            _ => None,
        }
    }
}

/// Validation constraints a field declares.
#[derive(Debug, Clone, PartialEq)]
pub enum Validator {
    /// String length, or item count for lists.
    Length { min: Option<u64>, max: Option<u64> },
    Range { min: Option<f64>, max: Option<f64> },
    Pattern(String),
    OneOf(Vec<Value>),
}

/// The schema a nested (or list-of-nested) field points at.
#[derive(Clone)]
pub enum NestedSchema {
    Source(Arc<dyn SchemaSource + Send + Sync>),
    /// The schema that declares the field.
    Enclosing,
}

impl fmt::Debug for NestedSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NestedSchema::Source(source) => f
                .debug_tuple("Source")
                .field(&source.type_name())
                .finish(),
            NestedSchema::Enclosing => f.write_str("Enclosing"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub kind: FieldKind,
    pub required: bool,
    pub validators: Vec<Validator>,
    pub nested: Option<NestedSchema>,
    /// Fields of the nested schema to leave out.
    pub excluded: Vec<String>,
    pub default: Option<Value>,
    pub description: Option<String>,
}

impl FieldDescriptor {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            required: false,
            validators: Vec::new(),
            nested: None,
            excluded: Vec::new(),
            default: None,
            description: None,
        }
    }

    pub fn string() -> Self {
        Self::new(FieldKind::String)
    }

    pub fn integer() -> Self {
        Self::new(FieldKind::Integer)
    }

    pub fn number() -> Self {
        Self::new(FieldKind::Number)
    }

    pub fn boolean() -> Self {
        Self::new(FieldKind::Boolean)
    }

    pub fn list(element: FieldKind) -> Self {
        Self::new(FieldKind::list_of(element))
    }

    pub fn nested<S>(source: S) -> Self
    where
        S: SchemaSource + Send + Sync + 'static,
    {
        Self::nested_shared(Arc::new(source))
    }

    pub fn nested_shared(source: Arc<dyn SchemaSource + Send + Sync>) -> Self {
        Self {
            nested: Some(NestedSchema::Source(source)),
            ..Self::new(FieldKind::Nested)
        }
    }

    pub fn list_of<S>(source: S) -> Self
    where
        S: SchemaSource + Send + Sync + 'static,
    {
        Self::list_of_shared(Arc::new(source))
    }

    pub fn list_of_shared(source: Arc<dyn SchemaSource + Send + Sync>) -> Self {
        Self {
            nested: Some(NestedSchema::Source(source)),
            ..Self::list(FieldKind::Nested)
        }
    }

    /// A field holding another instance of the declaring schema.
    pub fn enclosing() -> Self {
        Self {
            nested: Some(NestedSchema::Enclosing),
            ..Self::new(FieldKind::Nested)
        }
    }

    pub fn list_of_enclosing() -> Self {
        Self {
            nested: Some(NestedSchema::Enclosing),
            ..Self::list(FieldKind::Nested)
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn length(self, min: Option<u64>, max: Option<u64>) -> Self {
        self.validate(Validator::Length { min, max })
    }

    pub fn range(self, min: Option<f64>, max: Option<f64>) -> Self {
        self.validate(Validator::Range { min, max })
    }

    pub fn pattern(self, pattern: impl Into<String>) -> Self {
        self.validate(Validator::Pattern(pattern.into()))
    }

    pub fn one_of(self, choices: impl IntoIterator<Item = Value>) -> Self {
        self.validate(Validator::OneOf(choices.into_iter().collect()))
    }

    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A schema whose fields can be introspected.
pub trait SchemaSource {
    /// Declared type identity, e.g. `CategorySchema`.
    fn type_name(&self) -> String;

    /// Field descriptors in declaration order.
    fn fields(&self) -> Vec<(String, FieldDescriptor)>;

    /// Fields the schema itself excludes.
    fn excluded(&self) -> Vec<String> {
        Vec::new()
    }

    fn description(&self) -> Option<String> {
        None
    }
}

/// A schema declared in code.
///
/// ```
/// use rse_openapi::{FieldDescriptor, ObjectSchema};
///
/// let category = ObjectSchema::new("CategorySchema")
///     .field("name", FieldDescriptor::string().required())
///     .field("children", FieldDescriptor::list_of_enclosing());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    name: String,
    fields: Vec<(String, FieldDescriptor)>,
    excluded: Vec<String>,
    description: Option<String>,
}

impl ObjectSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn field(mut self, name: impl Into<String>, field: FieldDescriptor) -> Self {
        self.fields.push((name.into(), field));
        self
    }

    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl SchemaSource for ObjectSchema {
    fn type_name(&self) -> String {
        self.name.clone()
    }

    fn fields(&self) -> Vec<(String, FieldDescriptor)> {
        self.fields.clone()
    }

    fn excluded(&self) -> Vec<String> {
        self.excluded.clone()
    }

    fn description(&self) -> Option<String> {
        self.description.clone()
    }
}
