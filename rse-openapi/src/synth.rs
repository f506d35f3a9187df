use crate::error::Result;
use crate::model::{DataType, RefOr, Reference, Schema, StringFormat};
use crate::registry::OpenApiRegistry;
use crate::source::{FieldDescriptor, FieldKind, NestedSchema, SchemaSource, Validator};
use tracing::debug;

/// Per-call adjustments to schema synthesis.
#[derive(Debug, Clone, Default)]
pub struct SynthOptions {
    /// Fields left out on top of the source's own exclusions.
    pub exclude: Vec<String>,
    /// Replaces the source's description.
    pub description: Option<String>,
}

impl SynthOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Builds the object schema for `source`, registering nested schemas on the
/// way. Self-references are left as [`Reference::Enclosing`], references
/// to schemas further out as [`Reference::Pending`].
pub(crate) fn synthesize(
    registry: &mut OpenApiRegistry,
    source: &dyn SchemaSource,
    options: &SynthOptions,
) -> Result<Schema> {
    let mut excluded = source.excluded();
    excluded.extend(options.exclude.iter().cloned());

    let mut builder = Schema::builder(DataType::Object);
    for (name, field) in source.fields() {
        if excluded.contains(&name) {
            continue;
        }
        if field.required {
            builder = builder.required(name.as_str());
        }
        let property = synthesize_field(registry, &name, &field)?;
        builder = builder.property(name, property);
    }

    if let Some(description) = options.description.clone().or_else(|| source.description()) {
        builder = builder.description(description);
    }
    builder.build()
}

fn synthesize_field(
    registry: &mut OpenApiRegistry,
    name: &str,
    field: &FieldDescriptor,
) -> Result<RefOr<Schema>> {
    if let (FieldKind::Nested, Some(nested)) = (&field.kind, &field.nested) {
        return Ok(RefOr::Ref(nested_reference(registry, nested, &field.excluded)?));
    }

    let mut schema = mapped_schema(&field.kind);
    if let (Some(FieldKind::Nested), Some(nested)) = (field.kind.element(), &field.nested) {
        let reference = nested_reference(registry, nested, &field.excluded)?;
        schema.items = Some(Box::new(RefOr::Ref(reference)));
    }
    if let FieldKind::Other(kind) = &field.kind {
        debug!(field = name, kind = %kind, "Unmapped field kind, emitting untyped schema");
    }

    apply_validators(&mut schema, name, &field.validators);
    schema.default = field.default.clone();
    schema.description = field.description.clone();
    Ok(RefOr::Item(schema))
}

/// Static kind to type/format table. Lists carry their element schema
/// inline; nested lists are patched by the caller.
fn mapped_schema(kind: &FieldKind) -> Schema {
    let formatted = |format: StringFormat| Schema {
        format: Some(format.into()),
        ..Schema::of(DataType::String)
    };

    match kind {
        FieldKind::String | FieldKind::Raw => Schema::of(DataType::String),
        FieldKind::Url => formatted(StringFormat::Uri),
        FieldKind::Date => formatted(StringFormat::Date),
        FieldKind::DateTime => formatted(StringFormat::DateTime),
        FieldKind::Time => formatted(StringFormat::Time),
        FieldKind::Uuid => formatted(StringFormat::Uuid),
        FieldKind::Email => formatted(StringFormat::Email),
        FieldKind::Integer => Schema::of(DataType::Integer),
        FieldKind::Float | FieldKind::Decimal | FieldKind::Number => Schema::of(DataType::Number),
        FieldKind::Boolean => Schema::of(DataType::Boolean),
        FieldKind::Nested | FieldKind::Dict => Schema::of(DataType::Object),
        FieldKind::List(element) => Schema {
            items: Some(Box::new(RefOr::Item(mapped_schema(element)))),
            ..Schema::of(DataType::Array)
        },
        FieldKind::Other(_) => Schema::default(),
    }
}

fn apply_validators(schema: &mut Schema, field: &str, validators: &[Validator]) {
    let is_string = schema.has_type(DataType::String);
    let is_array = schema.has_type(DataType::Array);
    let is_numeric = schema.has_type(DataType::Integer) || schema.has_type(DataType::Number);

    for validator in validators {
        match validator {
            Validator::Length { min, max } if is_string => {
                schema.min_length = min.or(schema.min_length);
                schema.max_length = max.or(schema.max_length);
            }
            Validator::Length { min, max } if is_array => {
                schema.min_items = min.or(schema.min_items);
                schema.max_items = max.or(schema.max_items);
            }
            Validator::Range { min, max } if is_numeric => {
                schema.minimum = min.or(schema.minimum);
                schema.maximum = max.or(schema.maximum);
            }
            Validator::Pattern(pattern) if is_string => {
                schema.pattern = Some(pattern.clone());
            }
            Validator::OneOf(choices) => {
                schema.enumeration = choices.clone();
            }
            other => {
                debug!(field, validator = ?other, "Validator does not apply to the field type, skipped");
            }
        }
    }
}

fn nested_reference(
    registry: &mut OpenApiRegistry,
    nested: &NestedSchema,
    excluded: &[String],
) -> Result<Reference> {
    let source = match nested {
        NestedSchema::Enclosing => return Ok(Reference::Enclosing),
        NestedSchema::Source(source) => source,
    };

    match registry.synthesis_position(&source.type_name()) {
        Some((0, _)) => return Ok(Reference::Enclosing),
        Some((_, token)) => {
            debug!(schema = %source.type_name(), "Indirect schema cycle, deferring the reference");
            return Ok(Reference::Pending(token));
        }
        None => {}
    }

    let options = SynthOptions::new().exclude(excluded.iter().cloned());
    let (name, _) = registry.add_schema_with(source.as_ref(), None, &options)?;
    Ok(Reference::schema(name))
}
