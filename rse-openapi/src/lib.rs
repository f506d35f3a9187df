mod annotate;
mod error;
mod json_schema;
pub mod model;
mod registry;
mod render;
mod source;
mod synth;
pub mod url;

pub use annotate::{default_status, Annotation, RequestDecl, ResponseDecl, DEFAULT_CONTENT_TYPE};
pub use error::{OpenApiError, Result};
pub use json_schema::JsonSchemaSource;
pub use model::*;
pub use registry::{HandlerId, OpenApiRegistry, MAX_NAME_PROBES};
pub use render::{RouteEntry, RouteTable};
pub use source::{FieldDescriptor, FieldKind, NestedSchema, ObjectSchema, SchemaSource, Validator};
pub use synth::SynthOptions;
pub use url::{parse_url, UrlTemplate};
