use crate::error::Result;
use crate::model::{
    HttpMethod, MediaType, OperationProps, RefOr, Reference, RequestBody, Response, Schema,
    StatusKey,
};
use crate::registry::{HandlerId, OpenApiRegistry};
use crate::source::SchemaSource;
use crate::synth::SynthOptions;

/// Content type used when a declaration names none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// What a response or request body carries.
enum Payload<'a> {
    Source(&'a dyn SchemaSource, SynthOptions),
    Schema(Schema),
    Reference(Reference),
}

impl Payload<'_> {
    /// Resolves the payload to a schema node and the label used in default
    /// descriptions.
    fn resolve(self, registry: &mut OpenApiRegistry) -> Result<(String, RefOr<Schema>)> {
        match self {
            Payload::Source(source, options) => {
                let (name, _) = registry.add_schema_with(source, None, &options)?;
                Ok((name.clone(), RefOr::Ref(Reference::schema(name))))
            }
            Payload::Schema(schema) => {
                let label = schema.title.clone().unwrap_or_else(|| "Inline".to_string());
                Ok((label, RefOr::Item(schema)))
            }
            Payload::Reference(reference) => {
                let label = reference.name().unwrap_or("Referenced").to_string();
                Ok((label, RefOr::Ref(reference)))
            }
        }
    }
}

fn media_map(content_types: &[String], schema: RefOr<Schema>) -> Vec<(String, MediaType)> {
    let defaults = [DEFAULT_CONTENT_TYPE.to_string()];
    let content_types = if content_types.is_empty() {
        &defaults[..]
    } else {
        content_types
    };
    content_types
        .iter()
        .map(|content_type| (content_type.clone(), MediaType::new(schema.clone())))
        .collect()
}

/// A response declaration for [`Annotation::response`].
pub struct ResponseDecl<'a> {
    body: ResponseBody<'a>,
    status: Option<StatusKey>,
    description: Option<String>,
    content_types: Vec<String>,
}

enum ResponseBody<'a> {
    Payload(Payload<'a>),
    Ready(Response),
}

impl<'a> ResponseDecl<'a> {
    fn with_body(body: ResponseBody<'a>) -> Self {
        Self {
            body,
            status: None,
            description: None,
            content_types: Vec::new(),
        }
    }

    /// A response whose body schema is synthesized from `source`.
    pub fn source(source: &'a dyn SchemaSource) -> Self {
        Self::with_body(ResponseBody::Payload(Payload::Source(
            source,
            SynthOptions::default(),
        )))
    }

    pub fn schema(schema: Schema) -> Self {
        Self::with_body(ResponseBody::Payload(Payload::Schema(schema)))
    }

    pub fn reference(reference: Reference) -> Self {
        Self::with_body(ResponseBody::Payload(Payload::Reference(reference)))
    }

    /// A fully built response, stored as is.
    pub fn ready(response: Response) -> Self {
        Self::with_body(ResponseBody::Ready(response))
    }

    /// Explicit status; otherwise derived from the HTTP method.
    pub fn status(mut self, status: StatusKey) -> Self {
        self.status = Some(status);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_types.push(content_type.into());
        self
    }

    /// Leaves fields of a synthesized schema out.
    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let ResponseBody::Payload(Payload::Source(_, options)) = &mut self.body {
            options.exclude.extend(names.into_iter().map(Into::into));
        }
        self
    }
}

/// A request body declaration for [`Annotation::request`].
pub struct RequestDecl<'a> {
    body: RequestPayload<'a>,
    description: Option<String>,
    content_types: Vec<String>,
    required: bool,
}

enum RequestPayload<'a> {
    Payload(Payload<'a>),
    Ready(RequestBody),
}

impl<'a> RequestDecl<'a> {
    fn with_body(body: RequestPayload<'a>) -> Self {
        Self {
            body,
            description: None,
            content_types: Vec::new(),
            required: true,
        }
    }

    pub fn source(source: &'a dyn SchemaSource) -> Self {
        Self::with_body(RequestPayload::Payload(Payload::Source(
            source,
            SynthOptions::default(),
        )))
    }

    pub fn schema(schema: Schema) -> Self {
        Self::with_body(RequestPayload::Payload(Payload::Schema(schema)))
    }

    pub fn reference(reference: Reference) -> Self {
        Self::with_body(RequestPayload::Payload(Payload::Reference(reference)))
    }

    pub fn ready(body: RequestBody) -> Self {
        Self::with_body(RequestPayload::Ready(body))
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_types.push(content_type.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let RequestPayload::Payload(Payload::Source(_, options)) = &mut self.body {
            options.exclude.extend(names.into_iter().map(Into::into));
        }
        self
    }
}

/// Status a response gets when its declaration names none.
pub fn default_status(method: HttpMethod) -> StatusKey {
    match method {
        HttpMethod::Post => StatusKey::Code(201),
        HttpMethod::Get | HttpMethod::Put | HttpMethod::Patch => StatusKey::Code(200),
        HttpMethod::Delete => StatusKey::Code(204),
        _ => StatusKey::Default,
    }
}

/// Attaches documentation to one `(handler, method)` pair.
///
/// Declarations are stored on the registry and only turned into operations
/// when the registry is rendered.
///
/// ```
/// use rse_openapi::{HttpMethod, Info, OpenApiRegistry, OperationProps, ResponseDecl, Schema, DataType};
///
/// # fn main() -> rse_openapi::Result<()> {
/// let mut registry = OpenApiRegistry::new(Info::new("Pets", "1.0"));
/// let pets = registry.register_handler("pets", ["/pets"]);
/// registry
///     .on(pets, HttpMethod::Get)
///     .response(ResponseDecl::schema(Schema::of(DataType::Array)))?
///     .props(OperationProps::new().summary("List pets"));
/// # Ok(())
/// # }
/// ```
pub struct Annotation<'r> {
    registry: &'r mut OpenApiRegistry,
    handler: HandlerId,
    method: HttpMethod,
}

impl OpenApiRegistry {
    pub fn on(&mut self, handler: HandlerId, method: HttpMethod) -> Annotation<'_> {
        Annotation {
            registry: self,
            handler,
            method,
        }
    }
}

impl<'r> Annotation<'r> {
    /// Adds a response. A second response for the same status replaces the
    /// first.
    pub fn response(self, decl: ResponseDecl<'_>) -> Result<Self> {
        let status = decl.status.unwrap_or_else(|| default_status(self.method));
        let response = match decl.body {
            ResponseBody::Ready(response) => response,
            ResponseBody::Payload(payload) => {
                let (label, schema) = payload.resolve(self.registry)?;
                let mut response = Response::new(
                    decl.description
                        .unwrap_or_else(|| format!("{label} response")),
                );
                response.content = media_map(&decl.content_types, schema).into_iter().collect();
                response
            }
        };

        self.registry
            .pending_mut(self.handler, self.method)
            .responses
            .insert(status, response);
        Ok(self)
    }

    /// Sets the request body, replacing any earlier one.
    pub fn request(self, decl: RequestDecl<'_>) -> Result<Self> {
        let body = match decl.body {
            RequestPayload::Ready(body) => body,
            RequestPayload::Payload(payload) => {
                let (label, schema) = payload.resolve(self.registry)?;
                RequestBody {
                    description: Some(
                        decl.description
                            .unwrap_or_else(|| format!("{label} request")),
                    ),
                    content: media_map(&decl.content_types, schema).into_iter().collect(),
                    required: decl.required,
                }
            }
        };

        self.registry
            .pending_mut(self.handler, self.method)
            .request_body = Some(RefOr::Item(body));
        Ok(self)
    }

    /// Merges operation properties; fields set here override earlier ones.
    pub fn props(self, props: OperationProps) -> Self {
        self.registry
            .pending_mut(self.handler, self.method)
            .props
            .merge(props);
        self
    }
}
