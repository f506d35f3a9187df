use crate::error::{OpenApiError, Result};
use crate::model::{
    Components, Document, ExternalDocumentation, HttpMethod, Info, OperationProps, Paths,
    Projection, RefOr, Reference, RequestBody, Responses, Schema, SecurityRequirement,
    SecurityScheme, Server, Tag, OPENAPI_VERSION,
};
use crate::source::SchemaSource;
use crate::synth::{self, SynthOptions};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Highest numeric suffix tried when a schema name is taken.
pub const MAX_NAME_PROBES: u32 = 99_999;

/// Opaque token for a handler registered with
/// [`OpenApiRegistry::register_handler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(usize);

#[derive(Debug, Clone)]
pub(crate) struct Handler {
    pub(crate) name: String,
    pub(crate) urls: Vec<String>,
    pub(crate) item_name: Option<String>,
}

/// Annotations declared for one `(handler, method)` pair, waiting for render.
#[derive(Debug, Clone, Default)]
pub(crate) struct PendingOperation {
    pub(crate) responses: Responses,
    pub(crate) request_body: Option<RefOr<RequestBody>>,
    pub(crate) props: OperationProps,
}

/// Collects schemas and per-handler annotations, and renders them into an
/// OpenAPI [`Document`] against the live route table.
///
/// The registry is built once by the host during startup and passed by
/// `&mut` to every annotation call site.
#[derive(Debug, Clone)]
pub struct OpenApiRegistry {
    pub(crate) info: Info,
    pub(crate) servers: Vec<Server>,
    pub(crate) tags: Vec<Tag>,
    pub(crate) security: Vec<SecurityRequirement>,
    pub(crate) external_docs: Option<ExternalDocumentation>,
    pub(crate) components: Components,
    schema_checksum: HashMap<String, String>,
    checksum_to_name: HashMap<String, String>,
    pub(crate) handlers: Vec<Handler>,
    pub(crate) pending: BTreeMap<(HandlerId, HttpMethod), PendingOperation>,
    pub(crate) paths: Paths,
    pub(crate) conflicts: usize,
    /// Type names under synthesis, outermost first, with their tokens.
    in_progress: Vec<(String, u64)>,
    next_token: u64,
    /// `(token, schema name)`: registered schemas holding `Pending(token)`.
    awaiting: Vec<(u64, String)>,
}

impl OpenApiRegistry {
    pub fn new(info: Info) -> Self {
        Self {
            info,
            servers: Vec::new(),
            tags: Vec::new(),
            security: Vec::new(),
            external_docs: None,
            components: Components::default(),
            schema_checksum: HashMap::new(),
            checksum_to_name: HashMap::new(),
            handlers: Vec::new(),
            pending: BTreeMap::new(),
            paths: Paths::new(),
            conflicts: 0,
            in_progress: Vec::new(),
            next_token: 0,
            awaiting: Vec::new(),
        }
    }

    // ── Document metadata ───────────────────────────────────────────────

    pub fn info(&self) -> &Info {
        &self.info
    }

    pub fn info_mut(&mut self) -> &mut Info {
        &mut self.info
    }

    pub fn add_server(&mut self, server: Server) {
        self.servers.push(server);
    }

    pub fn add_tag(&mut self, tag: Tag) {
        self.tags.push(tag);
    }

    /// Security requirement applied to every operation.
    pub fn add_security(&mut self, requirement: SecurityRequirement) {
        self.security.push(requirement);
    }

    pub fn set_external_docs(&mut self, docs: ExternalDocumentation) {
        self.external_docs = Some(docs);
    }

    pub fn add_security_scheme(&mut self, name: impl Into<String>, scheme: SecurityScheme) {
        self.components.security_schemes.insert(name.into(), scheme);
    }

    pub fn components(&self) -> &Components {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut Components {
        &mut self.components
    }

    // ── Schemas ─────────────────────────────────────────────────────────

    /// Synthesizes and registers the schema of `source`.
    ///
    /// Returns the name the schema is registered under, which is the name
    /// of a structurally identical schema when one already exists.
    pub fn add_schema(
        &mut self,
        source: &dyn SchemaSource,
        name: Option<&str>,
    ) -> Result<(String, Schema)> {
        self.add_schema_with(source, name, &SynthOptions::default())
    }

    pub fn add_schema_with(
        &mut self,
        source: &dyn SchemaSource,
        name: Option<&str>,
        options: &SynthOptions,
    ) -> Result<(String, Schema)> {
        let type_name = source.type_name();
        let name = name.map_or_else(|| natural_name(&type_name), str::to_string);

        let token = self.next_token;
        self.next_token += 1;
        self.in_progress.push((type_name, token));
        let synthesized = synth::synthesize(self, source, options);
        self.in_progress.pop();
        let schema = match synthesized {
            Ok(schema) => schema,
            Err(err) => {
                self.awaiting.retain(|(waiting_on, _)| *waiting_on != token);
                return Err(err);
            }
        };

        let (name, schema) = self.settle(name, schema)?;
        self.resolve_pending(token, &name)?;
        for outer in schema.pending_tokens() {
            if !self.awaiting.contains(&(outer, name.clone())) {
                self.awaiting.push((outer, name.clone()));
            }
        }
        Ok((name, schema))
    }

    /// Dedups and stores a synthesized schema, returning its final name.
    fn settle(&mut self, name: String, mut schema: Schema) -> Result<(String, Schema)> {
        let checksum = checksum(&schema)?;
        if let Some(existing) = self.checksum_to_name.get(&checksum) {
            debug!(schema = %existing, requested = %name, "Reusing structurally identical schema");
            let existing = existing.clone();
            schema.resolve_enclosing(&existing);
            return Ok((existing, schema));
        }

        let name = match self.name_state(&name, &checksum) {
            NameState::Vacant => name,
            NameState::Same => {
                schema.resolve_enclosing(&name);
                return Ok((name, schema));
            }
            NameState::Taken => match self.probe(&name, &checksum)? {
                (probed, NameState::Same) => {
                    schema.resolve_enclosing(&probed);
                    return Ok((probed, schema));
                }
                (probed, _) => probed,
            },
        };

        schema.resolve_enclosing(&name);
        self.schema_checksum.insert(name.clone(), checksum.clone());
        self.checksum_to_name.insert(checksum, name.clone());
        self.components.schemas.insert(name.clone(), schema.clone());
        debug!(schema = %name, "Registered schema");
        Ok((name, schema))
    }

    /// Points every schema waiting on `token` at `final_name`.
    fn resolve_pending(&mut self, token: u64, final_name: &str) -> Result<()> {
        let (ready, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.awaiting)
            .into_iter()
            .partition(|(waiting_on, _)| *waiting_on == token);
        self.awaiting = waiting;

        for (_, name) in ready {
            let Some(mut schema) = self.components.schemas.get(&name).cloned() else {
                continue;
            };
            schema.visit_references_mut(&mut |reference| {
                if *reference == Reference::Pending(token) {
                    *reference = Reference::schema(final_name);
                }
            });
            debug!(schema = %name, target = %final_name, "Resolved reference to an outer schema");
            self.insert_schema(name, schema)?;
        }
        Ok(())
    }

    /// Registers a hand-built schema under `name`, replacing any schema
    /// already registered there.
    pub fn insert_schema(&mut self, name: impl Into<String>, schema: Schema) -> Result<()> {
        let name = name.into();
        let checksum = checksum(&schema)?;

        if let Some(previous) = self.schema_checksum.remove(&name) {
            self.checksum_to_name.remove(&previous);
        }
        if !self.checksum_to_name.contains_key(&checksum) {
            self.schema_checksum.insert(name.clone(), checksum.clone());
            self.checksum_to_name.insert(checksum, name.clone());
        }
        self.components.schemas.insert(name, schema);
        Ok(())
    }

    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.components.schemas.get(name)
    }

    pub fn checksum_of(&self, name: &str) -> Option<&str> {
        self.schema_checksum.get(name).map(String::as_str)
    }

    pub fn name_for_checksum(&self, checksum: &str) -> Option<&str> {
        self.checksum_to_name.get(checksum).map(String::as_str)
    }

    /// Distance from the innermost schema under synthesis and the
    /// synthesis token, if `type_name` is being synthesized.
    pub(crate) fn synthesis_position(&self, type_name: &str) -> Option<(usize, u64)> {
        self.in_progress
            .iter()
            .rev()
            .enumerate()
            .find(|(_, (name, _))| name == type_name)
            .map(|(depth, (_, token))| (depth, *token))
    }

    fn name_state(&self, name: &str, checksum: &str) -> NameState {
        match self.schema_checksum.get(name) {
            Some(existing) if existing == checksum => NameState::Same,
            Some(_) => NameState::Taken,
            None if self.components.schemas.contains_key(name) => NameState::Taken,
            None => NameState::Vacant,
        }
    }

    fn probe(&self, name: &str, checksum: &str) -> Result<(String, NameState)> {
        for suffix in 1..=MAX_NAME_PROBES {
            let candidate = format!("{name}{suffix}");
            match self.name_state(&candidate, checksum) {
                NameState::Taken => continue,
                state => return Ok((candidate, state)),
            }
        }
        Err(OpenApiError::NamesExhausted {
            name: name.to_string(),
        })
    }

    // ── Handlers ────────────────────────────────────────────────────────

    /// Declares a handler serving `urls`.
    ///
    /// Registering the same name again returns the same id and extends its
    /// URL list.
    pub fn register_handler<I, S>(&mut self, name: impl Into<String>, urls: I) -> HandlerId
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let urls: Vec<String> = urls.into_iter().map(Into::into).collect();

        if let Some(index) = self.handlers.iter().position(|h| h.name == name) {
            let handler = &mut self.handlers[index];
            for url in urls {
                if !handler.urls.contains(&url) {
                    handler.urls.push(url);
                }
            }
            return HandlerId(index);
        }

        self.handlers.push(Handler {
            name,
            urls,
            item_name: None,
        });
        HandlerId(self.handlers.len() - 1)
    }

    /// Noun used by the default `delete` description ("Delete a user").
    pub fn set_item_name(&mut self, handler: HandlerId, item_name: impl Into<String>) {
        if let Some(handler) = self.handlers.get_mut(handler.0) {
            handler.item_name = Some(item_name.into());
        }
    }

    pub fn handler_name(&self, handler: HandlerId) -> Option<&str> {
        self.handlers.get(handler.0).map(|h| h.name.as_str())
    }

    pub(crate) fn handler(&self, handler: HandlerId) -> Option<&Handler> {
        self.handlers.get(handler.0)
    }

    pub(crate) fn handler_ids(&self) -> impl Iterator<Item = (HandlerId, &Handler)> {
        self.handlers
            .iter()
            .enumerate()
            .map(|(index, handler)| (HandlerId(index), handler))
    }

    pub(crate) fn pending_mut(
        &mut self,
        handler: HandlerId,
        method: HttpMethod,
    ) -> &mut PendingOperation {
        self.pending.entry((handler, method)).or_default()
    }

    /// Number of declared annotations not yet dropped as stale.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    // ── Rendered state ──────────────────────────────────────────────────

    /// Path table of the latest render.
    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    /// Overwritten operations seen by the latest render.
    pub fn conflicts(&self) -> usize {
        self.conflicts
    }

    /// The document as of the latest render.
    pub fn document(&self) -> Document {
        Document {
            openapi: OPENAPI_VERSION.to_string(),
            info: self.info.clone(),
            paths: self.paths.clone(),
            servers: self.servers.clone(),
            components: Some(self.components.clone()),
            security: self.security.clone(),
            tags: self.tags.clone(),
            external_docs: self.external_docs.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NameState {
    Vacant,
    /// Registered with the same checksum.
    Same,
    Taken,
}

/// Type name without its module path and trailing `Schema`.
pub(crate) fn natural_name(type_name: &str) -> String {
    let short = type_name.rsplit("::").next().unwrap_or(type_name);
    match short.strip_suffix("Schema") {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => short.to_string(),
    }
}

/// Hex SHA-256 of the canonical JSON projection.
pub(crate) fn checksum(schema: &Schema) -> Result<String> {
    let canonical = serde_json::to_vec(&schema.project())?;
    Ok(hex::encode(Sha256::digest(&canonical)))
}
