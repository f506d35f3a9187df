use crate::error::Result;
use crate::model::{
    Document, HttpMethod, OperationProps, Parameter, PathOperation, Paths, RefOr, Response,
    Responses, SpecFormat, StatusKey,
};
use crate::registry::{HandlerId, OpenApiRegistry, PendingOperation};
use crate::url::parse_url;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// One entry of the host framework's route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// Route pattern in framework syntax, e.g. `/items/<int:id>`.
    pub url_pattern: String,
    /// Name of the handler serving the route.
    pub endpoint: String,
    pub methods: Vec<HttpMethod>,
}

impl RouteEntry {
    pub fn new(
        url_pattern: impl Into<String>,
        endpoint: impl Into<String>,
        methods: impl IntoIterator<Item = HttpMethod>,
    ) -> Self {
        Self {
            url_pattern: url_pattern.into(),
            endpoint: endpoint.into(),
            methods: methods.into_iter().collect(),
        }
    }
}

/// An operation produced for one route method.
enum RoutedOperation {
    Declared(PathOperation),
    /// Synthesized for an un-annotated `delete`; never displaces a declared
    /// operation.
    Default(PathOperation),
}

/// Read access to the live route table.
pub trait RouteTable {
    fn routes(&self) -> Vec<RouteEntry>;
}

impl RouteTable for [RouteEntry] {
    fn routes(&self) -> Vec<RouteEntry> {
        self.to_vec()
    }
}

impl RouteTable for Vec<RouteEntry> {
    fn routes(&self) -> Vec<RouteEntry> {
        self.as_slice().routes()
    }
}

impl<const N: usize> RouteTable for [RouteEntry; N] {
    fn routes(&self) -> Vec<RouteEntry> {
        self.as_slice().routes()
    }
}

impl OpenApiRegistry {
    /// Merges the declared annotations with `table` into a fresh path table
    /// and returns the resulting document.
    ///
    /// Rendering never consumes declarations: calling it again with the same
    /// table yields the same document. Annotations for handlers that no
    /// route reaches are dropped.
    pub fn render<T>(&mut self, table: &T) -> Result<Document>
    where
        T: RouteTable + ?Sized,
    {
        let mut working = self.pending.clone();
        let mut routed = HashSet::new();
        let mut paths = Paths::new();
        let mut defaults: HashSet<(String, HttpMethod)> = HashSet::new();
        let mut conflicts = 0;

        for route in table.routes() {
            let handlers: Vec<HandlerId> = self
                .handler_ids()
                .filter(|(_, handler)| {
                    handler.urls.contains(&route.url_pattern)
                        || (handler.urls.is_empty() && handler.name == route.endpoint)
                })
                .map(|(id, _)| id)
                .collect();
            if handlers.is_empty() {
                continue;
            }
            // Defaults belong to the route's own endpoint when it is among
            // the matched handlers.
            let owner_matched = handlers
                .iter()
                .any(|&id| self.handler_name(id) == Some(route.endpoint.as_str()));

            let template = parse_url(&route.url_pattern)?;
            for handler in handlers {
                routed.insert(handler);
                let owns_defaults =
                    !owner_matched || self.handler_name(handler) == Some(route.endpoint.as_str());

                for &method in &route.methods {
                    let Some(routed_op) = self.route_operation(
                        &mut working,
                        handler,
                        method,
                        &template.parameters,
                        owns_defaults,
                    ) else {
                        continue;
                    };

                    let key = (template.url.clone(), method);
                    let path = paths.entry(template.url.as_str());
                    let existing = path.operation(method).is_some();
                    let replaced_default = defaults.contains(&key);

                    match routed_op {
                        RoutedOperation::Default(_) if existing => {
                            debug!(url = %template.url, method = %method, "Operation already present, default skipped");
                            continue;
                        }
                        RoutedOperation::Default(operation) => {
                            path.operations.insert(method, operation);
                            defaults.insert(key);
                        }
                        RoutedOperation::Declared(operation) => {
                            path.operations.insert(method, operation);
                            defaults.remove(&key);
                            if existing && !replaced_default {
                                conflicts += 1;
                                warn!(
                                    url = %template.url,
                                    method = %method,
                                    endpoint = %route.endpoint,
                                    "Operation declared twice for the same url and method, keeping the last one"
                                );
                            }
                        }
                    }
                }
            }
        }

        self.pending.retain(|(handler, method), _| {
            let keep = routed.contains(handler);
            if !keep {
                debug!(handler = ?handler, method = %method, "Dropping annotation for an unrouted handler");
            }
            keep
        });
        self.paths = paths;
        self.conflicts = conflicts;
        Ok(self.document())
    }

    /// Renders and serializes in one step.
    pub fn render_to_string<T>(&mut self, table: &T, format: SpecFormat) -> Result<String>
    where
        T: RouteTable + ?Sized,
    {
        self.render(table)?.to_string_as(format)
    }

    fn route_operation(
        &self,
        working: &mut BTreeMap<(HandlerId, HttpMethod), PendingOperation>,
        handler: HandlerId,
        method: HttpMethod,
        path_parameters: &[Parameter],
        owns_defaults: bool,
    ) -> Option<RoutedOperation> {
        let key = (handler, method);
        match working.get(&key).map(|pending| !pending.responses.is_empty()) {
            Some(true) => {
                let pending = working.remove(&key)?;
                let mut props = pending.props;
                props.parameters = Some(merge_parameters(props.parameters, path_parameters));
                Some(RoutedOperation::Declared(PathOperation::from_parts(
                    pending.responses,
                    pending.request_body,
                    props,
                )))
            }
            _ if method == HttpMethod::Delete && owns_defaults => {
                let declared = working.remove(&key).map(|pending| pending.props);
                Some(RoutedOperation::Default(self.default_delete(
                    handler,
                    path_parameters,
                    declared,
                )))
            }
            Some(false) => {
                debug!(handler = ?handler, method = %method, "Annotation without responses, skipped");
                None
            }
            None => {
                debug!(handler = ?handler, method = %method, "Undocumented method, skipped");
                None
            }
        }
    }

    fn default_delete(
        &self,
        handler: HandlerId,
        path_parameters: &[Parameter],
        declared: Option<OperationProps>,
    ) -> PathOperation {
        let item = self
            .handler(handler)
            .and_then(|h| h.item_name.as_deref())
            .unwrap_or("item");
        let article = match item.chars().next() {
            Some(c) if "aeiouAEIOU".contains(c) => "an",
            _ => "a",
        };

        let mut props = OperationProps::new().description(format!("Delete {article} {item}"));
        if let Some(declared) = declared {
            props.merge(declared);
        }
        props.parameters = Some(merge_parameters(props.parameters, path_parameters));

        let responses =
            Responses::new().with(StatusKey::Code(204), Response::new("Deleted an item"));
        PathOperation::from_parts(responses, None, props)
    }
}

/// Declared parameters first, then path parameters not already named.
fn merge_parameters(
    declared: Option<Vec<RefOr<Parameter>>>,
    path_parameters: &[Parameter],
) -> Vec<RefOr<Parameter>> {
    let mut merged = declared.unwrap_or_default();
    for parameter in path_parameters {
        let named = merged.iter().any(|existing| {
            existing
                .as_item()
                .is_some_and(|existing| existing.name == parameter.name)
        });
        if !named {
            merged.push(RefOr::Item(parameter.clone()));
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DataType, ParameterLocation, Schema};

    #[test]
    fn declared_parameters_win_over_path_parameters() {
        let declared = Parameter::path("id", Schema::of(DataType::String))
            .with_description("Slug or numeric id");
        let path = [
            Parameter::path("id", Schema::of(DataType::Integer)),
            Parameter::path("part", Schema::of(DataType::String)),
        ];

        let merged = merge_parameters(Some(vec![RefOr::Item(declared.clone())]), &path);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0], RefOr::Item(declared));
        assert_eq!(merged[1].as_item().unwrap().name, "part");
    }

    #[test]
    fn query_parameters_are_kept_before_path_parameters() {
        let query = Parameter::query("page", Schema::of(DataType::Integer));
        let path = [Parameter::path("id", Schema::of(DataType::Integer))];

        let merged = merge_parameters(Some(vec![RefOr::Item(query)]), &path);
        let locations: Vec<_> = merged
            .iter()
            .map(|p| p.as_item().unwrap().location)
            .collect();
        assert_eq!(locations, [ParameterLocation::Query, ParameterLocation::Path]);
    }
}
