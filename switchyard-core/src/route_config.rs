// Route table: static and dynamic routes per method

use crate::logging::{debug, info};
use crate::{CompiledPattern, Error, HandlerRef, HttpMethod, Route, RoutePattern};
use std::collections::HashMap;
use std::sync::Arc;

/// The build-once route table.
///
/// Routes without parameter tokens are indexed by their literal path. The
/// parametrized routes of each method are compiled into one
/// [`CompiledPattern`] and indexed by the marker of their alternative.
/// Read-only after [`RouteConfigBuilder::build`].
#[derive(Debug, Default)]
pub struct RouteConfig {
    routes: Vec<Arc<Route>>,
    pub(crate) static_routes: HashMap<HttpMethod, HashMap<String, Arc<Route>>>,
    pub(crate) dynamic_routes: HashMap<HttpMethod, HashMap<String, Arc<Route>>>,
    pub(crate) matching_regexes: HashMap<HttpMethod, CompiledPattern>,
    handlers: HashMap<HandlerRef, (Arc<Route>, RoutePattern)>,
}

impl RouteConfig {
    pub fn builder() -> RouteConfigBuilder {
        RouteConfigBuilder::default()
    }

    /// All routes in registration order
    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// The route declared for `handler`; the first one registered if the
    /// handler is bound more than once
    pub fn route_for(&self, handler: HandlerRef) -> Option<&Arc<Route>> {
        self.handlers.get(&handler).map(|(route, _)| route)
    }

    pub(crate) fn pattern_for(&self, handler: HandlerRef) -> Option<&RoutePattern> {
        self.handlers.get(&handler).map(|(_, pattern)| pattern)
    }

    /// Combined regex source for `method`, if it has dynamic routes
    pub fn matching_regex(&self, method: HttpMethod) -> Option<&str> {
        self.matching_regexes.get(&method).map(CompiledPattern::as_str)
    }
}

/// Collects route declarations and builds a [`RouteConfig`].
#[derive(Default)]
pub struct RouteConfigBuilder {
    routes: Vec<Route>,
}

impl RouteConfigBuilder {
    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    pub fn routes(mut self, routes: impl IntoIterator<Item = Route>) -> Self {
        self.routes.extend(routes);
        self
    }

    /// Add every route submitted with [`declare_route!`](crate::declare_route)
    pub fn discover(self) -> Self {
        let declared = crate::route_registry::declared_routes();
        debug!(count = declared.len(), "Discovered declared routes");
        self.routes(declared)
    }

    /// Parse every template, split static from dynamic routes and compile one
    /// combined pattern per method.
    ///
    /// Fails on the first malformed template or on a method/path pair
    /// registered twice. Nothing is matched against a partially built table.
    pub fn build(self) -> Result<RouteConfig, Error> {
        let mut config = RouteConfig::default();
        let mut dynamic: HashMap<HttpMethod, Vec<(Arc<Route>, RoutePattern)>> = HashMap::new();

        for route in self.routes {
            let route = Arc::new(route);
            let pattern = route.pattern()?;
            let method = route.method();
            let duplicate = || Error::DuplicateRoute {
                method,
                path: route.template().to_string(),
            };

            if pattern.is_static() {
                let table = config.static_routes.entry(method).or_default();
                if table.contains_key(route.template()) {
                    return Err(duplicate());
                }
                table.insert(route.template().to_string(), route.clone());
            } else {
                let entries = dynamic.entry(method).or_default();
                if entries.iter().any(|(existing, _)| existing.template() == route.template()) {
                    return Err(duplicate());
                }
                entries.push((route.clone(), pattern.clone()));
            }

            config
                .handlers
                .entry(route.handler_ref())
                .or_insert_with(|| (route.clone(), pattern));
            config.routes.push(route);
        }

        for (method, entries) in dynamic {
            let patterns: Vec<&RoutePattern> = entries.iter().map(|(_, pattern)| pattern).collect();
            let compiled = CompiledPattern::compile(&patterns)?;

            let mut table = HashMap::with_capacity(entries.len());
            for (index, (route, _)) in entries.into_iter().enumerate() {
                let mark = compiled.mark(index).ok_or_else(|| {
                    Error::Internal(format!("no marker for alternative {}", index))
                })?;
                table.insert(mark.to_string(), route);
            }

            debug!(
                method = %method,
                routes = table.len(),
                "Compiled dynamic routes"
            );
            config.dynamic_routes.insert(method, table);
            config.matching_regexes.insert(method, compiled);
        }

        info!(routes = config.routes.len(), "Route table built");
        Ok(config)
    }
}
