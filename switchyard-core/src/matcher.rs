// Request matching against the route table

use crate::logging::trace;
use crate::{HttpMethod, Route, RouteConfig};
use std::sync::Arc;

/// A route matched for one request, with the parameter values extracted
/// from the path in declaration order.
#[derive(Debug, Clone)]
pub struct MatchedRoute {
    route: Arc<Route>,
    params: Vec<(String, String)>,
}

impl MatchedRoute {
    pub fn new(route: Arc<Route>, params: Vec<(String, String)>) -> Self {
        Self { route, params }
    }

    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl RouteConfig {
    /// Find the route for `method` and `path`.
    ///
    /// The literal table is probed first; the combined pattern for the method
    /// is only evaluated when no static route has this exact path. `path`
    /// must not carry a query string.
    pub fn match_route(&self, method: HttpMethod, path: &str) -> Option<MatchedRoute> {
        if let Some(route) = self
            .static_routes
            .get(&method)
            .and_then(|table| table.get(path))
        {
            trace!(method = %method, path, "Static route hit");
            return Some(MatchedRoute::new(route.clone(), Vec::new()));
        }

        let routes = self.dynamic_routes.get(&method)?;
        let compiled = self.matching_regexes.get(&method)?;

        let found = compiled.find(path)?;
        let route = routes.get(found.mark)?;
        trace!(method = %method, path, mark = found.mark, "Dynamic route hit");

        Some(MatchedRoute::new(route.clone(), found.params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HandlerRef, HttpResponse};

    fn config() -> RouteConfig {
        RouteConfig::builder()
            .route(get("/users/new", "new"))
            .route(get("/users/{id}", "show"))
            .route(get("/users/{id}/posts/{post:\\d+}", "post"))
            .build()
            .unwrap()
    }

    fn get(template: &str, action: &'static str) -> Route {
        Route::get(template, HandlerRef::new("Users", action))
            .handler(|_ctx| async { Ok(HttpResponse::ok()) })
    }

    #[test]
    fn test_static_route_has_no_params() {
        let matched = config().match_route(HttpMethod::GET, "/users/new").unwrap();
        assert_eq!(matched.route().handler_ref().action(), "new");
        assert!(matched.params().is_empty());
    }

    #[test]
    fn test_dynamic_route_extracts_params() {
        let matched = config()
            .match_route(HttpMethod::GET, "/users/42/posts/7")
            .unwrap();
        assert_eq!(matched.route().handler_ref().action(), "post");
        assert_eq!(matched.param("id"), Some("42"));
        assert_eq!(matched.param("post"), Some("7"));
    }

    #[test]
    fn test_custom_pattern_rejects_path() {
        assert!(
            config()
                .match_route(HttpMethod::GET, "/users/42/posts/latest")
                .is_none()
        );
    }

    #[test]
    fn test_no_routes_for_method() {
        assert!(config().match_route(HttpMethod::POST, "/users/42").is_none());
    }
}
