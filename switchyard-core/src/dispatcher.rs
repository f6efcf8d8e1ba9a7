// Request dispatch: match, resolve, invoke

use crate::logging::{debug, info};
use crate::middleware::build_chain;
use crate::route::Rejection;
use crate::{
    Container, Error, HttpMethod, HttpRequest, HttpResponse, MatchedRoute, MiddlewareRef, Route,
    RouteConfig, RouterConfig, ValidationErrors,
};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::Instrument;

/// Where request resolution stopped
#[derive(Debug)]
enum Outcome {
    Resolved {
        route: Arc<Route>,
        request: HttpRequest,
    },
    NotFound {
        method: String,
        path: String,
    },
    Invalid(ValidationErrors),
}

/// The router: a built route table plus global middleware.
///
/// `Router` is shared across concurrent requests. The route table is
/// read-only; the global middleware list may grow at any time and is
/// snapshotted at the start of each dispatch.
pub struct Router {
    config: Arc<RouteConfig>,
    container: Container,
    global_middleware: RwLock<Vec<MiddlewareRef>>,
    base_uri: String,
}

impl Router {
    pub fn new(config: RouteConfig, container: Container) -> Self {
        info!(routes = config.len(), "Router created");
        Self {
            config: Arc::new(config),
            container,
            global_middleware: RwLock::new(Vec::new()),
            base_uri: String::new(),
        }
    }

    /// Apply loaded [`RouterConfig`] settings
    pub fn from_config(config: RouteConfig, container: Container, settings: &RouterConfig) -> Self {
        Self::new(config, container).with_base_uri(settings.base_uri.clone())
    }

    /// Base URI prefixed to every URI built by [`Router::to_uri`]
    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = base_uri.into();
        self
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Append a global middleware. Global middleware wraps every route's own
    /// middleware; the first one added runs outermost.
    pub fn add_middleware(&self, middleware: MiddlewareRef) {
        debug!(middleware = middleware.name(), "Global middleware added");
        self.global_middleware.write().push(middleware);
    }

    /// Snapshot of the global middleware, in order
    pub fn middleware(&self) -> Vec<MiddlewareRef> {
        self.global_middleware.read().clone()
    }

    pub fn routes(&self) -> &RouteConfig {
        &self.config
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Match a method name and path; unknown methods never match
    pub fn match_route(&self, method: &str, path: &str) -> Option<MatchedRoute> {
        HttpMethod::from_str(method).and_then(|method| self.config.match_route(method, path))
    }

    /// Serve one request.
    ///
    /// No matching route yields a 404 response and a request that fails its
    /// own validation yields a 400 response carrying the failures; neither is
    /// an error. Everything else the pipeline raises is returned as `Err`.
    pub async fn dispatch<R: Into<HttpRequest>>(&self, request: R) -> Result<HttpResponse, Error> {
        let mut request = request.into();
        request.split_query();

        let span = tracing::debug_span!("dispatch", method = %request.method, path = %request.path);
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        match self.resolve(request)? {
            Outcome::NotFound { method, path } => {
                debug!("No route matched");
                Ok(HttpResponse::route_not_found(&method, &path))
            }
            Outcome::Invalid(errors) => {
                debug!(failures = errors.len(), "Request failed validation");
                Ok(HttpResponse::invalid(&errors))
            }
            Outcome::Resolved { route, request } => {
                let global = self.middleware();
                let chain = build_chain(&route, &global, &self.container)?;
                chain(request).await
            }
        }
    }

    /// Match the route, then map and validate the request into the handler's
    /// declared request type. The matched route and the typed request are
    /// stored in this request's extensions only.
    fn resolve(&self, mut request: HttpRequest) -> Result<Outcome, Error> {
        let Some(matched) = self.match_route(&request.method, &request.path) else {
            return Ok(Outcome::NotFound {
                method: request.method,
                path: request.path,
            });
        };

        let route = matched.route().clone();
        debug!(handler = %route.handler_ref(), "Route matched");

        request.path_params = matched.params().iter().cloned().collect();
        request.extensions.insert(matched);

        match (route.resolver)(&mut request) {
            Ok(()) => Ok(Outcome::Resolved { route, request }),
            Err(Rejection::Invalid(errors)) => Ok(Outcome::Invalid(errors)),
            Err(Rejection::Failed(error)) => Err(error),
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.config.len())
            .field("middleware", &*self.global_middleware.read())
            .field("base_uri", &self.base_uri)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HandlerRef, TypedRequest, ValidationError};

    struct Signup {
        email: String,
    }

    impl TypedRequest for Signup {
        fn from_request(request: &HttpRequest) -> Result<Self, Error> {
            let body: serde_json::Value = request.json()?;
            Ok(Signup {
                email: body["email"].as_str().unwrap_or_default().to_string(),
            })
        }

        fn validate(&self) -> Result<(), Vec<ValidationError>> {
            if self.email.contains('@') {
                Ok(())
            } else {
                Err(vec![ValidationError::new("email", "must be an email address")])
            }
        }
    }

    fn router() -> Router {
        let config = RouteConfig::builder()
            .route(
                Route::get("/users/{id}", HandlerRef::new("Users", "show")).handler(|ctx| async move {
                    Ok(format!("user {}", ctx.param("id").unwrap_or_default()))
                }),
            )
            .route(
                Route::post("/signup", HandlerRef::new("Users", "signup")).typed_handler(
                    |signup: Arc<Signup>, _ctx| async move { Ok(signup.email.clone()) },
                ),
            )
            .route(
                Route::get("/search", HandlerRef::new("Search", "index")).handler(|ctx| async move {
                    Ok(ctx.request().query("q").cloned().unwrap_or_default())
                }),
            )
            .build()
            .unwrap();
        Router::new(config, Container::new())
    }

    #[tokio::test]
    async fn test_dispatch_dynamic_route() {
        let response = router().dispatch(HttpRequest::new("GET", "/users/42")).await.unwrap();
        assert!(response.is_ok());
        assert_eq!(response.body_text().unwrap().unwrap(), "user 42");
    }

    #[tokio::test]
    async fn test_dispatch_not_found() {
        let response = router()
            .dispatch(HttpRequest::new("GET", "/users/42/extra"))
            .await
            .unwrap();
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn test_unknown_method_is_not_found() {
        let response = router().dispatch(HttpRequest::new("BREW", "/users/42")).await.unwrap();
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn test_query_string_is_split_before_matching() {
        let response = router()
            .dispatch(HttpRequest::new("GET", "/search?q=hello%20world"))
            .await
            .unwrap();
        assert_eq!(response.body_text().unwrap().unwrap(), "hello world");
    }

    #[tokio::test]
    async fn test_invalid_request_is_a_400_response() {
        let request = HttpRequest::new("POST", "/signup").with_body(r#"{"email":"nope"}"#);
        let response = router().dispatch(request).await.unwrap();

        assert_eq!(response.status, 400);
        let body: serde_json::Value = response.json().unwrap();
        assert_eq!(body["errors"][0]["field"], "email");
    }

    #[tokio::test]
    async fn test_mapping_failure_is_an_error() {
        let request = HttpRequest::new("POST", "/signup").with_body("not json");
        let err = router().dispatch(request).await.unwrap_err();
        assert!(matches!(err, Error::Deserialization(_)));
    }

    #[tokio::test]
    async fn test_typed_request_reaches_handler() {
        let request = HttpRequest::new("POST", "/signup").with_body(r#"{"email":"a@b.c"}"#);
        let response = router().dispatch(request).await.unwrap();
        assert_eq!(response.body_text().unwrap().unwrap(), "a@b.c");
    }

    #[tokio::test]
    async fn test_dispatch_transport_request() {
        let request = http::Request::builder()
            .method("GET")
            .uri("/users/7?x=1")
            .body(Vec::new())
            .unwrap();
        let response = router().dispatch(request).await.unwrap();
        assert_eq!(response.body_text().unwrap().unwrap(), "user 7");
    }
}
