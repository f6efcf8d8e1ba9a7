// Route definitions

use crate::handler::erase_handler;
use crate::{
    Error, HandlerFn, HandlerRef, HttpMethod, HttpRequest, IntoReply, MiddlewareRef,
    RequestContext, RoutePattern, TypedRequest, ValidationErrors,
};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Why a request could not be mapped into a handler's request type
#[derive(Debug)]
pub enum Rejection {
    /// The request representation's self-validation failed
    Invalid(ValidationErrors),
    /// Mapping itself failed; this is an error, not an `Invalid` outcome
    Failed(Error),
}

/// Maps the raw request into the handler's declared request type, validates
/// it, and stores the result in the request's extensions.
pub type RequestResolver = Arc<dyn Fn(&mut HttpRequest) -> Result<(), Rejection> + Send + Sync>;

fn resolver_for<R: TypedRequest>() -> RequestResolver {
    Arc::new(|request: &mut HttpRequest| {
        let typed = R::from_request(request).map_err(Rejection::Failed)?;
        typed
            .validate()
            .map_err(|errors| Rejection::Invalid(ValidationErrors::new(errors)))?;
        request.extensions.insert(typed);
        Ok(())
    })
}

/// Resolver for handlers taking the raw request: it already travels through
/// the chain, so nothing is mapped or stored.
fn raw_resolver() -> RequestResolver {
    Arc::new(|_request: &mut HttpRequest| Ok(()))
}

/// A registered binding of method and URI template to a handler.
///
/// Immutable once built.
#[derive(Clone)]
pub struct Route {
    method: HttpMethod,
    template: String,
    handler_ref: HandlerRef,
    middleware: Vec<MiddlewareRef>,
    request_type: &'static str,
    pub(crate) handler: HandlerFn,
    pub(crate) resolver: RequestResolver,
}

impl Route {
    pub fn builder(
        method: HttpMethod,
        template: impl Into<String>,
        handler_ref: HandlerRef,
    ) -> RouteBuilder {
        RouteBuilder {
            method,
            template: template.into(),
            handler_ref,
            middleware: Vec::new(),
        }
    }

    pub fn get(template: impl Into<String>, handler_ref: HandlerRef) -> RouteBuilder {
        Self::builder(HttpMethod::GET, template, handler_ref)
    }

    pub fn post(template: impl Into<String>, handler_ref: HandlerRef) -> RouteBuilder {
        Self::builder(HttpMethod::POST, template, handler_ref)
    }

    pub fn put(template: impl Into<String>, handler_ref: HandlerRef) -> RouteBuilder {
        Self::builder(HttpMethod::PUT, template, handler_ref)
    }

    pub fn patch(template: impl Into<String>, handler_ref: HandlerRef) -> RouteBuilder {
        Self::builder(HttpMethod::PATCH, template, handler_ref)
    }

    pub fn delete(template: impl Into<String>, handler_ref: HandlerRef) -> RouteBuilder {
        Self::builder(HttpMethod::DELETE, template, handler_ref)
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn handler_ref(&self) -> HandlerRef {
        self.handler_ref
    }

    /// Route-specific middleware, in attachment order
    pub fn middleware(&self) -> &[MiddlewareRef] {
        &self.middleware
    }

    /// Name of the request representation the handler declared
    pub fn request_type(&self) -> &'static str {
        self.request_type
    }

    /// Parse the template
    pub fn pattern(&self) -> Result<RoutePattern, Error> {
        RoutePattern::parse(&self.template)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("template", &self.template)
            .field("handler", &self.handler_ref)
            .field("middleware", &self.middleware)
            .field("request_type", &self.request_type)
            .finish()
    }
}

/// Builder for [`Route`]; attach middleware, then the handler.
///
/// ```
/// use switchyard_core::{HandlerRef, HttpResponse, Route};
///
/// let route = Route::get("/users/{id}", HandlerRef::new("Users", "show"))
///     .handler(|ctx| async move {
///         let id = ctx.param("id").unwrap_or_default().to_string();
///         Ok(HttpResponse::text(id))
///     });
/// assert_eq!(route.template(), "/users/{id}");
/// ```
pub struct RouteBuilder {
    method: HttpMethod,
    template: String,
    handler_ref: HandlerRef,
    middleware: Vec<MiddlewareRef>,
}

impl RouteBuilder {
    /// Attach a middleware; runs after global middleware, in attachment order
    pub fn middleware(mut self, middleware: MiddlewareRef) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Finish with a handler that takes the raw request representation
    pub fn handler<F, Fut, O>(self, handler: F) -> Route
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, Error>> + Send + 'static,
        O: IntoReply,
    {
        self.finish::<HttpRequest>(erase_handler(handler), raw_resolver())
    }

    /// Finish with a handler that declares the request representation `R`.
    ///
    /// Before the middleware chain runs, the raw request is mapped into `R`
    /// and validated; the handler receives the resolved value.
    pub fn typed_handler<R, F, Fut, O>(self, handler: F) -> Route
    where
        R: TypedRequest,
        F: Fn(Arc<R>, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, Error>> + Send + 'static,
        O: IntoReply,
    {
        let handler = Arc::new(handler);
        let erased = erase_handler(move |ctx: RequestContext| {
            let handler = handler.clone();
            async move {
                let typed = ctx.typed::<R>()?;
                handler(typed, ctx).await
            }
        });
        self.finish::<R>(erased, resolver_for::<R>())
    }

    fn finish<R: TypedRequest>(self, handler: HandlerFn, resolver: RequestResolver) -> Route {
        Route {
            method: self.method,
            template: self.template,
            handler_ref: self.handler_ref,
            middleware: self.middleware,
            request_type: std::any::type_name::<R>(),
            handler,
            resolver,
        }
    }
}
