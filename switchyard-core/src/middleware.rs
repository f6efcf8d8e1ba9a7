// Middleware system for request/response processing

use crate::logging::{debug, info, trace, warn};
use crate::{Container, Error, HttpRequest, HttpResponse, RequestContext, Route};
use async_trait::async_trait;
use std::any::TypeId;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type ResponseFuture = Pin<Box<dyn Future<Output = Result<HttpResponse, Error>> + Send>>;

/// Type alias for the rest of the middleware chain
pub type Next = Box<dyn FnOnce(HttpRequest) -> ResponseFuture + Send>;

/// A composed request pipeline: middleware wrapped around a handler
pub type Chain = Arc<dyn Fn(HttpRequest) -> ResponseFuture + Send + Sync>;

/// Middleware trait for processing requests before they reach the handler.
///
/// A middleware decides whether and how to call `next`. Not calling it
/// short-circuits everything inside, the handler included.
#[async_trait]
pub trait Middleware: Send + Sync + 'static {
    async fn handle(&self, req: HttpRequest, next: Next) -> Result<HttpResponse, Error>;
}

/// Identifies a middleware type. Instances are resolved from the
/// [`Container`] each time a chain is built.
#[derive(Clone, Copy)]
pub struct MiddlewareRef {
    type_id: TypeId,
    name: &'static str,
    resolve: fn(&Container) -> Result<Arc<dyn Middleware>, Error>,
}

fn resolve_from<M: Middleware>(container: &Container) -> Result<Arc<dyn Middleware>, Error> {
    let middleware: Arc<dyn Middleware> = container.resolve::<M>()?;
    Ok(middleware)
}

impl MiddlewareRef {
    pub fn of<M: Middleware>() -> Self {
        Self {
            type_id: TypeId::of::<M>(),
            name: std::any::type_name::<M>(),
            resolve: resolve_from::<M>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Fetch the middleware instance from the container
    pub fn resolve(&self, container: &Container) -> Result<Arc<dyn Middleware>, Error> {
        (self.resolve)(container)
    }
}

impl PartialEq for MiddlewareRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for MiddlewareRef {}

impl fmt::Debug for MiddlewareRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Compose `route`'s handler with the global middleware followed by the
/// route's own middleware.
///
/// The chain is folded from the inside out: the handler call comes first,
/// then every middleware wraps the callable built so far, walking the list
/// back to front. The first global middleware therefore runs outermost and
/// the last route middleware sits right next to the handler.
pub fn build_chain(
    route: &Arc<Route>,
    global: &[MiddlewareRef],
    container: &Container,
) -> Result<Chain, Error> {
    let mut chain = handler_call(route.clone(), container.clone());

    let refs: Vec<&MiddlewareRef> = global.iter().chain(route.middleware()).collect();
    debug!(
        handler = %route.handler_ref(),
        middleware_count = refs.len(),
        "Building middleware chain"
    );

    for middleware_ref in refs.into_iter().rev() {
        let middleware = middleware_ref.resolve(container)?;
        let inner = chain;
        trace!(middleware = middleware_ref.name(), "Wrapping chain");

        chain = Arc::new(move |req: HttpRequest| -> ResponseFuture {
            let middleware = middleware.clone();
            let inner = inner.clone();
            Box::pin(async move {
                let next: Next = Box::new(move |req| inner(req));
                middleware.handle(req, next).await
            })
        });
    }

    Ok(chain)
}

/// The innermost callable: invoke the handler and normalize what it returns.
fn handler_call(route: Arc<Route>, container: Container) -> Chain {
    Arc::new(move |req: HttpRequest| -> ResponseFuture {
        let route = route.clone();
        let ctx = RequestContext::new(req, container.clone());
        Box::pin(async move {
            trace!(handler = %route.handler_ref(), "Middleware chain complete, calling handler");
            match (route.handler)(ctx).await? {
                Some(reply) => Ok(reply.into_response()),
                None => Err(Error::HandlerReturnedNothing {
                    handler: route.handler_ref(),
                }),
            }
        })
    })
}

// ========== Built-in Middleware ==========

/// Logs each request and its outcome
#[derive(Debug, Default)]
pub struct LoggerMiddleware;

#[async_trait]
impl Middleware for LoggerMiddleware {
    async fn handle(&self, req: HttpRequest, next: Next) -> Result<HttpResponse, Error> {
        let start = std::time::Instant::now();
        let method = req.method.clone();
        let path = req.path.clone();

        info!(method = %method, path = %path, "Request started");
        let result = next(req).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(response) => info!(
                method = %method,
                path = %path,
                status = response.status,
                elapsed_ms,
                "Request completed"
            ),
            Err(e) => warn!(
                method = %method,
                path = %path,
                error = %e,
                elapsed_ms,
                "Request failed"
            ),
        }

        result
    }
}

/// Propagates or generates an `x-request-id`
#[derive(Debug, Default)]
pub struct RequestIdMiddleware;

#[async_trait]
impl Middleware for RequestIdMiddleware {
    async fn handle(&self, mut req: HttpRequest, next: Next) -> Result<HttpResponse, Error> {
        let request_id = req
            .header("x-request-id")
            .cloned()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        req.set_header("x-request-id", request_id.clone());

        let mut response = next(req).await?;
        response
            .headers
            .insert("x-request-id".to_string(), request_id);

        Ok(response)
    }
}
