// Handler identity, handler output and the request-scoped handler context

use crate::{Container, Error, HttpRequest, HttpResponse, Html, MatchedRoute, View};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Identity of a route target: a controller and one of its actions.
///
/// This is the key the URI builder uses to find a route's template, and the
/// name reported when a handler breaks its contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandlerRef {
    controller: &'static str,
    action: &'static str,
}

impl HandlerRef {
    pub const fn new(controller: &'static str, action: &'static str) -> Self {
        Self { controller, action }
    }

    /// Use the short name of type `C` as the controller name.
    ///
    /// ```
    /// use switchyard_core::HandlerRef;
    ///
    /// struct Users;
    /// assert_eq!(HandlerRef::of::<Users>("show"), HandlerRef::new("Users", "show"));
    /// ```
    pub fn of<C: ?Sized + 'static>(action: &'static str) -> Self {
        let full = std::any::type_name::<C>();
        let base = full.split('<').next().unwrap_or(full);
        let controller = base.rsplit("::").next().unwrap_or(base);
        Self::new(controller, action)
    }

    pub fn controller(&self) -> &'static str {
        self.controller
    }

    pub fn action(&self) -> &'static str {
        self.action
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.controller, self.action)
    }
}

/// What a handler produced
pub enum Reply {
    Response(HttpResponse),
    View(Box<dyn View>),
}

impl Reply {
    pub fn view(view: impl View) -> Self {
        Reply::View(Box::new(view))
    }

    /// Normalize into a response; views become a 200 carrying the view.
    pub fn into_response(self) -> HttpResponse {
        match self {
            Reply::Response(response) => response,
            Reply::View(view) => HttpResponse::ok().with_boxed_view(view),
        }
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Response(response) => f.debug_tuple("Response").field(response).finish(),
            Reply::View(_) => f.write_str("View(..)"),
        }
    }
}

/// Conversion of handler return values.
///
/// `()` converts to nothing at all, which the dispatcher reports as
/// [`Error::HandlerReturnedNothing`].
pub trait IntoReply {
    fn into_reply(self) -> Option<Reply>;
}

impl IntoReply for Reply {
    fn into_reply(self) -> Option<Reply> {
        Some(self)
    }
}

impl IntoReply for HttpResponse {
    fn into_reply(self) -> Option<Reply> {
        Some(Reply::Response(self))
    }
}

impl IntoReply for Html {
    fn into_reply(self) -> Option<Reply> {
        Some(Reply::view(self))
    }
}

impl IntoReply for String {
    fn into_reply(self) -> Option<Reply> {
        Some(Reply::Response(HttpResponse::text(self)))
    }
}

impl IntoReply for &'static str {
    fn into_reply(self) -> Option<Reply> {
        self.to_string().into_reply()
    }
}

impl IntoReply for () {
    fn into_reply(self) -> Option<Reply> {
        None
    }
}

impl<T: IntoReply> IntoReply for Option<T> {
    fn into_reply(self) -> Option<Reply> {
        self.and_then(IntoReply::into_reply)
    }
}

/// Everything a handler can see about the request it is serving.
///
/// The context is created per dispatch. The matched route and the resolved
/// typed request live in the request's extensions; the container is the
/// application's, shared across requests.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request: HttpRequest,
    container: Container,
}

impl RequestContext {
    pub fn new(request: HttpRequest, container: Container) -> Self {
        Self { request, container }
    }

    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    pub fn into_request(self) -> HttpRequest {
        self.request
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn matched_route(&self) -> Option<&MatchedRoute> {
        self.request.matched_route()
    }

    /// A path parameter extracted by the matcher
    pub fn param(&self, name: &str) -> Option<&str> {
        self.matched_route().and_then(|matched| matched.param(name))
    }

    /// The typed request resolved for this dispatch
    pub fn typed<R: Send + Sync + 'static>(&self) -> Result<Arc<R>, Error> {
        self.request.extensions.get_arc::<R>().ok_or_else(|| {
            Error::Internal(format!(
                "request type {} was not resolved for this route",
                std::any::type_name::<R>()
            ))
        })
    }

    /// Resolve a provider from the application container
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, Error> {
        self.container.resolve::<T>()
    }
}

pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Option<Reply>, Error>> + Send>>;

/// Type-erased route handler
pub type HandlerFn = Arc<dyn Fn(RequestContext) -> HandlerFuture + Send + Sync>;

pub(crate) fn erase_handler<F, Fut, O>(handler: F) -> HandlerFn
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, Error>> + Send + 'static,
    O: IntoReply,
{
    Arc::new(move |ctx: RequestContext| -> HandlerFuture {
        let fut = handler(ctx);
        Box::pin(async move { fut.await.map(IntoReply::into_reply) })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    mod admin {
        pub struct Dashboard;
    }

    #[test]
    fn test_handler_ref_strips_module_path() {
        let handler = HandlerRef::of::<admin::Dashboard>("index");
        assert_eq!(handler.controller(), "Dashboard");
        assert_eq!(handler.action(), "index");
        assert_eq!(handler.to_string(), "Dashboard::index");
    }

    #[test]
    fn test_unit_converts_to_nothing() {
        assert!(().into_reply().is_none());
        assert!(None::<HttpResponse>.into_reply().is_none());
    }

    #[test]
    fn test_view_reply_becomes_ok_response() {
        let response = Html::new("<b>x</b>").into_reply().unwrap().into_response();
        assert_eq!(response.status, 200);
        assert!(response.body.is_textual());
    }

    #[test]
    fn test_response_reply_passes_through() {
        let response = HttpResponse::new(201).into_reply().unwrap().into_response();
        assert_eq!(response.status, 201);
    }

    #[tokio::test]
    async fn test_erased_handler_converts_output() {
        let handler = erase_handler(|_ctx| async { Ok::<_, Error>("hello") });
        let ctx = RequestContext::new(HttpRequest::new("GET", "/"), Container::new());

        let reply = handler(ctx).await.unwrap().unwrap().into_response();
        assert_eq!(reply.body_text().unwrap().unwrap(), "hello");
    }
}
