// Switchyard - an HTTP router for Rust
//
// Routes are compiled into one regex per HTTP method, dispatched through a
// middleware chain and can be rendered to static pages by the CLI.

// Re-export core functionality
pub use switchyard_core::*;

// Re-export optional crates
#[cfg(feature = "cli")]
pub use switchyard_cli;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Container,
        Error,
        HandlerRef,
        Html,
        HttpMethod,
        HttpRequest,
        HttpResponse,
        IntoReply,
        LoggerMiddleware,
        MatchedRoute,
        Middleware,
        MiddlewareRef,
        Next,
        Rejection,
        RequestContext,
        RequestIdMiddleware,
        Route,
        RouteConfig,
        Router,
        RouterConfig,
        TypedRequest,
        UriTarget,
        ValidationError,
        View,
        async_trait,
        declare_route,
    };
}
