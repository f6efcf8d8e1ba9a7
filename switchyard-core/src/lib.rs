// Core library for the Switchyard HTTP router
// Route table, pattern compiler, matcher, middleware chain, dispatcher and URI builder

pub mod config;
pub mod container;
pub mod dispatcher;
pub mod error;
pub mod extensions;
pub mod handler;
pub mod http;
pub mod logging;
pub mod matcher;
pub mod middleware;
pub mod pattern;
pub mod route;
pub mod route_config;
pub mod route_registry;
pub mod traits;
pub mod uri;
pub mod validation;

// Re-export commonly used types
pub use config::*;
pub use container::*;
pub use dispatcher::*;
pub use error::*;
pub use extensions::*;
pub use handler::*;
pub use self::http::*;
pub use matcher::*;
pub use middleware::*;
pub use pattern::*;
pub use route::{Rejection, Route, RouteBuilder};
pub use route_config::*;
pub use route_registry::{RouteDeclaration, declared_routes};
pub use traits::*;
pub use uri::*;
pub use validation::*;

// Used by `declare_route!`
pub use inventory;

// Middleware implementations are written with `#[async_trait]`
pub use async_trait::async_trait;
