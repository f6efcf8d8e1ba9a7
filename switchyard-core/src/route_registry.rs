//! Declarative route registration using inventory
//!
//! Applications declare routes next to their handlers with
//! [`declare_route!`](crate::declare_route); the route table collects them
//! at startup through [`RouteConfigBuilder::discover`](crate::RouteConfigBuilder::discover).

use crate::Route;

/// A route declaration collected via inventory
pub struct RouteDeclaration {
    declare: fn() -> Route,
}

inventory::collect!(RouteDeclaration);

impl RouteDeclaration {
    pub const fn new(declare: fn() -> Route) -> Self {
        Self { declare }
    }

    pub fn route(&self) -> Route {
        (self.declare)()
    }
}

/// Build every declared route
pub fn declared_routes() -> Vec<Route> {
    inventory::iter::<RouteDeclaration>
        .into_iter()
        .map(RouteDeclaration::route)
        .collect()
}

/// Submit a function returning a [`Route`] for discovery.
///
/// ```ignore
/// fn show_user() -> Route {
///     Route::get("/users/{id}", HandlerRef::new("Users", "show"))
///         .handler(|ctx| async move { Ok(ctx.param("id").unwrap_or_default().to_string()) })
/// }
///
/// declare_route!(show_user);
/// ```
#[macro_export]
macro_rules! declare_route {
    ($declare:path) => {
        $crate::inventory::submit! {
            $crate::route_registry::RouteDeclaration::new($declare)
        }
    };
}
