use switchyard_core::{
    Container, HandlerRef, HttpRequest, LoggerMiddleware, MiddlewareRef, RequestIdMiddleware,
    Route, RouteConfig, Router, declare_route,
};

struct Articles;

fn list_articles() -> Route {
    Route::get("/articles", HandlerRef::of::<Articles>("index"))
        .handler(|_ctx| async { Ok("all articles") })
}

fn show_article() -> Route {
    Route::get("/articles/{slug}", HandlerRef::of::<Articles>("show"))
        .middleware(MiddlewareRef::of::<LoggerMiddleware>())
        .handler(|ctx| async move {
            Ok(format!("article {}", ctx.param("slug").unwrap_or_default()))
        })
}

declare_route!(list_articles);
declare_route!(show_article);

#[test]
fn test_declared_routes_are_discovered() {
    let config = RouteConfig::builder().discover().build().unwrap();

    assert_eq!(config.len(), 2);
    assert!(config.route_for(HandlerRef::new("Articles", "index")).is_some());
    assert!(config.route_for(HandlerRef::new("Articles", "show")).is_some());
}

#[tokio::test]
async fn test_dispatch_discovered_route_with_builtin_middleware() {
    let container = Container::new();
    container.register(LoggerMiddleware);
    container.register(RequestIdMiddleware);

    let router = Router::new(RouteConfig::builder().discover().build().unwrap(), container);
    router.add_middleware(MiddlewareRef::of::<RequestIdMiddleware>());

    let response = router
        .dispatch(HttpRequest::new("GET", "/articles/hello").with_header("x-request-id", "r-1"))
        .await
        .unwrap();

    assert_eq!(response.body_text().unwrap().unwrap(), "article hello");
    assert_eq!(response.headers.get("x-request-id"), Some(&"r-1".to_string()));
}
