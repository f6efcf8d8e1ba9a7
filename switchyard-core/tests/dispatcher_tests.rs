//! Integration tests for dispatch and middleware ordering

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use switchyard_core::*;

#[derive(Default)]
struct Journal(Mutex<Vec<String>>);

impl Journal {
    fn record(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

/// Records entry and exit around the rest of the chain
struct Recorder {
    name: &'static str,
    journal: Arc<Journal>,
}

impl Recorder {
    async fn around(&self, req: HttpRequest, next: Next) -> Result<HttpResponse, Error> {
        self.journal.record(format!("{}:in", self.name));
        let response = next(req).await;
        self.journal.record(format!("{}:out", self.name));
        response
    }
}

struct A(Recorder);
struct B(Recorder);
struct C(Recorder);

#[async_trait]
impl Middleware for A {
    async fn handle(&self, req: HttpRequest, next: Next) -> Result<HttpResponse, Error> {
        self.0.around(req, next).await
    }
}

#[async_trait]
impl Middleware for B {
    async fn handle(&self, req: HttpRequest, next: Next) -> Result<HttpResponse, Error> {
        self.0.around(req, next).await
    }
}

#[async_trait]
impl Middleware for C {
    async fn handle(&self, req: HttpRequest, next: Next) -> Result<HttpResponse, Error> {
        self.0.around(req, next).await
    }
}

/// Answers without calling the rest of the chain
struct Gate {
    journal: Arc<Journal>,
}

#[async_trait]
impl Middleware for Gate {
    async fn handle(&self, _req: HttpRequest, _next: Next) -> Result<HttpResponse, Error> {
        self.journal.record("gate");
        Ok(HttpResponse::new(403))
    }
}

struct Profile {
    name: String,
}

impl TypedRequest for Profile {
    fn from_request(request: &HttpRequest) -> Result<Self, Error> {
        Ok(Profile {
            name: request.query("name").cloned().unwrap_or_default(),
        })
    }

    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        if self.name.is_empty() {
            return Err(vec![
                ValidationError::new("name", "name is required").with_constraint("required"),
            ]);
        }
        Ok(())
    }
}

fn container(journal: &Arc<Journal>) -> Container {
    let container = Container::new();
    let recorder = |name| Recorder {
        name,
        journal: journal.clone(),
    };
    container.register(A(recorder("A")));
    container.register(B(recorder("B")));
    container.register(C(recorder("C")));
    container.register(Gate {
        journal: journal.clone(),
    });
    container.register_arc(journal.clone());
    container
}

fn router(journal: &Arc<Journal>) -> Router {
    let config = RouteConfig::builder()
        .route(
            Route::get("/pages/{slug}", HandlerRef::new("Pages", "show"))
                .middleware(MiddlewareRef::of::<C>())
                .handler(|ctx| async move {
                    ctx.resolve::<Journal>()?.record("handler");
                    Ok::<_, Error>(Html::new(format!(
                        "<h1>{}</h1>",
                        ctx.param("slug").unwrap_or_default()
                    )))
                }),
        )
        .route(
            Route::get("/private", HandlerRef::new("Pages", "private"))
                .middleware(MiddlewareRef::of::<Gate>())
                .middleware(MiddlewareRef::of::<C>())
                .handler(|ctx| async move {
                    ctx.resolve::<Journal>()?.record("handler");
                    Ok::<_, Error>(HttpResponse::ok())
                }),
        )
        .route(
            Route::get("/profile", HandlerRef::new("Profiles", "show"))
                .middleware(MiddlewareRef::of::<C>())
                .typed_handler(|profile: Arc<Profile>, ctx| async move {
                    ctx.resolve::<Journal>()?.record("handler");
                    Ok::<_, Error>(profile.name.clone())
                }),
        )
        .route(
            Route::get("/silent", HandlerRef::new("Pages", "silent"))
                .middleware(MiddlewareRef::of::<C>())
                .handler(|_ctx| async { Ok(()) }),
        )
        .build()
        .unwrap();

    let router = Router::new(config, container(journal));
    router.add_middleware(MiddlewareRef::of::<A>());
    router.add_middleware(MiddlewareRef::of::<B>());
    router
}

#[tokio::test]
async fn test_global_then_route_middleware_order() {
    let journal = Arc::new(Journal::default());
    let response = router(&journal)
        .dispatch(HttpRequest::new("GET", "/pages/about"))
        .await
        .unwrap();

    assert!(response.is_ok());
    assert_eq!(response.body_text().unwrap().unwrap(), "<h1>about</h1>");
    assert_eq!(
        journal.entries(),
        vec!["A:in", "B:in", "C:in", "handler", "C:out", "B:out", "A:out"]
    );
}

#[tokio::test]
async fn test_short_circuit_skips_inner_middleware_and_handler() {
    let journal = Arc::new(Journal::default());
    let response = router(&journal)
        .dispatch(HttpRequest::new("GET", "/private"))
        .await
        .unwrap();

    assert_eq!(response.status, 403);
    assert_eq!(journal.entries(), vec!["A:in", "B:in", "gate", "B:out", "A:out"]);
}

#[tokio::test]
async fn test_invalid_request_never_reaches_middleware_or_handler() {
    let journal = Arc::new(Journal::default());
    let response = router(&journal)
        .dispatch(HttpRequest::new("GET", "/profile"))
        .await
        .unwrap();

    assert_eq!(response.status, 400);
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["errors"][0]["field"], "name");
    assert_eq!(body["errors"][0]["constraint"], "required");
    assert!(journal.entries().is_empty());
}

#[tokio::test]
async fn test_valid_typed_request_reaches_handler() {
    let journal = Arc::new(Journal::default());
    let response = router(&journal)
        .dispatch(HttpRequest::new("GET", "/profile?name=ada"))
        .await
        .unwrap();

    assert_eq!(response.body_text().unwrap().unwrap(), "ada");
    assert!(journal.entries().contains(&"handler".to_string()));
}

#[tokio::test]
async fn test_handler_returning_nothing_is_fatal_even_when_wrapped() {
    let journal = Arc::new(Journal::default());
    let err = router(&journal)
        .dispatch(HttpRequest::new("GET", "/silent"))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Pages::silent"));
    match err {
        Error::HandlerReturnedNothing { handler } => {
            assert_eq!(handler, HandlerRef::new("Pages", "silent"));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(journal.entries().last().map(String::as_str), Some("A:out"));
}

#[tokio::test]
async fn test_not_found_response() {
    let journal = Arc::new(Journal::default());
    let response = router(&journal)
        .dispatch(HttpRequest::new("GET", "/nowhere"))
        .await
        .unwrap();

    assert_eq!(response.status, 404);
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["status"], 404);
    assert!(journal.entries().is_empty());
}

#[tokio::test]
async fn test_middleware_added_later_applies_to_later_dispatches() {
    let journal = Arc::new(Journal::default());
    let config = RouteConfig::builder()
        .route(
            Route::get("/", HandlerRef::new("Home", "index"))
                .handler(|_ctx| async { Ok(HttpResponse::ok()) }),
        )
        .build()
        .unwrap();
    let router = Router::new(config, container(&journal));

    router.dispatch(HttpRequest::new("GET", "/")).await.unwrap();
    assert!(journal.entries().is_empty());

    router.add_middleware(MiddlewareRef::of::<A>());
    router.dispatch(HttpRequest::new("GET", "/")).await.unwrap();
    assert_eq!(journal.entries(), vec!["A:in", "A:out"]);
}

#[tokio::test]
async fn test_concurrent_dispatches_are_isolated() {
    let config = RouteConfig::builder()
        .route(
            Route::get("/echo/{value}", HandlerRef::new("Echo", "show")).handler(|ctx| async move {
                tokio::task::yield_now().await;
                let matched = ctx.matched_route().map(|m| m.params().to_vec());
                Ok::<_, Error>(format!("{:?}", matched.unwrap_or_default()))
            }),
        )
        .build()
        .unwrap();
    let router = Arc::new(Router::new(config, Container::new()));

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let router = router.clone();
            tokio::spawn(async move {
                let response = router
                    .dispatch(HttpRequest::new("GET", format!("/echo/{}", i)))
                    .await
                    .unwrap();
                (i, response.body_text().unwrap().unwrap())
            })
        })
        .collect();

    for task in tasks {
        let (i, body) = task.await.unwrap();
        assert_eq!(body, format!("[(\"value\", \"{}\")]", i));
    }
}
