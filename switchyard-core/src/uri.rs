// URI building: the inverse of matching

use crate::logging::trace;
use crate::{Error, HandlerRef, Router};
use std::collections::HashMap;

/// What a URI is built for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UriTarget {
    /// A handler; its route template is looked up in the route table
    Handler(HandlerRef),
    /// A literal path, used verbatim
    Literal(String),
}

impl From<HandlerRef> for UriTarget {
    fn from(handler: HandlerRef) -> Self {
        UriTarget::Handler(handler)
    }
}

impl From<&str> for UriTarget {
    fn from(path: &str) -> Self {
        UriTarget::Literal(path.to_string())
    }
}

impl From<String> for UriTarget {
    fn from(path: String) -> Self {
        UriTarget::Literal(path)
    }
}

impl Router {
    /// Build the URI for a handler or literal path.
    ///
    /// A parameter whose name is exactly a token name of the route template
    /// replaces that token; every other parameter goes to the query string,
    /// URL-encoded, in argument order. The result is prefixed with the base
    /// URI.
    ///
    /// ```
    /// use switchyard_core::{Container, HandlerRef, HttpResponse, Route, RouteConfig, Router};
    ///
    /// let show = HandlerRef::new("Users", "show");
    /// let config = RouteConfig::builder()
    ///     .route(Route::get("/users/{id}", show).handler(|_ctx| async { Ok(HttpResponse::ok()) }))
    ///     .build()
    ///     .unwrap();
    /// let router = Router::new(config, Container::new()).with_base_uri("https://example.com/");
    ///
    /// assert_eq!(
    ///     router.to_uri(show, [("id", 42), ("tab", 2)]).unwrap(),
    ///     "https://example.com/users/42?tab=2"
    /// );
    /// ```
    pub fn to_uri<K, V>(
        &self,
        target: impl Into<UriTarget>,
        params: impl IntoIterator<Item = (K, V)>,
    ) -> Result<String, Error>
    where
        K: AsRef<str>,
        V: ToString,
    {
        let target = target.into();
        let params: Vec<(String, String)> = params
            .into_iter()
            .map(|(key, value)| (key.as_ref().to_string(), value.to_string()))
            .collect();

        let (path, query) = match &target {
            UriTarget::Handler(handler) => {
                let pattern = self
                    .routes()
                    .pattern_for(*handler)
                    .ok_or(Error::InvalidRoute { handler: *handler })?;

                let mut values = HashMap::new();
                let mut query = Vec::new();
                for (key, value) in &params {
                    if pattern.has_param(key) {
                        values.insert(key.as_str(), value.clone());
                    } else {
                        query.push((key.as_str(), value.as_str()));
                    }
                }
                (pattern.render(&values), query)
            }
            UriTarget::Literal(path) => (
                path.clone(),
                params
                    .iter()
                    .map(|(key, value)| (key.as_str(), value.as_str()))
                    .collect(),
            ),
        };

        let mut uri = join(self.base_uri(), &path);
        if !query.is_empty() {
            let encoded = serde_urlencoded::to_string(&query)
                .map_err(|e| Error::Serialization(e.to_string()))?;
            uri.push(if uri.contains('?') { '&' } else { '?' });
            uri.push_str(&encoded);
        }

        trace!(uri_target = ?target, uri = %uri, "Built URI");
        Ok(uri)
    }
}

fn join(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{}/{}", base, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Container, HttpResponse, Route, RouteConfig};

    const SHOW: HandlerRef = HandlerRef::new("Users", "show");
    const NESTED: HandlerRef = HandlerRef::new("Users", "nested");

    fn router(base: &str) -> Router {
        let config = RouteConfig::builder()
            .route(Route::get("/users/{id}", SHOW).handler(|_ctx| async { Ok(HttpResponse::ok()) }))
            .route(
                Route::get("/groups/{middleId}/{id:\\d+}", NESTED)
                    .handler(|_ctx| async { Ok(HttpResponse::ok()) }),
            )
            .build()
            .unwrap();
        Router::new(config, Container::new()).with_base_uri(base)
    }

    #[test]
    fn test_path_param_is_substituted() {
        let uri = router("http://localhost:8000").to_uri(SHOW, [("id", 42)]).unwrap();
        assert_eq!(uri, "http://localhost:8000/users/42");
    }

    #[test]
    fn test_extra_params_go_to_query() {
        let uri = router("")
            .to_uri(SHOW, [("id", "7"), ("q", "a b"), ("page", "2")])
            .unwrap();
        assert_eq!(uri, "/users/7?q=a+b&page=2");
    }

    #[test]
    fn test_token_names_match_exactly() {
        let uri = router("").to_uri(NESTED, [("id", "5")]).unwrap();
        assert_eq!(uri, "/groups/{middleId}/5");

        let uri = router("").to_uri(NESTED, [("Id", "5")]).unwrap();
        assert_eq!(uri, "/groups/{middleId}/{id:\\d+}?Id=5");
    }

    #[test]
    fn test_undeclared_handler_is_invalid_route() {
        let err = router("")
            .to_uri(HandlerRef::new("Users", "missing"), Vec::<(&str, &str)>::new())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRoute { handler } if handler.action() == "missing"));
    }

    #[test]
    fn test_literal_target() {
        let router = router("https://example.com/");
        assert_eq!(
            router.to_uri("/about", Vec::<(&str, &str)>::new()).unwrap(),
            "https://example.com/about"
        );
        assert_eq!(
            router.to_uri("/search?q=x", [("page", 3)]).unwrap(),
            "https://example.com/search?q=x&page=3"
        );
    }
}
