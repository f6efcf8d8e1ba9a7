// HTTP request and response types

use crate::{Error, Extensions, MatchedRoute, ValidationErrors, View};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The router's internal request representation
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub path_params: HashMap<String, String>,
    pub query_params: HashMap<String, String>,
    pub extensions: Extensions,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: HashMap::new(),
            body: Vec::new(),
            path_params: HashMap::new(),
            query_params: HashMap::new(),
            extensions: Extensions::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set a header, replacing any existing entry whose name differs only
    /// in case
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.headers.retain(|name, _| !name.eq_ignore_ascii_case(&key));
        self.headers.insert(key, value.into());
    }

    /// Parse the request body as JSON
    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> Result<T, Error> {
        serde_json::from_slice(&self.body).map_err(|e| Error::Deserialization(e.to_string()))
    }

    /// Get a path parameter by name
    pub fn param(&self, name: &str) -> Option<&String> {
        self.path_params.get(name)
    }

    /// Get a query parameter by name
    pub fn query(&self, name: &str) -> Option<&String> {
        self.query_params.get(name)
    }

    /// Header lookup, case-insensitive on the name
    pub fn header(&self, name: &str) -> Option<&String> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// The route matched for this request, once dispatch has matched it
    pub fn matched_route(&self) -> Option<&MatchedRoute> {
        self.extensions.get::<MatchedRoute>()
    }

    /// Split a `?query` suffix off the path and decode it into `query_params`.
    pub(crate) fn split_query(&mut self) {
        if let Some((path, query)) = self.path.split_once('?') {
            let query: Vec<(String, String)> =
                serde_urlencoded::from_str(query).unwrap_or_default();
            self.query_params.extend(query);
            self.path = path.to_string();
        }
    }
}

impl<B: AsRef<[u8]>> From<http::Request<B>> for HttpRequest {
    fn from(request: http::Request<B>) -> Self {
        let (parts, body) = request.into_parts();
        let path = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        let mut converted = HttpRequest::new(parts.method.as_str(), path);
        for (name, value) in &parts.headers {
            if let Ok(value) = value.to_str() {
                converted
                    .headers
                    .insert(name.to_string(), value.to_string());
            }
        }
        converted.body = body.as_ref().to_vec();
        converted
    }
}

/// Response payload
pub enum ResponseBody {
    Empty,
    Bytes(Vec<u8>),
    Text(String),
    /// A view carried unrendered until the body is read
    View(Box<dyn View>),
}

impl ResponseBody {
    /// True for bodies that are a string or a view
    pub fn is_textual(&self) -> bool {
        matches!(self, ResponseBody::Text(_) | ResponseBody::View(_))
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseBody::Empty => f.write_str("Empty"),
            ResponseBody::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            ResponseBody::Text(text) => f.debug_tuple("Text").field(text).finish(),
            ResponseBody::View(_) => f.write_str("View(..)"),
        }
    }
}

/// HTTP response wrapper
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: ResponseBody,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: ResponseBody::Empty,
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    pub fn no_content() -> Self {
        Self::new(204)
    }

    pub fn bad_request() -> Self {
        Self::new(400)
    }

    pub fn not_found() -> Self {
        Self::new(404)
    }

    pub fn internal_server_error() -> Self {
        Self::new(500)
    }

    /// 200 response with a plain-text body
    pub fn text(body: impl Into<String>) -> Self {
        Self::ok()
            .with_header("Content-Type", "text/plain; charset=utf-8")
            .with_text(body)
    }

    /// 200 response carrying a view
    pub fn view(view: impl View) -> Self {
        Self::ok().with_view(view)
    }

    /// The NotFound outcome of a dispatch
    pub fn route_not_found(method: &str, path: &str) -> Self {
        let body = serde_json::json!({
            "error": format!("Route not found: {} {}", method, path),
            "status": 404,
        });
        Self::not_found()
            .with_json(&body)
            .unwrap_or_else(|_| Self::not_found())
    }

    /// The Invalid outcome of a dispatch, carrying the failing rules
    pub fn invalid(errors: &ValidationErrors) -> Self {
        Self::bad_request()
            .with_json(&errors.to_json())
            .unwrap_or_else(|_| Self::bad_request())
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = ResponseBody::Bytes(body);
        self
    }

    pub fn with_text(mut self, body: impl Into<String>) -> Self {
        self.body = ResponseBody::Text(body.into());
        self
    }

    pub fn with_view(mut self, view: impl View) -> Self {
        self.headers
            .insert("Content-Type".to_string(), view.content_type().to_string());
        self.body = ResponseBody::View(Box::new(view));
        self
    }

    pub(crate) fn with_boxed_view(mut self, view: Box<dyn View>) -> Self {
        self.headers
            .insert("Content-Type".to_string(), view.content_type().to_string());
        self.body = ResponseBody::View(view);
        self
    }

    pub fn with_json<T: Serialize>(mut self, value: &T) -> Result<Self, Error> {
        let body = serde_json::to_vec(value).map_err(|e| Error::Serialization(e.to_string()))?;
        self.body = ResponseBody::Bytes(body);
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        Ok(self)
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Render the body as text. `None` for empty and binary bodies.
    pub fn body_text(&self) -> Option<Result<String, Error>> {
        match &self.body {
            ResponseBody::Text(text) => Some(Ok(text.clone())),
            ResponseBody::View(view) => Some(view.render()),
            ResponseBody::Empty | ResponseBody::Bytes(_) => None,
        }
    }

    /// Render the body to bytes
    pub fn body_bytes(&self) -> Result<Vec<u8>, Error> {
        match &self.body {
            ResponseBody::Empty => Ok(Vec::new()),
            ResponseBody::Bytes(bytes) => Ok(bytes.clone()),
            ResponseBody::Text(text) => Ok(text.as_bytes().to_vec()),
            ResponseBody::View(view) => view.render().map(String::into_bytes),
        }
    }

    /// Parse a byte body as JSON
    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> Result<T, Error> {
        serde_json::from_slice(&self.body_bytes()?)
            .map_err(|e| Error::Deserialization(e.to_string()))
    }
}
