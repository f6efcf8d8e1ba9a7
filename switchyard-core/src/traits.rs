// Core traits for the Switchyard router

use crate::{Error, HttpRequest, ValidationError};
use std::fmt;

/// HTTP methods
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
    OPTIONS,
}

impl HttpMethod {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Some(HttpMethod::GET),
            "POST" => Some(HttpMethod::POST),
            "PUT" => Some(HttpMethod::PUT),
            "DELETE" => Some(HttpMethod::DELETE),
            "PATCH" => Some(HttpMethod::PATCH),
            "HEAD" => Some(HttpMethod::HEAD),
            "OPTIONS" => Some(HttpMethod::OPTIONS),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request representation a handler can declare as its input.
///
/// The dispatcher maps the raw [`HttpRequest`] into the handler's declared
/// representation and runs [`TypedRequest::validate`] before any middleware or
/// the handler itself is invoked. A failed validation short-circuits into an
/// `Invalid` response carrying the failing rules.
///
/// ```
/// use switchyard_core::{Error, HttpRequest, TypedRequest, ValidationError};
///
/// #[derive(serde::Deserialize)]
/// struct CreateUser {
///     name: String,
/// }
///
/// impl TypedRequest for CreateUser {
///     fn from_request(request: &HttpRequest) -> Result<Self, Error> {
///         request.json()
///     }
///
///     fn validate(&self) -> Result<(), Vec<ValidationError>> {
///         if self.name.is_empty() {
///             return Err(vec![ValidationError::new("name", "must not be empty")]);
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait TypedRequest: Send + Sync + Sized + 'static {
    /// Map the raw request into this representation
    fn from_request(request: &HttpRequest) -> Result<Self, Error>;

    /// Self-validation run after mapping
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Ok(())
    }
}

impl TypedRequest for HttpRequest {
    fn from_request(request: &HttpRequest) -> Result<Self, Error> {
        Ok(request.clone())
    }
}

/// Something that renders to a textual document.
pub trait View: Send + Sync + 'static {
    fn render(&self) -> Result<String, Error>;

    /// Content type sent with the rendered body
    fn content_type(&self) -> &'static str {
        "text/html; charset=utf-8"
    }
}

/// A pre-rendered HTML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Html(pub String);

impl Html {
    pub fn new(content: impl Into<String>) -> Self {
        Self(content.into())
    }
}

impl View for Html {
    fn render(&self) -> Result<String, Error> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing_is_case_insensitive() {
        assert_eq!(HttpMethod::from_str("get"), Some(HttpMethod::GET));
        assert_eq!(HttpMethod::from_str("Patch"), Some(HttpMethod::PATCH));
        assert_eq!(HttpMethod::from_str("BREW"), None);
    }

    #[test]
    fn test_method_display() {
        assert_eq!(HttpMethod::DELETE.to_string(), "DELETE");
    }

    #[test]
    fn test_html_view_renders_content() {
        let view = Html::new("<h1>Hi</h1>");
        assert_eq!(view.render().unwrap(), "<h1>Hi</h1>");
        assert_eq!(view.content_type(), "text/html; charset=utf-8");
    }
}
