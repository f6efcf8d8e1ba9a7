// Error types for the Switchyard router

use crate::{HandlerRef, HttpMethod};
use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Route not found: {0}")]
    RouteNotFound(String),

    /// A route template could not be compiled. Raised while the route table
    /// is built, never while a request is being dispatched.
    #[error("Malformed route pattern `{template}`: {reason}")]
    MalformedRoutePattern { template: String, reason: String },

    #[error("Duplicate route: {method} {path}")]
    DuplicateRoute { method: HttpMethod, path: String },

    /// The handler completed without producing a response or a view.
    #[error("Handler {handler} did not return a response")]
    HandlerReturnedNothing { handler: HandlerRef },

    /// A URI was requested for a handler that has no route declaration.
    #[error("Invalid route: {handler} has no route declaration")]
    InvalidRoute { handler: HandlerRef },

    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl Error {
    pub(crate) fn malformed(template: &str, reason: impl Into<String>) -> Self {
        Error::MalformedRoutePattern {
            template: template.to_string(),
            reason: reason.into(),
        }
    }

    /// Get the HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Error::RouteNotFound(_) => StatusCode::NOT_FOUND,
            Error::Validation(_) | Error::Deserialization(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        self.status().as_u16()
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }
}
