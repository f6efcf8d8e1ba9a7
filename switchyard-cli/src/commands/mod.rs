//! CLI command implementations.

pub mod routes;
pub mod static_generate;
