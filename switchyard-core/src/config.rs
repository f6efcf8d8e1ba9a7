// Router settings loaded from TOML or the environment

use crate::Error;
use serde::Deserialize;
use std::path::Path;

/// Prefix of the environment variables read by [`RouterConfig::from_env`]
pub const ENV_PREFIX: &str = "SWITCHYARD";

/// Router settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Prefixed to every URI built by the router, e.g. `https://example.com`
    pub base_uri: String,
}

impl RouterConfig {
    /// Parse settings from TOML; a `[router]` table is accepted as well as
    /// top-level keys
    pub fn from_toml_str(content: &str) -> Result<Self, Error> {
        #[derive(Deserialize)]
        struct Document {
            router: Option<RouterConfig>,
            #[serde(flatten)]
            top_level: RouterConfig,
        }

        let document: Document =
            toml::from_str(content).map_err(|e| Error::Config(format!("TOML parse error: {}", e)))?;
        Ok(document.router.unwrap_or(document.top_level))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Read `SWITCHYARD_BASE_URI`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, which is given full variable names
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(base_uri) = lookup(&format!("{}_BASE_URI", ENV_PREFIX)) {
            config.base_uri = base_uri;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_from_toml_top_level() {
        let config = RouterConfig::from_toml_str(r#"base_uri = "https://example.com""#).unwrap();
        assert_eq!(config.base_uri, "https://example.com");
    }

    #[test]
    fn test_from_toml_router_table() {
        let config = RouterConfig::from_toml_str(
            r#"
            [router]
            base_uri = "http://localhost:8000"
            "#,
        )
        .unwrap();
        assert_eq!(config.base_uri, "http://localhost:8000");
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        assert_eq!(RouterConfig::from_toml_str("").unwrap(), RouterConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = RouterConfig::from_toml_str("base_uri = ").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"base_uri = "https://files.example""#).unwrap();

        let config = RouterConfig::from_file(file.path()).unwrap();
        assert_eq!(config.base_uri, "https://files.example");
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [("SWITCHYARD_BASE_URI", "https://env.example")].into();
        let config = RouterConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.base_uri, "https://env.example");
    }
}
