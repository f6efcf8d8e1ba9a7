//! Static generation settings.

use crate::error::CliResult;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable overriding the output directory
pub const OUTPUT_ENV: &str = "SWITCHYARD_STATIC_OUTPUT";

/// Settings of the `static:generate` command
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StaticConfig {
    /// Directory generated pages are written to
    pub output_dir: PathBuf,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("public"),
        }
    }
}

impl StaticConfig {
    /// Parse the `[static]` table of a TOML document; other tables are ignored
    pub fn from_toml_str(content: &str) -> CliResult<Self> {
        #[derive(Deserialize)]
        struct Document {
            #[serde(rename = "static", default)]
            settings: StaticConfig,
        }

        let document: Document = toml::from_str(content)?;
        Ok(document.settings)
    }

    pub fn from_file(path: impl AsRef<Path>) -> CliResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(OUTPUT_ENV) {
            Some(dir) if !dir.is_empty() => Self {
                output_dir: PathBuf::from(dir),
            },
            _ => Self::default(),
        }
    }
}
