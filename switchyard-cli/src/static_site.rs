//! Static site generation.
//!
//! Every configured page is bound to a handler. For each parameter set its
//! data provider yields, the generator builds the page URI, dispatches a
//! synthetic `GET` through the router and writes the rendered body below the
//! output root. Pages that do not render to a textual 200 response are
//! reported and skipped.

use crate::error::CliResult;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use switchyard_core::{HandlerRef, HttpRequest, Router};
use tracing::{debug, info, warn};

/// Parameters for one generated page, in argument order
pub type UriParams = Vec<(String, String)>;

/// Yields one parameter set per page to generate
pub type DataProvider = Arc<dyn Fn() -> Vec<UriParams> + Send + Sync>;

/// A handler whose output is written to disk
#[derive(Clone)]
pub struct StaticPage {
    pub handler: HandlerRef,
    /// `None` generates a single page without parameters
    pub data_provider: Option<DataProvider>,
}

impl StaticPage {
    pub fn new(handler: HandlerRef) -> Self {
        Self {
            handler,
            data_provider: None,
        }
    }

    pub fn with_data<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> Vec<UriParams> + Send + Sync + 'static,
    {
        self.data_provider = Some(Arc::new(provider));
        self
    }

    fn parameter_sets(&self) -> Vec<UriParams> {
        match &self.data_provider {
            Some(provider) => provider(),
            None => vec![Vec::new()],
        }
    }
}

impl fmt::Debug for StaticPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticPage")
            .field("handler", &self.handler)
            .field("data_provider", &self.data_provider.is_some())
            .finish()
    }
}

/// Build a parameter set from pairs
pub fn uri_params<K: Into<String>, V: ToString>(
    pairs: impl IntoIterator<Item = (K, V)>,
) -> UriParams {
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.to_string()))
        .collect()
}

/// A page that was not written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPage {
    pub uri: String,
    pub reason: String,
}

/// What a generation run produced
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<SkippedPage>,
}

pub struct StaticSiteGenerator<'a> {
    router: &'a Router,
    output_root: PathBuf,
}

impl<'a> StaticSiteGenerator<'a> {
    pub fn new(router: &'a Router, output_root: impl Into<PathBuf>) -> Self {
        Self {
            router,
            output_root: output_root.into(),
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Generate every page.
    ///
    /// A page bound to a handler without a route declaration aborts the run,
    /// as does a failure to write a file. Pages that fail to dispatch or do
    /// not render are skipped.
    pub async fn generate(&self, pages: &[StaticPage]) -> CliResult<GenerationReport> {
        let mut report = GenerationReport::default();

        for page in pages {
            for params in page.parameter_sets() {
                let uri = self.router.to_uri(page.handler, params)?;
                match self.render(&uri).await {
                    Ok((file, body)) => {
                        self.write(&file, &body).await?;
                        debug!(uri = %uri, file = %file.display(), "Page written");
                        report.written.push(file);
                    }
                    Err(reason) => {
                        warn!(uri = %uri, reason = %reason, "Page skipped");
                        report.skipped.push(SkippedPage { uri, reason });
                    }
                }
            }
        }

        info!(
            written = report.written.len(),
            skipped = report.skipped.len(),
            "Static generation finished"
        );
        Ok(report)
    }

    /// Dispatch `uri` and return the output file with the rendered body, or
    /// the reason the page is skipped.
    async fn render(&self, uri: &str) -> Result<(PathBuf, String), String> {
        let target = request_target(uri);
        let path = target.split_once('?').map_or(target, |(path, _)| path);
        let file = output_file(&self.output_root, path)?;

        let response = self
            .router
            .dispatch(HttpRequest::new("GET", target))
            .await
            .map_err(|e| e.to_string())?;

        if !response.is_ok() {
            return Err(format!("status {}", response.status));
        }

        match response.body_text() {
            Some(Ok(body)) => Ok((file, body)),
            Some(Err(e)) => Err(format!("rendering failed: {}", e)),
            None => Err("body is not textual".to_string()),
        }
    }

    async fn write(&self, file: &Path, body: &str) -> CliResult<()> {
        if let Some(parent) = file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(file, body).await?;
        Ok(())
    }
}

/// Path and query of a built URI, with any scheme and authority removed.
///
/// Parameter values are inserted into URIs as-is, so the URI is not parsed
/// strictly: a slug such as `a b` or `café` must still reach the router.
fn request_target(uri: &str) -> &str {
    let target = match uri.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |slash| &rest[slash..]),
        None => uri,
    };
    if target.is_empty() { "/" } else { target }
}

/// `/` maps to `index.html`; any other path to `<path>.html`
fn output_file(root: &Path, path: &str) -> Result<PathBuf, String> {
    let relative = path.trim_matches('/');
    if relative.is_empty() {
        return Ok(root.join("index.html"));
    }

    let relative = PathBuf::from(format!("{}.html", relative));
    if relative
        .components()
        .any(|component| !matches!(component, Component::Normal(_)))
    {
        return Err(format!("path `{}` escapes the output directory", path));
    }
    Ok(root.join(relative))
}
