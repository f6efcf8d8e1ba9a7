//! Switchyard CLI - tooling that drives an application's router.
//!
//! The CLI is a library: an application builds its [`Router`] and its list of
//! static pages, then hands both to [`run`] from its own `main`.
//!
//! # Commands
//!
//! - `static:generate` - Render static pages to HTML files
//! - `routes` - List the route table
//!
//! ```no_run
//! use clap::Parser;
//! use switchyard_cli::{Cli, StaticPage, run, uri_params};
//! use switchyard_core::{Container, HandlerRef, Html, Route, RouteConfig, Router};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let page = HandlerRef::new("Pages", "show");
//!     let config = RouteConfig::builder()
//!         .route(Route::get("/{id}", page).handler(|ctx| async move {
//!             Ok(Html::new(format!("<h1>{}</h1>", ctx.param("id").unwrap_or_default())))
//!         }))
//!         .build()?;
//!
//!     let pages = vec![StaticPage::new(page).with_data(|| {
//!         vec![uri_params([("id", 1)]), uri_params([("id", 2)])]
//!     })];
//!
//!     run(Cli::parse(), Router::new(config, Container::new()), &pages).await?;
//!     Ok(())
//! }
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use switchyard_core::Router;
use switchyard_core::logging::{LogConfig, LogFormat, LogLevel, LogOutput};

pub mod commands;
pub mod config;
pub mod error;
pub mod static_site;

pub use config::StaticConfig;
pub use error::{CliError, CliResult};
pub use static_site::{
    DataProvider, GenerationReport, SkippedPage, StaticPage, StaticSiteGenerator, UriParams,
    uri_params,
};

/// Switchyard CLI
#[derive(Debug, Parser)]
#[command(name = "switchyard")]
#[command(version)]
#[command(about = "Tooling for Switchyard applications")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render static pages to HTML files
    #[command(name = "static:generate")]
    StaticGenerate(StaticGenerateArgs),

    /// List all routes in the application
    #[command(alias = "r")]
    Routes(RoutesArgs),
}

#[derive(Debug, Args)]
pub struct StaticGenerateArgs {
    /// Output directory
    #[arg(short, long, env = "SWITCHYARD_STATIC_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Base URI prefixed to generated page URIs
    #[arg(long, env = "SWITCHYARD_BASE_URI")]
    pub base_uri: Option<String>,

    /// TOML file with a `[static]` table
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct RoutesArgs {
    /// Only list routes of this HTTP method
    #[arg(short, long)]
    pub method: Option<String>,
}

/// Run a parsed command against the application's router
pub async fn run(cli: Cli, router: Router, pages: &[StaticPage]) -> CliResult<()> {
    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    let _guard = LogConfig::new()
        .level(level)
        .format(LogFormat::Compact)
        .output(LogOutput::Stderr)
        .with_colors(true)
        .init()?;

    match cli.command {
        Commands::StaticGenerate(args) => {
            let settings = match &args.config {
                Some(path) => StaticConfig::from_file(path)?,
                None => StaticConfig::from_env(),
            };
            let output = args.output.unwrap_or(settings.output_dir);
            let router = match args.base_uri {
                Some(base_uri) => router.with_base_uri(base_uri),
                None => router,
            };

            commands::static_generate::execute(&router, pages, &output).await?;
        }
        Commands::Routes(args) => {
            commands::routes::execute(&router, args.method.as_deref())?;
        }
    }

    Ok(())
}
