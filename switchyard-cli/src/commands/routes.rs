//! Route listing command
//!
//! Prints the route table of the application.

use crate::error::{CliError, CliResult};
use colored::Colorize;
use switchyard_core::{HttpMethod, Router};

/// One line of the route listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRow {
    pub method: String,
    pub template: String,
    pub handler: String,
    pub middleware: Vec<String>,
}

/// Rows for every route, optionally only those of one method
pub fn rows(router: &Router, method: Option<&str>) -> CliResult<Vec<RouteRow>> {
    let filter = match method {
        Some(name) => Some(HttpMethod::from_str(name).ok_or_else(|| {
            CliError::InvalidArgument(format!("unknown HTTP method `{}`", name))
        })?),
        None => None,
    };

    Ok(router
        .routes()
        .routes()
        .iter()
        .filter(|route| filter.is_none_or(|method| route.method() == method))
        .map(|route| RouteRow {
            method: route.method().to_string(),
            template: route.template().to_string(),
            handler: route.handler_ref().to_string(),
            middleware: route
                .middleware()
                .iter()
                .map(|m| short_name(m.name()).to_string())
                .collect(),
        })
        .collect())
}

/// List all routes command
pub fn execute(router: &Router, method: Option<&str>) -> CliResult<()> {
    let rows = rows(router, method)?;

    println!("{}", "Switchyard Routes".bright_cyan().bold());
    if let Some(m) = method {
        println!("   Filtered by method: {}", m.to_uppercase());
    }
    println!();

    if rows.is_empty() {
        println!("No routes found.");
        return Ok(());
    }

    let method_width = rows.iter().map(|r| r.method.len()).max().unwrap_or(6).max(6);
    let template_width = rows.iter().map(|r| r.template.len()).max().unwrap_or(4).max(4);

    println!(
        "{:mw$}  {:tw$}  HANDLER",
        "METHOD",
        "PATH",
        mw = method_width,
        tw = template_width
    );
    println!("{}", "-".repeat(method_width + template_width + 12));
    for row in &rows {
        println!(
            "{}  {:tw$}  {}",
            format!("{:mw$}", row.method, mw = method_width).green(),
            row.template,
            row.handler.dimmed(),
            tw = template_width
        );
        if !row.middleware.is_empty() {
            println!("  └─ Middleware: {}", row.middleware.join(", "));
        }
    }

    let global = router.middleware();
    println!();
    println!("Statistics:");
    println!("  Total routes: {}", rows.len());
    println!(
        "  Global middleware: {}",
        global
            .iter()
            .map(|m| short_name(m.name()))
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(())
}

fn short_name(type_name: &str) -> &str {
    type_name.rsplit("::").next().unwrap_or(type_name)
}
