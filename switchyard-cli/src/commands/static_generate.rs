//! Static generation command

use crate::error::CliResult;
use crate::static_site::{GenerationReport, StaticPage, StaticSiteGenerator};
use colored::Colorize;
use std::path::Path;
use switchyard_core::Router;

/// Generate every page into `output` and print a summary
pub async fn execute(
    router: &Router,
    pages: &[StaticPage],
    output: &Path,
) -> CliResult<GenerationReport> {
    println!(
        "  {} Generating static pages into {}",
        "→".green(),
        output.display().to_string().bold()
    );

    let report = StaticSiteGenerator::new(router, output)
        .generate(pages)
        .await?;

    for file in &report.written {
        println!("  {} {}", "✓".green(), file.display());
    }
    for skipped in &report.skipped {
        println!(
            "  {} {} ({})",
            "⚠".yellow(),
            skipped.uri,
            skipped.reason.dimmed()
        );
    }

    println!();
    println!(
        "  {} {} written, {} skipped",
        "Done:".bright_white().bold(),
        report.written.len(),
        report.skipped.len()
    );

    Ok(report)
}
