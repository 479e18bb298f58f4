//! End-to-end dependency resolution: manifest, checkout, configuration update.

use crate::config::ResolverConfig;
use crate::configure;
use crate::deps::{self, CheckoutExecutor, CheckoutReport, DependencyRecord, FilterOptions, ToolRunner, Vcs};
use crate::ui::Table;
use anyhow::{Context, Result};
use colored::*;

#[derive(Debug, Clone, Default)]
pub struct BootstrapOptions {
    pub filter: FilterOptions,
    /// Rewrite the configuration file after checkout.
    pub configure: bool,
}

/// What a run resolved. `records` includes dependencies skipped because their
/// target already existed; they still take part in the configuration update.
#[derive(Debug)]
pub struct Resolution {
    pub records: Vec<DependencyRecord>,
    pub report: CheckoutReport,
}

/// Load and filter the manifest, then check out every remaining dependency.
pub fn resolve(
    config: &ResolverConfig,
    filter: &FilterOptions,
    vcs: &dyn Vcs,
    tools: &dyn ToolRunner,
) -> Result<Resolution> {
    let manifest = config.manifest_path();
    let records = deps::load(&manifest, filter)?;

    let report = CheckoutExecutor::new(&config.root, vcs, tools).checkout_all(&records);
    Ok(Resolution { records, report })
}

pub fn run(
    config: &ResolverConfig,
    options: &BootstrapOptions,
    vcs: &dyn Vcs,
    tools: &dyn ToolRunner,
) -> Result<Resolution> {
    let resolution = resolve(config, &options.filter, vcs, tools)?;

    if options.configure && !resolution.records.is_empty() {
        let path = config.config_file_path();
        configure::update_configuration(&path, &config.root, &resolution.records)
            .with_context(|| format!("Could not update configuration {}", path.display()))?;
    }

    print_summary(&resolution.report);
    Ok(resolution)
}

fn print_summary(report: &CheckoutReport) {
    if report.outcomes.is_empty() {
        println!("{} No dependencies to check out.", "!".yellow());
        return;
    }

    let mut table = Table::new(&["Dependency", "Target", "Outcome"]);
    for outcome in &report.outcomes {
        let label = match outcome.status.label() {
            "failed" => "failed".red().to_string(),
            "cloned" => "cloned".green().to_string(),
            other => other.to_string(),
        };
        table.add_row(vec![
            outcome.name.clone(),
            outcome.target_dir.display().to_string(),
            label,
        ]);
    }
    table.print();

    for (name, err) in report.failures() {
        println!("ERROR: {}: {}", name, err);
    }
}
