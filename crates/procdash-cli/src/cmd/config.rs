use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use procdash_core::config::{Config, WarnLevel};
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective configuration
    Show,

    /// Validate the config for common mistakes
    Validate,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::Validate => validate(root, json),
    }
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;

    if json {
        print_json(&config)?;
        return Ok(());
    }

    let sla = &config.sla;
    let calendar = sla.calendar();
    println!("Project: {}", config.project.name);
    println!("SLA target: {} workdays", sla.target_days);
    println!(
        "Holidays: {} ({} dates{})",
        calendar.name(),
        calendar.len(),
        if sla.builtin_holidays { ", built-in table" } else { "" }
    );
    for date in &sla.extra_holidays {
        println!("  + {date}");
    }
    for date in &sla.removed_holidays {
        println!("  - {date}");
    }
    match config.display.page_size {
        Some(n) => println!("Page size: {n}"),
        None => println!("Page size: unlimited"),
    }
    Ok(())
}

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let warnings = config.validate();

    if json {
        print_json(&serde_json::json!({ "warnings": warnings }))?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}
