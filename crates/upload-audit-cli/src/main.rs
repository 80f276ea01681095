mod commands;
mod logging;
mod progress;

use std::process;

use anyhow::Context;
use clap::Parser;
use colored::*;
use commands::{Cli, Commands, VerifyArgs};
use dotenv::dotenv;
use progress::CliReporter;
use tracing::{error, info};
use upload_audit_core::{AppConfig, AuditEngine, AuditReport, SourceStatus};

fn main() {
    dotenv().ok();

    let guard = logging::init_logger();

    let args = Cli::parse();

    let config = match upload_audit_core::config::load_configuration(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            drop(guard);
            process::exit(1);
        }
    };

    let result = match args.command {
        Some(Commands::Verify(verify_args)) => run_verify(config, &verify_args),
        Some(Commands::Sources) => run_sources(config),
        Some(Commands::PrintConfig) => print_config(&config),
        None => run_verify(config, &VerifyArgs::default()),
    };

    if let Err(err) = result {
        error!("Error: {:#}", err);
        drop(guard);
        process::exit(1);
    }
}

fn run_verify(config: AppConfig, args: &VerifyArgs) -> anyhow::Result<()> {
    let mut engine = AuditEngine::new(config);
    if let Some(limit) = args.orphan_limit {
        engine = engine.with_orphan_preview_limit(limit);
    }

    let reporter = CliReporter::new();
    let report = engine.run(&reporter).context("Audit did not complete")?;

    println!("{}", report.to_json(!args.compact)?);

    if let Some(path) = &args.csv {
        let rows = report
            .write_csv(path)
            .with_context(|| format!("Error writing {}", path.display()))?;
        info!("Wrote {} findings to {}", rows, path.display());
    }

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &AuditReport) {
    let counts = &report.counts;
    eprintln!();
    eprintln!(
        "{} referenced, {} on disk, {} matched, {} excluded",
        format!("{}", counts.referenced_url_count).cyan(),
        format!("{}", counts.filesystem_file_count).cyan(),
        format!("{}", counts.matched_count).green(),
        format!("{}", counts.excluded_url_count).dimmed(),
    );

    let missing = format!("{} missing", counts.missing_count);
    let missing = if counts.missing_count > 0 {
        missing.red()
    } else {
        missing.green()
    };
    let orphans = format!("{} orphaned", counts.orphan_count);
    let orphans = if counts.orphan_count > 0 {
        orphans.yellow()
    } else {
        orphans.green()
    };
    eprintln!("{}, {}", missing, orphans);

    for outcome in report.failed_sources() {
        if let SourceStatus::Failed { error } = &outcome.status {
            eprintln!(
                "{} {}.{} was skipped: {}",
                "!".yellow(),
                outcome.table,
                outcome.column,
                error
            );
        }
    }
}

fn run_sources(config: AppConfig) -> anyhow::Result<()> {
    let engine = AuditEngine::new(config);
    let outcomes = engine
        .check_sources(&upload_audit_core::SilentReporter)
        .context("Could not query sources")?;

    for outcome in outcomes {
        let name = format!("{}.{}", outcome.table, outcome.column);
        match outcome.status {
            SourceStatus::Loaded {
                rows,
                urls,
                malformed_rows,
            } => {
                let malformed = if malformed_rows > 0 {
                    format!(", {} malformed", malformed_rows).red().to_string()
                } else {
                    String::new()
                };
                println!(
                    "{:<40} {:>6} rows {:>6} urls{}",
                    name.green(),
                    rows,
                    urls,
                    malformed
                );
            }
            SourceStatus::Failed { error } => {
                println!("{:<40} {}", name.yellow(), error.dimmed());
            }
        }
    }
    Ok(())
}

fn print_config(config: &AppConfig) -> anyhow::Result<()> {
    let rendered =
        toml::to_string_pretty(&config.redacted()).context("Error rendering configuration")?;
    println!("{}", rendered);
    Ok(())
}
