mod commands;
mod logging;
mod progress;
mod prompt;

use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands, RunArgs, SourceArgs};
use dotenv::dotenv;
use media_archiver_core::config::load_configuration;
use media_archiver_core::report::ReportPaths;
use media_archiver_core::summary::BucketSummary;
use media_archiver_core::{
    AlwaysApprove, AppConfig, ArchiveEngine, ArchiveSettings, ConfirmationGate, ExecutionMode,
    OutcomeStatus, PlanRow, PlannedAction, ProgressReporter, SilentReporter, Summary,
};
use progress::CliReporter;
use prompt::InteractiveGate;
use tracing::{error, info};

fn main() {
    dotenv().ok();

    let guard = logging::init_logger();

    let args = Cli::parse();

    let result = match args.command {
        Some(Commands::Run(run_args)) => run_archive(run_args),
        Some(Commands::Plan(source_args)) => run_plan(source_args),
        Some(Commands::PrintConfig(source_args)) => print_config(source_args),
        None => {
            let _ = Cli::command().print_long_help();
            Ok(true)
        }
    };

    let code = match result {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(err) => {
            error!("Error: {:#}", err);
            1
        }
    };

    // Flush the file log before exiting.
    drop(guard);
    process::exit(code);
}

/// Configuration file and environment, with command-line values on top.
fn effective_config(args: &SourceArgs) -> Result<AppConfig> {
    let mut config = load_configuration().context("Error loading configuration")?;

    if let Some(source) = &args.source {
        config.source_dir = Some(source.clone());
    }
    if let Some(archive) = &args.archive {
        config.archive_root = Some(archive.clone());
    }
    if let Some(keep_months) = args.keep_months {
        config.keep_months = keep_months;
    }
    if !args.extensions.is_empty() {
        config.extensions = args.extensions.clone();
    }
    config.move_files |= args.move_files;
    config.recursive |= args.recursive;
    if args.no_metadata {
        config.use_metadata = false;
    }

    Ok(config)
}

fn build_engine(args: &SourceArgs) -> Result<(AppConfig, ArchiveEngine)> {
    let config = effective_config(args)?;
    let settings = ArchiveSettings::from_config(&config)?;
    Ok((config, ArchiveEngine::new(settings)))
}

/// Returns whether every file ended without an error.
fn run_archive(args: RunArgs) -> Result<bool> {
    let (config, engine) = build_engine(&args.common)?;
    let started = Local::now().naive_local();

    let mode = if args.apply {
        ExecutionMode::Apply
    } else {
        ExecutionMode::DryRun
    };
    if mode == ExecutionMode::DryRun {
        info!("{}", "Dry run: no files will be copied or moved (use --apply)".yellow());
    }

    // Prompts and progress bars fight over the terminal, so interactive runs
    // go without bars.
    let cli_reporter = CliReporter::new();
    let interactive = mode == ExecutionMode::Apply && !args.yes;
    let interactive_gate = InteractiveGate::new();
    let gate: &dyn ConfirmationGate = if interactive {
        &interactive_gate
    } else {
        &AlwaysApprove
    };
    let reporter: &dyn ProgressReporter = if interactive {
        &SilentReporter
    } else {
        &cli_reporter
    };

    let result = engine.run(started, mode, gate, reporter)?;

    if !args.common.no_report {
        let reports = ReportPaths::for_run(Path::new(&config.reports_dir), started);
        reports.write_plan(&result.plan)?;
        reports.write_outcomes(&result.outcomes)?;
    }

    for outcome in &result.outcomes {
        if outcome.status == OutcomeStatus::Error {
            error!(
                "{}: {}",
                outcome.plan.source_path.display(),
                outcome.note.as_deref().unwrap_or("unknown error")
            );
        }
    }

    info!("Cutoff: {} (keep {} months)", result.cutoff.boundary, result.cutoff.keep_months);
    print_summary(&result.summary);

    Ok(!result.summary.has_errors())
}

fn run_plan(args: SourceArgs) -> Result<bool> {
    let (config, engine) = build_engine(&args)?;
    let started = Local::now().naive_local();

    let plan = engine.plan(started, &CliReporter::new())?;

    println!();
    for row in &plan.rows {
        print_plan_row(row);
    }
    info!(
        "{} files, {} to archive, cutoff {}",
        plan.rows.len(),
        plan.rows.iter().filter(|r| r.archivable).count(),
        plan.cutoff.boundary
    );

    if !args.no_report {
        ReportPaths::for_run(Path::new(&config.reports_dir), started).write_plan(&plan.rows)?;
    }

    Ok(true)
}

fn print_config(args: SourceArgs) -> Result<bool> {
    let config = effective_config(&args)?;
    let rendered = toml::to_string_pretty(&config).context("Error rendering configuration")?;
    println!("{}", rendered);
    Ok(true)
}

fn print_plan_row(row: &PlanRow) {
    let action = match row.planned_action {
        PlannedAction::Keep => format!("{:<14}", row.planned_action).green(),
        _ => format!("{:<14}", row.planned_action).yellow(),
    };
    println!(
        "{} {} {} ({}) {}",
        action,
        row.year_month.cyan(),
        row.name,
        row.resolved.source,
        if row.archivable {
            row.target_dir.display().to_string()
        } else {
            String::new()
        }
    );
}

fn print_summary(summary: &Summary) {
    println!();
    println!(
        "{:<9} {:>6} {:>12} {:>6} {:>9} {:>10} {:>8} {:>7}",
        "Month", "Files", "Bytes", "Kept", "Archived", "Previewed", "Skipped", "Errors"
    );
    for (bucket, counts) in &summary.buckets {
        print_bucket(bucket, counts);
    }
    print_bucket("Total", &summary.totals);
}

fn print_bucket(label: &str, counts: &BucketSummary) {
    let errors = if counts.errors > 0 {
        format!("{:>7}", counts.errors).red()
    } else {
        format!("{:>7}", counts.errors).normal()
    };
    println!(
        "{:<9} {:>6} {:>12} {:>6} {} {:>10} {:>8} {}",
        label,
        counts.files,
        counts.bytes,
        counts.kept,
        format!("{:>9}", counts.archived).green(),
        counts.previewed,
        counts.skipped,
        errors
    );
}
