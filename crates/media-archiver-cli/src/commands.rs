use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "media-archiver")]
#[command(about = "Move old photos and videos from a hot folder into a dated archive", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Plan and execute an archive run (dry-run unless --apply is given)
    Run(RunArgs),
    /// Build and print the plan without executing it
    Plan(SourceArgs),
    /// Print the effective configuration
    PrintConfig(SourceArgs),
}

/// Overrides for values normally read from Config.toml / MEDIA_ARCHIVER_* variables.
#[derive(Debug, Args, Default)]
pub struct SourceArgs {
    /// Hot folder to archive from
    #[arg(long)]
    pub source: Option<String>,
    /// Root of the YYYY/YYYY-MM archive tree
    #[arg(long)]
    pub archive: Option<String>,
    /// Months to keep in the hot folder, including the current one (1-24)
    #[arg(long)]
    pub keep_months: Option<u32>,
    /// Allowed extension; repeat to allow several. Replaces the configured list.
    #[arg(long = "ext")]
    pub extensions: Vec<String>,
    /// Move files instead of copying them
    #[arg(long = "move")]
    pub move_files: bool,
    /// Include subdirectories of the source folder
    #[arg(long)]
    pub recursive: bool,
    /// Date files by modification time only, ignoring embedded capture dates
    #[arg(long)]
    pub no_metadata: bool,
    /// Do not write plan/outcome CSV reports
    #[arg(long)]
    pub no_report: bool,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub common: SourceArgs,
    /// Actually copy or move files
    #[arg(long)]
    pub apply: bool,
    /// Approve every file without prompting (only with --apply)
    #[arg(long, short = 'y')]
    pub yes: bool,
}
