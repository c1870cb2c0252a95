use crate::error::Error;
use crate::model::{normalize_extension, TransferMode};
use config::{Config, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

pub const MIN_KEEP_MONTHS: u32 = 1;
pub const MAX_KEEP_MONTHS: u32 = 24;

pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "heic", "heif", "gif", "webp", "mp4", "mov", "m4v", "avi", "3gp",
];

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub source_dir: Option<String>,
    #[serde(default)]
    pub archive_root: Option<String>,
    #[serde(default = "default_keep_months")]
    pub keep_months: u32,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    #[serde(default)]
    pub recursive: bool,
    #[serde(default = "default_true")]
    pub use_metadata: bool,
    #[serde(default)]
    pub move_files: bool,
    #[serde(default = "default_reports_dir")]
    pub reports_dir: String,
}

fn default_keep_months() -> u32 {
    6
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

fn default_true() -> bool {
    true
}

fn default_reports_dir() -> String {
    "./logs".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_dir: None,
            archive_root: None,
            keep_months: default_keep_months(),
            extensions: default_extensions(),
            ignore_patterns: Vec::new(),
            recursive: false,
            use_metadata: true,
            move_files: false,
            reports_dir: default_reports_dir(),
        }
    }
}

/// Load `Config.toml` from the working directory (if present), overlaid with
/// `MEDIA_ARCHIVER_*` environment variables. List fields take comma-separated
/// values, e.g. `MEDIA_ARCHIVER_EXTENSIONS=jpg,heic`.
pub fn load_configuration() -> Result<AppConfig, Error> {
    build_configuration(environment())
}

fn environment() -> Environment {
    Environment::with_prefix("MEDIA_ARCHIVER")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("extensions")
        .with_list_parse_key("ignore_patterns")
}

fn build_configuration(environment: Environment) -> Result<AppConfig, Error> {
    let config = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(environment)
        .build()?;
    Ok(config.try_deserialize::<AppConfig>()?)
}

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct ArchiveSettings {
    pub source_dir: PathBuf,
    pub archive_root: PathBuf,
    pub keep_months: u32,
    pub extensions: HashSet<String>,
    pub ignore_patterns: Vec<String>,
    pub recursive: bool,
    pub use_metadata: bool,
    pub transfer: TransferMode,
}

impl ArchiveSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let source_dir = required_path(&config.source_dir, "source_dir")?;
        let archive_root = required_path(&config.archive_root, "archive_root")?;

        if source_dir == archive_root {
            return Err(Error::InvalidConfig(
                "source_dir and archive_root must differ".to_string(),
            ));
        }

        if !(MIN_KEEP_MONTHS..=MAX_KEEP_MONTHS).contains(&config.keep_months) {
            return Err(Error::InvalidConfig(format!(
                "keep_months must be between {} and {}, got {}",
                MIN_KEEP_MONTHS, MAX_KEEP_MONTHS, config.keep_months
            )));
        }

        let extensions: HashSet<String> = config
            .extensions
            .iter()
            .map(|e| normalize_extension(e))
            .filter(|e| !e.is_empty())
            .collect();
        if extensions.is_empty() {
            return Err(Error::InvalidConfig(
                "extensions allow-list is empty".to_string(),
            ));
        }

        Ok(Self {
            source_dir,
            archive_root,
            keep_months: config.keep_months,
            extensions,
            ignore_patterns: config.ignore_patterns.clone(),
            recursive: config.recursive,
            use_metadata: config.use_metadata,
            transfer: if config.move_files {
                TransferMode::Move
            } else {
                TransferMode::Copy
            },
        })
    }
}

fn required_path(value: &Option<String>, key: &str) -> Result<PathBuf, Error> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(PathBuf::from(v)),
        _ => Err(Error::InvalidConfig(format!("{} is not set", key))),
    }
}
