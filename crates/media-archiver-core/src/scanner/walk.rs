use crate::error::Error;
use crate::model::{normalize_extension, MediaFile};
use chrono::{DateTime, Local};
use glob::Pattern;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, warn};
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Lowercased extensions without the dot.
    pub extensions: HashSet<String>,
    pub ignore_patterns: Vec<String>,
    pub recursive: bool,
    /// Subtree never entered, so an archive nested in the source is not re-scanned.
    pub exclude_dir: Option<PathBuf>,
}

impl DiscoveryOptions {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| normalize_extension(e.as_ref()))
                .collect(),
            ..Self::default()
        }
    }
}

/// List the media files of `source_dir` in file-name order.
///
/// Only regular files whose extension is on the allow-list are returned.
/// Symlinks are not followed. Entries that cannot be read are logged and skipped.
pub fn discover(source_dir: &Path, options: &DiscoveryOptions) -> Result<Vec<MediaFile>, Error> {
    check_source_dir(source_dir)?;

    let ignore_patterns: Vec<Pattern> = options
        .ignore_patterns
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(p) => Some(p),
            Err(e) => {
                error!("Invalid glob pattern '{}': {}", glob, e);
                None
            }
        })
        .collect();

    let max_depth = if options.recursive { usize::MAX } else { 1 };
    let walker = WalkDir::new(source_dir)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_excluded(entry, options, &ignore_patterns));

    let mut files = Vec::new();
    for entry_result in walker {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Error reading entry under {}: {}", source_dir.display(), err);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let extension = path
            .extension()
            .map(|e| normalize_extension(&e.to_string_lossy()))
            .unwrap_or_default();
        if !options.extensions.contains(&extension) {
            continue;
        }

        match entry.metadata() {
            Ok(metadata) => match metadata.modified() {
                Ok(modified) => {
                    let modified = DateTime::<Local>::from(modified).naive_local();
                    files.push(MediaFile::new(path, modified, Some(metadata.len())));
                }
                Err(err) => warn!("No modification time for {}: {}", path.display(), err),
            },
            Err(err) => warn!("Error getting metadata for {}: {}", path.display(), err),
        }
    }

    Ok(files)
}

fn check_source_dir(source_dir: &Path) -> Result<(), Error> {
    match fs::metadata(source_dir) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(Error::SourceDirectory {
            path: source_dir.to_path_buf(),
            reason: "not a directory".to_string(),
        }),
        Err(err) => Err(Error::SourceDirectory {
            path: source_dir.to_path_buf(),
            reason: err.to_string(),
        }),
    }
}

fn is_excluded(entry: &DirEntry, options: &DiscoveryOptions, ignore_patterns: &[Pattern]) -> bool {
    let path = entry.path();
    if let Some(exclude) = &options.exclude_dir {
        if entry.file_type().is_dir() && path.starts_with(exclude) {
            return true;
        }
    }
    ignore_patterns
        .iter()
        .any(|pattern| pattern.matches_path(path))
}
