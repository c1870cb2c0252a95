use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::tempdir;

use media_archiver_core::error::Error;
use media_archiver_core::metadata::CaptureTimestampReader;
use media_archiver_core::report::ReportPaths;
use media_archiver_core::{
    AlwaysApprove, AlwaysDecline, AppConfig, ArchiveEngine, ArchiveSettings, DateSource,
    ExecutionMode, OutcomeStatus, PlannedAction, SilentReporter,
};

fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn now() -> NaiveDateTime {
    at(2026, 3, 15)
}

fn system_time(ts: NaiveDateTime) -> SystemTime {
    Local.from_local_datetime(&ts).earliest().unwrap().into()
}

fn write_media(
    dir: &Path,
    name: impl AsRef<Path>,
    contents: &str,
    modified: NaiveDateTime,
) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    let file = fs::File::options().write(true).open(&path).unwrap();
    file.set_modified(system_time(modified)).unwrap();
    path
}

/// Relative path -> contents, for every file under `root`.
fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    let mut out = BTreeMap::new();
    if !root.exists() {
        return out;
    }
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap().flatten() {
            let path = entry.path();
            if path.is_dir() {
                out.insert(path.strip_prefix(root).unwrap().to_path_buf(), Vec::new());
                stack.push(path);
            } else {
                out.insert(
                    path.strip_prefix(root).unwrap().to_path_buf(),
                    fs::read(&path).unwrap(),
                );
            }
        }
    }
    out
}

fn settings(source: &Path, archive: &Path, move_files: bool) -> ArchiveSettings {
    let config = AppConfig {
        source_dir: Some(source.to_string_lossy().into_owned()),
        archive_root: Some(archive.to_string_lossy().into_owned()),
        keep_months: 6,
        move_files,
        use_metadata: false,
        ..AppConfig::default()
    };
    ArchiveSettings::from_config(&config).unwrap()
}

/// Hot folder with two old files (2024-01, 2023-05), one recent file, and a
/// text file outside the allow-list.
fn create_hot_folder(source: &Path) {
    write_media(source, "IMG_001.jpg", "old jan", at(2024, 1, 5));
    write_media(source, "VID_002.MP4", "old may", at(2023, 5, 20));
    write_media(source, "IMG_003.jpg", "recent", at(2026, 2, 1));
    write_media(source, "notes.txt", "ignored", at(2020, 1, 1));
}

#[test]
fn test_dry_run_changes_nothing() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("hot");
    let archive = tmp.path().join("cold");
    create_hot_folder(&source);
    // Pre-existing archive content must be left alone as well.
    write_media(&archive.join("2024").join("2024-01"), "IMG_001.jpg", "already", at(2024, 1, 1));

    let before = (snapshot(&source), snapshot(&archive));

    let engine = ArchiveEngine::new(settings(&source, &archive, true));
    let result = engine
        .run(now(), ExecutionMode::DryRun, &AlwaysApprove, &SilentReporter)
        .unwrap();

    let after = (snapshot(&source), snapshot(&archive));
    assert_eq!(before, after);

    assert_eq!(result.outcomes.len(), 3);
    for outcome in &result.outcomes {
        assert!(matches!(
            outcome.status,
            OutcomeStatus::Kept | OutcomeStatus::WouldMove
        ));
    }

    let img = result
        .outcomes
        .iter()
        .find(|o| o.plan.name == "IMG_001.jpg")
        .unwrap();
    assert_eq!(img.status, OutcomeStatus::WouldMove);
    assert_eq!(
        img.target_path.as_deref(),
        Some(archive.join("2024").join("2024-01").join("IMG_001 (1).jpg").as_path())
    );

    // The 2023 bucket does not exist and must not be created by a preview.
    assert!(!archive.join("2023").exists());
}

#[test]
fn test_apply_copy_archives_old_files_and_keeps_sources() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("hot");
    let archive = tmp.path().join("cold");
    create_hot_folder(&source);

    let engine = ArchiveEngine::new(settings(&source, &archive, false));
    let result = engine
        .run(now(), ExecutionMode::Apply, &AlwaysApprove, &SilentReporter)
        .unwrap();

    let statuses: Vec<(String, OutcomeStatus)> = result
        .outcomes
        .iter()
        .map(|o| (o.plan.name.clone(), o.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("IMG_001.jpg".to_string(), OutcomeStatus::Copied),
            ("IMG_003.jpg".to_string(), OutcomeStatus::Kept),
            ("VID_002.MP4".to_string(), OutcomeStatus::Copied),
        ]
    );

    let copied = archive.join("2024").join("2024-01").join("IMG_001.jpg");
    assert_eq!(fs::read_to_string(&copied).unwrap(), "old jan");
    assert_eq!(
        fs::read_to_string(archive.join("2023").join("2023-05").join("VID_002.MP4")).unwrap(),
        "old may"
    );
    assert!(source.join("IMG_001.jpg").exists());
    assert!(source.join("VID_002.MP4").exists());

    let kept = &result.outcomes[1];
    assert!(kept.target_path.is_none());
    assert_eq!(kept.plan.planned_action, PlannedAction::Keep);

    assert_eq!(result.summary.totals.archived, 2);
    assert_eq!(result.summary.totals.kept, 1);
    assert!(!result.summary.has_errors());
}

#[test]
fn test_move_twice_is_idempotent() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("hot");
    let archive = tmp.path().join("cold");
    create_hot_folder(&source);

    let engine = ArchiveEngine::new(settings(&source, &archive, true));
    let first = engine
        .run(now(), ExecutionMode::Apply, &AlwaysApprove, &SilentReporter)
        .unwrap();
    let moved = first
        .outcomes
        .iter()
        .filter(|o| o.status == OutcomeStatus::Moved)
        .count();
    assert_eq!(moved, 2);
    let archive_after_first = snapshot(&archive);

    let second = engine
        .run(now(), ExecutionMode::Apply, &AlwaysApprove, &SilentReporter)
        .unwrap();
    assert_eq!(second.plan.len(), 1);
    assert_eq!(second.plan[0].name, "IMG_003.jpg");
    assert_eq!(second.outcomes[0].status, OutcomeStatus::Kept);
    assert_eq!(snapshot(&archive), archive_after_first);
}

#[test]
fn test_collision_with_existing_archive_file() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("hot");
    let archive = tmp.path().join("cold");
    let bucket = archive.join("2024").join("2024-01");
    write_media(&source, "IMG_001.jpg", "second", at(2024, 1, 5));
    write_media(&bucket, "IMG_001.jpg", "first", at(2024, 1, 5));
    write_media(&bucket, "IMG_001 (1).jpg", "first dup", at(2024, 1, 5));

    let engine = ArchiveEngine::new(settings(&source, &archive, false));
    let result = engine
        .run(now(), ExecutionMode::Apply, &AlwaysApprove, &SilentReporter)
        .unwrap();

    assert_eq!(result.outcomes[0].status, OutcomeStatus::Copied);
    let target = bucket.join("IMG_001 (2).jpg");
    assert_eq!(result.outcomes[0].target_path.as_deref(), Some(target.as_path()));
    assert_eq!(fs::read_to_string(&target).unwrap(), "second");
    assert_eq!(fs::read_to_string(bucket.join("IMG_001.jpg")).unwrap(), "first");
}

#[test]
fn test_same_name_files_in_one_run_get_distinct_targets() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("hot");
    let archive = tmp.path().join("cold");
    write_media(&source.join("a"), "IMG.jpg", "from a", at(2024, 1, 5));
    write_media(&source.join("b"), "IMG.jpg", "from b", at(2024, 1, 9));

    let mut s = settings(&source, &archive, false);
    s.recursive = true;
    let bucket = archive.join("2024").join("2024-01");

    for mode in [ExecutionMode::DryRun, ExecutionMode::Apply] {
        let result = ArchiveEngine::new(s.clone())
            .run(now(), mode, &AlwaysApprove, &SilentReporter)
            .unwrap();
        let targets: Vec<PathBuf> = result
            .outcomes
            .iter()
            .map(|o| o.target_path.clone().unwrap())
            .collect();
        assert_eq!(targets, vec![bucket.join("IMG.jpg"), bucket.join("IMG (1).jpg")]);
    }

    assert_eq!(fs::read_to_string(bucket.join("IMG.jpg")).unwrap(), "from a");
    assert_eq!(fs::read_to_string(bucket.join("IMG (1).jpg")).unwrap(), "from b");
}

#[test]
fn test_files_outside_allow_list_are_not_planned() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("hot");
    let archive = tmp.path().join("cold");
    create_hot_folder(&source);

    let engine = ArchiveEngine::new(settings(&source, &archive, false));
    let plan = engine.plan(now(), &SilentReporter).unwrap();
    assert_eq!(plan.rows.len(), 3);
    assert!(plan.rows.iter().all(|r| r.name != "notes.txt"));
}

#[test]
fn test_directory_failure_is_isolated_to_its_files() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("hot");
    let archive = tmp.path().join("cold");
    create_hot_folder(&source);
    // A regular file where the 2023 year folder should go.
    fs::create_dir_all(&archive).unwrap();
    fs::write(archive.join("2023"), "in the way").unwrap();

    let engine = ArchiveEngine::new(settings(&source, &archive, true));
    let result = engine
        .run(now(), ExecutionMode::Apply, &AlwaysApprove, &SilentReporter)
        .unwrap();

    let video = result
        .outcomes
        .iter()
        .find(|o| o.plan.name == "VID_002.MP4")
        .unwrap();
    assert_eq!(video.status, OutcomeStatus::Error);
    assert!(video.target_path.is_none());
    assert!(!video.note.as_deref().unwrap_or("").is_empty());
    assert!(source.join("VID_002.MP4").exists());

    let image = result
        .outcomes
        .iter()
        .find(|o| o.plan.name == "IMG_001.jpg")
        .unwrap();
    assert_eq!(image.status, OutcomeStatus::Moved);
    assert!(archive.join("2024").join("2024-01").join("IMG_001.jpg").exists());

    assert_eq!(result.summary.totals.errors, 1);
    assert!(result.summary.has_errors());
}

#[test]
fn test_transfer_failure_keeps_target_and_note() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("hot");
    let archive = tmp.path().join("cold");
    create_hot_folder(&source);

    let engine = ArchiveEngine::new(settings(&source, &archive, false));
    let plan = engine.plan(now(), &SilentReporter).unwrap();
    // Source disappears between planning and execution.
    fs::remove_file(source.join("IMG_001.jpg")).unwrap();

    let outcomes = media_archiver_core::Executor::new(&AlwaysApprove, &SilentReporter)
        .execute(&plan.rows, ExecutionMode::Apply);

    assert_eq!(outcomes.len(), plan.rows.len());
    let failed = &outcomes[0];
    assert_eq!(failed.plan.name, "IMG_001.jpg");
    assert_eq!(failed.status, OutcomeStatus::Error);
    assert!(failed.target_path.is_some());
    assert!(failed.note.is_some());
    assert!(!failed.target_path.as_ref().unwrap().exists());

    assert_eq!(outcomes[1].status, OutcomeStatus::Kept);
    assert_eq!(outcomes[2].status, OutcomeStatus::Copied);
}

#[test]
fn test_declined_confirmation_skips_without_touching_files() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("hot");
    let archive = tmp.path().join("cold");
    create_hot_folder(&source);
    let before = snapshot(&source);

    let engine = ArchiveEngine::new(settings(&source, &archive, true));
    let result = engine
        .run(now(), ExecutionMode::Apply, &AlwaysDecline, &SilentReporter)
        .unwrap();

    assert_eq!(snapshot(&source), before);
    let skipped: Vec<&str> = result
        .outcomes
        .iter()
        .filter(|o| o.status == OutcomeStatus::SkippedByConfirmation)
        .map(|o| o.plan.name.as_str())
        .collect();
    assert_eq!(skipped, vec!["IMG_001.jpg", "VID_002.MP4"]);
    assert_eq!(result.summary.totals.skipped, 2);
    assert!(!result.summary.has_errors());
}

#[test]
fn test_missing_source_fails_before_planning() {
    let tmp = tempdir().unwrap();
    let engine = ArchiveEngine::new(settings(
        &tmp.path().join("missing"),
        &tmp.path().join("cold"),
        false,
    ));
    let err = engine.plan(now(), &SilentReporter).unwrap_err();
    assert!(matches!(err, Error::SourceDirectory { .. }));
}

struct ShotIn2019;

impl CaptureTimestampReader for ShotIn2019 {
    fn read_capture_timestamp(&self, path: &Path) -> Result<Option<NaiveDateTime>, Error> {
        if path.extension().map(|e| e == "jpg").unwrap_or(false) {
            Ok(Some(at(2019, 12, 24)))
        } else {
            Err(Error::Metadata("unsupported container".to_string()))
        }
    }
}

#[test]
fn test_metadata_dates_drive_buckets() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("hot");
    let archive = tmp.path().join("cold");
    create_hot_folder(&source);

    let engine =
        ArchiveEngine::new(settings(&source, &archive, false)).with_reader(Box::new(ShotIn2019));
    let plan = engine.plan(now(), &SilentReporter).unwrap();

    let recent = plan.rows.iter().find(|r| r.name == "IMG_003.jpg").unwrap();
    assert_eq!(recent.resolved.source, DateSource::Metadata);
    assert_eq!(recent.year_month, "2019-12");
    assert_eq!(recent.planned_action, PlannedAction::CopyToArchive);

    let video = plan.rows.iter().find(|r| r.name == "VID_002.MP4").unwrap();
    assert_eq!(video.resolved.source, DateSource::FilesystemFallback);
    assert_eq!(video.year_month, "2023-05");
}

#[test]
fn test_reports_are_written_with_one_row_per_file() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("hot");
    let archive = tmp.path().join("cold");
    create_hot_folder(&source);

    let engine = ArchiveEngine::new(settings(&source, &archive, false));
    let result = engine
        .run(now(), ExecutionMode::DryRun, &AlwaysApprove, &SilentReporter)
        .unwrap();

    let paths = ReportPaths::for_run(&tmp.path().join("logs"), now());
    paths.write_plan(&result.plan).unwrap();
    paths.write_outcomes(&result.outcomes).unwrap();

    let plan_csv = fs::read_to_string(&paths.plan).unwrap();
    let outcome_csv = fs::read_to_string(&paths.outcome).unwrap();
    assert_eq!(plan_csv.lines().count(), 1 + result.plan.len());
    assert_eq!(outcome_csv.lines().count(), 1 + result.outcomes.len());
    assert!(outcome_csv.contains("WouldCopy"));
}

#[test]
fn test_exhausted_collisions_fail_only_that_file() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("hot");
    let archive = tmp.path().join("cold");
    create_hot_folder(&source);
    let bucket = archive.join("2024").join("2024-01");
    for name in ["IMG_001.jpg", "IMG_001 (1).jpg", "IMG_001 (2).jpg", "IMG_001 (3).jpg"] {
        write_media(&bucket, name, "occupied", at(2024, 1, 1));
    }

    let engine = ArchiveEngine::new(settings(&source, &archive, true));
    let plan = engine.plan(now(), &SilentReporter).unwrap();
    let outcomes = media_archiver_core::Executor::new(&AlwaysApprove, &SilentReporter)
        .with_collision_limit(3)
        .execute(&plan.rows, ExecutionMode::Apply);

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].plan.name, "IMG_001.jpg");
    assert_eq!(outcomes[0].status, OutcomeStatus::Error);
    assert!(outcomes[0].target_path.is_none());
    assert!(outcomes[0].note.as_deref().unwrap().contains("IMG_001.jpg"));
    assert!(source.join("IMG_001.jpg").exists());

    assert_eq!(outcomes[1].status, OutcomeStatus::Kept);
    assert_eq!(outcomes[2].plan.name, "VID_002.MP4");
    assert_eq!(outcomes[2].status, OutcomeStatus::Moved);
    assert!(archive.join("2023").join("2023-05").join("VID_002.MP4").exists());
}

#[cfg(unix)]
#[test]
fn test_non_utf8_names_are_archived_unchanged() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let tmp = tempdir().unwrap();
    let source = tmp.path().join("hot");
    let archive = tmp.path().join("cold");
    let grave = OsStr::from_bytes(b"caf\xE8.jpg");
    let acute = OsStr::from_bytes(b"caf\xE9.jpg");
    write_media(&source, grave, "grave", at(2023, 10, 2));
    write_media(&source, acute, "acute", at(2023, 10, 3));

    let engine = ArchiveEngine::new(settings(&source, &archive, true));
    let result = engine
        .run(now(), ExecutionMode::Apply, &AlwaysApprove, &SilentReporter)
        .unwrap();

    assert!(result.outcomes.iter().all(|o| o.status == OutcomeStatus::Moved));
    let bucket = archive.join("2023").join("2023-10");
    let mut targets: Vec<&OsStr> = result
        .outcomes
        .iter()
        .map(|o| o.target_path.as_deref().unwrap().file_name().unwrap())
        .collect();
    targets.sort();
    assert_eq!(targets, vec![grave, acute]);
    assert_eq!(fs::read_to_string(bucket.join(grave)).unwrap(), "grave");
    assert_eq!(fs::read_to_string(bucket.join(acute)).unwrap(), "acute");
}
