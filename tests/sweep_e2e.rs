//! Enumerate-then-delete sweep against a real filesystem tree, with the
//! diagnostic log wired in.

use std::collections::HashSet;
use std::fs::{self, File};
use std::path::PathBuf;

use windows_maintenance_helper::core::config::{LoggingConfig, SweeperConfig};
use windows_maintenance_helper::logger;
use windows_maintenance_helper::prelude::*;

fn sweeper_config(roots: Vec<PathBuf>) -> SweeperConfig {
    SweeperConfig {
        temp_dirs: roots,
        max_depth: 16,
        parallelism: 2,
    }
}

fn build_tree(root: &std::path::Path) -> Vec<PathBuf> {
    fs::create_dir_all(root.join("cache/img")).unwrap();
    let files = vec![
        root.join("setup.log"),
        root.join("cache/data.tmp"),
        root.join("cache/img/thumb.tmp"),
    ];
    for file in &files {
        File::create(file).unwrap();
    }
    files
}

#[test]
fn walk_then_delete_clears_the_tree() {
    let dir = tempfile::tempdir().unwrap();
    let created = build_tree(dir.path());

    let walker = TempWalker::new(sweeper_config(vec![dir.path().to_path_buf()]));
    let found = walker.enumerate();
    let found_set: HashSet<&PathBuf> = found.iter().collect();
    assert_eq!(found_set.len(), created.len());
    for file in &created {
        assert!(found_set.contains(file), "walker missed {}", file.display());
    }

    // Deletion takes the enumeration output verbatim.
    let report = TempSweeper::new(None).delete(&found);
    assert_eq!(report.succeeded, created.len());
    assert!(report.failed.is_empty());
    for file in &created {
        assert!(!file.exists());
    }

    // Directories themselves are left alone; only enumerated files go.
    assert!(dir.path().join("cache/img").exists());
}

#[test]
fn vanished_file_fails_without_stopping_the_sweep() {
    let dir = tempfile::tempdir().unwrap();
    let created = build_tree(dir.path());

    let walker = TempWalker::new(sweeper_config(vec![dir.path().to_path_buf()]));
    let mut found = walker.enumerate();
    found.sort();

    // Simulate another process racing us between enumeration and deletion.
    fs::remove_file(&created[1]).unwrap();

    let report = TempSweeper::new(None).delete(&found);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, vec![created[1].clone()]);
    let failure = report
        .outcomes
        .iter()
        .find(|o| o.target == created[1])
        .unwrap();
    assert_eq!(failure.error, Some(FailureKind::NotFound));
}

#[test]
fn sweep_events_land_in_the_jsonl_log() {
    let dir = tempfile::tempdir().unwrap();
    build_tree(dir.path());
    let log_path = dir.path().join("diag.jsonl");
    let (handle, join) = logger::spawn(&LoggingConfig {
        jsonl_path: log_path.clone(),
    });

    let walker = TempWalker::new(sweeper_config(vec![dir.path().to_path_buf()]));
    let mut paths = walker.enumerate();
    paths.push(dir.path().join("never-existed.tmp"));

    let report = TempSweeper::new(Some(handle.clone())).delete(&paths);
    assert_eq!(report.failed.len(), 1);

    handle.shutdown();
    join.join().unwrap();

    let raw = fs::read_to_string(&log_path).unwrap();
    let lines: Vec<serde_json::Value> = raw
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    // One failure event plus the completion event.
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["event"], "temp_sweep");
    assert_eq!(lines[0]["severity"], "warning");
    assert_eq!(lines[0]["kind"], "not_found");
    assert_eq!(lines[1]["event"], "temp_sweep");
    assert_eq!(lines[1]["succeeded"], 3);
    assert_eq!(lines[1]["failed"], 1);
}

#[test]
fn enumeration_output_is_the_only_deletion_input() {
    let dir = tempfile::tempdir().unwrap();
    build_tree(dir.path());

    let walker = TempWalker::new(sweeper_config(vec![dir.path().to_path_buf()]));
    let found = walker.enumerate();

    // A file created after enumeration must survive the sweep untouched.
    let late = dir.path().join("late.tmp");
    File::create(&late).unwrap();

    let report = TempSweeper::new(None).delete(&found);
    assert_eq!(report.succeeded, found.len());
    assert!(late.exists());
}
