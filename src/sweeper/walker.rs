//! Parallel temp-directory walker.
//!
//! Discovers candidate files under the configured temp roots. A root that
//! does not exist is skipped silently (the WOW-era temp locations are often
//! absent), an unreadable subdirectory is skipped, and symlinks are never
//! followed. The walk only enumerates; deletion is a separate step that
//! takes the returned paths as an explicit argument.

#![allow(missing_docs)]

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam_channel as channel;

use crate::core::config::SweeperConfig;

/// Item in the internal work queue: (directory, depth).
type WorkItem = (PathBuf, usize);

/// Walker over the configured temp roots.
///
/// Safety invariants:
/// - Symlinks are never followed
/// - Bounded by `max_depth` to prevent runaway traversal
/// - Missing or unreadable directories are skipped, never fatal
pub struct TempWalker {
    config: SweeperConfig,
}

impl TempWalker {
    #[must_use]
    pub fn new(config: SweeperConfig) -> Self {
        Self { config }
    }

    /// Collect every file under the configured roots.
    #[must_use]
    pub fn enumerate(&self) -> Vec<PathBuf> {
        self.stream().into_iter().collect()
    }

    /// Stream file paths as they are discovered.
    ///
    /// The walk runs on background worker threads; the receiver closes when
    /// every worker has drained the queue.
    #[must_use]
    pub fn stream(&self) -> channel::Receiver<PathBuf> {
        let parallelism = self.config.parallelism.max(1);

        // The work queue is unbounded so a worker can always enqueue the
        // subdirectories of the directory it is processing without blocking;
        // results are unbounded for throughput.
        let (work_tx, work_rx) = channel::unbounded::<WorkItem>();
        let (result_tx, result_rx) = channel::unbounded::<PathBuf>();

        // Track in-flight work items so workers know when to stop.
        let in_flight = Arc::new(AtomicUsize::new(0));

        for root in &self.config.temp_dirs {
            let meta = match fs::symlink_metadata(root) {
                Ok(meta) => meta,
                Err(err) if err.kind() == ErrorKind::NotFound => continue,
                Err(err) if err.kind() == ErrorKind::PermissionDenied => continue,
                Err(_) => continue,
            };
            if !meta.is_dir() {
                continue;
            }
            in_flight.fetch_add(1, Ordering::Release);
            let _ = work_tx.send((root.clone(), 0));
        }

        for _ in 0..parallelism {
            let work_rx = work_rx.clone();
            let work_tx = work_tx.clone();
            let result_tx = result_tx.clone();
            let in_flight = Arc::clone(&in_flight);
            let max_depth = self.config.max_depth;

            thread::spawn(move || {
                walker_thread(&work_rx, &work_tx, &result_tx, &in_flight, max_depth);
            });
        }

        result_rx
    }
}

/// Worker loop: pull directories from the queue, emit files, enqueue
/// subdirectories, stop once nothing is in flight.
fn walker_thread(
    work_rx: &channel::Receiver<WorkItem>,
    work_tx: &channel::Sender<WorkItem>,
    result_tx: &channel::Sender<PathBuf>,
    in_flight: &AtomicUsize,
    max_depth: usize,
) {
    loop {
        match work_rx.recv_timeout(Duration::from_millis(50)) {
            Ok((dir, depth)) => {
                process_directory(&dir, depth, max_depth, work_tx, result_tx, in_flight);
                in_flight.fetch_sub(1, Ordering::AcqRel);
            }
            Err(channel::RecvTimeoutError::Timeout) => {
                if in_flight.load(Ordering::Acquire) == 0 {
                    return;
                }
            }
            Err(channel::RecvTimeoutError::Disconnected) => return,
        }
    }
}

fn process_directory(
    dir: &std::path::Path,
    depth: usize,
    max_depth: usize,
    work_tx: &channel::Sender<WorkItem>,
    result_tx: &channel::Sender<PathBuf>,
    in_flight: &AtomicUsize,
) {
    // An unreadable directory is skipped, not fatal.
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_symlink() {
            continue;
        }
        if file_type.is_dir() {
            if depth + 1 < max_depth {
                in_flight.fetch_add(1, Ordering::Release);
                let _ = work_tx.send((entry.path(), depth + 1));
            }
            continue;
        }
        let _ = result_tx.send(entry.path());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs::File;

    fn config_for(roots: Vec<PathBuf>) -> SweeperConfig {
        SweeperConfig {
            temp_dirs: roots,
            max_depth: 16,
            parallelism: 2,
        }
    }

    #[test]
    fn finds_files_in_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        File::create(dir.path().join("top.tmp")).unwrap();
        File::create(dir.path().join("a/mid.tmp")).unwrap();
        File::create(dir.path().join("a/b/deep.tmp")).unwrap();

        let walker = TempWalker::new(config_for(vec![dir.path().to_path_buf()]));
        let found: HashSet<PathBuf> = walker.enumerate().into_iter().collect();

        assert_eq!(found.len(), 3);
        assert!(found.contains(&dir.path().join("a/b/deep.tmp")));
    }

    #[test]
    fn missing_root_is_skipped_silently() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("real.tmp")).unwrap();

        let walker = TempWalker::new(config_for(vec![
            PathBuf::from("/definitely/not/a/real/temp/dir"),
            dir.path().to_path_buf(),
        ]));
        assert_eq!(walker.enumerate().len(), 1);
    }

    #[test]
    fn empty_root_set_yields_nothing() {
        let walker = TempWalker::new(SweeperConfig {
            temp_dirs: vec![PathBuf::from("/nope")],
            max_depth: 4,
            parallelism: 1,
        });
        assert!(walker.enumerate().is_empty());
    }

    #[test]
    fn respects_max_depth() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("1/2/3")).unwrap();
        File::create(dir.path().join("1/shallow.tmp")).unwrap();
        File::create(dir.path().join("1/2/3/deep.tmp")).unwrap();

        let walker = TempWalker::new(SweeperConfig {
            temp_dirs: vec![dir.path().to_path_buf()],
            max_depth: 2,
            parallelism: 1,
        });
        let found = walker.enumerate();
        assert_eq!(found, vec![dir.path().join("1/shallow.tmp")]);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_is_skipped_not_fatal() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("visible.tmp")).unwrap();
        let blocked = dir.path().join("blocked");
        fs::create_dir(&blocked).unwrap();
        File::create(blocked.join("hidden.tmp")).unwrap();
        fs::set_permissions(&blocked, fs::Permissions::from_mode(0o000)).unwrap();
        // Root ignores permission bits; calibrate before asserting.
        let enforced = fs::read_dir(&blocked).is_err();

        let walker = TempWalker::new(config_for(vec![dir.path().to_path_buf()]));
        let found = walker.enumerate();
        fs::set_permissions(&blocked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(
            found.contains(&dir.path().join("visible.tmp")),
            "siblings of an unreadable directory must still be found"
        );
        if enforced {
            assert_eq!(found.len(), 1, "unreadable directory contributes nothing");
        } else {
            assert_eq!(found.len(), 2);
        }
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_not_followed() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target");
        fs::create_dir(&target).unwrap();
        File::create(target.join("inside.tmp")).unwrap();
        std::os::unix::fs::symlink(&target, dir.path().join("link")).unwrap();

        let walker = TempWalker::new(config_for(vec![dir.path().to_path_buf()]));
        let found = walker.enumerate();
        // The file is reachable once through the real directory, never
        // a second time through the symlink.
        assert_eq!(found.len(), 1);
    }
}
