//! Directory watch loop
//!
//! Poll-based scanner that turns files appearing in a directory into a
//! document stream. A file is only emitted once its size and modification
//! time have held still for the configured debounce window, so a file still
//! being written is never yielded half-finished. Each ready file is emitted
//! at most once; files already present at startup enter the same path as
//! later arrivals.

use crate::archive::archive_file;
use crate::config::WatcherConfig;
use crate::error::WatcherError;
use relstream_domain::Document;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// One observation of a document source.
#[derive(Debug)]
pub enum SourceEvent {
    /// A stable file was read and decoded
    Ready(Document),

    /// A stable file could not be decoded as UTF-8; it has been moved to
    /// the errored archive subpath
    Corrupt {
        /// Original input path of the file
        path: PathBuf,
        /// Why decoding failed
        reason: String,
    },
}

#[derive(Debug, PartialEq, Eq)]
struct Observation {
    size: u64,
    modified: Option<SystemTime>,
}

/// Watches one directory and emits [`SourceEvent`]s.
///
/// # Examples
///
/// ```no_run
/// use relstream_watcher::{DirectoryWatcher, WatcherConfig};
///
/// # async fn example() -> Result<(), relstream_watcher::WatcherError> {
/// let config = WatcherConfig::new("/data/input", "/data/archive");
/// let (handle, mut events) = DirectoryWatcher::new(config)?.spawn();
///
/// while let Some(event) = events.recv().await {
///     // feed into the pipeline
/// }
/// handle.stop().await;
/// # Ok(())
/// # }
/// ```
pub struct DirectoryWatcher {
    config: WatcherConfig,
}

/// Controls a spawned watch loop.
pub struct WatcherHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl WatcherHandle {
    /// Stop the watch loop and wait for it to exit.
    ///
    /// Files still inside their debounce window are abandoned without being
    /// emitted; they will be picked up by a future watcher run.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.task.await;
    }
}

impl DirectoryWatcher {
    /// Create a watcher.
    ///
    /// # Errors
    ///
    /// Returns `WatcherError::InvalidConfig` for an invalid configuration.
    pub fn new(config: WatcherConfig) -> Result<Self, WatcherError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Spawn the watch loop onto the runtime.
    ///
    /// Returns a handle for shutdown and the receiver carrying events.
    pub fn spawn(self) -> (WatcherHandle, mpsc::Receiver<SourceEvent>) {
        let (events_tx, events_rx) = mpsc::channel(self.config.channel_capacity);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(watch_loop(self.config, events_tx, shutdown_rx));

        (WatcherHandle { shutdown_tx, task }, events_rx)
    }
}

async fn watch_loop(
    config: WatcherConfig,
    events_tx: mpsc::Sender<SourceEvent>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    info!(
        input_dir = %config.input_dir.display(),
        extension = %config.extension,
        debounce_ms = config.debounce_ms,
        "directory watcher running"
    );

    let debounce = Duration::from_millis(config.debounce_ms);
    let mut ticker = interval(Duration::from_millis(config.poll_interval_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // Files inside their stability window, keyed by path
    let mut pending: HashMap<PathBuf, (Observation, Instant)> = HashMap::new();
    // Files already emitted and still sitting in the input dir
    let mut emitted: HashSet<PathBuf> = HashSet::new();

    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                // A dropped handle counts as shutdown
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                let keep_going =
                    scan(&config, debounce, &mut pending, &mut emitted, &events_tx).await;
                if !keep_going {
                    break;
                }
            }
        }
    }

    info!("directory watcher stopped");
}

/// One scan pass. Returns false when the event receiver has gone away.
async fn scan(
    config: &WatcherConfig,
    debounce: Duration,
    pending: &mut HashMap<PathBuf, (Observation, Instant)>,
    emitted: &mut HashSet<PathBuf>,
    events_tx: &mpsc::Sender<SourceEvent>,
) -> bool {
    let mut present: HashSet<PathBuf> = HashSet::new();

    let mut entries = match fs::read_dir(&config.input_dir).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %config.input_dir.display(), error = %e, "cannot read input directory");
            return true;
        }
    };

    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        if !matches_extension(&path, &config.extension) {
            continue;
        }
        let Ok(metadata) = entry.metadata().await else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        present.insert(path.clone());

        if emitted.contains(&path) {
            continue;
        }

        let observation = Observation {
            size: metadata.len(),
            modified: metadata.modified().ok(),
        };

        match pending.get(&path) {
            Some((previous, since)) if *previous == observation => {
                if since.elapsed() >= debounce {
                    pending.remove(&path);
                    emitted.insert(path.clone());
                    if !emit_file(config, &path, events_tx).await {
                        return false;
                    }
                }
            }
            // New file, or still being written: restart its window
            _ => {
                pending.insert(path, (observation, Instant::now()));
            }
        }
    }

    // Files that left the input dir (archived or removed) are forgotten, so
    // a later file under the same name counts as a new document
    pending.retain(|path, _| present.contains(path));
    emitted.retain(|path| present.contains(path));

    true
}

fn matches_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Read, decode, and emit one stable file. Returns false when the receiver
/// has gone away.
async fn emit_file(
    config: &WatcherConfig,
    path: &Path,
    events_tx: &mpsc::Sender<SourceEvent>,
) -> bool {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "stable file vanished before read");
            return true;
        }
    };

    let event = match String::from_utf8(bytes) {
        Ok(text) => {
            let document = Document::from_file(path, text);
            debug!(path = %path.display(), doc_id = %document.id, "file ready");
            SourceEvent::Ready(document)
        }
        Err(e) => {
            let reason = format!("not valid UTF-8: {}", e.utf8_error());
            warn!(path = %path.display(), %reason, "corrupt input file");
            // Move it out of the input dir so it is not rescanned forever
            if let Err(archive_error) = archive_file(path, &config.errored_dir()).await {
                warn!(path = %path.display(), error = %archive_error, "failed to archive corrupt file");
            }
            SourceEvent::Corrupt {
                path: path.to_path_buf(),
                reason,
            }
        }
    };

    events_tx.send(event).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    fn test_config(root: &Path) -> WatcherConfig {
        let mut config = WatcherConfig::new(root.join("in"), root.join("archive"));
        config.poll_interval_ms = 10;
        config.debounce_ms = 40;
        config
    }

    async fn next_event(events: &mut mpsc::Receiver<SourceEvent>) -> SourceEvent {
        timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("watcher should emit within the test window")
            .expect("event channel closed unexpectedly")
    }

    #[tokio::test]
    async fn test_existing_file_emitted_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        fs::create_dir_all(&config.input_dir).await.unwrap();
        fs::write(config.input_dir.join("report.txt"), "file contents")
            .await
            .unwrap();

        let (handle, mut events) = DirectoryWatcher::new(config).unwrap().spawn();

        match next_event(&mut events).await {
            SourceEvent::Ready(doc) => {
                assert_eq!(doc.id, "report");
                assert_eq!(doc.text, "file contents");
                assert!(doc.source_path.is_some());
            }
            other => panic!("expected Ready, got {:?}", other),
        }

        // File still in place: no second emission
        let second = timeout(Duration::from_millis(200), events.recv()).await;
        assert!(second.is_err(), "file must be emitted at most once");

        handle.stop().await;
    }

    #[tokio::test]
    async fn test_non_matching_files_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        fs::create_dir_all(&config.input_dir).await.unwrap();
        fs::write(config.input_dir.join("notes.md"), "wrong extension")
            .await
            .unwrap();

        let (handle, mut events) = DirectoryWatcher::new(config).unwrap().spawn();

        let nothing = timeout(Duration::from_millis(200), events.recv()).await;
        assert!(nothing.is_err());

        handle.stop().await;
    }

    #[tokio::test]
    async fn test_file_growing_during_debounce_emitted_whole() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.debounce_ms = 200;
        let input = config.input_dir.clone();
        fs::create_dir_all(&input).await.unwrap();

        let (handle, mut events) = DirectoryWatcher::new(config).unwrap().spawn();

        let path = input.join("slow.txt");
        fs::write(&path, "first half ").await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        fs::write(&path, "first half and second half").await.unwrap();

        match next_event(&mut events).await {
            SourceEvent::Ready(doc) => {
                assert_eq!(doc.text, "first half and second half");
            }
            other => panic!("expected Ready, got {:?}", other),
        }

        handle.stop().await;
    }

    #[tokio::test]
    async fn test_corrupt_file_reported_and_moved_to_errored() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let input = config.input_dir.clone();
        let errored = config.errored_dir();
        fs::create_dir_all(&input).await.unwrap();
        fs::write(input.join("binary.txt"), [0xff, 0xfe, 0x00, 0x80])
            .await
            .unwrap();

        let (handle, mut events) = DirectoryWatcher::new(config).unwrap().spawn();

        match next_event(&mut events).await {
            SourceEvent::Corrupt { path, reason } => {
                assert_eq!(path, input.join("binary.txt"));
                assert!(reason.contains("UTF-8"));
            }
            other => panic!("expected Corrupt, got {:?}", other),
        }

        assert!(!fs::try_exists(input.join("binary.txt")).await.unwrap());
        assert!(fs::try_exists(errored.join("binary.txt")).await.unwrap());

        handle.stop().await;
    }

    #[tokio::test]
    async fn test_stop_cancels_pending_debounce() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.debounce_ms = 10_000;
        let input = config.input_dir.clone();
        fs::create_dir_all(&input).await.unwrap();
        fs::write(input.join("pending.txt"), "never stable in time")
            .await
            .unwrap();

        let (handle, mut events) = DirectoryWatcher::new(config).unwrap().spawn();
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.stop().await;

        // Loop exited without emitting the half-debounced file
        assert!(events.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let config = WatcherConfig::new("", "/archive");
        assert!(DirectoryWatcher::new(config).is_err());
    }
}
