//! Polling file watcher used by `--watch` to notice catalog and settings edits.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval};

/// Change marker for a file: modification time, length and content hash.
type Fingerprint = Option<(SystemTime, u64, u64)>;

/// What: Fingerprint `path`, or `None` when it cannot be read.
///
/// Details:
/// - The content hash catches same-length rewrites that land within one
///   mtime tick.
fn fingerprint(path: &Path) -> Fingerprint {
    let meta = std::fs::metadata(path).ok()?;
    let bytes = std::fs::read(path).ok()?;
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    Some((meta.modified().ok()?, meta.len(), hasher.finish()))
}

/// What: Spawn a worker that polls a file and reports changes.
///
/// Inputs:
/// - `path`: File to watch
/// - `every`: Poll interval
/// - `on_change`: Called with `path` each time the fingerprint changes
///
/// Output:
/// - Join handle; abort it to stop polling
///
/// Details:
/// - The state at spawn time is the baseline, so nothing fires until the file
///   changes.
/// - The whole file is read on every tick; meant for small config and
///   catalog files.
/// - A file that disappears is not reported; its reappearance is.
pub fn spawn_file_poller<F>(path: PathBuf, every: Duration, mut on_change: F) -> JoinHandle<()>
where
    F: FnMut(&Path) + Send + 'static,
{
    tokio::spawn(async move {
        let mut last = fingerprint(&path);
        let mut ticker = interval(every.max(Duration::from_millis(10)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let now = fingerprint(&path);
            if now == last {
                continue;
            }
            last = now;
            if now.is_some() {
                tracing::debug!(path = %path.display(), "watched file changed");
                on_change(&path);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    #[tokio::test]
    /// What: Content changes are reported, the initial state is not
    ///
    /// - Input: Existing file, then rewrite with different length
    /// - Output: Exactly one notification after the rewrite
    async fn reports_changes_after_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "[]").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = spawn_file_poller(path.clone(), Duration::from_millis(10), move |p| {
            let _ = tx.send(p.to_path_buf());
        });

        assert!(
            timeout(Duration::from_millis(60), rx.recv())
                .await
                .is_err()
        );
        std::fs::write(&path, r#"[{"package": "a"}]"#).unwrap();
        let got = timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got, path);
        handle.abort();
    }

    #[test]
    /// What: Same-length rewrites change the fingerprint
    ///
    /// - Input: File rewritten with different bytes of equal length
    /// - Output: Fingerprints differ even if mtime and length match
    fn same_length_rewrite_changes_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.conf");
        std::fs::write(&path, "reverse_order = false\n").unwrap();
        let before = fingerprint(&path).unwrap();
        std::fs::write(&path, "reverse_order = fals3\n").unwrap();
        let after = fingerprint(&path).unwrap();
        assert_eq!(before.1, after.1);
        assert_ne!(before.2, after.2);
        assert_ne!(before, after);
        assert_eq!(fingerprint(&dir.path().join("missing")), None);
    }
}
