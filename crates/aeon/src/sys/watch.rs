use async_channel::Receiver;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};

/// Watches one file through its parent directory, so editors that replace the file on save
/// are still seen. Dropping the value stops the watch.
pub struct FileWatch {
    _watcher: RecommendedWatcher,
    changes: Receiver<()>,
}

impl FileWatch {
    pub fn new(path: &Path) -> notify::Result<Self> {
        let target = path.to_path_buf();
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        if let Err(e) = fs_err::create_dir_all(&dir) {
            log::warn!("Failed to create {} for watching: {}", dir.display(), e);
        }

        let (tx, changes) = async_channel::unbounded();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<notify::Event>| match res {
                Ok(event) if touches(&event, &target) => {
                    let _ = tx.send_blocking(());
                }
                Ok(_) => {}
                Err(e) => log::error!("Watch error: {}", e),
            },
            notify::Config::default(),
        )?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            changes,
        })
    }

    /// Waits for the next change. Returns `false` once the watcher has gone away.
    pub async fn changed(&self) -> bool {
        let alive = self.changes.recv().await.is_ok();
        // editors often emit a burst of events per save
        while self.changes.try_recv().is_ok() {}
        alive
    }
}

fn touches(event: &notify::Event, target: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| p == target)
}
