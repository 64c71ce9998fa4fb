//! Change watcher: filesystem events to debounced rebuilds.
//!
//! ```text
//! notify ──► ChangeEvent ──► is_relevant ──► Debouncer ──► decide ──► rebuild worker
//!                                                                        │ ok
//!                                                                        ▼
//!                                                                 ReloadNotifier
//! ```
//!
//! One task owns the OS watch handle and the debouncer, waiting on the stop
//! signal, the next event and the pending deadline together. Rebuilds run
//! one at a time on a blocking worker fed in firing order, so a rebuild
//! always happens-after the events of its window and happens-before the
//! notification that reports it.

mod classify;
mod debounce;
mod event;

#[cfg(test)]
mod tests;

pub use classify::{RebuildScope, WatchRoots, decide, is_relevant};
pub use debounce::{DEBOUNCE_MS, Debouncer};
pub use event::{ChangeEvent, Op};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use jwalk::WalkDir;
use notify::{RecommendedWatcher, RecursiveMode, Watcher as _};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::build::{BuildError, Rebuild};
use crate::logger::{format_error_chain, status_error, status_success};
use crate::reload::ReloadNotifier;
use crate::{debug, log};

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("watch root does not exist: {}", .0.display())]
    MissingRoot(PathBuf),

    #[error("failed to create filesystem watcher")]
    Backend(#[source] notify::Error),

    #[error("failed to watch `{}`", path.display())]
    Setup {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("failed to walk `{}`", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: jwalk::Error,
    },
}

/// Operator-facing sink for rebuild outcomes.
pub trait ReportSink: Send + Sync {
    fn rebuilt(&self, scope: &RebuildScope, elapsed: Duration);
    fn failed(&self, scope: &RebuildScope, error: &BuildError);
}

/// Reports through the shared watch status block.
pub struct StatusReporter;

impl ReportSink for StatusReporter {
    fn rebuilt(&self, scope: &RebuildScope, elapsed: Duration) {
        status_success(&format!("rebuilt: {scope} ({} ms)", elapsed.as_millis()));
    }

    fn failed(&self, scope: &RebuildScope, error: &BuildError) {
        status_error(
            &format!("{} failed while rebuilding {scope}", error.stage().as_str()),
            &format_error_chain(error),
        );
    }
}

type NotifyEvents = mpsc::UnboundedReceiver<notify::Result<notify::Event>>;

/// Watches documents and partials and drives rebuilds.
pub struct Watcher {
    roots: WatchRoots,
    rebuild: Arc<dyn Rebuild>,
    notifier: Arc<dyn ReloadNotifier>,
    reporter: Arc<dyn ReportSink>,
    delay: Duration,
}

impl Watcher {
    pub fn new(
        roots: WatchRoots,
        rebuild: Arc<dyn Rebuild>,
        notifier: Arc<dyn ReloadNotifier>,
    ) -> Self {
        Self {
            roots,
            rebuild,
            notifier,
            reporter: Arc::new(StatusReporter),
            delay: Duration::from_millis(DEBOUNCE_MS),
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ReportSink>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Register every directory under the roots and start watching.
    ///
    /// Fails before any task is spawned if a root is missing or cannot be
    /// watched. Must be called inside a tokio runtime.
    pub fn start(self) -> Result<WatchHandle, WatchError> {
        for root in self.roots.iter() {
            if !root.is_dir() {
                return Err(WatchError::MissingRoot(root.to_path_buf()));
            }
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })
        .map_err(WatchError::Backend)?;

        let mut count = 0;
        for root in self.roots.iter() {
            count += watch_tree(&mut watcher, root)?;
        }
        debug!("watch"; "watching {} director{}", count, if count == 1 { "y" } else { "ies" });

        Ok(self.spawn(Some(watcher), rx))
    }

    fn spawn(self, watcher: Option<RecommendedWatcher>, events: NotifyEvents) -> WatchHandle {
        let (stop_tx, stop_rx) = oneshot::channel();
        let (jobs_tx, jobs_rx) = mpsc::unbounded_channel();
        let stopped = Arc::new(AtomicBool::new(false));

        let worker = RebuildWorker {
            rebuild: self.rebuild,
            notifier: self.notifier,
            reporter: self.reporter,
            stopped: Arc::clone(&stopped),
        };
        let worker = tokio::task::spawn_blocking(move || worker.run(jobs_rx));

        let event_loop = EventLoop {
            roots: self.roots,
            watcher,
            debouncer: Debouncer::new(self.delay),
            jobs: jobs_tx,
        };
        let task = tokio::spawn(event_loop.run(events, stop_rx));

        WatchHandle {
            stop: stop_tx,
            stopped,
            task,
            worker,
        }
    }
}

/// Add `root` and every directory below it, non-recursively.
fn watch_tree(watcher: &mut RecommendedWatcher, root: &Path) -> Result<usize, WatchError> {
    let mut count = 0;
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|source| WatchError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        watcher
            .watch(&path, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::Setup { path, source })?;
        count += 1;
    }
    Ok(count)
}

/// Running watcher.
pub struct WatchHandle {
    stop: oneshot::Sender<()>,
    /// Set before stopping; queued rebuilds that have not started are skipped.
    stopped: Arc<AtomicBool>,
    task: JoinHandle<()>,
    worker: JoinHandle<()>,
}

impl WatchHandle {
    /// Stop watching.
    ///
    /// A pending debounce window and queued rebuilds are dropped; a rebuild
    /// already running is allowed to finish. Returns once the watch handle
    /// is released.
    pub async fn stop(self) {
        self.stopped.store(true, Ordering::SeqCst);
        let _ = self.stop.send(());
        let _ = self.task.await;
        let _ = self.worker.await;
    }
}

// ============================================================================
// event loop
// ============================================================================

struct EventLoop {
    roots: WatchRoots,
    watcher: Option<RecommendedWatcher>,
    debouncer: Debouncer,
    jobs: mpsc::UnboundedSender<RebuildScope>,
}

impl EventLoop {
    async fn run(mut self, mut events: NotifyEvents, mut stop: oneshot::Receiver<()>) {
        loop {
            let deadline = self.debouncer.deadline();
            tokio::select! {
                biased;
                _ = &mut stop => break,
                received = events.recv() => match received {
                    Some(Ok(event)) => self.on_event(&event),
                    Some(Err(e)) => log!("watch"; "notify error: {}", e),
                    None => break,
                },
                () = wait_until(deadline) => self.fire(),
            }
        }

        if let Some(dropped) = self.debouncer.cancel() {
            debug!("watch"; "dropped pending {}", dropped);
        }
        debug!("watch"; "stopped");
    }

    fn on_event(&mut self, event: &notify::Event) {
        for change in ChangeEvent::from_notify(event) {
            if matches!(change.op, Op::Create | Op::Rename) {
                self.attach_new_dir(&change.path);
            }
            if !is_relevant(&change) {
                continue;
            }
            debug!("watch"; "{}", change);
            self.debouncer.arm(change, Instant::now());
        }
    }

    fn fire(&mut self) {
        let Some(event) = self.debouncer.take_if_due(Instant::now()) else {
            return;
        };
        let Some(scope) = decide(&self.roots, &event) else {
            debug!("watch"; "ignored {}", event);
            return;
        };
        let _ = self.jobs.send(scope);
    }

    /// Watch a directory created or moved under a root after startup.
    ///
    /// Templates that landed in it before the watch was attached are
    /// replayed as creations.
    fn attach_new_dir(&mut self, path: &Path) {
        let Some(watcher) = self.watcher.as_mut() else {
            return;
        };
        if !path.is_dir() || !self.roots.contains(&classify::normalize_event_path(path)) {
            return;
        }

        if let Err(e) = watch_tree(watcher, path) {
            log!("watch"; "{}", format_error_chain(&e));
            return;
        }
        debug!("watch"; "attached {}", path.display());

        for entry in WalkDir::new(path).into_iter().flatten() {
            let change = ChangeEvent::new(entry.path(), Op::Create);
            if entry.file_type().is_file() && is_relevant(&change) {
                self.debouncer.arm(change, Instant::now());
            }
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
        None => std::future::pending().await,
    }
}

// ============================================================================
// rebuild worker
// ============================================================================

struct RebuildWorker {
    rebuild: Arc<dyn Rebuild>,
    notifier: Arc<dyn ReloadNotifier>,
    reporter: Arc<dyn ReportSink>,
    stopped: Arc<AtomicBool>,
}

impl RebuildWorker {
    fn run(self, mut jobs: mpsc::UnboundedReceiver<RebuildScope>) {
        while let Some(scope) = jobs.blocking_recv() {
            if self.stopped.load(Ordering::SeqCst) {
                debug!("watch"; "skipped queued rebuild of {}", scope);
                break;
            }
            self.rebuild_once(&scope);
        }
    }

    /// Rebuild, then notify clients only on success.
    fn rebuild_once(&self, scope: &RebuildScope) {
        let started = Instant::now();
        let result = match scope {
            RebuildScope::All => self.rebuild.build_all().map(|_| ()),
            RebuildScope::One(name) => self.rebuild.build_one(name),
        };

        match result {
            Ok(()) => {
                self.reporter.rebuilt(scope, started.elapsed());
                self.notifier.notify_reload(&scope.to_string());
            }
            Err(e) => self.reporter.failed(scope, &e),
        }
    }
}
