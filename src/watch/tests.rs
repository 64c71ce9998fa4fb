use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use notify::EventKind;
use notify::event::{CreateKind, DataChange, MetadataKind, ModifyKind, RemoveKind, RenameMode};
use parking_lot::Mutex;
use tempfile::TempDir;
use tokio::sync::mpsc;

use super::*;
use crate::source::SourceError;

const DELAY: Duration = Duration::from_millis(40);
const SETTLE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    BuildAll,
    BuildOne(String),
}

#[derive(Default)]
struct FakeRebuild {
    calls: Mutex<Vec<Call>>,
    fail: AtomicBool,
    /// Time each rebuild takes after being recorded.
    delay: Duration,
}

impl FakeRebuild {
    fn result(&self, name: &str) -> Result<(), BuildError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(BuildError::Load(SourceError::DocumentNotFound(name.into())))
        } else {
            Ok(())
        }
    }
}

impl Rebuild for FakeRebuild {
    fn build_all(&self) -> Result<usize, BuildError> {
        self.calls.lock().push(Call::BuildAll);
        std::thread::sleep(self.delay);
        self.result("*").map(|()| 1)
    }

    fn build_one(&self, name: &str) -> Result<(), BuildError> {
        self.calls.lock().push(Call::BuildOne(name.to_string()));
        std::thread::sleep(self.delay);
        self.result(name)
    }
}

#[derive(Default)]
struct FakeNotifier(Mutex<Vec<String>>);

impl ReloadNotifier for FakeNotifier {
    fn notify_reload(&self, reason: &str) {
        self.0.lock().push(reason.to_string());
    }
}

#[derive(Default)]
struct FakeReporter {
    rebuilt: Mutex<Vec<RebuildScope>>,
    failed: Mutex<Vec<RebuildScope>>,
}

impl ReportSink for FakeReporter {
    fn rebuilt(&self, scope: &RebuildScope, _elapsed: Duration) {
        self.rebuilt.lock().push(scope.clone());
    }

    fn failed(&self, scope: &RebuildScope, _error: &BuildError) {
        self.failed.lock().push(scope.clone());
    }
}

struct Harness {
    _dir: TempDir,
    roots: WatchRoots,
    rebuild: Arc<FakeRebuild>,
    notifier: Arc<FakeNotifier>,
    reporter: Arc<FakeReporter>,
    events: mpsc::UnboundedSender<notify::Result<notify::Event>>,
    handle: WatchHandle,
}

impl Harness {
    /// documents/a.mjml + partials/footer.mjml, events injected by hand.
    fn start() -> Self {
        Self::with_rebuild(FakeRebuild::default())
    }

    fn with_rebuild(rebuild: FakeRebuild) -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("documents")).unwrap();
        std::fs::create_dir_all(dir.path().join("partials")).unwrap();
        std::fs::write(dir.path().join("documents/a.mjml"), "<mjml></mjml>").unwrap();
        std::fs::write(dir.path().join("partials/footer.mjml"), "<mj-text/>").unwrap();

        let roots = WatchRoots::new(
            &dir.path().join("documents"),
            Some(&dir.path().join("partials")),
        );
        let rebuild = Arc::new(rebuild);
        let notifier = Arc::new(FakeNotifier::default());
        let reporter = Arc::new(FakeReporter::default());

        let (events, rx) = mpsc::unbounded_channel();
        let handle = Watcher::new(roots.clone(), rebuild.clone(), notifier.clone())
            .with_reporter(reporter.clone())
            .with_delay(DELAY)
            .spawn(None, rx);

        Self {
            _dir: dir,
            roots,
            rebuild,
            notifier,
            reporter,
            events,
            handle,
        }
    }

    fn document(&self, rel: &str) -> PathBuf {
        self.roots.documents.join(rel)
    }

    fn partial(&self, rel: &str) -> PathBuf {
        self.roots.partials.as_ref().unwrap().join(rel)
    }

    fn send(&self, kind: EventKind, path: &Path) {
        let event = notify::Event {
            kind,
            paths: vec![path.to_path_buf()],
            attrs: Default::default(),
        };
        self.events.send(Ok(event)).unwrap();
    }

    fn calls(&self) -> Vec<Call> {
        self.rebuild.calls.lock().clone()
    }

    fn notified(&self) -> Vec<String> {
        self.notifier.0.lock().clone()
    }
}

fn write_kind() -> EventKind {
    EventKind::Modify(ModifyKind::Data(DataChange::Content))
}

fn create_kind() -> EventKind {
    EventKind::Create(CreateKind::File)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_write_rebuilds_one_document() {
    let h = Harness::start();
    h.send(write_kind(), &h.document("a.mjml"));
    tokio::time::sleep(SETTLE).await;

    assert_eq!(h.calls(), [Call::BuildOne("a".into())]);
    assert_eq!(h.notified(), ["a"]);
    h.handle.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_nested_write_uses_slash_name() {
    let h = Harness::start();
    h.send(write_kind(), &h.document("shop/invoice.mjml"));
    tokio::time::sleep(SETTLE).await;

    assert_eq!(h.calls(), [Call::BuildOne("shop/invoice".into())]);
    h.handle.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_create_rebuilds_all() {
    let h = Harness::start();
    h.send(create_kind(), &h.document("b.mjml"));
    tokio::time::sleep(SETTLE).await;

    assert_eq!(h.calls(), [Call::BuildAll]);
    assert_eq!(h.notified(), ["all documents"]);
    h.handle.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_remove_and_rename_rebuild_all() {
    let h = Harness::start();
    h.send(EventKind::Remove(RemoveKind::File), &h.document("a.mjml"));
    tokio::time::sleep(SETTLE).await;
    h.send(
        EventKind::Modify(ModifyKind::Name(RenameMode::To)),
        &h.document("c.mjml"),
    );
    tokio::time::sleep(SETTLE).await;

    assert_eq!(h.calls(), [Call::BuildAll, Call::BuildAll]);
    h.handle.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_partial_write_rebuilds_all() {
    let h = Harness::start();
    h.send(write_kind(), &h.partial("footer.mjml"));
    tokio::time::sleep(SETTLE).await;

    assert_eq!(h.calls(), [Call::BuildAll]);
    h.handle.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_irrelevant_events_are_ignored() {
    let h = Harness::start();
    h.send(write_kind(), &h.document(".a.mjml"));
    h.send(create_kind(), &h.document(".#a.mjml"));
    h.send(write_kind(), &h.document("notes.txt"));
    h.send(create_kind(), &h.partial("logo.png"));
    h.send(
        EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
        &h.document("a.mjml"),
    );
    tokio::time::sleep(SETTLE).await;

    assert!(h.calls().is_empty());
    assert!(h.notified().is_empty());
    h.handle.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_burst_collapses_to_one_rebuild() {
    let h = Harness::start();
    for _ in 0..10 {
        h.send(write_kind(), &h.document("a.mjml"));
    }
    tokio::time::sleep(SETTLE).await;

    assert_eq!(h.calls(), [Call::BuildOne("a".into())]);
    assert_eq!(h.notified().len(), 1);
    h.handle.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_last_event_in_window_decides() {
    let h = Harness::start();
    h.send(write_kind(), &h.partial("footer.mjml"));
    h.send(write_kind(), &h.document("a.mjml"));
    tokio::time::sleep(SETTLE).await;

    assert_eq!(h.calls(), [Call::BuildOne("a".into())]);
    h.handle.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stop_drops_pending_rebuild() {
    let h = Harness::start();
    h.send(write_kind(), &h.document("a.mjml"));

    let rebuild = h.rebuild.clone();
    h.handle.stop().await;
    tokio::time::sleep(SETTLE).await;

    assert!(rebuild.calls.lock().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stop_skips_queued_rebuild() {
    let h = Harness::with_rebuild(FakeRebuild {
        delay: Duration::from_millis(400),
        ..FakeRebuild::default()
    });

    h.send(write_kind(), &h.document("a.mjml"));
    tokio::time::sleep(DELAY * 3).await;
    assert_eq!(h.calls(), [Call::BuildOne("a".into())]);

    // fires while `a` is still rebuilding, so `b` waits in the queue
    h.send(write_kind(), &h.document("b.mjml"));
    tokio::time::sleep(DELAY * 3).await;

    let rebuild = h.rebuild.clone();
    h.handle.stop().await;
    tokio::time::sleep(SETTLE).await;

    assert_eq!(*rebuild.calls.lock(), [Call::BuildOne("a".into())]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_failed_rebuild_skips_notify_and_keeps_watching() {
    let h = Harness::start();
    h.rebuild.fail.store(true, Ordering::SeqCst);
    h.send(write_kind(), &h.document("a.mjml"));
    tokio::time::sleep(SETTLE).await;

    assert_eq!(h.calls(), [Call::BuildOne("a".into())]);
    assert!(h.notified().is_empty());
    assert_eq!(*h.reporter.failed.lock(), [RebuildScope::One("a".into())]);

    h.rebuild.fail.store(false, Ordering::SeqCst);
    h.send(write_kind(), &h.document("a.mjml"));
    tokio::time::sleep(SETTLE).await;

    assert_eq!(h.calls().len(), 2);
    assert_eq!(h.notified(), ["a"]);
    assert_eq!(*h.reporter.rebuilt.lock(), [RebuildScope::One("a".into())]);
    h.handle.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_start_fails_for_missing_root() {
    let dir = TempDir::new().unwrap();
    let roots = WatchRoots::new(&dir.path().join("documents"), None);

    let result = Watcher::new(
        roots,
        Arc::new(FakeRebuild::default()),
        Arc::new(FakeNotifier::default()),
    )
    .start();

    assert!(matches!(result, Err(WatchError::MissingRoot(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_start_and_stop_with_os_watcher() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("documents/nested")).unwrap();
    let roots = WatchRoots::new(&dir.path().join("documents"), None);

    let handle = Watcher::new(
        roots,
        Arc::new(FakeRebuild::default()),
        Arc::new(FakeNotifier::default()),
    )
    .start()
    .unwrap();

    handle.stop().await;
}

/// Poll `calls` until `done` holds or a few seconds pass.
async fn wait_for(rebuild: &FakeRebuild, done: impl Fn(&[Call]) -> bool) -> Vec<Call> {
    for _ in 0..60 {
        let calls = rebuild.calls.lock().clone();
        if done(&calls) {
            return calls;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    rebuild.calls.lock().clone()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_directory_added_after_start_is_watched() {
    let dir = TempDir::new().unwrap();
    let documents = dir.path().join("documents");
    std::fs::create_dir_all(&documents).unwrap();

    // prepared outside the root, then moved in as a whole
    let staging = dir.path().join("staging/new");
    std::fs::create_dir_all(&staging).unwrap();
    std::fs::write(staging.join("x.mjml"), "<mjml></mjml>").unwrap();

    let rebuild = Arc::new(FakeRebuild::default());
    let handle = Watcher::new(
        WatchRoots::new(&documents, None),
        rebuild.clone(),
        Arc::new(FakeNotifier::default()),
    )
    .with_reporter(Arc::new(FakeReporter::default()))
    .with_delay(DELAY)
    .start()
    .unwrap();

    std::fs::rename(&staging, documents.join("new")).unwrap();
    let calls = wait_for(&rebuild, |calls| !calls.is_empty()).await;
    tokio::time::sleep(SETTLE).await;
    assert_eq!(calls, [Call::BuildAll]);
    assert_eq!(*rebuild.calls.lock(), [Call::BuildAll]);

    std::fs::write(documents.join("new/x.mjml"), "<mjml><mj-body/></mjml>").unwrap();
    let calls = wait_for(&rebuild, |calls| calls.len() >= 2).await;
    assert_eq!(calls.last(), Some(&Call::BuildOne("new/x".into())));

    handle.stop().await;
}
