//! End-to-end lifecycle scenarios against a scripted runtime double.
//!
//! These tests drive the whole orchestration (connect retry, readiness
//! gate, hook phases, shutdown wait, final flush) with virtual time and a
//! recording spawner, so no real process or VR runtime is touched.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use vrstartup::{
    Agent, AgentConfig, LogBuffer, Phase, ReadinessGate, RuntimeClient, RuntimeError, RuntimeEvent,
    ScriptJob, Spawn,
};

type PollResult = Result<Option<RuntimeEvent>, RuntimeError>;

/// Scripted runtime double: queued connect outcomes, queued poll results,
/// counters for the calls the scenarios assert on.
struct FakeRuntime {
    connect_results: Mutex<Vec<Result<(), RuntimeError>>>,
    events: Mutex<Vec<PollResult>>,
    installed: bool,
    connects: AtomicUsize,
    acknowledged: AtomicUsize,
    disconnects: AtomicUsize,
}

impl FakeRuntime {
    fn connecting_immediately() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    fn new(connect_results: Vec<Result<(), RuntimeError>>, events: Vec<PollResult>) -> Self {
        Self {
            connect_results: Mutex::new(connect_results),
            events: Mutex::new(events),
            installed: false,
            connects: AtomicUsize::new(0),
            acknowledged: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RuntimeClient for FakeRuntime {
    async fn connect(&self) -> Result<(), RuntimeError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let mut results = self.connect_results.lock().unwrap();
        if results.is_empty() {
            Ok(())
        } else {
            results.remove(0)
        }
    }

    async fn is_application_installed(&self, _app_key: &str) -> Result<bool, RuntimeError> {
        Ok(self.installed)
    }

    async fn install_manifest(&self, _path: &Path) -> Result<(), RuntimeError> {
        Ok(())
    }

    async fn set_auto_launch(&self, _app_key: &str, _on: bool) -> Result<(), RuntimeError> {
        Ok(())
    }

    async fn disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
    }

    async fn poll_next_event(&self) -> PollResult {
        let mut events = self.events.lock().unwrap();
        if events.is_empty() {
            Ok(None)
        } else {
            events.remove(0)
        }
    }

    async fn acknowledge_quit(&self) {
        self.acknowledged.fetch_add(1, Ordering::SeqCst);
    }
}

/// Records would-be launches in order instead of starting processes.
struct RecordingSpawner {
    jobs: Mutex<Vec<ScriptJob>>,
}

impl RecordingSpawner {
    fn new() -> Self {
        Self {
            jobs: Mutex::new(Vec::new()),
        }
    }

    fn launched(&self) -> Vec<ScriptJob> {
        self.jobs.lock().unwrap().clone()
    }
}

impl Spawn for RecordingSpawner {
    fn spawn(&self, job: &ScriptJob) -> io::Result<()> {
        self.jobs.lock().unwrap().push(job.clone());
        Ok(())
    }
}

/// Config rooted in a scratch directory.
fn config_in(dir: &TempDir) -> AgentConfig {
    AgentConfig {
        log_path: dir.path().join("startup.log"),
        start_dir: dir.path().join("start"),
        stop_dir: dir.path().join("stop"),
        manifest_path: dir.path().join("app.vrmanifest"),
        ..AgentConfig::default()
    }
}

fn open_gate() -> ReadinessGate {
    let gate = ReadinessGate::new();
    gate.open();
    gate
}

fn log_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_owned)
        .collect()
}

/// Scenario 1: fresh environment, no hook folders, connect succeeds first
/// try. No script launches, no shutdown wait, log created and capped.
#[tokio::test(start_paused = true)]
async fn test_fresh_environment_runs_through_without_waiting() {
    let dir = TempDir::new().unwrap();
    let cfg = config_in(&dir);
    let client = Arc::new(FakeRuntime::connecting_immediately());
    let spawner = Arc::new(RecordingSpawner::new());

    let agent = Agent::new(
        cfg.clone(),
        LogBuffer::muted(),
        open_gate(),
        client.clone(),
        spawner.clone(),
    );
    agent.run(CancellationToken::new()).await.unwrap();

    assert!(cfg.start_dir.is_dir());
    assert!(cfg.stop_dir.is_dir());
    assert!(spawner.launched().is_empty());
    assert_eq!(client.acknowledged.load(Ordering::SeqCst), 0);
    assert_eq!(client.disconnects.load(Ordering::SeqCst), 1);

    let lines = log_lines(&cfg.log_path);
    assert!(lines.len() <= 100);
    assert!(lines.iter().any(|l| l.contains("Lifecycle worker started.")));
    assert!(lines.iter().any(|l| l.contains("Exiting.")));
}

/// Scenario 2: existing log, two start hooks, one stop hook. Start hooks
/// launch, the watcher blocks until the quit event, the stop hook launches
/// afterwards, then the log is flushed on top of the old content.
#[tokio::test(start_paused = true)]
async fn test_full_lifecycle_with_start_and_stop_hooks() {
    let dir = TempDir::new().unwrap();
    let cfg = config_in(&dir);
    fs::write(&cfg.log_path, "previous-run-line\n").unwrap();
    fs::create_dir_all(&cfg.start_dir).unwrap();
    fs::create_dir_all(&cfg.stop_dir).unwrap();
    fs::write(cfg.start_dir.join("a.cmd"), "").unwrap();
    fs::write(cfg.start_dir.join("b.cmd"), "").unwrap();
    fs::write(cfg.stop_dir.join("teardown.cmd"), "").unwrap();

    // Two empty ticks before the runtime announces the quit.
    let client = Arc::new(FakeRuntime::new(
        Vec::new(),
        vec![
            Ok(None),
            Ok(None),
            Ok(Some(RuntimeEvent::other(100))),
            Ok(Some(RuntimeEvent::quit())),
        ],
    ));
    let spawner = Arc::new(RecordingSpawner::new());

    let agent = Agent::new(
        cfg.clone(),
        LogBuffer::muted(),
        open_gate(),
        client.clone(),
        spawner.clone(),
    );
    agent.run(CancellationToken::new()).await.unwrap();

    let jobs = spawner.launched();
    assert_eq!(jobs.len(), 3);
    assert_eq!(jobs[0].phase, Phase::Start);
    assert_eq!(jobs[1].phase, Phase::Start);
    assert_eq!(jobs[2].phase, Phase::Stop);
    assert!(jobs[2].path.ends_with("teardown.cmd"));
    assert_eq!(client.acknowledged.load(Ordering::SeqCst), 1);

    let lines = log_lines(&cfg.log_path);
    assert_eq!(lines[0], "previous-run-line");
    assert!(lines.iter().any(|l| l.contains("Found 2 start file(s)")));
    assert!(lines.iter().any(|l| l.contains("Runtime is quitting.")));
    assert!(lines.iter().any(|l| l.contains("Found 1 stop file(s)")));
}

/// Scenario 3: connect fails three times, then succeeds. Three failure
/// lines precede the success line and the retries consume one backoff each.
#[tokio::test(start_paused = true)]
async fn test_connect_retries_with_fixed_backoff() {
    let dir = TempDir::new().unwrap();
    let cfg = config_in(&dir);
    let failure = || {
        Err(RuntimeError::Init {
            code: "Init_PathRegistryNotFound".to_owned(),
        })
    };
    let client = Arc::new(FakeRuntime::new(
        vec![failure(), failure(), failure()],
        Vec::new(),
    ));
    let spawner = Arc::new(RecordingSpawner::new());

    let agent = Agent::new(
        cfg.clone(),
        LogBuffer::muted(),
        open_gate(),
        client.clone(),
        spawner.clone(),
    );

    let started = tokio::time::Instant::now();
    agent.run(CancellationToken::new()).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(client.connects.load(Ordering::SeqCst), 4);
    assert!(elapsed >= Duration::from_secs(3), "three 1 s backoffs expected");

    let lines = log_lines(&cfg.log_path);
    let failure_lines: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.contains("Runtime initialization errored"))
        .map(|(i, _)| i)
        .collect();
    let success_line = lines
        .iter()
        .position(|l| l.contains("Runtime initialized successfully."))
        .unwrap();
    assert_eq!(failure_lines.len(), 3);
    assert!(failure_lines.iter().all(|&i| i < success_line));
}

/// The start phase waits for the readiness gate: nothing launches while the
/// gate is closed, everything proceeds once it opens.
#[tokio::test(start_paused = true)]
async fn test_start_hooks_wait_for_readiness_gate() {
    let dir = TempDir::new().unwrap();
    let cfg = config_in(&dir);
    fs::create_dir_all(&cfg.start_dir).unwrap();
    fs::write(cfg.start_dir.join("hello.cmd"), "").unwrap();

    let client = Arc::new(FakeRuntime::connecting_immediately());
    let spawner = Arc::new(RecordingSpawner::new());
    let gate = ReadinessGate::new();

    let agent = Agent::new(
        cfg.clone(),
        LogBuffer::muted(),
        gate.clone(),
        client.clone(),
        spawner.clone(),
    );
    let worker = tokio::spawn(agent.run(CancellationToken::new()));

    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    assert!(spawner.launched().is_empty());

    gate.open();
    worker.await.unwrap().unwrap();
    assert_eq!(spawner.launched().len(), 1);
}

/// Cooperative cancellation while connected but waiting for the quit event:
/// stop hooks are skipped (the runtime never quit) and the log still lands
/// on disk.
#[tokio::test(start_paused = true)]
async fn test_cancellation_during_shutdown_wait_still_persists_log() {
    let dir = TempDir::new().unwrap();
    let cfg = config_in(&dir);
    fs::create_dir_all(&cfg.stop_dir).unwrap();
    fs::write(cfg.stop_dir.join("teardown.cmd"), "").unwrap();

    let client = Arc::new(FakeRuntime::connecting_immediately());
    let spawner = Arc::new(RecordingSpawner::new());
    let token = CancellationToken::new();

    let agent = Agent::new(
        cfg.clone(),
        LogBuffer::muted(),
        open_gate(),
        client.clone(),
        spawner.clone(),
    );

    let cancel = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        cancel.cancel();
    });
    agent.run(token).await.unwrap();

    assert!(spawner.launched().is_empty());
    assert_eq!(client.acknowledged.load(Ordering::SeqCst), 0);
    assert_eq!(client.disconnects.load(Ordering::SeqCst), 1);

    let lines = log_lines(&cfg.log_path);
    assert!(lines.iter().any(|l| l.contains("Exiting.")));
    assert!(lines
        .iter()
        .any(|l| l.contains("Shutdown wait cancelled before a quit event.")));
}
