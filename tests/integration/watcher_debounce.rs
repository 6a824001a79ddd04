//! Debounce coordinator tests under virtual time.
//!
//! `start_paused` lets the runtime drive `sleep_until` deterministically, so
//! the 500 ms quiet period is tested without real waiting and without touching
//! the filesystem notification layer.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use taskmerge::watcher::{debounce_loop, ChangeEvent};
use taskmerge::Logger;

use crate::fixtures::Workspace;

const QUIET: Duration = Duration::from_millis(500);

struct Harness {
    tx: mpsc::Sender<ChangeEvent>,
    fired: Arc<Mutex<Vec<Instant>>>,
    task: tokio::task::JoinHandle<()>,
    ws: Workspace,
}

impl Harness {
    fn start() -> Self {
        let ws = Workspace::new();
        let logger = Logger::new(ws.path().join("task-watcher.log"));
        let (tx, rx) = mpsc::channel(16);
        let fired = Arc::new(Mutex::new(Vec::new()));
        let fired_in_loop = fired.clone();
        let task = tokio::spawn(async move {
            debounce_loop(rx, QUIET, &logger, move || {
                fired_in_loop.lock().unwrap().push(Instant::now());
            })
            .await;
        });
        Self {
            tx,
            fired,
            task,
            ws,
        }
    }

    async fn send(&self, name: &str) {
        self.tx
            .send(ChangeEvent {
                name: name.to_string(),
            })
            .await
            .expect("debounce loop alive");
    }

    async fn finish(self) -> (Vec<Instant>, String) {
        drop(self.tx);
        self.task.await.expect("debounce loop completes");
        let fired = self.fired.lock().unwrap().clone();
        (fired, self.ws.log_contents())
    }
}

#[tokio::test(start_paused = true)]
async fn burst_coalesces_into_one_pass() {
    let harness = Harness::start();

    harness.send("a-tasks.json").await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    harness.send("b-tasks.json").await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    harness.send("c-tasks.json").await;
    let last_event = Instant::now();

    tokio::time::sleep(Duration::from_millis(600)).await;

    let (fired, log) = harness.finish().await;
    assert_eq!(fired.len(), 1);
    assert!(fired[0] - last_event >= QUIET);
    assert!(log.contains("Change detected in a-tasks.json"));
    assert!(log.contains("Change detected in b-tasks.json"));
    assert!(log.contains("Change detected in c-tasks.json"));
}

#[tokio::test(start_paused = true)]
async fn each_event_resets_the_quiet_period() {
    let harness = Harness::start();

    // Events spaced under the quiet period keep pushing the deadline out.
    for _ in 0..5 {
        harness.send("a-tasks.json").await;
        tokio::time::sleep(Duration::from_millis(400)).await;
    }
    let last_event = Instant::now() - Duration::from_millis(400);

    tokio::time::sleep(Duration::from_millis(200)).await;

    let (fired, _) = harness.finish().await;
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0] - last_event, QUIET);
}

#[tokio::test(start_paused = true)]
async fn non_fragment_changes_are_ignored() {
    let harness = Harness::start();

    harness.send("README.md").await;
    harness.send("tasks.json.swp").await;
    tokio::time::sleep(Duration::from_millis(1000)).await;

    // The loop is still responsive to qualifying events afterwards.
    harness.send("a-tasks.json").await;
    tokio::time::sleep(Duration::from_millis(600)).await;

    let (fired, log) = harness.finish().await;
    assert_eq!(fired.len(), 1);
    assert!(!log.contains("README.md"));
    assert!(log.contains("Change detected in a-tasks.json"));
}

#[tokio::test(start_paused = true)]
async fn separate_bursts_trigger_separate_passes() {
    let harness = Harness::start();

    harness.send("a-tasks.json").await;
    tokio::time::sleep(Duration::from_millis(600)).await;

    harness.send("b-tasks.json").await;
    tokio::time::sleep(Duration::from_millis(600)).await;

    let (fired, _) = harness.finish().await;
    assert_eq!(fired.len(), 2);
    assert!(fired[1] - fired[0] >= QUIET);
}

#[tokio::test(start_paused = true)]
async fn pending_deadline_is_dropped_on_shutdown() {
    let harness = Harness::start();

    harness.send("a-tasks.json").await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Channel closes while Pending: no trailing pass runs.
    let (fired, _) = harness.finish().await;
    assert!(fired.is_empty());
}
