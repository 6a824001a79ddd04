//! Filesystem watcher with a debounced re-merge loop.
//!
//! Change notifications are forwarded from the notify backend into an mpsc
//! channel and consumed by a single coordinator task. The coordinator owns the
//! debounce state explicitly: a burst of fragment edits collapses into one
//! aggregation pass once the quiet period elapses without further changes.

use std::time::Duration;

use notify::{Config as NotifyConfig, Event, RecommendedWatcher, RecursiveMode, Watcher as _};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use crate::combine::Combiner;
use crate::config::{Config, DEBOUNCE_MS, FRAGMENT_SUFFIX};
use crate::log::Logger;
use crate::Result;

/// A single filesystem change, reduced to the file name that changed.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub name: String,
}

/// Debounce state owned by the coordinator loop.
///
/// Idle until a qualifying change arrives; each further change pushes the
/// deadline out to `now + quiet`. The deadline elapsing uninterrupted is the
/// signal to act.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Debounce {
    Idle,
    Pending { deadline: Instant },
}

impl Debounce {
    pub fn note_change(&mut self, now: Instant, quiet: Duration) {
        *self = Debounce::Pending {
            deadline: now + quiet,
        };
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self {
            Debounce::Idle => None,
            Debounce::Pending { deadline } => Some(*deadline),
        }
    }

    pub fn reset(&mut self) {
        *self = Debounce::Idle;
    }
}

impl Default for Debounce {
    fn default() -> Self {
        Debounce::Idle
    }
}

/// Consume change events until the channel closes, applying the debounce
/// policy. `fire` runs once per quiet-period expiry.
///
/// Events whose file name does not end with the fragment suffix are dropped
/// without touching the debounce state.
pub async fn debounce_loop<F>(
    mut rx: mpsc::Receiver<ChangeEvent>,
    quiet: Duration,
    logger: &Logger,
    mut fire: F,
) where
    F: FnMut(),
{
    let mut state = Debounce::default();
    loop {
        let deadline = state.deadline();
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Some(event) => {
                        if event.name.ends_with(FRAGMENT_SUFFIX) {
                            crate::tlog!(logger, "Change detected in {}", event.name);
                            state.note_change(Instant::now(), quiet);
                        }
                    }
                    None => break,
                }
            }
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                fire();
                state.reset();
            }
        }
    }
}

/// Watches the configuration directory and re-runs the combiner on debounced
/// changes. Runs until an interrupt or terminate signal arrives.
pub struct Watcher {
    config: Config,
    logger: Logger,
    combiner: Combiner,
    quiet: Duration,
}

impl Watcher {
    pub fn new(config: Config, logger: Logger) -> Self {
        let combiner = Combiner::new(config.clone(), logger.clone());
        Self {
            config,
            logger,
            combiner,
            quiet: Duration::from_millis(DEBOUNCE_MS),
        }
    }

    pub async fn run(&self) -> Result<()> {
        self.logger.log("Task watcher started in background mode");

        // Initial pass also creates the configuration directory, which must
        // exist before notify can watch it. A failed pass is logged and does
        // not prevent watching.
        self.combiner.combine();

        let (tx, rx) = mpsc::channel::<ChangeEvent>(64);
        let mut fs_watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                if let Ok(event) = res {
                    for path in event.paths {
                        if let Some(name) = path.file_name() {
                            let _ = tx.blocking_send(ChangeEvent {
                                name: name.to_string_lossy().into_owned(),
                            });
                        }
                    }
                }
            },
            NotifyConfig::default(),
        )?;
        fs_watcher.watch(&self.config.config_dir, RecursiveMode::NonRecursive)?;

        let combiner = &self.combiner;
        tokio::select! {
            _ = debounce_loop(rx, self.quiet, &self.logger, || {
                // An aggregation failure never tears the loop down; the next
                // change gets another chance.
                combiner.combine();
            }) => {}
            res = shutdown_signal() => {
                res?;
                self.logger.log("Task watcher stopped");
            }
        }
        Ok(())
    }
}

#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = interrupt.recv() => {}
        _ = terminate.recv() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
