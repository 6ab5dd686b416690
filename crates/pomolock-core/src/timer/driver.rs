//! Countdown driver.
//!
//! A single background task owns the [`SessionEngine`] and is its only
//! writer. Callers talk to it through a [`TimerHandle`]: commands go in over
//! an mpsc channel, the latest [`Status`] comes back over a watch channel,
//! and every state change is pushed as an [`Event`] in emission order.
//!
//! Commands are applied between ticks, so a stop or pause takes effect no
//! later than the next tick boundary.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant, MissedTickBehavior};

use super::engine::{SessionEngine, Status, TickOutcome};
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::notify::{on_phase_completed, DesktopNotifier, Notifier};
use crate::storage::Config;

/// Default spacing between ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Ordered stream of everything the driver emits.
pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

#[derive(Debug)]
enum Command {
    Start,
    TogglePause,
    Toggle,
    Stop,
    Reconfigure(Config),
    Shutdown,
}

/// Builder for the background countdown task.
pub struct TimerDriver {
    config: Config,
    notifier: Arc<dyn Notifier>,
    tick_period: Duration,
}

impl TimerDriver {
    /// Driver with desktop notifications and a one-second tick.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            notifier: Arc::new(DesktopNotifier::new()),
            tick_period: TICK_PERIOD,
        }
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    /// Spawn the driver on the current tokio runtime.
    ///
    /// The task runs until [`TimerHandle::shutdown`] is called or every
    /// handle has been dropped.
    ///
    /// # Errors
    /// Returns a validation error if the configuration has a zero duration
    /// or cycle count.
    pub fn spawn(self) -> Result<(TimerHandle, EventReceiver)> {
        self.config.validate()?;

        let engine = SessionEngine::new(self.config);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(engine.status());

        let worker = Worker {
            engine,
            notifier: self.notifier,
            events: event_tx,
            status: status_tx,
        };
        tokio::spawn(worker.run(command_rx, self.tick_period));
        tracing::debug!(period_ms = self.tick_period.as_millis() as u64, "timer driver spawned");

        let handle = TimerHandle {
            commands: command_tx,
            status: status_rx,
        };
        Ok((handle, event_rx))
    }
}

/// Cloneable control surface for a running driver.
///
/// Every command is a non-blocking send; the driver applies it on its own
/// task.
#[derive(Clone)]
pub struct TimerHandle {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<Status>,
}

impl TimerHandle {
    pub fn start(&self) -> Result<()> {
        self.send(Command::Start)
    }

    /// Pause if running, resume if paused.
    pub fn toggle_pause(&self) -> Result<()> {
        self.send(Command::TogglePause)
    }

    pub fn stop(&self) -> Result<()> {
        self.send(Command::Stop)
    }

    /// Start when idle, otherwise toggle pause. This is what a single
    /// start/pause button or tray entry does.
    ///
    /// The driver decides which one applies when it receives the command,
    /// so back-to-back toggles act on the state the previous one left.
    pub fn toggle(&self) -> Result<()> {
        self.send(Command::Toggle)
    }

    /// Swap in a new configuration.
    ///
    /// # Errors
    /// Returns a validation error, and sends nothing, if `config` is invalid.
    pub fn reconfigure(&self, config: Config) -> Result<()> {
        config.validate()?;
        self.send(Command::Reconfigure(config))
    }

    /// Stop the timer and end the driver task.
    pub fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown)
    }

    /// Last published snapshot. Never waits on the driver.
    pub fn status(&self) -> Status {
        self.status.borrow().clone()
    }

    /// Wait for the driver task to finish.
    pub async fn join(&self) {
        self.commands.closed().await;
    }

    fn send(&self, command: Command) -> Result<()> {
        tracing::debug!(?command, "timer command");
        self.commands.send(command).map_err(|_| CoreError::DriverClosed)
    }
}

struct Worker {
    engine: SessionEngine,
    notifier: Arc<dyn Notifier>,
    events: mpsc::UnboundedSender<Event>,
    status: watch::Sender<Status>,
}

impl Worker {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>, period: Duration) {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                // Commands first so a stop queued before a tick boundary wins.
                biased;
                command = commands.recv() => {
                    let Some(command) = command else {
                        tracing::debug!("all timer handles dropped");
                        break;
                    };
                    if !self.apply(command, &mut ticker) {
                        break;
                    }
                }
                _ = ticker.tick() => self.on_tick(),
            }
        }
        tracing::debug!("timer driver stopped");
    }

    /// Returns `false` when the loop should end.
    fn apply(&mut self, command: Command, ticker: &mut time::Interval) -> bool {
        match command {
            Command::Start => {
                if !self.start(ticker) {
                    return true;
                }
            }
            Command::TogglePause => self.toggle_pause(ticker),
            Command::Toggle if self.engine.is_running() => self.toggle_pause(ticker),
            Command::Toggle => {
                self.start(ticker);
            }
            Command::Stop => {
                let event = self.engine.stop();
                tracing::info!("timer stopped");
                self.emit(event);
            }
            Command::Reconfigure(config) => {
                let event = self.engine.reconfigure(config);
                self.emit(event);
            }
            Command::Shutdown => {
                let event = self.engine.stop();
                self.emit(event);
                self.publish();
                return false;
            }
        }
        self.publish();
        true
    }

    /// Returns `false` if the engine was already running.
    fn start(&mut self, ticker: &mut time::Interval) -> bool {
        let Some(event) = self.engine.start() else {
            return false;
        };
        ticker.reset();
        tracing::info!(phase = %self.engine.phase(), "timer started");
        self.emit(event);
        true
    }

    fn toggle_pause(&mut self, ticker: &mut time::Interval) {
        let event = self.engine.toggle_pause();
        if !self.engine.is_paused() {
            ticker.reset();
        }
        self.emit(event);
    }

    fn on_tick(&mut self) {
        match self.engine.tick() {
            TickOutcome::Idle => {}
            TickOutcome::Counted => self.publish(),
            TickOutcome::Finished => {
                self.publish();
                let completed = self.engine.phase();
                on_phase_completed(
                    self.notifier.as_ref(),
                    completed,
                    self.engine.config().auto_lock,
                );
                let transition = self.engine.complete_phase();
                tracing::info!(
                    completed = %transition.completed,
                    next = %transition.next,
                    cycle_count = transition.cycle_count,
                    "phase completed"
                );
                self.emit(Event::PhaseCompleted {
                    completed: transition.completed,
                    next: transition.next,
                    cycle_count: transition.cycle_count,
                    at: Utc::now(),
                });
                self.publish();
            }
        }
    }

    /// Push the current snapshot to the watch channel and the event stream.
    fn publish(&mut self) {
        let status = self.engine.status();
        self.status.send_replace(status.clone());
        self.emit(Event::StateSnapshot {
            status,
            at: Utc::now(),
        });
    }

    fn emit(&self, event: Event) {
        // Nobody listening is fine; the watch channel still carries status.
        let _ = self.events.send(event);
    }
}
