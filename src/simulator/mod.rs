//! Engagement simulator service
//!
//! Wraps the [`Engine`] in a start/stop service:
//!
//! - A scheduler task ticks the engine on a fixed period.
//! - Each user message spawns one reply task that waits a random typing
//!   delay, then appends the persona's answer.
//! - Every task races a shared [`CancellationToken`] and is tracked by a
//!   [`TaskTracker`]. [`Simulator::stop`] cancels and waits for all of them,
//!   and each task re-checks the token after taking the engine lock, so
//!   nothing touches the store once the simulator is stopped.
//!
//! The engine sits behind a single `tokio::sync::Mutex`; all mutations,
//! whether from timers or from the user, are serialized through it.

mod engine;
pub mod metrics;

pub use engine::{Engine, TickReport};

use crate::config::{Config, SimulatorConfig};
use crate::error::{CulturaError, Result};
use crate::feed::FeedSnapshot;
use crate::persona::PersonaCatalog;
use crate::store::{ConversationThread, StoreEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// Start/stop service around the engagement engine
///
/// # Examples
///
/// ```no_run
/// use cultura::config::Config;
/// use cultura::simulator::Simulator;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let simulator = Simulator::from_config(&Config::default())?;
///     simulator.start()?;
///     simulator.open_thread("kenji").await?;
///     simulator.send_message("kenji", "Hello!").await?;
///     simulator.stop().await;
///     Ok(())
/// }
/// ```
pub struct Simulator {
    engine: Arc<Mutex<Engine>>,
    token: CancellationToken,
    tracker: TaskTracker,
    tick_interval: Duration,
    scheduler_started: AtomicBool,
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("tick_interval", &self.tick_interval)
            .field("stopped", &self.token.is_cancelled())
            .field("tasks", &self.tracker.len())
            .finish_non_exhaustive()
    }
}

impl Simulator {
    /// Creates a stopped-scheduler simulator over a catalog
    pub fn new(catalog: PersonaCatalog, config: &SimulatorConfig) -> Self {
        Self {
            engine: Arc::new(Mutex::new(Engine::new(Arc::new(catalog), config))),
            token: CancellationToken::new(),
            tracker: TaskTracker::new(),
            tick_interval: Duration::from_millis(config.tick_interval_ms.max(1)),
            scheduler_started: AtomicBool::new(false),
        }
    }

    /// Builds a simulator from full configuration, loading the catalog
    ///
    /// # Errors
    ///
    /// Returns `CulturaError::Config` if the configuration is invalid or the
    /// catalog file cannot be loaded.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let catalog = PersonaCatalog::load(config.catalog.path.as_deref())?;
        info!(
            personas = catalog.len(),
            tick_interval_ms = config.simulator.tick_interval_ms,
            activation_probability = config.simulator.activation_probability,
            seeded = config.simulator.seed.is_some(),
            "Engagement simulator created"
        );
        Ok(Self::new(catalog, &config.simulator))
    }

    /// Starts the periodic scheduler
    ///
    /// Calling `start` on a running simulator does nothing. Must be called
    /// from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `CulturaError::SimulatorStopped` after [`Simulator::stop`].
    pub fn start(&self) -> Result<()> {
        self.ensure_running()?;
        if self.scheduler_started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let engine = Arc::clone(&self.engine);
        let token = self.token.clone();
        let period = self.tick_interval;

        self.tracker.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            debug!(period_ms = period.as_millis() as u64, "Scheduler started");

            loop {
                tokio::select! {
                    biased;

                    _ = token.cancelled() => break,

                    _ = interval.tick() => {
                        let mut engine = engine.lock().await;
                        if token.is_cancelled() {
                            break;
                        }
                        if let Err(e) = engine.tick() {
                            warn!(error = %e, "Scheduler tick failed");
                        }
                    }
                }
            }

            debug!("Scheduler stopped");
        });

        Ok(())
    }

    /// Runs one scheduler step immediately, without waiting for the timer
    ///
    /// # Errors
    ///
    /// Returns `CulturaError::SimulatorStopped` after [`Simulator::stop`].
    pub async fn tick(&self) -> Result<TickReport> {
        let mut engine = self.engine.lock().await;
        self.ensure_running()?;
        engine.tick()
    }

    /// Opens a persona's thread, making it the only focused one
    ///
    /// # Errors
    ///
    /// Returns `CulturaError::UnknownPersona` for an id outside the catalog
    /// and `CulturaError::SimulatorStopped` after [`Simulator::stop`].
    pub async fn open_thread(&self, persona_id: &str) -> Result<()> {
        let mut engine = self.engine.lock().await;
        self.ensure_running()?;
        engine.store_mut().open_thread(persona_id)
    }

    /// Closes the open thread
    ///
    /// Returns the id of the thread that was open.
    pub async fn close_thread(&self) -> Option<String> {
        let mut engine = self.engine.lock().await;
        if self.token.is_cancelled() {
            return None;
        }
        engine.store_mut().close_thread()
    }

    /// Sends a user message and schedules exactly one persona reply
    ///
    /// The reply lands after a random delay within the configured bounds,
    /// unless the simulator is stopped first.
    ///
    /// # Errors
    ///
    /// Returns `CulturaError::UnknownPersona`, `CulturaError::EmptyMessage`,
    /// or `CulturaError::SimulatorStopped`. Nothing is scheduled on error.
    pub async fn send_message(&self, persona_id: &str, text: &str) -> Result<()> {
        let delay = {
            let mut engine = self.engine.lock().await;
            self.ensure_running()?;
            engine.accept_user_message(persona_id, text)?;
            engine.reply_delay()
        };

        let engine = Arc::clone(&self.engine);
        let token = self.token.clone();
        let persona_id = persona_id.to_string();
        debug!(persona_id = %persona_id, delay_ms = delay.as_millis() as u64, "Reply scheduled");

        self.tracker.spawn(async move {
            tokio::select! {
                biased;

                _ = token.cancelled() => {}

                _ = tokio::time::sleep(delay) => {
                    let mut engine = engine.lock().await;
                    if token.is_cancelled() {
                        return;
                    }
                    if let Err(e) = engine.deliver_reply(&persona_id) {
                        warn!(persona_id = %persona_id, error = %e, "Reply delivery failed");
                    }
                }
            }
        });

        Ok(())
    }

    /// Current feed projection
    pub async fn feed(&self) -> FeedSnapshot {
        let engine = self.engine.lock().await;
        FeedSnapshot::project(engine.store())
    }

    /// Copy of a persona's thread
    pub async fn thread(&self, persona_id: &str) -> Option<ConversationThread> {
        let engine = self.engine.lock().await;
        engine.store().thread(persona_id).cloned()
    }

    /// Running total of simulated messages
    pub async fn engagement(&self) -> u64 {
        self.engine.lock().await.store().engagement()
    }

    /// Ticks run so far
    pub async fn ticks(&self) -> u64 {
        self.engine.lock().await.ticks()
    }

    /// Subscribes to store change notifications
    pub async fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.engine.lock().await.store().subscribe()
    }

    /// Stops the scheduler and every pending reply, then waits for them
    ///
    /// After this returns no task holds the engine and no further mutation
    /// happens. Safe to call more than once.
    pub async fn stop(&self) {
        if !self.token.is_cancelled() {
            info!("Stopping engagement simulator");
        }
        self.token.cancel();
        self.tracker.close();
        self.tracker.wait().await;
    }

    /// True once [`Simulator::stop`] has been called
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Tasks still alive (scheduler plus pending replies)
    pub fn pending_tasks(&self) -> usize {
        self.tracker.len()
    }

    fn ensure_running(&self) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(CulturaError::SimulatorStopped.into());
        }
        Ok(())
    }
}

impl Drop for Simulator {
    fn drop(&mut self) {
        // tasks exit at their next await point
        self.token.cancel();
    }
}
