use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::dispatcher::panic_message;
use crate::emitter::EventEmitter;
use crate::player::{Player, PlayerError, duration_or_zero, position_or_zero};
use crate::registry::PlayerRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickOutcome {
    /// At least one player is playing, tick again after one period
    Continue,
    /// Nothing is playing
    Idle,
    /// The registry is gone
    Orphaned,
}

#[derive(Debug)]
struct Heartbeat {
    token: CancellationToken,
    generation: u64,
    task: JoinHandle<()>,
}

#[derive(Debug)]
struct SchedulerInner {
    registry: Weak<RefCell<PlayerRegistry>>,
    emitter: EventEmitter,
    period: Duration,
    heartbeat: RefCell<Option<Heartbeat>>,
    generation: Cell<u64>,
}

/// Single heartbeat that polls every playing player for progress.
///
/// Must be used from within a `LocalSet`. The heartbeat exists only while something is playing:
/// [`PollingScheduler::start`] creates it if absent and a tick that finds nothing playing ends
/// it.
#[derive(Clone, Debug)]
pub struct PollingScheduler {
    inner: Rc<SchedulerInner>,
}

impl PollingScheduler {
    pub fn new(
        registry: Weak<RefCell<PlayerRegistry>>,
        emitter: EventEmitter,
        period: Duration,
    ) -> Self {
        Self {
            inner: Rc::new(SchedulerInner {
                registry,
                emitter,
                period,
                heartbeat: RefCell::new(None),
                generation: Cell::new(0),
            }),
        }
    }

    /// Idle to running. A no-op while a heartbeat is already scheduled.
    pub fn start(&self) {
        let mut heartbeat = self.inner.heartbeat.borrow_mut();
        if heartbeat.is_some() {
            return;
        }
        let generation = self.inner.generation.get() + 1;
        self.inner.generation.set(generation);
        let token = CancellationToken::new();
        info!("Starting position updates");
        let task = tokio::task::spawn_local(run(
            Rc::downgrade(&self.inner),
            token.clone(),
            generation,
        ));
        *heartbeat = Some(Heartbeat {
            token,
            generation,
            task,
        });
    }

    /// Cancels the heartbeat, if any. No tick runs after this returns.
    pub fn stop(&self) {
        if let Some(heartbeat) = self.inner.heartbeat.borrow_mut().take() {
            info!("Stopping position updates");
            heartbeat.token.cancel();
            heartbeat.task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.heartbeat.borrow().is_some()
    }
}

impl SchedulerInner {
    fn tick(&self) -> TickOutcome {
        let Some(registry) = self.registry.upgrade() else {
            return TickOutcome::Orphaned;
        };
        let registry = registry.borrow();
        let mut any_playing = false;
        for player in registry.players() {
            let player_id = player.player_id();
            // A player that panics counts as not playing
            let polled = panic::catch_unwind(AssertUnwindSafe(|| poll(player)));
            match polled {
                Ok(None) => {}
                Ok(Some(Ok((duration, position)))) => {
                    any_playing = true;
                    self.emitter.duration(player_id, duration);
                    self.emitter.current_position(player_id, position);
                }
                Ok(Some(Err(PlayerError::Unsupported(capability)))) => {
                    any_playing = true;
                    debug!("Skipping {player_id}, {capability} is not supported");
                }
                Ok(Some(Err(e))) => {
                    any_playing = true;
                    warn!("Error reading progress for {player_id}: {e}");
                }
                Err(payload) => {
                    error!(
                        "Panic reading progress for {player_id}: {}",
                        panic_message(payload.as_ref())
                    );
                }
            }
        }
        if any_playing {
            TickOutcome::Continue
        } else {
            TickOutcome::Idle
        }
    }

    /// Clears the heartbeat if it still belongs to `generation`.
    fn finish(&self, generation: u64) {
        let mut heartbeat = self.heartbeat.borrow_mut();
        if heartbeat
            .as_ref()
            .is_some_and(|h| h.generation == generation)
        {
            info!("Nothing playing, stopping position updates");
            if let Some(heartbeat) = heartbeat.take() {
                heartbeat.token.cancel();
            }
        }
    }
}

/// Progress of a playing player, duration first and position second. None if not playing.
fn poll(player: &dyn Player) -> Option<Result<(i64, i64), PlayerError>> {
    if !player.is_actually_playing() {
        return None;
    }
    Some(duration_or_zero(player).and_then(|duration| {
        position_or_zero(player).map(|position| (duration, position))
    }))
}

async fn run(inner: Weak<SchedulerInner>, token: CancellationToken, generation: u64) {
    loop {
        let Some(scheduler) = inner.upgrade() else {
            return;
        };
        if token.is_cancelled() {
            return;
        }
        match scheduler.tick() {
            TickOutcome::Continue => {}
            TickOutcome::Idle | TickOutcome::Orphaned => {
                scheduler.finish(generation);
                return;
            }
        }
        let period = scheduler.period;
        drop(scheduler);
        tokio::select! {
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(period) => {}
        }
    }
}

#[cfg(test)]
#[path = "./scheduler_test.rs"]
mod scheduler_test;
