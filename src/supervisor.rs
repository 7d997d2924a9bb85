use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::ServerConfig;
use crate::game::{Game, GameReport, GameSession, HandPolicy, SessionError};

/// Point-in-time counts of supervised games
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SupervisorStats {
    pub active: usize,
    pub completed: u64,
    pub aborted: u64,
}

#[derive(Debug, Default)]
struct Counters {
    active: AtomicUsize,
    completed: AtomicU64,
    aborted: AtomicU64,
    idle: Notify,
}

/// Decrements the active count when a game task ends, including by panic
struct ActiveGuard {
    counters: Arc<Counters>,
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        if self.counters.active.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.counters.idle.notify_waiters();
        }
    }
}

/// Runs every game session as its own tokio task.
///
/// Sessions share nothing but these counters, so one game failing, stalling
/// or panicking leaves the others and the lobby untouched. There is no cap
/// on how many games run at once.
#[derive(Debug, Clone)]
pub struct GameSupervisor {
    policy: HandPolicy,
    counters: Arc<Counters>,
}

impl GameSupervisor {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            policy: config.hand_policy,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Starts a session for a paired game and returns immediately.
    ///
    /// Dropping the returned handle detaches the task; the supervisor keeps
    /// no reference to it.
    pub fn launch(&self, game: Game) -> JoinHandle<Result<GameReport, SessionError>> {
        let session = GameSession::new(game, self.policy);
        let game_id = session.id();

        self.counters.active.fetch_add(1, Ordering::AcqRel);
        let guard = ActiveGuard {
            counters: self.counters.clone(),
        };

        let task = async move {
            let result = session.run().await;
            match &result {
                Ok(_) => guard.counters.completed.fetch_add(1, Ordering::Relaxed),
                Err(_) => guard.counters.aborted.fetch_add(1, Ordering::Relaxed),
            };
            drop(guard);
            result
        };

        debug!(game_id = %game_id, "Launching game session");
        tokio::spawn(task)
    }

    pub fn stats(&self) -> SupervisorStats {
        SupervisorStats {
            active: self.counters.active.load(Ordering::Acquire),
            completed: self.counters.completed.load(Ordering::Relaxed),
            aborted: self.counters.aborted.load(Ordering::Relaxed),
        }
    }

    /// Waits until no game is running
    pub async fn wait_idle(&self) {
        loop {
            let idle = self.counters.idle.notified();
            if self.counters.active.load(Ordering::Acquire) == 0 {
                return;
            }
            idle.await;
        }
    }
}
