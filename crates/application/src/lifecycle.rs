//! Checkpoint cleanup bound to session lifetime and process exit.
//!
//! Cleanup can be triggered three ways: explicitly, when the owning session
//! is dropped, and from the process-wide exit hooks. All three go through a
//! shared ticket that fires at most once. The exit-hook registry only keeps
//! `Weak` references, so registering a guard never keeps it alive.
//!
//! Cleanup is always scoped to the ticket's own competition. Wiping every
//! competition is a separate administrative operation on the store.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::ports::CheckpointStore;
use finetune_eval_domain::{CompetitionId, StorageError};

static EXIT_HOOKS: Lazy<Mutex<Vec<Weak<CleanupTicket>>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// What caused a cleanup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupTrigger {
    /// Called directly after a run
    Explicit,
    /// The owning session was dropped
    Finalizer,
    /// Process exit hook
    Exit,
}

impl fmt::Display for CleanupTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CleanupTrigger::Explicit => "explicit",
            CleanupTrigger::Finalizer => "finalizer",
            CleanupTrigger::Exit => "exit",
        };
        f.write_str(s)
    }
}

struct CleanupTicket {
    competition_id: CompetitionId,
    store: Arc<dyn CheckpointStore>,
    fired: AtomicBool,
}

impl CleanupTicket {
    /// Purge unless already fired. A failed purge re-arms the ticket so a
    /// later trigger can try again.
    fn fire(&self, trigger: CleanupTrigger) -> Result<usize, StorageError> {
        if self.fired.swap(true, Ordering::SeqCst) {
            return Ok(0);
        }

        match self.store.purge(&self.competition_id) {
            Ok(removed) => {
                info!(
                    competition_id = %self.competition_id,
                    %trigger,
                    removed,
                    "Checkpoints cleaned up"
                );
                Ok(removed)
            }
            Err(err) => {
                self.fired.store(false, Ordering::SeqCst);
                Err(err)
            }
        }
    }
}

/// Owns checkpoint cleanup for competitions backed by one store.
#[derive(Clone)]
pub struct LifecycleManager {
    store: Arc<dyn CheckpointStore>,
}

impl LifecycleManager {
    /// Create a manager over `store`.
    pub fn new(store: Arc<dyn CheckpointStore>) -> Self {
        Self { store }
    }

    /// The managed store
    pub fn store(&self) -> Arc<dyn CheckpointStore> {
        Arc::clone(&self.store)
    }

    /// Remove one competition's checkpoints.
    ///
    /// Safe to call repeatedly and when nothing is present.
    pub fn cleanup(&self, competition_id: &CompetitionId) -> Result<usize, StorageError> {
        let removed = self.store.purge(competition_id)?;
        info!(
            %competition_id,
            trigger = %CleanupTrigger::Explicit,
            removed,
            "Checkpoints cleaned up"
        );
        Ok(removed)
    }

    /// Arm cleanup for a competition.
    ///
    /// The returned guard purges on drop unless it has already fired or
    /// been disarmed, and is registered with [`run_exit_hooks`].
    pub fn guard(&self, competition_id: &CompetitionId) -> CleanupGuard {
        let ticket = Arc::new(CleanupTicket {
            competition_id: competition_id.clone(),
            store: Arc::clone(&self.store),
            fired: AtomicBool::new(false),
        });

        let mut hooks = EXIT_HOOKS.lock();
        hooks.retain(|weak| weak.strong_count() > 0);
        hooks.push(Arc::downgrade(&ticket));

        CleanupGuard { ticket }
    }
}

/// Drop guard tying checkpoint cleanup to an owner's lifetime
pub struct CleanupGuard {
    ticket: Arc<CleanupTicket>,
}

impl CleanupGuard {
    /// Competition this guard cleans up
    pub fn competition_id(&self) -> &CompetitionId {
        &self.ticket.competition_id
    }

    /// Whether a later trigger would still purge
    pub fn is_armed(&self) -> bool {
        !self.ticket.fired.load(Ordering::SeqCst)
    }

    /// Purge now. Later triggers are skipped once this succeeds.
    pub fn cleanup(&self) -> Result<usize, StorageError> {
        self.ticket.fire(CleanupTrigger::Explicit)
    }

    /// Keep the checkpoints: no trigger will purge through this guard.
    pub fn disarm(&self) {
        if !self.ticket.fired.swap(true, Ordering::SeqCst) {
            info!(
                competition_id = %self.ticket.competition_id,
                "Cleanup disarmed, keeping checkpoints"
            );
        }
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        if let Err(err) = self.ticket.fire(CleanupTrigger::Finalizer) {
            warn!(
                competition_id = %self.ticket.competition_id,
                error = %err,
                "Cleanup on drop failed"
            );
        }
    }
}

/// Fire every still-armed cleanup guard.
///
/// Meant to be called on every way out of the process. Guards that were
/// dropped, fired or disarmed are skipped. Returns how many tickets fired.
pub fn run_exit_hooks() -> usize {
    let live: Vec<Arc<CleanupTicket>> = {
        let mut hooks = EXIT_HOOKS.lock();
        let live = hooks.iter().filter_map(Weak::upgrade).collect();
        hooks.clear();
        live
    };

    let mut fired = 0;
    for ticket in live {
        if ticket.fired.load(Ordering::SeqCst) {
            continue;
        }
        match ticket.fire(CleanupTrigger::Exit) {
            Ok(_) => fired += 1,
            Err(err) => warn!(
                competition_id = %ticket.competition_id,
                error = %err,
                "Cleanup on exit failed"
            ),
        }
    }
    fired
}
