use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use stash_types::WispPath;
use tokio::sync::watch;
use tracing::debug;

use crate::error::{LockError, Result};

/// A queued claim as seen by later arrivals.
struct QueuedClaim {
    id: u64,
    path: WispPath,
    /// Closed (sender dropped) once the claim settles.
    settled: watch::Receiver<()>,
}

#[derive(Default)]
struct QueueState {
    next_id: u64,
    claims: Vec<QueuedClaim>,
}

fn lock_state(state: &Mutex<QueueState>) -> MutexGuard<'_, QueueState> {
    // Queue updates never panic midway, so a poisoned state is still consistent.
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Arrival-ordered queue of path claims.
///
/// Conflicting claims (equal paths, or one path beneath the other) are
/// granted one at a time in arrival order. Reads and writes are treated
/// alike: this is not a reader/writer lock.
pub struct PathLockQueue {
    state: Arc<Mutex<QueueState>>,
    limit: Option<usize>,
}

impl PathLockQueue {
    /// Create an unbounded queue.
    pub fn new() -> Self {
        Self::with_limit(None)
    }

    /// Create a queue that refuses new claims once `limit` are pending.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState::default())),
            limit,
        }
    }

    /// Configured capacity, if any.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Number of claims currently queued (granted or waiting).
    pub fn len(&self) -> usize {
        lock_state(&self.state).claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Claim `path`.
    ///
    /// The claim is enqueued immediately. The returned future then waits for
    /// every conflicting claim that was queued at that moment to settle,
    /// whatever the outcome of the operation it guarded. Dropping the future
    /// before it completes withdraws the claim.
    pub async fn acquire(&self, path: &WispPath) -> Result<PathClaim> {
        let (claim, mut conflicts) = {
            let mut state = lock_state(&self.state);
            if let Some(limit) = self.limit {
                if state.claims.len() >= limit {
                    return Err(LockError::QueueFull { limit });
                }
            }

            let conflicts: Vec<watch::Receiver<()>> = state
                .claims
                .iter()
                .filter(|queued| queued.path.is_related(path))
                .map(|queued| queued.settled.clone())
                .collect();

            let id = state.next_id;
            state.next_id += 1;
            let (signal, settled) = watch::channel(());
            state.claims.push(QueuedClaim {
                id,
                path: path.clone(),
                settled,
            });

            let claim = PathClaim {
                id,
                path: path.clone(),
                state: Arc::clone(&self.state),
                _signal: signal,
            };
            (claim, conflicts)
        };

        debug!(claim = claim.id, %path, waiting_on = conflicts.len(), "claim queued");

        for settled in &mut conflicts {
            // No value is ever sent: `changed` errors once the sender is dropped.
            while settled.changed().await.is_ok() {}
        }

        debug!(claim = claim.id, %path, "claim granted");
        Ok(claim)
    }

    /// Release a claim. Equivalent to dropping it.
    pub fn release(&self, claim: PathClaim) {
        drop(claim);
    }
}

impl Default for PathLockQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PathLockQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathLockQueue")
            .field("pending", &self.len())
            .field("limit", &self.limit)
            .finish()
    }
}

/// Exclusive claim on a path and its whole lineage.
///
/// The claim is released when dropped: it leaves the queue and every claim
/// waiting on it is signalled. This holds on success, on error, on early
/// return and when the owning future is cancelled.
#[must_use = "a claim is released as soon as it is dropped"]
pub struct PathClaim {
    id: u64,
    path: WispPath,
    state: Arc<Mutex<QueueState>>,
    // Dropped after `Drop::drop` removes the queue entry.
    _signal: watch::Sender<()>,
}

impl PathClaim {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn path(&self) -> &WispPath {
        &self.path
    }

    /// Release the claim now.
    pub fn release(self) {}
}

impl Drop for PathClaim {
    fn drop(&mut self) {
        let mut state = lock_state(&self.state);
        state.claims.retain(|queued| queued.id != self.id);
        debug!(claim = self.id, path = %self.path, "claim released");
    }
}

impl std::fmt::Debug for PathClaim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathClaim")
            .field("id", &self.id)
            .field("path", &self.path)
            .finish()
    }
}
