//! Single-flight coordination of token refreshes.
//!
//! The first request to see a 401 becomes the leader and performs the
//! refresh. Requests that see a 401 while a refresh is in flight park on a
//! oneshot channel and are released together when the leader settles.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tracing::debug;

use checkin_core::error::AuthError;

/// Outcome shared with every waiter of a refresh.
pub(crate) type RefreshOutcome = Result<(), AuthError>;

#[derive(Default)]
struct RefreshState {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

/// Per-client refresh state: the in-flight flag and the pending queue.
///
/// The mutex is only held to check-and-set the flag or to drain the queue,
/// never across an await.
#[derive(Default)]
pub(crate) struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

/// What a caller must do after joining the coordinator.
pub(crate) enum Ticket<'a> {
    /// No refresh was in flight; the caller performs it.
    Leader(LeaderGuard<'a>),
    /// A refresh is in flight; await its outcome.
    Waiter(oneshot::Receiver<RefreshOutcome>),
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Become the leader of a new refresh, or queue behind the current one.
    pub fn join(&self) -> Ticket<'_> {
        let mut state = self.lock();
        if state.in_flight {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            debug!(queued = state.waiters.len(), "Queued behind in-flight refresh");
            Ticket::Waiter(rx)
        } else {
            state.in_flight = true;
            Ticket::Leader(LeaderGuard {
                coordinator: self,
                settled: false,
            })
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.lock().in_flight
    }

    /// Clear the flag and release every waiter with `outcome`.
    fn settle(&self, outcome: RefreshOutcome) -> usize {
        let waiters = {
            let mut state = self.lock();
            state.in_flight = false;
            std::mem::take(&mut state.waiters)
        };

        let released = waiters.len();
        for waiter in waiters {
            // A waiter whose caller was dropped has nobody to notify.
            let _ = waiter.send(outcome.clone());
        }
        released
    }

    fn lock(&self) -> MutexGuard<'_, RefreshState> {
        // The state is two plain fields; a panic elsewhere cannot leave it torn.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Held by the leader while it refreshes. Settling is mandatory: dropping
/// an unsettled guard releases the waiters with
/// [`AuthError::RefreshAbandoned`] so the coordinator is never left in flight.
pub(crate) struct LeaderGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl LeaderGuard<'_> {
    /// Publish the refresh outcome. Returns how many waiters were released.
    pub fn finish(mut self, outcome: RefreshOutcome) -> usize {
        self.settled = true;
        self.coordinator.settle(outcome)
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.coordinator.settle(Err(AuthError::RefreshAbandoned));
        }
    }
}

/// Wait for the leader's outcome.
pub(crate) async fn wait(rx: oneshot::Receiver<RefreshOutcome>) -> RefreshOutcome {
    match rx.await {
        Ok(outcome) => outcome,
        Err(_) => Err(AuthError::RefreshAbandoned),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_leader(ticket: Ticket<'_>) -> LeaderGuard<'_> {
        match ticket {
            Ticket::Leader(guard) => guard,
            Ticket::Waiter(_) => panic!("expected to lead the refresh"),
        }
    }

    fn expect_waiter(ticket: Ticket<'_>) -> oneshot::Receiver<RefreshOutcome> {
        match ticket {
            Ticket::Waiter(rx) => rx,
            Ticket::Leader(_) => panic!("expected to wait for the refresh"),
        }
    }

    #[tokio::test]
    async fn only_first_joiner_leads() {
        let coordinator = RefreshCoordinator::new();
        let leader = expect_leader(coordinator.join());
        assert!(coordinator.is_in_flight());

        let a = expect_waiter(coordinator.join());
        let b = expect_waiter(coordinator.join());

        assert_eq!(leader.finish(Ok(())), 2);
        assert!(!coordinator.is_in_flight());
        assert!(wait(a).await.is_ok());
        assert!(wait(b).await.is_ok());
    }

    #[tokio::test]
    async fn failure_reaches_every_waiter() {
        let coordinator = RefreshCoordinator::new();
        let leader = expect_leader(coordinator.join());
        let waiters: Vec<_> = (0..3).map(|_| expect_waiter(coordinator.join())).collect();

        leader.finish(Err(AuthError::RefreshFailed {
            status: Some(401),
            message: "Invalid refresh token".into(),
        }));

        for rx in waiters {
            match wait(rx).await {
                Err(AuthError::RefreshFailed { status, .. }) => assert_eq!(status, Some(401)),
                other => panic!("unexpected outcome: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn dropped_leader_releases_waiters() {
        let coordinator = RefreshCoordinator::new();
        let leader = expect_leader(coordinator.join());
        let rx = expect_waiter(coordinator.join());

        drop(leader);

        assert!(!coordinator.is_in_flight());
        assert!(matches!(wait(rx).await, Err(AuthError::RefreshAbandoned)));
    }

    #[tokio::test]
    async fn next_refresh_starts_fresh_after_settle() {
        let coordinator = RefreshCoordinator::new();
        expect_leader(coordinator.join()).finish(Ok(()));
        let second = expect_leader(coordinator.join());
        assert_eq!(second.finish(Ok(())), 0);
    }

    #[tokio::test]
    async fn dropped_waiter_does_not_block_settle() {
        let coordinator = RefreshCoordinator::new();
        let leader = expect_leader(coordinator.join());
        drop(expect_waiter(coordinator.join()));
        let kept = expect_waiter(coordinator.join());

        assert_eq!(leader.finish(Ok(())), 2);
        assert!(wait(kept).await.is_ok());
    }
}
