//! Per-wave result collection.
//!
//! Workers write their digest into the slot matching their buffer's position,
//! so the collected order never depends on completion order. A [`WaveTicket`]
//! can be waited on synchronously or awaited as a future.
//!
//! The wave owns the pool's dispatch gate and releases it when its last slot
//! completes. Dropping the ticket early does not free the gate while jobs of
//! the wave are still queued.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use parking_lot::{Condvar, Mutex};

use super::gate::GateToken;
use crate::error::HashError;

type SlotResult = Result<String, HashError>;

struct WaveInner {
    results: Vec<Option<SlotResult>>,
    remaining: usize,
    waker: Option<Waker>,
    token: Option<GateToken>,
}

/// Shared between the submitting side and the workers of one wave.
pub(crate) struct WaveState {
    inner: Mutex<WaveInner>,
    done: Condvar,
}

impl WaveState {
    /// Creates the state for a wave of `len` slots holding `token` until the
    /// last slot completes. An empty wave releases it at once.
    pub(crate) fn new(len: usize, token: GateToken) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(WaveInner {
                results: (0..len).map(|_| None).collect(),
                remaining: len,
                waker: None,
                token: (len > 0).then_some(token),
            }),
            done: Condvar::new(),
        })
    }

    /// Records the outcome for `slot`. Each slot completes exactly once.
    pub(crate) fn complete(&self, slot: usize, result: SlotResult) {
        let (token, waker) = {
            let mut inner = self.inner.lock();
            debug_assert!(inner.results[slot].is_none(), "slot {slot} completed twice");
            inner.results[slot] = Some(result);
            inner.remaining -= 1;

            if inner.remaining > 0 {
                return;
            }
            (inner.token.take(), inner.waker.take())
        };

        // Gate first, so a caller woken below can dispatch right away.
        drop(token);
        self.done.notify_all();
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    fn take_results(inner: &mut WaveInner) -> Result<Vec<String>, HashError> {
        // First failure by slot position wins; the rest of the wave is dropped.
        std::mem::take(&mut inner.results)
            .into_iter()
            .enumerate()
            .map(|(slot, r)| {
                r.unwrap_or_else(|| {
                    Err(HashError::Worker {
                        index: slot,
                        message: "no result recorded".into(),
                    })
                })
            })
            .collect()
    }
}

/// A submitted wave whose digests are not yet collected.
///
/// No other wave and no termination can start on the pool until every
/// worker of this wave has finished, whether or not the ticket is kept.
#[must_use = "a wave ticket does nothing unless waited on or awaited"]
pub struct WaveTicket {
    state: Arc<WaveState>,
}

impl WaveTicket {
    pub(crate) fn new(state: Arc<WaveState>) -> Self {
        Self { state }
    }

    /// Blocks until every worker of the wave has finished.
    ///
    /// Returns the digests in buffer order, or the first failure.
    pub fn wait(self) -> Result<Vec<String>, HashError> {
        let mut inner = self.state.inner.lock();
        while inner.remaining > 0 {
            self.state.done.wait(&mut inner);
        }
        WaveState::take_results(&mut inner)
    }

    /// Returns true if every worker of the wave has finished.
    pub fn is_ready(&self) -> bool {
        self.state.inner.lock().remaining == 0
    }
}

impl Future for WaveTicket {
    type Output = Result<Vec<String>, HashError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut inner = self.state.inner.lock();
        if inner.remaining == 0 {
            return Poll::Ready(WaveState::take_results(&mut inner));
        }
        if !inner.waker.as_ref().is_some_and(|w| w.will_wake(cx.waker())) {
            inner.waker = Some(cx.waker().clone());
        }
        Poll::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::gate::DispatchGate;

    fn wave(len: usize) -> (Arc<DispatchGate>, Arc<WaveState>, WaveTicket) {
        let gate = DispatchGate::new();
        let state = WaveState::new(len, gate.acquire().unwrap());
        let ticket = WaveTicket::new(Arc::clone(&state));
        (gate, state, ticket)
    }

    #[test]
    fn test_results_follow_slot_order() {
        let (_gate, state, t) = wave(3);
        state.complete(2, Ok("c".into()));
        state.complete(0, Ok("a".into()));
        assert!(!t.is_ready());
        state.complete(1, Ok("b".into()));
        assert!(t.is_ready());
        assert_eq!(t.wait().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_any_failure_fails_wave() {
        let (_gate, state, t) = wave(3);
        state.complete(0, Ok("a".into()));
        state.complete(1, Err(HashError::Worker { index: 1, message: "x".into() }));
        state.complete(2, Ok("c".into()));
        assert!(matches!(t.wait(), Err(HashError::Worker { index: 1, .. })));
    }

    #[test]
    fn test_empty_wave_is_ready() {
        let (gate, _state, t) = wave(0);
        assert!(!gate.is_in_flight());
        assert!(t.is_ready());
        assert!(t.wait().unwrap().is_empty());
    }

    #[test]
    fn test_gate_held_until_last_slot() {
        let (gate, state, t) = wave(2);
        drop(t);
        assert!(gate.is_in_flight(), "dropping the ticket must not free the gate");

        state.complete(0, Ok("a".into()));
        assert!(gate.is_in_flight());
        state.complete(1, Ok("b".into()));
        assert!(!gate.is_in_flight());
    }

    #[test]
    fn test_wait_across_threads() {
        let (_gate, state, t) = wave(2);
        let worker = {
            let state = Arc::clone(&state);
            std::thread::spawn(move || {
                state.complete(1, Ok("second".into()));
                state.complete(0, Ok("first".into()));
            })
        };
        assert_eq!(t.wait().unwrap(), vec!["first", "second"]);
        worker.join().unwrap();
    }

    #[test]
    fn test_future_resolves() {
        let (_gate, state, t) = wave(1);
        state.complete(0, Ok("done".into()));
        let out = tokio_test::block_on(t).unwrap();
        assert_eq!(out, vec!["done"]);
    }
}
