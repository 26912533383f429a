//! Dispatch serialisation and the pool's lifecycle flag.
//!
//! At most one wave is in flight per pool. Termination waits for the gate
//! like a dispatch does, so it only ever happens between waves.
//!
//! Blocking callers park on the condvar; async callers register a waker
//! instead, so a task waiting for the gate never blocks its executor.

use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use parking_lot::{Condvar, Mutex};

use crate::error::HashError;

#[derive(Debug, Default)]
struct GateState {
    in_flight: bool,
    terminated: bool,
    wakers: Vec<Waker>,
}

#[derive(Debug, Default)]
pub(crate) struct DispatchGate {
    state: Mutex<GateState>,
    released: Condvar,
}

impl DispatchGate {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Waits for the current wave to finish and claims the gate.
    pub(crate) fn acquire(self: &Arc<Self>) -> Result<GateToken, HashError> {
        let mut state = self.state.lock();
        while state.in_flight {
            self.released.wait(&mut state);
        }
        if state.terminated {
            return Err(HashError::PoolTerminated);
        }
        state.in_flight = true;
        Ok(GateToken {
            gate: Arc::clone(self),
        })
    }

    /// Claims the gate if it is free; otherwise registers `cx`'s waker to be
    /// woken when the current wave releases it.
    pub(crate) fn poll_acquire(self: &Arc<Self>, cx: &mut Context<'_>) -> Poll<Result<GateToken, HashError>> {
        let mut state = self.state.lock();
        if state.in_flight {
            if !state.wakers.iter().any(|w| w.will_wake(cx.waker())) {
                state.wakers.push(cx.waker().clone());
            }
            return Poll::Pending;
        }
        if state.terminated {
            return Poll::Ready(Err(HashError::PoolTerminated));
        }
        state.in_flight = true;
        Poll::Ready(Ok(GateToken {
            gate: Arc::clone(self),
        }))
    }

    /// Waits for the current wave to finish and marks the pool terminated.
    ///
    /// Returns false if it was already terminated.
    pub(crate) fn close(&self) -> bool {
        let mut state = self.state.lock();
        while state.in_flight {
            self.released.wait(&mut state);
        }
        !std::mem::replace(&mut state.terminated, true)
    }

    /// Marks the pool terminated without waiting for an in-flight wave.
    pub(crate) fn close_now(&self) -> bool {
        !std::mem::replace(&mut self.state.lock().terminated, true)
    }

    pub(crate) fn is_terminated(&self) -> bool {
        self.state.lock().terminated
    }

    pub(crate) fn is_in_flight(&self) -> bool {
        self.state.lock().in_flight
    }
}

/// Proof of holding the gate; releases it on drop.
#[derive(Debug)]
pub(crate) struct GateToken {
    gate: Arc<DispatchGate>,
}

impl Drop for GateToken {
    fn drop(&mut self) {
        let wakers = {
            let mut state = self.gate.state.lock();
            state.in_flight = false;
            std::mem::take(&mut state.wakers)
        };
        self.gate.released.notify_all();
        for waker in wakers {
            waker.wake();
        }
    }
}
