//! Fixed-capacity worker pool.
//!
//! - [`WorkerPool`] - `N` worker threads hashing one wave of buffers at a time
//! - [`PoolHandle`] - Shared, lazily-created pool owned by the caller
//! - [`WaveTicket`] - A submitted wave, waited on or awaited
//!
//! Buffer `i` of a wave always goes to worker `i` and its digest always lands
//! in position `i` of the result, so the output order is the input order no
//! matter which worker finishes first.

mod gate;
mod handle;
mod wave;
mod worker;

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::HashError;
use crate::hash::{Algorithm, Digester, StandardDigester};

use gate::{DispatchGate, GateToken};
use wave::WaveState;
use worker::{Job, WorkerSlot};

pub(crate) use handle::PoolLease;
pub use handle::PoolHandle;
pub use wave::WaveTicket;
pub use worker::SlotState;

/// A fixed set of worker threads.
///
/// Lifecycle: active from construction until [`WorkerPool::terminate`] (or
/// drop); terminated is final. Dispatching on a terminated pool returns
/// [`HashError::PoolTerminated`].
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use chunkhash::{Algorithm, WorkerPool};
///
/// let pool = WorkerPool::new(2)?;
/// let digests = pool.dispatch(
///     vec![Bytes::from_static(b"hello"), Bytes::from_static(b"world")],
///     Algorithm::Crc32,
/// )?;
/// assert_eq!(digests.len(), 2);
/// pool.terminate();
/// # Ok::<(), chunkhash::HashError>(())
/// ```
pub struct WorkerPool {
    slots: Mutex<Vec<WorkerSlot>>,
    gate: Arc<DispatchGate>,
    digester: Arc<dyn Digester>,
    capacity: usize,
}

impl WorkerPool {
    /// Spawns `capacity` workers using the [`StandardDigester`].
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidConfig`] for a zero capacity and
    /// [`HashError::Io`] if a thread cannot be spawned.
    pub fn new(capacity: usize) -> Result<Self, HashError> {
        Self::with_digester(capacity, Arc::new(StandardDigester))
    }

    /// Spawns `capacity` workers sharing `digester`.
    pub fn with_digester(capacity: usize, digester: Arc<dyn Digester>) -> Result<Self, HashError> {
        if capacity == 0 {
            return Err(HashError::InvalidConfig {
                message: "worker count must be non-zero",
            });
        }

        let slots = (0..capacity)
            .map(|id| WorkerSlot::spawn(id, Arc::clone(&digester)))
            .collect::<std::io::Result<Vec<_>>>()?;
        debug!(capacity, "worker pool started");

        Ok(Self {
            slots: Mutex::new(slots),
            gate: DispatchGate::new(),
            digester,
            capacity,
        })
    }

    /// Number of workers.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The digester the workers run.
    pub fn digester(&self) -> &Arc<dyn Digester> {
        &self.digester
    }

    /// Returns true once the pool has been terminated.
    pub fn is_terminated(&self) -> bool {
        self.gate.is_terminated()
    }

    /// Current state of every worker slot.
    pub fn slot_states(&self) -> Vec<SlotState> {
        self.slots.lock().iter().map(WorkerSlot::state).collect()
    }

    /// Hashes `buffers` in parallel and returns their digests in input order.
    ///
    /// Blocks until the whole wave is done. If another wave is in flight on
    /// this pool, waits for it first.
    ///
    /// # Errors
    ///
    /// - [`HashError::InvalidConfig`] if there are more buffers than workers
    /// - [`HashError::PoolTerminated`] if the pool has been terminated
    /// - [`HashError::Worker`] if any digest fails; no digests are returned
    pub fn dispatch(&self, buffers: Vec<Bytes>, algorithm: Algorithm) -> Result<Vec<String>, HashError> {
        self.submit(buffers, algorithm)?.wait()
    }

    /// Starts hashing `buffers` and returns a ticket for the results.
    ///
    /// Blocks while another wave is in flight. The pool accepts no other
    /// wave until every worker of this one has finished. Errors are the same
    /// as [`WorkerPool::dispatch`].
    pub fn submit(&self, buffers: Vec<Bytes>, algorithm: Algorithm) -> Result<WaveTicket, HashError> {
        self.check_wave(buffers.len())?;
        let token = self.gate.acquire()?;
        Ok(self.start_wave(token, buffers, algorithm))
    }

    /// Async counterpart of [`WorkerPool::submit`].
    ///
    /// Waiting for an in-flight wave yields to the executor instead of
    /// blocking the thread.
    pub async fn submit_async(
        &self,
        buffers: Vec<Bytes>,
        algorithm: Algorithm,
    ) -> Result<WaveTicket, HashError> {
        self.check_wave(buffers.len())?;
        let token = self.acquire_async().await?;
        Ok(self.start_wave(token, buffers, algorithm))
    }

    pub(crate) fn check_wave(&self, len: usize) -> Result<(), HashError> {
        if len > self.capacity {
            return Err(HashError::InvalidConfig {
                message: "wave is larger than the worker pool",
            });
        }
        Ok(())
    }

    pub(crate) fn acquire(&self) -> Result<GateToken, HashError> {
        self.gate.acquire()
    }

    pub(crate) async fn acquire_async(&self) -> Result<GateToken, HashError> {
        std::future::poll_fn(|cx| self.gate.poll_acquire(cx)).await
    }

    /// Sends buffer `i` to worker `i`. `token` is held by the wave until its
    /// last slot completes.
    pub(crate) fn start_wave(&self, token: GateToken, buffers: Vec<Bytes>, algorithm: Algorithm) -> WaveTicket {
        let wave = WaveState::new(buffers.len(), token);
        debug!(len = buffers.len(), %algorithm, "dispatching wave");

        let slots = self.slots.lock();
        for (slot, buffer) in buffers.into_iter().enumerate() {
            let job = Job {
                buffer,
                algorithm,
                slot,
                wave: Arc::clone(&wave),
            };
            if let Err(job) = slots[slot].send(job) {
                job.wave.complete(
                    slot,
                    Err(HashError::Worker {
                        index: slot,
                        message: "worker thread is gone".into(),
                    }),
                );
            }
        }

        WaveTicket::new(wave)
    }

    /// Stops every worker and joins its thread.
    ///
    /// Waits for an in-flight wave to finish first; waves are never
    /// cancelled midway. Calling it again is a no-op.
    pub fn terminate(&self) {
        if self.gate.close() {
            self.shutdown();
        }
    }

    fn shutdown(&self) {
        let mut slots = self.slots.lock();
        for slot in slots.iter_mut() {
            slot.close();
        }
        for slot in slots.iter_mut() {
            slot.join();
        }
        debug!(capacity = self.capacity, "worker pool terminated");
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("capacity", &self.capacity)
            .field("terminated", &self.is_terminated())
            .finish()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Queued jobs still run: closing a queue lets its worker drain it.
        if self.gate.close_now() {
            self.shutdown();
        }
    }
}
