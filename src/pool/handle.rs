//! Caller-owned handle to a lazily created worker pool.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::debug;

use super::WorkerPool;
use crate::config::DEFAULT_MAX_WORKERS;
use crate::error::HashError;
use crate::hash::{Algorithm, Digester, StandardDigester};

#[derive(Default)]
struct HandleState {
    pool: Option<Arc<WorkerPool>>,
    /// Invocations currently holding a [`PoolLease`].
    active: usize,
    /// Some finished invocation asked for the pool to be closed.
    close_pending: bool,
}

struct HandleInner {
    capacity: usize,
    digester: Arc<dyn Digester>,
    state: Mutex<HandleState>,
    generation: AtomicU64,
}

/// A shareable handle owning at most one live [`WorkerPool`].
///
/// The pool is created on first use and reused by every invocation that goes
/// through this handle (or its clones) until [`PoolHandle::terminate`] is
/// called. The next use after that creates a fresh pool; this lazy path is
/// the only place pools are created.
///
/// Invocations sharing a handle run concurrently and serialise at the
/// wave boundary. A `close_immediately` request is carried out when the last
/// invocation using the pool finishes, so one invocation never closes the
/// pool under another.
///
/// # Example
///
/// ```
/// use chunkhash::PoolHandle;
///
/// let handle = PoolHandle::new(4);
/// assert!(!handle.is_active());
///
/// let pool = handle.get_or_create()?;
/// assert_eq!(pool.capacity(), 4);
/// assert_eq!(handle.generation(), 1);
///
/// handle.terminate();
/// assert!(!handle.is_active());
/// # Ok::<(), chunkhash::HashError>(())
/// ```
#[derive(Clone)]
pub struct PoolHandle {
    inner: Arc<HandleInner>,
}

impl PoolHandle {
    /// Creates a handle whose pool will have `capacity` workers running the
    /// [`StandardDigester`].
    pub fn new(capacity: usize) -> Self {
        Self::with_digester(capacity, Arc::new(StandardDigester))
    }

    /// Creates a handle whose pool workers run `digester`.
    pub fn with_digester(capacity: usize, digester: Arc<dyn Digester>) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                capacity,
                digester,
                state: Mutex::new(HandleState::default()),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Worker count of pools created by this handle.
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// The digester used by the pool and by the single-chunk path.
    pub fn digester(&self) -> &Arc<dyn Digester> {
        &self.inner.digester
    }

    /// Number of pools this handle has created so far.
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }

    /// Returns true if a pool currently exists.
    pub fn is_active(&self) -> bool {
        self.inner.state.lock().pool.as_ref().is_some_and(|p| !p.is_terminated())
    }

    /// Returns the live pool, if any, without creating one.
    pub fn current(&self) -> Option<Arc<WorkerPool>> {
        self.inner.state.lock().pool.clone()
    }

    /// Returns the live pool, creating it first if there is none.
    ///
    /// Creation happens under the handle's lock, so concurrent callers never
    /// race to build two pools. A pool found terminated is replaced.
    pub fn get_or_create(&self) -> Result<Arc<WorkerPool>, HashError> {
        let mut state = self.inner.state.lock();
        if let Some(pool) = state.pool.as_ref().filter(|p| !p.is_terminated()) {
            return Ok(Arc::clone(pool));
        }

        let pool = Arc::new(WorkerPool::with_digester(
            self.inner.capacity,
            Arc::clone(&self.inner.digester),
        )?);
        let generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(capacity = self.inner.capacity, generation, "created worker pool");

        state.pool = Some(Arc::clone(&pool));
        Ok(pool)
    }

    /// Tears down the live pool, if any.
    ///
    /// An in-flight wave finishes first. The next [`PoolHandle::get_or_create`]
    /// builds a new pool.
    pub fn terminate(&self) {
        // Taken out under the lock, terminated outside it so other callers
        // are not blocked on the in-flight wave.
        let pool = self.inner.state.lock().pool.take();
        if let Some(pool) = pool {
            pool.terminate();
        }
    }

    /// Registers one invocation. Dropping the lease ends it.
    pub(crate) fn lease(&self, close_when_done: bool) -> PoolLease {
        self.inner.state.lock().active += 1;
        PoolLease {
            handle: self.clone(),
            close_when_done,
        }
    }

    fn end_lease(&self, close: bool) {
        let pool = {
            let mut state = self.inner.state.lock();
            state.active -= 1;
            state.close_pending |= close;
            if state.active > 0 || !state.close_pending {
                return;
            }
            state.close_pending = false;
            state.pool.take()
        };

        if let Some(pool) = pool {
            debug!("closing worker pool after last invocation");
            pool.terminate();
        }
    }
}

/// One invocation's use of a [`PoolHandle`].
///
/// Waves go through the lease so a pool terminated between lookup and
/// dispatch is replaced instead of failing the invocation. On drop, the pool
/// is closed if this or an earlier lease asked for it and no other
/// invocation is still running; this also runs when an async invocation is
/// dropped midway.
pub(crate) struct PoolLease {
    handle: PoolHandle,
    close_when_done: bool,
}

impl PoolLease {
    /// Hashes one wave and waits for its digests.
    pub(crate) fn dispatch(&self, buffers: Vec<Bytes>, algorithm: Algorithm) -> Result<Vec<String>, HashError> {
        let mut retried = false;
        loop {
            let pool = self.handle.get_or_create()?;
            pool.check_wave(buffers.len())?;
            match pool.acquire() {
                Ok(token) => return pool.start_wave(token, buffers, algorithm).wait(),
                Err(HashError::PoolTerminated) if !retried => {
                    debug!("pool terminated before dispatch, retrying");
                    retried = true;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Submits one wave, yielding while another wave holds the pool.
    #[cfg(feature = "async-io")]
    pub(crate) async fn submit_async(
        &self,
        buffers: Vec<Bytes>,
        algorithm: Algorithm,
    ) -> Result<super::WaveTicket, HashError> {
        let mut retried = false;
        loop {
            let pool = self.handle.get_or_create()?;
            pool.check_wave(buffers.len())?;
            match pool.acquire_async().await {
                Ok(token) => return Ok(pool.start_wave(token, buffers, algorithm)),
                Err(HashError::PoolTerminated) if !retried => {
                    debug!("pool terminated before dispatch, retrying");
                    retried = true;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Drop for PoolLease {
    fn drop(&mut self) {
        self.handle.end_lease(self.close_when_done);
    }
}

impl Default for PoolHandle {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WORKERS)
    }
}

impl std::fmt::Debug for PoolHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolHandle")
            .field("capacity", &self.inner.capacity)
            .field("generation", &self.generation())
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_creation() {
        let handle = PoolHandle::new(2);
        assert!(!handle.is_active());
        assert!(handle.current().is_none());
        assert_eq!(handle.generation(), 0);

        let pool = handle.get_or_create().unwrap();
        assert!(handle.is_active());
        assert_eq!(pool.capacity(), 2);
        assert_eq!(handle.generation(), 1);
    }

    #[test]
    fn test_reuse() {
        let handle = PoolHandle::new(2);
        let a = handle.get_or_create().unwrap();
        let b = handle.clone().get_or_create().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(handle.generation(), 1);
    }

    #[test]
    fn test_terminate_then_recreate() {
        let handle = PoolHandle::new(2);
        let first = handle.get_or_create().unwrap();
        handle.terminate();
        assert!(first.is_terminated());
        assert!(!handle.is_active());

        let second = handle.get_or_create().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(handle.generation(), 2);
    }

    #[test]
    fn test_zero_capacity_fails_on_use() {
        let handle = PoolHandle::new(0);
        assert!(handle.get_or_create().is_err());
        assert_eq!(handle.generation(), 0);
    }

    #[test]
    fn test_concurrent_creation_builds_one_pool() {
        let handle = PoolHandle::new(2);
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let handle = handle.clone();
                std::thread::spawn(move || handle.get_or_create().unwrap())
            })
            .collect();
        let pools: Vec<_> = threads.into_iter().map(|t| t.join().unwrap()).collect();

        assert_eq!(handle.generation(), 1);
        assert!(pools.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn test_terminated_pool_replaced_on_lookup() {
        let handle = PoolHandle::new(2);
        let first = handle.get_or_create().unwrap();
        first.terminate();

        let second = handle.get_or_create().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(handle.generation(), 2);
    }

    #[test]
    fn test_close_waits_for_last_lease() {
        let handle = PoolHandle::new(2);
        let a = handle.lease(true);
        let b = handle.lease(false);
        a.dispatch(vec![Bytes::from_static(b"x")], Algorithm::Crc32).unwrap();

        drop(a);
        assert!(handle.is_active(), "b is still running");
        b.dispatch(vec![Bytes::from_static(b"y")], Algorithm::Crc32).unwrap();

        drop(b);
        assert!(!handle.is_active());
        assert_eq!(handle.generation(), 1);
    }

    #[test]
    fn test_lease_without_close_keeps_pool() {
        let handle = PoolHandle::new(1);
        let lease = handle.lease(false);
        lease.dispatch(vec![Bytes::from_static(b"x")], Algorithm::Md5).unwrap();
        drop(lease);
        assert!(handle.is_active());
    }

    #[test]
    fn test_lease_dispatches_after_terminate() {
        let handle = PoolHandle::new(2);
        let lease = handle.lease(false);
        let stale = handle.get_or_create().unwrap();
        stale.terminate();

        let digests = lease
            .dispatch(vec![Bytes::from_static(b"hello world")], Algorithm::Crc32)
            .unwrap();
        assert_eq!(digests, vec!["0d4a1185"]);
        assert_eq!(handle.generation(), 2);
    }
}
