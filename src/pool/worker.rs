//! A single worker thread and its job queue.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use bytes::Bytes;
use tracing::{trace, warn};

use super::wave::WaveState;
use crate::error::HashError;
use crate::hash::{Algorithm, Digester};

/// Whether a worker slot is currently hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Waiting for a job.
    Idle,
    /// Hashing a buffer.
    Busy,
}

pub(crate) struct Job {
    pub(crate) buffer: Bytes,
    pub(crate) algorithm: Algorithm,
    pub(crate) slot: usize,
    pub(crate) wave: Arc<WaveState>,
}

pub(crate) struct WorkerSlot {
    id: usize,
    sender: Option<Sender<Job>>,
    handle: Option<JoinHandle<()>>,
    busy: Arc<AtomicBool>,
}

impl WorkerSlot {
    pub(crate) fn spawn(id: usize, digester: Arc<dyn Digester>) -> std::io::Result<Self> {
        let (sender, receiver) = mpsc::channel::<Job>();
        let busy = Arc::new(AtomicBool::new(false));

        let handle = thread::Builder::new()
            .name(format!("chunkhash-worker-{id}"))
            .spawn({
                let busy = Arc::clone(&busy);
                move || {
                    for job in receiver {
                        busy.store(true, Ordering::Release);
                        let (wave, slot, result) = run_job(id, digester.as_ref(), job);
                        busy.store(false, Ordering::Release);
                        wave.complete(slot, result);
                    }
                    trace!(worker = id, "worker exiting");
                }
            })?;

        Ok(Self {
            id,
            sender: Some(sender),
            handle: Some(handle),
            busy,
        })
    }

    /// Queues a job. Hands the job back if the worker is gone.
    pub(crate) fn send(&self, job: Job) -> Result<(), Job> {
        match &self.sender {
            Some(sender) => sender.send(job).map_err(|e| e.0),
            None => Err(job),
        }
    }

    pub(crate) fn state(&self) -> SlotState {
        if self.busy.load(Ordering::Acquire) {
            SlotState::Busy
        } else {
            SlotState::Idle
        }
    }

    /// Closes the queue; the worker finishes what is queued and exits.
    pub(crate) fn close(&mut self) {
        self.sender = None;
    }

    pub(crate) fn join(&mut self) {
        self.close();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!(worker = self.id, "worker thread panicked outside a job");
            }
        }
    }
}

fn run_job(
    worker: usize,
    digester: &dyn Digester,
    job: Job,
) -> (Arc<WaveState>, usize, Result<String, HashError>) {
    let Job {
        buffer,
        algorithm,
        slot,
        wave,
    } = job;
    trace!(worker, slot, len = buffer.len(), %algorithm, "hashing chunk");

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| digester.digest(algorithm, &buffer)));
    // Released before the wave can complete.
    drop(buffer);

    let result = match outcome {
        Ok(Ok(digest)) => Ok(digest),
        Ok(Err(e)) => {
            warn!(worker, slot, error = %e, "digest failed");
            Err(HashError::Worker {
                index: slot,
                message: e.to_string(),
            })
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(worker, slot, %message, "digest panicked");
            Err(HashError::Worker {
                index: slot,
                message: format!("panicked: {message}"),
            })
        }
    };
    (wave, slot, result)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
