// Integration tests for the worker pool
// Tests cover: result ordering, failure isolation, termination, concurrent use

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use bytes::Bytes;
use chunkhash::{Algorithm, Digester, HashError, PoolHandle, StandardDigester, WorkerPool};

/// Sleeps longer for buffers with a smaller first byte, so earlier slots
/// finish last.
struct SlowDigester;

impl Digester for SlowDigester {
    fn digest(&self, algorithm: Algorithm, data: &[u8]) -> Result<String, HashError> {
        let rank = data.first().copied().unwrap_or(0) as u64;
        thread::sleep(Duration::from_millis(80u64.saturating_sub(rank * 20)));
        StandardDigester.digest(algorithm, data)
    }
}

/// Panics on buffers starting with 0xEE.
struct PanickyDigester;

impl Digester for PanickyDigester {
    fn digest(&self, algorithm: Algorithm, data: &[u8]) -> Result<String, HashError> {
        if data.first() == Some(&0xEE) {
            panic!("bad chunk");
        }
        StandardDigester.digest(algorithm, data)
    }
}

fn buffers(firsts: &[u8]) -> Vec<Bytes> {
    firsts
        .iter()
        .map(|&b| {
            let mut v = vec![b; 64];
            v[1] = b.wrapping_add(1);
            Bytes::from(v)
        })
        .collect()
}

// ============================================================================
// Ordering Tests
// ============================================================================

#[test]
fn test_results_follow_input_order() {
    let pool = WorkerPool::with_digester(4, Arc::new(SlowDigester)).unwrap();
    let input = buffers(&[0, 1, 2, 3]);
    let expected: Vec<String> = input.iter().map(|b| StandardDigester::crc32_hex(b)).collect();

    let digests = pool.dispatch(input, Algorithm::Crc32).unwrap();
    assert_eq!(digests, expected, "completion order must not leak into results");
}

#[test]
fn test_wave_runs_in_parallel() {
    let pool = WorkerPool::with_digester(4, Arc::new(SlowDigester)).unwrap();
    let start = Instant::now();
    pool.dispatch(buffers(&[0, 0, 0, 0]), Algorithm::Md5).unwrap();

    // Four 80ms digests on four workers take far less than 320ms.
    assert!(start.elapsed() < Duration::from_millis(300));
}

#[test]
fn test_oversized_wave_rejected() {
    let pool = WorkerPool::new(2).unwrap();
    let result = pool.dispatch(buffers(&[1, 2, 3]), Algorithm::Crc32);
    assert!(matches!(result, Err(HashError::InvalidConfig { .. })));
}

#[test]
fn test_empty_wave() {
    let pool = WorkerPool::new(2).unwrap();
    assert!(pool.dispatch(Vec::new(), Algorithm::Md5).unwrap().is_empty());
}

// ============================================================================
// Failure Tests
// ============================================================================

#[test]
fn test_panic_becomes_worker_error() {
    let pool = WorkerPool::with_digester(3, Arc::new(PanickyDigester)).unwrap();

    let err = pool
        .dispatch(buffers(&[1, 0xEE, 2]), Algorithm::Md5)
        .unwrap_err();
    assert!(matches!(err, HashError::Worker { index: 1, .. }), "got {err:?}");

    // Every worker is still alive afterwards.
    let digests = pool.dispatch(buffers(&[4, 5, 6]), Algorithm::Md5).unwrap();
    assert_eq!(digests.len(), 3);
}

#[test]
fn test_first_failure_by_slot_wins() {
    let pool = WorkerPool::with_digester(4, Arc::new(PanickyDigester)).unwrap();
    let err = pool
        .dispatch(buffers(&[1, 2, 0xEE, 0xEE]), Algorithm::Crc32)
        .unwrap_err();
    assert!(matches!(err, HashError::Worker { index: 2, .. }));
}

// ============================================================================
// Termination Tests
// ============================================================================

#[test]
fn test_dispatch_after_terminate_fails() {
    let pool = WorkerPool::new(2).unwrap();
    pool.terminate();
    pool.terminate();

    assert!(pool.is_terminated());
    assert!(matches!(
        pool.dispatch(buffers(&[1]), Algorithm::Md5),
        Err(HashError::PoolTerminated)
    ));
}

#[test]
fn test_terminate_waits_for_in_flight_wave() {
    let pool = Arc::new(WorkerPool::with_digester(2, Arc::new(SlowDigester)).unwrap());
    let ticket = pool.submit(buffers(&[0, 0]), Algorithm::Md5).unwrap();

    let terminator = {
        let pool = Arc::clone(&pool);
        thread::spawn(move || pool.terminate())
    };
    thread::sleep(Duration::from_millis(20));
    assert!(!pool.is_terminated(), "termination must not cut a wave short");

    let digests = ticket.wait().unwrap();
    terminator.join().unwrap();

    assert_eq!(digests.len(), 2);
    assert!(pool.is_terminated());
}

#[test]
fn test_handle_terminate_then_recreate() {
    let handle = PoolHandle::new(2);
    let first = handle.get_or_create().unwrap();
    handle.terminate();
    assert!(first.is_terminated());

    let second = handle.get_or_create().unwrap();
    assert!(!second.is_terminated());
    assert_eq!(handle.generation(), 2);
    assert_eq!(second.dispatch(buffers(&[9]), Algorithm::Crc32).unwrap().len(), 1);
}

// ============================================================================
// Concurrency Tests
// ============================================================================

#[test]
fn test_concurrent_dispatch_is_serialized() {
    let pool = Arc::new(WorkerPool::new(3).unwrap());

    let workers: Vec<_> = (0..6u8)
        .map(|t| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                let input = buffers(&[t, t + 10, t + 20]);
                let expected: Vec<String> =
                    input.iter().map(|b| StandardDigester::md5_hex(b)).collect();
                for _ in 0..10 {
                    let got = pool.dispatch(input.clone(), Algorithm::Md5).unwrap();
                    assert_eq!(got, expected);
                }
            })
        })
        .collect();

    for w in workers {
        w.join().unwrap();
    }
}
