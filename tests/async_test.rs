// Integration tests for the async front end (feature = "async-io")
// Tests cover: parity with the sync path, tokio files, pool lifecycle,
// concurrent invocations

#![cfg(feature = "async-io")]

use std::sync::Arc;
use std::time::Duration;

use chunkhash::{
    Algorithm, Digester, ExecutionContext, FileHasher, FileMetadata, HashConfig, HashError,
    HashParams, MemoryFile, PoolHandle, StandardDigester, Strategy, hash_file_chunks,
};
use futures_util::FutureExt;
use futures_util::io::Cursor;
use tokio_util::compat::TokioAsyncReadCompatExt;

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 131 % 241) as u8).collect()
}

struct SlowDigester;

impl Digester for SlowDigester {
    fn digest(&self, algorithm: Algorithm, data: &[u8]) -> Result<String, HashError> {
        std::thread::sleep(Duration::from_millis(50));
        StandardDigester.digest(algorithm, data)
    }
}

#[tokio::test]
async fn test_tokio_file_matches_sync_path() {
    let data = pattern(2 * 1024 * 1024 + 5);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("async.bin");
    std::fs::write(&path, &data).unwrap();

    let pool = PoolHandle::new(2);
    let sync = hash_file_chunks(
        HashParams::default().path(&path).chunk_size_mb(1).max_workers(2),
        ExecutionContext::Filesystem,
        &pool,
    )
    .unwrap();

    let config = HashConfig::default().with_chunk_size_mb(1).with_max_workers(2);
    let file = tokio::fs::File::open(&path).await.unwrap();
    let out = FileHasher::new(config, pool.clone())
        .hash_async(file.compat(), sync.metadata.clone())
        .await
        .unwrap();

    assert_eq!(out.len(), 3);
    assert_eq!(out.chunk_hashes, sync.chunk_hashes);
    assert_eq!(out.root_hash, sync.root_hash);
    assert_eq!(out.metadata, sync.metadata);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cursor_many_waves() {
    let data = pattern(4000);
    let config = HashConfig::default()
        .with_chunk_size_bytes(50)
        .with_max_workers(4)
        .with_strategy(Strategy::Fast)
        .with_close_immediately(false);
    let pool = PoolHandle::new(4);
    let hasher = FileHasher::new(config, pool.clone());

    let sync = hasher.hash(&MemoryFile::new("c", data.clone())).unwrap();
    let out = hasher
        .hash_async(Cursor::new(data), FileMetadata::default())
        .await
        .unwrap();

    assert_eq!(out.len(), 80);
    assert_eq!(out.chunk_hashes, sync.chunk_hashes);
    assert_eq!(pool.generation(), 1, "both paths share the kept-open pool");
    assert!(pool.is_active());
}

#[tokio::test]
async fn test_invalid_config_rejected() {
    let hasher = FileHasher::new(HashConfig::default().with_max_workers(0), PoolHandle::new(2));
    let result = hasher
        .hash_async(Cursor::new(pattern(10)), FileMetadata::default())
        .await;
    assert!(matches!(result, Err(HashError::InvalidConfig { .. })));
}

#[tokio::test]
async fn test_empty_reader() {
    let hasher = FileHasher::new(HashConfig::default(), PoolHandle::new(2));
    let out = hasher
        .hash_async(Cursor::new(Vec::new()), FileMetadata::default())
        .await
        .unwrap();

    assert_eq!(out.len(), 1);
    assert_eq!(out.chunk_hashes, vec!["d41d8cd98f00b204e9800998ecf8427e"]);
}

// ============================================================================
// Concurrency Tests
// ============================================================================

#[tokio::test]
async fn test_concurrent_hash_async_on_one_task() {
    let config = HashConfig::default().with_chunk_size_bytes(10).with_max_workers(2);
    let pool = PoolHandle::new(2);
    let hasher = FileHasher::new(config, pool.clone());
    let expected = FileHasher::new(config, PoolHandle::new(2))
        .hash(&MemoryFile::new("a", pattern(100)))
        .unwrap();

    let (a, b) = tokio::join!(
        hasher.hash_async(Cursor::new(pattern(100)), FileMetadata::default()),
        hasher.hash_async(Cursor::new(pattern(100)), FileMetadata::default()),
    );

    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(a.len(), 10);
    assert_eq!(a.chunk_hashes, expected.chunk_hashes);
    assert_eq!(b.chunk_hashes, expected.chunk_hashes);
    assert_eq!(a.root_hash, b.root_hash);
    assert!(!pool.is_active());
}

#[test]
fn test_dropped_invocation_still_closes_pool() {
    let pool = PoolHandle::with_digester(2, Arc::new(SlowDigester));
    let config = HashConfig::default().with_chunk_size_bytes(10).with_max_workers(2);
    let hasher = FileHasher::new(config, pool.clone());

    let pending = hasher
        .hash_async(Cursor::new(pattern(60)), FileMetadata::default())
        .now_or_never();
    assert!(pending.is_none(), "first wave is still hashing");

    assert_eq!(pool.generation(), 1);
    assert!(!pool.is_active());

    // The handle recovers for the next invocation.
    let out = FileHasher::new(config.with_close_immediately(false), pool.clone())
        .hash(&MemoryFile::new("b", pattern(60)))
        .unwrap();
    assert_eq!(out.len(), 6);
    assert_eq!(pool.generation(), 2);
}
