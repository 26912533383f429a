#![no_main]

use libfuzzer_sys::fuzz_target;
use chunkhash::{FileHasher, HashConfig, MemoryFile, PoolHandle, StandardDigester, Strategy, merkle_root};

fuzz_target!(|input: (u8, Vec<u8>)| {
    let (chunk_size, data) = input;
    let chunk_size = u64::from(chunk_size.max(1));

    let config = HashConfig::default()
        .with_chunk_size_bytes(chunk_size)
        .with_max_workers(3)
        .with_strategy(Strategy::Fast)
        .with_close_immediately(false);
    let out = FileHasher::new(config, PoolHandle::new(3))
        .hash(&MemoryFile::new("fuzz", data.clone()))
        .unwrap();

    // Verify: digests equal a direct sequential computation
    if out.len() > 1 {
        let expected: Vec<String> = data
            .chunks(chunk_size as usize)
            .map(StandardDigester::crc32_hex)
            .collect();
        assert_eq!(out.chunk_hashes, expected);
    }
    assert_eq!(out.root_hash, merkle_root(&out.chunk_hashes));
});
