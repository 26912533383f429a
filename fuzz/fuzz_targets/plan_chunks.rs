#![no_main]

use libfuzzer_sys::fuzz_target;
use chunkhash::plan_chunks;

fuzz_target!(|input: (u64, u64)| {
    let (size, chunk_size) = input;

    if chunk_size == 0 {
        assert!(plan_chunks(size, chunk_size).is_err());
        return;
    }
    // Keep the plan small enough to materialize.
    let chunk_size = chunk_size.max(size / 4096 + 1);
    let ranges = plan_chunks(size, chunk_size).unwrap();

    // Verify: at least one chunk, even for an empty file
    assert!(!ranges.is_empty());
    assert_eq!(ranges.len() as u64, size.div_ceil(chunk_size).max(1));

    // Verify: contiguous, indexed, bounded, and covering
    let mut expected_offset = 0u64;
    for (i, range) in ranges.iter().enumerate() {
        assert_eq!(range.index, i);
        assert_eq!(range.offset, expected_offset);
        assert!(range.len <= chunk_size);
        if i + 1 < ranges.len() {
            assert_eq!(range.len, chunk_size);
        }
        expected_offset += range.len;
    }
    assert_eq!(expected_offset, size);
});
