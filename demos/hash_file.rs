//! Hashes a file from the command line.
//!
//! Run with:
//!     RUST_LOG=chunkhash=debug cargo run --example hash_file -- <path> [chunk-mb] [strategy]

use chunkhash::{ExecutionContext, HashError, HashParams, PoolHandle, Strategy, hash_file_chunks};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), HashError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: hash_file <path> [chunk-mb] [fast|strong|mixed]");
        std::process::exit(2);
    };

    let mut params = HashParams::default().path(path);
    if let Some(mb) = args.next() {
        let mb = mb.parse().map_err(|_| HashError::InvalidConfig {
            message: "chunk size must be a number of MiB",
        })?;
        params = params.chunk_size_mb(mb);
    }
    if let Some(strategy) = args.next() {
        params = params.strategy(strategy.parse::<Strategy>()?);
    }

    let pool = PoolHandle::default();
    let out = hash_file_chunks(params, ExecutionContext::Filesystem, &pool)?;

    println!(
        "{} ({:.1} KiB, {} chunks, {})",
        out.metadata.name,
        out.metadata.size_kib(),
        out.len(),
        out.algorithm
    );
    for (range, digest) in out.chunks.iter().zip(&out.chunk_hashes) {
        println!("  {range}  {digest}");
    }
    println!("root {}", out.root_hash);

    Ok(())
}
