//! Hashes a file with tokio.
//!
//! Run with:
//!     cargo run --example async_tokio --features async-io -- <path>

use chunkhash::{FileHasher, FileMetadata, HashConfig, PoolHandle};
use tokio_util::compat::TokioAsyncReadCompatExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = std::env::args().nth(1).ok_or("usage: async_tokio <path>")?;
    let file = tokio::fs::File::open(&path).await?;
    let size = file.metadata().await?.len();

    let metadata = FileMetadata {
        name: path.clone(),
        size,
        ..FileMetadata::default()
    };
    let hasher = FileHasher::new(HashConfig::default().with_hardware_workers(), PoolHandle::default());
    let out = hasher.hash_async(file.compat(), metadata).await?;

    println!("{}: {} chunks, {}", out.metadata.name, out.len(), out.algorithm);
    println!("root {}", out.root_hash);
    Ok(())
}
