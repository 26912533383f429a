//! Fixed-size chunk planning.
//!
//! - [`Chunker`] - Splits a file size into ordered [`crate::ChunkRange`]s

mod plan;

pub use plan::{Chunker, plan_chunks};
