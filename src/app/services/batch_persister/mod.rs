//! Chunked, order-sensitive persistence for bulk QC writes
//!
//! Every bulk mutation of values, flags, exception facts and resolution facts
//! goes through [`BatchPersister`]. The protocol is:
//!
//! 1. Split the input into fixed-size chunks (configurable, default 100)
//! 2. Within a chunk, finish one kind of write across the whole chunk before
//!    starting the next kind (all value rows, then all flag rows)
//! 3. Flush after every chunk, before the next chunk starts
//! 4. Delete long datetime spans as consecutive chunk-sized sub-ranges
//! 5. Delete composite observations as load log, flags, values, then the
//!    observation row
//!
//! # Failure semantics
//!
//! A failing chunk aborts the batch with [`crate::Error::BatchAborted`]. Chunks
//! flushed before the failure stay committed; there is no compensating
//! rollback, so callers that need all-or-nothing must retry the whole batch
//! idempotently or clean up themselves.

pub mod chunking;
pub mod persister;
pub mod stats;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use chunking::{plan_chunks, plan_range_chunks};
pub use persister::{BatchPersister, Phase};
pub use stats::{BatchStats, RangeDeleteStats};
