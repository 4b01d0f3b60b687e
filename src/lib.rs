//! Configurable set-associative cache simulator core.
//!
//! Models the timing and state of a single cache level inside a
//! cycle-accurate microarchitectural simulator: tag lookup, replacement
//! (LRU, FIFO, Random), write policy (write-back or write-through), and
//! latency composition through a next-level access callback and a shared
//! refill bus. It does not model coherence, memory backing storage, or
//! configuration loading — those are the host simulator's job.

/// The cache itself: geometry, sets, blocks, replacement and write policy.
pub mod cache;
/// Deserializable configuration mirroring `Cache::try_new`'s parameters.
pub mod config;
/// Construction and access error types.
pub mod error;
/// The next-level access capability a cache is built around.
pub mod next_level;
/// Cache hit/miss/writeback counters and their derived rates.
pub mod stats;

pub use crate::cache::write_policy::WritePolicy;
pub use crate::cache::{AccessOutcome, Cache};
pub use crate::config::{CacheConfig, ReplacementPolicy};
pub use crate::error::{AccessError, ConfigError};
pub use crate::next_level::{Command, NextLevel};
pub use crate::stats::{CacheStats, StatSink};
