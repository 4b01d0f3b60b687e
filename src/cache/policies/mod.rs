//! Cache replacement policies.
//!
//! Implements the algorithms for selecting and tracking victim ways in a
//! set-associative cache.
//!
//! # Policies
//!
//! - `Lru`: Least Recently Used.
//! - `Fifo`: First-In, First-Out.
//! - `Random`: Uniform random selection over a shared pseudo-random stream.

/// Least Recently Used replacement policy.
pub mod lru;

/// First-In, First-Out replacement policy.
pub mod fifo;

/// Random replacement policy.
pub mod random;

pub use fifo::FifoPolicy;
pub use lru::LruPolicy;
pub use random::RandomPolicy;

/// Trait for selecting and maintaining replacement order within a set.
///
/// Implementations operate on `way_order`, a permutation of arena indices
/// ordered head (most recently promoted) to tail (next victim). `victim`
/// alone decides which arena index is evicted; `promote` and `install` are
/// the two points at which a policy may reorder the list.
pub trait ReplacementPolicy: Send {
    /// Called on a cache hit to the given arena index within `set`.
    fn promote(&mut self, set: usize, way_order: &mut Vec<usize>, arena_idx: usize);

    /// Chooses the arena index to evict. Does not mutate `way_order`.
    fn victim(&mut self, set: usize, way_order: &[usize]) -> usize;

    /// Called after a victim has been refilled, to record it as the freshest
    /// occupant of the set.
    fn install(&mut self, set: usize, way_order: &mut Vec<usize>, arena_idx: usize);
}
