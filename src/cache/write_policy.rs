//! Write policy selection.

/// Governs how a store is propagated to the next level, both on a hit and
/// when it triggers a miss refill. Both variants are write-allocate: a
/// store that misses always refills the block before the store takes
/// effect, never writes around the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// Stores mark the block dirty; the next level only sees the data when
    /// a dirty block is evicted.
    WriteBack,
    /// Every store is also issued to the next level immediately; blocks are
    /// never marked dirty under this policy.
    WriteThrough,
}

impl Default for WritePolicy {
    fn default() -> Self {
        Self::WriteBack
    }
}
