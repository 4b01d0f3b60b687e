//! Cache block storage.
//!
//! A block is the unit of allocation and transfer between a cache and its
//! next level. Blocks are never reallocated: a `Set` owns a fixed-size arena
//! of them for its entire lifetime, and installing a new line overwrites one
//! in place rather than creating a new one.

/// One cache line slot.
///
/// `data` and `user_data` are only allocated when the owning cache was
/// constructed with `data_allocated` (respectively a non-zero `user_size`);
/// a tag-only cache leaves both as `None` and pays no allocation cost.
#[derive(Debug, Clone)]
pub(crate) struct Block {
    pub(crate) tag: u64,
    pub(crate) valid: bool,
    pub(crate) dirty: bool,
    /// Simulator tick at which this block's contents become usable.
    pub(crate) ready: u64,
    pub(crate) data: Option<Vec<u8>>,
    pub(crate) user_data: Option<Vec<u8>>,
}

impl Block {
    pub(crate) fn new(block_size: usize, user_size: usize, data_allocated: bool) -> Self {
        Self {
            tag: 0,
            valid: false,
            dirty: false,
            ready: 0,
            data: data_allocated.then(|| vec![0u8; block_size]),
            user_data: (user_size > 0).then(|| vec![0u8; user_size]),
        }
    }

    /// Clears VALID and DIRTY but keeps the block's storage and identity.
    pub(crate) fn invalidate(&mut self) {
        self.valid = false;
        self.dirty = false;
    }
}
