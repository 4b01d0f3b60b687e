//! A single cache set: its block arena, replacement order, and optional hash index.

use super::block::Block;

/// Folds a tag into one of `hsize` buckets.
///
/// `hsize` of zero means "no index"; callers must not call this in that case.
fn hash_tag(tag: u64, hsize: usize) -> usize {
    let mut h = tag;
    h ^= h >> 32;
    h ^= h >> 16;
    h ^= h >> 8;
    (h as usize) & (hsize - 1)
}

/// The largest power of two that is `<= n`, or zero if `n` is zero.
pub(crate) fn pow2_floor(n: usize) -> usize {
    if n == 0 {
        0
    } else {
        1usize << (usize::BITS - 1 - n.leading_zeros())
    }
}

/// Fixed-size collection of blocks competing for the same index.
///
/// `way_order` is a permutation of arena indices `0..associativity`, ordered
/// head (most recently promoted) to tail (next replacement victim). This flat
/// `Vec` stands in for the doubly linked way list of the original design: for
/// the small associativities this core targets, `remove` + `insert(0, ..)` is
/// no more expensive than pointer relinking and needs no unsafe code.
pub(crate) struct Set {
    pub(crate) blocks: Vec<Block>,
    pub(crate) way_order: Vec<usize>,
    /// `hash_buckets[b]` holds the arena indices of VALID blocks whose tag
    /// hashes to bucket `b`. Empty (`hsize == 0`) means no index is kept and
    /// lookups fall back to a linear scan of `blocks`.
    hash_buckets: Vec<Vec<usize>>,
    hsize: usize,
}

impl Set {
    pub(crate) fn new(
        associativity: usize,
        block_size: usize,
        user_size: usize,
        data_allocated: bool,
        hsize: usize,
    ) -> Self {
        Self {
            blocks: (0..associativity)
                .map(|_| Block::new(block_size, user_size, data_allocated))
                .collect(),
            way_order: (0..associativity).collect(),
            hash_buckets: vec![Vec::new(); hsize],
            hsize,
        }
    }

    /// Looks up a VALID block with the given tag, scanning the hash bucket if
    /// an index is kept, else the full block arena.
    pub(crate) fn find(&self, tag: u64) -> Option<usize> {
        if self.hsize > 0 {
            self.hash_buckets[hash_tag(tag, self.hsize)]
                .iter()
                .copied()
                .find(|&idx| self.blocks[idx].valid && self.blocks[idx].tag == tag)
        } else {
            self.blocks
                .iter()
                .position(|b| b.valid && b.tag == tag)
        }
    }

    pub(crate) fn link(&mut self, tag: u64, idx: usize) {
        if self.hsize > 0 {
            self.hash_buckets[hash_tag(tag, self.hsize)].push(idx);
        }
    }

    pub(crate) fn unlink(&mut self, tag: u64, idx: usize) {
        if self.hsize > 0 {
            let bucket = &mut self.hash_buckets[hash_tag(tag, self.hsize)];
            if let Some(pos) = bucket.iter().position(|&i| i == idx) {
                bucket.swap_remove(pos);
            }
        }
    }

    /// True iff every block the hash index reports VALID is also present in
    /// the way list and vice versa. Used by tests; not part of normal
    /// operation.
    #[cfg(test)]
    pub(crate) fn hash_matches_way_list(&self) -> bool {
        use std::collections::BTreeSet;
        let way: BTreeSet<usize> = self.way_order.iter().copied().collect();
        if way.len() != self.blocks.len() {
            return false;
        }
        if self.hsize == 0 {
            return true;
        }
        let indexed: BTreeSet<usize> = self.hash_buckets.iter().flatten().copied().collect();
        let valid: BTreeSet<usize> = self
            .blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.valid)
            .map(|(i, _)| i)
            .collect();
        indexed == valid
    }
}
