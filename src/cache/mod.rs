//! Configurable set-associative cache core.
//!
//! Models the timing and state of a single cache level: tag lookup,
//! replacement, dirty tracking, and latency composition through a
//! next-level callback and a shared refill bus. Memory backing, lower cache
//! levels, and configuration loading are the caller's concern; this module
//! only ever sees block-aligned addresses and tick counts.

pub mod policies;
pub mod set;
pub mod write_policy;

mod block;

use block::Block;
use policies::{FifoPolicy, LruPolicy, RandomPolicy, ReplacementPolicy};
use set::{pow2_floor, Set};
use write_policy::WritePolicy;

use crate::config::ReplacementPolicy as PolicyKind;
use crate::error::{AccessError, ConfigError};
use crate::next_level::{Command, NextLevel};
use crate::stats::CacheStats;

/// Outcome of a single `Cache::access` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessOutcome {
    pub hit: bool,
    pub latency: u64,
    /// Block-aligned address of the block evicted to make room, if this
    /// access was a miss that replaced a valid line.
    pub evicted_addr: Option<u64>,
}

/// A single level of a set-associative cache.
pub struct Cache {
    name: String,
    nsets: usize,
    block_size: usize,
    associativity: usize,
    block_mask: u64,
    set_shift: u32,
    set_mask: u64,
    tag_shift: u32,
    hsize: usize,

    policy_kind: PolicyKind,
    write_policy: WritePolicy,
    hit_latency: u64,
    bus_free: u64,

    sets: Vec<Set>,
    policy: Box<dyn ReplacementPolicy>,
    next_level: Box<dyn NextLevel>,

    /// Block-aligned address of the last block accessed, for the one-entry
    /// fast path. `None` whenever the hint cannot be trusted.
    last_tagset: Option<u64>,
    last_arena_idx: usize,

    stats: CacheStats,
}

impl Cache {
    /// Validates geometry and constructs a cache, or fails with the first
    /// violated invariant.
    #[allow(clippy::too_many_arguments)]
    pub fn try_new(
        name: String,
        nsets: usize,
        block_size: usize,
        data_allocated: bool,
        user_size: usize,
        associativity: usize,
        policy_kind: PolicyKind,
        write_policy: WritePolicy,
        hit_latency: u64,
        next_level: Box<dyn NextLevel>,
    ) -> Result<Self, ConfigError> {
        require_pow2("nsets", nsets as u64)?;
        if block_size < 8 {
            return Err(ConfigError::TooSmall {
                field: "block_size",
                value: block_size as u64,
                minimum: 8,
            });
        }
        require_pow2("block_size", block_size as u64)?;
        require_pow2("associativity", associativity as u64)?;

        let set_shift = block_size.trailing_zeros();
        let set_mask = (nsets - 1) as u64;
        let tag_shift = set_shift + nsets.trailing_zeros();
        let block_mask = (block_size - 1) as u64;
        let hsize = pow2_floor(associativity / 4);

        let sets = (0..nsets)
            .map(|_| Set::new(associativity, block_size, user_size, data_allocated, hsize))
            .collect();

        let policy: Box<dyn ReplacementPolicy> = match policy_kind {
            PolicyKind::Lru => Box::new(LruPolicy::new()),
            PolicyKind::Fifo => Box::new(FifoPolicy::new()),
            PolicyKind::Random => Box::new(RandomPolicy::new(associativity)),
        };

        log::debug!(
            "cache '{name}': {nsets} sets x {associativity}-way, {block_size}B blocks, {policy_kind:?}/{write_policy:?}"
        );

        Ok(Self {
            name,
            nsets,
            block_size,
            associativity,
            block_mask,
            set_shift,
            set_mask,
            tag_shift,
            hsize,
            policy_kind,
            write_policy,
            hit_latency,
            bus_free: 0,
            sets,
            policy,
            next_level,
            last_tagset: None,
            last_arena_idx: 0,
            stats: CacheStats::default(),
        })
    }

    /// Convenience constructor that panics on invalid configuration, for
    /// callers that treat a bad cache geometry as unrecoverable.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: String,
        nsets: usize,
        block_size: usize,
        data_allocated: bool,
        user_size: usize,
        associativity: usize,
        policy_kind: PolicyKind,
        write_policy: WritePolicy,
        hit_latency: u64,
        next_level: Box<dyn NextLevel>,
    ) -> Self {
        match Self::try_new(
            name,
            nsets,
            block_size,
            data_allocated,
            user_size,
            associativity,
            policy_kind,
            write_policy,
            hit_latency,
            next_level,
        ) {
            Ok(cache) => cache,
            Err(err) => panic!("invalid cache configuration: {err}"),
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Writes a human-readable summary of this cache's geometry and
    /// policies, in the spirit of a config dump line.
    pub fn write_config(&self, out: &mut impl std::fmt::Write) -> std::fmt::Result {
        writeln!(
            out,
            "cache: {} {} sets, {}-way, {} byte blocks, {:?} replacement, {:?}",
            self.name, self.nsets, self.associativity, self.block_size, self.policy_kind, self.write_policy
        )
    }

    /// Registers the five counters and four derived rates under
    /// `<name>.` into `sink`.
    pub fn register_stats(&self, sink: &mut impl crate::stats::StatSink) {
        self.stats.register_into(&self.name, sink);
    }

    fn tag_of(&self, addr: u64) -> u64 {
        addr >> self.tag_shift
    }

    fn set_index_of(&self, addr: u64) -> usize {
        ((addr >> self.set_shift) & self.set_mask) as usize
    }

    fn tagset_of(&self, addr: u64) -> u64 {
        addr & !self.block_mask
    }

    fn block_addr(&self, tag: u64, set_idx: usize) -> u64 {
        (tag << self.tag_shift) | ((set_idx as u64) << self.set_shift)
    }

    fn validate_access(&self, addr: u64, nbytes: usize) -> Result<(), AccessError> {
        if !nbytes.is_power_of_two() || addr % nbytes as u64 != 0 {
            return Err(AccessError::BadAlignment { addr, nbytes });
        }
        let end = addr + nbytes as u64 - 1;
        if self.tagset_of(addr) != self.tagset_of(end) {
            return Err(AccessError::CrossesBlock {
                addr,
                nbytes,
                block_size: self.block_size,
            });
        }
        Ok(())
    }

    /// Performs one access. `cmd` selects a load or a store; `now` is the
    /// caller's current simulator time. Returns the latency to charge the
    /// caller and, on a miss that replaced a valid line, the address evicted.
    ///
    /// Known asymmetry, preserved from the original design: under
    /// write-through, a store that hits via the fast path still issues an
    /// immediate write to the next level, but that write's latency is not
    /// added to the returned access latency (only the slow-miss store path
    /// charges for its write-through write).
    pub fn access(
        &mut self,
        cmd: Command,
        addr: u64,
        nbytes: usize,
        now: u64,
    ) -> Result<AccessOutcome, AccessError> {
        self.validate_access(addr, nbytes)?;

        let tag = self.tag_of(addr);
        let set_idx = self.set_index_of(addr);
        let tagset = self.tagset_of(addr);

        if self.last_tagset == Some(tagset) {
            let arena_idx = self.last_arena_idx;
            let latency = self.hit(cmd, set_idx, arena_idx, tagset, now);
            return Ok(AccessOutcome {
                hit: true,
                latency,
                evicted_addr: None,
            });
        }

        if let Some(arena_idx) = self.sets[set_idx].find(tag) {
            let latency = self.hit(cmd, set_idx, arena_idx, tagset, now);
            return Ok(AccessOutcome {
                hit: true,
                latency,
                evicted_addr: None,
            });
        }

        let (latency, evicted_addr) = self.miss(cmd, tag, set_idx, now);
        Ok(AccessOutcome {
            hit: false,
            latency,
            evicted_addr,
        })
    }

    fn hit(&mut self, cmd: Command, set_idx: usize, arena_idx: usize, tagset: u64, now: u64) -> u64 {
        let ready = self.sets[set_idx].blocks[arena_idx].ready;
        let latency = self.hit_latency.max(ready.saturating_sub(now));

        if cmd == Command::Write {
            match self.write_policy {
                WritePolicy::WriteBack => self.sets[set_idx].blocks[arena_idx].dirty = true,
                WritePolicy::WriteThrough => {
                    let tag = self.sets[set_idx].blocks[arena_idx].tag;
                    let addr = self.block_addr(tag, set_idx);
                    let block_size = self.block_size;
                    let _ = self.next_level.access(
                        Command::Write,
                        addr,
                        block_size,
                        self.sets[set_idx].blocks[arena_idx].data.as_deref_mut(),
                        now,
                    );
                    self.stats.writebacks += 1;
                }
            }
        }

        self.policy
            .promote(set_idx, &mut self.sets[set_idx].way_order, arena_idx);
        self.last_tagset = Some(tagset);
        self.last_arena_idx = arena_idx;
        self.stats.hits += 1;
        latency
    }

    fn miss(&mut self, cmd: Command, tag: u64, set_idx: usize, now: u64) -> (u64, Option<u64>) {
        self.stats.misses += 1;

        let victim_idx = self
            .policy
            .victim(set_idx, &self.sets[set_idx].way_order);

        let mut latency = 0u64;
        let victim_was_valid = self.sets[set_idx].blocks[victim_idx].valid;
        let victim_was_dirty = self.sets[set_idx].blocks[victim_idx].dirty;
        let evicted_addr = victim_was_valid
            .then(|| self.block_addr(self.sets[set_idx].blocks[victim_idx].tag, set_idx));

        if victim_was_valid {
            let ready = self.sets[set_idx].blocks[victim_idx].ready;
            latency += ready.saturating_sub(now);
            self.stats.replacements += 1;
        }

        latency += self.bus_free.saturating_sub(now + latency);
        self.bus_free = self.bus_free.max(now + latency) + 1;

        if victim_was_valid {
            let old_tag = self.sets[set_idx].blocks[victim_idx].tag;
            self.sets[set_idx].unlink(old_tag, victim_idx);

            if victim_was_dirty {
                let addr = self.block_addr(old_tag, set_idx);
                let block_size = self.block_size;
                latency += self.next_level.access(
                    Command::Write,
                    addr,
                    block_size,
                    self.sets[set_idx].blocks[victim_idx].data.as_deref_mut(),
                    now + latency,
                );
                self.stats.writebacks += 1;
                log::trace!("cache '{}': dirty writeback of set {set_idx} way {victim_idx}", self.name);
            }
        }

        {
            let block = &mut self.sets[set_idx].blocks[victim_idx];
            block.tag = tag;
            block.valid = true;
            block.dirty = false;
        }
        self.sets[set_idx].link(tag, victim_idx);
        self.policy
            .install(set_idx, &mut self.sets[set_idx].way_order, victim_idx);

        let fill_addr = self.block_addr(tag, set_idx);
        let block_size = self.block_size;
        latency += self.next_level.access(
            Command::Read,
            fill_addr,
            block_size,
            self.sets[set_idx].blocks[victim_idx].data.as_deref_mut(),
            now + latency,
        );

        if cmd == Command::Write {
            match self.write_policy {
                WritePolicy::WriteBack => {
                    self.sets[set_idx].blocks[victim_idx].dirty = true;
                }
                WritePolicy::WriteThrough => {
                    latency += self.next_level.access(
                        Command::Write,
                        fill_addr,
                        block_size,
                        self.sets[set_idx].blocks[victim_idx].data.as_deref_mut(),
                        now + latency,
                    );
                    self.stats.writebacks += 1;
                }
            }
        }

        self.sets[set_idx].blocks[victim_idx].ready = now + latency;
        self.last_tagset = None;

        log::trace!(
            "cache '{}': miss set {set_idx} tag {tag:#x} latency {latency}",
            self.name
        );

        (latency, evicted_addr)
    }

    /// Reports whether a VALID block with this address's tag exists, with
    /// no side effects: counters, the fast-path hint, and replacement order
    /// are all left untouched.
    pub fn probe(&self, addr: u64) -> bool {
        let tag = self.tag_of(addr);
        let set_idx = self.set_index_of(addr);
        self.sets[set_idx].find(tag).is_some()
    }

    /// Invalidates every block, writing back any that are dirty. Returns
    /// the accumulated latency, at least `hit_latency`.
    pub fn flush(&mut self, now: u64) -> u64 {
        let mut latency = self.hit_latency;
        for set_idx in 0..self.nsets {
            let arena_len = self.sets[set_idx].blocks.len();
            for arena_idx in 0..arena_len {
                latency = self.flush_one(set_idx, arena_idx, now, latency);
            }
        }
        self.last_tagset = None;
        latency
    }

    /// Invalidates the block containing `addr`, if present, moving it to
    /// its set's replacement tail so it becomes the next victim. A missing
    /// or already-invalid block is a no-op that still returns
    /// `hit_latency`.
    pub fn flush_addr(&mut self, addr: u64, now: u64) -> u64 {
        let tag = self.tag_of(addr);
        let set_idx = self.set_index_of(addr);
        let mut latency = self.hit_latency;

        if let Some(arena_idx) = self.sets[set_idx].find(tag) {
            latency = self.flush_one(set_idx, arena_idx, now, latency);
            if let Some(pos) = self.sets[set_idx]
                .way_order
                .iter()
                .position(|&w| w == arena_idx)
            {
                let way = self.sets[set_idx].way_order.remove(pos);
                self.sets[set_idx].way_order.push(way);
            }
        }
        self.last_tagset = None;
        latency
    }

    fn flush_one(&mut self, set_idx: usize, arena_idx: usize, now: u64, mut latency: u64) -> u64 {
        if !self.sets[set_idx].blocks[arena_idx].valid {
            return latency;
        }

        let tag = self.sets[set_idx].blocks[arena_idx].tag;
        let dirty = self.sets[set_idx].blocks[arena_idx].dirty;

        if dirty {
            let addr = self.block_addr(tag, set_idx);
            let block_size = self.block_size;
            latency += self.next_level.access(
                Command::Write,
                addr,
                block_size,
                self.sets[set_idx].blocks[arena_idx].data.as_deref_mut(),
                now + latency,
            );
            self.stats.writebacks += 1;
        }

        self.sets[set_idx].unlink(tag, arena_idx);
        self.sets[set_idx].blocks[arena_idx].invalidate();
        self.stats.invalidations += 1;

        log::trace!("cache '{}': flushed set {set_idx} way {arena_idx}", self.name);
        latency
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("name", &self.name)
            .field("nsets", &self.nsets)
            .field("associativity", &self.associativity)
            .field("block_size", &self.block_size)
            .field("policy_kind", &self.policy_kind)
            .field("write_policy", &self.write_policy)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

fn require_pow2(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 || !value.is_power_of_two() {
        Err(ConfigError::NotPowerOfTwo { field, value })
    } else {
        Ok(())
    }
}
