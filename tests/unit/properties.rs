//! Property-based invariants that must hold across any sequence of valid
//! accesses, independent of the specific addresses or timing chosen.

use cachesim_core::{Cache, Command, ReplacementPolicy, WritePolicy};
use proptest::prelude::*;

fn constant_latency(latency: u64) -> impl FnMut(Command, u64, usize, Option<&mut [u8]>, u64) -> u64 {
    move |_cmd, _addr, _size, _data, _now| latency
}

fn small_cache(policy: ReplacementPolicy, write_policy: WritePolicy) -> Cache {
    Cache::try_new(
        "prop".to_string(),
        4,
        32,
        false,
        0,
        2,
        policy,
        write_policy,
        1,
        Box::new(constant_latency(5)),
    )
    .unwrap()
}

proptest! {
    /// `hits + misses` always equals the number of accesses performed,
    /// regardless of address pattern, policy, or write policy.
    #[test]
    fn hits_plus_misses_tracks_access_count(
        addrs in prop::collection::vec(0u64..0x4000, 1..60),
        writes in prop::collection::vec(any::<bool>(), 1..60),
        policy_idx in 0u8..3,
    ) {
        let policy = match policy_idx {
            0 => ReplacementPolicy::Lru,
            1 => ReplacementPolicy::Fifo,
            _ => ReplacementPolicy::Random,
        };
        let mut cache = small_cache(policy, WritePolicy::WriteBack);
        let mut now = 0u64;
        let mut count = 0u64;
        for (addr, write) in addrs.iter().zip(writes.iter().cycle()) {
            let aligned = addr & !0x3;
            let cmd = if *write { Command::Write } else { Command::Read };
            cache.access(cmd, aligned, 4, now).unwrap();
            now += 7;
            count += 1;
        }
        let stats = cache.stats();
        prop_assert_eq!(stats.hits + stats.misses, count);
        prop_assert!(stats.replacements <= stats.misses);
    }

    /// Under write-through, no access sequence ever leaves a writeback debt
    /// that `writebacks` undercounts relative to stores actually issued.
    #[test]
    fn write_through_never_tracks_fewer_writebacks_than_stores(
        addrs in prop::collection::vec(0u64..0x1000, 1..40),
    ) {
        let mut cache = small_cache(ReplacementPolicy::Lru, WritePolicy::WriteThrough);
        let mut now = 0u64;
        let mut stores = 0u64;
        for addr in &addrs {
            let aligned = addr & !0x3;
            cache.access(Command::Write, aligned, 4, now).unwrap();
            stores += 1;
            now += 7;
        }
        prop_assert!(cache.stats().writebacks >= stores);
    }

    /// `probe` never changes observable state: two probes of the same
    /// address bracketing no mutating call agree and leave counters put.
    #[test]
    fn probe_is_pure(addr in 0u64..0x1000) {
        let mut cache = small_cache(ReplacementPolicy::Lru, WritePolicy::WriteBack);
        let aligned = addr & !0x3;
        cache.access(Command::Read, aligned, 4, 0).unwrap();

        let first = cache.probe(aligned);
        let stats_before = cache.stats();
        let second = cache.probe(aligned);
        prop_assert_eq!(first, second);
        prop_assert_eq!(cache.stats(), stats_before);
    }
}
