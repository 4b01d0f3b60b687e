//! `CacheStats` derived-rate and registration tests, driven through a real
//! `Cache` rather than a hand-built `CacheStats` value.

use cachesim_core::{Cache, Command, ReplacementPolicy, StatSink, WritePolicy};
use std::collections::HashMap;

#[derive(Default)]
struct MapSink {
    counters: HashMap<String, u64>,
    formulas: HashMap<String, f64>,
}

impl StatSink for MapSink {
    fn counter(&mut self, name: &str, value: u64) {
        self.counters.insert(name.to_string(), value);
    }

    fn formula(&mut self, name: &str, value: f64) {
        self.formulas.insert(name.to_string(), value);
    }
}

fn constant_latency(latency: u64) -> impl FnMut(Command, u64, usize, Option<&mut [u8]>, u64) -> u64 {
    move |_cmd, _addr, _size, _data, _now| latency
}

#[test]
fn register_stats_uses_the_cache_name_as_prefix() {
    let mut cache = Cache::try_new(
        "dl1".to_string(),
        4,
        32,
        false,
        0,
        2,
        ReplacementPolicy::Lru,
        WritePolicy::WriteBack,
        1,
        Box::new(constant_latency(10)),
    )
    .unwrap();

    cache.access(Command::Read, 0, 4, 0).unwrap();
    cache.access(Command::Read, 0, 4, 11).unwrap();

    let mut sink = MapSink::default();
    cache.register_stats(&mut sink);

    assert_eq!(sink.counters["dl1.hits"], 1);
    assert_eq!(sink.counters["dl1.misses"], 1);
    assert_eq!(sink.formulas["dl1.accesses"], 2.0);
    assert!((sink.formulas["dl1.miss_rate"] - 0.5).abs() < f64::EPSILON);
}

#[test]
fn miss_rate_is_zero_with_no_accesses() {
    let stats = cachesim_core::CacheStats::default();
    assert_eq!(stats.miss_rate(), 0.0);
    assert_eq!(stats.repl_rate(), 0.0);
    assert_eq!(stats.wb_rate(), 0.0);
    assert_eq!(stats.inv_rate(), 0.0);
}
