//! `CacheConfig` deserialization and construction tests.

use cachesim_core::config::ReplacementPolicy;
use cachesim_core::{CacheConfig, Command, ConfigError};

fn constant_latency(latency: u64) -> impl FnMut(Command, u64, usize, Option<&mut [u8]>, u64) -> u64 {
    move |_cmd, _addr, _size, _data, _now| latency
}

#[test]
fn default_config_is_a_valid_geometry() {
    let config = CacheConfig::default();
    let cache = config.build(constant_latency(10));
    assert!(cache.is_ok());
}

#[test]
fn deserializes_from_json_with_defaults_filled_in() {
    let json = r#"{ "name": "dl1", "nsets": 4, "block_size": 32, "associativity": 2 }"#;
    let config: CacheConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.name, "dl1");
    assert_eq!(config.nsets, 4);
    assert_eq!(config.block_size, 32);
    assert_eq!(config.associativity, 2);
    assert_eq!(config.policy, ReplacementPolicy::Lru);
    assert_eq!(config.hit_latency, 1);
}

#[test]
fn policy_accepts_single_character_aliases() {
    let json = r#"{ "policy": "f" }"#;
    let config: CacheConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.policy, ReplacementPolicy::Fifo);
}

#[test]
fn policy_char_parsing_rejects_unknown_characters() {
    assert_eq!(
        ReplacementPolicy::from_char('x'),
        Err(ConfigError::InvalidPolicyChar('x'))
    );
    assert_eq!(ReplacementPolicy::from_char('r'), Ok(ReplacementPolicy::Random));
}

#[test]
fn non_power_of_two_nsets_fails_construction() {
    let mut config = CacheConfig::default();
    config.nsets = 3;
    let err = config.build(constant_latency(10)).unwrap_err();
    assert!(matches!(err, ConfigError::NotPowerOfTwo { field: "nsets", .. }));
}

#[test]
fn block_size_below_minimum_fails_construction() {
    let mut config = CacheConfig::default();
    config.block_size = 4;
    let err = config.build(constant_latency(10)).unwrap_err();
    assert!(matches!(err, ConfigError::TooSmall { field: "block_size", .. }));
}
