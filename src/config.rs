//! Deserializable cache configuration.
//!
//! `CacheConfig` mirrors `Cache::try_new`'s construction parameters so a host
//! that already deserializes its own configuration tree can embed one
//! verbatim. Loading it from a file or environment is not this crate's
//! concern; `CacheConfig::build` is the only thing it adds over calling
//! `Cache::try_new` directly.

use serde::Deserialize;

use crate::cache::write_policy::WritePolicy;
use crate::cache::Cache;
use crate::error::ConfigError;
use crate::next_level::NextLevel;

mod defaults {
    pub const NSETS: usize = 128;
    pub const BLOCK_SIZE: usize = 32;
    pub const ASSOCIATIVITY: usize = 4;
    pub const HIT_LATENCY: u64 = 1;
}

/// Which way a set chooses its next victim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReplacementPolicy {
    #[serde(alias = "l")]
    Lru,
    #[serde(alias = "f")]
    Fifo,
    #[serde(alias = "r")]
    Random,
}

impl Default for ReplacementPolicy {
    fn default() -> Self {
        Self::Lru
    }
}

impl ReplacementPolicy {
    /// Parses the single-character policy tags used by the original design:
    /// `l` for LRU, `f` for FIFO, `r` for Random.
    pub fn from_char(c: char) -> Result<Self, ConfigError> {
        match c {
            'l' => Ok(Self::Lru),
            'f' => Ok(Self::Fifo),
            'r' => Ok(Self::Random),
            other => Err(ConfigError::InvalidPolicyChar(other)),
        }
    }
}

/// Full geometry and policy configuration for one cache level.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Name used as the stats prefix, e.g. `"dl1"`.
    #[serde(default)]
    pub name: String,

    /// Number of sets; must be a power of two.
    #[serde(default = "CacheConfig::default_nsets")]
    pub nsets: usize,

    /// Block size in bytes; must be a power of two and at least 8.
    #[serde(default = "CacheConfig::default_block_size")]
    pub block_size: usize,

    /// Ways per set; must be a power of two.
    #[serde(default = "CacheConfig::default_associativity")]
    pub associativity: usize,

    /// Whether blocks carry a data payload in addition to their tag.
    #[serde(default)]
    pub data_allocated: bool,

    /// Size in bytes of the optional per-block user annotation.
    #[serde(default)]
    pub user_size: usize,

    /// Replacement policy.
    #[serde(default)]
    pub policy: ReplacementPolicy,

    /// Write policy.
    #[serde(default)]
    pub write_policy: WritePolicy,

    /// Fixed minimum latency charged on every hit.
    #[serde(default = "CacheConfig::default_hit_latency")]
    pub hit_latency: u64,
}

impl CacheConfig {
    fn default_nsets() -> usize {
        defaults::NSETS
    }

    fn default_block_size() -> usize {
        defaults::BLOCK_SIZE
    }

    fn default_associativity() -> usize {
        defaults::ASSOCIATIVITY
    }

    fn default_hit_latency() -> u64 {
        defaults::HIT_LATENCY
    }

    /// Constructs a `Cache` from this configuration and a next-level
    /// callback, running the same validation as `Cache::try_new`.
    pub fn build(&self, next_level: impl NextLevel + 'static) -> Result<Cache, ConfigError> {
        Cache::try_new(
            self.name.clone(),
            self.nsets,
            self.block_size,
            self.data_allocated,
            self.user_size,
            self.associativity,
            self.policy,
            self.write_policy,
            self.hit_latency,
            Box::new(next_level),
        )
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            nsets: defaults::NSETS,
            block_size: defaults::BLOCK_SIZE,
            associativity: defaults::ASSOCIATIVITY,
            data_allocated: false,
            user_size: 0,
            policy: ReplacementPolicy::default(),
            write_policy: WritePolicy::default(),
            hit_latency: defaults::HIT_LATENCY,
        }
    }
}

impl<'de> Deserialize<'de> for WritePolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "UPPERCASE")]
        enum Repr {
            WriteBack,
            WriteThrough,
        }
        Ok(match Repr::deserialize(deserializer)? {
            Repr::WriteBack => WritePolicy::WriteBack,
            Repr::WriteThrough => WritePolicy::WriteThrough,
        })
    }
}
