//! Error types for cache construction and access validation.

use thiserror::Error;

/// Fatal at construction: the geometry or policy selection is invalid and no
/// `Cache` is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be a power of two, got {value}")]
    NotPowerOfTwo { field: &'static str, value: u64 },

    #[error("{field} must be at least {minimum}, got {value}")]
    TooSmall {
        field: &'static str,
        value: u64,
        minimum: u64,
    },

    #[error("'{0}' is not a recognized replacement policy character (expected 'l', 'f', or 'r')")]
    InvalidPolicyChar(char),
}

/// Fatal at the access site: the request itself is malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("address {addr:#x} is not aligned to its access size of {nbytes} bytes")]
    BadAlignment { addr: u64, nbytes: usize },

    #[error(
        "access at {addr:#x} of {nbytes} bytes crosses a block boundary (block size {block_size})"
    )]
    CrossesBlock {
        addr: u64,
        nbytes: usize,
        block_size: usize,
    },
}
