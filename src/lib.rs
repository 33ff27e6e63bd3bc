//! Rank partitioning kernels for trimming nearest-neighbor candidate lists.
//!
//! Two families of pure, stateless routines over caller-owned buffers:
//!
//! - [`partition_fuzzy`]: reorders parallel value/id arrays in place so the
//!   first `q` entries, for some `q` inside a caller-supplied rank window
//!   `[q_min, q_max]`, are the `q` best under a [`Comparator`], returning
//!   the threshold that separates kept from discarded entries. An AVX2 fast
//!   path handles 32-byte-aligned `u16` keys sixteen lanes at a time.
//! - [`simd_histogram_8`] / [`simd_histogram_16`]: bin a `u16` stream,
//!   optionally mapped through `(v - min) >> shift`, using staged
//!   2→4→8→16-bit in-register accumulators.
//!
//! Everything is synchronous and single-threaded; no allocation happens
//! beyond a constant-size stack footprint. Precondition violations panic
//! with a diagnostic rather than returning wrong answers.

pub mod comparator;
pub mod histogram;
pub mod partition;

pub use comparator::{Comparator, KeepLargest, KeepSmallest, Key};
pub use histogram::{simd_histogram_16, simd_histogram_8};
pub use partition::{
    find_minimax, partition_fuzzy, simd_partition, simd_partition_fuzzy,
    simd_partition_with_bounds,
};
