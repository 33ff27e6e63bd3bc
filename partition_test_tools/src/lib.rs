//! Shared tooling for testing and benchmarking rank partitioning
//! implementations: deterministic input patterns, 32-byte-aligned buffers
//! for the vectorized paths, and a property suite instantiated per
//! implementation via [`instantiate_partition_tests`].

/// A fuzzy rank partitioning implementation under test.
///
/// `keep_largest` selects the polarity at runtime; implementations forward
/// to their monomorphized comparator instantiations. Contract as in the
/// kernels: the first `q` entries (with `q` written to `q_out`) are the `q`
/// best, paired with their original identifiers, and the returned value
/// separates kept from discarded entries.
pub trait Partitioner {
    fn name() -> String;

    fn partition_f32<I: Copy>(
        keep_largest: bool,
        vals: &mut [f32],
        ids: &mut [I],
        q_min: usize,
        q_max: usize,
        q_out: Option<&mut usize>,
    ) -> f32;

    fn partition_u16<I: Copy>(
        keep_largest: bool,
        vals: &mut [u16],
        ids: &mut [I],
        q_min: usize,
        q_max: usize,
        q_out: Option<&mut usize>,
    ) -> u16;
}

pub mod aligned;
pub mod patterns;
