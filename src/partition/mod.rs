//! Fuzzy quantile partitioning.
//!
//! Given parallel value/id arrays and a rank window `[q_min, q_max]`, the
//! kernels reorder both in place so the first `q` entries (for some chosen
//! `q` inside the window) are the `q` best under a [`Comparator`], and
//! return the threshold value separating kept from discarded entries. Order
//! inside the kept prefix is unspecified and nothing about the operation is
//! stable.
//!
//! [`partition_fuzzy`] dispatches between the scalar kernel in [`scalar`]
//! and an AVX2 fast path used when the keys are `u16`, the value buffer is
//! 32-byte aligned, and the host supports it.

pub mod scalar;

#[cfg(target_arch = "x86_64")]
pub(crate) mod avx2;

use crate::comparator::{Comparator, Key};

/// Hard ceiling on bisection iterations, a defense against pathological
/// value distributions; the interior-sample exit terminates long before
/// this in practice.
pub(crate) const MAX_BISECT_ITERS: usize = 200;

/// Reorders `vals`/`ids` in place so the first `q` entries, for some
/// `q in [q_min, q_max]`, are the `q` best under `C`, and returns the
/// separating threshold. The chosen `q` is written to `q_out` when present.
///
/// Uses the AVX2 `u16` fast path when the key type, buffer alignment and
/// host CPU allow, the scalar kernel otherwise. Both produce a valid
/// partition with the same `q`; the representative threshold may be any
/// value of the separating band.
///
/// The `q_min == 0` early out writes the best-possible neutral key,
/// saturated to `usize`, into `q_out` (0 when keeping the smallest, the
/// maximum otherwise) and returns `Key::ZERO` without touching the arrays.
/// This rank sentinel predates this implementation and is kept for
/// compatibility; callers that pass `q_min == 0` should not interpret
/// `q_out` as a rank.
///
/// # Panics
///
/// Panics when `vals` and `ids` differ in length, or when `n < 3` outside
/// the `q_min == 0` / `q_max >= n` early outs.
pub fn partition_fuzzy<C: Comparator>(
    vals: &mut [C::Key],
    ids: &mut [C::Id],
    q_min: usize,
    q_max: usize,
    mut q_out: Option<&mut usize>,
) -> C::Key {
    assert_eq!(
        vals.len(),
        ids.len(),
        "values and identifiers must have equal length"
    );

    if let Some(thresh) =
        <C::Key as Key>::try_partition_fuzzy_simd::<C>(vals, ids, q_min, q_max, q_out.as_deref_mut())
    {
        return thresh;
    }

    scalar::partition_fuzzy_median3::<C>(vals, ids, q_min, q_max, q_out)
}

/// Minimum and maximum of `vals`, vectorized when the host supports AVX2.
/// Returns `(u16::MAX, 0)` for an empty slice.
pub fn find_minimax(vals: &[u16]) -> (u16, u16) {
    #[cfg(target_arch = "x86_64")]
    if is_x86_feature_detected!("avx2") {
        // SAFETY: AVX2 support was just detected.
        return unsafe { avx2::find_minimax(vals) };
    }

    let mut smin = u16::MAX;
    let mut smax = 0;
    for &v in vals {
        smin = smin.min(v);
        smax = smax.max(v);
    }
    (smin, smax)
}

/// [`partition_fuzzy`] restricted to `u16` keys and a 32-byte-aligned value
/// buffer, always taking the vectorized route when the host supports AVX2
/// (and the scalar kernel as documented fallback when it does not).
///
/// # Panics
///
/// Panics when `vals` is not 32-byte aligned or the lengths differ.
pub fn simd_partition_fuzzy<C: Comparator<Key = u16>>(
    vals: &mut [u16],
    ids: &mut [C::Id],
    q_min: usize,
    q_max: usize,
    q_out: Option<&mut usize>,
) -> u16 {
    assert_eq!(
        vals.len(),
        ids.len(),
        "values and identifiers must have equal length"
    );
    assert_aligned(vals);

    #[cfg(target_arch = "x86_64")]
    if is_x86_feature_detected!("avx2") {
        // SAFETY: AVX2 support was just detected.
        return unsafe { avx2::partition_fuzzy::<C>(vals, ids, q_min, q_max, q_out) };
    }

    scalar::partition_fuzzy_median3::<C>(vals, ids, q_min, q_max, q_out)
}

/// Exact-`q` convenience over [`simd_partition_fuzzy`]. Returns `0` for
/// `q == 0` and `0xffff` for `q >= n` without touching the arrays.
///
/// # Panics
///
/// Panics when `vals` is not 32-byte aligned or the lengths differ.
pub fn simd_partition<C: Comparator<Key = u16>>(
    vals: &mut [u16],
    ids: &mut [C::Id],
    q: usize,
) -> u16 {
    assert_eq!(
        vals.len(),
        ids.len(),
        "values and identifiers must have equal length"
    );
    assert_aligned(vals);

    if q == 0 {
        return 0;
    }
    if q >= vals.len() {
        return 0xffff;
    }

    let (s0, s1) = find_minimax(vals);
    simd_partition_with_bounds::<C>(vals, ids, q, s0, s1)
}

/// Exact-`q` partition with caller-supplied inclusive value bounds
/// `[s0, s1]`, for callers that already track the value range. The scalar
/// fallback (no AVX2) ignores the bounds.
///
/// # Panics
///
/// Panics when `vals` is not 32-byte aligned or the lengths differ.
pub fn simd_partition_with_bounds<C: Comparator<Key = u16>>(
    vals: &mut [u16],
    ids: &mut [C::Id],
    q: usize,
    s0: u16,
    s1: u16,
) -> u16 {
    assert_eq!(
        vals.len(),
        ids.len(),
        "values and identifiers must have equal length"
    );
    assert_aligned(vals);

    #[cfg(target_arch = "x86_64")]
    if is_x86_feature_detected!("avx2") {
        // SAFETY: AVX2 support was just detected.
        return unsafe {
            avx2::partition_fuzzy_with_bounds::<C>(vals, ids, q, q, None, s0, s1)
        };
    }

    let _ = (s0, s1);
    scalar::partition_fuzzy_median3::<C>(vals, ids, q, q, None)
}

#[inline]
fn assert_aligned(vals: &[u16]) {
    assert!(
        vals.as_ptr() as usize % 32 == 0,
        "simd partition requires a 32-byte aligned value buffer"
    );
}
