//! AVX2 fast path for 32-byte-aligned `u16` keys.
//!
//! Same bisection/compaction structure as the scalar kernel, but the
//! threshold search runs over the integer interval `[smin, smax]` instead of
//! sampling values, and counting/compaction work on lanes of sixteen `u16`.
//! Comparison outcomes are packed into 32-bit masks carrying two bits per
//! lane, scanned with population counts and trailing-zero scans.
//!
//! Callers must have verified AVX2 support; every function here is
//! `#[target_feature(enable = "avx2")]`.

use core::arch::x86_64::*;

use crate::comparator::{Comparator, Key};

use super::MAX_BISECT_ITERS;

/// Lane-wise mask of elements that do not rank strictly better than the
/// threshold: `v == max(v, t)` is `v >= t` when keeping the smallest,
/// `v == min(v, t)` is `v <= t` when keeping the largest.
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn worse_or_eq_mask<C: Comparator<Key = u16>>(v: __m256i, thr: __m256i) -> __m256i {
    let clamped = if C::KEEPS_LARGEST {
        _mm256_min_epu16(v, thr)
    } else {
        _mm256_max_epu16(v, thr)
    };
    _mm256_cmpeq_epi16(v, clamped)
}

/// Running min and max of `vals`, reduced from per-lane accumulators plus
/// the `n % 16` scalar tail.
#[target_feature(enable = "avx2")]
pub unsafe fn find_minimax(vals: &[u16]) -> (u16, u16) {
    let n = vals.len();
    let mut vmin = _mm256_set1_epi16(-1);
    let mut vmax = _mm256_setzero_si256();

    let mut i = 0;
    while i + 16 <= n {
        let v = _mm256_loadu_si256(vals.as_ptr().add(i) as *const __m256i);
        vmin = _mm256_min_epu16(vmin, v);
        vmax = _mm256_max_epu16(vmax, v);
        i += 16;
    }

    let mut tab = [0u16; 32];
    _mm256_storeu_si256(tab.as_mut_ptr() as *mut __m256i, vmin);
    _mm256_storeu_si256(tab.as_mut_ptr().add(16) as *mut __m256i, vmax);

    let mut smin = tab[0];
    let mut smax = tab[16];
    for j in 1..16 {
        smin = smin.min(tab[j]);
        smax = smax.max(tab[j + 16]);
    }
    for &v in &vals[n & !15..] {
        smin = smin.min(v);
        smax = smax.max(v);
    }

    (smin, smax)
}

/// Vectorized count of strictly-better and exactly-equal entries.
///
/// Both per-lane masks are saturation-packed to bytes and movemask'd into
/// one 32-bit word: the even byte groups carry the equality lanes, the odd
/// ones the worse-or-equal lanes, so two popcounts recover both tallies.
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn count_lt_and_eq<C: Comparator<Key = u16>>(
    vals: &[u16],
    thresh: u16,
) -> (usize, usize) {
    let n = vals.len();
    let thr = _mm256_set1_epi16(thresh as i16);
    let mut n_lt = 0;
    let mut n_eq = 0;

    let mut i = 0;
    while i + 16 <= n {
        let v = _mm256_loadu_si256(vals.as_ptr().add(i) as *const __m256i);
        let eq = _mm256_cmpeq_epi16(v, thr);
        let ge = worse_or_eq_mask::<C>(v, thr);
        let bits = _mm256_movemask_epi8(_mm256_packs_epi16(eq, ge)) as u32;
        let i_eq = (bits & 0x00ff_00ff).count_ones() as usize;
        let i_ge = bits.count_ones() as usize - i_eq;
        n_eq += i_eq;
        n_lt += 16 - i_ge;
        i += 16;
    }

    for &v in &vals[n & !15..] {
        if C::better(v, thresh) {
            n_lt += 1;
        } else if v == thresh {
            n_eq += 1;
        }
    }

    (n_lt, n_eq)
}

/// Vectorized variant of the in-place compaction: keeps every strict
/// survivor plus the first `n_eq` entries equal to the threshold.
///
/// While the equality budget lasts, each lane is encoded as two mask bits
/// (`bit 2j`: equal, `bit 2j+1`: strictly better, after flipping the
/// worse-or-equal bits) and set positions are walked with trailing-zero
/// scans. Once the budget is spent the scan degenerates to strict survivors
/// only; the `n % 16` tail is handled scalarly.
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn compress_array<C: Comparator<Key = u16>>(
    vals: &mut [u16],
    ids: &mut [C::Id],
    thresh: u16,
    mut n_eq: usize,
) -> usize {
    let n = vals.len();
    let thr = _mm256_set1_epi16(thresh as i16);
    let mixmask = _mm256_set1_epi16(0xff00u16 as i16);

    let mut wp = 0;
    let mut i0 = 0;

    while i0 + 16 <= n && n_eq > 0 {
        let v = _mm256_loadu_si256(vals.as_ptr().add(i0) as *const __m256i);
        let ge = worse_or_eq_mask::<C>(v, thr);
        let eq = _mm256_cmpeq_epi16(v, thr);
        // Per lane: low byte from the equality mask, high byte from the
        // worse-or-equal mask; the XOR turns the latter into strictly-better.
        let mut bits = _mm256_movemask_epi8(_mm256_blendv_epi8(eq, ge, mixmask)) as u32;
        bits ^= 0xaaaa_aaaa;

        while bits != 0 {
            let j = (bits.trailing_zeros() & !1) as usize;
            let is_eq = bits >> j & 1 != 0;
            let is_strict = bits >> j & 2 != 0;
            bits &= !(3 << j);
            let src = i0 + (j >> 1);

            if is_strict {
                vals[wp] = vals[src];
                ids[wp] = ids[src];
                wp += 1;
            } else if is_eq && n_eq > 0 {
                vals[wp] = vals[src];
                ids[wp] = ids[src];
                wp += 1;
                n_eq -= 1;
            }
        }
        i0 += 16;
    }

    while i0 + 16 <= n {
        let v = _mm256_loadu_si256(vals.as_ptr().add(i0) as *const __m256i);
        let ge = worse_or_eq_mask::<C>(v, thr);
        let mut bits = !(_mm256_movemask_epi8(ge) as u32);

        while bits != 0 {
            let j = bits.trailing_zeros() as usize;
            bits &= !(3 << j);
            let src = i0 + (j >> 1);

            vals[wp] = vals[src];
            ids[wp] = ids[src];
            wp += 1;
        }
        i0 += 16;
    }

    for i in n & !15..n {
        if C::better(vals[i], thresh) {
            vals[wp] = vals[i];
            ids[wp] = ids[i];
            wp += 1;
        } else if n_eq > 0 && vals[i] == thresh {
            vals[wp] = vals[i];
            ids[wp] = ids[i];
            wp += 1;
            n_eq -= 1;
        }
    }

    debug_assert_eq!(n_eq, 0, "compaction must consume its equality budget");
    wp
}

/// Fuzzy partition with externally supplied value bounds `[s0, s1]`
/// (inclusive). Bisects thresholds over the half-open integer interval
/// `[s0, s1 + 1)` instead of sampling, shrinking the bracket toward the
/// side the survivor count dictates.
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn partition_fuzzy_with_bounds<C: Comparator<Key = u16>>(
    vals: &mut [u16],
    ids: &mut [C::Id],
    q_min: usize,
    q_max: usize,
    q_out: Option<&mut usize>,
    s0i: u16,
    s1i: u16,
) -> u16 {
    let n = vals.len();

    if q_min == 0 {
        if let Some(q) = q_out {
            *q = <C::Rev as Comparator>::neutral().saturating_as_usize();
        }
        return 0;
    }
    if q_max >= n {
        if let Some(q) = q_out {
            *q = q_max;
        }
        return C::neutral();
    }
    if s0i == s1i {
        if let Some(q) = q_out {
            *q = q_min;
        }
        return s0i;
    }

    let mut s0 = s0i as usize;
    let mut s1 = s1i as usize + 1;

    let mut thresh: i32 = 0;
    let mut n_lt = 0;
    let mut n_eq = 0;
    let mut q = 0;

    for _ in 0..MAX_BISECT_ITERS {
        thresh = ((s0 + s1) / 2) as i32;
        (n_lt, n_eq) = count_lt_and_eq::<C>(vals, thresh as u16);

        if n_lt <= q_min {
            if n_lt + n_eq >= q_min {
                q = q_min;
                break;
            }
            // Not strict enough: move the bracket toward the worse side.
            if C::KEEPS_LARGEST {
                s1 = thresh as usize;
            } else {
                s0 = thresh as usize;
            }
        } else if n_lt <= q_max {
            q = n_lt;
            break;
        } else if C::KEEPS_LARGEST {
            s0 = thresh as usize;
        } else {
            s1 = thresh as usize;
        }
    }

    let mut n_eq_keep = q as isize - n_lt as isize;

    if n_eq_keep < 0 {
        // More than q entries pile up on the best side; re-anchor at q_min
        // and step the threshold one unit toward the better side.
        debug_assert_eq!(s0 + 1, s1);
        q = q_min;
        thresh += if C::KEEPS_LARGEST { 1 } else { -1 };
        n_eq_keep = q as isize;
    } else {
        debug_assert!(n_eq_keep as usize <= n_eq);
    }

    let wp = compress_array::<C>(vals, ids, thresh as u16, n_eq_keep as usize);
    debug_assert_eq!(wp, q);

    if let Some(q_slot) = q_out {
        *q_slot = q;
    }

    thresh as u16
}

/// Fuzzy partition with bounds discovered by [`find_minimax`].
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn partition_fuzzy<C: Comparator<Key = u16>>(
    vals: &mut [u16],
    ids: &mut [C::Id],
    q_min: usize,
    q_max: usize,
    q_out: Option<&mut usize>,
) -> u16 {
    let (s0, s1) = find_minimax(vals);
    partition_fuzzy_with_bounds::<C>(vals, ids, q_min, q_max, q_out, s0, s1)
}
