//! Scalar fuzzy partitioning kernel.
//!
//! Bisection by threshold with a median-of-3 sampler, followed by a single
//! in-place compaction of the surviving entries. This trades the O(n)
//! expected cost of a quickselect for an O(n log n) expected cost that never
//! shuffles the array while searching, which is the better deal when the
//! kept prefix is small compared to `n`.

use crate::comparator::{Comparator, Key};

use super::MAX_BISECT_ITERS;

/// Stride used by the threshold sampler. A fixed prime decorrelates the
/// sample walk from periodic input layouts while keeping it deterministic.
const SAMPLE_STRIDE: usize = 6_700_417;

/// Median of three under the numeric order. Returns one of its arguments;
/// when two compare equal the repeated value wins.
#[inline]
pub fn median3<K: Key>(mut a: K, mut b: K, c: K) -> K {
    if a > b {
        core::mem::swap(&mut a, &mut b);
    }
    if c > b {
        return b;
    }
    if c > a {
        return c;
    }
    a
}

/// Picks a new threshold strictly inside the open bracket `(inf, sup)`,
/// where `inf` is the best-side bound and `sup` the worst-side bound.
///
/// Walks the array with a prime stride and returns the median of the first
/// three interior values found, the first interior value if fewer than three
/// exist on the walk, or `inf` itself as the "bracket is empty" signal.
pub fn sample_threshold_median3<C: Comparator>(vals: &[C::Key], inf: C::Key, sup: C::Key) -> C::Key {
    let n = vals.len();
    let mut found = [inf; 3];
    let mut vi = 0;

    for i in 0..n {
        let v = vals[(i * SAMPLE_STRIDE) % n];
        if C::better(inf, v) && C::better(v, sup) {
            found[vi] = v;
            vi += 1;
            if vi == 3 {
                break;
            }
        }
    }

    if vi == 3 {
        median3(found[0], found[1], found[2])
    } else if vi != 0 {
        found[0]
    } else {
        inf
    }
}

/// Counts entries strictly better than `thresh` and entries equal to it.
pub fn count_lt_and_eq<C: Comparator>(vals: &[C::Key], thresh: C::Key) -> (usize, usize) {
    let mut n_lt = 0;
    let mut n_eq = 0;

    for &v in vals {
        if C::better(v, thresh) {
            n_lt += 1;
        } else if v == thresh {
            n_eq += 1;
        }
    }

    (n_lt, n_eq)
}

/// Stable in-place compaction: keeps every entry strictly better than
/// `thresh` plus the first `n_eq` entries equal to it, identifiers moved in
/// lockstep. Returns the write position; entries beyond it are left in an
/// unspecified state.
pub fn compress_array<C: Comparator>(
    vals: &mut [C::Key],
    ids: &mut [C::Id],
    thresh: C::Key,
    mut n_eq: usize,
) -> usize {
    let mut wp = 0;

    for i in 0..vals.len() {
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

/// Reorders `vals`/`ids` in place so the first `q` entries, for some
/// `q in [q_min, q_max]`, are the `q` best under `C`. Returns the separating
/// threshold; the chosen `q` is written to `q_out` when present.
///
/// `q_min == 0` short-circuits to an empty prefix: the returned threshold is
/// `Key::ZERO` and `q_out` receives the best-possible neutral saturated to
/// `usize` (0 when keeping the smallest), a sentinel kept for compatibility
/// with existing callers. `q_max >= n` short-circuits to keeping everything
/// with the worst-possible neutral as threshold.
///
/// # Panics
///
/// Panics when `vals` and `ids` differ in length, or when `n < 3` outside
/// the short-circuit cases.
pub fn partition_fuzzy_median3<C: Comparator>(
    vals: &mut [C::Key],
    ids: &mut [C::Id],
    q_min: usize,
    q_max: usize,
    q_out: Option<&mut usize>,
) -> C::Key {
    assert_eq!(
        vals.len(),
        ids.len(),
        "values and identifiers must have equal length"
    );
    let n = vals.len();

    if q_min == 0 {
        if let Some(q) = q_out {
            *q = <C::Rev as Comparator>::neutral().saturating_as_usize();
        }
        return <C::Key as Key>::ZERO;
    }
    if q_max >= n {
        if let Some(q) = q_out {
            *q = q_max;
        }
        return C::neutral();
    }

    assert!(n >= 3, "partitioning needs at least 3 values, got {n}");

    let mut inf = <C::Rev as Comparator>::neutral();
    let mut sup = C::neutral();
    let mut thresh = median3(vals[0], vals[n / 2], vals[n - 1]);

    let mut n_lt = 0;
    let mut n_eq = 0;
    let mut q = 0;

    for _ in 0..MAX_BISECT_ITERS {
        (n_lt, n_eq) = count_lt_and_eq::<C>(vals, thresh);

        if n_lt <= q_min {
            if n_lt + n_eq >= q_min {
                q = q_min;
                break;
            }
            // Too few survivors even counting ties: threshold not strict
            // enough, tighten the best-side bound.
            inf = thresh;
        } else if n_lt <= q_max {
            q = n_lt;
            break;
        } else {
            sup = thresh;
        }

        let new_thresh = sample_threshold_median3::<C>(vals, inf, sup);
        if new_thresh == inf {
            // Nothing representable strictly between the bounds.
            break;
        }
        thresh = new_thresh;
    }

    // Number of entries equal to the threshold that must be retained to
    // reach exactly q kept entries.
    let mut n_eq_keep = q as isize - n_lt as isize;

    if n_eq_keep < 0 {
        // More than q entries rank strictly better than the threshold even
        // at the tightest bracket. The bisection exits this way only when
        // they pile up on a single value at the best side, outside the open
        // sampling bracket; anchor the threshold on that value so the pile
        // becomes the equality class the budget draws from.
        q = q_min;
        let mut pile = <C::Rev as Comparator>::neutral();
        for &v in vals.iter() {
            if C::better(v, thresh) && C::better(pile, v) {
                pile = v;
            }
        }
        thresh = pile;
        n_eq_keep = q as isize;
    } else {
        debug_assert!(n_eq_keep as usize <= n_eq);
    }

    let wp = compress_array::<C>(vals, ids, thresh, n_eq_keep as usize);
    debug_assert_eq!(wp, q);

    if let Some(q_slot) = q_out {
        *q_slot = q;
    }

    thresh
}
