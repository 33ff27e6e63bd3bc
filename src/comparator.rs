//! Ordering capability bundles for rank selection.
//!
//! A [`Comparator`] fixes, at compile time, everything the partitioning
//! kernels need to know about "better": the scalar key type, the identifier
//! type moved in lockstep with it, the polarity (keep the smallest or the
//! largest values), the worst-possible `neutral` key, and how to step a
//! threshold by one representable unit. [`KeepSmallest`] and [`KeepLargest`]
//! are zero-sized instantiations; monomorphizing over them compiles the
//! polarity into the hot loops.

use core::marker::PhantomData;

/// Scalar key types the partitioning kernels operate on.
///
/// Implementations exist for `f32`, `f64` and `u16`. The integer `nextafter`
/// steps are wrapping, matching unsigned arithmetic on the threshold; the
/// float steps are the IEEE one-ULP neighbors.
pub trait Key: Copy + PartialOrd + PartialEq + core::fmt::Debug {
    const ZERO: Self;
    /// Smallest representable value (`-inf` for floats).
    const MIN_VALUE: Self;
    /// Largest representable value (`+inf` for floats).
    const MAX_VALUE: Self;

    /// The next representable value toward `MAX_VALUE`.
    fn nextafter_up(self) -> Self;

    /// The next representable value toward `MIN_VALUE`.
    fn nextafter_down(self) -> Self;

    /// Saturating conversion used for the `q_min == 0` rank sentinel.
    fn saturating_as_usize(self) -> usize;

    /// Hook for the vectorized u16 fast path. Returns `None` when this key
    /// type has no fast path, or when the buffer or the host CPU does not
    /// qualify; the caller then runs the scalar kernel.
    #[inline]
    fn try_partition_fuzzy_simd<C>(
        _vals: &mut [Self],
        _ids: &mut [C::Id],
        _q_min: usize,
        _q_max: usize,
        _q_out: Option<&mut usize>,
    ) -> Option<Self>
    where
        C: Comparator<Key = Self>,
    {
        None
    }
}

impl Key for f32 {
    const ZERO: Self = 0.0;
    const MIN_VALUE: Self = f32::NEG_INFINITY;
    const MAX_VALUE: Self = f32::INFINITY;

    #[inline]
    fn nextafter_up(self) -> Self {
        f32::next_up(self)
    }

    #[inline]
    fn nextafter_down(self) -> Self {
        f32::next_down(self)
    }

    #[inline]
    fn saturating_as_usize(self) -> usize {
        self as usize
    }
}

impl Key for f64 {
    const ZERO: Self = 0.0;
    const MIN_VALUE: Self = f64::NEG_INFINITY;
    const MAX_VALUE: Self = f64::INFINITY;

    #[inline]
    fn nextafter_up(self) -> Self {
        f64::next_up(self)
    }

    #[inline]
    fn nextafter_down(self) -> Self {
        f64::next_down(self)
    }

    #[inline]
    fn saturating_as_usize(self) -> usize {
        self as usize
    }
}

impl Key for u16 {
    const ZERO: Self = 0;
    const MIN_VALUE: Self = u16::MIN;
    const MAX_VALUE: Self = u16::MAX;

    #[inline]
    fn nextafter_up(self) -> Self {
        self.wrapping_add(1)
    }

    #[inline]
    fn nextafter_down(self) -> Self {
        self.wrapping_sub(1)
    }

    #[inline]
    fn saturating_as_usize(self) -> usize {
        usize::from(self)
    }

    #[inline]
    fn try_partition_fuzzy_simd<C>(
        vals: &mut [Self],
        ids: &mut [C::Id],
        q_min: usize,
        q_max: usize,
        q_out: Option<&mut usize>,
    ) -> Option<Self>
    where
        C: Comparator<Key = Self>,
    {
        #[cfg(target_arch = "x86_64")]
        if vals.as_ptr() as usize % 32 == 0 && is_x86_feature_detected!("avx2") {
            // SAFETY: AVX2 support was just detected.
            return Some(unsafe {
                crate::partition::avx2::partition_fuzzy::<C>(vals, ids, q_min, q_max, q_out)
            });
        }

        #[cfg(not(target_arch = "x86_64"))]
        let _ = (vals, ids, q_min, q_max, q_out);

        None
    }
}

/// Compile-time bundle fixing the selection polarity for a key/id pair.
///
/// `better(a, b)` is a strict comparison, true iff `a` ranks strictly better
/// than `b` under the polarity. `neutral()` is the worst possible key (the
/// value no input can rank worse than), `Rev::neutral()` the best possible
/// one, and `nextafter(t)` steps `t` one representable unit toward the worse
/// side.
pub trait Comparator {
    type Key: Key;
    type Id: Copy;
    /// The dual bundle selecting the opposite end.
    type Rev: Comparator<Key = Self::Key, Id = Self::Id>;

    /// True iff this bundle keeps the largest values.
    const KEEPS_LARGEST: bool;

    fn better(a: Self::Key, b: Self::Key) -> bool;
    fn neutral() -> Self::Key;
    fn nextafter(t: Self::Key) -> Self::Key;
}

/// Keeps the `q` smallest values. Worse means larger.
pub struct KeepSmallest<K, I>(PhantomData<fn(K, I)>);

/// Keeps the `q` largest values. Worse means smaller.
pub struct KeepLargest<K, I>(PhantomData<fn(K, I)>);

impl<K: Key, I: Copy> Comparator for KeepSmallest<K, I> {
    type Key = K;
    type Id = I;
    type Rev = KeepLargest<K, I>;

    const KEEPS_LARGEST: bool = false;

    #[inline]
    fn better(a: K, b: K) -> bool {
        a < b
    }

    #[inline]
    fn neutral() -> K {
        K::MAX_VALUE
    }

    #[inline]
    fn nextafter(t: K) -> K {
        t.nextafter_up()
    }
}

impl<K: Key, I: Copy> Comparator for KeepLargest<K, I> {
    type Key = K;
    type Id = I;
    type Rev = KeepSmallest<K, I>;

    const KEEPS_LARGEST: bool = true;

    #[inline]
    fn better(a: K, b: K) -> bool {
        a > b
    }

    #[inline]
    fn neutral() -> K {
        K::MIN_VALUE
    }

    #[inline]
    fn nextafter(t: K) -> K {
        t.nextafter_down()
    }
}
