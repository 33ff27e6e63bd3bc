//! SIMD histograms over `u16` streams, 8 or 16 bins.
//!
//! Optionally each value is preprocessed as `(v - min) >> shift` with a
//! signed (arithmetic) shift and contributes to bin `v'` iff `0 <= v' < B`;
//! a negative `shift` selects the raw path, which bins the values
//! themselves and expects them to lie in `0..B` (out-of-range raw values
//! are ignored by the portable path and unspecified in the vectorized one).
//! The 8-bin variant has no range mask in its vector core either, so its
//! preprocessed flavor is exact when the mapped values stay below 8.
//! Counts ride per-lane 16-bit accumulators in the vectorized prefix, so a
//! single call is exact for up to 65535 hits per bin and lane.
//!
//! The shift dispatch is specialized for `shift in 0..=8`; other
//! non-negative shifts panic.

pub mod scalar;

#[cfg(target_arch = "x86_64")]
mod avx2;

/// 8-bin histogram of `data` added into caller-zeroed `hist`.
///
/// # Panics
///
/// Panics for `shift > 8`.
pub fn simd_histogram_8(data: &[u16], min: u16, shift: i32, hist: &mut [i32; 8]) {
    assert!(
        shift <= 8,
        "histogram dispatch for shift={shift} not instantiated"
    );

    #[cfg(target_arch = "x86_64")]
    if is_x86_feature_detected!("avx2") {
        // SAFETY: AVX2 support was just detected.
        unsafe { histogram_8_avx2(data, min, shift, hist) };
        return;
    }

    scalar::histogram_8(data, min, shift, hist);
}

/// 16-bin histogram of `data` added into caller-zeroed `hist`.
///
/// # Panics
///
/// Panics for `shift > 8`.
pub fn simd_histogram_16(data: &[u16], min: u16, shift: i32, hist: &mut [i32; 16]) {
    assert!(
        shift <= 8,
        "histogram dispatch for shift={shift} not instantiated"
    );

    #[cfg(target_arch = "x86_64")]
    if is_x86_feature_detected!("avx2") {
        // SAFETY: AVX2 support was just detected.
        unsafe { histogram_16_avx2(data, min, shift, hist) };
        return;
    }

    scalar::histogram_16(data, min, shift, hist);
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn histogram_8_avx2(data: &[u16], min: u16, shift: i32, hist: &mut [i32; 8]) {
    use self::avx2::{histogram_8, PreprocMinShift, PreprocNop};

    let head = &data[..data.len() & !15];

    let tab = if shift < 0 {
        histogram_8(head, PreprocNop)
    } else {
        match shift {
            0 => histogram_8(head, PreprocMinShift::<0>::new(min)),
            1 => histogram_8(head, PreprocMinShift::<1>::new(min)),
            2 => histogram_8(head, PreprocMinShift::<2>::new(min)),
            3 => histogram_8(head, PreprocMinShift::<3>::new(min)),
            4 => histogram_8(head, PreprocMinShift::<4>::new(min)),
            5 => histogram_8(head, PreprocMinShift::<5>::new(min)),
            6 => histogram_8(head, PreprocMinShift::<6>::new(min)),
            7 => histogram_8(head, PreprocMinShift::<7>::new(min)),
            8 => histogram_8(head, PreprocMinShift::<8>::new(min)),
            _ => unreachable!("shift range checked by the driver"),
        }
    };

    // The 16 lane counters fold pairwise into the 8 bins.
    for i in 0..8 {
        hist[i] = i32::from(tab[i]) + i32::from(tab[i + 8]);
    }

    scalar::histogram_8(&data[data.len() & !15..], min, shift, hist);
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn histogram_16_avx2(data: &[u16], min: u16, shift: i32, hist: &mut [i32; 16]) {
    use self::avx2::{histogram_16, PreprocMinShift, PreprocNop};

    let head = &data[..data.len() & !15];

    let tab = if shift < 0 {
        histogram_16(head, PreprocNop)
    } else {
        match shift {
            0 => histogram_16(head, PreprocMinShift::<0>::new(min)),
            1 => histogram_16(head, PreprocMinShift::<1>::new(min)),
            2 => histogram_16(head, PreprocMinShift::<2>::new(min)),
            3 => histogram_16(head, PreprocMinShift::<3>::new(min)),
            4 => histogram_16(head, PreprocMinShift::<4>::new(min)),
            5 => histogram_16(head, PreprocMinShift::<5>::new(min)),
            6 => histogram_16(head, PreprocMinShift::<6>::new(min)),
            7 => histogram_16(head, PreprocMinShift::<7>::new(min)),
            8 => histogram_16(head, PreprocMinShift::<8>::new(min)),
            _ => unreachable!("shift range checked by the driver"),
        }
    };

    for i in 0..16 {
        hist[i] = i32::from(tab[i]);
    }

    scalar::histogram_16(&data[data.len() & !15..], min, shift, hist);
}
