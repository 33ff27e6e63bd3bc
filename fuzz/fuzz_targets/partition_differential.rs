#![no_main]

use std::alloc::{self, Layout};
use std::{ptr, slice};

use libfuzzer_sys::fuzz_target;

use rank_partition::partition::scalar::partition_fuzzy_median3;
use rank_partition::{simd_partition_fuzzy, KeepLargest, KeepSmallest};

fn u8_as_u16(data: &[u8]) -> Vec<u16> {
    data.chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect()
}

/// 32-byte-aligned copy of the values, so the vectorized entry point can be
/// driven from here without pulling in the workspace test tools.
struct AlignedVals {
    ptr: *mut u16,
    len: usize,
    layout: Layout,
}

impl AlignedVals {
    fn new(vals: &[u16]) -> Self {
        let layout = Layout::from_size_align((vals.len() * 2).max(1), 32).unwrap();
        let ptr = unsafe { alloc::alloc(layout) } as *mut u16;
        assert!(!ptr.is_null());
        // SAFETY: the allocation holds vals.len() u16s and cannot overlap a
        // freshly borrowed source.
        unsafe { ptr::copy_nonoverlapping(vals.as_ptr(), ptr, vals.len()) };
        Self {
            ptr,
            len: vals.len(),
            layout,
        }
    }

    fn as_slice(&self) -> &[u16] {
        // SAFETY: initialized in new, length fixed for the lifetime.
        unsafe { slice::from_raw_parts(self.ptr, self.len) }
    }

    fn as_mut_slice(&mut self) -> &mut [u16] {
        // SAFETY: see as_slice; &mut self gives exclusive access.
        unsafe { slice::from_raw_parts_mut(self.ptr, self.len) }
    }
}

impl Drop for AlignedVals {
    fn drop(&mut self) {
        // SAFETY: allocated in new with this exact layout.
        unsafe { alloc::dealloc(self.ptr as *mut u8, self.layout) }
    }
}

fn check(keep_largest: bool, original: &[u16], kept: &[u16], thresh: u16, q: usize) {
    let mut sorted = original.to_vec();
    let mut kept = kept.to_vec();
    if keep_largest {
        sorted.sort_unstable_by_key(|&x| core::cmp::Reverse(x));
        kept.sort_unstable_by_key(|&x| core::cmp::Reverse(x));
    } else {
        sorted.sort_unstable();
        kept.sort_unstable();
    }

    assert_eq!(kept, &sorted[..q], "kept values are not the q best");
    for &x in &kept {
        if keep_largest {
            assert!(x >= thresh, "kept {x} ranks worse than threshold {thresh}");
        } else {
            assert!(x <= thresh, "kept {x} ranks worse than threshold {thresh}");
        }
    }
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }
    let keep_largest = data[0] & 1 != 0;
    let q_sel = u16::from_le_bytes([data[1], data[2]]) as usize;
    // Exact windows half the time: they force the rank, which is what makes
    // the scalar/simd comparison below exact.
    let window = if data[3] & 1 == 0 {
        0
    } else {
        (data[3] >> 1) as usize
    };

    let vals = u8_as_u16(&data[4..]);
    let n = vals.len();
    if n < 3 {
        return;
    }

    let q_min = 1 + q_sel % (n - 1);
    let q_max = (q_min + window).min(n - 1);

    let ids: Vec<u32> = (0..n as u32).collect();

    let mut scalar_vals = vals.clone();
    let mut scalar_ids = ids.clone();
    let mut scalar_q = 0;
    let scalar_thresh = if keep_largest {
        partition_fuzzy_median3::<KeepLargest<u16, u32>>(
            &mut scalar_vals,
            &mut scalar_ids,
            q_min,
            q_max,
            Some(&mut scalar_q),
        )
    } else {
        partition_fuzzy_median3::<KeepSmallest<u16, u32>>(
            &mut scalar_vals,
            &mut scalar_ids,
            q_min,
            q_max,
            Some(&mut scalar_q),
        )
    };

    // The aligned entry point takes the AVX2 kernel wherever the host
    // supports it (and documents scalar fallback where it does not).
    let mut simd_vals = AlignedVals::new(&vals);
    let mut simd_ids = ids.clone();
    let mut simd_q = 0;
    let simd_thresh = if keep_largest {
        simd_partition_fuzzy::<KeepLargest<u16, u32>>(
            simd_vals.as_mut_slice(),
            &mut simd_ids,
            q_min,
            q_max,
            Some(&mut simd_q),
        )
    } else {
        simd_partition_fuzzy::<KeepSmallest<u16, u32>>(
            simd_vals.as_mut_slice(),
            &mut simd_ids,
            q_min,
            q_max,
            Some(&mut simd_q),
        )
    };

    let outcomes: [(usize, &[u16], &[u32], u16); 2] = [
        (scalar_q, &scalar_vals, &scalar_ids, scalar_thresh),
        (simd_q, simd_vals.as_slice(), &simd_ids, simd_thresh),
    ];
    for (q, new_vals, new_ids, thresh) in outcomes {
        assert!(
            (q_min..=q_max).contains(&q),
            "q={q} outside [{q_min}, {q_max}]"
        );
        check(keep_largest, &vals, &new_vals[..q], thresh, q);

        // Identifiers stay paired: every kept pair is an input pair.
        for (&v, &id) in new_vals[..q].iter().zip(&new_ids[..q]) {
            assert_eq!(vals[id as usize], v, "id {id} detached from its value");
        }
    }

    // An exact window forces the rank, so both kernels must agree on it and
    // on the kept value multiset; a fuzzy window only forces agreement when
    // the chosen ranks happen to coincide.
    if q_min == q_max || scalar_q == simd_q {
        assert_eq!(scalar_q, simd_q, "kernels chose different ranks");
        let mut scalar_kept = scalar_vals[..scalar_q].to_vec();
        let mut simd_kept = simd_vals.as_slice()[..simd_q].to_vec();
        scalar_kept.sort_unstable();
        simd_kept.sort_unstable();
        assert_eq!(scalar_kept, simd_kept, "kernels kept different values");
    }
});
